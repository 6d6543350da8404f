use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use clipmeter_core::{PipelineConfig, DEFAULT_CACHE_CAPACITY, DEFAULT_QUEUE_CAPACITY};
use log::LevelFilter;

use super::logging::LogDestination;
use super::render::signature_limit_for_width;

/// Watch the clipboard and report token, word and char counts for each new copy.
#[derive(Debug, Parser)]
#[command(name = "clipmeter", version)]
pub struct Cli {
    /// Clipboard polling interval, e.g. `17ms` or `1s`.
    #[arg(long, value_parser = humantime::parse_duration, default_value = "17ms")]
    pub freq: Duration,

    /// Signature length. Follows the terminal width when omitted.
    #[arg(long)]
    pub signlen: Option<usize>,

    /// Number of distinct texts whose results are memoized.
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: usize,

    /// Capacity of the queues between stages.
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// Token counting strategy.
    #[arg(long, value_enum, default_value_t = CounterKind::Heuristic)]
    pub counter: CounterKind,

    /// Refuse to count texts longer than this many chars.
    #[arg(long)]
    pub max_chars: Option<usize>,

    /// Paste command to run instead of the detected one, e.g. `--clipboard-cmd xclip -o`.
    #[arg(
        long,
        num_args = 1..,
        value_name = "CMD",
        allow_hyphen_values = true,
        conflicts_with = "watch_file"
    )]
    pub clipboard_cmd: Vec<String>,

    /// Watch a file's contents instead of the clipboard.
    #[arg(long, value_name = "PATH")]
    pub watch_file: Option<PathBuf>,

    /// Log file path.
    #[arg(long, default_value = "clipmeter.log")]
    pub log_file: PathBuf,

    /// Where log records go.
    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    pub log_to: LogTarget,

    /// Log level (error, warn, info, debug, trace, off).
    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,

    /// Disable coloured output.
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CounterKind {
    Whitespace,
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

impl Cli {
    pub fn log_destination(&self) -> LogDestination {
        match self.log_to {
            LogTarget::File => LogDestination::File(self.log_file.clone()),
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both(self.log_file.clone()),
        }
    }

    /// Whether the signature limit should follow the terminal width.
    pub fn auto_signature(&self) -> bool {
        self.signlen.is_none()
    }

    pub fn pipeline_config(&self, terminal_columns: Option<u16>) -> PipelineConfig {
        PipelineConfig {
            poll_interval: self.freq,
            signature_limit: self
                .signlen
                .unwrap_or_else(|| signature_limit_for_width(terminal_columns)),
            cache_capacity: self.cache_capacity,
            queue_capacity: self.queue_capacity,
        }
    }
}
