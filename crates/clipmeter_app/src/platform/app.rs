use std::future::Future;
use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::Context;
use clipmeter_core::ControlState;
use clipmeter_engine::{
    CommandClipboard, FileTextSource, HeuristicTokenCounter, Pipeline, PipelineControl,
    TextSource, TokenCounter, WhitespaceTokenCounter,
};
use engine_logging::{engine_info, engine_warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::cli::{Cli, CounterKind};
use super::input::{parse_command, KeyCommand};
use super::render::{banner, render_outcome, render_state, signature_limit_for_width};

pub async fn run_app(cli: Cli) -> anyhow::Result<()> {
    let colored = !cli.no_color && io::stdout().is_terminal();
    let config = cli.pipeline_config(terminal_columns());
    let source = build_source(&cli)?;
    let counter = build_counter(&cli);

    // Surface a broken counter before any clipboard traffic.
    counter.count("").context("token counter is not usable")?;

    let mut pipeline =
        Pipeline::start(config, source, counter).context("invalid pipeline configuration")?;
    let control = pipeline.control();

    println!("{}", banner());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                engine_info!("interrupt received");
                break;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match parse_command(&line) {
                    KeyCommand::Toggle => {
                        match toggle_or_interrupt(&control, &mut shutdown).await {
                            Some(state) => println!("{}", render_state(state, colored)),
                            None => break,
                        }
                    }
                    KeyCommand::Quit => break,
                },
                Ok(None) => {
                    engine_info!("stdin closed; keyboard control disabled");
                    stdin_open = false;
                }
                Err(err) => {
                    engine_warn!("stdin read failed: {}", err);
                    stdin_open = false;
                }
            },
            outcome = pipeline.recv() => match outcome {
                Some(outcome) => {
                    println!("{}", render_outcome(&outcome, colored));
                    if cli.auto_signature() {
                        follow_terminal_width(&control);
                    }
                }
                None => break,
            },
        }
    }

    pipeline.shutdown().await;
    Ok(())
}

/// Toggles the pipeline unless `interrupt` fires first.
///
/// `None` means the app should stop, either on interrupt or because the
/// pipeline is gone.
async fn toggle_or_interrupt<F>(control: &PipelineControl, interrupt: F) -> Option<ControlState>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = interrupt => {
            engine_info!("interrupt received while toggling");
            None
        }
        applied = control.toggle() => match applied {
            Ok(state) => Some(state),
            Err(err) => {
                engine_warn!("toggle failed: {}", err);
                None
            }
        },
    }
}

fn build_source(cli: &Cli) -> anyhow::Result<Arc<dyn TextSource>> {
    if let Some(path) = &cli.watch_file {
        engine_info!("watching file {:?}", path);
        return Ok(Arc::new(FileTextSource::new(path)));
    }
    if let Some((program, args)) = cli.clipboard_cmd.split_first() {
        engine_info!("using clipboard command {} {:?}", program, args);
        return Ok(Arc::new(CommandClipboard::custom(
            program.clone(),
            args.to_vec(),
        )));
    }
    let clipboard = CommandClipboard::detect()
        .context("no clipboard backend found; pass --clipboard-cmd or --watch-file")?;
    engine_info!(
        "using clipboard command {} {:?}",
        clipboard.program(),
        clipboard.args()
    );
    Ok(Arc::new(clipboard))
}

fn build_counter(cli: &Cli) -> Arc<dyn TokenCounter> {
    match (cli.counter, cli.max_chars) {
        (CounterKind::Whitespace, _) => Arc::new(WhitespaceTokenCounter),
        (CounterKind::Heuristic, Some(max_chars)) => {
            Arc::new(HeuristicTokenCounter::with_max_chars(max_chars))
        }
        (CounterKind::Heuristic, None) => Arc::new(HeuristicTokenCounter::new()),
    }
}

fn terminal_columns() -> Option<u16> {
    crossterm::terminal::size().ok().map(|(columns, _)| columns)
}

/// Keeps the signature limit in step with terminal resizes.
fn follow_terminal_width(control: &PipelineControl) {
    let wanted = signature_limit_for_width(terminal_columns());
    if wanted != control.signature_limit() && control.set_signature_limit(wanted).is_ok() {
        engine_info!("signature limit now {}", wanted);
    }
}
