use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use clipmeter_core::PipelineError;
use engine_logging::engine_debug;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no clipboard command available (tried: {tried})")]
    Unavailable { tried: String },
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("clipboard content is not valid UTF-8")]
    InvalidUtf8,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<SourceError> for PipelineError {
    fn from(err: SourceError) -> Self {
        PipelineError::source_read(err.to_string())
    }
}

/// Where the change monitor reads text from.
#[async_trait]
pub trait TextSource: Send + Sync {
    async fn read_text(&self) -> Result<String, SourceError>;
}

/// Reads the system clipboard through a platform paste command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
    /// Display server variable the command needs, if any.
    requires_env: Option<&'static str>,
    /// Strip one trailing line break the command appends on its own.
    strip_newline: bool,
}

impl CommandClipboard {
    /// Wraps a user-supplied paste command.
    pub fn custom(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            requires_env: None,
            strip_newline: false,
        }
    }

    fn builtin(
        program: &str,
        args: &[&str],
        requires_env: Option<&'static str>,
        strip_newline: bool,
    ) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            requires_env,
            strip_newline,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Known paste commands for this platform, in order of preference.
    pub fn candidates() -> Vec<CommandClipboard> {
        if cfg!(target_os = "macos") {
            vec![Self::builtin("pbpaste", &[], None, false)]
        } else if cfg!(target_os = "windows") {
            vec![Self::builtin(
                "powershell",
                &["-NoProfile", "-Command", "Get-Clipboard -Raw"],
                None,
                true,
            )]
        } else {
            vec![
                Self::builtin("wl-paste", &["--no-newline"], Some("WAYLAND_DISPLAY"), false),
                Self::builtin("xclip", &["-selection", "clipboard", "-o"], Some("DISPLAY"), false),
                Self::builtin("xsel", &["--clipboard", "--output"], Some("DISPLAY"), false),
            ]
        }
    }

    /// Picks the first candidate that is installed and has its display server.
    pub fn detect() -> Result<Self, SourceError> {
        let candidates = Self::candidates();
        let tried = candidates
            .iter()
            .map(|candidate| candidate.program.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        candidates
            .into_iter()
            .find(CommandClipboard::is_available)
            .ok_or(SourceError::Unavailable { tried })
    }

    pub fn is_available(&self) -> bool {
        let env_ok = self
            .requires_env
            .is_none_or(|var| env::var_os(var).is_some_and(|value| !value.is_empty()));
        let available = env_ok && find_on_path(&self.program).is_some();
        engine_debug!("clipboard candidate {} available={}", self.program, available);
        available
    }
}

#[async_trait]
impl TextSource for CommandClipboard {
    async fn read_text(&self) -> Result<String, SourceError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| SourceError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SourceError::CommandFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let mut text = String::from_utf8(output.stdout).map_err(|_| SourceError::InvalidUtf8)?;
        if self.strip_newline {
            strip_one_newline(&mut text);
        }
        Ok(text)
    }
}

/// Treats the contents of a file as the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTextSource {
    path: PathBuf,
}

impl FileTextSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TextSource for FileTextSource {
    async fn read_text(&self) -> Result<String, SourceError> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}

fn strip_one_newline(text: &mut String) {
    if text.ends_with("\r\n") {
        text.truncate(text.len() - 2);
    } else if text.ends_with('\n') {
        text.truncate(text.len() - 1);
    }
}

fn find_on_path(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).find_map(|dir| {
        let full = dir.join(program);
        if full.is_file() {
            return Some(full);
        }
        let exe = full.with_extension("exe");
        exe.is_file().then_some(exe)
    })
}
