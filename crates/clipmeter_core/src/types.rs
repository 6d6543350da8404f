use std::fmt;

/// Value-or-error passed through the pipeline as ordinary data.
pub type Outcome<T> = Result<T, PipelineError>;

/// One reading of the text source at a polling tick.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextSnapshot(String);

impl TextSnapshot {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for TextSnapshot {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for TextSnapshot {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub token_count: usize,
    pub word_count: usize,
    pub char_count: usize,
    pub signature: String,
    pub source_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineError {
    pub kind: FailureKind,
    pub message: String,
}

impl PipelineError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn source_read(message: impl Into<String>) -> Self {
        Self::new(FailureKind::SourceRead, message)
    }

    pub fn count(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Count, message)
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for PipelineError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The text source could not be read this tick.
    SourceRead,
    /// The token counter rejected the text.
    Count,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::SourceRead => write!(f, "source read failed"),
            FailureKind::Count => write!(f, "token count failed"),
        }
    }
}
