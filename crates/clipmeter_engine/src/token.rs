use clipmeter_core::PipelineError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountError {
    #[error("text of {chars} chars exceeds the {max_chars} char limit")]
    TooLarge { chars: usize, max_chars: usize },
    #[error("{0}")]
    Backend(String),
}

impl From<CountError> for PipelineError {
    fn from(err: CountError) -> Self {
        PipelineError::count(err.to_string())
    }
}

pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> Result<usize, CountError>;
}

/// Simple, deterministic whitespace tokenizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenCounter;

impl TokenCounter for WhitespaceTokenCounter {
    fn count(&self, text: &str) -> Result<usize, CountError> {
        Ok(text.split_whitespace().count())
    }
}

/// Rough estimate of what a BPE tokenizer would produce.
///
/// Alphanumeric runs cost one token per started group of four chars, every
/// other non-whitespace char costs one token of its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicTokenCounter {
    max_chars: Option<usize>,
}

impl HeuristicTokenCounter {
    const CHARS_PER_TOKEN: usize = 4;

    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses texts longer than `max_chars` with [`CountError::TooLarge`].
    pub fn with_max_chars(max_chars: usize) -> Self {
        Self {
            max_chars: Some(max_chars),
        }
    }
}

impl TokenCounter for HeuristicTokenCounter {
    fn count(&self, text: &str) -> Result<usize, CountError> {
        if let Some(max_chars) = self.max_chars {
            let chars = text.chars().count();
            if chars > max_chars {
                return Err(CountError::TooLarge { chars, max_chars });
            }
        }

        let mut tokens = 0;
        let mut run = 0usize;
        for ch in text.chars() {
            if ch.is_alphanumeric() {
                run += 1;
                continue;
            }
            tokens += run.div_ceil(Self::CHARS_PER_TOKEN);
            run = 0;
            if !ch.is_whitespace() {
                tokens += 1;
            }
        }
        tokens += run.div_ceil(Self::CHARS_PER_TOKEN);
        Ok(tokens)
    }
}
