use std::fmt::{Display, Write};

use clipmeter_core::{AnalysisResult, ControlState, Outcome, DEFAULT_SIGNATURE_LIMIT};
use crossterm::style::Stylize;

/// Width of a result line excluding the signature text itself.
const FIXED_COLUMNS: usize = "Tokens: 0000, Words: 0000, Chars: 00000, Signature: \"\"".len();
const MIN_AUTO_SIGNATURE: usize = 12;

/// Builds one `key: value, key: value` display line.
pub struct LineBuilder {
    line: String,
    colored: bool,
    key_written: bool,
}

impl LineBuilder {
    pub fn new(colored: bool) -> Self {
        Self {
            line: String::with_capacity(128),
            colored,
            key_written: false,
        }
    }

    pub fn key_value(&mut self, key: &str, value: impl Display) {
        if self.key_written {
            self.line.push_str(", ");
        }
        let value = value.to_string();
        let _ = if self.colored {
            write!(self.line, "{}: {}", key.magenta(), value.cyan())
        } else {
            write!(self.line, "{key}: {value}")
        };
        self.key_written = true;
    }

    pub fn finish(self) -> String {
        self.line
    }
}

pub fn render_outcome(outcome: &Outcome<AnalysisResult>, colored: bool) -> String {
    match outcome {
        Ok(result) => {
            let mut line = LineBuilder::new(colored);
            line.key_value("Tokens", format_args!("{:4}", result.token_count));
            line.key_value("Words", format_args!("{:4}", result.word_count));
            line.key_value("Chars", format_args!("{:5}", result.char_count));
            line.key_value("Signature", format_args!("{:?}", result.signature));
            line.finish()
        }
        Err(err) => {
            let text = format!("[ERR] {err}");
            if colored {
                text.red().to_string()
            } else {
                text
            }
        }
    }
}

pub fn render_state(state: ControlState, colored: bool) -> String {
    let text = match state {
        ControlState::Running => "[running] watching clipboard",
        ControlState::Paused => "[paused] press Enter to resume",
    };
    if colored {
        text.yellow().to_string()
    } else {
        text.to_string()
    }
}

pub fn banner() -> &'static str {
    "clipmeter: Enter pauses/resumes, q + Enter quits"
}

/// Signature length that keeps a result line within `columns`.
pub fn signature_limit_for_width(columns: Option<u16>) -> usize {
    match columns {
        Some(columns) => usize::from(columns)
            .saturating_sub(FIXED_COLUMNS)
            .max(MIN_AUTO_SIGNATURE),
        None => DEFAULT_SIGNATURE_LIMIT,
    }
}

#[cfg(test)]
mod tests {
    use super::{render_outcome, render_state, signature_limit_for_width, LineBuilder};
    use clipmeter_core::{AnalysisResult, ControlState, PipelineError};
    use pretty_assertions::assert_eq;

    #[test]
    fn result_line_is_padded_and_quoted() {
        let result = AnalysisResult {
            token_count: 12,
            word_count: 3,
            char_count: 20,
            signature: "say \"hi\"\nnow".to_string(),
            source_text: "say \"hi\"\nnow".to_string(),
        };
        assert_eq!(
            render_outcome(&Ok(result), false),
            "Tokens:   12, Words:    3, Chars:    20, Signature: \"say \\\"hi\\\"\\nnow\""
        );
    }

    #[test]
    fn error_line_names_the_failure() {
        let outcome = Err(PipelineError::source_read("xclip exited with 1"));
        assert_eq!(
            render_outcome(&outcome, false),
            "[ERR] source read failed: xclip exited with 1"
        );
    }

    #[test]
    fn builder_separates_pairs() {
        let mut line = LineBuilder::new(false);
        line.key_value("a", 1);
        line.key_value("b", "two");
        assert_eq!(line.finish(), "a: 1, b: two");
    }

    #[test]
    fn colored_output_keeps_text() {
        let mut line = LineBuilder::new(true);
        line.key_value("Tokens", 7);
        let rendered = line.finish();
        assert!(rendered.contains("Tokens"));
        assert!(rendered.contains('7'));
        assert!(rendered.contains('\u{1b}'));
    }

    #[test]
    fn state_lines() {
        assert!(render_state(ControlState::Paused, false).starts_with("[paused]"));
        assert!(render_state(ControlState::Running, false).starts_with("[running]"));
    }

    #[test]
    fn signature_limit_tracks_terminal_width() {
        assert_eq!(signature_limit_for_width(None), 60);
        assert_eq!(signature_limit_for_width(Some(134)), 80);
        assert_eq!(signature_limit_for_width(Some(40)), 12);
    }
}
