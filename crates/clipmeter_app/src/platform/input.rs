/// Keyboard command entered on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Toggle,
    Quit,
}

/// A bare Enter (or anything unrecognised) toggles; `q`/`quit` exits.
pub fn parse_command(line: &str) -> KeyCommand {
    match line.trim().to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => KeyCommand::Quit,
        _ => KeyCommand::Toggle,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_command, KeyCommand};

    #[test]
    fn enter_toggles() {
        assert_eq!(parse_command(""), KeyCommand::Toggle);
        assert_eq!(parse_command("p"), KeyCommand::Toggle);
    }

    #[test]
    fn quit_words_exit() {
        assert_eq!(parse_command("q"), KeyCommand::Quit);
        assert_eq!(parse_command("  QUIT \r"), KeyCommand::Quit);
        assert_eq!(parse_command("exit"), KeyCommand::Quit);
    }
}
