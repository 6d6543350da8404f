/// Number of whitespace-delimited words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Length in chars (Unicode scalar values), matching [`crate::signature`].
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::{char_count, word_count};

    #[test]
    fn words_split_on_any_whitespace() {
        assert_eq!(word_count("one two\tthree\nfour  five"), 5);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn chars_are_code_points() {
        assert_eq!(char_count("abc"), 3);
        assert_eq!(char_count("naïve"), 5);
        assert_eq!(char_count("日本語"), 3);
    }
}
