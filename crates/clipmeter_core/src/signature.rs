const ELLIPSIS: &str = "...";
pub const DEFAULT_SIGNATURE_LIMIT: usize = 60;

/// Abbreviates `text` to about `limit` chars for display.
///
/// Texts of at most `limit` chars come back unchanged. Longer texts keep their
/// first `limit * 3 / 4` chars and their last `limit / 4 - 3` chars around an
/// ellipsis, which lands exactly on `limit` chars for any `limit >= 12`.
/// Below that the tail is empty. Lengths are counted in chars, never bytes,
/// so multi-byte text is never split inside a code point.
pub fn signature(text: &str, limit: usize) -> String {
    let total = text.chars().count();
    if total <= limit {
        return text.to_string();
    }

    let head_len = limit * 3 / 4;
    let tail_len = (limit / 4).saturating_sub(ELLIPSIS.len());

    let head_end = byte_offset(text, head_len);
    let tail_start = byte_offset(text, total - tail_len);

    let mut out = String::with_capacity(head_end + ELLIPSIS.len() + text.len() - tail_start);
    out.push_str(&text[..head_end]);
    out.push_str(ELLIPSIS);
    out.push_str(&text[tail_start..]);
    out
}

fn byte_offset(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map_or(text.len(), |(offset, _)| offset)
}
