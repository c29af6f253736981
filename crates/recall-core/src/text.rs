//! Note text helpers.
//!
//! Notes are stored MarkdownV2-escaped so any transport that renders them
//! with that parse mode can send them verbatim. Long notes are cut with the
//! legacy tail-keeping rule: once the escaped note reaches [`NOTE_LIMIT`]
//! characters, the first [`NOTE_SKIP`] characters are dropped and an escaped
//! ellipsis is appended. Existing stored notes depend on this exact shape.

/// Characters that must be backslash-escaped in MarkdownV2 text.
pub const MARKDOWN_V2_SPECIAL: [char; 18] = [
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Escaped notes at or above this many characters are truncated.
pub const NOTE_LIMIT: usize = 200;
/// Number of leading characters dropped from an over-long note.
pub const NOTE_SKIP: usize = 190;
/// Escaped form of `...`.
pub const ELLIPSIS: &str = "\\.\\.\\.";

/// Backslash-escape every MarkdownV2 special character in `text`.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_V2_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Reverse [`escape_markdown_v2`]: `\x` becomes `x` for every special `x`.
/// Backslashes not followed by a special character are kept.
pub fn unescape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if MARKDOWN_V2_SPECIAL.contains(&next) {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Escape a raw user note and apply the length cap.
///
/// Lengths are counted in characters, not bytes.
pub fn prepare_note(raw: &str) -> String {
    let escaped = escape_markdown_v2(raw);
    if escaped.chars().count() < NOTE_LIMIT {
        return escaped;
    }
    let mut tail: String = escaped.chars().skip(NOTE_SKIP).collect();
    tail.push_str(ELLIPSIS);
    tail
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_prefixes_every_special_char() {
        assert_eq!(escape_markdown_v2("a.b!"), "a\\.b\\!");
        assert_eq!(escape_markdown_v2("(x)"), "\\(x\\)");
        assert_eq!(escape_markdown_v2("plain"), "plain");
    }

    #[test]
    fn unescape_reverses_escape() {
        let raw = "Read ch. 3-4 [optional] before *exam*!";
        assert_eq!(unescape_markdown_v2(&escape_markdown_v2(raw)), raw);
    }

    #[test]
    fn unescape_keeps_unrelated_backslashes() {
        assert_eq!(unescape_markdown_v2("C:\\dir"), "C:\\dir");
        assert_eq!(unescape_markdown_v2("trailing\\"), "trailing\\");
    }

    #[test]
    fn short_note_is_only_escaped() {
        assert_eq!(prepare_note("see p. 12"), "see p\\. 12");
    }

    #[test]
    fn note_one_below_limit_is_kept_whole() {
        let raw = "n".repeat(NOTE_LIMIT - 1);
        assert_eq!(prepare_note(&raw), raw);
    }

    #[test]
    fn note_at_limit_keeps_last_ten_chars() {
        let raw = format!("{}{}", "a".repeat(190), "0123456789");
        assert_eq!(prepare_note(&raw), format!("0123456789{ELLIPSIS}"));
    }

    #[test]
    fn long_note_drops_first_190_chars() {
        let raw = format!("{}{}", "a".repeat(190), "b".repeat(20));
        let note = prepare_note(&raw);
        assert_eq!(note, format!("{}{ELLIPSIS}", "b".repeat(20)));
    }

    #[test]
    fn limit_applies_to_escaped_length() {
        // 100 dots escape to 200 characters, reaching the limit.
        let raw = ".".repeat(100);
        let note = prepare_note(&raw);
        let expected: String = "\\.".repeat(100).chars().skip(NOTE_SKIP).collect();
        assert_eq!(note, format!("{expected}{ELLIPSIS}"));
        assert!(note.starts_with("\\."));
    }

    #[test]
    fn multibyte_notes_are_cut_on_char_boundaries() {
        let raw = "é".repeat(205);
        let note = prepare_note(&raw);
        assert_eq!(note, format!("{}{ELLIPSIS}", "é".repeat(15)));
    }
}
