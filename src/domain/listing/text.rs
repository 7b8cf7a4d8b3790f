//! Text normalization helpers shared by form validation and rendering.
//!
//! Submissions arrive from mobile keyboards that freely mix Persian,
//! Arabic-Indic and Latin digits and sprinkle invisible bidi marks.

const PERSIAN_DIGITS: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];

const HIDDEN_MARKS: [char; 7] = [
    '\u{200F}', '\u{200E}', '\u{202A}', '\u{202B}', '\u{202C}', '\u{202D}', '\u{202E}',
];

/// Returns true if `s` contains Persian (U+06F0..) or Arabic-Indic (U+0660..) digits.
pub fn contains_non_latin_digits(s: &str) -> bool {
    s.chars()
        .any(|c| ('\u{06F0}'..='\u{06F9}').contains(&c) || ('\u{0660}'..='\u{0669}').contains(&c))
}

/// Maps Persian and Arabic-Indic digits to their Latin equivalents.
pub fn normalize_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{06F0}'..='\u{06F9}' => latin_digit(c as u32 - 0x06F0),
            '\u{0660}'..='\u{0669}' => latin_digit(c as u32 - 0x0660),
            other => other,
        })
        .collect()
}

fn latin_digit(value: u32) -> char {
    char::from_digit(value, 10).unwrap_or('0')
}

/// Maps Latin digits to Persian digits for display.
pub fn to_persian_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) if c.is_ascii_digit() => PERSIAN_DIGITS[d as usize],
            _ => c,
        })
        .collect()
}

/// Removes invisible directionality marks that break pattern matching.
pub fn strip_hidden_marks(s: &str) -> String {
    s.chars().filter(|c| !HIDDEN_MARKS.contains(c)).collect()
}

/// Maps the decimal separators users actually type to `.`.
pub fn normalize_decimal_separator(s: &str) -> String {
    s.replace([',', '\u{066B}', '\u{066C}'], ".")
}

/// Escapes text for the platform's HTML parse mode.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

/// Truncates to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_persian_and_arabic_digits() {
        assert_eq!(normalize_digits("۱۴۰۳"), "1403");
        assert_eq!(normalize_digits("٢٠٢٤"), "2024");
        assert_eq!(normalize_digits("km ۱۲a"), "km 12a");
    }

    #[test]
    fn detects_non_latin_digits() {
        assert!(contains_non_latin_digits("۸۰"));
        assert!(contains_non_latin_digits("8٠"));
        assert!(!contains_non_latin_digits("80.5"));
    }

    #[test]
    fn converts_latin_to_persian_digits() {
        assert_eq!(to_persian_digits("1403"), "۱۴۰۳");
        assert_eq!(to_persian_digits("ab"), "ab");
    }

    #[test]
    fn strips_bidi_marks() {
        assert_eq!(strip_hidden_marks("\u{200F}120\u{200E}"), "120");
    }

    #[test]
    fn normalizes_decimal_separators() {
        assert_eq!(normalize_decimal_separator("120,5"), "120.5");
        assert_eq!(normalize_decimal_separator("120\u{066B}5"), "120.5");
    }

    #[test]
    fn escapes_html_metacharacters() {
        assert_eq!(escape_html("<b>&\"</b>"), "&lt;b&gt;&amp;&quot;&lt;/b&gt;");
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("سلام دنیا", 4), "سلام");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
