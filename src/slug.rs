use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Convert a clip name into a stable ASCII identifier
/// - Strips diacritics via Unicode NFD decomposition
/// - Maps letters NFD cannot decompose: ı→i, İ→I, ğ→g, ş→s, ø→o, ł→l, ß→ss
/// - Replaces spaces, dots, dashes and other symbols with underscores
/// - Collapses multiple underscores and trims them at both ends
/// - Prefixes an underscore when the result would start with a digit
pub fn identifier(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut last_was_underscore = false;

    for ch in input.nfd() {
        if is_combining_mark(ch) {
            continue;
        }

        let mapped: &str = match ch {
            'ı' => "i",
            'İ' => "I",
            'ğ' => "g",
            'Ğ' => "G",
            'ş' => "s",
            'Ş' => "S",
            'ø' => "o",
            'Ø' => "O",
            'ł' => "l",
            'Ł' => "L",
            'ß' => "ss",
            _ => {
                if ch.is_ascii_alphanumeric() {
                    result.push(ch);
                    last_was_underscore = false;
                } else if !ch.is_control() && !last_was_underscore && !result.is_empty() {
                    result.push('_');
                    last_was_underscore = true;
                }
                continue;
            }
        };

        result.push_str(mapped);
        last_was_underscore = false;
    }

    if result.ends_with('_') {
        result.pop();
    }

    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }

    result
}

/// Compare two clip names by their identifiers
pub fn same_identifier(a: &str, b: &str) -> bool {
    identifier(a).eq_ignore_ascii_case(&identifier(b))
}
