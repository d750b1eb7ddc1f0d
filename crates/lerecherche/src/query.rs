// Query and Text Normalization
//
// *La Question* (The Question) - Case folding, punctuation stripping and tokenization
//
// Every function here is a pure function of its input string. Case folding uses
// `char::to_lowercase`, which is locale-independent, so the same query yields
// the same tokens on every platform.

/// Characters that split embedding terms in addition to whitespace
pub const TERM_DELIMITERS: &[char] = &[
    ',', '.', '-', '_', '/', '\\', '(', ')', '[', ']', '>', '<', '&',
];

/// Minimum length (in chars) of an embedding term
pub const MIN_TERM_CHARS: usize = 2;

/// Normalize text for lexical matching
///
/// Lower-cases, drops every character that is neither alphanumeric nor
/// whitespace, and collapses whitespace runs to single spaces. Leading and
/// trailing whitespace is removed.
///
/// "Alphanumeric" is [`char::is_alphanumeric`]: letter numbers such as `Ⅻ`
/// and other numbers such as `²` are kept as searchable characters, next to
/// letters and decimal digits of any script.
///
/// # Example
///
/// ```
/// use lerecherche::query::normalize;
///
/// assert_eq!(normalize("  Wi-Fi   Settings! "), "wifi settings");
/// ```
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else if ch.is_whitespace() {
            pending_space = true;
        }
    }

    out
}

/// Split normalized text into tokens
pub fn tokenize(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split_whitespace()
}

/// Split free text into embedding terms
///
/// Splits on whitespace and [`TERM_DELIMITERS`], lower-cases, strips any
/// remaining non-alphanumeric characters and drops terms shorter than
/// [`MIN_TERM_CHARS`]. Duplicates are kept so callers can count frequency.
pub fn embedding_terms(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || TERM_DELIMITERS.contains(&c))
        .map(|piece| {
            piece
                .chars()
                .flat_map(char::to_lowercase)
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .filter(|term| term.chars().count() >= MIN_TERM_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_normalize_keeps_number_forms() {
        assert_eq!(normalize("Volume²"), "volume²");
        assert_eq!(normalize("Ⅻ Settings"), "ⅻ settings");
        assert_eq!(normalize("Wi‑Fi ①"), "wifi ①");
    }

    #[rstest]
    #[case("Display", "display")]
    #[case("  Display   Settings  ", "display settings")]
    #[case("Wi-Fi & Network", "wifi network")]
    #[case("Bluetooth\t&\ndevices", "bluetooth devices")]
    #[case("!!!", "")]
    #[case("", "")]
    #[case("Ünïcödé Straße", "ünïcödé straße")]
    #[case("Windows 11 Update", "windows 11 update")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn test_tokenize() {
        let tokens: Vec<_> = tokenize("display settings screen").collect();
        assert_eq!(tokens, vec!["display", "settings", "screen"]);
        assert_eq!(tokenize("").count(), 0);
    }

    #[test]
    fn test_embedding_terms_split_wider_set() {
        let terms = embedding_terms("System > Display (screen/monitor) a b_c");
        assert_eq!(terms, vec!["system", "display", "screen", "monitor"]);
    }

    #[test]
    fn test_embedding_terms_keep_duplicates() {
        let terms = embedding_terms("sound Sound SOUND");
        assert_eq!(terms, vec!["sound", "sound", "sound"]);
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(input in "\\PC{0,40}") {
            let once = normalize(&input);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        #[test]
        fn prop_normalized_has_no_double_spaces(input in "\\PC{0,40}") {
            let out = normalize(&input);
            prop_assert!(!out.contains("  "));
            prop_assert!(!out.starts_with(' '));
            prop_assert!(!out.ends_with(' '));
        }
    }
}
