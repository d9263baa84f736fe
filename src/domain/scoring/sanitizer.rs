//! Text sanitizer for user-submitted review text.
//!
//! Review text arrives from scraped pages and form posts, so it can carry
//! null bytes, terminal control sequences or bytes in a legacy encoding.
//! Everything here is total: no input makes these functions fail or panic.

use chardetng::EncodingDetector;
use std::borrow::Cow;

/// Cleans text for embedding in a request payload.
///
/// Strips control characters (keeping `\n` and `\t`) and byte-order marks,
/// then trims surrounding whitespace. Idempotent.
pub fn sanitize(text: &str) -> String {
    let cleaned: String = text.chars().filter(|c| is_kept(*c)).collect();
    cleaned.trim().to_string()
}

/// Decodes raw bytes and sanitizes the result.
pub fn sanitize_bytes(bytes: &[u8]) -> String {
    sanitize(&decode_lossless_or_detect(bytes))
}

/// Decodes bytes as UTF-8, falling back to encoding detection.
///
/// Valid UTF-8 is borrowed unchanged. Anything else is run through charset
/// detection and decoded with the guessed encoding; unmappable sequences
/// become U+FFFD.
pub fn decode_lossless_or_detect(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            let encoding = detector.guess(None, false);
            let (decoded, _, _) = encoding.decode(bytes);
            Cow::Owned(decoded.into_owned())
        }
    }
}

/// Truncates to at most `max_chars` characters and re-trims the tail.
///
/// Works on characters, so a multi-byte sequence is never split.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].trim_end().to_string(),
        None => text.to_string(),
    }
}

fn is_kept(c: char) -> bool {
    if c == '\n' || c == '\t' {
        return true;
    }
    !c.is_control() && c != '\u{feff}'
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_null_and_control_bytes() {
        assert_eq!(sanitize("gr\0eat\u{7}\u{1b} product"), "great product");
    }

    #[test]
    fn keeps_newlines_and_tabs_inside_text() {
        assert_eq!(sanitize("  line one\n\tline two  "), "line one\n\tline two");
    }

    #[test]
    fn strips_byte_order_mark() {
        assert_eq!(sanitize("\u{feff}Hello"), "Hello");
    }

    #[test]
    fn valid_utf8_bytes_are_kept_verbatim() {
        let text = "Très bien, 五つ星";
        assert_eq!(sanitize_bytes(text.as_bytes()), text);
    }

    #[test]
    fn legacy_encoded_bytes_are_redecoded() {
        let text = "Très bon produit, la qualité est élevée et le café était déjà prêt à boire.";
        let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(text);
        assert!(std::str::from_utf8(&bytes).is_err());

        assert_eq!(sanitize_bytes(&bytes), text);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "ééééé";
        assert_eq!(truncate_chars(text, 3), "ééé");
        assert_eq!(truncate_chars(text, 10), text);
    }

    #[test]
    fn truncate_trims_trailing_whitespace_at_cut() {
        assert_eq!(truncate_chars("abc def", 4), "abc");
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(text in any::<String>()) {
            let once = sanitize(&text);
            prop_assert_eq!(sanitize(&once), once);
        }

        #[test]
        fn sanitize_bytes_never_panics_and_is_stable(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let once = sanitize_bytes(&bytes);
            prop_assert_eq!(sanitize(&once), once.clone());
            prop_assert!(!once.contains('\0'));
        }

        #[test]
        fn truncate_never_exceeds_limit(text in any::<String>(), max in 0usize..64) {
            prop_assert!(truncate_chars(&text, max).chars().count() <= max);
        }
    }
}
