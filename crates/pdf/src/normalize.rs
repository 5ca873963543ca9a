use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(char, &str); 5] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
];

/// Normalize the text of a single fragment.
///
/// NFC composition, ligature expansion and removal of the Unicode
/// replacement character left behind by lossy font decoding. Whitespace is
/// left untouched: spacing between fragments is decided by line assembly.
pub fn normalize_fragment_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for ch in text.nfc() {
        match LIGATURES.iter().find(|(lig, _)| *lig == ch) {
            Some((_, expanded)) => out.push_str(expanded),
            None if ch == '\u{FFFD}' => {}
            None => out.push(ch),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough() {
        assert_eq!(normalize_fragment_text("NOT GIVEN"), "NOT GIVEN");
    }

    #[test]
    fn expands_ligatures() {
        assert_eq!(normalize_fragment_text("\u{FB01}nd"), "find");
        assert_eq!(normalize_fragment_text("a\u{FB04}uent"), "affluent");
    }

    #[test]
    fn drops_replacement_char() {
        assert_eq!(normalize_fragment_text("Hello\u{FFFD}World"), "HelloWorld");
    }

    #[test]
    fn composes_combining_marks() {
        assert_eq!(normalize_fragment_text("cafe\u{0301}"), "caf\u{00E9}");
    }

    #[test]
    fn keeps_inner_spacing() {
        assert_eq!(normalize_fragment_text("  a  b "), "  a  b ");
    }
}
