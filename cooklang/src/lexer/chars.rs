//! Character classes used by the lexer.
//!
//! Identifiers admit letters, digits and symbols (emoji included) so that
//! names like `7-inch pan` or `🧂` survive as single words. The directive
//! and section glyphs are never identifier characters. Multi-code-point
//! sequences (ZWJ emoji, combining marks) are kept whole by walking
//! grapheme clusters in the lexer; only their leading char is classified
//! here.

use unicode_general_category::{GeneralCategory, get_general_category};

/// Glyphs that keep their directive / section meaning everywhere.
pub const RESERVED: [char; 4] = ['@', '#', '~', '='];

/// Byte order mark, skipped at the start of a document.
pub const BYTE_ORDER_MARK: char = '\u{FEFF}';

pub fn is_reserved(c: char) -> bool {
    RESERVED.contains(&c)
}

/// Space, tab and the other non-line-break whitespace characters.
pub fn is_horizontal_whitespace(c: char) -> bool {
    c.is_whitespace() && !is_line_break(c)
}

pub fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Unicode symbol categories: Sm, Sc, Sk, So.
pub fn is_symbol(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::MathSymbol
            | GeneralCategory::CurrencySymbol
            | GeneralCategory::ModifierSymbol
            | GeneralCategory::OtherSymbol
    )
}

pub fn is_ident_start(c: char) -> bool {
    c.is_alphanumeric() || (is_symbol(c) && !is_reserved(c))
}

/// Hyphens continue an identifier; the lexer stops before a `--` pair.
pub fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_digits_and_emoji_start_identifiers() {
        for c in ['a', 'Z', 'é', 'ß', '7', '½', '🧂', '🍅', '€', '°', '$', '+', '^'] {
            assert!(is_ident_start(c), "{c:?} should start an identifier");
        }
    }

    #[test]
    fn reserved_glyphs_never_start_identifiers() {
        for c in RESERVED {
            assert!(!is_ident_start(c));
            assert!(!is_ident_continue(c));
        }
    }

    #[test]
    fn punctuation_is_not_identifier() {
        for c in [
            '.', ',', '{', '}', '%', '(', '!', '¿', '…', '“', ' ', '\t', '\u{060C}', '\u{0964}',
            '\u{3001}', '「',
        ] {
            assert!(!is_ident_start(c), "{c:?} should not start an identifier");
            assert!(!is_ident_continue(c), "{c:?} should not continue an identifier");
        }
    }

    #[test]
    fn format_characters_are_not_identifier() {
        for c in [BYTE_ORDER_MARK, '\u{200D}', '\u{200B}'] {
            assert!(!is_ident_start(c), "{c:?}");
        }
    }

    #[test]
    fn hyphen_only_continues() {
        assert!(!is_ident_start('-'));
        assert!(is_ident_continue('-'));
    }

    #[test]
    fn line_breaks_are_not_horizontal_whitespace() {
        assert!(is_horizontal_whitespace(' '));
        assert!(is_horizontal_whitespace('\t'));
        assert!(is_horizontal_whitespace('\u{00A0}'));
        assert!(!is_horizontal_whitespace('\n'));
        assert!(!is_horizontal_whitespace('\r'));
    }
}
