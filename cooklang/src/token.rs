use std::fmt;
use std::ops::Range;

/// Lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    /// Hard lexical failure (malformed or unterminated front matter).
    Illegal,
    Newline,
    Whitespace,
    Ident,
    Int,
    /// Any other single character, absorbed into text by the parser.
    Text,

    // Punctuation
    Section,   // = (not at line start)
    Dash,      // -
    Percent,   // %
    Period,    // .
    Slash,     // /
    Semicolon, // ;
    Comma,     // ,
    Question,  // ?
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }

    // Directives
    At,    // @ ingredient
    Hash,  // # cookware
    Tilde, // ~ timer

    // Content-bearing blocks
    FrontMatter,
    LineComment,
    BlockComment,
    Note,
    Metadata,
    SectionHeader,
}

/// Single-character glyphs and the kind they lex to when no
/// position-sensitive rule claims them first.
pub const GLYPHS: &[(char, TokenKind)] = &[
    ('=', TokenKind::Section),
    ('-', TokenKind::Dash),
    ('%', TokenKind::Percent),
    ('.', TokenKind::Period),
    ('/', TokenKind::Slash),
    (';', TokenKind::Semicolon),
    (',', TokenKind::Comma),
    ('?', TokenKind::Question),
    ('(', TokenKind::LParen),
    (')', TokenKind::RParen),
    ('{', TokenKind::LBrace),
    ('}', TokenKind::RBrace),
    ('@', TokenKind::At),
    ('#', TokenKind::Hash),
    ('~', TokenKind::Tilde),
];

/// Look up the kind of a single punctuation or directive glyph.
pub fn glyph_kind(c: char) -> Option<TokenKind> {
    GLYPHS
        .iter()
        .find(|(glyph, _)| *glyph == c)
        .map(|(_, kind)| *kind)
}

impl TokenKind {
    /// Directive markers that open an ingredient, cookware or timer.
    pub fn is_directive(self) -> bool {
        matches!(self, TokenKind::At | TokenKind::Hash | TokenKind::Tilde)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Eof => "end of file",
            TokenKind::Illegal => "illegal input",
            TokenKind::Newline => "line break",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Ident => "identifier",
            TokenKind::Int => "integer",
            TokenKind::Text => "text",
            TokenKind::Section => "`=`",
            TokenKind::Dash => "`-`",
            TokenKind::Percent => "`%`",
            TokenKind::Period => "`.`",
            TokenKind::Slash => "`/`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Comma => "`,`",
            TokenKind::Question => "`?`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::At => "`@`",
            TokenKind::Hash => "`#`",
            TokenKind::Tilde => "`~`",
            TokenKind::FrontMatter => "front matter",
            TokenKind::LineComment => "line comment",
            TokenKind::BlockComment => "block comment",
            TokenKind::Note => "note",
            TokenKind::Metadata => "metadata line",
            TokenKind::SectionHeader => "section header",
        };
        f.write_str(name)
    }
}

/// A lexed token: its kind, literal text and byte span in the source.
///
/// The literal is the matched source text except for block constructs,
/// where it holds the normalized content (comment body, merged note,
/// header name, front-matter interior) and for line breaks, which are
/// always `"\n"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub span: Range<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Range<usize>) -> Self {
        Token {
            kind,
            literal: literal.into(),
            span,
        }
    }

    pub fn eof(offset: usize) -> Self {
        Token::new(TokenKind::Eof, "", offset..offset)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
