//! Pull-based lexer over recipe source text.
//!
//! Most characters lex through a plain single-character switch, but a few
//! constructs depend on where they appear: front matter only at offset 0,
//! section headers and notes only at the start of a line, and line
//! comments only at the start of a line or after whitespace. The cursor
//! therefore remembers the previously consumed character.

pub mod chars;

use std::ops::Range;

use log::trace;
use unicode_segmentation::UnicodeSegmentation;

use crate::lexer::chars::{
    BYTE_ORDER_MARK, is_horizontal_whitespace, is_ident_continue, is_ident_start, is_line_break,
};
use crate::token::{Token, TokenKind, glyph_kind};

const FRONT_MATTER_DELIMITER: &str = "---";

/// Cursor state. `Copy` so that peeking is a snapshot and restore.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    offset: usize,
    prev: Option<char>,
    at_document_start: bool,
}

pub struct Lexer<'a> {
    source: &'a str,
    cursor: Cursor,
    pushback: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            cursor: Cursor {
                offset: 0,
                prev: None,
                at_document_start: true,
            },
            pushback: Vec::new(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Return and consume the next token. Pushed-back tokens come first;
    /// once input is exhausted `Eof` is returned forever.
    pub fn next_token(&mut self) -> Token {
        if let Some(token) = self.pushback.pop() {
            return token;
        }
        self.lex_token()
    }

    /// Return the next token without consuming it.
    pub fn peek_token(&mut self) -> Token {
        if let Some(token) = self.pushback.last() {
            return token.clone();
        }
        let saved = self.cursor;
        let token = self.lex_token();
        self.cursor = saved;
        token
    }

    /// Push a previously read token back; it is returned by the next call
    /// to [`Lexer::next_token`]. Several tokens may be stacked.
    pub fn put_back(&mut self, token: Token) {
        self.pushback.push(token);
    }

    // ------------------------------------------------------------------
    // Cursor primitives
    // ------------------------------------------------------------------

    fn rest(&self) -> &'a str {
        &self.source[self.cursor.offset..]
    }

    fn current(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn char_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.current()?;
        self.cursor.offset += c.len_utf8();
        self.cursor.prev = Some(c);
        Some(c)
    }

    fn bump_str(&mut self, s: &str) {
        for _ in s.chars() {
            self.bump();
        }
    }

    fn at_line_start(&self) -> bool {
        self.cursor.prev.is_none_or(is_line_break)
    }

    fn after_whitespace(&self) -> bool {
        self.cursor.prev.is_some_and(is_horizontal_whitespace)
    }

    fn eat_horizontal_whitespace(&mut self) {
        while self.current().is_some_and(is_horizontal_whitespace) {
            self.bump();
        }
    }

    /// Consume one line break (`\n`, `\r\n` or `\r`). Returns false if the
    /// cursor is not on a line break.
    fn eat_line_break(&mut self) -> bool {
        match self.current() {
            Some('\n') => {
                self.bump();
                true
            }
            Some('\r') => {
                self.bump();
                if self.current() == Some('\n') {
                    self.bump();
                }
                true
            }
            _ => false,
        }
    }

    /// Consume up to (not including) the next line break.
    fn take_line(&mut self) -> &'a str {
        let start = self.cursor.offset;
        while self.current().is_some_and(|c| !is_line_break(c)) {
            self.bump();
        }
        &self.source[start..self.cursor.offset]
    }

    fn span_from(&self, start: usize) -> Range<usize> {
        start..self.cursor.offset
    }

    fn token_from(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, &self.source[start..self.cursor.offset], self.span_from(start))
    }

    // ------------------------------------------------------------------
    // Token dispatch
    // ------------------------------------------------------------------

    fn lex_token(&mut self) -> Token {
        if self.cursor.at_document_start {
            self.cursor.at_document_start = false;
            // Leaves `prev` unset so the next char still starts a line.
            if self.current() == Some(BYTE_ORDER_MARK) {
                self.cursor.offset += BYTE_ORDER_MARK.len_utf8();
            }
            if self.rest().starts_with(FRONT_MATTER_DELIMITER) {
                return self.lex_front_matter();
            }
        }

        let start = self.cursor.offset;
        let Some(c) = self.current() else {
            return Token::eof(self.source.len());
        };

        match c {
            '\n' | '\r' => {
                self.eat_line_break();
                Token::new(TokenKind::Newline, "\n", self.span_from(start))
            }
            c if is_horizontal_whitespace(c) => {
                self.eat_horizontal_whitespace();
                self.token_from(TokenKind::Whitespace, start)
            }
            '-' if self.starts_line_comment() => self.lex_line_comment(),
            '[' if self.rest().starts_with("[-") => self.lex_block_comment(),
            '>' if self.at_line_start() => {
                if self.rest().starts_with(">>") {
                    self.lex_metadata_line()
                } else {
                    self.lex_note()
                }
            }
            '=' if self.at_line_start() => self.lex_section_header(),
            '@' | '#' | '~' => self.lex_directive(c),
            c if is_ident_start(c) => self.lex_ident(),
            c => {
                self.bump();
                let kind = glyph_kind(c).unwrap_or(TokenKind::Text);
                self.token_from(kind, start)
            }
        }
    }

    fn starts_line_comment(&self) -> bool {
        let rest = self.rest();
        rest.starts_with("--")
            && !rest.starts_with("---")
            && (self.at_line_start() || self.after_whitespace())
    }

    // ------------------------------------------------------------------
    // Block constructs
    // ------------------------------------------------------------------

    /// `---` at offset 0, a line break, the body, and a closing `---` line.
    fn lex_front_matter(&mut self) -> Token {
        let start = self.cursor.offset;
        self.bump_str(FRONT_MATTER_DELIMITER);
        self.eat_horizontal_whitespace();
        if !self.eat_line_break() {
            trace!("front matter opening at {start} not followed by a line break");
            return self.token_from(TokenKind::Illegal, start);
        }

        let body_start = self.cursor.offset;
        loop {
            if self.at_line_start() && self.at_closing_delimiter() {
                let body = &self.source[body_start..self.cursor.offset];
                self.bump_str(FRONT_MATTER_DELIMITER);
                self.eat_horizontal_whitespace();
                self.eat_line_break();
                trace!("front matter {:?}", self.span_from(start));
                return Token::new(
                    TokenKind::FrontMatter,
                    normalize_line_breaks(body),
                    self.span_from(start),
                );
            }
            if self.bump().is_none() {
                trace!("front matter starting at {start} is unterminated");
                return self.token_from(TokenKind::Illegal, start);
            }
        }
    }

    fn at_closing_delimiter(&self) -> bool {
        let Some(after) = self.rest().strip_prefix(FRONT_MATTER_DELIMITER) else {
            return false;
        };
        after
            .chars()
            .find(|c| !is_horizontal_whitespace(*c))
            .is_none_or(is_line_break)
    }

    fn lex_line_comment(&mut self) -> Token {
        let start = self.cursor.offset;
        self.bump_str("--");
        let content = self.take_line().trim();
        Token::new(TokenKind::LineComment, content, self.span_from(start))
    }

    /// `[- ... -]`, possibly spanning lines. Without a closing `-]` the
    /// bracket is plain text.
    fn lex_block_comment(&mut self) -> Token {
        let start = self.cursor.offset;
        let inner = &self.rest()[2..];
        let Some(end) = inner.find("-]") else {
            self.bump();
            return self.token_from(TokenKind::Text, start);
        };
        let content = inner[..end].trim();
        let consumed = &self.rest()[..2 + end + 2];
        self.bump_str(consumed);
        Token::new(TokenKind::BlockComment, content, self.span_from(start))
    }

    /// One or more consecutive `>` lines, merged with single spaces.
    fn lex_note(&mut self) -> Token {
        let start = self.cursor.offset;
        let mut lines = Vec::new();
        loop {
            self.bump();
            let line = self.take_line().trim();
            if !line.is_empty() {
                lines.push(line);
            }
            if !self.next_line_continues_note() {
                break;
            }
            self.eat_line_break();
        }
        trace!("note {:?} ({} lines)", self.span_from(start), lines.len());
        Token::new(TokenKind::Note, lines.join(" "), self.span_from(start))
    }

    fn next_line_continues_note(&self) -> bool {
        let rest = self.rest();
        let next_line = if let Some(r) = rest.strip_prefix("\r\n") {
            r
        } else if let Some(r) = rest.strip_prefix(['\n', '\r']) {
            r
        } else {
            return false;
        };
        next_line.starts_with('>') && !next_line.starts_with(">>")
    }

    /// `>> key: value`
    fn lex_metadata_line(&mut self) -> Token {
        let start = self.cursor.offset;
        self.bump_str(">>");
        let content = self.take_line().trim();
        Token::new(TokenKind::Metadata, content, self.span_from(start))
    }

    /// `= Name`, `== Name ==`, or a bare `=` run for an anonymous section.
    fn lex_section_header(&mut self) -> Token {
        let start = self.cursor.offset;
        while self.current() == Some('=') {
            self.bump();
        }
        let name = self.take_line().trim().trim_end_matches('=').trim_end();
        trace!("section header {name:?}");
        Token::new(TokenKind::SectionHeader, name, self.span_from(start))
    }

    // ------------------------------------------------------------------
    // Inline tokens
    // ------------------------------------------------------------------

    /// A directive glyph only counts when something can follow it: an
    /// identifier, `?` plus an identifier for optional ingredients, or a
    /// brace for anonymous timers. Otherwise it is plain text.
    fn lex_directive(&mut self, glyph: char) -> Token {
        let start = self.cursor.offset;
        let next = self.char_at(1);
        let opens = next.is_some_and(is_ident_start)
            || match glyph {
                '@' => next == Some('?') && self.char_at(2).is_some_and(is_ident_start),
                '~' => next == Some('{'),
                _ => false,
            };
        self.bump();
        let kind = if opens {
            glyph_kind(glyph).unwrap_or(TokenKind::Text)
        } else {
            TokenKind::Text
        };
        self.token_from(kind, start)
    }

    /// Walks grapheme clusters so ZWJ emoji and combining marks stay
    /// attached to the char that leads them.
    fn lex_ident(&mut self) -> Token {
        let start = self.cursor.offset;
        let mut all_digits = true;
        while let Some(grapheme) = self.rest().graphemes(true).next() {
            if self.rest().starts_with("--") {
                break;
            }
            if !grapheme.chars().next().is_some_and(is_ident_continue) {
                break;
            }
            all_digits &= grapheme.chars().all(|c| c.is_ascii_digit());
            self.bump_str(grapheme);
        }
        let kind = if all_digits {
            TokenKind::Int
        } else {
            TokenKind::Ident
        };
        self.token_from(kind, start)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        if token.is(TokenKind::Eof) {
            None
        } else {
            Some(token)
        }
    }
}

fn normalize_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
