use std::mem;
use std::ops::Range;

use log::{debug, trace};

use crate::document::{Component, Document, Section, Step};
use crate::lexer::Lexer;
use crate::lexer::chars::is_horizontal_whitespace;
use crate::metadata::Metadata;
use crate::parser::error::{ParseError, ParseErrorKind};
use crate::token::{Token, TokenKind};

/// Front-matter key holding the declared language version.
const SPEC_VERSION_KEY: &str = "spec";

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn build_document(source: &str, file_id: usize) -> Result<Document, ParseError> {
    let mut lexer = Lexer::new(source);
    let mut state = BuildState::new(file_id);
    state.process(&mut lexer)?;
    Ok(state.finalize())
}

// ---------------------------------------------------------------------------
// Build state
// ---------------------------------------------------------------------------

struct BuildState {
    file_id: usize,
    /// Completed sections.
    sections: Vec<Section>,
    metadata: Metadata,
    spec_version: Option<String>,
    /// Section receiving steps and notes.
    section: Section,
    /// Components of the step being built.
    components: Vec<Component>,
    /// Running text, flushed into a Text component at boundaries.
    text: String,
    /// True at the start of a step or line; leading whitespace is dropped.
    skip_whitespace: bool,
}

/// Contents of a `{...}` directive suffix.
struct Amount {
    quantity: String,
    unit: String,
    raw: String,
}

impl BuildState {
    fn new(file_id: usize) -> Self {
        BuildState {
            file_id,
            sections: Vec::new(),
            metadata: Metadata::new(),
            spec_version: None,
            section: Section::default(),
            components: Vec::new(),
            text: String::new(),
            skip_whitespace: true,
        }
    }

    fn process(&mut self, lexer: &mut Lexer<'_>) -> Result<(), ParseError> {
        loop {
            let token = lexer.next_token();
            match token.kind {
                TokenKind::Eof => return Ok(()),

                TokenKind::Illegal => return Err(self.illegal(&token)),

                TokenKind::FrontMatter => self.front_matter(&token)?,

                TokenKind::SectionHeader => {
                    self.close_step();
                    self.close_section();
                    self.section = Section::named(token.literal);
                }

                kind if kind.is_directive() => {
                    self.flush_text();
                    let component = self.parse_directive(&token, lexer)?;
                    trace!("{} at {:?}", component.kind(), token.span);
                    self.components.push(component);
                    self.skip_whitespace = false;
                }

                TokenKind::Newline => self.newline(lexer),

                TokenKind::LineComment => self.trim_text_end(),

                TokenKind::BlockComment => {}

                TokenKind::Note => {
                    self.close_step();
                    self.section.notes.push(token.literal);
                }

                TokenKind::Metadata => self.metadata_line(&token, lexer.source()),

                TokenKind::Whitespace if self.skip_whitespace => {}

                _ => self.push_text(&token.literal),
            }
        }
    }

    fn finalize(mut self) -> Document {
        self.close_step();
        self.close_section();
        debug!(
            "document built: {} sections, {} metadata keys",
            self.sections.len(),
            self.metadata.len()
        );
        Document {
            sections: self.sections,
            metadata: self.metadata,
            spec_version: self.spec_version,
        }
    }

    // ------------------------------------------------------------------
    // Steps, sections and text
    // ------------------------------------------------------------------

    fn push_text(&mut self, s: &str) {
        self.text.push_str(s);
        self.skip_whitespace = false;
    }

    fn trim_text_end(&mut self) {
        let trimmed = self.text.trim_end_matches(is_horizontal_whitespace).len();
        self.text.truncate(trimmed);
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let value = mem::take(&mut self.text);
            self.components.push(Component::text(value));
        }
    }

    fn has_content(&self) -> bool {
        !self.text.is_empty() || !self.components.is_empty()
    }

    fn close_step(&mut self) {
        self.trim_text_end();
        self.flush_text();
        if !self.components.is_empty() {
            let components = mem::take(&mut self.components);
            self.section.steps.push(Step { components });
        }
        self.skip_whitespace = true;
    }

    /// Keep the section if it has content or was opened by a header.
    fn close_section(&mut self) {
        let section = mem::take(&mut self.section);
        if !section.is_empty() || section.name.is_some() {
            debug!(
                "section {:?} closed with {} steps",
                section.name,
                section.steps.len()
            );
            self.sections.push(section);
        }
    }

    /// A blank line (two or more breaks, possibly with only whitespace
    /// between them) ends the step; a single break joins the lines with
    /// one space.
    fn newline(&mut self, lexer: &mut Lexer<'_>) {
        let mut breaks = 1;
        loop {
            let next = lexer.next_token();
            match next.kind {
                TokenKind::Newline => breaks += 1,
                TokenKind::Whitespace if lexer.peek_token().is(TokenKind::Newline) => {}
                _ => {
                    lexer.put_back(next);
                    break;
                }
            }
        }
        if breaks > 1 {
            self.close_step();
            return;
        }
        self.trim_text_end();
        if self.has_content() && !lexer.peek_token().is(TokenKind::Eof) {
            self.text.push(' ');
        }
        self.skip_whitespace = true;
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    fn front_matter(&mut self, token: &Token) -> Result<(), ParseError> {
        self.metadata.merge_yaml(&token.literal).map_err(|e| {
            self.error(ParseErrorKind::Metadata, e.to_string(), token.span.clone())
        })?;
        self.spec_version = self
            .metadata
            .get(SPEC_VERSION_KEY)
            .map(ToString::to_string);
        debug!("front matter merged: {} keys", self.metadata.len());
        Ok(())
    }

    /// `>> key: value`. Without a colon the line stays in the step text.
    fn metadata_line(&mut self, token: &Token, source: &str) {
        match token.literal.split_once(':') {
            Some((key, value)) => {
                let key = key.trim();
                debug!("metadata line sets {key:?}");
                self.metadata.insert(key, value.trim());
                if key == SPEC_VERSION_KEY {
                    self.spec_version = Some(value.trim().to_string());
                }
            }
            None => self.push_text(&source[token.span.clone()]),
        }
    }

    // ------------------------------------------------------------------
    // Directives
    // ------------------------------------------------------------------

    /// Parse `@name`, `@multi word name{...}`, `#name{...}`, `~{...}`.
    ///
    /// Without braces only the first word is the name; the other words
    /// collected while looking for a `{` go back to the lexer as text.
    fn parse_directive(
        &mut self,
        marker: &Token,
        lexer: &mut Lexer<'_>,
    ) -> Result<Component, ParseError> {
        let mut optional = false;
        if marker.is(TokenKind::At) && lexer.peek_token().is(TokenKind::Question) {
            lexer.next_token();
            optional = true;
        }

        let mut words: Vec<Token> = Vec::new();
        loop {
            let token = lexer.next_token();
            match token.kind {
                TokenKind::Ident | TokenKind::Int | TokenKind::Whitespace | TokenKind::Dash => {
                    words.push(token);
                }
                TokenKind::LBrace => {
                    let name: String = words.iter().map(|t| t.literal.as_str()).collect();
                    let amount = self.parse_amount(marker, &token, lexer)?;
                    return Ok(make_component(marker.kind, name.trim(), amount, optional));
                }
                _ => {
                    lexer.put_back(token);
                    break;
                }
            }
        }

        let mut words = words.into_iter();
        let name = words.next().map(|t| t.literal).unwrap_or_default();
        for token in words.rev() {
            lexer.put_back(token);
        }
        let amount = Amount {
            quantity: String::new(),
            unit: String::new(),
            raw: String::new(),
        };
        Ok(make_component(marker.kind, &name, amount, optional))
    }

    /// Everything up to `}`; the first `%` separates quantity and unit.
    fn parse_amount(
        &self,
        marker: &Token,
        open: &Token,
        lexer: &mut Lexer<'_>,
    ) -> Result<Amount, ParseError> {
        let mut quantity = String::new();
        let mut unit = String::new();
        let mut raw = String::new();
        let mut in_unit = false;

        loop {
            let token = lexer.next_token();
            match token.kind {
                TokenKind::RBrace => break,
                TokenKind::Newline | TokenKind::Eof | TokenKind::LBrace => {
                    return Err(self.unclosed_brace(marker, open, &token));
                }
                TokenKind::LineComment | TokenKind::BlockComment => {}
                TokenKind::Percent if !in_unit => {
                    in_unit = true;
                    raw.push_str(&token.literal);
                }
                _ => {
                    if in_unit {
                        unit.push_str(&token.literal);
                    } else {
                        quantity.push_str(&token.literal);
                    }
                    raw.push_str(&token.literal);
                }
            }
        }

        Ok(Amount {
            quantity: quantity.trim().to_string(),
            unit: unit.trim().to_string(),
            raw: raw.trim().to_string(),
        })
    }

    // ------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------

    fn error(&self, kind: ParseErrorKind, message: impl Into<String>, span: Range<usize>) -> ParseError {
        ParseError::new(kind, message, span, self.file_id)
    }

    fn illegal(&self, token: &Token) -> ParseError {
        if token.literal.contains(['\n', '\r']) {
            self.error(
                ParseErrorKind::Lexical,
                "unterminated front matter",
                token.span.clone(),
            )
            .with_note("close the front matter with a line containing only `---`")
        } else {
            self.error(
                ParseErrorKind::Lexical,
                "malformed front matter opening",
                token.span.clone(),
            )
            .with_note("the opening `---` must be followed by a line break")
        }
    }

    fn unclosed_brace(&self, marker: &Token, open: &Token, found: &Token) -> ParseError {
        let what = match marker.kind {
            TokenKind::At => "ingredient",
            TokenKind::Hash => "cookware",
            _ => "timer",
        };
        self.error(
            ParseErrorKind::Structural,
            format!("unclosed `{{` in {what}, found {}", found.kind),
            marker.span.start..found.span.start.max(open.span.end),
        )
        .with_note("add a closing `}` on the same line")
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_component(marker: TokenKind, name: &str, amount: Amount, optional: bool) -> Component {
    match marker {
        TokenKind::At => Component::Ingredient {
            name: name.to_string(),
            quantity: amount.quantity,
            unit: amount.unit,
            optional,
        },
        TokenKind::Hash => Component::cookware(name, amount.raw),
        _ => Component::timer(name, amount.quantity, amount.unit),
    }
}
