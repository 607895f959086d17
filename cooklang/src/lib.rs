//! Lexer and parser for Cooklang recipe markup.
//!
//! ```text
//! Cook the @shrimp{1} for ~{3%minutes} in a #pot
//! ```
//!
//! parses into a [`Document`] with one step made of text, ingredient, timer
//! and cookware components. Use [`parse`] for a one-off parse or a
//! [`Parser`] when errors should carry a codespan file id.

pub mod document;
pub mod lexer;
pub mod metadata;
pub mod parser;
pub mod token;

pub use document::{Component, Document, Section, Step};
pub use lexer::Lexer;
pub use metadata::{Metadata, MetadataValue};
pub use parser::{ParseError, ParseErrorKind, Parser};
pub use token::{Token, TokenKind};

/// Parse a complete recipe with a default [`Parser`].
pub fn parse(source: &str) -> Result<Document, ParseError> {
    Parser::new().parse_string(source)
}
