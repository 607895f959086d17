pub mod error;
mod builder;

pub use error::{ParseError, ParseErrorKind};

use crate::document::Document;

/// Parser entry point. Holds no state between calls; each parse owns its
/// own lexer and builder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    file_id: usize,
}

impl Parser {
    pub fn new() -> Self {
        Parser::default()
    }

    /// Stamp errors with a codespan-reporting file id.
    pub fn with_file_id(file_id: usize) -> Self {
        Parser { file_id }
    }

    /// Parse a complete recipe into a [`Document`]. Either the whole
    /// document or a single error is returned.
    pub fn parse_string(&self, source: &str) -> Result<Document, ParseError> {
        builder::build_document(source, self.file_id)
    }
}
