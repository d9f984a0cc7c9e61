//! Error types for label parsing.

use thiserror::Error;

/// Result type for label parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Format a location suffix for error messages.
    ///
    /// `line` and `col` are zero-based; the message shows them one-based.
    pub fn loc_suffix(&self, line: usize, col: usize) -> String {
        match &self.filename {
            Some(name) => format!(" at {}:{} of <{}>", line + 1, col + 1, name),
            None => format!(" at {}:{}", line + 1, col + 1),
        }
    }
}

/// Error type for label parsing.
///
/// Any of these aborts the whole parse; there is no partial result.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Seeking or reading the backing source failed.
    #[error("I/O error while reading label: {0}")]
    Io(#[from] std::io::Error),

    /// End of input before the closing `"` or `'`.
    #[error("Unterminated quoted string{0}")]
    UnterminatedQuote(String),

    /// A closing `)`/`}` that does not match the open bracket, or a list
    /// still open at end of input.
    #[error("Unbalanced bracket{0}")]
    UnbalancedBracket(String),

    /// A unit annotation opened with `<` but never closed with `>`.
    #[error("Unmatched angle bracket{0}")]
    UnmatchedAngle(String),

    /// A keyword not followed by `=`.
    #[error("Expected \"=\" after \"{0}\"{1}")]
    MissingAssignment(String, String),

    /// Input ran out while a GROUP/OBJECT (or the label itself) was open.
    #[error("Unexpected end of label{0}")]
    UnexpectedEof(String),

    /// Unexpected character.
    #[error("Unexpected character \"{0}\"{1}")]
    UnexpectedChar(char, String),

    /// GROUP/OBJECT nesting deeper than the configured limit.
    #[error("Nesting deeper than {0} levels{1}")]
    DepthExceeded(usize, String),

    /// A reader parses exactly one label.
    #[error("Label already ingested")]
    AlreadyIngested,
}

impl ParseError {
    /// Create an error with location information.
    pub fn with_location(self, ctx: &ParseContext, line: usize, col: usize) -> Self {
        let suffix = ctx.loc_suffix(line, col);
        match self {
            ParseError::UnterminatedQuote(_) => ParseError::UnterminatedQuote(suffix),
            ParseError::UnbalancedBracket(_) => ParseError::UnbalancedBracket(suffix),
            ParseError::UnmatchedAngle(_) => ParseError::UnmatchedAngle(suffix),
            ParseError::MissingAssignment(name, _) => ParseError::MissingAssignment(name, suffix),
            ParseError::UnexpectedEof(_) => ParseError::UnexpectedEof(suffix),
            ParseError::UnexpectedChar(c, _) => ParseError::UnexpectedChar(c, suffix),
            ParseError::DepthExceeded(depth, _) => ParseError::DepthExceeded(depth, suffix),
            other @ (ParseError::Io(_) | ParseError::AlreadyIngested) => other,
        }
    }
}
