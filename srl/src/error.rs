//! Error types for query compilation and matching
//!
//! Errors are categorized by the stage that raised them: lexing the query
//! text, parsing the token stream, assembling the pattern, compiling it
//! with the regex engine, or running it against input.

use thiserror::Error;

use crate::replace::ReplacementError;

/// The main error type for SRL
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegexError {
    /// Errors that occur during lexing/tokenization
    #[error("lexer error at position {position}: {kind}")]
    Lex {
        /// Position in the input where the error occurred
        position: usize,
        /// The specific kind of lexer error
        kind: LexErrorKind,
    },

    /// The token stream matched no grammar production
    #[error("grammar error: {0}")]
    Grammar(#[from] ParseError),

    /// A lazy modifier was applied to something that is not quantified
    #[error("lazy modifier requires a preceding quantifier, found `{fragment}`")]
    LazyMisuse {
        /// The rendered fragment the modifier was applied to
        fragment: String,
    },

    /// The assembled pattern was rejected by the regex engine
    #[error("compilation error: {0}")]
    Compile(String),

    /// The regex engine gave up while matching (e.g. backtrack limit)
    #[error("runtime error: {0}")]
    Runtime(String),

    /// A replacement template could not be applied
    #[error("replacement error: {0}")]
    Replacement(#[from] ReplacementError),
}

/// Specific kinds of lexer errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexErrorKind {
    /// Encountered a character no token rule accepts
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    /// A quoted string was not closed before the end of input
    #[error("unterminated string literal")]
    UnterminatedString,

    /// A number does not fit in a repetition count
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

/// Errors that occur during parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Unexpected token encountered
    #[error("expected {expected}, found {found} at position {position}")]
    UnexpectedToken {
        /// What was expected
        expected: String,
        /// What was actually found
        found: String,
        /// Where the offending token starts
        position: usize,
    },

    /// Unexpected end of input
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// What was expected
        expected: String,
    },
}

/// A span representing a location in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start position (inclusive)
    pub start: usize,
    /// End position (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

impl From<fancy_regex::Error> for RegexError {
    fn from(err: fancy_regex::Error) -> Self {
        match err {
            fancy_regex::Error::RuntimeError(inner) => RegexError::Runtime(inner.to_string()),
            other => RegexError::Compile(other.to_string()),
        }
    }
}

/// Result type alias for SRL operations
pub type Result<T> = std::result::Result<T, RegexError>;
