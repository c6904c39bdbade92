//! Facade from query text to patterns
//!
//! These functions run the whole pipeline: tokenize, parse into
//! [`Operation`]s, replay them onto a fresh [`Builder`] and compile.

use crate::builder::{Builder, Flags};
use crate::error::Result;
use crate::lexer::tokenize;
use crate::parser::parse;
use crate::pattern::Pattern;

/// Parse a query and replay it onto a new builder
pub fn builder_from(source: &str) -> Result<Builder> {
    let operations = parse(source)?;
    log::debug!("replaying {} operations", operations.len());

    let mut builder = Builder::new();
    builder.replay(&operations)?;
    Ok(builder)
}

/// Compile a query into a pattern
///
/// # Example
/// ```
/// let pattern = srl::compile("digit exactly 2 times").unwrap();
/// assert_eq!(pattern.as_str(), "[0-9]{2}");
/// assert!(pattern.matches("000").unwrap());
/// ```
pub fn compile(source: &str) -> Result<Pattern> {
    builder_from(source)?.compile()
}

/// Convert a query into its pattern string
///
/// Flags are not part of the string; use [`compile`] or
/// [`transpile_debug`] to get them.
///
/// # Example
/// ```
/// use srl::transpile;
///
/// let result = transpile("capture (letter once or more) as \"word\"").unwrap();
/// assert_eq!(result, "(?P<word>[a-z]+)");
/// ```
pub fn transpile(source: &str) -> Result<String> {
    Ok(builder_from(source)?.get())
}

/// Transpile with verbose output for debugging
pub fn transpile_debug(source: &str) -> Result<TranspileResult> {
    let tokens = tokenize(source)?;
    let operations = parse(source)?;

    let mut builder = Builder::new();
    builder.replay(&operations)?;

    Ok(TranspileResult {
        input: source.to_string(),
        tokens: tokens.iter().map(ToString::to_string).collect(),
        operations: operations.iter().map(ToString::to_string).collect(),
        output: builder.get(),
        flags: builder.flags(),
    })
}

/// Result of a transpilation with debug information
#[derive(Debug, Clone)]
pub struct TranspileResult {
    /// The original query
    pub input: String,
    /// The tokens, as displayed
    pub tokens: Vec<String>,
    /// The parsed operations, in normalized query form
    pub operations: Vec<String>,
    /// The assembled pattern
    pub output: String,
    pub flags: Flags,
}

impl TranspileResult {
    /// Print a formatted report of the transpilation
    pub fn report(&self) {
        println!("Transpilation Report");
        println!("====================");
        println!("Input:      {}", self.input);
        println!("Tokens:     {}", self.tokens.join(" "));
        println!("Operations: {}", self.operations.join(" "));
        println!("Output:     {}", self.output);
        if !self.flags.is_empty() {
            println!("Flags:      {}", self.flags);
        }
    }

    /// The operations rendered back into a single query
    pub fn normalized(&self) -> String {
        self.operations.join(" ")
    }
}
