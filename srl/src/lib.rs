//! SRL Library
//!
//! Builds regular expressions from readable queries like
//! `begin with, literally "+", digit between 1 and 3 times, must end`,
//! or from the equivalent [`Builder`] method chain, and matches them with
//! `fancy_regex`.

pub mod builder;
pub mod error;
pub mod lexer;
pub mod operation;
pub mod parser;
pub mod pattern;
pub mod replace;
pub mod transpiler;

pub use builder::{Builder, Flags, GroupTemplate, SubExpression};
pub use error::{LexErrorKind, ParseError, RegexError, Result, Span};
pub use lexer::{Keyword, Lexer, Token, TokenKind, tokenize};
pub use operation::Operation;
pub use parser::{Parser, parse};
pub use pattern::{Match, Pattern};
pub use replace::{Replacement, ReplacementError, ReplacementPart, Replacer};
pub use transpiler::{TranspileResult, builder_from, compile, transpile, transpile_debug};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end() {
        // query -> tokens -> operations -> pattern -> match
        let query = r#"begin with, capture (letter once or more) as "word", must end"#;
        let pattern = compile(query).unwrap();
        assert_eq!(pattern.as_str(), "^(?P<word>[a-z]+)$");

        let m = pattern.match_at_start("hello").unwrap().unwrap();
        assert_eq!(m.named_group_str("hello", "word"), Some("hello"));
    }

    #[test]
    fn test_query_and_chain_agree() {
        let parsed = builder_from("letter, digit optional").unwrap();

        let mut chained = Builder::new();
        chained.letter().digit().optional();

        assert_eq!(parsed.get(), chained.get());
        assert_eq!(parsed.flags(), chained.flags());
    }
}
