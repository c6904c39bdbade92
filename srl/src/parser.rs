//! Parser for SRL queries
//!
//! This module provides a recursive descent parser that converts the
//! token stream into an ordered list of [`Operation`]s.
//!
//! Grammar:
//!   query      := expression* EOF
//!   expression := base suffix*
//!   base       := 'literally' STRING
//!              | 'one' 'of' STRING
//!              | 'uppercase'? 'letter' ('from' CHAR 'to' CHAR)?
//!              | ('digit' | 'number') ('from' NUM 'to' NUM)?
//!              | 'any' 'character' | 'no' 'character'
//!              | 'anything' | 'new' 'line' | 'tab'
//!              | 'whitespace' | 'no' 'whitespace'
//!              | 'raw' STRING
//!              | ('begin' | 'starts') 'with' | 'must' 'end'
//!              | 'case' 'insensitive' | 'multi' 'line'
//!              | 'capture' sub ('as' STRING)?
//!              | ('any' | 'either') 'of' sub
//!              | 'until' sub
//!              | 'if' 'not'? 'followed' 'by' sub
//!              | 'if' 'not'? 'already' 'had' sub
//!   suffix     := 'exactly' NUM 'times'
//!              | 'between' NUM 'and' NUM 'times'?
//!              | 'at' 'least' NUM 'times'?
//!              | 'once' 'or' 'more' | 'never' 'or' 'more' | 'optional'
//!              | 'lazy' | 'first' 'match'
//!   sub        := '(' expression* ')' | STRING

use crate::error::{ParseError, RegexError, Result};
use crate::lexer::{Keyword, Lexer, Token, TokenKind};
use crate::operation::Operation;

/// Parser for SRL queries
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given query
    pub fn new(input: &'a str) -> Result<Self> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Parser { lexer, current })
    }

    /// Advance to the next token, returning the one just consumed
    fn advance(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// Build an error for the current token
    fn unexpected(&self, expected: &str) -> RegexError {
        let err = match self.current.kind {
            TokenKind::Eof => ParseError::UnexpectedEof {
                expected: expected.to_string(),
            },
            _ => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: self.current.to_string(),
                position: self.current.position(),
            },
        };
        err.into()
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        self.current.kind == TokenKind::Keyword(keyword)
    }

    /// Consume the keyword if it is next
    fn eat_keyword(&mut self, keyword: Keyword) -> Result<bool> {
        if self.at_keyword(keyword) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Expect a specific keyword, error if not found
    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.eat_keyword(keyword)? {
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{}`", keyword)))
        }
    }

    fn expect_number(&mut self) -> Result<u32> {
        match self.current.kind {
            TokenKind::Number(n) => {
                self.advance()?;
                Ok(n)
            }
            _ => Err(self.unexpected("number")),
        }
    }

    fn expect_char(&mut self) -> Result<char> {
        match self.current.kind {
            TokenKind::Char(c) => {
                self.advance()?;
                Ok(c)
            }
            _ => Err(self.unexpected("character")),
        }
    }

    fn expect_string(&mut self) -> Result<String> {
        if let TokenKind::String(value) = &mut self.current.kind {
            let value = std::mem::take(value);
            self.advance()?;
            return Ok(value);
        }
        Err(self.unexpected("string"))
    }

    /// Parse the entire query and return its operations
    pub fn parse(&mut self) -> Result<Vec<Operation>> {
        let operations = self.parse_sequence()?;

        // Ensure we've consumed all tokens
        if self.current.kind != TokenKind::Eof {
            return Err(self.unexpected("end of query"));
        }

        Ok(operations)
    }

    /// Parse expressions until the end of input or a closing parenthesis
    fn parse_sequence(&mut self) -> Result<Vec<Operation>> {
        let mut operations = Vec::new();

        while !matches!(self.current.kind, TokenKind::Eof | TokenKind::RightParen) {
            operations.push(self.parse_base()?);
            while let Some(suffix) = self.parse_suffix()? {
                operations.push(suffix);
            }
        }

        Ok(operations)
    }

    /// Parse one base expression
    fn parse_base(&mut self) -> Result<Operation> {
        let keyword = match self.current.kind {
            TokenKind::Keyword(keyword) => keyword,
            _ => return Err(self.unexpected("expression")),
        };

        let operation = match keyword {
            Keyword::Literally => {
                self.advance()?;
                Operation::Literally(self.expect_string()?)
            }
            Keyword::One => {
                self.advance()?;
                self.expect_keyword(Keyword::Of)?;
                Operation::OneOf(self.expect_string()?)
            }
            Keyword::Letter => {
                self.advance()?;
                Operation::Letter(self.parse_char_range()?)
            }
            Keyword::Uppercase => {
                self.advance()?;
                self.expect_keyword(Keyword::Letter)?;
                Operation::UppercaseLetter(self.parse_char_range()?)
            }
            Keyword::Digit | Keyword::Number => {
                self.advance()?;
                Operation::Digit(self.parse_number_range()?)
            }
            Keyword::Any => {
                self.advance()?;
                if self.eat_keyword(Keyword::Character)? {
                    Operation::AnyCharacter
                } else if self.eat_keyword(Keyword::Of)? {
                    Operation::AnyOf(self.parse_sub()?)
                } else {
                    return Err(self.unexpected("`character` or `of`"));
                }
            }
            Keyword::No => {
                self.advance()?;
                if self.eat_keyword(Keyword::Character)? {
                    Operation::NoCharacter
                } else if self.eat_keyword(Keyword::Whitespace)? {
                    Operation::NoWhitespace
                } else {
                    return Err(self.unexpected("`character` or `whitespace`"));
                }
            }
            Keyword::Anything => {
                self.advance()?;
                Operation::Anything
            }
            Keyword::New => {
                self.advance()?;
                self.expect_keyword(Keyword::Line)?;
                Operation::NewLine
            }
            Keyword::Whitespace => {
                self.advance()?;
                Operation::Whitespace
            }
            Keyword::Tab => {
                self.advance()?;
                Operation::Tab
            }
            Keyword::Raw => {
                self.advance()?;
                Operation::Raw(self.expect_string()?)
            }
            Keyword::Begin | Keyword::Starts => {
                self.advance()?;
                self.expect_keyword(Keyword::With)?;
                Operation::BeginWith
            }
            Keyword::Must => {
                self.advance()?;
                self.expect_keyword(Keyword::End)?;
                Operation::MustEnd
            }
            Keyword::Case => {
                self.advance()?;
                self.expect_keyword(Keyword::Insensitive)?;
                Operation::CaseInsensitive
            }
            Keyword::Multi => {
                self.advance()?;
                self.expect_keyword(Keyword::Line)?;
                Operation::MultiLine
            }
            Keyword::Capture => {
                self.advance()?;
                let body = self.parse_sub()?;
                let name = if self.eat_keyword(Keyword::As)? {
                    Some(self.expect_string()?)
                } else {
                    None
                };
                Operation::Capture { body, name }
            }
            Keyword::Either => {
                self.advance()?;
                self.expect_keyword(Keyword::Of)?;
                Operation::AnyOf(self.parse_sub()?)
            }
            Keyword::Until => {
                self.advance()?;
                Operation::Until(self.parse_sub()?)
            }
            Keyword::If => {
                self.advance()?;
                self.parse_assertion()?
            }
            _ => return Err(self.unexpected("expression")),
        };

        Ok(operation)
    }

    /// Parse the rest of an `if ...` assertion
    fn parse_assertion(&mut self) -> Result<Operation> {
        let negated = self.eat_keyword(Keyword::Not)?;

        if self.eat_keyword(Keyword::Followed)? {
            self.expect_keyword(Keyword::By)?;
            let body = self.parse_sub()?;
            Ok(if negated {
                Operation::IfNotFollowedBy(body)
            } else {
                Operation::IfFollowedBy(body)
            })
        } else if self.eat_keyword(Keyword::Already)? {
            self.expect_keyword(Keyword::Had)?;
            let body = self.parse_sub()?;
            Ok(if negated {
                Operation::IfNotAlreadyHad(body)
            } else {
                Operation::IfAlreadyHad(body)
            })
        } else {
            Err(self.unexpected("`followed` or `already`"))
        }
    }

    /// Parse a quantifier or lazy suffix if present
    fn parse_suffix(&mut self) -> Result<Option<Operation>> {
        let keyword = match self.current.kind {
            TokenKind::Keyword(keyword) => keyword,
            _ => return Ok(None),
        };

        let operation = match keyword {
            Keyword::Exactly => {
                self.advance()?;
                let count = self.expect_number()?;
                self.expect_keyword(Keyword::Times)?;
                Operation::Exactly(count)
            }
            Keyword::Between => {
                self.advance()?;
                let min = self.expect_number()?;
                self.expect_keyword(Keyword::And)?;
                let max = self.expect_number()?;
                self.eat_keyword(Keyword::Times)?;
                Operation::Between(min, max)
            }
            Keyword::At => {
                self.advance()?;
                self.expect_keyword(Keyword::Least)?;
                let count = self.expect_number()?;
                self.eat_keyword(Keyword::Times)?;
                Operation::AtLeast(count)
            }
            Keyword::Once => {
                self.advance()?;
                self.expect_keyword(Keyword::Or)?;
                self.expect_keyword(Keyword::More)?;
                Operation::OnceOrMore
            }
            Keyword::Never => {
                self.advance()?;
                self.expect_keyword(Keyword::Or)?;
                self.expect_keyword(Keyword::More)?;
                Operation::NeverOrMore
            }
            Keyword::Optional => {
                self.advance()?;
                Operation::Optional
            }
            Keyword::Lazy => {
                self.advance()?;
                Operation::Lazy
            }
            Keyword::First => {
                self.advance()?;
                self.expect_keyword(Keyword::Match)?;
                Operation::Lazy
            }
            _ => return Ok(None),
        };

        Ok(Some(operation))
    }

    /// Parse a parenthesized sub-query, or a string meaning `literally`
    fn parse_sub(&mut self) -> Result<Vec<Operation>> {
        match self.current.kind {
            TokenKind::String(_) => Ok(vec![Operation::Literally(self.expect_string()?)]),
            TokenKind::LeftParen => {
                self.advance()?;
                let body = self.parse_sequence()?;
                if self.current.kind != TokenKind::RightParen {
                    return Err(self.unexpected("`)`"));
                }
                self.advance()?;
                Ok(body)
            }
            _ => Err(self.unexpected("`(` or string")),
        }
    }

    /// Parse an optional `from X to Y` over characters
    fn parse_char_range(&mut self) -> Result<Option<(char, char)>> {
        if !self.eat_keyword(Keyword::From)? {
            return Ok(None);
        }
        let from = self.expect_char()?;
        self.expect_keyword(Keyword::To)?;
        let to = self.expect_char()?;
        Ok(Some((from, to)))
    }

    /// Parse an optional `from N to M` over numbers
    fn parse_number_range(&mut self) -> Result<Option<(u32, u32)>> {
        if !self.eat_keyword(Keyword::From)? {
            return Ok(None);
        }
        let from = self.expect_number()?;
        self.expect_keyword(Keyword::To)?;
        let to = self.expect_number()?;
        Ok(Some((from, to)))
    }
}

/// Parse a query string into its operations
pub fn parse(input: &str) -> Result<Vec<Operation>> {
    Parser::new(input)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LexErrorKind;

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse("").unwrap(), vec![]);
    }

    #[test]
    fn test_parse_literally() {
        assert_eq!(
            parse(r#"literally "abc""#).unwrap(),
            vec![Operation::Literally("abc".to_string())]
        );
    }

    #[test]
    fn test_parse_exactly() {
        assert_eq!(
            parse("digit exactly 2 times").unwrap(),
            vec![Operation::Digit(None), Operation::Exactly(2)]
        );
    }

    #[test]
    fn test_parse_between_with_and_without_times() {
        let with = parse("digit between 1 and 3 times").unwrap();
        let without = parse("digit between 1 and 3").unwrap();
        assert_eq!(with, without);
        assert_eq!(with, vec![Operation::Digit(None), Operation::Between(1, 3)]);
    }

    #[test]
    fn test_parse_at_least() {
        assert_eq!(
            parse("letter at least 2 times").unwrap(),
            vec![Operation::Letter(None), Operation::AtLeast(2)]
        );
    }

    #[test]
    fn test_parse_ranges() {
        assert_eq!(
            parse("letter from a to f uppercase letter from A to F digit from 3 to 7").unwrap(),
            vec![
                Operation::Letter(Some(('a', 'f'))),
                Operation::UppercaseLetter(Some(('A', 'F'))),
                Operation::Digit(Some((3, 7))),
            ]
        );
    }

    #[test]
    fn test_parse_number_alias() {
        assert_eq!(parse("number").unwrap(), vec![Operation::Digit(None)]);
    }

    #[test]
    fn test_parse_two_word_phrases() {
        assert_eq!(
            parse("begin with any character no character new line no whitespace must end")
                .unwrap(),
            vec![
                Operation::BeginWith,
                Operation::AnyCharacter,
                Operation::NoCharacter,
                Operation::NewLine,
                Operation::NoWhitespace,
                Operation::MustEnd,
            ]
        );
        assert_eq!(parse("starts with").unwrap(), vec![Operation::BeginWith]);
    }

    #[test]
    fn test_parse_stacked_suffixes() {
        assert_eq!(
            parse("whitespace optional first match").unwrap(),
            vec![Operation::Whitespace, Operation::Optional, Operation::Lazy]
        );
        assert_eq!(
            parse("digit once or more lazy").unwrap(),
            vec![Operation::Digit(None), Operation::OnceOrMore, Operation::Lazy]
        );
    }

    #[test]
    fn test_parse_flags() {
        assert_eq!(
            parse("case insensitive multi line").unwrap(),
            vec![Operation::CaseInsensitive, Operation::MultiLine]
        );
    }

    #[test]
    fn test_parse_capture() {
        assert_eq!(
            parse("capture (digit once or more)").unwrap(),
            vec![Operation::Capture {
                body: vec![Operation::Digit(None), Operation::OnceOrMore],
                name: None,
            }]
        );
    }

    #[test]
    fn test_parse_named_capture() {
        assert_eq!(
            parse(r#"capture (letter) as "first""#).unwrap(),
            vec![Operation::Capture {
                body: vec![Operation::Letter(None)],
                name: Some("first".to_string()),
            }]
        );
    }

    #[test]
    fn test_parse_capture_with_quantifier_after_group() {
        assert_eq!(
            parse("capture (tab) exactly 3 times").unwrap(),
            vec![
                Operation::Capture {
                    body: vec![Operation::Tab],
                    name: None,
                },
                Operation::Exactly(3),
            ]
        );
    }

    #[test]
    fn test_parse_string_argument_for_composite() {
        assert_eq!(
            parse(r#"if followed by "x""#).unwrap(),
            vec![Operation::IfFollowedBy(vec![Operation::Literally(
                "x".to_string()
            )])]
        );
    }

    #[test]
    fn test_parse_any_of_and_either_of() {
        let any = parse("any of (digit letter)").unwrap();
        let either = parse("either of (digit letter)").unwrap();
        assert_eq!(any, either);
        assert_eq!(
            any,
            vec![Operation::AnyOf(vec![
                Operation::Digit(None),
                Operation::Letter(None)
            ])]
        );
    }

    #[test]
    fn test_parse_assertions() {
        assert_eq!(
            parse("if not followed by (tab) if already had (tab) if not already had (tab)")
                .unwrap(),
            vec![
                Operation::IfNotFollowedBy(vec![Operation::Tab]),
                Operation::IfAlreadyHad(vec![Operation::Tab]),
                Operation::IfNotAlreadyHad(vec![Operation::Tab]),
            ]
        );
    }

    #[test]
    fn test_parse_nested() {
        assert_eq!(
            parse("capture (any of (digit, letter) once or more)").unwrap(),
            vec![Operation::Capture {
                body: vec![
                    Operation::AnyOf(vec![Operation::Digit(None), Operation::Letter(None)]),
                    Operation::OnceOrMore,
                ],
                name: None,
            }]
        );
    }

    #[test]
    fn test_parse_empty_group() {
        assert_eq!(
            parse("capture ()").unwrap(),
            vec![Operation::Capture {
                body: vec![],
                name: None,
            }]
        );
    }

    #[test]
    fn test_error_leading_quantifier() {
        let err = parse("once or more").unwrap_err();
        assert_eq!(
            err,
            RegexError::Grammar(ParseError::UnexpectedToken {
                expected: "expression".to_string(),
                found: "keyword `once`".to_string(),
                position: 0,
            })
        );
    }

    #[test]
    fn test_error_missing_times() {
        let err = parse("digit exactly 2").unwrap_err();
        assert_eq!(
            err,
            RegexError::Grammar(ParseError::UnexpectedEof {
                expected: "`times`".to_string(),
            })
        );
    }

    #[test]
    fn test_error_unclosed_group() {
        let err = parse("capture (digit").unwrap_err();
        assert!(matches!(
            err,
            RegexError::Grammar(ParseError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_error_stray_close_paren() {
        let err = parse("digit)").unwrap_err();
        assert!(matches!(
            err,
            RegexError::Grammar(ParseError::UnexpectedToken { position: 5, .. })
        ));
    }

    #[test]
    fn test_error_unknown_word() {
        assert!(matches!(
            parse("digits").unwrap_err(),
            RegexError::Grammar(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_error_incomplete_phrase() {
        assert!(parse("any").is_err());
        assert!(parse("if followed (tab)").is_err());
        assert!(parse("uppercase digit").is_err());
    }

    #[test]
    fn test_lex_errors_propagate() {
        let err = parse("digit exactly 2 times #").unwrap_err();
        assert_eq!(
            err,
            RegexError::Lex {
                position: 22,
                kind: LexErrorKind::UnexpectedChar('#'),
            }
        );
    }
}
