//! Lexer for tokenizing SRL queries
//!
//! This module turns query text such as `digit exactly 2 times` into a
//! stream of tokens for the parser. Spaces, tabs, newlines and commas
//! separate tokens and are otherwise ignored.

use std::fmt;

use crate::error::{LexErrorKind, RegexError, Result, Span};

/// A keyword of the query language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Literally,
    One,
    Of,
    Letter,
    From,
    To,
    Uppercase,
    Any,
    Character,
    No,
    Digit,
    Number,
    Anything,
    New,
    Line,
    Whitespace,
    Tab,
    Raw,
    Exactly,
    Times,
    Between,
    And,
    At,
    Least,
    Once,
    Or,
    More,
    Never,
    Optional,
    Lazy,
    First,
    Match,
    Begin,
    Starts,
    With,
    Must,
    End,
    Case,
    Insensitive,
    Multi,
    Capture,
    As,
    Either,
    Until,
    If,
    Not,
    Followed,
    By,
    Already,
    Had,
}

/// Keyword spellings, looked up before the single-character fallback
const KEYWORDS: &[(&str, Keyword)] = &[
    ("literally", Keyword::Literally),
    ("one", Keyword::One),
    ("of", Keyword::Of),
    ("letter", Keyword::Letter),
    ("from", Keyword::From),
    ("to", Keyword::To),
    ("uppercase", Keyword::Uppercase),
    ("any", Keyword::Any),
    ("character", Keyword::Character),
    ("no", Keyword::No),
    ("digit", Keyword::Digit),
    ("number", Keyword::Number),
    ("anything", Keyword::Anything),
    ("new", Keyword::New),
    ("line", Keyword::Line),
    ("whitespace", Keyword::Whitespace),
    ("tab", Keyword::Tab),
    ("raw", Keyword::Raw),
    ("exactly", Keyword::Exactly),
    ("times", Keyword::Times),
    ("between", Keyword::Between),
    ("and", Keyword::And),
    ("at", Keyword::At),
    ("least", Keyword::Least),
    ("once", Keyword::Once),
    ("or", Keyword::Or),
    ("more", Keyword::More),
    ("never", Keyword::Never),
    ("optional", Keyword::Optional),
    ("lazy", Keyword::Lazy),
    ("first", Keyword::First),
    ("match", Keyword::Match),
    ("begin", Keyword::Begin),
    ("starts", Keyword::Starts),
    ("with", Keyword::With),
    ("must", Keyword::Must),
    ("end", Keyword::End),
    ("case", Keyword::Case),
    ("insensitive", Keyword::Insensitive),
    ("multi", Keyword::Multi),
    ("capture", Keyword::Capture),
    ("as", Keyword::As),
    ("either", Keyword::Either),
    ("until", Keyword::Until),
    ("if", Keyword::If),
    ("not", Keyword::Not),
    ("followed", Keyword::Followed),
    ("by", Keyword::By),
    ("already", Keyword::Already),
    ("had", Keyword::Had),
];

impl Keyword {
    /// The spelling of this keyword in query text
    pub fn as_str(self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, keyword)| *keyword == self)
            .map(|(word, _)| *word)
            .unwrap_or("<keyword>")
    }

    fn lookup(word: &str) -> Option<Keyword> {
        KEYWORDS
            .iter()
            .find(|(spelling, _)| *spelling == word)
            .map(|(_, keyword)| *keyword)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of a token, with its decoded value
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Left parenthesis `(`
    LeftParen,
    /// Right parenthesis `)`
    RightParen,
    /// A decimal integer
    Number(u32),
    /// A double-quoted string, with `\"` and `\\` unescaped
    String(String),
    /// A single alphabetic character that is not part of a keyword
    Char(char),
    /// A keyword of the query language
    Keyword(Keyword),
    /// End of input
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LeftParen => write!(f, "`(`"),
            TokenKind::RightParen => write!(f, "`)`"),
            TokenKind::Number(n) => write!(f, "number `{}`", n),
            TokenKind::String(s) => write!(f, "string {:?}", s),
            TokenKind::Char(c) => write!(f, "character `{}`", c),
            TokenKind::Keyword(k) => write!(f, "keyword `{}`", k),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

/// A token together with its source text and location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text the token was read from
    pub text: String,
    pub span: Span,
}

impl Token {
    /// Byte offset of the token in the query
    pub fn position(&self) -> usize {
        self.span.start
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// Lexer for tokenizing SRL queries
///
/// The lexer is also an iterator of `Result<Token>`. Iteration ends after
/// the `Eof` token or after the first error.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input string
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            finished: false,
        }
    }

    /// Rewind to the start of the input
    pub fn reset(&mut self) {
        self.position = 0;
        self.finished = false;
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn current_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn is_separator(c: char) -> bool {
        matches!(c, ' ' | ',' | '\t' | '\n' | '\r')
    }

    fn is_word_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }

    fn skip_separators(&mut self) {
        while let Some(c) = self.current_char() {
            if Self::is_separator(c) {
                self.position += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn make_token(&mut self, start: usize, kind: TokenKind) -> Token {
        Token {
            kind,
            text: self.input[start..self.position].to_string(),
            span: Span::new(start, self.position),
        }
    }

    fn error(&self, position: usize, kind: LexErrorKind) -> RegexError {
        RegexError::Lex { position, kind }
    }

    /// Read a run of ASCII digits
    fn read_number(&mut self, start: usize) -> Result<Token> {
        let digits = self
            .rest()
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest().len());
        self.position += digits;
        let text = &self.input[start..self.position];
        let value = text
            .parse::<u32>()
            .map_err(|_| self.error(start, LexErrorKind::InvalidNumber(text.to_string())))?;
        Ok(self.make_token(start, TokenKind::Number(value)))
    }

    /// Read a double-quoted string (assumes the cursor is on the opening quote)
    fn read_string(&mut self, start: usize) -> Result<Token> {
        self.position += 1;
        let mut value = String::new();
        let mut chars = self.rest().char_indices();

        while let Some((offset, c)) = chars.next() {
            match c {
                '"' => {
                    self.position += offset + 1;
                    return Ok(self.make_token(start, TokenKind::String(value)));
                }
                '\\' => match chars.next() {
                    Some((_, escaped @ ('"' | '\\'))) => value.push(escaped),
                    Some((_, '\n')) | None => break,
                    Some((_, other)) => {
                        // keep unknown escapes so `raw "\d"` survives
                        value.push('\\');
                        value.push(other);
                    }
                },
                '\n' => break,
                _ => value.push(c),
            }
        }

        Err(self.error(start, LexErrorKind::UnterminatedString))
    }

    /// Read a keyword, or fall back to a single character
    fn read_word(&mut self, start: usize, first: char) -> Token {
        let len = self
            .rest()
            .find(|c: char| !Self::is_word_char(c))
            .unwrap_or(self.rest().len());
        let word = &self.rest()[..len];

        if let Some(keyword) = Keyword::lookup(word) {
            self.position += len;
            return self.make_token(start, TokenKind::Keyword(keyword));
        }

        self.position += first.len_utf8();
        self.make_token(start, TokenKind::Char(first))
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_separators();
        let start = self.position;

        match self.current_char() {
            None => Ok(self.make_token(start, TokenKind::Eof)),
            Some('(') => {
                self.position += 1;
                Ok(self.make_token(start, TokenKind::LeftParen))
            }
            Some(')') => {
                self.position += 1;
                Ok(self.make_token(start, TokenKind::RightParen))
            }
            Some('"') => self.read_string(start),
            Some(c) if c.is_ascii_digit() => self.read_number(start),
            Some(c) if c.is_alphabetic() => Ok(self.read_word(start, c)),
            Some(c) => Err(self.error(start, LexErrorKind::UnexpectedChar(c))),
        }
    }

    /// Tokenize the entire input, ending with an `Eof` token
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        self.by_ref().collect()
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        match &token {
            Ok(Token {
                kind: TokenKind::Eof,
                ..
            })
            | Err(_) => self.finished = true,
            Ok(_) => {}
        }
        Some(token)
    }
}

/// Tokenize a query string
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_keywords_and_numbers() {
        assert_eq!(
            kinds("digit exactly 2 times"),
            vec![
                TokenKind::Keyword(Keyword::Digit),
                TokenKind::Keyword(Keyword::Exactly),
                TokenKind::Number(2),
                TokenKind::Keyword(Keyword::Times),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds(" ,\t\n"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_commas_are_separators() {
        assert_eq!(
            kinds("tab, tab,tab"),
            vec![
                TokenKind::Keyword(Keyword::Tab),
                TokenKind::Keyword(Keyword::Tab),
                TokenKind::Keyword(Keyword::Tab),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_single_characters() {
        assert_eq!(
            kinds("letter from a to f"),
            vec![
                TokenKind::Keyword(Keyword::Letter),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Char('a'),
                TokenKind::Keyword(Keyword::To),
                TokenKind::Char('f'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keyword_needs_word_boundary() {
        // `letters` is not `letter` followed by `s`
        assert_eq!(kinds("letters")[0], TokenKind::Char('l'));
        assert_eq!(kinds("anything")[0], TokenKind::Keyword(Keyword::Anything));
        assert_eq!(kinds("any")[0], TokenKind::Keyword(Keyword::Any));
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(kinds("Digit")[0], TokenKind::Char('D'));
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(
            kinds(r#"literally "a \"b\" \\ c""#),
            vec![
                TokenKind::Keyword(Keyword::Literally),
                TokenKind::String(r#"a "b" \ c"#.to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_keeps_unknown_escapes() {
        assert_eq!(
            kinds(r#"raw "\d+""#)[1],
            TokenKind::String(r"\d+".to_string())
        );
    }

    #[test]
    fn test_string_may_contain_separators() {
        assert_eq!(
            kinds(r#"literally ", ""#)[1],
            TokenKind::String(", ".to_string())
        );
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(
            kinds("capture (digit)"),
            vec![
                TokenKind::Keyword(Keyword::Capture),
                TokenKind::LeftParen,
                TokenKind::Keyword(Keyword::Digit),
                TokenKind::RightParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_token_text_and_position() {
        let tokens = tokenize("  between 12").unwrap();
        assert_eq!(tokens[0].text, "between");
        assert_eq!(tokens[0].position(), 2);
        assert_eq!(tokens[1].text, "12");
        assert_eq!(tokens[1].span, Span::new(10, 12));
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("digit @").unwrap_err();
        assert_eq!(
            err,
            RegexError::Lex {
                position: 6,
                kind: LexErrorKind::UnexpectedChar('@'),
            }
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize(r#"literally "abc"#).unwrap_err();
        assert_eq!(
            err,
            RegexError::Lex {
                position: 10,
                kind: LexErrorKind::UnterminatedString,
            }
        );
    }

    #[test]
    fn test_string_cannot_span_lines() {
        assert!(tokenize("literally \"ab\ncd\"").is_err());
    }

    #[test]
    fn test_number_overflow() {
        let err = tokenize("exactly 99999999999 times").unwrap_err();
        assert!(matches!(
            err,
            RegexError::Lex {
                kind: LexErrorKind::InvalidNumber(_),
                ..
            }
        ));
    }

    #[test]
    fn test_iterator_stops_after_eof() {
        let mut lexer = Lexer::new("tab");
        assert_eq!(lexer.by_ref().count(), 2);
        assert!(lexer.next().is_none());

        lexer.reset();
        assert_eq!(lexer.count(), 2);
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let results: Vec<_> = Lexer::new("tab ! tab").collect();
        assert_eq!(results.len(), 2);
        assert!(results[1].is_err());
    }
}
