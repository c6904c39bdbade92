//! Replacement string handling
//!
//! This module handles replacement templates used by
//! [`Pattern::substitute`](crate::Pattern::substitute). Templates can
//! reference groups as:
//! - `\1`, `\2`, ... for numbered groups
//! - `\g<1>` or `\g<name>` for numbered or named groups
//! - `\g<0>` for the entire match
//!
//! `\n`, `\t` and `\\` stand for a newline, a tab and a backslash. Any
//! other escaped character is kept as written.

use thiserror::Error;

use crate::error::Result;
use crate::pattern::Match;

/// A part of a replacement string
#[derive(Debug, Clone, PartialEq)]
pub enum ReplacementPart {
    /// Literal text
    Literal(String),
    /// Backreference by number (\1, \g<2>, etc.)
    BackrefNumber(usize),
    /// Backreference by name (\g<name>)
    BackrefName(String),
    /// Entire match (\g<0>)
    EntireMatch,
}

/// A parsed replacement string
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    parts: Vec<ReplacementPart>,
}

impl Replacement {
    /// Parse a replacement string
    pub fn parse(input: &str) -> std::result::Result<Self, ReplacementError> {
        let mut parts = Vec::new();
        let mut chars = input.chars().peekable();
        let mut current_literal = String::new();

        let mut push_part = |literal: &mut String, part: ReplacementPart| {
            if !literal.is_empty() {
                parts.push(ReplacementPart::Literal(std::mem::take(literal)));
            }
            parts.push(part);
        };

        while let Some(c) = chars.next() {
            if c != '\\' {
                current_literal.push(c);
                continue;
            }

            match chars.peek().copied() {
                Some(digit) if digit.is_ascii_digit() => {
                    let mut number = String::new();
                    while let Some(&c) = chars.peek() {
                        if !c.is_ascii_digit() {
                            break;
                        }
                        number.push(c);
                        chars.next();
                    }
                    let index = number
                        .parse()
                        .map_err(|_| ReplacementError::InvalidBackreference(number.clone()))?;
                    let part = if index == 0 {
                        ReplacementPart::EntireMatch
                    } else {
                        ReplacementPart::BackrefNumber(index)
                    };
                    push_part(&mut current_literal, part);
                }
                Some('g') => {
                    chars.next(); // consume 'g'
                    if chars.peek() != Some(&'<') {
                        // Not a \g<...> reference, keep as written
                        current_literal.push_str("\\g");
                        continue;
                    }
                    chars.next(); // consume '<'
                    let name: String = chars.by_ref().take_while(|&c| c != '>').collect();
                    if name.is_empty() {
                        return Err(ReplacementError::InvalidBackreference(name));
                    }
                    let part = match name.parse::<usize>() {
                        Ok(0) => ReplacementPart::EntireMatch,
                        Ok(index) => ReplacementPart::BackrefNumber(index),
                        Err(_) => ReplacementPart::BackrefName(name),
                    };
                    push_part(&mut current_literal, part);
                }
                Some('n') => {
                    chars.next();
                    current_literal.push('\n');
                }
                Some('t') => {
                    chars.next();
                    current_literal.push('\t');
                }
                Some('\\') => {
                    chars.next();
                    current_literal.push('\\');
                }
                Some(other) => {
                    chars.next();
                    current_literal.push('\\');
                    current_literal.push(other);
                }
                // Trailing backslash
                None => current_literal.push('\\'),
            }
        }

        // Don't forget the last literal
        if !current_literal.is_empty() {
            parts.push(ReplacementPart::Literal(current_literal));
        }

        Ok(Replacement { parts })
    }

    /// Apply the replacement to a match of `original`
    ///
    /// Groups that did not take part in the match expand to nothing;
    /// groups the pattern does not define are an error.
    pub fn apply(&self, m: &Match, original: &str) -> std::result::Result<String, ReplacementError> {
        let mut result = String::new();

        for part in &self.parts {
            match part {
                ReplacementPart::Literal(text) => result.push_str(text),
                ReplacementPart::EntireMatch => result.push_str(m.as_str(original)),
                ReplacementPart::BackrefNumber(n) => {
                    if *n >= m.groups.len() {
                        return Err(ReplacementError::InvalidBackreference(n.to_string()));
                    }
                    result.push_str(m.group_str(original, *n).unwrap_or_default());
                }
                ReplacementPart::BackrefName(name) => {
                    if !m.named_groups.contains_key(name) {
                        return Err(ReplacementError::UnknownGroupName(name.clone()));
                    }
                    result.push_str(m.named_group_str(original, name).unwrap_or_default());
                }
            }
        }

        Ok(result)
    }

    /// Get the parts of the replacement
    pub fn parts(&self) -> &[ReplacementPart] {
        &self.parts
    }
}

/// Errors that can occur during replacement parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReplacementError {
    /// Malformed reference, or a group number the pattern does not have
    #[error("invalid backreference: {0}")]
    InvalidBackreference(String),

    /// Reference to a group name the pattern does not have
    #[error("unknown group name: {0}")]
    UnknownGroupName(String),
}

/// Produces the replacement text for each match
///
/// Implemented for template strings, parsed [`Replacement`]s and closures
/// called with each [`Match`].
pub trait Replacer {
    /// Append the replacement for `m` (a match in `input`) to `out`
    fn replace_match(&mut self, m: &Match, input: &str, out: &mut String) -> Result<()>;

    /// The parsed template, for replacers given as template text.
    ///
    /// Called once before matching starts, so a malformed template is
    /// rejected even when nothing matches.
    fn template(&self) -> Option<std::result::Result<Replacement, ReplacementError>> {
        None
    }
}

impl Replacer for &Replacement {
    fn replace_match(&mut self, m: &Match, input: &str, out: &mut String) -> Result<()> {
        out.push_str(&self.apply(m, input)?);
        Ok(())
    }
}

impl Replacer for Replacement {
    fn replace_match(&mut self, m: &Match, input: &str, out: &mut String) -> Result<()> {
        (&*self).replace_match(m, input, out)
    }
}

impl Replacer for &str {
    fn replace_match(&mut self, m: &Match, input: &str, out: &mut String) -> Result<()> {
        Replacement::parse(self)?.replace_match(m, input, out)
    }

    fn template(&self) -> Option<std::result::Result<Replacement, ReplacementError>> {
        Some(Replacement::parse(self))
    }
}

impl Replacer for String {
    fn replace_match(&mut self, m: &Match, input: &str, out: &mut String) -> Result<()> {
        self.as_str().replace_match(m, input, out)
    }

    fn template(&self) -> Option<std::result::Result<Replacement, ReplacementError>> {
        Some(Replacement::parse(self))
    }
}

impl<F> Replacer for F
where
    F: FnMut(&Match) -> String,
{
    fn replace_match(&mut self, m: &Match, _input: &str, out: &mut String) -> Result<()> {
        out.push_str(&self(m));
        Ok(())
    }
}
