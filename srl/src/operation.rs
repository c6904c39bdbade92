//! Parsed query operations
//!
//! A query parses to an ordered list of [`Operation`]s. Each one names a
//! single [`Builder`](crate::Builder) method, and replaying the list in
//! order builds the same pattern as calling those methods by hand.
//! Quantifier operations (`Exactly`, `Between`, `OnceOrMore`, ...) always
//! apply to whatever the preceding operation emitted.

use std::fmt;

/// One step of a parsed query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// `literally "text"`
    Literally(String),
    /// `one of "chars"`
    OneOf(String),
    /// `letter [from X to Y]`
    Letter(Option<(char, char)>),
    /// `uppercase letter [from X to Y]`
    UppercaseLetter(Option<(char, char)>),
    /// `any character`
    AnyCharacter,
    /// `no character`
    NoCharacter,
    /// `digit [from N to M]`
    Digit(Option<(u32, u32)>),
    /// `anything`
    Anything,
    /// `new line`
    NewLine,
    /// `whitespace`
    Whitespace,
    /// `no whitespace`
    NoWhitespace,
    /// `tab`
    Tab,
    /// `raw "pattern"`
    Raw(String),

    /// `exactly N times`
    Exactly(u32),
    /// `between N and M [times]`
    Between(u32, u32),
    /// `at least N [times]`
    AtLeast(u32),
    /// `once or more`
    OnceOrMore,
    /// `never or more`
    NeverOrMore,
    /// `optional`
    Optional,
    /// `lazy` / `first match`
    Lazy,

    /// `begin with` / `starts with`
    BeginWith,
    /// `must end`
    MustEnd,
    /// `case insensitive`
    CaseInsensitive,
    /// `multi line`
    MultiLine,

    /// `capture (...) [as "name"]`
    Capture {
        /// Operations inside the group
        body: Vec<Operation>,
        /// The group name, if any
        name: Option<String>,
    },
    /// `any of (...)` / `either of (...)`
    AnyOf(Vec<Operation>),
    /// `until (...)`
    Until(Vec<Operation>),
    /// `if followed by (...)`
    IfFollowedBy(Vec<Operation>),
    /// `if not followed by (...)`
    IfNotFollowedBy(Vec<Operation>),
    /// `if already had (...)`
    IfAlreadyHad(Vec<Operation>),
    /// `if not already had (...)`
    IfNotAlreadyHad(Vec<Operation>),
}

impl Operation {
    /// The builder method this operation dispatches to
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Literally(_) => "literally",
            Operation::OneOf(_) => "one_of",
            Operation::Letter(_) => "letter",
            Operation::UppercaseLetter(_) => "uppercase_letter",
            Operation::AnyCharacter => "any_character",
            Operation::NoCharacter => "no_character",
            Operation::Digit(_) => "digit",
            Operation::Anything => "anything",
            Operation::NewLine => "new_line",
            Operation::Whitespace => "whitespace",
            Operation::NoWhitespace => "no_whitespace",
            Operation::Tab => "tab",
            Operation::Raw(_) => "raw",
            Operation::Exactly(_) => "exactly",
            Operation::Between(_, _) => "between",
            Operation::AtLeast(_) => "at_least",
            Operation::OnceOrMore => "once_or_more",
            Operation::NeverOrMore => "never_or_more",
            Operation::Optional => "optional",
            Operation::Lazy => "lazy",
            Operation::BeginWith => "begin_with",
            Operation::MustEnd => "must_end",
            Operation::CaseInsensitive => "case_insensitive",
            Operation::MultiLine => "multi_line",
            Operation::Capture { .. } => "capture",
            Operation::AnyOf(_) => "any_of",
            Operation::Until(_) => "until",
            Operation::IfFollowedBy(_) => "if_followed_by",
            Operation::IfNotFollowedBy(_) => "if_not_followed_by",
            Operation::IfAlreadyHad(_) => "if_already_had",
            Operation::IfNotAlreadyHad(_) => "if_not_already_had",
        }
    }

    /// Render a list of operations back into query text
    pub fn render_all(operations: &[Operation]) -> String {
        operations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Write `text` as a double-quoted query string
fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            f.write_str("\\")?;
        }
        write!(f, "{}", c)?;
    }
    f.write_str("\"")
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Literally(text) => {
                f.write_str("literally ")?;
                write_quoted(f, text)
            }
            Operation::OneOf(chars) => {
                f.write_str("one of ")?;
                write_quoted(f, chars)
            }
            Operation::Letter(None) => f.write_str("letter"),
            Operation::Letter(Some((from, to))) => write!(f, "letter from {} to {}", from, to),
            Operation::UppercaseLetter(None) => f.write_str("uppercase letter"),
            Operation::UppercaseLetter(Some((from, to))) => {
                write!(f, "uppercase letter from {} to {}", from, to)
            }
            Operation::AnyCharacter => f.write_str("any character"),
            Operation::NoCharacter => f.write_str("no character"),
            Operation::Digit(None) => f.write_str("digit"),
            Operation::Digit(Some((from, to))) => write!(f, "digit from {} to {}", from, to),
            Operation::Anything => f.write_str("anything"),
            Operation::NewLine => f.write_str("new line"),
            Operation::Whitespace => f.write_str("whitespace"),
            Operation::NoWhitespace => f.write_str("no whitespace"),
            Operation::Tab => f.write_str("tab"),
            Operation::Raw(pattern) => {
                f.write_str("raw ")?;
                write_quoted(f, pattern)
            }
            Operation::Exactly(n) => write!(f, "exactly {} times", n),
            Operation::Between(min, max) => write!(f, "between {} and {} times", min, max),
            Operation::AtLeast(n) => write!(f, "at least {} times", n),
            Operation::OnceOrMore => f.write_str("once or more"),
            Operation::NeverOrMore => f.write_str("never or more"),
            Operation::Optional => f.write_str("optional"),
            Operation::Lazy => f.write_str("lazy"),
            Operation::BeginWith => f.write_str("begin with"),
            Operation::MustEnd => f.write_str("must end"),
            Operation::CaseInsensitive => f.write_str("case insensitive"),
            Operation::MultiLine => f.write_str("multi line"),
            Operation::Capture { body, name } => {
                write!(f, "capture ({})", Operation::render_all(body))?;
                if let Some(name) = name {
                    f.write_str(" as ")?;
                    write_quoted(f, name)?;
                }
                Ok(())
            }
            Operation::AnyOf(body) => write!(f, "any of ({})", Operation::render_all(body)),
            Operation::Until(body) => write!(f, "until ({})", Operation::render_all(body)),
            Operation::IfFollowedBy(body) => {
                write!(f, "if followed by ({})", Operation::render_all(body))
            }
            Operation::IfNotFollowedBy(body) => {
                write!(f, "if not followed by ({})", Operation::render_all(body))
            }
            Operation::IfAlreadyHad(body) => {
                write!(f, "if already had ({})", Operation::render_all(body))
            }
            Operation::IfNotAlreadyHad(body) => {
                write!(f, "if not already had ({})", Operation::render_all(body))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_simple() {
        assert_eq!(Operation::Digit(None).to_string(), "digit");
        assert_eq!(
            Operation::Letter(Some(('a', 'f'))).to_string(),
            "letter from a to f"
        );
        assert_eq!(Operation::Between(1, 3).to_string(), "between 1 and 3 times");
    }

    #[test]
    fn test_display_quotes_strings() {
        assert_eq!(
            Operation::Literally(r#"say "hi" \o/"#.to_string()).to_string(),
            r#"literally "say \"hi\" \\o/""#
        );
    }

    #[test]
    fn test_display_composite() {
        let op = Operation::Capture {
            body: vec![Operation::Digit(None), Operation::OnceOrMore],
            name: Some("year".to_string()),
        };
        assert_eq!(op.to_string(), r#"capture (digit once or more) as "year""#);
    }

    #[test]
    fn test_names_follow_builder_methods() {
        assert_eq!(Operation::IfNotAlreadyHad(vec![]).name(), "if_not_already_had");
        assert_eq!(Operation::Capture { body: vec![], name: None }.name(), "capture");
    }
}
