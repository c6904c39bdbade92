//! Pattern assembler
//!
//! A [`Builder`] collects regex fragments from named operations and reads
//! them out as a single pattern string. Nested sub-expressions (captures,
//! alternations, lookarounds) are assembled by a child builder whose
//! fragments are wrapped once, as a whole, by a [`GroupTemplate`].
//!
//! ```
//! use srl::Builder;
//!
//! let mut query = Builder::new();
//! query
//!     .begin_with()
//!     .literally("+")
//!     .digit()
//!     .between(1, 3)
//!     .must_end();
//! assert_eq!(query.get(), r"^(?:\+)[0-9]{1,3}$");
//! ```

use std::cell::OnceCell;
use std::fmt;

use crate::error::{RegexError, Result};
use crate::operation::Operation;
use crate::pattern::{Match, Pattern};
use crate::replace::Replacer;

/// Characters that are escaped by [`Builder::literally`]
const META_CHARACTERS: &[char] = &[
    '\\', '+', '*', '?', '.', '(', ')', '[', ']', '{', '}', '|', '^', '$',
];

/// Whether `text` ends in `+`, `*`, `?` or a closing `}`
fn ends_with_quantifier(text: &str) -> bool {
    matches!(text.chars().last(), Some('+' | '*' | '?' | '}'))
}

/// How a builder's joined fragments are wrapped when read out
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupTemplate {
    /// No wrapping
    #[default]
    Identity,
    /// `(?:...)`
    NonCapturing,
    /// `(...)`
    Capturing,
    /// `(?P<name>...)`
    NamedCapturing(String),
    /// `(?=...)`
    Lookahead,
    /// `(?!...)`
    NegativeLookahead,
    /// `(?<=...)`
    Lookbehind,
    /// `(?<!...)`
    NegativeLookbehind,
}

impl GroupTemplate {
    fn opening(&self) -> String {
        match self {
            GroupTemplate::Identity => String::new(),
            GroupTemplate::NonCapturing => "(?:".to_string(),
            GroupTemplate::Capturing => "(".to_string(),
            GroupTemplate::NamedCapturing(name) => format!("(?P<{}>", name),
            GroupTemplate::Lookahead => "(?=".to_string(),
            GroupTemplate::NegativeLookahead => "(?!".to_string(),
            GroupTemplate::Lookbehind => "(?<=".to_string(),
            GroupTemplate::NegativeLookbehind => "(?<!".to_string(),
        }
    }

    /// Wrap already joined fragments
    pub fn wrap(&self, inner: &str) -> String {
        match self {
            GroupTemplate::Identity => inner.to_string(),
            _ => format!("{}{})", self.opening(), inner),
        }
    }
}

/// Matching options accumulated by a builder
///
/// Flags only ever get turned on; merging two sets is a logical OR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    /// Letters match regardless of case (`i`)
    pub case_insensitive: bool,
    /// `^` and `$` match at line boundaries (`m`)
    pub multi_line: bool,
}

impl Flags {
    /// Merge with another set of flags
    pub fn merge(&mut self, other: Flags) {
        self.case_insensitive |= other.case_insensitive;
        self.multi_line |= other.multi_line;
    }

    /// Check if no flag is set
    pub fn is_empty(&self) -> bool {
        !self.case_insensitive && !self.multi_line
    }

    /// The inline group enabling these flags, e.g. `(?im)`
    pub fn inline_prefix(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let mut prefix = String::from("(?");
        if self.case_insensitive {
            prefix.push('i');
        }
        if self.multi_line {
            prefix.push('m');
        }
        prefix.push(')');
        prefix
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.case_insensitive {
            f.write_str("i")?;
        }
        if self.multi_line {
            f.write_str("m")?;
        }
        Ok(())
    }
}

/// The content of a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
enum Body {
    Text(String),
    Group(Sequence),
}

/// One piece of pattern text plus any quantifiers applied to it
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fragment {
    body: Body,
    suffix: String,
}

impl Fragment {
    fn text(text: impl Into<String>) -> Self {
        Fragment {
            body: Body::Text(text.into()),
            suffix: String::new(),
        }
    }

    fn render_into(&self, out: &mut String) {
        match &self.body {
            Body::Text(text) => out.push_str(text),
            Body::Group(sequence) => sequence.render_into(out),
        }
        out.push_str(&self.suffix);
    }

    fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    /// Append a lazy `?` to the innermost trailing quantifier.
    ///
    /// A quantifier applied to this fragment wins; otherwise a group
    /// descends into its own last fragment. Returns `false` when no
    /// quantifier ends the fragment.
    fn make_lazy(&mut self) -> bool {
        if !self.suffix.is_empty() {
            self.suffix.push('?');
            return true;
        }
        match &mut self.body {
            Body::Text(text) => {
                if ends_with_quantifier(text) {
                    text.push('?');
                    true
                } else {
                    false
                }
            }
            Body::Group(sequence) => sequence
                .fragments
                .last_mut()
                .is_some_and(Fragment::make_lazy),
        }
    }
}

/// Fragments joined by a separator and wrapped by a template
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Sequence {
    fragments: Vec<Fragment>,
    separator: &'static str,
    template: GroupTemplate,
}

impl Sequence {
    fn render_into(&self, out: &mut String) {
        let opening = self.template.opening();
        out.push_str(&opening);
        for (i, fragment) in self.fragments.iter().enumerate() {
            if i > 0 {
                out.push_str(self.separator);
            }
            fragment.render_into(out);
        }
        if !opening.is_empty() {
            out.push(')');
        }
    }
}

/// Anything that can fill a nested sub-expression
///
/// Implemented for closures receiving the child builder, for strings
/// (meaning [`Builder::literally`]), for prebuilt builders and for parsed
/// operation lists.
pub trait SubExpression {
    /// Add this sub-expression's fragments to `builder`
    fn build(self, builder: &mut Builder) -> Result<()>;
}

impl<F> SubExpression for F
where
    F: FnOnce(&mut Builder) -> Result<()>,
{
    fn build(self, builder: &mut Builder) -> Result<()> {
        self(builder)
    }
}

impl SubExpression for &str {
    fn build(self, builder: &mut Builder) -> Result<()> {
        builder.literally(self);
        Ok(())
    }
}

impl SubExpression for String {
    fn build(self, builder: &mut Builder) -> Result<()> {
        self.as_str().build(builder)
    }
}

impl SubExpression for &Builder {
    fn build(self, builder: &mut Builder) -> Result<()> {
        builder
            .sequence
            .fragments
            .extend(self.sequence.fragments.iter().cloned());
        builder.flags.merge(self.flags);
        Ok(())
    }
}

impl SubExpression for Builder {
    fn build(self, builder: &mut Builder) -> Result<()> {
        builder.sequence.fragments.extend(self.sequence.fragments);
        builder.flags.merge(self.flags);
        Ok(())
    }
}

impl SubExpression for &[Operation] {
    fn build(self, builder: &mut Builder) -> Result<()> {
        builder.replay(self)?;
        Ok(())
    }
}

impl SubExpression for &Vec<Operation> {
    fn build(self, builder: &mut Builder) -> Result<()> {
        self.as_slice().build(builder)
    }
}

/// Builds a regular expression from named operations
///
/// Every operation appends one fragment, or quantifies the last one, and
/// returns the builder for chaining. The compiled [`Pattern`] is cached
/// until the next mutation.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    sequence: Sequence,
    flags: Flags,
    backtrack_limit: Option<usize>,
    cache: OnceCell<Pattern>,
}

impl Builder {
    /// Create an empty top-level builder
    pub fn new() -> Self {
        Builder::default()
    }

    /// Create a child builder for a nested sub-expression
    fn nested(template: GroupTemplate, separator: &'static str) -> Self {
        Builder {
            sequence: Sequence {
                fragments: Vec::new(),
                separator,
                template,
            },
            ..Builder::default()
        }
    }

    fn invalidate(&mut self) {
        self.cache.take();
    }

    fn push(&mut self, fragment: Fragment) -> &mut Self {
        self.invalidate();
        self.sequence.fragments.push(fragment);
        self
    }

    fn add(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Fragment::text(text))
    }

    /// Quantify the last fragment, or append the marker if there is none
    fn quantify(&mut self, marker: String) -> &mut Self {
        self.invalidate();
        match self.sequence.fragments.last_mut() {
            Some(last) => last.suffix.push_str(&marker),
            None => self.sequence.fragments.push(Fragment::text(marker)),
        }
        self
    }

    /// Assemble `sub` in a child builder and append it as one fragment
    fn add_sub<S: SubExpression>(
        &mut self,
        sub: S,
        template: GroupTemplate,
        separator: &'static str,
    ) -> Result<Fragment> {
        let mut child = Builder::nested(template, separator);
        sub.build(&mut child)?;
        self.invalidate();
        self.flags.merge(child.flags);
        Ok(Fragment {
            body: Body::Group(child.sequence),
            suffix: String::new(),
        })
    }

    fn group<S: SubExpression>(
        &mut self,
        sub: S,
        template: GroupTemplate,
        separator: &'static str,
    ) -> Result<&mut Self> {
        let fragment = self.add_sub(sub, template, separator)?;
        Ok(self.push(fragment))
    }

    /// Insert the assertion before the previously emitted fragment
    fn lookbehind<S: SubExpression>(
        &mut self,
        sub: S,
        template: GroupTemplate,
    ) -> Result<&mut Self> {
        let fragment = self.add_sub(sub, template, "")?;
        let anchored = self.sequence.fragments.pop();
        self.push(fragment);
        if let Some(anchored) = anchored {
            self.push(anchored);
        }
        Ok(self)
    }

    /// Match `text` exactly, escaping regex metacharacters
    pub fn literally(&mut self, text: &str) -> &mut Self {
        let mut escaped = String::with_capacity(text.len() + 4);
        for c in text.chars() {
            if META_CHARACTERS.contains(&c) {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        self.add(GroupTemplate::NonCapturing.wrap(&escaped))
    }

    /// Match one of the given characters (inserted unescaped)
    pub fn one_of(&mut self, chars: &str) -> &mut Self {
        self.add(format!("[{}]", chars))
    }

    /// Append raw regex text
    pub fn raw(&mut self, pattern: &str) -> &mut Self {
        self.add(pattern)
    }

    /// Match a digit `0` to `9`
    pub fn digit(&mut self) -> &mut Self {
        self.digit_range(0, 9)
    }

    /// Match a digit in `from..=to`.
    ///
    /// The range is not validated; an inverted range is left for the regex
    /// engine to reject.
    pub fn digit_range(&mut self, from: u32, to: u32) -> &mut Self {
        self.add(format!("[{}-{}]", from, to))
    }

    /// Alias of [`Builder::digit`]
    pub fn number(&mut self) -> &mut Self {
        self.digit()
    }

    /// Match a lowercase letter `a` to `z`
    pub fn letter(&mut self) -> &mut Self {
        self.letter_range('a', 'z')
    }

    /// Match a letter in `from..=to`
    pub fn letter_range(&mut self, from: char, to: char) -> &mut Self {
        self.add(format!("[{}-{}]", from, to))
    }

    /// Match an uppercase letter `A` to `Z`
    pub fn uppercase_letter(&mut self) -> &mut Self {
        self.letter_range('A', 'Z')
    }

    /// Match an uppercase letter in `from..=to`
    pub fn uppercase_letter_range(&mut self, from: char, to: char) -> &mut Self {
        self.letter_range(from, to)
    }

    pub fn any_character(&mut self) -> &mut Self {
        self.add(r"\w")
    }

    pub fn no_character(&mut self) -> &mut Self {
        self.add(r"\W")
    }

    /// Match any character except a line terminator
    pub fn anything(&mut self) -> &mut Self {
        self.add(".")
    }

    pub fn new_line(&mut self) -> &mut Self {
        self.add(r"\n")
    }

    pub fn tab(&mut self) -> &mut Self {
        self.add(r"\t")
    }

    pub fn whitespace(&mut self) -> &mut Self {
        self.add(r"\s")
    }

    pub fn no_whitespace(&mut self) -> &mut Self {
        self.add(r"\S")
    }

    pub fn once_or_more(&mut self) -> &mut Self {
        self.quantify("+".to_string())
    }

    pub fn never_or_more(&mut self) -> &mut Self {
        self.quantify("*".to_string())
    }

    pub fn optional(&mut self) -> &mut Self {
        self.quantify("?".to_string())
    }

    /// Repeat the previous fragment exactly `count` times
    pub fn exactly(&mut self, count: u32) -> &mut Self {
        self.quantify(format!("{{{}}}", count))
    }

    /// Repeat the previous fragment `min` to `max` times, greedily
    pub fn between(&mut self, min: u32, max: u32) -> &mut Self {
        self.quantify(format!("{{{},{}}}", min, max))
    }

    /// Repeat the previous fragment at least `count` times
    pub fn at_least(&mut self, count: u32) -> &mut Self {
        self.quantify(format!("{{{},}}", count))
    }

    /// Make the trailing quantifier lazy.
    ///
    /// Fails with [`RegexError::LazyMisuse`] unless the last fragment, or
    /// the innermost trailing fragment of the last group, ends in a
    /// quantifier.
    pub fn lazy(&mut self) -> Result<&mut Self> {
        self.invalidate();
        let Some(last) = self.sequence.fragments.last_mut() else {
            return Err(RegexError::LazyMisuse {
                fragment: String::new(),
            });
        };
        if !last.make_lazy() {
            return Err(RegexError::LazyMisuse {
                fragment: last.render(),
            });
        }
        Ok(self)
    }

    /// Alias of [`Builder::lazy`]
    pub fn first_match(&mut self) -> Result<&mut Self> {
        self.lazy()
    }

    /// Anchor at the start of the input
    pub fn begin_with(&mut self) -> &mut Self {
        self.add("^")
    }

    /// Alias of [`Builder::begin_with`]
    pub fn starts_with(&mut self) -> &mut Self {
        self.begin_with()
    }

    /// Anchor at the end of the input
    pub fn must_end(&mut self) -> &mut Self {
        self.add("$")
    }

    pub fn case_insensitive(&mut self) -> &mut Self {
        self.invalidate();
        self.flags.case_insensitive = true;
        self
    }

    pub fn multi_line(&mut self) -> &mut Self {
        self.invalidate();
        self.flags.multi_line = true;
        self
    }

    /// Abort matching after `limit` backtracking steps
    pub fn backtrack_limit(&mut self, limit: usize) -> &mut Self {
        self.invalidate();
        self.backtrack_limit = Some(limit);
        self
    }

    /// Capture the sub-expression in a numbered group
    pub fn capture<S: SubExpression>(&mut self, sub: S) -> Result<&mut Self> {
        self.group(sub, GroupTemplate::Capturing, "")
    }

    /// Capture the sub-expression in a named group
    pub fn capture_as<S: SubExpression>(&mut self, name: &str, sub: S) -> Result<&mut Self> {
        self.group(sub, GroupTemplate::NamedCapturing(name.to_string()), "")
    }

    /// Match any one of the sub-expression's fragments
    pub fn any_of<S: SubExpression>(&mut self, sub: S) -> Result<&mut Self> {
        self.group(sub, GroupTemplate::NonCapturing, "|")
    }

    /// Alias of [`Builder::any_of`]
    pub fn either_of<S: SubExpression>(&mut self, sub: S) -> Result<&mut Self> {
        self.any_of(sub)
    }

    /// Match lazily up to the sub-expression
    pub fn until<S: SubExpression>(&mut self, sub: S) -> Result<&mut Self> {
        match self.lazy() {
            Ok(_) | Err(RegexError::LazyMisuse { .. }) => {}
            Err(err) => return Err(err),
        }
        self.group(sub, GroupTemplate::NonCapturing, "")
    }

    pub fn if_followed_by<S: SubExpression>(&mut self, sub: S) -> Result<&mut Self> {
        self.group(sub, GroupTemplate::Lookahead, "")
    }

    pub fn if_not_followed_by<S: SubExpression>(&mut self, sub: S) -> Result<&mut Self> {
        self.group(sub, GroupTemplate::NegativeLookahead, "")
    }

    /// Require the sub-expression right before the previous fragment
    pub fn if_already_had<S: SubExpression>(&mut self, sub: S) -> Result<&mut Self> {
        self.lookbehind(sub, GroupTemplate::Lookbehind)
    }

    /// Forbid the sub-expression right before the previous fragment
    pub fn if_not_already_had<S: SubExpression>(&mut self, sub: S) -> Result<&mut Self> {
        self.lookbehind(sub, GroupTemplate::NegativeLookbehind)
    }

    /// Apply one parsed operation
    pub fn apply(&mut self, operation: &Operation) -> Result<&mut Self> {
        log::trace!("applying {}", operation.name());
        match operation {
            Operation::Literally(text) => Ok(self.literally(text)),
            Operation::OneOf(chars) => Ok(self.one_of(chars)),
            Operation::Letter(None) => Ok(self.letter()),
            Operation::Letter(Some((from, to))) => Ok(self.letter_range(*from, *to)),
            Operation::UppercaseLetter(None) => Ok(self.uppercase_letter()),
            Operation::UppercaseLetter(Some((from, to))) => {
                Ok(self.uppercase_letter_range(*from, *to))
            }
            Operation::AnyCharacter => Ok(self.any_character()),
            Operation::NoCharacter => Ok(self.no_character()),
            Operation::Digit(None) => Ok(self.digit()),
            Operation::Digit(Some((from, to))) => Ok(self.digit_range(*from, *to)),
            Operation::Anything => Ok(self.anything()),
            Operation::NewLine => Ok(self.new_line()),
            Operation::Whitespace => Ok(self.whitespace()),
            Operation::NoWhitespace => Ok(self.no_whitespace()),
            Operation::Tab => Ok(self.tab()),
            Operation::Raw(pattern) => Ok(self.raw(pattern)),
            Operation::Exactly(count) => Ok(self.exactly(*count)),
            Operation::Between(min, max) => Ok(self.between(*min, *max)),
            Operation::AtLeast(count) => Ok(self.at_least(*count)),
            Operation::OnceOrMore => Ok(self.once_or_more()),
            Operation::NeverOrMore => Ok(self.never_or_more()),
            Operation::Optional => Ok(self.optional()),
            Operation::Lazy => self.lazy(),
            Operation::BeginWith => Ok(self.begin_with()),
            Operation::MustEnd => Ok(self.must_end()),
            Operation::CaseInsensitive => Ok(self.case_insensitive()),
            Operation::MultiLine => Ok(self.multi_line()),
            Operation::Capture { body, name: None } => self.capture(body),
            Operation::Capture {
                body,
                name: Some(name),
            } => self.capture_as(name, body),
            Operation::AnyOf(body) => self.any_of(body),
            Operation::Until(body) => self.until(body),
            Operation::IfFollowedBy(body) => self.if_followed_by(body),
            Operation::IfNotFollowedBy(body) => self.if_not_followed_by(body),
            Operation::IfAlreadyHad(body) => self.if_already_had(body),
            Operation::IfNotAlreadyHad(body) => self.if_not_already_had(body),
        }
    }

    /// Apply parsed operations in order
    pub fn replay(&mut self, operations: &[Operation]) -> Result<&mut Self> {
        for operation in operations {
            self.apply(operation)?;
        }
        Ok(self)
    }

    /// The assembled pattern, without flags
    pub fn get(&self) -> String {
        let mut out = String::new();
        self.sequence.render_into(&mut out);
        out
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Compile (or fetch the cached) pattern
    fn pattern(&self) -> Result<&Pattern> {
        if let Some(pattern) = self.cache.get() {
            return Ok(pattern);
        }
        let pattern = Pattern::with_limit(&self.get(), self.flags, self.backtrack_limit)?;
        Ok(self.cache.get_or_init(|| pattern))
    }

    /// Compile the assembled pattern
    pub fn compile(&self) -> Result<Pattern> {
        self.pattern().cloned()
    }

    /// Check whether the assembled pattern compiles
    pub fn is_valid(&self) -> bool {
        self.pattern().is_ok()
    }

    /// See [`Pattern::is_match`]
    pub fn is_match(&self, text: &str) -> Result<bool> {
        self.pattern()?.is_match(text)
    }

    /// See [`Pattern::matches`]
    pub fn matches(&self, text: &str) -> Result<bool> {
        self.pattern()?.matches(text)
    }

    /// See [`Pattern::match_at_start`]
    pub fn match_at_start(&self, text: &str) -> Result<Option<Match>> {
        self.pattern()?.match_at_start(text)
    }

    /// See [`Pattern::find`]
    pub fn find(&self, text: &str) -> Result<Option<Match>> {
        self.pattern()?.find(text)
    }

    /// See [`Pattern::find_all`]
    pub fn find_all(&self, text: &str) -> Result<Vec<Match>> {
        self.pattern()?.find_all(text)
    }

    /// See [`Pattern::filter`]
    pub fn filter<'t, I>(&self, items: I) -> Result<Vec<&'t str>>
    where
        I: IntoIterator<Item = &'t str>,
    {
        self.pattern()?.filter(items)
    }

    /// See [`Pattern::split`]
    pub fn split(&self, text: &str) -> Result<Vec<String>> {
        self.pattern()?.split(text)
    }

    /// See [`Pattern::substitute`]
    pub fn substitute<R: Replacer>(&self, replacement: R, text: &str) -> Result<String> {
        self.pattern()?.substitute(replacement, text)
    }

    /// See [`Pattern::substitute_counting`]
    pub fn substitute_counting<R: Replacer>(
        &self,
        replacement: R,
        text: &str,
    ) -> Result<(String, usize)> {
        self.pattern()?.substitute_counting(replacement, text)
    }
}

impl fmt::Display for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get())
    }
}
