//! Compiled patterns
//!
//! A [`Pattern`] pairs an assembled pattern string and its [`Flags`] with
//! a compiled `fancy_regex` matcher. Patterns are immutable and cheap to
//! clone, and can be shared between threads.

use std::collections::HashMap;
use std::sync::Arc;

use crate::builder::Flags;
use crate::error::Result;
use crate::replace::Replacer;

/// A match result
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// The start position of the match
    pub start: usize,
    /// The end position of the match (exclusive)
    pub end: usize,
    /// Capture group positions, index 0 being the whole match.
    /// Groups that did not participate are `None`.
    pub groups: Vec<Option<(usize, usize)>>,
    /// Named groups (name -> group index)
    pub named_groups: HashMap<String, usize>,
}

impl Match {
    fn from_captures(
        captures: &fancy_regex::Captures<'_>,
        regex: &fancy_regex::Regex,
    ) -> Self {
        let groups: Vec<_> = (0..captures.len())
            .map(|i| captures.get(i).map(|m| (m.start(), m.end())))
            .collect();
        let (start, end) = groups.first().copied().flatten().unwrap_or((0, 0));
        let named_groups = regex
            .capture_names()
            .enumerate()
            .filter_map(|(i, name)| name.map(|name| (name.to_string(), i)))
            .collect();

        Match {
            start,
            end,
            groups,
            named_groups,
        }
    }

    /// Get the matched text
    pub fn as_str<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start..self.end]
    }

    /// Get a capture group by index (0 is the whole match)
    pub fn group(&self, n: usize) -> Option<(usize, usize)> {
        self.groups.get(n).copied().flatten()
    }

    /// Get a named capture group
    pub fn named_group(&self, name: &str) -> Option<(usize, usize)> {
        self.named_groups
            .get(name)
            .and_then(|&index| self.group(index))
    }

    /// Get the text of a capture group
    pub fn group_str<'a>(&self, input: &'a str, n: usize) -> Option<&'a str> {
        self.group(n).map(|(start, end)| &input[start..end])
    }

    /// Get the text of a named capture group
    pub fn named_group_str<'a>(&self, input: &'a str, name: &str) -> Option<&'a str> {
        self.named_group(name).map(|(start, end)| &input[start..end])
    }
}

/// An assembled pattern compiled for matching
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    flags: Flags,
    regex: Arc<fancy_regex::Regex>,
}

impl Pattern {
    /// Compile a pattern string with the given flags
    pub fn new(source: &str, flags: Flags) -> Result<Self> {
        Pattern::with_limit(source, flags, None)
    }

    /// Compile with an optional backtracking limit
    pub fn with_limit(
        source: &str,
        flags: Flags,
        backtrack_limit: Option<usize>,
    ) -> Result<Self> {
        log::debug!("compiling pattern {:?} with flags {:?}", source, flags);

        let full = format!("{}{}", flags.inline_prefix(), source);
        let mut builder = fancy_regex::RegexBuilder::new(&full);
        if let Some(limit) = backtrack_limit {
            builder.backtrack_limit(limit);
        }
        let regex = builder.build()?;

        Ok(Pattern {
            source: source.to_string(),
            flags,
            regex: Arc::new(regex),
        })
    }

    /// The assembled pattern, without flags
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Number of capture groups, including the whole match
    pub fn captures_len(&self) -> usize {
        self.regex.captures_len()
    }

    /// Names of the named capture groups, in order
    pub fn capture_names(&self) -> Vec<String> {
        self.regex
            .capture_names()
            .flatten()
            .map(str::to_string)
            .collect()
    }

    /// Check if the pattern matches anywhere in the input
    pub fn is_match(&self, text: &str) -> Result<bool> {
        Ok(self.regex.is_match(text)?)
    }

    /// Check if the pattern matches at the start of the input
    pub fn matches(&self, text: &str) -> Result<bool> {
        Ok(self.match_at_start(text)?.is_some())
    }

    /// Match at the start of the input, returning the captured groups
    pub fn match_at_start(&self, text: &str) -> Result<Option<Match>> {
        // the leftmost match starts at 0 whenever one starting at 0 exists
        Ok(self.find(text)?.filter(|m| m.start == 0))
    }

    /// Find the first match in the input
    pub fn find(&self, text: &str) -> Result<Option<Match>> {
        let captures = self.regex.captures(text)?;
        Ok(captures.map(|captures| Match::from_captures(&captures, &self.regex)))
    }

    /// Find all non-overlapping matches
    pub fn find_all(&self, text: &str) -> Result<Vec<Match>> {
        self.regex
            .captures_iter(text)
            .map(|captures| Ok(Match::from_captures(&captures?, &self.regex)))
            .collect()
    }

    /// Keep the items the pattern matches
    pub fn filter<'t, I>(&self, items: I) -> Result<Vec<&'t str>>
    where
        I: IntoIterator<Item = &'t str>,
    {
        let mut kept = Vec::new();
        for item in items {
            if self.is_match(item)? {
                kept.push(item);
            }
        }
        Ok(kept)
    }

    /// Split the input around matches.
    ///
    /// Text captured by groups that took part in a match is inserted
    /// between the surrounding pieces.
    pub fn split(&self, text: &str) -> Result<Vec<String>> {
        let mut pieces = Vec::new();
        let mut last = 0;

        for m in self.find_all(text)? {
            pieces.push(text[last..m.start].to_string());
            pieces.extend(
                (1..m.groups.len()).filter_map(|i| m.group_str(text, i).map(str::to_string)),
            );
            last = m.end;
        }
        pieces.push(text[last..].to_string());

        Ok(pieces)
    }

    /// Replace every match
    pub fn substitute<R: Replacer>(&self, replacement: R, text: &str) -> Result<String> {
        self.substitute_counting(replacement, text)
            .map(|(result, _)| result)
    }

    /// Replace every match, also returning how many were replaced
    pub fn substitute_counting<R: Replacer>(
        &self,
        mut replacement: R,
        text: &str,
    ) -> Result<(String, usize)> {
        let template = replacement.template().transpose()?;
        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        let mut count = 0;

        for m in self.find_all(text)? {
            result.push_str(&text[last..m.start]);
            match &template {
                Some(template) => result.push_str(&template.apply(&m, text)?),
                None => replacement.replace_match(&m, text, &mut result)?,
            }
            last = m.end;
            count += 1;
        }
        result.push_str(&text[last..]);

        Ok((result, count))
    }
}
