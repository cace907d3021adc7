use std::borrow::Cow;

use crate::highlight::QuerySyntax;
use crate::{Error, Result};

/// Case-insensitive matcher compiled from a search query.
#[derive(Debug, Clone)]
pub(crate) struct QueryMatcher {
    backend: fancy_regex::Regex,
}

impl QueryMatcher {
    pub(crate) fn new(query: &str, syntax: QuerySyntax) -> Result<Self> {
        let pattern = match syntax {
            QuerySyntax::Literal => escape(query),
            QuerySyntax::Pattern => Cow::Borrowed(query),
        };
        let mut builder = fancy_regex::RegexBuilder::new(&pattern);
        builder.case_insensitive(true);
        let backend = builder
            .build()
            .map_err(|err| Error::Pattern(format!("{query}: {err}")))?;
        Ok(Self { backend })
    }

    /// Non-empty matches, left to right, without overlap.
    pub(crate) fn find_all(&self, input: &str) -> Result<Vec<Match>> {
        let mut out = Vec::new();
        for matched in self.backend.find_iter(input) {
            let matched = matched.map_err(|err| Error::Pattern(err.to_string()))?;
            if matched.start() == matched.end() {
                continue;
            }
            out.push(Match {
                start: matched.start(),
                end: matched.end(),
            });
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Match {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

pub(crate) fn escape(value: &str) -> Cow<'_, str> {
    if !value.chars().any(is_regex_meta) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 4);
    for ch in value.chars() {
        if is_regex_meta(ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    Cow::Owned(out)
}

fn is_regex_meta(ch: char) -> bool {
    matches!(
        ch,
        '\\' | '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '^' | '$'
    )
}
