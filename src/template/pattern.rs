//! Patterns that decide which plugins get to see a token's content

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::TimError;

/// Predicate signature accepted by [`Pattern::predicate`]
pub type PredicateFn = dyn Fn(&str) -> bool + Send + Sync;

/// Tests whether a token's raw content is one a plugin should attempt
#[derive(Clone)]
pub enum Pattern {
    /// Matches every content, including the empty string
    Any,
    /// Matches content equal to the literal
    Literal(String),
    /// Matches content the regex finds a match in
    Regex(Regex),
    /// Matches content the predicate accepts
    Predicate(Arc<PredicateFn>),
}

impl Pattern {
    pub fn any() -> Self {
        Pattern::Any
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Pattern::Literal(text.into())
    }

    /// Compile a regex pattern; a bad expression makes the plugin unusable
    pub fn regex(source: &str) -> Result<Self, TimError> {
        Regex::new(source).map(Pattern::Regex).map_err(|e| {
            TimError::invalid_plugin(format!("pattern {:?} does not compile: {}", source, e))
        })
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Pattern::Predicate(Arc::new(f))
    }

    pub fn matches(&self, content: &str) -> bool {
        match self {
            Pattern::Any => true,
            Pattern::Literal(text) => text == content,
            Pattern::Regex(regex) => regex.is_match(content),
            Pattern::Predicate(f) => f(content),
        }
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Pattern::Regex(regex)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Any => f.write_str("Any"),
            Pattern::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Pattern::Regex(regex) => f.debug_tuple("Regex").field(&regex.as_str()).finish(),
            Pattern::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}
