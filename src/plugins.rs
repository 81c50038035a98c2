//! Stock plugins built on the public registry contract
//!
//! - [`DotPath`] looks content such as `user.name` up in a JSON value
//! - [`InnerTokens`] resolves tokens nested inside another token's content
//! - [`CatchAll`] turns any leftover token into fixed text

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::TimError;
use crate::template::{Pattern, Plugin, Resolution, Scope};

/// Lowercase identifiers, digits and underscores separated by dots
pub const DOT_PATH_PATTERN: &str = r"^[a-z0-9_][.a-z0-9_]*$";

static DOT_PATH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DOT_PATH_PATTERN).expect("dot path pattern should be a valid regex"));

/// Looks up dot-separated paths in a data value.
///
/// Object members are addressed by key, array items by index, so
/// `items.0.name` reads the `name` of the first item.
#[derive(Debug, Clone)]
pub struct DotPath {
    data: Value,
    strict: bool,
    pattern: Regex,
}

impl DotPath {
    pub const ID: &'static str = "dot-path";

    /// Create a strict lookup: a missing path is an error
    pub fn new(data: Value) -> Self {
        Self {
            data,
            strict: true,
            pattern: DOT_PATH_REGEX.clone(),
        }
    }

    /// Decline missing paths instead of failing, leaving them to later plugins
    pub fn lenient(mut self) -> Self {
        self.strict = false;
        self
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Follow `path` through the data
    ///
    /// On failure, returns the first segment that could not be found.
    pub fn lookup<'a, 'p>(&'a self, path: &'p str) -> Result<&'a Value, &'p str> {
        path.split('.').try_fold(&self.data, |value, segment| {
            let next = match value {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            next.ok_or(segment)
        })
    }
}

impl Plugin for DotPath {
    fn id(&self) -> Option<&str> {
        Some(Self::ID)
    }

    fn pattern(&self) -> Pattern {
        Pattern::Regex(self.pattern.clone())
    }

    fn resolve(&self, content: &str, scope: &Scope<'_>) -> Result<Resolution, TimError> {
        match self.lookup(content) {
            Ok(value) => Ok(Resolution::Resolved(render_value(value))),
            Err(_) if !self.strict => Ok(Resolution::Declined),
            Err(segment) => Err(TimError::Plugin {
                plugin: Self::ID.to_string(),
                content: content.to_string(),
                message: format!("'{}' not found in {}", segment, scope.delimiters().wrap(content)),
            }),
        }
    }
}

/// Text a data value is substituted as
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Resolves the tokens inside a composite token's content before emitting it.
///
/// `{{a{{b}}c}}` becomes whatever `a{{b}}c` resolves to. Content without an
/// open marker is declined.
#[derive(Debug, Clone, Copy, Default)]
pub struct InnerTokens;

impl InnerTokens {
    pub const ID: &'static str = "inner-tokens";
    pub const PRIORITY: i32 = 10;
}

impl Plugin for InnerTokens {
    fn id(&self) -> Option<&str> {
        Some(Self::ID)
    }

    fn pattern(&self) -> Pattern {
        Pattern::any()
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn resolve(&self, content: &str, scope: &Scope<'_>) -> Result<Resolution, TimError> {
        if !content.contains(scope.delimiters().open()) {
            return Ok(Resolution::Declined);
        }
        scope.run(content).map(Resolution::Resolved)
    }
}

/// Lowest-priority plugin that replaces any token with fixed text
#[derive(Debug, Clone, Default)]
pub struct CatchAll {
    replacement: String,
}

impl CatchAll {
    pub const ID: &'static str = "catch-all";

    /// Replace unresolved tokens with nothing
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_text(replacement: impl Into<String>) -> Self {
        Self {
            replacement: replacement.into(),
        }
    }
}

impl Plugin for CatchAll {
    fn id(&self) -> Option<&str> {
        Some(Self::ID)
    }

    fn pattern(&self) -> Pattern {
        Pattern::any()
    }

    fn priority(&self) -> i32 {
        i32::MIN
    }

    fn resolve(&self, _content: &str, _scope: &Scope<'_>) -> Result<Resolution, TimError> {
        Ok(Resolution::Resolved(self.replacement.clone()))
    }
}
