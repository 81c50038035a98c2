//! Plugin registry: priority-ordered chain of token resolvers

use std::fmt;

use tracing::trace;

use crate::error::TimError;

use super::pattern::Pattern;
use super::resolver::Scope;

/// Priority given to plugins that don't ask for one
pub const DEFAULT_PRIORITY: i32 = 0;

/// Outcome of a single resolver attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Replacement text for the token; an empty string is a valid result
    Resolved(String),
    /// Pass the content on to the next matching plugin
    Declined,
}

impl Resolution {
    pub fn resolved(text: impl Into<String>) -> Self {
        Resolution::Resolved(text.into())
    }
}

/// Resolver signature stored in the registry
pub type ResolverFn = dyn Fn(&str, &Scope<'_>) -> Result<Resolution, TimError> + Send + Sync;

/// A plugin bundling its own pattern, priority and resolver
pub trait Plugin: Send + Sync {
    /// Identifier used for `unregister` and in error messages
    fn id(&self) -> Option<&str> {
        None
    }

    fn pattern(&self) -> Pattern;

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn resolve(&self, content: &str, scope: &Scope<'_>) -> Result<Resolution, TimError>;
}

/// A registered resolver
pub struct PluginEntry {
    id: Option<String>,
    pattern: Pattern,
    resolver: Box<ResolverFn>,
    priority: i32,
}

impl PluginEntry {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }
}

impl fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginEntry")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Registry of plugins, kept sorted so that higher priorities run first.
///
/// Plugins with equal priority run in registration order.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    entries: Vec<PluginEntry>,
}

impl PluginRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an anonymous resolver
    pub fn register<F>(
        &mut self,
        pattern: Pattern,
        resolver: F,
        priority: i32,
    ) -> Result<(), TimError>
    where
        F: Fn(&str, &Scope<'_>) -> Result<Resolution, TimError> + Send + Sync + 'static,
    {
        self.insert(PluginEntry {
            id: None,
            pattern,
            resolver: Box::new(resolver),
            priority,
        })
    }

    /// Register a resolver under an id that can later be unregistered
    pub fn register_with_id<F>(
        &mut self,
        id: &str,
        pattern: Pattern,
        resolver: F,
        priority: i32,
    ) -> Result<(), TimError>
    where
        F: Fn(&str, &Scope<'_>) -> Result<Resolution, TimError> + Send + Sync + 'static,
    {
        self.insert(PluginEntry {
            id: Some(id.to_string()),
            pattern,
            resolver: Box::new(resolver),
            priority,
        })
    }

    /// Register a [`Plugin`] implementation
    pub fn install<P: Plugin + 'static>(&mut self, plugin: P) -> Result<(), TimError> {
        let id = plugin.id().map(str::to_string);
        let pattern = plugin.pattern();
        let priority = plugin.priority();
        let resolver = move |content: &str, scope: &Scope<'_>| plugin.resolve(content, scope);

        self.insert(PluginEntry {
            id,
            pattern,
            resolver: Box::new(resolver),
            priority,
        })
    }

    fn insert(&mut self, entry: PluginEntry) -> Result<(), TimError> {
        if let Some(id) = &entry.id {
            if id.is_empty() {
                return Err(TimError::invalid_plugin("plugin id must not be empty"));
            }
            if self.contains(id) {
                return Err(TimError::invalid_plugin(format!(
                    "plugin id '{}' is already registered",
                    id
                )));
            }
        }

        self.entries.push(entry);
        // Stable: equal priorities keep registration order
        self.entries.sort_by_key(|e| std::cmp::Reverse(e.priority));
        Ok(())
    }

    /// Remove the plugin registered under `id`; returns whether one was found
    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id() != Some(id));
        self.entries.len() != before
    }

    /// Check if a plugin with this id is registered
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id() == Some(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in the order `resolve` tries them
    pub fn iter(&self) -> impl Iterator<Item = &PluginEntry> {
        self.entries.iter()
    }

    /// Run the content through the chain; the first plugin to resolve wins
    pub(crate) fn resolve(&self, content: &str, scope: &Scope<'_>) -> Result<String, TimError> {
        for (index, entry) in self.entries.iter().enumerate() {
            if !entry.pattern.matches(content) {
                continue;
            }

            match (entry.resolver)(content, scope)? {
                Resolution::Resolved(text) => {
                    trace!(plugin = ?entry.id, index, content, "plugin resolved token");
                    return Ok(text);
                }
                Resolution::Declined => {
                    trace!(plugin = ?entry.id, index, content, "plugin declined token");
                }
            }
        }

        Err(TimError::unresolved(content))
    }
}
