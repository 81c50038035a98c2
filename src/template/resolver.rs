//! Template resolution - substitutes tokens until none are left

use tracing::debug;

use crate::config::{Delimiters, EngineConfig};
use crate::error::TimError;

use super::pattern::Pattern;
use super::registry::{Plugin, PluginRegistry, Resolution};
use super::scanner::next_token;

/// A plugin registry together with the configuration it runs under
#[derive(Debug, Default)]
pub struct Engine {
    registry: PluginRegistry,
    config: EngineConfig,
}

/// Handle given to resolvers for the duration of one resolution
///
/// Lets a plugin run the engine on text it owns, typically the nested tokens
/// inside its own content.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    engine: &'a Engine,
    depth: usize,
}

impl<'a> Scope<'a> {
    /// Resolve `template` with the same engine, one level deeper
    pub fn run(&self, template: &str) -> Result<String, TimError> {
        self.engine.run_at_depth(template, self.depth + 1)
    }

    pub fn delimiters(&self) -> &'a Delimiters {
        &self.engine.config.delimiters
    }

    /// Nesting level; zero for the run started by the caller
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Engine {
    /// Create an engine with no plugins and the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            registry: PluginRegistry::new(),
            config,
        }
    }

    pub fn from_registry(registry: PluginRegistry) -> Self {
        Self {
            registry,
            config: EngineConfig::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PluginRegistry {
        &mut self.registry
    }

    /// Register a resolver; see [`PluginRegistry::register`]
    pub fn register<F>(
        &mut self,
        pattern: Pattern,
        resolver: F,
        priority: i32,
    ) -> Result<(), TimError>
    where
        F: Fn(&str, &Scope<'_>) -> Result<Resolution, TimError> + Send + Sync + 'static,
    {
        self.registry.register(pattern, resolver, priority)
    }

    /// Register a [`Plugin`]; see [`PluginRegistry::install`]
    pub fn install<P: Plugin + 'static>(&mut self, plugin: P) -> Result<(), TimError> {
        self.registry.install(plugin)
    }

    /// Builder form of [`Engine::install`]
    pub fn with_plugin<P: Plugin + 'static>(mut self, plugin: P) -> Result<Self, TimError> {
        self.install(plugin)?;
        Ok(self)
    }

    /// Resolve every token in `template`.
    ///
    /// Each pass substitutes the first balanced token and rescans from the
    /// start, so replacement text may itself contain tokens. An unmatched open
    /// marker ends the loop and the template is returned as it stands.
    pub fn run(&self, template: &str) -> Result<String, TimError> {
        self.run_at_depth(template, 0)
    }

    /// Run the plugin chain on bare content, without scanning for tokens
    pub fn resolve(&self, content: &str) -> Result<String, TimError> {
        let scope = Scope {
            engine: self,
            depth: 0,
        };
        self.registry.resolve(content, &scope)
    }

    fn run_at_depth(&self, template: &str, depth: usize) -> Result<String, TimError> {
        if depth > self.config.recursion_limit {
            return Err(TimError::RecursionLimit {
                limit: self.config.recursion_limit,
            });
        }

        let scope = Scope {
            engine: self,
            depth,
        };
        let delimiters = &self.config.delimiters;
        let mut current = template.to_string();
        let mut passes = 0usize;

        while let Some(token) = next_token(&current, delimiters) {
            passes += 1;
            if let Some(limit) = self.config.pass_limit {
                if passes > limit {
                    return Err(TimError::PassLimit { limit });
                }
            }

            let content = token.content(&current);
            debug!(depth, pass = passes, content, "resolving token");

            let replacement = self
                .registry
                .resolve(content, &scope)
                .map_err(|e| e.with_context(&current, token.span.clone()))?;

            current.replace_range(token.span, &replacement);
        }

        debug!(depth, passes, "template resolved");
        Ok(current)
    }
}
