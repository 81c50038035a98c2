//! Token scanning and plugin resolution
//!
//! This module provides the core of tim: a registry of plugins ordered by
//! priority, a scanner that finds balanced tokens, and the engine that ties the
//! two together by substituting one token per pass until none are left.
//!
//! # Example
//!
//! ```rust
//! use tim::template::{Engine, Pattern, Resolution, Scope};
//!
//! let mut engine = Engine::new();
//! engine
//!     .register(
//!         Pattern::regex(r"^\w+$").unwrap(),
//!         |content: &str, _: &Scope<'_>| Ok(Resolution::resolved(content.to_uppercase())),
//!         0,
//!     )
//!     .unwrap();
//!
//! assert_eq!(engine.run("hello {{world}}").unwrap(), "hello WORLD");
//! ```

mod pattern;
mod registry;
mod resolver;
mod scanner;

pub use pattern::{Pattern, PredicateFn};
pub use registry::{Plugin, PluginEntry, PluginRegistry, Resolution, ResolverFn, DEFAULT_PRIORITY};
pub use resolver::{Engine, Scope};
pub use scanner::{next_token, Token};
