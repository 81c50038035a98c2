//! tim - a tiny template engine driven by plugins
//!
//! Templates contain `{{...}}` tokens. Each token's content is handed to a
//! chain of registered plugins in priority order and the first plugin that
//! resolves it supplies the replacement text. Replacements are rescanned, so
//! plugins may emit further tokens.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//!
//! let output = tim::render("Hello {{user.name}}!", &json!({ "user": { "name": "Ada" } })).unwrap();
//! assert_eq!(output, "Hello Ada!");
//! ```

pub mod config;
pub mod error;
pub mod plugins;
pub mod template;

pub use config::{ConfigError, Delimiters, EngineConfig};
pub use error::{Span, TimError, TokenContext};
pub use plugins::{CatchAll, DotPath, InnerTokens};
pub use template::{Engine, Pattern, Plugin, PluginRegistry, Resolution, Scope};

use serde_json::Value;

/// Render a template against data with the default configuration
///
/// Tokens are dot paths into `data`; tokens nested inside other tokens are
/// resolved first. A token that is not a dot path, or names a missing path,
/// is an error.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
///
/// let data = json!({ "greeting": "hi", "names": ["ann", "bob"] });
/// assert_eq!(tim::render("{{greeting}} {{names.1}}", &data).unwrap(), "hi bob");
/// assert!(tim::render("{{missing}}", &data).is_err());
/// ```
pub fn render(template: &str, data: &Value) -> Result<String, TimError> {
    render_with_config(template, data, EngineConfig::default())
}

/// Render a template against data with a custom configuration
pub fn render_with_config(
    template: &str,
    data: &Value,
    config: EngineConfig,
) -> Result<String, TimError> {
    let engine = Engine::with_config(config)
        .with_plugin(InnerTokens)?
        .with_plugin(DotPath::new(data.clone()))?;
    engine.run(template)
}
