//! Engine configuration: delimiter pair and loop limits
//!
//! Configuration can be built in code with the `with_*` builders or loaded from
//! a TOML file:
//!
//! ```toml
//! [delimiters]
//! open = "<%"
//! close = "%>"
//!
//! [limits]
//! passes = 10000
//! recursion = 32
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::error::TimError;

/// Errors that can occur when loading or parsing a config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(#[from] TimError),
}

/// Open and close markers that bound a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    open: String,
    close: String,
}

impl Delimiters {
    pub const DEFAULT_OPEN: &'static str = "{{";
    pub const DEFAULT_CLOSE: &'static str = "}}";

    /// Create a delimiter pair, rejecting empty or identical markers
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Result<Self, TimError> {
        let open = open.into();
        let close = close.into();

        if open.is_empty() || close.is_empty() {
            return Err(TimError::InvalidDelimiters {
                reason: "markers must not be empty".to_string(),
            });
        }
        if open == close {
            return Err(TimError::InvalidDelimiters {
                reason: format!("open and close markers are both {:?}", open),
            });
        }

        Ok(Self { open, close })
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    /// Surround content with the markers, e.g. `name` -> `{{name}}`
    pub fn wrap(&self, content: &str) -> String {
        format!("{}{}{}", self.open, content, self.close)
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: Self::DEFAULT_OPEN.to_string(),
            close: Self::DEFAULT_CLOSE.to_string(),
        }
    }
}

/// Configuration for an [`Engine`](crate::Engine)
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Token markers
    pub delimiters: Delimiters,

    /// Maximum substitutions in a single run; `None` means unbounded
    pub pass_limit: Option<usize>,

    /// Maximum nesting of runs started by plugins through their scope
    pub recursion_limit: usize,
}

pub const DEFAULT_PASS_LIMIT: usize = 10_000;
pub const DEFAULT_RECURSION_LIMIT: usize = 64;

/// TOML structure for deserializing configs
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    delimiters: Option<TomlDelimiters>,
    limits: Option<TomlLimits>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlDelimiters {
    open: Option<String>,
    close: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlLimits {
    passes: Option<usize>,
    recursion: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            pass_limit: Some(DEFAULT_PASS_LIMIT),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string; missing keys keep their defaults
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(delimiters) = parsed.delimiters {
            let open = delimiters
                .open
                .unwrap_or_else(|| Delimiters::DEFAULT_OPEN.to_string());
            let close = delimiters
                .close
                .unwrap_or_else(|| Delimiters::DEFAULT_CLOSE.to_string());
            config.delimiters = Delimiters::new(open, close)?;
        }

        if let Some(limits) = parsed.limits {
            if let Some(passes) = limits.passes {
                config.pass_limit = Some(passes);
            }
            if let Some(recursion) = limits.recursion {
                config.recursion_limit = recursion;
            }
        }

        Ok(config)
    }

    /// Set the delimiter pair
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Cap the number of substitutions per run
    pub fn with_pass_limit(mut self, limit: usize) -> Self {
        self.pass_limit = Some(limit);
        self
    }

    /// Let runs substitute until no token is left, however long that takes
    pub fn without_pass_limit(mut self) -> Self {
        self.pass_limit = None;
        self
    }

    /// Set how deep plugins may nest runs
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.delimiters.open(), "{{");
        assert_eq!(config.delimiters.close(), "}}");
        assert_eq!(config.pass_limit, Some(DEFAULT_PASS_LIMIT));
        assert_eq!(config.recursion_limit, DEFAULT_RECURSION_LIMIT);
    }

    #[test]
    fn test_delimiters_reject_empty() {
        assert!(matches!(
            Delimiters::new("", "}}"),
            Err(TimError::InvalidDelimiters { .. })
        ));
        assert!(matches!(
            Delimiters::new("{{", ""),
            Err(TimError::InvalidDelimiters { .. })
        ));
    }

    #[test]
    fn test_delimiters_reject_identical() {
        assert!(matches!(
            Delimiters::new("%%", "%%"),
            Err(TimError::InvalidDelimiters { .. })
        ));
    }

    #[test]
    fn test_delimiters_wrap() {
        let delimiters = Delimiters::new("<%", "%>").expect("valid pair");
        assert_eq!(delimiters.wrap("name"), "<%name%>");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[delimiters]
open = "<%"
close = "%>"

[limits]
passes = 100
recursion = 8
"#;
        let config = EngineConfig::from_toml(toml_str).expect("Should parse");
        assert_eq!(config.delimiters.open(), "<%");
        assert_eq!(config.delimiters.close(), "%>");
        assert_eq!(config.pass_limit, Some(100));
        assert_eq!(config.recursion_limit, 8);
    }

    #[test]
    fn test_parse_partial_toml_keeps_defaults() {
        let toml_str = r#"
[delimiters]
open = "[["
"#;
        let config = EngineConfig::from_toml(toml_str).expect("Should parse");
        assert_eq!(config.delimiters.open(), "[[");
        assert_eq!(config.delimiters.close(), "}}");
        assert_eq!(config.pass_limit, Some(DEFAULT_PASS_LIMIT));
        assert_eq!(config.recursion_limit, DEFAULT_RECURSION_LIMIT);
    }

    #[test]
    fn test_from_file_missing_path_is_io_error() {
        let result = EngineConfig::from_file(Path::new("no/such/dir/tim.toml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_from_file_reads_toml() {
        let path = std::env::temp_dir().join(format!("tim-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[limits]\nrecursion = 3\n").expect("write temp config");

        let result = EngineConfig::from_file(&path);
        std::fs::remove_file(&path).ok();

        let config = result.expect("Should load");
        assert_eq!(config.recursion_limit, 3);
        assert_eq!(config.pass_limit, Some(DEFAULT_PASS_LIMIT));
    }

    #[test]
    fn test_without_pass_limit() {
        let config = EngineConfig::new().without_pass_limit();
        assert_eq!(config.pass_limit, None);
    }

    #[test]
    fn test_parse_empty_toml() {
        let config = EngineConfig::from_toml("").expect("Should parse");
        assert_eq!(config.delimiters, Delimiters::default());
    }

    #[test]
    fn test_invalid_delimiters_in_toml() {
        let toml_str = r#"
[delimiters]
open = "@@"
close = "@@"
"#;
        let result = EngineConfig::from_toml(toml_str);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_key_error() {
        let result = EngineConfig::from_toml("[limits]\ndepth = 3\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = EngineConfig::from_toml("this is not valid toml {{{{");
        assert!(result.is_err());
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::new()
            .with_pass_limit(5)
            .with_recursion_limit(2)
            .with_delimiters(Delimiters::new("(", ")").unwrap());
        assert_eq!(config.pass_limit, Some(5));
        assert_eq!(config.recursion_limit, 2);
        assert_eq!(config.delimiters.open(), "(");
    }
}
