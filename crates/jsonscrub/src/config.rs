//! TOML configuration.
//!
//! ```toml
//! [scan]
//! encoding = "utf8"
//! escape_mode = "counted"
//! initial_capacity = 512
//!
//! [sanitize]
//! safelist = "relaxed"
//! json_escape = true
//! allow_multiple_encoding = false
//! allow_mixed_encoding = false
//!
//! [filter]
//! excluded_paths = ["/v3/api-docs", "/swagger-ui/"]
//! text_policy = "clean"
//! max_body_bytes = 1048576
//! ```
//!
//! Every section and key is optional; unknown keys are an error.
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ConfigError, filter::FilterConfig, options::ScanOptions, sanitize::SanitizeConfig};

/// Complete configuration for scanning, sanitizing and request filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrubConfig {
    /// `[scan]`: scanner options.
    pub scan: ScanOptions,
    /// `[sanitize]`: the JSON literal pipeline.
    pub sanitize: SanitizeConfig,
    /// `[filter]`: request filtering.
    pub filter: FilterConfig,
}

impl ScrubConfig {
    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML, unknown keys or
    /// values of the wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise see
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Renders the config, defaults included, as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Render`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
