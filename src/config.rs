//! Converter settings
//!
//! Every field has a default, so an empty TOML file is a valid configuration:
//!
//! ```toml
//! template_dir = "/etc/vpn-link-convert/templates"
//! cache_ttl_secs = 3600
//! tag_suffix = "Mobile"
//! max_link_length = 2000
//! default_level = "standard"
//! ```

use crate::constants::{level, limits};
use crate::error::{ConvertError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default template cache time-to-live, in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Settings for a [`crate::Converter`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory with `{format}/{level}.{ext}` templates; embedded templates when unset
    pub template_dir: Option<PathBuf>,
    /// Lifetime of a compiled template in the cache
    pub cache_ttl_secs: u64,
    /// Text appended to every generated tag after a space.
    ///
    /// Opt-in: unset (the default) or blank gives bare `{display_name}-{position}` tags.
    pub tag_suffix: Option<String>,
    /// Longest accepted link, in characters
    pub max_link_length: usize,
    /// Level used when a request names none
    pub default_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            template_dir: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            tag_suffix: None,
            max_link_length: limits::MAX_LINK_LENGTH,
            default_level: level::STANDARD.to_string(),
        }
    }
}

impl Settings {
    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// `Config` when the text is not valid TOML or a field has the wrong type,
    /// or when `max_link_length` is zero.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// `Config` when the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading settings");
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConvertError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Template cache time-to-live
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.max_link_length == 0 {
            return Err(ConvertError::Config(
                "max_link_length must be greater than 0".to_string(),
            ));
        }
        if self.default_level.trim().is_empty() {
            return Err(ConvertError::Config("default_level must not be empty".to_string()));
        }
        Ok(())
    }
}
