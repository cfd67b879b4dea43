//! Template sources
//!
//! A source resolves `(format, level)` to template text by naming convention:
//! `{format}/{level}.{ext}`, where the format decides the extension
//! (`clash/standard.yaml`, `singbox/basic.json`, ...).

use crate::error::{ConvertError, Result};
use crate::format::Format;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves template text for a format and level
pub trait TemplateSource: Send + Sync {
    /// Returns the template text.
    ///
    /// # Errors
    ///
    /// `TemplateLoadFailure` when no template exists for the pair.
    fn load(&self, format: Format, level: &str) -> Result<String>;
}

/// Relative path of a template: `{format}/{level}.{ext}`
pub fn template_path(format: Format, level: &str) -> Result<PathBuf> {
    validate_level(level)?;
    Ok(Path::new(format.id()).join(format!("{}.{}", level, format.extension())))
}

/// Level names may only contain ASCII letters, digits, `-` and `_`.
fn validate_level(level: &str) -> Result<()> {
    if !level.is_empty()
        && level
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(ConvertError::TemplateLoadFailure(format!(
            "Invalid level name: {:?}",
            level
        )))
    }
}

/// Templates read from a directory on disk
#[derive(Debug, Clone)]
pub struct FsTemplateSource {
    root: PathBuf,
}

impl FsTemplateSource {
    /// Reads templates below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Template directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateSource for FsTemplateSource {
    fn load(&self, format: Format, level: &str) -> Result<String> {
        let path = self.root.join(template_path(format, level)?);
        debug!(path = %path.display(), "Reading template");
        std::fs::read_to_string(&path).map_err(|e| {
            ConvertError::TemplateLoadFailure(format!(
                "Failed to read template {}: {}",
                path.display(),
                e
            ))
        })
    }
}

/// Templates compiled into the library
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedTemplateSource;

impl TemplateSource for EmbeddedTemplateSource {
    fn load(&self, format: Format, level: &str) -> Result<String> {
        validate_level(level)?;
        let text = match (format, level) {
            (Format::Clash, "basic") => include_str!("../../templates/clash/basic.yaml"),
            (Format::Clash, "standard") => include_str!("../../templates/clash/standard.yaml"),
            (Format::Clash, "advanced") => include_str!("../../templates/clash/advanced.yaml"),
            (Format::Surge, "basic") => include_str!("../../templates/surge/basic.conf"),
            (Format::Surge, "standard") => include_str!("../../templates/surge/standard.conf"),
            (Format::QuantumultX, "basic") => include_str!("../../templates/quantumult/basic.conf"),
            (Format::QuantumultX, "standard") => {
                include_str!("../../templates/quantumult/standard.conf")
            }
            (Format::SingBox, "basic") => include_str!("../../templates/singbox/basic.json"),
            (Format::SingBox, "standard") => include_str!("../../templates/singbox/standard.json"),
            (Format::SingBox, "advanced") => include_str!("../../templates/singbox/advanced.json"),
            _ => {
                return Err(ConvertError::TemplateLoadFailure(format!(
                    "No embedded template {}",
                    template_path(format, level)?.display()
                )));
            }
        };
        Ok(text.to_string())
    }
}

/// Templates held in memory, keyed by format and level
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplateSource {
    templates: HashMap<(Format, String), String>,
}

impl MemoryTemplateSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template, builder style.
    pub fn with(mut self, format: Format, level: &str, text: &str) -> Self {
        self.templates
            .insert((format, level.to_string()), text.to_string());
        self
    }
}

impl TemplateSource for MemoryTemplateSource {
    fn load(&self, format: Format, level: &str) -> Result<String> {
        self.templates
            .get(&(format, level.to_string()))
            .cloned()
            .ok_or_else(|| {
                ConvertError::TemplateLoadFailure(format!(
                    "No template for {}/{}",
                    format, level
                ))
            })
    }
}
