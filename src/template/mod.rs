//! Template-driven document assembly
//!
//! [`TemplateRenderer`] turns a processed [`Batch`] into the final document for
//! one format and level. Templates are loaded lazily from an injected
//! [`TemplateSource`], compiled once and kept in an injected [`TemplateCache`].
//!
//! ## Level fallback
//!
//! When the requested level cannot be loaded, the renderer retries exactly
//! once with the baseline level (`basic`). If the baseline fails too, the
//! error is a `TemplateLoadFailure` naming both causes.

use crate::batch::Batch;
use crate::constants::level;
use crate::error::{ConvertError, Result};
use crate::format::Format;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub mod cache;
pub mod catalog;
pub mod compile;
pub mod source;

pub use cache::{MemoryTemplateCache, TemplateCache};
pub use catalog::{FormatDescriptor, available_levels, template_info};
pub use compile::{RenderContext, Template};
pub use source::{EmbeddedTemplateSource, FsTemplateSource, MemoryTemplateSource, TemplateSource};

/// Cache key of a compiled template
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateKey {
    /// Target format
    pub format: Format,
    /// Level name
    pub level: String,
}

impl TemplateKey {
    /// Creates a key.
    pub fn new(format: Format, level: &str) -> Self {
        Self {
            format,
            level: level.to_string(),
        }
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.format, self.level)
    }
}

/// Loads, caches and renders templates
#[derive(Clone)]
pub struct TemplateRenderer {
    source: Arc<dyn TemplateSource>,
    cache: Arc<dyn TemplateCache>,
}

impl fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRenderer").finish_non_exhaustive()
    }
}

impl TemplateRenderer {
    /// Creates a renderer over `source`, storing compiled templates in `cache`.
    pub fn new(source: Arc<dyn TemplateSource>, cache: Arc<dyn TemplateCache>) -> Self {
        Self { source, cache }
    }

    /// Renderer over the embedded templates with an in-memory cache.
    pub fn embedded(ttl: Duration) -> Self {
        Self::new(
            Arc::new(EmbeddedTemplateSource),
            Arc::new(MemoryTemplateCache::new(ttl)),
        )
    }

    /// Returns the compiled template for `(format, level)`, falling back to the baseline level.
    ///
    /// # Errors
    ///
    /// `TemplateLoadFailure` when neither the requested level nor the baseline can be loaded.
    pub fn load(&self, format: Format, level: &str) -> Result<Arc<Template>> {
        self.load_level(format, level, true)
    }

    fn load_level(&self, format: Format, level: &str, allow_fallback: bool) -> Result<Arc<Template>> {
        let key = TemplateKey::new(format, level);
        if let Some(template) = self.cache.get(&key) {
            debug!(key = %key, "Template cache hit");
            return Ok(template);
        }

        debug!(key = %key, "Template cache miss, compiling");
        let compiled = self
            .source
            .load(format, level)
            .and_then(|text| Template::compile(key.clone(), &text));

        match compiled {
            Ok(template) => {
                let template = Arc::new(template);
                self.cache.insert(key, Arc::clone(&template));
                Ok(template)
            }
            Err(err) if allow_fallback && level != level::BASIC => {
                warn!(
                    key = %key,
                    "Template unavailable, falling back to {}: {}",
                    level::BASIC,
                    err
                );
                self.load_level(format, level::BASIC, false).map_err(|base_err| {
                    ConvertError::TemplateLoadFailure(format!(
                        "{}: {}; baseline {}/{}: {}",
                        key,
                        detail(&err),
                        format,
                        level::BASIC,
                        detail(&base_err)
                    ))
                })
            }
            Err(err) => Err(ConvertError::TemplateLoadFailure(format!(
                "{}: {}",
                key,
                detail(&err)
            ))),
        }
    }

    /// Renders the successful entries of `batch` into a `format` document.
    ///
    /// # Errors
    ///
    /// `BatchFailed` when no entry of `batch` has a `format` fragment,
    /// `TemplateLoadFailure` when the template cannot be loaded or rendered.
    pub fn render(&self, format: Format, level: &str, batch: &Batch) -> Result<String> {
        let usable = batch.successes(format);
        if usable.is_empty() {
            return Err(ConvertError::BatchFailed(batch.failure_report(format)));
        }
        let template = self.load(format, level)?;
        let ctx = RenderContext {
            proxies: usable.iter().map(|u| u.fragment).collect(),
            proxy_names: usable.iter().map(|u| u.tag).collect(),
            generated_at: Utc::now(),
        };
        debug!(
            key = %template.key(),
            proxies = ctx.proxies.len(),
            "Rendering document"
        );
        template.render(&ctx)
    }

    /// Drops every cached template.
    pub fn reset(&self) {
        self.cache.reset();
    }
}

fn detail(err: &ConvertError) -> String {
    match err {
        ConvertError::TemplateLoadFailure(msg) => msg.clone(),
        other => other.to_string(),
    }
}
