//! Request façade: links in, document out

use crate::batch::{Batch, BatchProcessor, split_links};
use crate::config::Settings;
use crate::error::{ConvertError, Result};
use crate::format::Format;
use crate::raw::RawListing;
use crate::template::{
    FormatDescriptor, FsTemplateSource, MemoryTemplateCache, TemplateRenderer, TemplateSource,
    catalog,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Links as submitted by a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkInput {
    /// One string with comma- or newline-separated links
    Delimited(String),
    /// Links already split
    List(Vec<String>),
}

impl LinkInput {
    /// Trimmed, non-empty links
    pub fn into_links(self) -> Vec<String> {
        match self {
            LinkInput::Delimited(text) => split_links(&text),
            LinkInput::List(links) => links
                .into_iter()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
        }
    }
}

impl From<&str> for LinkInput {
    fn from(text: &str) -> Self {
        LinkInput::Delimited(text.to_string())
    }
}

impl From<Vec<String>> for LinkInput {
    fn from(links: Vec<String>) -> Self {
        LinkInput::List(links)
    }
}

/// Rendered document plus batch counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Final document text
    pub document: String,
    /// Proxies included in the document
    pub proxy_count: usize,
    /// Links left out of the document
    pub failures: usize,
}

/// Converts link batches into documents
#[derive(Debug, Clone)]
pub struct Converter {
    settings: Settings,
    processor: BatchProcessor,
    renderer: TemplateRenderer,
}

impl Converter {
    /// Creates a converter whose renderer follows `settings`.
    ///
    /// Templates come from `settings.template_dir` when set, otherwise from the
    /// copies embedded in the library.
    pub fn new(settings: Settings) -> Result<Self> {
        let renderer = match &settings.template_dir {
            Some(dir) => {
                if !dir.is_dir() {
                    return Err(ConvertError::Config(format!(
                        "Template directory not found: {}",
                        dir.display()
                    )));
                }
                let source: Arc<dyn TemplateSource> = Arc::new(FsTemplateSource::new(dir));
                TemplateRenderer::new(
                    source,
                    Arc::new(MemoryTemplateCache::new(settings.cache_ttl())),
                )
            }
            None => TemplateRenderer::embedded(settings.cache_ttl()),
        };
        Ok(Self::with_renderer(settings, renderer))
    }

    /// Creates a converter around an existing renderer.
    pub fn with_renderer(settings: Settings, renderer: TemplateRenderer) -> Self {
        let processor =
            BatchProcessor::new(settings.tag_suffix.clone(), settings.max_link_length);
        Self {
            settings,
            processor,
            renderer,
        }
    }

    /// Settings in effect
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Renderer in use
    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    /// Processes `input` without rendering.
    pub fn process(&self, input: LinkInput) -> Batch {
        self.processor.process(&input.into_links())
    }

    /// Converts `input` into a `format` document at `level` (the default level when `None`).
    ///
    /// # Errors
    ///
    /// `InvalidInput` when no links were given, `BatchFailed` when no link
    /// produced a fragment for `format`, `TemplateLoadFailure` when the
    /// template cannot be loaded even at the baseline level.
    pub fn convert(&self, input: LinkInput, format: Format, level: Option<&str>) -> Result<Conversion> {
        let batch = self.usable_batch(input, format)?;
        let level = level
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.settings.default_level.as_str());

        let document = self.renderer.render(format, level, &batch)?;
        let proxy_count = batch.successes(format).len();
        let failures = batch.failure_count(format);
        info!(
            format = %format,
            level = %level,
            proxies = proxy_count,
            failures,
            "Converted link batch"
        );
        Ok(Conversion {
            document,
            proxy_count,
            failures,
        })
    }

    /// Lists tags and structured fragments for `format` without a template.
    ///
    /// # Errors
    ///
    /// Same input errors as [`Converter::convert`].
    pub fn convert_raw(&self, input: LinkInput, format: Format) -> Result<RawListing> {
        let batch = self.usable_batch(input, format)?;
        RawListing::from_batch(&batch, format)
    }

    /// Descriptor for a format id or alias
    pub fn template_info(&self, format: &str) -> Option<&'static FormatDescriptor> {
        catalog::template_info(format)
    }

    /// Levels for a format id or alias
    pub fn available_levels(&self, format: &str) -> &'static [&'static str] {
        catalog::available_levels(format)
    }

    fn usable_batch(&self, input: LinkInput, format: Format) -> Result<Batch> {
        let links = input.into_links();
        if links.is_empty() {
            return Err(ConvertError::InvalidInput("No links provided".to_string()));
        }

        let batch = self.processor.process(&links);
        if batch.successes(format).is_empty() {
            let report = batch.failure_report(format);
            debug!(format = %format, "No usable links in batch");
            return Err(ConvertError::BatchFailed(report));
        }
        Ok(batch)
    }
}
