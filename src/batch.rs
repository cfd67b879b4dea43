//! Batch processing of many links
//!
//! Every input link yields exactly one [`BatchEntry`], in input order. A link
//! that fails to parse becomes a failure entry and the batch moves on; a link
//! that parses gets a [`FragmentSet`] and a tag numbered by its position in
//! the whole input (1-based), so numbering does not shift when earlier links fail.

use crate::constants::limits;
use crate::error::ConvertError;
use crate::format::{Format, Fragment, FragmentSet};
use crate::parse_link_with_limit;
use crate::record::ProxyRecord;
use tracing::{debug, warn};

/// Outcome of one link
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEntry {
    /// Link parsed; fragments generated for every format that can encode it
    Success {
        /// Original link text
        link: String,
        /// Canonical record
        record: ProxyRecord,
        /// Per-format fragments
        fragments: FragmentSet,
        /// `{display_name}-{position}[ {suffix}]`
        tag: String,
    },
    /// Link rejected
    Failure {
        /// Original link text
        link: String,
        /// Why it was rejected
        error: ConvertError,
    },
}

impl BatchEntry {
    /// Original link text
    pub fn link(&self) -> &str {
        match self {
            BatchEntry::Success { link, .. } | BatchEntry::Failure { link, .. } => link,
        }
    }

    /// Tag of a successful entry
    pub fn tag(&self) -> Option<&str> {
        match self {
            BatchEntry::Success { tag, .. } => Some(tag),
            BatchEntry::Failure { .. } => None,
        }
    }

    /// True when the link parsed
    pub fn is_success(&self) -> bool {
        matches!(self, BatchEntry::Success { .. })
    }

    /// Fragment for `format`, when the link parsed and the format encodes it
    pub fn fragment(&self, format: Format) -> Option<&Fragment> {
        match self {
            BatchEntry::Success { fragments, .. } => fragments.get(format),
            BatchEntry::Failure { .. } => None,
        }
    }

    /// Error that keeps this entry out of `format`'s document
    pub fn error_for(&self, format: Format) -> Option<&ConvertError> {
        match self {
            BatchEntry::Success { fragments, .. } => fragments.error(format),
            BatchEntry::Failure { error, .. } => Some(error),
        }
    }
}

/// Processed batch, one entry per input link
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    entries: Vec<BatchEntry>,
}

/// Successful entry as seen by one format
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Usable<'a> {
    /// Entry tag
    pub tag: &'a str,
    /// Fragment for the format
    pub fragment: &'a Fragment,
}

impl Batch {
    /// All entries in input order
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    /// Number of entries (equals the number of input links)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True for an empty input
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that contribute to `format`, in input order
    pub fn successes(&self, format: Format) -> Vec<Usable<'_>> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                BatchEntry::Success { tag, fragments, .. } => fragments
                    .get(format)
                    .map(|fragment| Usable { tag, fragment }),
                BatchEntry::Failure { .. } => None,
            })
            .collect()
    }

    /// `link → error` lines for every entry that does not contribute to `format`
    pub fn failure_report(&self, format: Format) -> String {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry
                    .error_for(format)
                    .map(|error| format!("{} → {}", entry.link(), error))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of entries that do not contribute to `format`
    pub fn failure_count(&self, format: Format) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.error_for(format).is_some())
            .count()
    }
}

/// Drives links through the parsers and serializers
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    tag_suffix: Option<String>,
    max_link_length: usize,
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self {
            tag_suffix: None,
            max_link_length: limits::MAX_LINK_LENGTH,
        }
    }
}

impl BatchProcessor {
    /// Creates a processor that appends `tag_suffix` to every tag.
    pub fn new(tag_suffix: Option<String>, max_link_length: usize) -> Self {
        Self {
            tag_suffix: tag_suffix.filter(|s| !s.trim().is_empty()),
            max_link_length,
        }
    }

    /// Processes `links` in order; never aborts on a bad link.
    pub fn process<S: AsRef<str>>(&self, links: &[S]) -> Batch {
        let entries = links
            .iter()
            .enumerate()
            .map(|(index, link)| self.process_one(index, link.as_ref()))
            .collect::<Vec<_>>();

        debug!(
            total = entries.len(),
            parsed = entries.iter().filter(|e| e.is_success()).count(),
            "Processed link batch"
        );
        Batch { entries }
    }

    fn process_one(&self, index: usize, link: &str) -> BatchEntry {
        match parse_link_with_limit(link, self.max_link_length) {
            Ok(record) => {
                let tag = self.tag_for(&record.display_name, index);
                let fragments = FragmentSet::generate(&record, &tag);
                for format in Format::ALL {
                    if let Some(error) = fragments.error(format) {
                        warn!(tag = %tag, format = %format, "Skipping fragment: {}", error);
                    }
                }
                BatchEntry::Success {
                    link: link.to_string(),
                    record,
                    fragments,
                    tag,
                }
            }
            Err(error) => {
                warn!(position = index + 1, "Rejected link: {}", error);
                BatchEntry::Failure {
                    link: link.to_string(),
                    error,
                }
            }
        }
    }

    /// `{display_name}-{index+1}`, followed by ` {suffix}` only when a suffix is configured
    pub fn tag_for(&self, display_name: &str, index: usize) -> String {
        match &self.tag_suffix {
            Some(suffix) => format!("{}-{} {}", display_name, index + 1, suffix),
            None => format!("{}-{}", display_name, index + 1),
        }
    }
}

/// Splits a delimited link list on commas and newlines, dropping blanks.
pub fn split_links(input: &str) -> Vec<String> {
    input
        .split([',', '\n', '\r'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
