//! Compiled template cache
//!
//! The renderer only sees the [`TemplateCache`] trait; [`MemoryTemplateCache`]
//! is the process-wide implementation. Two renders may miss on the same key at
//! once and both compile it; compilation is idempotent, so the last insert wins.

use super::TemplateKey;
use super::compile::Template;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Storage for compiled templates
pub trait TemplateCache: Send + Sync {
    /// Returns a live entry; expired entries are evicted and reported as missing.
    fn get(&self, key: &TemplateKey) -> Option<Arc<Template>>;

    /// Stores a compiled template, replacing any previous entry.
    fn insert(&self, key: TemplateKey, template: Arc<Template>);

    /// Drops one entry.
    fn invalidate(&self, key: &TemplateKey);

    /// Drops every entry.
    fn reset(&self);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    template: Arc<Template>,
    inserted_at: Instant,
}

/// In-memory cache with a fixed time-to-live
#[derive(Debug)]
pub struct MemoryTemplateCache {
    ttl: Duration,
    entries: RwLock<HashMap<TemplateKey, CacheEntry>>,
}

impl MemoryTemplateCache {
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Time-to-live of each entry
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, expired or not
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl TemplateCache for MemoryTemplateCache {
    fn get(&self, key: &TemplateKey) -> Option<Arc<Template>> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                    return Some(Arc::clone(&entry.template));
                }
                Some(_) => {}
                None => return None,
            }
        }

        debug!(key = %key, "Evicting expired template");
        let mut entries = self.entries.write();
        // Another thread may have refreshed it between the two locks.
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                Some(Arc::clone(&entry.template))
            }
            _ => {
                entries.remove(key);
                None
            }
        }
    }

    fn insert(&self, key: TemplateKey, template: Arc<Template>) {
        self.entries.write().insert(
            key,
            CacheEntry {
                template,
                inserted_at: Instant::now(),
            },
        );
    }

    fn invalidate(&self, key: &TemplateKey) {
        self.entries.write().remove(key);
    }

    fn reset(&self) {
        let mut entries = self.entries.write();
        debug!(count = entries.len(), "Resetting template cache");
        entries.clear();
    }
}
