//! Memoized markup conversions.
//!
//! Entries are keyed by a blake3 digest of the input together with the
//! options used, so the same document converted with a different depth limit
//! or mention directory is a separate entry. Trees are hashed through their
//! canonical wire JSON.
//!
//! The map is a `DashMap`, so lookups from many threads only contend on the
//! shard that holds the key. When the cache is full an arbitrary entry is
//! evicted; failed conversions are never stored.

use crate::error::BabelError;
use crate::formats::markup::parser::parse_from_markup;
use crate::formats::markup::serializer::serialize_to_markup;
use crate::formats::markup::MarkupOptions;
use crate::ir::nodes::Document;
use crate::ir::wire::{to_wire, WireShape};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Direction {
    Serialize,
    Parse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    direction: Direction,
    digest: [u8; 32],
}

#[derive(Debug, Clone)]
enum Cached {
    Markup(String),
    Tree(Document),
}

/// Hit and miss counters since the cache was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug)]
pub struct ConversionCache {
    entries: DashMap<CacheKey, Cached>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ConversionCache {
    /// A cache holding at most `capacity` conversions; `0` disables storing.
    pub fn new(capacity: usize) -> Self {
        ConversionCache {
            entries: DashMap::new(),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Serializes `doc` to markup, reusing an earlier result for an equal
    /// tree and options.
    pub fn serialize(&self, doc: &Document, options: &MarkupOptions) -> Result<String, BabelError> {
        let input = serde_json::to_vec(&to_wire(doc, WireShape::Attribute))?;
        let key = self.key(Direction::Serialize, &input, options)?;

        if let Some(Cached::Markup(markup)) = self.lookup(&key) {
            return Ok(markup);
        }
        let markup = serialize_to_markup(doc, options)?;
        self.store(key, Cached::Markup(markup.clone()));
        Ok(markup)
    }

    /// Parses markup, reusing an earlier result for equal text and options.
    pub fn parse(&self, text: &str, options: &MarkupOptions) -> Result<Document, BabelError> {
        let key = self.key(Direction::Parse, text.as_bytes(), options)?;

        if let Some(Cached::Tree(doc)) = self.lookup(&key) {
            return Ok(doc);
        }
        let doc = parse_from_markup(text, options)?;
        self.store(key, Cached::Tree(doc.clone()));
        Ok(doc)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    fn key(
        &self,
        direction: Direction,
        input: &[u8],
        options: &MarkupOptions,
    ) -> Result<CacheKey, BabelError> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&serde_json::to_vec(options)?);
        hasher.update(&[0]);
        hasher.update(input);
        Ok(CacheKey {
            direction,
            digest: *hasher.finalize().as_bytes(),
        })
    }

    fn lookup(&self, key: &CacheKey) -> Option<Cached> {
        match self.entries.get(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(direction = ?key.direction, "conversion cache hit");
                Some(entry.value().clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(direction = ?key.direction, "conversion cache miss");
                None
            }
        }
    }

    fn store(&self, key: CacheKey, value: Cached) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            let victim = self.entries.iter().next().map(|entry| *entry.key());
            if let Some(victim) = victim {
                self.entries.remove(&victim);
                trace!("conversion cache full, evicted one entry");
            }
        }
        self.entries.insert(key, value);
    }
}

impl Default for ConversionCache {
    fn default() -> Self {
        ConversionCache::new(512)
    }
}
