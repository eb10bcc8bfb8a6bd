// Bounded source registry with FIFO-by-first-seen eviction
// Tracks the most recent metadata set per log source (one file per task attempt)
use ahash::{HashMap, HashMapExt};
use std::collections::VecDeque;

use crate::enrich::types::MetadataSet;

/// Default number of tracked sources before eviction kicks in
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Bounded mapping from source identifier to its most recent metadata set
///
/// Eviction is FIFO by first-seen order rather than LRU: task output files
/// are short-lived and not revisited once an attempt completes, so the
/// cheapest policy that bounds memory is enough. Overwriting an existing
/// source never changes its eviction position.
pub struct SourceRegistry {
    /// Maximum number of distinct sources tracked at once
    capacity: usize,

    /// Source identifier -> most recent metadata set
    metadata: HashMap<String, MetadataSet>,

    /// Source identifiers in first-seen order; front is evicted next
    eviction_order: VecDeque<String>,
}

impl SourceRegistry {
    /// Create a registry bounded to `capacity` distinct sources
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            metadata: HashMap::new(),
            eviction_order: VecDeque::new(),
        }
    }

    /// Insert or overwrite the metadata set for a source
    ///
    /// A new metadata set replaces the old one wholesale, never merged
    /// field-by-field. When a first-seen source pushes the registry past
    /// capacity, exactly the single oldest source is dropped.
    pub fn put(&mut self, source_id: &str, metadata: MetadataSet) {
        if self.metadata.insert(source_id.to_string(), metadata).is_none() {
            self.eviction_order.push_back(source_id.to_string());

            if self.eviction_order.len() > self.capacity {
                if let Some(oldest) = self.eviction_order.pop_front() {
                    self.metadata.remove(&oldest);
                    tracing::debug!(source = %oldest, "evicted oldest tracked source");
                }
            }
        }
    }

    /// Look up the stored metadata set for a source, if still tracked
    pub fn get(&self, source_id: &str) -> Option<&MetadataSet> {
        self.metadata.get(source_id)
    }

    /// Number of sources currently tracked
    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    /// True if no sources are tracked
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    /// Configured capacity bound
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
