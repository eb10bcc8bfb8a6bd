// Correlation/enrichment stage for Nextflow task logs
//
// Tasks emit one metadata-carrying record per output stream ahead of their
// log lines. The stage absorbs those records into a bounded registry keyed
// by source path, then stamps every later log line from the same source
// with the stored fields, a stream classification and a provenance tag.

mod detector;
mod registry;
mod types;

pub use detector::{
    DetectorStrategy, FlaggedRecordDetector, InlineJsonDetector, MetadataDetector,
};
pub use registry::{SourceRegistry, DEFAULT_CAPACITY};
pub use types::{
    Directive, EnrichStats, LogRecord, MetadataSet, FIELD_LOG, FIELD_METADATA_FLAG,
    FIELD_PATH, FIELD_SOURCE, FIELD_STREAM, SOURCE_TAG, STDERR_SUFFIX,
};

/// Per-record entry point of the enrichment pipeline
///
/// Owns one source registry and one detector; the host pipeline calls
/// `process` synchronously once per record, in arrival order. Metadata for a
/// source must arrive before the log lines it describes; lines whose
/// metadata was never seen (or already evicted) are forwarded bare rather
/// than treated as errors.
pub struct EnrichmentStage {
    registry: SourceRegistry,
    detector: Box<dyn MetadataDetector>,
    stats: EnrichStats,
}

impl EnrichmentStage {
    /// Create a stage with the given strategy and registry capacity
    pub fn new(strategy: DetectorStrategy, capacity: usize) -> Self {
        Self {
            registry: SourceRegistry::new(capacity),
            detector: strategy.build(),
            stats: EnrichStats::default(),
        }
    }

    /// Process one record, mutating it in place
    ///
    /// Returns `Directive::Drop` for absorbed metadata records and
    /// `Directive::Forward` for everything else. Records without a source
    /// identifier bypass enrichment entirely and are forwarded untouched.
    pub fn process(&mut self, record: &mut LogRecord) -> Directive {
        self.stats.records_seen += 1;

        let Some(source_id) = record.source_id().map(str::to_string) else {
            self.stats.forwarded_bare += 1;
            return Directive::Forward;
        };

        if let Some(metadata) = self.detector.detect(record) {
            self.registry.put(&source_id, metadata);
            self.stats.metadata_absorbed += 1;
            return Directive::Drop;
        }

        match self.registry.get(&source_id) {
            Some(metadata) => {
                // Stored fields win over same-named fields on the record
                for (key, value) in metadata {
                    record.fields.insert(key.clone(), value.clone());
                }
                self.stats.enriched += 1;
            }
            None => {
                self.stats.forwarded_bare += 1;
            }
        }

        let stream = if source_id.ends_with(STDERR_SUFFIX) {
            "stderr"
        } else {
            "stdout"
        };
        record.fields.insert(FIELD_STREAM.to_string(), stream.to_string());
        record
            .fields
            .insert(FIELD_SOURCE.to_string(), SOURCE_TAG.to_string());

        Directive::Forward
    }

    /// Snapshot of the stage counters
    pub fn stats(&self) -> EnrichStats {
        self.stats
    }

    /// Read access to the registry, used by tests and status reporting
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }
}

impl Default for EnrichmentStage {
    fn default() -> Self {
        Self::new(DetectorStrategy::default(), DEFAULT_CAPACITY)
    }
}
