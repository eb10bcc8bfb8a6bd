// Shared types for the enrichment stage
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field carrying the source identifier (file path tagged by the log shipper)
pub const FIELD_PATH: &str = "path";

/// Field carrying the raw log payload
pub const FIELD_LOG: &str = "log";

/// Control field marking a metadata-carrying record (flagged-record strategy)
pub const FIELD_METADATA_FLAG: &str = "nextflow_metadata";

/// Field written with the stream classification ("stdout" / "stderr")
pub const FIELD_STREAM: &str = "stream";

/// Field written with the provenance tag
pub const FIELD_SOURCE: &str = "source";

/// Constant provenance tag identifying the originating workflow system
pub const SOURCE_TAG: &str = "nextflow";

/// Source identifiers ending in this suffix carry a task's stderr
pub const STDERR_SUFFIX: &str = ".command.err";

/// Structured context stored per source identifier
pub type MetadataSet = BTreeMap<String, String>;

/// Decision from the enrichment stage for a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Forward this record downstream
    Forward,
    /// Discard this record (it carried metadata, now absorbed)
    Drop,
}

/// One in-flight log record: a timestamp plus flat string fields
///
/// The source identifier and raw payload live in `fields` under the
/// reserved keys above, matching the shape the log shipper delivers.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Seconds since the epoch, as delivered by the shipper
    pub timestamp: f64,
    /// Flat field map; mutated in place by the enrichment stage
    pub fields: BTreeMap<String, String>,
}

impl LogRecord {
    /// Create a record with the given timestamp and no fields
    pub fn new(timestamp: f64) -> Self {
        Self {
            timestamp,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter, used heavily in tests
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Source identifier, if the shipper tagged one
    pub fn source_id(&self) -> Option<&str> {
        self.fields.get(FIELD_PATH).map(String::as_str)
    }

    /// Raw log payload, if present
    pub fn payload(&self) -> Option<&str> {
        self.fields.get(FIELD_LOG).map(String::as_str)
    }

    /// Build a record from one shipper JSON object
    ///
    /// The timestamp is read from `date` (seconds, number). String values are
    /// kept as-is; booleans and numbers are rendered to strings so the flag
    /// field works whether the shipper emits `true` or `"true"`. Nulls,
    /// arrays and objects are ignored.
    pub fn from_json(obj: &Map<String, Value>) -> Self {
        let timestamp = obj.get("date").and_then(Value::as_f64).unwrap_or(0.0);

        let mut fields = BTreeMap::new();
        for (key, value) in obj {
            if key == "date" {
                continue;
            }
            match value {
                Value::String(s) => {
                    fields.insert(key.clone(), s.clone());
                }
                Value::Bool(b) => {
                    fields.insert(key.clone(), b.to_string());
                }
                Value::Number(n) => {
                    fields.insert(key.clone(), n.to_string());
                }
                _ => {}
            }
        }

        Self { timestamp, fields }
    }

    /// Serialize back to the shipper JSON shape
    pub fn to_json(&self) -> Value {
        let mut obj = Map::with_capacity(self.fields.len() + 1);
        obj.insert("date".to_string(), self.timestamp.into());
        for (key, value) in &self.fields {
            obj.insert(key.clone(), Value::String(value.clone()));
        }
        Value::Object(obj)
    }
}

/// Counters accumulated by one enrichment stage instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichStats {
    /// Records handed to the stage
    pub records_seen: u64,
    /// Metadata-carrying records absorbed (dropped)
    pub metadata_absorbed: u64,
    /// Forwarded records that received stored metadata
    pub enriched: u64,
    /// Forwarded records with no stored metadata for their source
    pub forwarded_bare: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_json_keeps_scalars() {
        let value = json!({
            "date": 1700000000.5,
            "path": "/work/ab/12/.command.out",
            "log": "hello",
            "nextflow_metadata": true,
            "attempt": 2,
            "ignored": ["not", "flat"],
        });

        let record = LogRecord::from_json(value.as_object().unwrap());
        assert_eq!(record.timestamp, 1700000000.5);
        assert_eq!(record.source_id(), Some("/work/ab/12/.command.out"));
        assert_eq!(record.payload(), Some("hello"));
        assert_eq!(
            record.fields.get(FIELD_METADATA_FLAG).map(String::as_str),
            Some("true")
        );
        assert_eq!(record.fields.get("attempt").map(String::as_str), Some("2"));
        assert!(!record.fields.contains_key("ignored"));
        assert!(!record.fields.contains_key("date"));
    }

    #[test]
    fn test_record_json_round_trip() {
        let record = LogRecord::new(42.0)
            .with_field(FIELD_PATH, "t.log")
            .with_field(FIELD_LOG, "line");

        let value = record.to_json();
        let back = LogRecord::from_json(value.as_object().unwrap());
        assert_eq!(back, record);
    }

    #[test]
    fn test_missing_reserved_fields() {
        let record = LogRecord::new(0.0);
        assert_eq!(record.source_id(), None);
        assert_eq!(record.payload(), None);
    }
}
