// Metadata detection: decides whether a record carries structured context
// instead of a log line, and extracts that context
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::enrich::types::{
    LogRecord, MetadataSet, FIELD_LOG, FIELD_METADATA_FLAG, FIELD_PATH,
};

/// Capability shared by the two detection strategies
///
/// Returns the extracted metadata set for a metadata-carrying record, or
/// `None` for an ordinary log record that should pass through. Detectors
/// never mutate the record.
pub trait MetadataDetector: Send {
    fn detect(&self, record: &LogRecord) -> Option<MetadataSet>;
}

/// Which detection strategy the stage runs
///
/// The two strategies are mutually exclusive configuration choices; one
/// stage instance runs exactly one of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectorStrategy {
    /// Metadata records carry a boolean control field set to true
    #[default]
    Flag,
    /// Metadata records carry a JSON-shaped payload of flat string pairs
    InlineJson,
}

impl DetectorStrategy {
    /// Construct the detector this strategy names
    pub fn build(&self) -> Box<dyn MetadataDetector> {
        match self {
            DetectorStrategy::Flag => Box::new(FlaggedRecordDetector),
            DetectorStrategy::InlineJson => Box::new(InlineJsonDetector),
        }
    }

    /// Strategy name as written in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorStrategy::Flag => "flag",
            DetectorStrategy::InlineJson => "inline-json",
        }
    }
}

impl fmt::Display for DetectorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectorStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flag" => Ok(DetectorStrategy::Flag),
            "inline-json" => Ok(DetectorStrategy::InlineJson),
            other => Err(format!(
                "unknown detector strategy '{other}' (expected 'flag' or 'inline-json')"
            )),
        }
    }
}

/// Flagged-record strategy: a record is metadata-carrying iff its control
/// field is set to true
///
/// Extraction copies every field except the control field, the raw payload
/// and the source identifier.
pub struct FlaggedRecordDetector;

impl MetadataDetector for FlaggedRecordDetector {
    fn detect(&self, record: &LogRecord) -> Option<MetadataSet> {
        record.source_id()?;

        let flagged = record
            .fields
            .get(FIELD_METADATA_FLAG)
            .map(|v| v == "true")
            .unwrap_or(false);
        if !flagged {
            return None;
        }

        let metadata: MetadataSet = record
            .fields
            .iter()
            .filter(|(key, _)| {
                key.as_str() != FIELD_METADATA_FLAG
                    && key.as_str() != FIELD_LOG
                    && key.as_str() != FIELD_PATH
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Some(metadata)
    }
}

/// Inline-JSON strategy: a record is metadata-carrying iff its payload looks
/// like a JSON object and yields at least one flat string pair
///
/// The scanner is deliberately restricted, not a JSON parser: it collects
/// pairs of the literal shape `"key":"value"` (quoted key, quoted value) and
/// ignores numeric, boolean and nested values as well as escaped quotes. A
/// payload that starts with `{` but yields no such pair is treated as an
/// ordinary log line.
pub struct InlineJsonDetector;

impl MetadataDetector for InlineJsonDetector {
    fn detect(&self, record: &LogRecord) -> Option<MetadataSet> {
        record.source_id()?;
        let payload = record.payload()?;

        if !payload.trim_start().starts_with('{') {
            return None;
        }

        let metadata = scan_string_pairs(payload);
        if metadata.is_empty() {
            return None;
        }
        Some(metadata)
    }
}

/// Collect flat `"key":"value"` pairs from a payload
///
/// Reserved bookkeeping fields are excluded even if the payload names them.
fn scan_string_pairs(payload: &str) -> MetadataSet {
    let mut metadata = MetadataSet::new();
    let mut rest = payload;

    while let Some(key_start) = rest.find('"') {
        rest = &rest[key_start + 1..];
        let Some(key_end) = rest.find('"') else {
            break;
        };
        let key = &rest[..key_end];
        rest = &rest[key_end + 1..];

        let after_key = rest.trim_start();
        let Some(after_colon) = after_key.strip_prefix(':') else {
            continue;
        };
        let after_colon = after_colon.trim_start();
        let Some(value_rest) = after_colon.strip_prefix('"') else {
            // Non-string value; resume scanning past the colon
            rest = after_colon;
            continue;
        };
        let Some(value_end) = value_rest.find('"') else {
            break;
        };
        let value = &value_rest[..value_end];
        rest = &value_rest[value_end + 1..];

        if key.is_empty() || key == FIELD_LOG || key == FIELD_METADATA_FLAG {
            continue;
        }
        metadata.insert(key.to_string(), value.to_string());
    }

    metadata
}
