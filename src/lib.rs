//! nfenrich - Nextflow log enrichment stage
//!
//! Correlates side-channel metadata emitted by Nextflow tasks with the plain
//! log lines those tasks produce, so downstream log storage can be queried by
//! structured fields (workflow, run, sample, attempt, job, node) instead of
//! raw text. Metadata-carrying records are absorbed into a bounded registry
//! keyed by source path and never forwarded; every other record is stamped
//! with the stored fields, a stream classification and a provenance tag.

pub mod cli;
pub mod config;
pub mod enrich;
pub mod error;
pub mod pipeline;

pub use error::{EnrichError, Result};
