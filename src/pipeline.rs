// Synchronous NDJSON driver standing in for the log-shipper callback
//
// Reads one JSON object per line, runs each through the enrichment stage in
// arrival order, and writes forwarded records back out as JSON lines.
// Malformed input degrades to a warning, never a pipeline abort.

use std::io::{BufRead, Write};

use crate::config::Config;
use crate::enrich::{Directive, EnrichmentStage, LogRecord};
use crate::error::{EnrichError, Result};

/// Counters accumulated over one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Well-formed records handed to the stage
    pub records_in: u64,
    /// Records forwarded downstream
    pub forwarded: u64,
    /// Metadata records absorbed and dropped
    pub dropped: u64,
    /// Input lines that were not a JSON object
    pub malformed: u64,
}

/// Record loop owning one enrichment stage
///
/// Single-threaded by construction: one stage per pipeline, records
/// processed strictly in input order, no shared state.
pub struct Pipeline {
    stage: EnrichmentStage,
    report_interval: u64,
}

impl Pipeline {
    /// Create a pipeline from configuration
    pub fn new(config: &Config) -> Self {
        Self {
            stage: EnrichmentStage::new(
                config.enrichment.strategy,
                config.enrichment.capacity,
            ),
            report_interval: config.pipeline.report_interval,
        }
    }

    /// Drive the stage over an NDJSON stream until EOF
    pub fn run<R: BufRead, W: Write>(&mut self, reader: R, writer: &mut W) -> Result<PipelineStats> {
        let mut stats = PipelineStats::default();

        for line in reader.lines() {
            let line = line.map_err(|e| EnrichError::Io {
                source: e,
                context: "Failed to read input line".to_string(),
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let value: serde_json::Value = match serde_json::from_str(&line) {
                Ok(value) => value,
                Err(e) => {
                    stats.malformed += 1;
                    tracing::warn!("Skipping unparseable input line: {}", e);
                    continue;
                }
            };
            let Some(obj) = value.as_object() else {
                stats.malformed += 1;
                tracing::warn!("Skipping non-object input line");
                continue;
            };

            let mut record = LogRecord::from_json(obj);
            stats.records_in += 1;

            match self.stage.process(&mut record) {
                Directive::Drop => {
                    stats.dropped += 1;
                }
                Directive::Forward => {
                    let json = serde_json::to_string(&record.to_json()).map_err(|e| {
                        EnrichError::Json {
                            source: e,
                            context: "Failed to serialize output record".to_string(),
                        }
                    })?;
                    writeln!(writer, "{}", json).map_err(|e| EnrichError::Io {
                        source: e,
                        context: "Failed to write output record".to_string(),
                    })?;
                    stats.forwarded += 1;
                }
            }

            if stats.records_in % self.report_interval == 0 {
                tracing::info!(
                    records = stats.records_in,
                    forwarded = stats.forwarded,
                    dropped = stats.dropped,
                    tracked_sources = self.stage.registry().len(),
                    "pipeline progress"
                );
            }
        }

        writer.flush().map_err(|e| EnrichError::Io {
            source: e,
            context: "Failed to flush output".to_string(),
        })?;

        tracing::info!(
            records = stats.records_in,
            forwarded = stats.forwarded,
            dropped = stats.dropped,
            malformed = stats.malformed,
            "pipeline finished"
        );

        Ok(stats)
    }

    /// Read access to the owned enrichment stage
    pub fn stage(&self) -> &EnrichmentStage {
        &self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_lines(config: &Config, input: &str) -> (PipelineStats, Vec<serde_json::Value>) {
        let mut pipeline = Pipeline::new(config);
        let mut output = Vec::new();
        let stats = pipeline.run(Cursor::new(input), &mut output).unwrap();

        let records = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        (stats, records)
    }

    #[test]
    fn test_metadata_then_log_line() {
        let input = concat!(
            r#"{"date":1.0,"path":"t.log","nextflow_metadata":true,"workflow":"w1"}"#,
            "\n",
            r#"{"date":2.0,"path":"t.log","log":"hello"}"#,
            "\n",
        );
        let (stats, records) = run_lines(&Config::default(), input);

        assert_eq!(stats.records_in, 2);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.forwarded, 1);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["workflow"], "w1");
        assert_eq!(records[0]["stream"], "stdout");
        assert_eq!(records[0]["source"], "nextflow");
        assert_eq!(records[0]["date"], 2.0);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let input = concat!(
            "not json at all\n",
            "[1,2,3]\n",
            "\n",
            r#"{"date":1.0,"path":"t.log","log":"ok"}"#,
            "\n",
        );
        let (stats, records) = run_lines(&Config::default(), input);

        assert_eq!(stats.malformed, 2);
        assert_eq!(stats.records_in, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["log"], "ok");
    }
}
