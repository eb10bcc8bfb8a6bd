use crate::config::Config;
use crate::error::{EnrichError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        // Validate schema version
        Self::validate_schema_version(config, &mut errors);

        // Validate enrichment settings
        Self::validate_enrichment(config, &mut errors);

        // Validate pipeline settings
        Self::validate_pipeline(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EnrichError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_enrichment(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.enrichment.capacity == 0 {
            errors.push(ValidationError::new(
                "enrichment.capacity",
                "Capacity must be at least 1",
            ));
        }
    }

    fn validate_pipeline(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.pipeline.report_interval == 0 {
            errors.push(ValidationError::new(
                "pipeline.report_interval",
                "Report interval must be at least 1",
            ));
        }
    }
}
