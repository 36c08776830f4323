// src/config/validate.rs

use crate::config::model::{ConfigFile, OrchestratorOptions, RawConfigFile};
use crate::errors::{Result, TestorchError};
use crate::filter::FilterExpression;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TestorchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_options(&raw.orchestrator)?;
        Ok(ConfigFile::new_unchecked(raw.orchestrator))
    }
}

fn validate_options(options: &OrchestratorOptions) -> Result<()> {
    if options.default_batch_size == 0 {
        return Err(TestorchError::ConfigError(
            "[orchestrator].default_batch_size must be >= 1 (got 0)".to_string(),
        ));
    }

    if options.run_request_timeout_ms == 0 {
        return Err(TestorchError::ConfigError(
            "[orchestrator].run_request_timeout_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    if let Some(filter) = &options.test_case_filter {
        FilterExpression::parse(filter)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(options: OrchestratorOptions) -> RawConfigFile {
        RawConfigFile {
            orchestrator: options,
        }
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        assert_eq!(cfg.orchestrator(), &OrchestratorOptions::default());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let err = ConfigFile::try_from(raw(OrchestratorOptions {
            default_batch_size: 0,
            ..Default::default()
        }))
        .unwrap_err();
        assert!(matches!(err, TestorchError::ConfigError(msg) if msg.contains("default_batch_size")));
    }

    #[test]
    fn unparsable_ambient_filter_is_rejected() {
        let err = ConfigFile::try_from(raw(OrchestratorOptions {
            test_case_filter: Some("(Category=Slow".to_string()),
            ..Default::default()
        }))
        .unwrap_err();
        assert!(matches!(err, TestorchError::Filter(_)));
    }
}
