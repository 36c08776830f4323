// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::settings::DEFAULT_BATCH_SIZE;

/// Config file as deserialized, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub orchestrator: OrchestratorOptions,
}

/// Validated config file. Build one through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    orchestrator: OrchestratorOptions,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(orchestrator: OrchestratorOptions) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &OrchestratorOptions {
        &self.orchestrator
    }

    pub fn into_options(self) -> OrchestratorOptions {
        self.orchestrator
    }
}

/// `[orchestrator]` section: the options every request falls back on.
///
/// The orchestrator holds one instance; `reset_options` swaps it for
/// `OrchestratorOptions::default()`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrchestratorOptions {
    /// Injected as `DesignMode` / `CollectSourceInformation` when the run
    /// settings do not set them.
    #[serde(default)]
    pub design_mode: bool,

    /// Filter used when a request does not carry its own.
    #[serde(default)]
    pub test_case_filter: Option<String>,

    /// Event batch frequency when the run settings have no `BatchSize`.
    #[serde(default = "default_batch_size")]
    pub default_batch_size: u32,

    /// How long cancel/abort wait for a run handle to be created.
    #[serde(default = "default_run_request_timeout_ms")]
    pub run_request_timeout_ms: u64,

    #[serde(default)]
    pub telemetry_opted_in: bool,
}

fn default_batch_size() -> u32 {
    DEFAULT_BATCH_SIZE
}

fn default_run_request_timeout_ms() -> u64 {
    10_000
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            design_mode: false,
            test_case_filter: None,
            default_batch_size: default_batch_size(),
            run_request_timeout_ms: default_run_request_timeout_ms(),
            telemetry_opted_in: false,
        }
    }
}

impl OrchestratorOptions {
    pub fn run_request_timeout(&self) -> Duration {
        Duration::from_millis(self.run_request_timeout_ms)
    }
}
