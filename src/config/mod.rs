// src/config/mod.rs

//! Ambient orchestrator options, loaded from TOML.
//!
//! ```toml
//! [orchestrator]
//! design_mode = true
//! test_case_filter = "Category!=Slow"
//! default_batch_size = 10
//! run_request_timeout_ms = 10000
//! telemetry_opted_in = false
//! ```

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, OrchestratorOptions, RawConfigFile};
