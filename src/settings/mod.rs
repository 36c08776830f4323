// src/settings/mod.rs

//! Run-settings XML handling.
//!
//! The orchestrator only looks at a handful of elements:
//!
//! ```xml
//! <RunSettings>
//!   <RunConfiguration>
//!     <BatchSize>15</BatchSize>
//!     <DesignMode>True</DesignMode>
//!     <CollectSourceInformation>False</CollectSourceInformation>
//!   </RunConfiguration>
//! </RunSettings>
//! ```
//!
//! Everything else is passed through byte-for-byte.

pub mod merge;

use thiserror::Error;

pub use merge::{MergedSettings, RunSettingsInfo, inspect, merge_run_settings};

pub const RUN_SETTINGS: &str = "RunSettings";
pub const RUN_CONFIGURATION: &str = "RunConfiguration";
pub const BATCH_SIZE: &str = "BatchSize";
pub const DESIGN_MODE: &str = "DesignMode";
pub const COLLECT_SOURCE_INFORMATION: &str = "CollectSourceInformation";

/// Event batch frequency used when the settings do not name one.
pub const DEFAULT_BATCH_SIZE: u32 = 10;

/// Run settings that cannot be read or are not supported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("run settings are not well-formed XML: {0}")]
    Malformed(String),

    #[error("run settings root element must be <RunSettings>, found <{0}>")]
    UnexpectedRoot(String),

    #[error("invalid value '{value}' for <{element}>")]
    InvalidValue { element: String, value: String },
}
