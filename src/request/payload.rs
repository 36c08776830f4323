// src/request/payload.rs

use serde::{Deserialize, Serialize};

use crate::filter::FilterOptions;

/// Client payload for a discovery request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiscoveryRequestPayload {
    #[serde(default)]
    pub sources: Vec<String>,

    #[serde(default)]
    pub run_settings: String,

    /// Takes precedence over the ambient filter when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_case_filter_override: Option<String>,
}

/// Client payload for a run request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RunRequestPayload {
    #[serde(default)]
    pub sources: Vec<String>,

    #[serde(default)]
    pub run_settings: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_platform_options: Option<TestPlatformOptions>,
}

/// Per-call options attached to a run payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestPlatformOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_case_filter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_options: Option<FilterOptions>,

    /// Opt this call into metrics collection.
    #[serde(default)]
    pub collect_metrics: bool,
}
