// src/request/context.rs

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// Metric keys recorded by the orchestrator.
pub mod metric_names {
    pub const EVENT_BATCH_SIZE: &str = "TestRequest.EventBatchSize";
    pub const SOURCE_COUNT: &str = "TestRequest.SourceCount";
    pub const TEST_CASE_FILTER_USED: &str = "TestRequest.TestCaseFilterUsed";
}

/// Protocol version negotiated with the client; forwarded untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProtocolConfig {
    pub version: u32,
}

impl ProtocolConfig {
    pub fn new(version: u32) -> Self {
        Self { version }
    }
}

/// Shared, cloneable metrics store. Clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollection {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MetricsCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, key: impl Into<String>, value: impl ToString) {
        self.lock().insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Per-call correlation object handed to the engine.
///
/// Created new for every discovery/run call so protocol state never leaks
/// between unrelated calls.
#[derive(Debug, Clone)]
pub struct RequestContext {
    protocol_config: ProtocolConfig,
    metrics: MetricsCollection,
    is_telemetry_opted_in: bool,
}

impl RequestContext {
    pub fn new(protocol_config: ProtocolConfig, is_telemetry_opted_in: bool) -> Self {
        Self {
            protocol_config,
            metrics: MetricsCollection::new(),
            is_telemetry_opted_in,
        }
    }

    pub fn protocol_config(&self) -> ProtocolConfig {
        self.protocol_config
    }

    pub fn protocol_version(&self) -> u32 {
        self.protocol_config.version
    }

    pub fn metrics(&self) -> &MetricsCollection {
        &self.metrics
    }

    pub fn is_telemetry_opted_in(&self) -> bool {
        self.is_telemetry_opted_in
    }
}
