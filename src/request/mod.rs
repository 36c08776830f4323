// src/request/mod.rs

//! Values that flow from a client request to the execution engine.
//!
//! - [`payload`]: what the client sends (`DiscoveryRequestPayload`,
//!   `RunRequestPayload`).
//! - [`criteria`]: the merged description handed to the engine.
//! - [`context`]: per-call protocol/metrics carrier.
//! - [`test_case`]: the test metadata filters are evaluated against.

pub mod context;
pub mod criteria;
pub mod payload;
pub mod test_case;

pub use context::{MetricsCollection, ProtocolConfig, RequestContext};
pub use criteria::{DiscoveryCriteria, RunCriteria};
pub use payload::{DiscoveryRequestPayload, RunRequestPayload, TestPlatformOptions};
pub use test_case::{TestCase, TestTrait};
