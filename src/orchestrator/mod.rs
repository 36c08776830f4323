// src/orchestrator/mod.rs

//! Execution request orchestration.
//!
//! [`TestRequestManager`] turns discovery/run payloads into engine requests:
//!
//! 1. merge run settings with the ambient options,
//! 2. build fresh criteria and a fresh [`RequestContext`](crate::request::RequestContext),
//! 3. create the engine handle, hook the caller's registrar, execute,
//!    unhook,
//! 4. map the outcome to `bool` (known failure kinds) or propagate it.
//!
//! Runs are single-flight: one run holds the run lock from handle creation
//! until its registrar is unhooked. Cancel/abort wait for the current run's
//! handle in the [`RunSlot`] rather than polling.

pub mod manager;
pub mod run_slot;
pub mod telemetry;

pub use manager::TestRequestManager;
pub use run_slot::RunSlot;
pub use telemetry::{RequestTelemetry, TracingTelemetry};
