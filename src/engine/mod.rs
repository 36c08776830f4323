// src/engine/mod.rs

//! Seams to the test execution engine.
//!
//! The orchestrator never launches test hosts or speaks the wire protocol
//! itself; it talks to a [`TestEngine`] that creates request handles, and
//! to caller-supplied registrars that hook those handles' events.
//!
//! Production engines and the fakes in `testorch-test-utils` both implement
//! these traits, the same way the executor backend is swapped in tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::request::{DiscoveryCriteria, RequestContext, RunCriteria, TestCase};

pub mod error;

pub use error::{EngineError, EngineResult, ErrorKind};

/// Boxed future returned by engine handles.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Lifecycle events published by a request handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestEvent {
    TestsDiscovered(Vec<TestCase>),
    DiscoveryCompleted {
        total: usize,
        aborted: bool,
    },
    TestsExecuted(Vec<String>),
    RunCompleted {
        executed: usize,
        cancelled: bool,
        aborted: bool,
    },
    Message(String),
}

/// Handle for one discovery request.
pub trait DiscoveryRequest: Send + Sync {
    /// Run discovery to completion.
    fn discover_async(&self) -> BoxFuture<'_, EngineResult<()>>;

    fn subscribe(&self) -> broadcast::Receiver<RequestEvent>;
}

/// Handle for one run request.
///
/// `cancel_async` and `abort` may be called from another task while
/// `execute_async` is in progress.
pub trait RunRequest: Send + Sync {
    /// Execute the run to completion.
    fn execute_async(&self) -> BoxFuture<'_, EngineResult<()>>;

    /// Ask the run to stop after the current test.
    fn cancel_async(&self) -> BoxFuture<'_, EngineResult<()>>;

    /// Stop the run immediately.
    fn abort(&self) -> EngineResult<()>;

    fn subscribe(&self) -> broadcast::Receiver<RequestEvent>;
}

/// Start information for a test host process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestProcessStartInfo {
    pub file_name: String,
    pub arguments: Vec<String>,
    pub working_directory: Option<String>,
    pub environment: Vec<(String, String)>,
}

/// Caller-supplied launcher used instead of the engine's own host launch
/// (e.g. an IDE starting the host under a debugger).
pub trait TestHostLauncher: Send + Sync {
    fn is_debug(&self) -> bool;

    /// Launch the host and return its process id.
    fn launch_test_host(&self, start_info: &TestProcessStartInfo) -> EngineResult<u32>;
}

/// Creates request handles.
pub trait TestEngine: Send + Sync {
    fn create_discovery_request(
        &self,
        context: RequestContext,
        criteria: DiscoveryCriteria,
    ) -> EngineResult<Arc<dyn DiscoveryRequest>>;

    fn create_run_request(
        &self,
        context: RequestContext,
        criteria: RunCriteria,
        host_launcher: Option<Arc<dyn TestHostLauncher>>,
    ) -> EngineResult<Arc<dyn RunRequest>>;
}

/// Hooks a caller's event handlers onto a discovery handle for the
/// duration of one request.
pub trait DiscoveryEventsRegistrar: Send + Sync {
    fn register_discovery_events(&self, request: &dyn DiscoveryRequest);
    fn unregister_discovery_events(&self, request: &dyn DiscoveryRequest);
}

/// Hooks a caller's event handlers onto a run handle for the duration of
/// one request.
pub trait RunEventsRegistrar: Send + Sync {
    fn register_run_events(&self, request: &dyn RunRequest);
    fn unregister_run_events(&self, request: &dyn RunRequest);
}
