pub mod builders;
pub mod fake_engine;
pub mod recorders;

use std::sync::{Arc, Once};

use testorch::config::OrchestratorOptions;
use testorch::engine::TestEngine;
use testorch::TestRequestManager;
use tracing_subscriber::{fmt, EnvFilter};

use crate::fake_engine::{FakeEngine, Journal};
use crate::recorders::{RecordingRegistrar, RecordingTelemetry};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// A manager wired to a fake engine and recording telemetry, all writing
/// to one shared journal.
pub struct Harness {
    pub journal: Journal,
    pub engine: Arc<FakeEngine>,
    pub telemetry: Arc<RecordingTelemetry>,
    pub manager: Arc<TestRequestManager>,
}

impl Harness {
    pub fn new(engine: FakeEngine, options: OrchestratorOptions) -> Self {
        let journal = engine.journal();
        let engine = Arc::new(engine);
        let telemetry = Arc::new(RecordingTelemetry::new(journal.clone()));
        let dyn_engine: Arc<dyn TestEngine> = engine.clone();
        let manager = Arc::new(TestRequestManager::new(
            dyn_engine,
            telemetry.clone(),
            options,
        ));
        Self {
            journal,
            engine,
            telemetry,
            manager,
        }
    }

    pub fn with_defaults(engine: FakeEngine) -> Self {
        Self::new(engine, OrchestratorOptions::default())
    }

    pub fn registrar(&self) -> Arc<RecordingRegistrar> {
        Arc::new(RecordingRegistrar::new(self.journal.clone()))
    }
}
