mod common;
use crate::common::builders::{sample_catalogue, DiscoveryPayloadBuilder, RunPayloadBuilder};
use crate::common::{FakeEngine, RecordingRegistrar, PROTOCOL};

use std::error::Error;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use testorch::config::OrchestratorOptions;
use testorch::engine::EngineError;
use testorch::TestRequestManager;

type TestResult = Result<(), Box<dyn Error>>;

/// Shared buffer the fmt subscriber writes into.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn telemetry_lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.contains("testorch::telemetry"))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture() -> (Captured, tracing::subscriber::DefaultGuard) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (captured, tracing::subscriber::set_default(subscriber))
}

fn assert_events(lines: &[String], expected: &[&str]) {
    assert_eq!(lines.len(), expected.len(), "{lines:#?}");
    for (line, event) in lines.iter().zip(expected) {
        assert!(line.contains(event), "expected {event} in {line}");
    }
}

#[tokio::test]
async fn tracing_telemetry_brackets_discovery_and_runs() -> TestResult {
    let (captured, _guard) = capture();
    let engine = Arc::new(FakeEngine::new().with_catalogue(sample_catalogue()));
    let registrar = RecordingRegistrar::new(engine.journal());
    let manager = TestRequestManager::with_tracing_telemetry(engine, OrchestratorOptions::default());

    let discovery = DiscoveryPayloadBuilder::new(["calc.dll"]).build();
    assert!(manager.discover_tests(&discovery, &registrar, PROTOCOL).await?);
    let run = RunPayloadBuilder::new(["calc.dll"]).build();
    assert!(manager.run_tests(&run, None, &registrar, PROTOCOL).await?);

    assert_events(
        &captured.telemetry_lines(),
        &[
            "DiscoveryRequest.Start",
            "DiscoveryRequest.Stop",
            "ExecutionRequest.Start",
            "ExecutionRequest.Stop",
        ],
    );
    Ok(())
}

#[tokio::test]
async fn tracing_telemetry_stops_a_failed_run() -> TestResult {
    let (captured, _guard) = capture();
    let engine = Arc::new(
        FakeEngine::new()
            .with_catalogue(sample_catalogue())
            .failing_execution(EngineError::platform("host crashed")),
    );
    let registrar = RecordingRegistrar::new(engine.journal());
    let manager = TestRequestManager::with_tracing_telemetry(engine, OrchestratorOptions::default());

    let run = RunPayloadBuilder::new(["calc.dll"]).build();
    let _ = manager.run_tests(&run, None, &registrar, PROTOCOL).await;

    assert_events(
        &captured.telemetry_lines(),
        &["ExecutionRequest.Start", "ExecutionRequest.Stop"],
    );
    Ok(())
}
