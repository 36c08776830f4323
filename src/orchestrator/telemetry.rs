// src/orchestrator/telemetry.rs

use tracing::info;

/// Receives request lifecycle telemetry. Each start is paired with exactly
/// one stop per top-level call.
pub trait RequestTelemetry: Send + Sync {
    fn discovery_request_start(&self);
    fn discovery_request_stop(&self);
    fn execution_request_start(&self);
    fn execution_request_stop(&self);
}

/// Default sink: emits the lifecycle as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl RequestTelemetry for TracingTelemetry {
    fn discovery_request_start(&self) {
        info!(target: "testorch::telemetry", event = "DiscoveryRequest.Start");
    }

    fn discovery_request_stop(&self) {
        info!(target: "testorch::telemetry", event = "DiscoveryRequest.Stop");
    }

    fn execution_request_start(&self) {
        info!(target: "testorch::telemetry", event = "ExecutionRequest.Start");
    }

    fn execution_request_stop(&self) {
        info!(target: "testorch::telemetry", event = "ExecutionRequest.Stop");
    }
}

#[derive(Debug, Clone, Copy)]
enum RequestPhase {
    Discovery,
    Execution,
}

/// Fires the start event on creation and the stop event on drop, so the
/// pair brackets the call on every exit path.
pub(crate) struct TelemetryBracket<'a> {
    sink: &'a dyn RequestTelemetry,
    phase: RequestPhase,
}

impl<'a> TelemetryBracket<'a> {
    pub(crate) fn discovery(sink: &'a dyn RequestTelemetry) -> Self {
        sink.discovery_request_start();
        Self {
            sink,
            phase: RequestPhase::Discovery,
        }
    }

    pub(crate) fn execution(sink: &'a dyn RequestTelemetry) -> Self {
        sink.execution_request_start();
        Self {
            sink,
            phase: RequestPhase::Execution,
        }
    }
}

impl Drop for TelemetryBracket<'_> {
    fn drop(&mut self) {
        match self.phase {
            RequestPhase::Discovery => self.sink.discovery_request_stop(),
            RequestPhase::Execution => self.sink.execution_request_stop(),
        }
    }
}
