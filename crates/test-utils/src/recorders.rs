use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::broadcast;
use testorch::engine::{
    DiscoveryEventsRegistrar, DiscoveryRequest, EngineResult, RequestEvent, RunEventsRegistrar,
    RunRequest, TestHostLauncher, TestProcessStartInfo,
};
use testorch::orchestrator::RequestTelemetry;

use crate::fake_engine::Journal;

/// Registrar that subscribes on register and drains everything the handle
/// published on unregister. Writes `register`/`unregister` to the journal.
pub struct RecordingRegistrar {
    journal: Journal,
    receivers: Mutex<Vec<broadcast::Receiver<RequestEvent>>>,
    events: Mutex<Vec<RequestEvent>>,
}

impl RecordingRegistrar {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            receivers: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<RequestEvent> {
        self.events.lock().unwrap().clone()
    }

    fn attach(&self, receiver: broadcast::Receiver<RequestEvent>) {
        self.journal.push("register");
        self.receivers.lock().unwrap().push(receiver);
    }

    fn detach(&self) {
        if let Some(mut receiver) = self.receivers.lock().unwrap().pop() {
            let mut events = self.events.lock().unwrap();
            while let Ok(event) = receiver.try_recv() {
                events.push(event);
            }
        }
        self.journal.push("unregister");
    }
}

impl DiscoveryEventsRegistrar for RecordingRegistrar {
    fn register_discovery_events(&self, request: &dyn DiscoveryRequest) {
        self.attach(request.subscribe());
    }

    fn unregister_discovery_events(&self, _request: &dyn DiscoveryRequest) {
        self.detach();
    }
}

impl RunEventsRegistrar for RecordingRegistrar {
    fn register_run_events(&self, request: &dyn RunRequest) {
        self.attach(request.subscribe());
    }

    fn unregister_run_events(&self, _request: &dyn RunRequest) {
        self.detach();
    }
}

/// Telemetry sink writing `telemetry:<phase>-<edge>` entries to the journal.
pub struct RecordingTelemetry {
    journal: Journal,
}

impl RecordingTelemetry {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }

    pub fn entries(&self) -> Vec<String> {
        self.journal.matching("telemetry:")
    }
}

impl RequestTelemetry for RecordingTelemetry {
    fn discovery_request_start(&self) {
        self.journal.push("telemetry:discovery-start");
    }

    fn discovery_request_stop(&self) {
        self.journal.push("telemetry:discovery-stop");
    }

    fn execution_request_start(&self) {
        self.journal.push("telemetry:execution-start");
    }

    fn execution_request_stop(&self) {
        self.journal.push("telemetry:execution-stop");
    }
}

/// Host launcher that hands out increasing fake process ids.
pub struct RecordingLauncher {
    debug: bool,
    next_pid: AtomicU32,
    launched: Mutex<Vec<TestProcessStartInfo>>,
}

impl RecordingLauncher {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            next_pid: AtomicU32::new(4242),
            launched: Mutex::new(Vec::new()),
        }
    }

    pub fn launched(&self) -> Vec<TestProcessStartInfo> {
        self.launched.lock().unwrap().clone()
    }
}

impl TestHostLauncher for RecordingLauncher {
    fn is_debug(&self) -> bool {
        self.debug
    }

    fn launch_test_host(&self, start_info: &TestProcessStartInfo) -> EngineResult<u32> {
        self.launched.lock().unwrap().push(start_info.clone());
        Ok(self.next_pid.fetch_add(1, Ordering::SeqCst))
    }
}
