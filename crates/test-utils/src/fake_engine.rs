use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, Notify};
use testorch::engine::{
    BoxFuture, DiscoveryRequest, EngineError, EngineResult, RequestEvent, RunRequest, TestEngine,
    TestHostLauncher, TestProcessStartInfo,
};
use testorch::filter::TestCaseFilterExpression;
use testorch::request::{DiscoveryCriteria, RequestContext, RunCriteria, TestCase};

/// Shared, ordered log of what engines, registrars and telemetry did.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Entries starting with `prefix`, in order.
    pub fn matching(&self, prefix: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.starts_with(prefix))
            .collect()
    }
}

/// A fake engine that:
/// - records every context, criteria and launcher it is handed
/// - selects tests from a fixed catalogue using the criteria's sources and filter
/// - optionally fails creation/discovery/execution with a scripted error
/// - optionally holds executions on a delay or a gate until released or
///   cancelled/aborted.
pub struct FakeEngine {
    catalogue: Vec<TestCase>,
    journal: Journal,
    next_id: AtomicUsize,
    create_failure: Option<EngineError>,
    discovery_failure: Option<EngineError>,
    execution_failure: Option<EngineError>,
    execution_delay: Option<Duration>,
    execution_gate: Option<Arc<Notify>>,
    contexts: Mutex<Vec<RequestContext>>,
    discovery_criteria: Mutex<Vec<DiscoveryCriteria>>,
    run_criteria: Mutex<Vec<RunCriteria>>,
    launchers: Mutex<Vec<Option<Arc<dyn TestHostLauncher>>>>,
    run_requests: Mutex<Vec<Arc<FakeRunRequest>>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            catalogue: Vec::new(),
            journal: Journal::new(),
            next_id: AtomicUsize::new(1),
            create_failure: None,
            discovery_failure: None,
            execution_failure: None,
            execution_delay: None,
            execution_gate: None,
            contexts: Mutex::new(Vec::new()),
            discovery_criteria: Mutex::new(Vec::new()),
            run_criteria: Mutex::new(Vec::new()),
            launchers: Mutex::new(Vec::new()),
            run_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_catalogue(mut self, catalogue: Vec<TestCase>) -> Self {
        self.catalogue = catalogue;
        self
    }

    pub fn failing_creation(mut self, err: EngineError) -> Self {
        self.create_failure = Some(err);
        self
    }

    pub fn failing_discovery(mut self, err: EngineError) -> Self {
        self.discovery_failure = Some(err);
        self
    }

    pub fn failing_execution(mut self, err: EngineError) -> Self {
        self.execution_failure = Some(err);
        self
    }

    pub fn with_execution_delay(mut self, delay: Duration) -> Self {
        self.execution_delay = Some(delay);
        self
    }

    /// Executions wait for `gate.notify_one()` (or cancel/abort).
    pub fn with_execution_gate(mut self, gate: Arc<Notify>) -> Self {
        self.execution_gate = Some(gate);
        self
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    pub fn contexts(&self) -> Vec<RequestContext> {
        self.contexts.lock().unwrap().clone()
    }

    pub fn discovery_criteria(&self) -> Vec<DiscoveryCriteria> {
        self.discovery_criteria.lock().unwrap().clone()
    }

    pub fn run_criteria(&self) -> Vec<RunCriteria> {
        self.run_criteria.lock().unwrap().clone()
    }

    pub fn launchers(&self) -> Vec<Option<Arc<dyn TestHostLauncher>>> {
        self.launchers.lock().unwrap().clone()
    }

    pub fn run_requests(&self) -> Vec<Arc<FakeRunRequest>> {
        self.run_requests.lock().unwrap().clone()
    }

    fn select(
        &self,
        sources: &[String],
        filter: Option<TestCaseFilterExpression>,
    ) -> EngineResult<Vec<TestCase>> {
        if let Some(err) = filter.as_ref().and_then(|f| f.parse_error()) {
            return Err(EngineError::platform(format!("invalid test case filter: {err}")));
        }

        Ok(self
            .catalogue
            .iter()
            .filter(|tc| sources.contains(&tc.source))
            .filter(|tc| {
                filter.as_ref().is_none_or(|f| {
                    let provider = |name: &str| tc.property_value(name);
                    f.matches(&provider)
                })
            })
            .cloned()
            .collect())
    }
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEngine for FakeEngine {
    fn create_discovery_request(
        &self,
        context: RequestContext,
        criteria: DiscoveryCriteria,
    ) -> EngineResult<Arc<dyn DiscoveryRequest>> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.journal.push(format!("create-discovery:{id}"));
        self.contexts.lock().unwrap().push(context);
        self.discovery_criteria.lock().unwrap().push(criteria.clone());

        if let Some(err) = &self.create_failure {
            return Err(err.clone());
        }

        let selected = self.select(&criteria.sources, criteria.filter())?;
        let (events, _) = broadcast::channel(64);
        Ok(Arc::new(FakeDiscoveryRequest {
            id,
            journal: self.journal.clone(),
            events,
            selected,
            batch_size: criteria.event_batch_frequency.max(1) as usize,
            failure: self.discovery_failure.clone(),
        }))
    }

    fn create_run_request(
        &self,
        context: RequestContext,
        criteria: RunCriteria,
        host_launcher: Option<Arc<dyn TestHostLauncher>>,
    ) -> EngineResult<Arc<dyn RunRequest>> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.journal.push(format!("create-run:{id}"));
        self.contexts.lock().unwrap().push(context);
        self.run_criteria.lock().unwrap().push(criteria.clone());
        self.launchers.lock().unwrap().push(host_launcher.clone());

        if let Some(err) = &self.create_failure {
            return Err(err.clone());
        }

        if let Some(launcher) = &host_launcher {
            let start_info = TestProcessStartInfo {
                file_name: "testhost".to_string(),
                arguments: criteria.sources.clone(),
                ..Default::default()
            };
            let pid = launcher.launch_test_host(&start_info)?;
            self.journal.push(format!("launch:{pid}"));
        }

        let selected = self.select(&criteria.sources, criteria.filter())?;
        let (events, _) = broadcast::channel(64);
        let request = Arc::new(FakeRunRequest {
            id,
            journal: self.journal.clone(),
            events,
            selected,
            failure: self.execution_failure.clone(),
            delay: self.execution_delay,
            gate: self.execution_gate.clone(),
            stop: Notify::new(),
            cancelled: AtomicBool::new(false),
            aborted: AtomicBool::new(false),
        });
        self.run_requests.lock().unwrap().push(Arc::clone(&request));
        Ok(request)
    }
}

pub struct FakeDiscoveryRequest {
    id: usize,
    journal: Journal,
    events: broadcast::Sender<RequestEvent>,
    selected: Vec<TestCase>,
    batch_size: usize,
    failure: Option<EngineError>,
}

impl DiscoveryRequest for FakeDiscoveryRequest {
    fn discover_async(&self) -> BoxFuture<'_, EngineResult<()>> {
        Box::pin(async move {
            self.journal.push(format!("discover-start:{}", self.id));
            for batch in self.selected.chunks(self.batch_size) {
                let _ = self.events.send(RequestEvent::TestsDiscovered(batch.to_vec()));
            }
            let _ = self.events.send(RequestEvent::DiscoveryCompleted {
                total: self.selected.len(),
                aborted: false,
            });
            self.journal.push(format!("discover-end:{}", self.id));
            match &self.failure {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<RequestEvent> {
        self.events.subscribe()
    }
}

pub struct FakeRunRequest {
    id: usize,
    journal: Journal,
    events: broadcast::Sender<RequestEvent>,
    selected: Vec<TestCase>,
    failure: Option<EngineError>,
    delay: Option<Duration>,
    gate: Option<Arc<Notify>>,
    stop: Notify,
    cancelled: AtomicBool,
    aborted: AtomicBool,
}

impl FakeRunRequest {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn was_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

impl RunRequest for FakeRunRequest {
    fn execute_async(&self) -> BoxFuture<'_, EngineResult<()>> {
        Box::pin(async move {
            self.journal.push(format!("execute-start:{}", self.id));

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(gate) = &self.gate {
                tokio::select! {
                    _ = gate.notified() => {}
                    _ = self.stop.notified() => {}
                }
            }

            let cancelled = self.was_cancelled();
            let aborted = self.was_aborted();
            let executed: Vec<String> = if cancelled || aborted {
                Vec::new()
            } else {
                self.selected
                    .iter()
                    .map(|tc| tc.fully_qualified_name.clone())
                    .collect()
            };
            let _ = self.events.send(RequestEvent::TestsExecuted(executed.clone()));
            let _ = self.events.send(RequestEvent::RunCompleted {
                executed: executed.len(),
                cancelled,
                aborted,
            });

            self.journal.push(format!("execute-end:{}", self.id));
            match &self.failure {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        })
    }

    fn cancel_async(&self) -> BoxFuture<'_, EngineResult<()>> {
        Box::pin(async move {
            self.journal.push(format!("cancel:{}", self.id));
            self.cancelled.store(true, Ordering::SeqCst);
            self.stop.notify_one();
            Ok(())
        })
    }

    fn abort(&self) -> EngineResult<()> {
        self.journal.push(format!("abort:{}", self.id));
        self.aborted.store(true, Ordering::SeqCst);
        self.stop.notify_one();
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<RequestEvent> {
        self.events.subscribe()
    }
}
