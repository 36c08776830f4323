// src/orchestrator/manager.rs

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::OrchestratorOptions;
use crate::engine::{
    DiscoveryEventsRegistrar, EngineResult, RunEventsRegistrar, RunRequest, TestEngine,
    TestHostLauncher,
};
use crate::request::context::metric_names;
use crate::request::{
    DiscoveryCriteria, DiscoveryRequestPayload, ProtocolConfig, RequestContext, RunCriteria,
    RunRequestPayload,
};
use crate::settings::merge_run_settings;

use super::run_slot::RunSlot;
use super::telemetry::{RequestTelemetry, TelemetryBracket, TracingTelemetry};

/// Turns client requests into engine requests.
///
/// Discovery calls are independent of each other and of runs. Run calls are
/// serialized end-to-end: from handle creation until the registrar is
/// unhooked, no other run can start.
pub struct TestRequestManager {
    engine: Arc<dyn TestEngine>,
    telemetry: Arc<dyn RequestTelemetry>,
    options: RwLock<Arc<OrchestratorOptions>>,
    run_lock: Mutex<()>,
    run_slot: RunSlot,
}

impl std::fmt::Debug for TestRequestManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestRequestManager")
            .field("options", &self.options())
            .field("run_slot", &self.run_slot)
            .finish_non_exhaustive()
    }
}

impl TestRequestManager {
    pub fn new(
        engine: Arc<dyn TestEngine>,
        telemetry: Arc<dyn RequestTelemetry>,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            engine,
            telemetry,
            options: RwLock::new(Arc::new(options)),
            run_lock: Mutex::new(()),
            run_slot: RunSlot::new(),
        }
    }

    /// Manager reporting telemetry through `tracing`.
    pub fn with_tracing_telemetry(engine: Arc<dyn TestEngine>, options: OrchestratorOptions) -> Self {
        Self::new(engine, Arc::new(TracingTelemetry), options)
    }

    /// Snapshot of the ambient options; later replacements do not affect it.
    pub fn options(&self) -> Arc<OrchestratorOptions> {
        Arc::clone(&self.options.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn set_options(&self, options: OrchestratorOptions) {
        *self.options.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(options);
    }

    /// Replace the ambient options with a fresh default instance.
    pub fn reset_options(&self) {
        debug!("resetting ambient orchestrator options");
        self.set_options(OrchestratorOptions::default());
    }

    /// Discover tests.
    ///
    /// Returns `Ok(true)` on success and `Ok(false)` on a platform, settings
    /// or invalid-operation failure (logged). Any other failure is returned
    /// as `Err`.
    pub async fn discover_tests(
        &self,
        payload: &DiscoveryRequestPayload,
        registrar: &dyn DiscoveryEventsRegistrar,
        protocol_config: ProtocolConfig,
    ) -> EngineResult<bool> {
        let options = self.options();
        let context = RequestContext::new(protocol_config, options.telemetry_opted_in);
        info!(
            sources = payload.sources.len(),
            protocol_version = protocol_config.version,
            "discovery request received"
        );

        let _bracket = TelemetryBracket::discovery(self.telemetry.as_ref());
        let outcome = self.discover(payload, registrar, &options, context).await;
        settle("discovery", outcome)
    }

    async fn discover(
        &self,
        payload: &DiscoveryRequestPayload,
        registrar: &dyn DiscoveryEventsRegistrar,
        options: &OrchestratorOptions,
        context: RequestContext,
    ) -> EngineResult<()> {
        let merged = merge_run_settings(
            &payload.run_settings,
            options.design_mode,
            options.default_batch_size,
        )?;

        let test_case_filter = payload
            .test_case_filter_override
            .clone()
            .or_else(|| options.test_case_filter.clone());

        let criteria = DiscoveryCriteria {
            sources: payload.sources.clone(),
            run_settings: merged.xml,
            test_case_filter,
            event_batch_frequency: merged.batch_size,
        };
        record_metrics(
            &context,
            criteria.sources.len(),
            criteria.event_batch_frequency,
            criteria.test_case_filter.is_some(),
        );
        debug!(?criteria, "discovery criteria built");

        let request = self.engine.create_discovery_request(context, criteria)?;
        registrar.register_discovery_events(request.as_ref());
        let result = request.discover_async().await;
        registrar.unregister_discovery_events(request.as_ref());
        result
    }

    /// Run tests.
    ///
    /// Same outcome mapping as [`discover_tests`](Self::discover_tests).
    /// A second concurrent call waits until this one has unhooked its
    /// registrar before creating its own run.
    pub async fn run_tests(
        &self,
        payload: &RunRequestPayload,
        host_launcher: Option<Arc<dyn TestHostLauncher>>,
        registrar: &dyn RunEventsRegistrar,
        protocol_config: ProtocolConfig,
    ) -> EngineResult<bool> {
        let options = self.options();
        let platform_options = payload.test_platform_options.as_ref();
        let opted_in =
            options.telemetry_opted_in || platform_options.is_some_and(|o| o.collect_metrics);
        let context = RequestContext::new(protocol_config, opted_in);
        info!(
            sources = payload.sources.len(),
            protocol_version = protocol_config.version,
            custom_launcher = host_launcher.is_some(),
            "run request received"
        );

        let _bracket = TelemetryBracket::execution(self.telemetry.as_ref());
        let outcome = self
            .run(payload, host_launcher, registrar, &options, context)
            .await;
        settle("run", outcome)
    }

    async fn run(
        &self,
        payload: &RunRequestPayload,
        host_launcher: Option<Arc<dyn TestHostLauncher>>,
        registrar: &dyn RunEventsRegistrar,
        options: &OrchestratorOptions,
        context: RequestContext,
    ) -> EngineResult<()> {
        let merged = merge_run_settings(
            &payload.run_settings,
            options.design_mode,
            options.default_batch_size,
        )?;

        let platform_options = payload.test_platform_options.as_ref();
        let test_case_filter = platform_options
            .and_then(|o| o.test_case_filter.clone())
            .or_else(|| options.test_case_filter.clone());

        let criteria = RunCriteria {
            sources: payload.sources.clone(),
            run_settings: merged.xml,
            test_case_filter,
            filter_options: platform_options.and_then(|o| o.filter_options.clone()),
            event_batch_frequency: merged.batch_size,
        };
        record_metrics(
            &context,
            criteria.sources.len(),
            criteria.event_batch_frequency,
            criteria.test_case_filter.is_some(),
        );
        debug!(?criteria, "run criteria built");

        // Guards drop in reverse order: unhook, empty the slot, release the lock.
        let _run_guard = self.run_lock.lock().await;

        let request = self
            .engine
            .create_run_request(context, criteria, host_launcher)?;
        let _published = self.run_slot.publish(Arc::clone(&request));

        let _hooked = RunEventsHook::register(registrar, request.as_ref());
        request.execute_async().await
    }

    /// Cancel the current run.
    ///
    /// Only a run that is in flight is signalled. If no run handle exists yet
    /// (none started, or the last one already finished) this waits for the
    /// next one, up to the configured run-request timeout. Returns
    /// `Ok(false)` when no handle appeared or the engine reported a known
    /// failure.
    pub async fn cancel_test_run(&self) -> EngineResult<bool> {
        let Some(request) = self.wait_for_run_request("cancel").await else {
            return Ok(false);
        };
        let outcome = request.cancel_async().await;
        settle("cancel", outcome)
    }

    /// Abort the current run. Waits for the handle like
    /// [`cancel_test_run`](Self::cancel_test_run).
    pub async fn abort_test_run(&self) -> EngineResult<bool> {
        let Some(request) = self.wait_for_run_request("abort").await else {
            return Ok(false);
        };
        let outcome = request.abort();
        settle("abort", outcome)
    }

    async fn wait_for_run_request(&self, operation: &'static str) -> Option<Arc<dyn RunRequest>> {
        let timeout = self.options().run_request_timeout();
        let request = self.run_slot.wait_for_request(timeout).await;
        if request.is_none() {
            warn!(
                operation,
                ?timeout,
                "no run request was created in time; nothing to signal"
            );
        }
        request
    }
}

/// Keeps a registrar hooked onto a run handle until dropped.
struct RunEventsHook<'a> {
    registrar: &'a dyn RunEventsRegistrar,
    request: &'a dyn RunRequest,
}

impl<'a> RunEventsHook<'a> {
    fn register(registrar: &'a dyn RunEventsRegistrar, request: &'a dyn RunRequest) -> Self {
        registrar.register_run_events(request);
        Self { registrar, request }
    }
}

impl Drop for RunEventsHook<'_> {
    fn drop(&mut self) {
        self.registrar.unregister_run_events(self.request);
    }
}

fn record_metrics(context: &RequestContext, sources: usize, batch_size: u32, filtered: bool) {
    if !context.is_telemetry_opted_in() {
        return;
    }
    let metrics = context.metrics();
    metrics.add(metric_names::SOURCE_COUNT, sources);
    metrics.add(metric_names::EVENT_BATCH_SIZE, batch_size);
    metrics.add(metric_names::TEST_CASE_FILTER_USED, filtered);
    debug!(metrics = ?metrics.snapshot(), "request metrics recorded");
}

/// Known failure kinds become `Ok(false)`; anything else propagates.
fn settle(operation: &'static str, outcome: EngineResult<()>) -> EngineResult<bool> {
    match outcome {
        Ok(()) => {
            info!(operation, "request completed");
            Ok(true)
        }
        Err(err) if err.kind().is_recoverable() => {
            error!(operation, kind = ?err.kind(), error = %err, "request failed");
            Ok(false)
        }
        Err(err) => Err(err),
    }
}
