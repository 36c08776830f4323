#![allow(dead_code)]

pub use testorch_test_utils::builders;
pub use testorch_test_utils::fake_engine::{FakeEngine, Journal};
pub use testorch_test_utils::recorders::{RecordingLauncher, RecordingRegistrar};
pub use testorch_test_utils::{init_tracing, with_timeout, Harness};

use testorch::engine::RequestEvent;
use testorch::request::ProtocolConfig;

pub const PROTOCOL: ProtocolConfig = ProtocolConfig { version: 6 };

/// Fully qualified names from every `TestsExecuted` event, in order.
pub fn executed_names(events: &[RequestEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            RequestEvent::TestsExecuted(names) => Some(names.clone()),
            _ => None,
        })
        .flatten()
        .collect()
}

/// Fully qualified names from every `TestsDiscovered` event, in order.
pub fn discovered_names(events: &[RequestEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            RequestEvent::TestsDiscovered(tests) => Some(tests.clone()),
            _ => None,
        })
        .flatten()
        .map(|tc| tc.fully_qualified_name)
        .collect()
}

/// Poll the journal until an entry starting with `prefix` shows up.
pub async fn wait_for_entry(journal: &Journal, prefix: &str) {
    with_timeout(async {
        while journal.matching(prefix).is_empty() {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    })
    .await
}
