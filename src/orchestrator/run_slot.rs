// src/orchestrator/run_slot.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::engine::RunRequest;

/// Holds the handle of the current run.
///
/// The run path publishes the handle right after creation and the returned
/// [`PublishedRun`] empties the slot again when the run is over, so a handle
/// is only visible while its run is in flight. Cancel/abort wait on the slot
/// until a handle is present instead of polling.
pub struct RunSlot {
    tx: watch::Sender<Option<Arc<dyn RunRequest>>>,
}

impl RunSlot {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    /// Publish `request` until the returned guard is dropped.
    #[must_use = "the slot is emptied as soon as the guard is dropped"]
    pub fn publish(&self, request: Arc<dyn RunRequest>) -> PublishedRun<'_> {
        self.tx.send_replace(Some(request));
        PublishedRun { slot: self }
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_none()
    }

    /// Wait up to `timeout` for a handle to be published.
    pub async fn wait_for_request(&self, timeout: Duration) -> Option<Arc<dyn RunRequest>> {
        let mut rx = self.tx.subscribe();
        let wait = async move {
            match rx.wait_for(Option::is_some).await {
                Ok(slot) => (*slot).clone(),
                Err(_) => None,
            }
        };
        tokio::time::timeout(timeout, wait).await.ok().flatten()
    }
}

/// Empties the slot on drop, including when the run future is dropped
/// mid-execution.
pub struct PublishedRun<'a> {
    slot: &'a RunSlot,
}

impl Drop for PublishedRun<'_> {
    fn drop(&mut self) {
        self.slot.clear();
    }
}

impl Default for RunSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RunSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunSlot")
            .field("populated", &!self.is_empty())
            .finish()
    }
}
