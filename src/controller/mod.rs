pub mod request_state;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::AbortHandle;
use tracing::{debug, info};

use crate::translate::error::TranslateError;
use crate::translate::interface::{TranslationRequest, TranslationTransport};
use crate::translate::languages::LanguageCode;
use crate::translate::response::decode_translation;

pub use request_state::{RequestState, StateSnapshot};

const EVENT_CAPACITY: usize = 64;

/// Owns the single current translation request and publishes its state.
///
/// Every mutation goes through the watch channel's modify lock: submit, cancel
/// and completion compare and write the generation inside that lock, and
/// broadcast the new snapshot before releasing it. A result is applied only
/// if its generation is still current and the state is still in flight, so a
/// superseded or cancelled request can finish at any time without effect.
pub struct TranslationController {
    transport: Arc<dyn TranslationTransport>,
    timeout: Option<Duration>,
    runtime: Handle,
    state_tx: watch::Sender<StateSnapshot>,
    events: broadcast::Sender<StateSnapshot>,
    tasks: DashMap<u64, AbortHandle>,
}

impl TranslationController {
    /// Create a controller bound to the current Tokio runtime
    pub fn new(
        transport: Arc<dyn TranslationTransport>,
        timeout: Option<Duration>,
    ) -> Result<Arc<Self>> {
        let runtime = Handle::try_current()
            .map_err(|e| anyhow::anyhow!("Translation controller needs a Tokio runtime: {}", e))?;
        Ok(Self::with_runtime(transport, timeout, runtime))
    }

    /// Create a controller that spawns its network calls on `runtime`.
    /// `submit` and `cancel` may then be called from any thread.
    pub fn with_runtime(
        transport: Arc<dyn TranslationTransport>,
        timeout: Option<Duration>,
        runtime: Handle,
    ) -> Arc<Self> {
        let (state_tx, _) = watch::channel(StateSnapshot::initial());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        info!(
            "Translation controller ready: provider={}, timeout={:?}",
            transport.name(),
            timeout
        );
        Arc::new(Self {
            transport,
            timeout,
            runtime,
            state_tx,
            events,
            tasks: DashMap::new(),
        })
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state_tx.borrow().clone()
    }

    pub fn state(&self) -> RequestState {
        self.state_tx.borrow().state.clone()
    }

    /// Latest-value view of the state; intermediate transitions may be skipped
    pub fn watch(&self) -> watch::Receiver<StateSnapshot> {
        self.state_tx.subscribe()
    }

    /// Current snapshot plus a receiver for every later transition, in order.
    pub fn subscribe(&self) -> (StateSnapshot, broadcast::Receiver<StateSnapshot>) {
        // Holding the read side blocks transitions, so nothing falls between the two
        let current = self.state_tx.borrow();
        let receiver = self.events.subscribe();
        (current.clone(), receiver)
    }

    /// Start translating `text`, superseding any request still in flight.
    ///
    /// Empty text is ignored and returns `None`. Otherwise the state is
    /// `InFlight` when this returns, and the new request's generation is
    /// returned.
    pub fn submit(
        self: &Arc<Self>,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> Option<u64> {
        let Some(request) = TranslationRequest::new(text, source, target) else {
            debug!("Ignoring submit with empty text");
            return None;
        };

        let mut generation = 0;
        self.state_tx.send_modify(|snapshot| {
            if snapshot.state.is_in_flight() {
                debug!("Request {} superseded", snapshot.generation);
            }
            snapshot.generation += 1;
            let current = snapshot.generation;
            generation = current;

            // The abort handle is registered before InFlight becomes visible,
            // so a cancel from any thread always finds it
            let controller = Arc::clone(self);
            let task_request = request.clone();
            let task = self.runtime.spawn(async move {
                let outcome = controller.execute(&task_request).await;
                controller.complete(current, outcome);
            });
            self.tasks.retain(|_, handle| !handle.is_finished());
            self.tasks.insert(current, task.abort_handle());

            snapshot.state = RequestState::InFlight {
                request: request.clone(),
            };
            snapshot.updated_at = Utc::now();
            self.publish(snapshot);
        });
        info!(
            "Submitted translation request {}: langpair={}",
            generation,
            request.language_pair().as_query()
        );
        Some(generation)
    }

    /// Abort the in-flight request and return to `Idle`.
    /// Returns false when nothing was in flight.
    pub fn cancel(&self) -> bool {
        let mut cancelled = None;
        self.state_tx.send_if_modified(|snapshot| {
            if !snapshot.state.is_in_flight() {
                return false;
            }
            cancelled = Some(snapshot.generation);
            snapshot.state = RequestState::Idle;
            snapshot.updated_at = Utc::now();
            self.publish(snapshot);
            true
        });

        let Some(generation) = cancelled else {
            debug!("Cancel ignored, nothing in flight");
            return false;
        };
        if let Some((_, handle)) = self.tasks.remove(&generation) {
            handle.abort();
        }
        info!("Cancelled translation request {}", generation);
        true
    }

    /// Abort every outstanding call, superseded ones included
    pub fn shutdown(&self) {
        self.cancel();
        self.tasks.retain(|_, handle| {
            handle.abort();
            false
        });
    }

    async fn execute(&self, request: &TranslationRequest) -> Result<String, TranslateError> {
        let body = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.transport.fetch(request))
                .await
                .map_err(|_| TranslateError::Timeout(limit))??,
            None => self.transport.fetch(request).await?,
        };
        decode_translation(&body)
    }

    fn complete(&self, generation: u64, outcome: Result<String, TranslateError>) {
        let next = RequestState::from_outcome(outcome);
        let status = next.status();
        let applied = self.state_tx.send_if_modified(|snapshot| {
            if snapshot.generation != generation || !snapshot.state.is_in_flight() {
                return false;
            }
            snapshot.state = next;
            snapshot.updated_at = Utc::now();
            self.publish(snapshot);
            true
        });
        // After the state lock, so submit has finished registering the handle
        self.tasks.remove(&generation);

        if applied {
            info!("Translation request {} {}", generation, status);
        } else {
            debug!("Discarding stale result for request {} ({})", generation, status);
        }
    }

    fn publish(&self, snapshot: &StateSnapshot) {
        // No subscribers is fine
        let _ = self.events.send(snapshot.clone());
    }
}
