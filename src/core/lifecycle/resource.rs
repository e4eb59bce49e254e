use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use crate::shared::error::{AppResult, GENERIC_REQUEST_ERROR};
use crate::shared::types::{Envelope, RequestState};

use super::lock_state;

type ProducerFuture<T> = Pin<Box<dyn Future<Output = AppResult<Envelope<T>>> + Send>>;
type Producer<T> = Arc<dyn Fn() -> ProducerFuture<T> + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

struct Slot<T> {
    state: FetchState<T>,
    deps: Option<Vec<String>>,
    /// Cleared when the activation that created it is superseded or torn down
    interest: Arc<AtomicBool>,
}

struct Core<T> {
    producer: Producer<T>,
    slot: Mutex<Slot<T>>,
}

impl<T> Core<T> {
    async fn run(&self, interest: Arc<AtomicBool>) {
        if !interest.load(Ordering::SeqCst) {
            return;
        }
        {
            let mut slot = lock_state(&self.slot, "async resource");
            slot.state.loading = true;
            slot.state.error = None;
        }

        let outcome = (self.producer)().await;

        if !interest.load(Ordering::SeqCst) {
            tracing::debug!("discarding settlement of a revoked activation");
            return;
        }

        let mut slot = lock_state(&self.slot, "async resource");
        match outcome {
            Ok(envelope) if envelope.success => slot.state.data = envelope.data,
            Ok(envelope) => {
                let message = envelope
                    .error
                    .filter(|msg| !msg.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_REQUEST_ERROR.to_string());
                slot.state.error = Some(message);
            }
            Err(err) => slot.state.error = Some(err.user_message()),
        }
        slot.state.loading = false;
    }

    /// Start a new activation for `deps`, or `None` when they are unchanged.
    fn begin(&self, deps: Vec<String>) -> Option<Arc<AtomicBool>> {
        let mut slot = lock_state(&self.slot, "async resource");
        if slot.deps.as_ref() == Some(&deps) {
            return None;
        }
        slot.interest.store(false, Ordering::SeqCst);
        let interest = Arc::new(AtomicBool::new(true));
        slot.interest = interest.clone();
        slot.deps = Some(deps);
        Some(interest)
    }

    fn current_interest(&self) -> Arc<AtomicBool> {
        lock_state(&self.slot, "async resource").interest.clone()
    }
}

/// Owner-scoped async fetch.
///
/// Runs the producer when first activated and again whenever the dependency
/// list changes. Settlements that arrive after a newer activation, after
/// [`AsyncResource::dispose`], or after the resource is dropped leave the state
/// untouched.
pub struct AsyncResource<T> {
    core: Arc<Core<T>>,
}

impl<T> AsyncResource<T>
where
    T: Send + 'static,
{
    pub fn new<F, Fut>(producer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Envelope<T>>> + Send + 'static,
    {
        let producer: Producer<T> = Arc::new(move || Box::pin(producer()) as ProducerFuture<T>);
        Self {
            core: Arc::new(Core {
                producer,
                slot: Mutex::new(Slot {
                    state: FetchState::default(),
                    deps: None,
                    interest: Arc::new(AtomicBool::new(true)),
                }),
            }),
        }
    }

    /// Run the producer if `deps` differ from the previous activation.
    pub async fn activate<I, S>(&self, deps: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let deps: Vec<String> = deps.into_iter().map(Into::into).collect();
        if let Some(interest) = self.core.begin(deps) {
            self.core.run(interest).await;
        }
    }

    pub async fn refetch(&self) {
        let interest = self.core.current_interest();
        self.core.run(interest).await;
    }

    pub fn spawn_activate<I, S>(&self, deps: I) -> JoinHandle<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let deps: Vec<String> = deps.into_iter().map(Into::into).collect();
        let core = self.core.clone();
        let interest = core.begin(deps);
        tokio::spawn(async move {
            if let Some(interest) = interest {
                core.run(interest).await;
            }
        })
    }

    pub fn spawn_refetch(&self) -> JoinHandle<()> {
        let core = self.core.clone();
        let interest = core.current_interest();
        tokio::spawn(async move { core.run(interest).await })
    }

    /// Revoke the current activation. Later settlements are ignored.
    pub fn dispose(&self) {
        self.core.current_interest().store(false, Ordering::SeqCst);
    }
}

impl<T: Clone> AsyncResource<T> {
    pub fn snapshot(&self) -> FetchState<T> {
        lock_state(&self.core.slot, "async resource").state.clone()
    }

    pub fn state(&self) -> RequestState<T> {
        let slot = lock_state(&self.core.slot, "async resource");
        let state = &slot.state;
        if state.loading {
            RequestState::Loading
        } else if let Some(error) = &state.error {
            RequestState::Error(error.clone())
        } else if let Some(data) = &state.data {
            RequestState::Success(data.clone())
        } else {
            RequestState::Idle
        }
    }
}

impl<T> Drop for AsyncResource<T> {
    fn drop(&mut self) {
        lock_state(&self.core.slot, "async resource")
            .interest
            .store(false, Ordering::SeqCst);
    }
}
