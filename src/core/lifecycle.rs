//! Request lifecycles
//!
//! [`AsyncResource`] polls a producer on activation and on demand;
//! [`TranslationLifecycle`] drives user-initiated translations. Both keep their
//! state behind a mutex that is never held across an `.await`.

pub mod resource;
pub mod translation;

use std::sync::{Mutex, MutexGuard};

pub use resource::{AsyncResource, FetchState};
pub use translation::{TranslationLifecycle, TranslationState};

fn lock_state<'a, S>(mutex: &'a Mutex<S>, owner: &str) -> MutexGuard<'a, S> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!(owner, "state mutex poisoned, recovering");
            poisoned.into_inner()
        }
    }
}
