// Module declarations - these are re-exported from their respective modules
pub mod core;
pub mod shared;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use crate::core::features::translator::{assess_health, TranslationGateway};
pub use crate::core::lifecycle::{AsyncResource, FetchState, TranslationLifecycle, TranslationState};
pub use crate::core::remote::{RemoteClient, Transport, TransportError, TransportErrorKind};
pub use crate::core::session::{SessionView, TranslatorSession};
pub use crate::core::store::TranslationStore;
pub use crate::shared::error::{AppError, AppResult};
pub use crate::shared::settings::ClientSettings;

/// Install the global tracing subscriber (`RUST_LOG`, default `info`).
///
/// Output goes to stderr. Calling this more than once is harmless.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
