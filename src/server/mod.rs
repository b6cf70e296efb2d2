//! HTTP boundary: handlers, router, and tracing bootstrap

pub mod handlers;
pub mod router;

pub use handlers::AppState;
pub use router::build_router;

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Reads `RUST_LOG` when set, defaulting to `info`. Call once at
/// process start; embedding applications that install their own
/// subscriber should skip this.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
