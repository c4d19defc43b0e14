use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize JSON stdout tracing, filtered by the `RUST_LOG` env var.
/// Call once at service startup.
///
/// Safe to call multiple times — subsequent calls are silently ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().json())
        .try_init();
}
