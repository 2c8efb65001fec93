use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr. `RUST_LOG` overrides the default filter.
pub fn init_telemetry() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "deploykit=info,deploykit_persistence=info".into());
    let result = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if result.is_err() {
        tracing::warn!("Telemetry already initialized");
    }
}
