//! Logging setup for sigcore.
//!
//! Re-exports the `tracing` macros used across the workspace and installs a
//! `tracing-subscriber` pipeline. Library code only emits events; installing a subscriber
//! is left to the embedding node or to tests.

pub use tracing::{debug, error, info, instrument, span, trace, warn, Level, Span};
pub use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber with structured JSON output.
///
/// The filter comes from `RUST_LOG`, falling back to `info`.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    install(filter, true)
}

/// Initialize tracing with an explicit filter directive such as `"debug"` or
/// `"sigcore_crypto=trace"`.
pub fn init_tracing_with_level(
    level: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    install(EnvFilter::try_new(level)?, json)
}

/// Initialize tracing for tests; output goes through the test writer.
pub fn init_tracing_test() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init()?;

    Ok(())
}

fn install(
    filter: EnvFilter,
    json: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()?;
    }

    Ok(())
}
