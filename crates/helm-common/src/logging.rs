//! Tracing bootstrap shared by every Helm process.
//!
//! Output format is controlled by `LOG_FORMAT` ("json" for aggregation
//! pipelines, anything else for human-readable text) and filtering by the
//! standard `RUST_LOG` variable (default: info).
//!
//! ```rust,ignore
//! helm_common::logging::init("helm-election");
//! tracing::info!(instance_id = %id, "Acquired leadership");
//! ```

use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Install the global tracing subscriber for this process.
///
/// Panics if a subscriber is already installed; call it once, early in main.
pub fn init(service_name: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_ansi(true))
            .init();
    }

    tracing::debug!(service = service_name, "logging initialized");
}

/// Like [`init`] but ignores an already-installed subscriber.
///
/// Intended for test binaries where several suites race to initialize.
pub fn try_init(service_name: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_test_writer())
        .try_init();

    tracing::debug!(service = service_name, "logging initialized");
}
