//! Logging and observability setup for lmgen
//!
//! Structured logging via `tracing`; hot-path modules emit `debug!`/`info!`
//! events with structured fields (provider, model, error state) and this
//! module wires up the subscriber.

use tracing_subscriber::{
    EnvFilter,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize the tracing subscriber for structured logging.
///
/// Honors `RUST_LOG` when set; otherwise defaults to `lmgen=debug,info` in
/// verbose mode and `lmgen=info,warn` in compact mode. Safe to call from
/// binaries and examples; library code never initializes a subscriber itself.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("lmgen=debug,info")
            } else {
                EnvFilter::try_new("lmgen=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = if verbose {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_line_number(false)
            .with_file(false)
            .compact()
    } else {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_line_number(false)
            .with_file(false)
            .compact()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init()?;

    Ok(())
}
