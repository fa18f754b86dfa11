//! Tracing initialization: fmt layer to stdout, optionally tee'd into a log file.

use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;

use tracing_subscriber::{
    fmt::format::FmtSpan, fmt::writer::MakeWriterExt, layer::SubscriberExt,
    util::SubscriberInitExt, EnvFilter, Registry,
};

/// Default filter when RUST_LOG is not set.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Initializes the global tracing subscriber.
///
/// The level comes from RUST_LOG; if unset, `debug` enables debug output and `info` is used
/// otherwise. Load `.env` before calling this, or RUST_LOG from it will not apply.
/// When `log_file_path` is given the same output is appended to that file.
pub fn init_tracing(log_file_path: Option<&str>, debug: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    let layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_thread_ids(debug)
        .with_level(true)
        .with_file(debug)
        .with_line_number(debug);

    let registry = Registry::default().with(env_filter);

    let result = match log_file_path {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let writer = io::stdout.and(Arc::new(file));
            registry.with(layer.with_writer(writer)).try_init()
        }
        None => registry.with(layer.with_writer(io::stdout)).try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))
}
