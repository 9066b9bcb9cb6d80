// src/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global `fmt` subscriber. Filter comes from `RUST_LOG`,
/// defaulting to `info`. Logs go to stderr so stdout stays clean for the
/// count table.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
