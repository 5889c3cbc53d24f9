use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter. Falls back to `RUST_LOG`.
pub const LOG_ENV: &str = "PINCLIENT_LOG";

/// Initialize the global subscriber, writing to stderr so command output
/// on stdout stays clean.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}
