// whisper-relay - util/logging.rs
//
// Structured logging setup.
//
// Activation: RUST_LOG environment variable (e.g. RUST_LOG=debug). The CLI
// surface is fixed to the two positional arguments, so there is no --debug
// flag; verbosity is env-only.
//
// Output: stderr. Never logs secrets — the bot token is excluded from every
// log line at any level.

use tracing_subscriber::EnvFilter;

/// Initialise the logging subsystem.
///
/// Priority: RUST_LOG env var > default "info".
pub fn init() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(super::constants::DEFAULT_LOG_LEVEL)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .init();

    tracing::debug!(
        app = super::constants::APP_NAME,
        version = super::constants::APP_VERSION,
        "Logging initialised"
    );
}
