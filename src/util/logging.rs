// PieLog - util/logging.rs
//
// Self-diagnostics for the library. PieLog's own operational events
// (sink opened, rotation performed, root discovery fallbacks) are emitted
// through `tracing`, never through a PieLog sink, so a misbehaving sink
// cannot hide its own failure reports.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug (sets the filter to debug)
//   - Explicit level passed by the embedding application
//
// Output: stderr. Zero overhead when no subscriber is installed.

use tracing_subscriber::EnvFilter;

/// Initialise the diagnostics subscriber.
///
/// `debug_flag` is true when the user passed --debug on the CLI.
/// `level` is an explicit filter directive from the embedding application.
///
/// Priority: RUST_LOG env var > --debug flag > explicit level > default "warn".
/// Calling this twice is harmless: the second install attempt is ignored.
pub fn init(debug_flag: bool, level: Option<&str>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(super::constants::DEFAULT_DIAGNOSTICS_LEVEL)
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .compact()
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            library = super::constants::APP_NAME,
            version = super::constants::APP_VERSION,
            "Diagnostics initialised"
        );
    }
}
