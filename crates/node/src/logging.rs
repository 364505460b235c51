//! Log output for the node binaries

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber
///
/// `verbose` forces debug level; otherwise `RUST_LOG` applies, defaulting to info.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
