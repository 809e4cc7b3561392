//! Tracing setup for binaries built on pagekit.

use tracing_subscriber::EnvFilter;

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG`.
///
/// `default_directive` (e.g. `pagekit=info`) is added on top of the
/// environment filter. Does nothing if a subscriber is already set.
pub fn init(default_directive: &str) {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = default_directive.parse() {
        filter = filter.add_directive(directive);
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
