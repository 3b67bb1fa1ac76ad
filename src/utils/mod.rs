use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global fmt subscriber, writing to stderr so command output stays clean.
///
/// An unparsable `directive` is ignored; `RUST_LOG` still applies.
pub fn init_tracing(directive: &str) {
    let filter = EnvFilter::from_default_env();
    let filter = match directive.parse() {
        Ok(parsed) => filter.add_directive(parsed),
        Err(_) => filter,
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
