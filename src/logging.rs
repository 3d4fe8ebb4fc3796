//! Diagnostic logging setup.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber, writing compact lines to stderr.
///
/// `RUST_LOG` takes precedence over `level`. Later calls are no-ops.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    // Fails only if a subscriber is already installed.
    let _ = subscriber.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init("warn");
        init("debug");
        tracing::debug!("after init");
    }
}
