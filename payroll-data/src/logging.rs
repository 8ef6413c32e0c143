use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

fn make_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Initializes logging to stderr. Call once at startup.
///
/// - Level: `default_directives` (e.g. `"info"`), or the RUST_LOG env var.
/// - Colored when stderr is a terminal, plain when redirected.
/// - No timestamps or targets; stdout stays free for the report.
///
/// Later calls are no-ops.
pub fn init_tracing(default_directives: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(make_filter(default_directives))
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .without_time()
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_twice_is_harmless() {
        init_tracing("debug");
        init_tracing("info");

        tracing::info!("logging initialized");
    }
}
