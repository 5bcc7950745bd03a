//! Diagnostics on stderr.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a log filter. Overrides `-v`.
pub const LOG_VAR: &str = "ROSIE_LOG";

/// Filter used when `ROSIE_LOG` is unset.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    // A subscriber installed earlier wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
