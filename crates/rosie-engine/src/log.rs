//! Host-program log messages.

use tracing::info;

/// Log `message` on behalf of the host program `program`.
pub fn message(program: &str, message: &str) {
    info!(target: "rosie", program, "{message}");
}
