//! The process-wide runtime slot.

use std::path::Path;
use std::sync::OnceLock;

use parking_lot::Mutex;
use rosie_engine::{Error, Result, Runtime};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_VAR: &str = "ROSIE_LOG";

static RUNTIME: OnceLock<Runtime> = OnceLock::new();
static INIT: Mutex<()> = Mutex::new(());

/// Install the runtime for `home`.
///
/// Repeating the call with the same home is a no-op; a different home is
/// `AlreadyInitialized`.
pub fn initialize(home: &Path) -> Result<()> {
    let _guard = INIT.lock();
    if let Some(runtime) = RUNTIME.get() {
        if runtime.is_home(home) {
            debug!(home = %home.display(), "already initialized");
            return Ok(());
        }
        return Err(Error::AlreadyInitialized {
            home: runtime.home().to_path_buf(),
        });
    }

    init_logging();
    let runtime = Runtime::initialize(home)?;
    if RUNTIME.set(runtime).is_err() {
        return Err(Error::Internal("runtime installed concurrently".into()));
    }
    Ok(())
}

pub fn get() -> Result<&'static Runtime> {
    RUNTIME.get().ok_or(Error::NotInitialized)
}

pub fn try_get() -> Option<&'static Runtime> {
    RUNTIME.get()
}

/// Log to stderr when `ROSIE_LOG` is set. A subscriber the host already
/// installed is left in place.
fn init_logging() {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_VAR) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}
