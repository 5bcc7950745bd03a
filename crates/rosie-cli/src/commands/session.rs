//! Runtime and engine setup shared by every command.

use std::env;
use std::path::{Path, PathBuf};

use rosie_engine::config::split_libpath;
use rosie_engine::{Engine, EngineId, Runtime, SetBy, stdlib};
use tracing::{debug, warn};

use super::{CommandError, describe};

/// Environment variable naming the default home directory.
pub const HOME_VAR: &str = "ROSIE_HOME";

pub struct SessionArgs {
    pub home: Option<PathBuf>,
    pub libpath: Option<String>,
    pub rcfile: Option<PathBuf>,
    pub norcfile: bool,
    pub loads: Vec<PathBuf>,
    pub imports: Vec<String>,
}

/// A runtime with one engine, prepared from the command line.
pub struct Session {
    runtime: Runtime,
    engine: EngineId,
}

impl Session {
    /// Create the runtime with the standard modules available for import,
    /// then apply to its engine in order: the rc file, `--libpath`, each
    /// `--load` and each `--import`.
    pub fn open(args: &SessionArgs) -> Result<Self, CommandError> {
        let home = match &args.home {
            Some(home) => home.clone(),
            None => default_home()?,
        };
        let runtime = Runtime::initialize(home)?;
        for name in stdlib::NAMES {
            runtime.require(name, false)?;
        }
        let engine = runtime.new_engine()?;
        let session = Self { runtime, engine };

        session.with_engine(|engine| {
            if !args.norcfile {
                execute_rcfile(engine, args.rcfile.as_deref())?;
            }
            if let Some(libpath) = &args.libpath {
                engine.set_libpath(split_libpath(libpath), SetBy::Api);
            }
            for path in &args.loads {
                let loaded = engine.loadfile(path)?;
                if !loaded.ok {
                    return Err(CommandError::Load {
                        path: path.display().to_string(),
                        details: describe(&loaded.errors),
                    });
                }
            }
            for spec in &args.imports {
                let (package, alias) = parse_import(spec);
                let loaded = engine.import(package, alias);
                if !loaded.ok {
                    return Err(CommandError::Import {
                        package: package.to_owned(),
                        details: describe(&loaded.errors),
                    });
                }
            }
            Ok(())
        })?;

        Ok(session)
    }

    pub fn with_engine<T>(
        &self,
        f: impl FnOnce(&mut Engine) -> Result<T, CommandError>,
    ) -> Result<T, CommandError> {
        let shared = self.runtime.engine(self.engine.as_str())?;
        let mut engine = shared.lock();
        f(&mut engine)
    }
}

fn default_home() -> Result<PathBuf, CommandError> {
    match env::var_os(HOME_VAR) {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home)),
        _ => env::current_dir().map_err(|e| CommandError::io(".", e)),
    }
}

/// A problem in the rc file is a warning, never a failure.
fn execute_rcfile(engine: &mut Engine, path: Option<&Path>) -> Result<(), CommandError> {
    let execution = engine.execute_rcfile(path)?;
    match (execution.exists, path) {
        (false, Some(path)) => warn!(path = %path.display(), "rc file not found"),
        (false, None) => debug!("no default rc file"),
        (true, _) if !execution.ok => warn!("rc file applied with errors"),
        (true, _) => debug!("rc file applied"),
    }
    Ok(())
}

/// `pkg` or `pkg as alias`.
pub(crate) fn parse_import(spec: &str) -> (&str, Option<&str>) {
    let words: Vec<&str> = spec.split_whitespace().collect();
    match words.as_slice() {
        [package, "as", alias] => (*package, Some(*alias)),
        _ => (spec.trim(), None),
    }
}
