//! The runtime context created by `initialize`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::config::{SetBy, Setting, check_alloc_limit, default_libpath};
use crate::engine::Engine;
use crate::package::Environment;
use crate::package::load::{Loader, PACKAGE_EXTENSION};
use crate::registry::{EngineId, EngineRegistry, SharedEngine};
use crate::{Error, Result, stdlib};

/// Modules loaded with `require`, keyed by name.
pub type ModuleTable = IndexMap<String, Module>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModuleOrigin {
    Builtin,
    File(PathBuf),
}

/// A standard-library module made available to every engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub source: String,
    /// Imported under its own name into engines created afterwards.
    pub assigned: bool,
    pub origin: ModuleOrigin,
}

/// Settings for a [`Runtime`].
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub(crate) home: PathBuf,
    pub(crate) libpath: Setting<Vec<PathBuf>>,
    pub(crate) alloc_limit: Setting<usize>,
}

impl RuntimeConfig {
    /// Defaults for `home`: libpath from `$ROSIE_LIBPATH` or `<home>/rpl`, no allocation limit.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let libpath = default_libpath(&home);
        Self {
            home,
            libpath,
            alloc_limit: Setting::new(0, SetBy::Default),
        }
    }

    /// Set the libpath new engines start with.
    pub fn libpath(mut self, dirs: Vec<PathBuf>) -> Self {
        self.libpath = Setting::new(dirs, SetBy::Api);
        self
    }

    /// Set the allocation limit (KB) new engines start with.
    pub fn alloc_limit(mut self, kb: usize) -> Self {
        self.alloc_limit = Setting::new(kb, SetBy::Api);
        self
    }
}

/// Shared mutable state of a runtime.
pub struct RuntimeState {
    pub modules: Arc<RwLock<ModuleTable>>,
    pub engines: RwLock<EngineRegistry>,
}

pub struct Runtime {
    config: RuntimeConfig,
    state: RuntimeState,
}

impl Runtime {
    /// Create a runtime rooted at `home` with default settings.
    pub fn initialize(home: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(RuntimeConfig::new(home))
    }

    pub fn with_config(mut config: RuntimeConfig) -> Result<Self> {
        let home = fs::canonicalize(&config.home).map_err(|e| {
            Error::InvalidArgument(format!("rosie home {}: {e}", config.home.display()))
        })?;
        if !home.is_dir() {
            return Err(Error::InvalidArgument(format!(
                "rosie home is not a directory: {}",
                home.display()
            )));
        }
        check_alloc_limit(config.alloc_limit.value)?;
        if config.libpath.set_by == SetBy::Default {
            config.libpath = default_libpath(&home);
        }
        config.home = home;
        debug!(home = %config.home.display(), "rosie initialized");

        Ok(Self {
            config,
            state: RuntimeState {
                modules: Arc::new(RwLock::new(ModuleTable::new())),
                engines: RwLock::new(EngineRegistry::new()),
            },
        })
    }

    pub fn home(&self) -> &Path {
        &self.config.home
    }

    /// Whether `path` names this runtime's home directory.
    pub fn is_home(&self, path: &Path) -> bool {
        fs::canonicalize(path).is_ok_and(|p| p == self.config.home)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Load standard-library module `name` into the module table.
    ///
    /// The source is `<home>/rpl/<name>.rpl` when present, otherwise the
    /// built-in module of that name. With `assign_name`, engines created
    /// afterwards see the module under `name` without an explicit import.
    pub fn require(&self, name: &str, assign_name: bool) -> Result<()> {
        if !crate::package::is_identifier(name) {
            return Err(Error::InvalidArgument(format!("invalid module name: {name}")));
        }

        let path = self
            .config
            .home
            .join("rpl")
            .join(format!("{name}.{PACKAGE_EXTENSION}"));
        let (source, origin) = if path.is_file() {
            let source = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
            (source, ModuleOrigin::File(path))
        } else {
            let source = stdlib::source(name).ok_or_else(|| Error::ModuleNotFound(name.to_owned()))?;
            (source.to_owned(), ModuleOrigin::Builtin)
        };

        let mut modules = self.state.modules.write();
        let assigned = assign_name || modules.get(name).is_some_and(|m| m.assigned);
        let mut candidate = modules.clone();
        candidate.insert(
            name.to_owned(),
            Module {
                name: name.to_owned(),
                source,
                assigned,
                origin,
            },
        );

        let mut env = Environment::default();
        let declared = Loader::new(&mut env, &self.config.libpath.value, &candidate)
            .import(name)
            .map_err(|errors| {
                let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
                Error::InvalidArgument(format!("module {name}: {}", messages.join("; ")))
            })?;
        if declared != name {
            return Err(Error::InvalidArgument(format!(
                "module {name} declares package {declared}"
            )));
        }

        debug!(module = name, assigned, "module required");
        *modules = candidate;
        Ok(())
    }

    /// Create an engine. Assigned modules are imported into it.
    pub fn new_engine(&self) -> Result<EngineId> {
        let mut engine = Engine::new(&self.config, Arc::clone(&self.state.modules));
        let assigned: Vec<String> = self
            .state
            .modules
            .read()
            .values()
            .filter(|m| m.assigned)
            .map(|m| m.name.clone())
            .collect();
        for name in assigned {
            let loaded = engine.import(&name, None);
            if !loaded.ok {
                let messages: Vec<String> = loaded.errors.iter().map(ToString::to_string).collect();
                return Err(Error::EngineCreationFailed(format!(
                    "cannot import {name}: {}",
                    messages.join("; ")
                )));
            }
        }

        let id = self.state.engines.write().insert(engine);
        debug!(engine = %id, "engine created");
        Ok(id)
    }

    /// Drop an engine. Later use of `id` is `UnknownEngine`.
    pub fn finalize(&self, id: &str) -> Result<()> {
        if self.state.engines.write().remove(id).is_none() {
            return Err(Error::UnknownEngine(id.to_owned()));
        }
        debug!(engine = id, "engine finalized");
        Ok(())
    }

    pub fn engine(&self, id: &str) -> Result<SharedEngine> {
        self.state
            .engines
            .read()
            .get(id)
            .ok_or_else(|| Error::UnknownEngine(id.to_owned()))
    }

    /// Run `f` with exclusive access to engine `id`.
    pub fn with_engine<T>(&self, id: &str, f: impl FnOnce(&mut Engine) -> Result<T>) -> Result<T> {
        // Registry lock is released here, before the engine is locked.
        let engine = self.engine(id)?;
        let mut engine = engine.lock();
        f(&mut engine)
    }

    /// Names of the modules in the module table.
    pub fn modules(&self) -> Vec<String> {
        self.state.modules.read().keys().cloned().collect()
    }

    pub fn module(&self, name: &str) -> Option<Module> {
        self.state.modules.read().get(name).cloned()
    }

    pub fn engine_count(&self) -> usize {
        self.state.engines.read().len()
    }

    /// Direct access to the module table and engine registry.
    #[cfg(feature = "unstable-state")]
    pub fn state(&self) -> &RuntimeState {
        &self.state
    }
}
