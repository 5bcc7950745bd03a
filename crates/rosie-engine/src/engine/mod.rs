//! Engine sessions.
//!
//! An [`Engine`] owns a package environment, a compiled pattern table and
//! its own configuration. Engines are created through
//! [`Runtime::new_engine`](crate::Runtime::new_engine) and addressed by
//! [`EngineId`](crate::EngineId).

pub mod encode;
pub mod matchfile;
pub mod pattern;
pub mod rcfile;
pub mod trace;

#[cfg(test)]
mod engine_tests;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use rosie_core::{ColorMap, VERSION};
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::config::{
    ConfigEntry, SetBy, Setting, check_alloc_limit, join_libpath, split_libpath,
};
use crate::package::expand::expand;
use crate::package::load::Loader;
use crate::package::{Environment, Violation, is_identifier, is_qualified_identifier};
use crate::runtime::{ModuleTable, RuntimeConfig};
use crate::{Error, Result};

pub use encode::Encoder;
pub use matchfile::{MatchFileCounts, MatchFileIo};
pub use pattern::{CompiledPattern, MatchNode, PatternId, PatternTable};
pub use rcfile::{RcFile, RcOption};
pub use trace::{TraceResult, TraceStyle};

/// Outcome of [`Engine::compile`]. Pattern errors are data, not failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Compiled {
    pub pattern: Option<PatternId>,
    pub errors: Vec<Violation>,
}

/// Outcome of `load`, `loadfile` and `import`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Loaded {
    pub ok: bool,
    /// Package declared by the loaded source, if any.
    pub package: Option<String>,
    pub errors: Vec<Violation>,
}

impl Loaded {
    fn success(package: Option<String>) -> Self {
        Self {
            ok: true,
            package,
            errors: Vec::new(),
        }
    }

    fn failure(errors: Vec<Violation>) -> Self {
        Self {
            ok: false,
            package: None,
            errors,
        }
    }
}

/// Result of one anchored match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub matched: bool,
    /// Encoder output; empty when nothing matched.
    #[serde(serialize_with = "lossy")]
    pub data: Vec<u8>,
    /// Input bytes after the end of the match.
    pub leftover: usize,
    pub abend: bool,
    /// Microseconds spent in the whole call.
    pub ttotal: u64,
    /// Microseconds spent matching.
    pub tmatch: u64,
}

fn lossy<S: Serializer>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(data))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AllocLimit {
    /// Limit in KB; 0 means unlimited.
    pub limit: usize,
    /// KB used by compiled patterns.
    pub usage: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RcExecution {
    pub exists: bool,
    pub ok: bool,
}

/// A binding visible from the top-level scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BindingInfo {
    pub name: String,
    pub alias: bool,
    pub expression: String,
}

pub struct Engine {
    home: PathBuf,
    env: Environment,
    patterns: PatternTable,
    libpath: Setting<Vec<PathBuf>>,
    alloc_limit: Setting<usize>,
    colors: Setting<String>,
    color_map: ColorMap,
    modules: Arc<RwLock<ModuleTable>>,
}

impl Engine {
    pub(crate) fn new(config: &RuntimeConfig, modules: Arc<RwLock<ModuleTable>>) -> Self {
        Self {
            home: config.home.clone(),
            env: Environment::default(),
            patterns: PatternTable::new(),
            libpath: config.libpath.clone(),
            alloc_limit: config.alloc_limit.clone(),
            colors: Setting::new(ColorMap::DEFAULT_SPEC.to_owned(), SetBy::Default),
            color_map: ColorMap::default(),
            modules,
        }
    }

    /// Compile `expression` against the top-level scope.
    pub fn compile(&mut self, expression: &str) -> Compiled {
        debug!(expression, "compiling pattern");
        match self.try_compile(expression) {
            Ok(id) => Compiled {
                pattern: Some(id),
                errors: Vec::new(),
            },
            Err(errors) => {
                debug!(expression, errors = errors.len(), "compile failed");
                Compiled {
                    pattern: None,
                    errors,
                }
            }
        }
    }

    fn try_compile(&mut self, expression: &str) -> std::result::Result<PatternId, Vec<Violation>> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Err(vec![Violation::new("empty expression")]);
        }

        let target = is_qualified_identifier(expression)
            .then(|| self.env.resolve(None, expression))
            .flatten();
        let (type_name, expansion, root_ref) = match target {
            // A bare reference compiles as the binding itself.
            Some(target) => {
                let type_name = target.display_name();
                let root_ref = (!target.binding.alias).then_some(0);
                let expansion = expand(&self.env, None, &format!("${{{expression}}}"))
                    .map_err(|v| vec![v])?;
                (type_name, expansion, root_ref)
            }
            None => {
                let expansion = expand(&self.env, None, expression).map_err(|v| vec![v])?;
                ("*".to_owned(), expansion, None)
            }
        };

        let pattern = CompiledPattern::new(expression, type_name, expansion, root_ref)
            .map_err(|v| vec![v])?;
        let usage = self.patterns.memory_usage() + pattern.memory_usage();
        if exceeds_limit(usage, self.alloc_limit.value) {
            return Err(vec![Violation::new("allocation limit exceeded")]);
        }
        self.patterns
            .insert(pattern)
            .map_err(|e| vec![Violation::new(e.to_string())])
    }

    pub fn free_pattern(&mut self, id: PatternId) -> Result<()> {
        self.patterns.remove(id).map(|_| ())
    }

    pub fn pattern(&self, id: PatternId) -> Result<&CompiledPattern> {
        self.patterns.get(id)
    }

    pub fn patterns(&self) -> &PatternTable {
        &self.patterns
    }

    /// Match `input` against pattern `id`, anchored at 1-based `start`.
    pub fn match_input(
        &self,
        id: PatternId,
        input: &[u8],
        start: usize,
        encoder: Encoder,
    ) -> Result<MatchResult> {
        let t0 = Instant::now();
        let pattern = self.patterns.get(id)?;
        let at = start_offset(input, start)?;

        let t1 = Instant::now();
        let caps = pattern.captures(input, at);
        let tmatch = micros(t1);

        let tree = caps.as_ref().and_then(|caps| pattern.tree(input, caps));
        let (matched, data, leftover) = match tree {
            Some(tree) => {
                let data = encoder.encode(input, &tree, &self.color_map)?;
                (true, data, input.len() - tree.range().end)
            }
            None => (false, Vec::new(), input.len() - at),
        };

        Ok(MatchResult {
            matched,
            data,
            leftover,
            abend: false,
            ttotal: micros(t0),
            tmatch,
        })
    }

    pub fn trace(
        &self,
        id: PatternId,
        input: &[u8],
        start: usize,
        style: TraceStyle,
    ) -> Result<TraceResult> {
        let pattern = self.patterns.get(id)?;
        let at = start_offset(input, start)?;
        trace::trace(pattern, input, at, style)
    }

    /// Load package source. Nothing is committed unless the whole source loads.
    pub fn load(&mut self, source: &str) -> Loaded {
        let modules = self.modules.read();
        let mut candidate = self.env.clone();
        let result = Loader::new(&mut candidate, &self.libpath.value, &modules).load_source(source);
        match result {
            Ok(package) => {
                debug!(package = package.as_deref().unwrap_or(""), "loaded source");
                self.env = candidate;
                Loaded::success(package)
            }
            Err(errors) => {
                debug!(errors = errors.len(), "load failed");
                Loaded::failure(errors)
            }
        }
    }

    pub fn loadfile(&mut self, path: &Path) -> Result<Loaded> {
        let source = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        debug!(path = %path.display(), "loading file");
        Ok(self.load(&source))
    }

    /// Import `package` into the top-level scope under `as_name` or its own name.
    pub fn import(&mut self, package: &str, as_name: Option<&str>) -> Loaded {
        if !is_identifier(package) {
            return Loaded::failure(vec![Violation::new(format!(
                "invalid package name: {package}"
            ))]);
        }
        if let Some(alias) = as_name.filter(|a| !is_identifier(a)) {
            return Loaded::failure(vec![Violation::new(format!(
                "invalid import alias: {alias}"
            ))]);
        }

        let modules = self.modules.read();
        let mut candidate = self.env.clone();
        let result = Loader::new(&mut candidate, &self.libpath.value, &modules).import(package);
        match result {
            Ok(declared) => {
                debug!(package, declared = %declared, "imported package");
                candidate
                    .top
                    .imports
                    .insert(as_name.unwrap_or(package).to_owned(), declared.clone());
                self.env = candidate;
                Loaded::success(Some(declared))
            }
            Err(errors) => Loaded::failure(errors),
        }
    }

    pub fn libpath(&self) -> &[PathBuf] {
        &self.libpath.value
    }

    pub fn set_libpath(&mut self, dirs: Vec<PathBuf>, set_by: SetBy) {
        self.libpath.set(dirs, set_by);
    }

    /// Query, and with `Some(kb)` replace, the allocation limit.
    pub fn alloc_limit(&mut self, kb: Option<usize>) -> Result<AllocLimit> {
        if let Some(kb) = kb {
            check_alloc_limit(kb)?;
            self.alloc_limit.set(kb, SetBy::Api);
        }
        Ok(AllocLimit {
            limit: self.alloc_limit.value,
            usage: self.patterns.memory_usage() / 1024,
        })
    }

    pub fn set_colors(&mut self, spec: &str, set_by: SetBy) -> Result<()> {
        self.color_map =
            ColorMap::parse(spec).map_err(|e| Error::InvalidArgument(e.to_string()))?;
        self.colors.set(spec.to_owned(), set_by);
        Ok(())
    }

    pub fn matchfile(
        &self,
        id: PatternId,
        encoder: Encoder,
        files: &MatchFileIo,
    ) -> Result<MatchFileCounts> {
        let pattern = self.patterns.get(id)?;
        matchfile::run(pattern, encoder, &self.color_map, files)
    }

    /// Read an rc file; `None` selects `~/.rosierc`.
    pub fn read_rcfile(&self, path: Option<&Path>) -> Result<RcFile> {
        match path.map(Path::to_path_buf).or_else(rcfile::default_path) {
            Some(path) => rcfile::read(&path),
            None => Ok(RcFile::default()),
        }
    }

    /// Apply an rc file. A failing option marks the result not ok but the
    /// remaining options are still applied.
    pub fn execute_rcfile(&mut self, path: Option<&Path>) -> Result<RcExecution> {
        let Some(path) = path.map(Path::to_path_buf).or_else(rcfile::default_path) else {
            return Ok(RcExecution {
                exists: false,
                ok: true,
            });
        };
        let rc = rcfile::read(&path)?;
        if !rc.exists {
            return Ok(RcExecution {
                exists: false,
                ok: true,
            });
        }
        let Some(options) = rc.options else {
            warn!(path = %path.display(), "malformed rc file");
            return Ok(RcExecution {
                exists: true,
                ok: false,
            });
        };

        let base = path.parent().unwrap_or(Path::new("."));
        let mut ok = true;
        for option in &options {
            if let Err(message) = self.apply_rc_option(option, base) {
                warn!(path = %path.display(), key = %option.key, "{message}");
                ok = false;
            }
        }
        Ok(RcExecution { exists: true, ok })
    }

    fn apply_rc_option(&mut self, option: &RcOption, base: &Path) -> std::result::Result<(), String> {
        let value = option.value.as_str();
        match option.key.as_str() {
            "libpath" => {
                let dirs = split_libpath(value)
                    .into_iter()
                    .map(|dir| base.join(dir))
                    .collect();
                self.set_libpath(dirs, SetBy::Rcfile);
                Ok(())
            }
            "loadfile" => {
                let loaded = self.loadfile(&base.join(value)).map_err(|e| e.to_string())?;
                check_loaded(loaded)
            }
            "import" => {
                let words: Vec<&str> = value.split_whitespace().collect();
                let loaded = match words.as_slice() {
                    [package] => self.import(package, None),
                    [package, "as", alias] => self.import(package, Some(alias)),
                    _ => return Err(format!("malformed import: {value}")),
                };
                check_loaded(loaded)
            }
            "colors" => self
                .set_colors(value, SetBy::Rcfile)
                .map_err(|e| e.to_string()),
            other => Err(format!("unknown option: {other}")),
        }
    }

    /// Configuration listing.
    pub fn config(&self) -> Vec<ConfigEntry> {
        let modules = self.modules.read();
        let module_names = modules.keys().cloned().collect::<Vec<_>>().join(",");
        let modules_set_by = if modules.is_empty() {
            SetBy::Default
        } else {
            SetBy::Api
        };
        let encoders = Encoder::ALL.map(Encoder::name).join(",");

        vec![
            ConfigEntry::new("ROSIE_VERSION", VERSION, SetBy::Default, "version of rosie"),
            ConfigEntry::new(
                "ROSIE_HOME",
                self.home.display().to_string(),
                SetBy::Api,
                "home directory of the rosie installation",
            ),
            ConfigEntry::new(
                "ROSIE_LIBPATH",
                join_libpath(&self.libpath.value),
                self.libpath.set_by,
                "directories searched for packages",
            ),
            ConfigEntry::new(
                "ROSIE_ALLOC_LIMIT",
                self.alloc_limit.value.to_string(),
                self.alloc_limit.set_by,
                "allocation limit in KB (0 is unlimited)",
            ),
            ConfigEntry::new(
                "ROSIE_COLORS",
                self.colors.value.clone(),
                self.colors.set_by,
                "colors used by the color encoder",
            ),
            ConfigEntry::new(
                "ROSIE_ENCODERS",
                encoders,
                SetBy::Default,
                "available output encoders",
            ),
            ConfigEntry::new(
                "ROSIE_MODULES",
                module_names,
                modules_set_by,
                "modules loaded with require",
            ),
        ]
    }

    /// Bindings visible from the top level, including imported packages.
    pub fn bindings(&self) -> Vec<BindingInfo> {
        let top = self.env.top.bindings.values().map(|b| BindingInfo {
            name: b.name.clone(),
            alias: b.alias,
            expression: b.expression.clone(),
        });
        let imported = self.env.top.imports.iter().flat_map(|(prefix, declared)| {
            self.env
                .packages
                .get(declared)
                .into_iter()
                .flat_map(|p| p.bindings.values())
                .map(move |b| BindingInfo {
                    name: format!("{prefix}.{}", b.name),
                    alias: b.alias,
                    expression: b.expression.clone(),
                })
        });
        top.chain(imported).collect()
    }
}

fn check_loaded(loaded: Loaded) -> std::result::Result<(), String> {
    if loaded.ok {
        return Ok(());
    }
    Err(loaded
        .errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; "))
}

/// Whether `usage` bytes exceed a limit of `limit_kb` (0 is unlimited).
pub(crate) fn exceeds_limit(usage: usize, limit_kb: usize) -> bool {
    limit_kb != 0 && usage / 1024 > limit_kb
}

/// Zero-based offset for a 1-based start position.
fn start_offset(input: &[u8], start: usize) -> Result<usize> {
    if start == 0 || start > input.len() + 1 {
        return Err(Error::InvalidArgument(format!(
            "start position {start} is outside the input (length {})",
            input.len()
        )));
    }
    Ok(start - 1)
}

fn micros(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_micros()).unwrap_or(u64::MAX)
}
