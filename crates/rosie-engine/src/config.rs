//! Engine configuration and its provenance.

use std::env;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{Error, Result};

/// Environment variable holding the default libpath.
pub const LIBPATH_VAR: &str = "ROSIE_LIBPATH";

/// Smallest non-zero allocation limit, in KB.
pub const MIN_ALLOC_LIMIT_KB: usize = 8192;

/// Where a configuration value came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SetBy {
    #[default]
    Default,
    Environment,
    Rcfile,
    Api,
}

impl SetBy {
    pub fn name(self) -> &'static str {
        match self {
            SetBy::Default => "default",
            SetBy::Environment => "environment",
            SetBy::Rcfile => "rcfile",
            SetBy::Api => "api",
        }
    }
}

/// A value together with its provenance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Setting<T> {
    pub value: T,
    pub set_by: SetBy,
}

impl<T> Setting<T> {
    pub fn new(value: T, set_by: SetBy) -> Self {
        Self { value, set_by }
    }

    pub fn set(&mut self, value: T, set_by: SetBy) {
        self.value = value;
        self.set_by = set_by;
    }
}

/// One row of the `config` listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub name: &'static str,
    pub value: String,
    pub set_by: SetBy,
    pub description: &'static str,
}

impl ConfigEntry {
    pub fn new(
        name: &'static str,
        value: impl Into<String>,
        set_by: SetBy,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            value: value.into(),
            set_by,
            description,
        }
    }
}

/// Split a colon-separated directory list.
pub fn split_libpath(s: &str) -> Vec<PathBuf> {
    env::split_paths(s)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

/// Join directories back into a colon-separated list.
pub fn join_libpath(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(":")
}

/// The libpath an engine starts with: `$ROSIE_LIBPATH`, or `<home>/rpl`.
pub fn default_libpath(home: &Path) -> Setting<Vec<PathBuf>> {
    match env::var(LIBPATH_VAR) {
        Ok(value) if !value.is_empty() => Setting::new(split_libpath(&value), SetBy::Environment),
        _ => Setting::new(vec![home.join("rpl")], SetBy::Default),
    }
}

/// Reject allocation limits that are non-zero but below the minimum.
pub fn check_alloc_limit(kb: usize) -> Result<()> {
    if kb != 0 && kb < MIN_ALLOC_LIMIT_KB {
        return Err(Error::InvalidArgument(format!(
            "allocation limit must be 0 (unlimited) or at least {MIN_ALLOC_LIMIT_KB} KB, got {kb}"
        )));
    }
    Ok(())
}
