//! Packages, bindings and name resolution.
//!
//! Package source is line oriented:
//!
//! ```text
//! -- comment
//! package net
//! import num, word as w
//! alias octet = 25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9]
//! ipv4 = ${octet}\.${octet}\.${octet}\.${octet}
//! ```
//!
//! Binding expressions are regular expressions extended with `${name}` and
//! `${pkg.name}` references, which [`expand`] rewrites into plain regex
//! syntax before compilation.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

pub(crate) mod expand;
pub(crate) mod load;
pub(crate) mod parse;

#[cfg(test)]
mod load_tests;
#[cfg(test)]
mod parse_tests;

pub use expand::{Expansion, RefGroup};

/// A problem found in a pattern expression or package source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
}

impl Violation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            binding: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn in_binding(mut self, binding: impl Into<String>) -> Self {
        self.binding = Some(binding.into());
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = self.line {
            write!(f, "line {line}: ")?;
        }
        if let Some(binding) = &self.binding {
            write!(f, "{binding}: ")?;
        }
        f.write_str(&self.message)
    }
}

/// A named pattern expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub expression: String,
    /// Aliases expand inline and never appear in match output.
    pub alias: bool,
}

/// A scope of bindings. The top-level scope is a package with an empty name.
#[derive(Clone, Debug, Default)]
pub struct Package {
    pub name: String,
    pub bindings: IndexMap<String, Binding>,
    /// Local prefix -> declared package name.
    pub imports: IndexMap<String, String>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn scope_name(&self) -> Option<&str> {
        (!self.name.is_empty()).then_some(self.name.as_str())
    }
}

/// Everything an engine can refer to: its top-level scope plus every
/// package loaded so far, keyed by declared name.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    pub top: Package,
    pub packages: HashMap<String, Package>,
}

/// A reference resolved to its binding.
#[derive(Clone, Copy, Debug)]
pub struct Resolved<'e> {
    /// Package the binding lives in; `None` for the top-level scope.
    pub package: Option<&'e str>,
    pub binding: &'e Binding,
}

impl Resolved<'_> {
    /// Name used as the match type: `name` or `pkg.name`.
    pub fn display_name(&self) -> String {
        match self.package {
            Some(pkg) => format!("{pkg}.{}", self.binding.name),
            None => self.binding.name.clone(),
        }
    }
}

impl Environment {
    pub fn scope(&self, scope: Option<&str>) -> Option<&Package> {
        match scope {
            None => Some(&self.top),
            Some(name) => self.packages.get(name),
        }
    }

    /// Resolve `name` or `prefix.name` as seen from `scope`.
    pub fn resolve(&self, scope: Option<&str>, ident: &str) -> Option<Resolved<'_>> {
        let from = self.scope(scope)?;
        match ident.split_once('.') {
            None => from.bindings.get(ident).map(|binding| Resolved {
                package: from.scope_name(),
                binding,
            }),
            Some((prefix, local)) => {
                let package = self.packages.get(from.imports.get(prefix)?)?;
                package.bindings.get(local).map(|binding| Resolved {
                    package: package.scope_name(),
                    binding,
                })
            }
        }
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// An identifier optionally qualified by one package prefix.
pub fn is_qualified_identifier(s: &str) -> bool {
    match s.split_once('.') {
        Some((prefix, local)) => is_identifier(prefix) && is_identifier(local),
        None => is_identifier(s),
    }
}
