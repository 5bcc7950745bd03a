//! Loading package source into an [`Environment`].
//!
//! A load works on a candidate copy of the environment. The caller commits
//! the copy only when the load reports no violations, so a failed load
//! leaves the engine untouched.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use tracing::debug;

use super::expand::{BindingKey, EXPANSION_TOO_LARGE, expand_with};
use super::parse::{ImportDecl, Source, parse};
use super::{Binding, Environment, Package, Violation};
use crate::runtime::ModuleTable;

/// File extension of package files on the libpath.
pub const PACKAGE_EXTENSION: &str = "rpl";

pub struct Loader<'a> {
    env: &'a mut Environment,
    libpath: &'a [PathBuf],
    modules: &'a ModuleTable,
    /// Packages whose import is in progress, for cycle detection.
    importing: Vec<String>,
}

impl<'a> Loader<'a> {
    pub fn new(env: &'a mut Environment, libpath: &'a [PathBuf], modules: &'a ModuleTable) -> Self {
        Self {
            env,
            libpath,
            modules,
            importing: Vec::new(),
        }
    }

    /// Load source text. Returns the declared package name, if any.
    pub fn load_source(&mut self, text: &str) -> Result<Option<String>, Vec<Violation>> {
        let source = parse(text)?;
        let scope = source.package.clone();
        self.install(source)?;
        self.check_scope(scope.as_deref())?;
        Ok(scope)
    }

    /// Import `package`, loading it if needed. Returns the declared name.
    pub fn import(&mut self, package: &str) -> Result<String, Vec<Violation>> {
        if self.env.packages.contains_key(package) {
            return Ok(package.to_owned());
        }
        if self.importing.iter().any(|p| p == package) {
            return Err(vec![Violation::new(format!("import cycle: {package}"))]);
        }

        let text = self.find_source(package)?;
        let source = parse(&text)?;
        let Some(declared) = source.package.clone() else {
            return Err(vec![Violation::new(format!(
                "not a package (no package declaration): {package}"
            ))]);
        };

        debug!(package, declared = %declared, "importing package");
        self.importing.push(package.to_owned());
        let result = self
            .install(source)
            .and_then(|()| self.check_scope(Some(&declared)));
        self.importing.pop();
        result.map(|()| declared)
    }

    fn find_source(&self, package: &str) -> Result<String, Vec<Violation>> {
        if let Some(module) = self.modules.get(package) {
            return Ok(module.source.clone());
        }
        let file_name = format!("{package}.{PACKAGE_EXTENSION}");
        for dir in self.libpath {
            let path = dir.join(&file_name);
            if path.is_file() {
                return fs::read_to_string(&path).map_err(|e| {
                    vec![Violation::new(format!("cannot read {}: {e}", path.display()))]
                });
            }
        }
        Err(vec![Violation::new(format!("cannot find package: {package}"))])
    }

    /// Resolve imports and add the bindings of `source` to its scope.
    fn install(&mut self, source: Source) -> Result<(), Vec<Violation>> {
        let imports = self.resolve_imports(&source.imports)?;

        let scope = match &source.package {
            Some(name) => {
                let mut package = Package::new(name.clone());
                package.imports = imports;
                self.env.packages.insert(name.clone(), package);
                self.env.packages.get_mut(name)
            }
            None => {
                self.env.top.imports.extend(imports);
                Some(&mut self.env.top)
            }
        };
        let Some(scope) = scope else {
            return Err(vec![Violation::new("package vanished during load")]);
        };

        for decl in source.bindings {
            scope.bindings.insert(
                decl.name.clone(),
                Binding {
                    name: decl.name,
                    expression: decl.expression,
                    alias: decl.alias,
                },
            );
        }
        Ok(())
    }

    fn resolve_imports(
        &mut self,
        decls: &[ImportDecl],
    ) -> Result<indexmap::IndexMap<String, String>, Vec<Violation>> {
        let mut imports = indexmap::IndexMap::new();
        let mut violations = Vec::new();
        for decl in decls {
            match self.import(&decl.package) {
                Ok(declared) => {
                    imports.insert(decl.prefix().to_owned(), declared);
                }
                Err(errs) => violations.extend(errs.into_iter().map(|v| v.at_line(decl.line))),
            }
        }
        if violations.is_empty() {
            Ok(imports)
        } else {
            Err(violations)
        }
    }

    /// Expand and syntax-check every binding in `scope`.
    ///
    /// Bindings found too large are remembered for the rest of the pass, so
    /// a binding that references one fails without expanding it again.
    fn check_scope(&self, scope: Option<&str>) -> Result<(), Vec<Violation>> {
        let env = &*self.env;
        let Some(package) = env.scope(scope) else {
            return Ok(());
        };
        let mut oversized = HashSet::new();
        let mut violations = Vec::new();
        let scope = package.scope_name();
        for binding in package.bindings.values() {
            if let Err(violation) = check_binding(env, scope, binding, &oversized) {
                if violation.message == EXPANSION_TOO_LARGE {
                    oversized.insert((scope, binding.name.as_str()));
                }
                violations.push(violation);
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

fn check_binding<'e>(
    env: &'e Environment,
    scope: Option<&'e str>,
    binding: &Binding,
    oversized: &HashSet<BindingKey<'e>>,
) -> Result<(), Violation> {
    let expansion = expand_with(env, scope, &format!("${{{}}}", binding.name), oversized)
        .map_err(|v| v.in_binding(&binding.name))?;
    regex_syntax::Parser::new()
        .parse(&expansion.regex)
        .map(|_| ())
        .map_err(|e| Violation::new(syntax_message(&e)).in_binding(&binding.name))
}

/// First line of a regex-syntax error, without the pattern echo.
pub fn syntax_message(err: &regex_syntax::Error) -> String {
    match err {
        regex_syntax::Error::Parse(e) => e.kind().to_string(),
        regex_syntax::Error::Translate(e) => e.kind().to_string(),
        other => other.to_string(),
    }
}
