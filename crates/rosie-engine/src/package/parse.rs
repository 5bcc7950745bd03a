//! Line-oriented parser for package source.

use super::{Violation, is_identifier};

/// Parsed package source, before any name resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Source {
    pub package: Option<String>,
    pub imports: Vec<ImportDecl>,
    pub bindings: Vec<BindingDecl>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportDecl {
    pub package: String,
    pub alias: Option<String>,
    pub line: usize,
}

impl ImportDecl {
    /// Prefix the package is bound under in the importing scope.
    pub fn prefix(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.package)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingDecl {
    pub name: String,
    pub expression: String,
    pub alias: bool,
    pub line: usize,
}

/// Parse package source. All violations are collected, not just the first.
pub fn parse(text: &str) -> Result<Source, Vec<Violation>> {
    let mut source = Source::default();
    let mut violations = Vec::new();
    let mut seen_statement = false;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with("--") {
            continue;
        }

        let result = if let Some(rest) = keyword(line, "package") {
            if seen_statement {
                Err(Violation::new("package declaration must come first"))
            } else {
                parse_package(rest).map(|name| source.package = Some(name))
            }
        } else if let Some(rest) = keyword(line, "import") {
            parse_imports(rest, line_no).map(|imports| source.imports.extend(imports))
        } else {
            parse_binding(line, line_no).and_then(|decl| {
                if source.bindings.iter().any(|b| b.name == decl.name) {
                    Err(Violation::new(format!("duplicate binding: {}", decl.name)))
                } else {
                    source.bindings.push(decl);
                    Ok(())
                }
            })
        };

        if let Err(v) = result {
            violations.push(v.at_line(line_no));
        }
        seen_statement = true;
    }

    if violations.is_empty() {
        Ok(source)
    } else {
        Err(violations)
    }
}

/// Strip a leading keyword followed by whitespace.
fn keyword<'a>(line: &'a str, kw: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(kw)?;
    rest.starts_with(char::is_whitespace).then(|| rest.trim())
}

fn parse_package(rest: &str) -> Result<String, Violation> {
    if is_identifier(rest) {
        Ok(rest.to_owned())
    } else {
        Err(Violation::new(format!("invalid package name: {rest}")))
    }
}

fn parse_imports(rest: &str, line: usize) -> Result<Vec<ImportDecl>, Violation> {
    rest.split(',')
        .map(|item| {
            let words: Vec<&str> = item.split_whitespace().collect();
            let (package, alias) = match words.as_slice() {
                [package] => (*package, None),
                [package, "as", alias] => (*package, Some(*alias)),
                _ => return Err(Violation::new(format!("malformed import: {}", item.trim()))),
            };
            if !is_identifier(package) {
                return Err(Violation::new(format!("invalid package name: {package}")));
            }
            if let Some(alias) = alias.filter(|a| !is_identifier(a)) {
                return Err(Violation::new(format!("invalid import alias: {alias}")));
            }
            Ok(ImportDecl {
                package: package.to_owned(),
                alias: alias.map(str::to_owned),
                line,
            })
        })
        .collect()
}

fn parse_binding(line: &str, line_no: usize) -> Result<BindingDecl, Violation> {
    let (lhs, rhs) = line
        .split_once('=')
        .ok_or_else(|| Violation::new(format!("expected a binding: {line}")))?;

    let words: Vec<&str> = lhs.split_whitespace().collect();
    let (name, alias) = match words.as_slice() {
        [name] => (*name, false),
        ["alias", name] => (*name, true),
        _ => return Err(Violation::new(format!("malformed binding: {}", lhs.trim()))),
    };
    if !is_identifier(name) {
        return Err(Violation::new(format!("invalid binding name: {name}")));
    }

    let expression = rhs.trim();
    if expression.is_empty() {
        return Err(Violation::new("empty expression").in_binding(name));
    }

    Ok(BindingDecl {
        name: name.to_owned(),
        expression: expression.to_owned(),
        alias,
        line: line_no,
    })
}
