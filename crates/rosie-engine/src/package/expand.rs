//! Reference expansion: rewrites `${name}` references into regex groups.
//!
//! Every non-alias reference becomes a named capture group `_rN`, where `N`
//! indexes [`Expansion::refs`]. Alias references become non-capturing groups.
//! Backslash escapes are copied verbatim, except that an escaped reference
//! such as `\${x}` is emitted as the literal text `${x}`.
//!
//! Expansion inlines the text of every referenced binding, so its output is
//! capped at [`MAX_EXPANSION_LEN`] bytes.

use std::collections::HashSet;
use std::fmt::Write;

use super::{Environment, Violation, is_qualified_identifier};

/// A capture group produced by a binding reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefGroup {
    /// Match type reported for the group (`name` or `pkg.name`).
    pub name: String,
    /// Index of the enclosing reference, `None` at the outermost level.
    pub parent: Option<usize>,
}

/// Result of expanding an expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expansion {
    pub regex: String,
    pub refs: Vec<RefGroup>,
}

/// Longest regex an expansion may produce.
pub const MAX_EXPANSION_LEN: usize = 128 * 1024;

/// Violation message for an expansion over [`MAX_EXPANSION_LEN`].
pub const EXPANSION_TOO_LARGE: &str = "expansion too large";

/// A binding as `(package, name)`; `None` is the top-level scope.
pub type BindingKey<'e> = (Option<&'e str>, &'e str);

/// Capture group name for reference `index`.
pub fn group_name(index: usize) -> String {
    format!("_r{index}")
}

/// Expand `expression` as seen from `scope`.
pub fn expand(
    env: &Environment,
    scope: Option<&str>,
    expression: &str,
) -> Result<Expansion, Violation> {
    expand_with(env, scope, expression, &HashSet::new())
}

/// Like [`expand`], but a reference to any binding in `oversized` fails at
/// once with [`EXPANSION_TOO_LARGE`].
pub fn expand_with<'e>(
    env: &'e Environment,
    scope: Option<&'e str>,
    expression: &str,
    oversized: &HashSet<BindingKey<'e>>,
) -> Result<Expansion, Violation> {
    let mut expander = Expander {
        env,
        oversized,
        refs: Vec::new(),
        open: Vec::new(),
        active: Vec::new(),
    };
    let mut regex = String::with_capacity(expression.len());
    expander.expand_into(scope, expression, &mut regex)?;
    if regex.len() > MAX_EXPANSION_LEN {
        return Err(Violation::new(EXPANSION_TOO_LARGE));
    }
    Ok(Expansion {
        regex,
        refs: expander.refs,
    })
}

struct Expander<'e, 's> {
    env: &'e Environment,
    oversized: &'s HashSet<BindingKey<'e>>,
    refs: Vec<RefGroup>,
    /// Stack of reference groups currently open.
    open: Vec<usize>,
    /// Bindings being expanded, for cycle detection.
    active: Vec<BindingKey<'e>>,
}

impl<'e> Expander<'e, '_> {
    fn expand_into(
        &mut self,
        scope: Option<&'e str>,
        expression: &str,
        out: &mut String,
    ) -> Result<(), Violation> {
        let mut rest = expression;
        while let Some(pos) = rest.find(['\\', '$']) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if let Some(literal) = escaped_reference(tail) {
                out.push_str(&regex_syntax::escape(&literal[1..]));
                rest = &tail[literal.len()..];
            } else if tail.starts_with('\\') {
                let escaped = tail[1..].chars().next().map_or(0, char::len_utf8);
                out.push_str(&tail[..1 + escaped]);
                rest = &tail[1 + escaped..];
            } else if let Some(body) = tail.strip_prefix("${") {
                let end = body.find('}').ok_or_else(|| {
                    Violation::new(format!("unterminated reference in: {expression}"))
                })?;
                self.reference(scope, &body[..end], out)?;
                rest = &body[end + 1..];
            } else {
                out.push('$');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        Ok(())
    }

    fn reference(
        &mut self,
        scope: Option<&'e str>,
        ident: &str,
        out: &mut String,
    ) -> Result<(), Violation> {
        if !is_qualified_identifier(ident) {
            return Err(Violation::new(format!("invalid reference: ${{{ident}}}")));
        }
        let env = self.env;
        let target = env
            .resolve(scope, ident)
            .ok_or_else(|| Violation::new(format!("undefined identifier: {ident}")))?;

        let key = (target.package, target.binding.name.as_str());
        if out.len() > MAX_EXPANSION_LEN || self.oversized.contains(&key) {
            return Err(Violation::new(EXPANSION_TOO_LARGE));
        }
        if self.active.contains(&key) {
            return Err(Violation::new(format!(
                "recursive binding: {}",
                target.display_name()
            )));
        }
        self.active.push(key);

        if target.binding.alias {
            out.push_str("(?:");
            self.expand_into(target.package, &target.binding.expression, out)?;
        } else {
            let index = self.refs.len();
            self.refs.push(RefGroup {
                name: target.display_name(),
                parent: self.open.last().copied(),
            });
            let _ = write!(out, "(?P<{}>", group_name(index));
            self.open.push(index);
            self.expand_into(target.package, &target.binding.expression, out)?;
            self.open.pop();
        }
        out.push(')');

        self.active.pop();
        Ok(())
    }
}

/// The `\${...}` prefix of `tail`, if it starts with an escaped reference.
fn escaped_reference(tail: &str) -> Option<&str> {
    let body = tail.strip_prefix("\\${")?;
    let end = body.find('}')?;
    Some(&tail[..3 + end + 1])
}
