//! Match tracing for debugging patterns.
//!
//! The trace mirrors the reference structure of a compiled pattern: every
//! binding reference reached by the match is reported with its span, and
//! references on untaken alternatives are reported as not matched.

use std::fmt::Write;
use std::str::FromStr;

use regex_automata::Span;
use regex_automata::util::captures::Captures;
use serde::Serialize;

use super::pattern::CompiledPattern;
use crate::{Error, Result};

/// Trace detail level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceStyle {
    /// Result plus top-level references.
    #[default]
    Condensed,
    /// Every nested reference, indented.
    Full,
    /// The full tree as JSON.
    Json,
}

impl FromStr for TraceStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "condensed" => Ok(TraceStyle::Condensed),
            "full" => Ok(TraceStyle::Full),
            "json" => Ok(TraceStyle::Json),
            other => Err(Error::InvalidTraceStyle(other.to_owned())),
        }
    }
}

/// Outcome of a trace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TraceResult {
    pub matched: bool,
    pub trace: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct TraceNode {
    #[serde(rename = "type")]
    kind: String,
    matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    s: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    e: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    subs: Vec<TraceNode>,
}

#[derive(Serialize)]
struct TraceDocument<'a> {
    expression: &'a str,
    pos: usize,
    #[serde(flatten)]
    root: &'a TraceNode,
}

/// Trace an anchored match of `pattern` at zero-based offset `at`.
pub fn trace(
    pattern: &CompiledPattern,
    input: &[u8],
    at: usize,
    style: TraceStyle,
) -> Result<TraceResult> {
    let caps = pattern.captures(input, at);
    let whole = caps.as_ref().and_then(|c| c.get_match()).map(|m| m.span());
    let root = build(
        pattern,
        caps.as_ref(),
        pattern.type_name().to_owned(),
        whole,
        pattern.root_ref,
    );

    let trace = match style {
        TraceStyle::Json => {
            let doc = TraceDocument {
                expression: pattern.expression(),
                pos: at + 1,
                root: &root,
            };
            serde_json::to_string(&doc)
                .map_err(|e| Error::Internal(format!("json encoding failed: {e}")))?
        }
        TraceStyle::Condensed => render(pattern.expression(), input, at, &root, Some(1)),
        TraceStyle::Full => render(pattern.expression(), input, at, &root, None),
    };

    Ok(TraceResult {
        matched: root.matched,
        trace,
    })
}

fn build(
    pattern: &CompiledPattern,
    caps: Option<&Captures>,
    kind: String,
    span: Option<Span>,
    scope: Option<usize>,
) -> TraceNode {
    let subs = match span {
        Some(_) => pattern
            .children(scope)
            .map(|i| {
                let sub = caps.and_then(|c| pattern.ref_span(c, i));
                build(pattern, caps, pattern.refs[i].name.clone(), sub, Some(i))
            })
            .collect(),
        None => Vec::new(),
    };
    TraceNode {
        kind,
        matched: span.is_some(),
        s: span.map(|s| s.start + 1),
        e: span.map(|s| s.end + 1),
        subs,
    }
}

fn render(
    expression: &str,
    input: &[u8],
    at: usize,
    root: &TraceNode,
    max_depth: Option<usize>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Expression: {expression}");
    let _ = writeln!(
        out,
        "Looking at: |{}| (input pos = {})",
        String::from_utf8_lossy(&input[at..]),
        at + 1
    );
    match (root.s, root.e) {
        (Some(s), Some(e)) => {
            let _ = writeln!(out, "Matched {} bytes", e - s);
        }
        _ => out.push_str("No match\n"),
    }
    for sub in &root.subs {
        render_node(&mut out, input, sub, 1, max_depth);
    }
    out
}

fn render_node(
    out: &mut String,
    input: &[u8],
    node: &TraceNode,
    depth: usize,
    max_depth: Option<usize>,
) {
    if max_depth.is_some_and(|max| depth > max) {
        return;
    }
    let indent = "  ".repeat(depth);
    match (node.s, node.e) {
        (Some(s), Some(e)) => {
            let _ = writeln!(
                out,
                "{indent}{}: matched \"{}\" at {s}..{e}",
                node.kind,
                String::from_utf8_lossy(&input[s - 1..e - 1])
            );
        }
        _ => {
            let _ = writeln!(out, "{indent}{}: not matched", node.kind);
        }
    }
    for sub in &node.subs {
        render_node(out, input, sub, depth + 1, max_depth);
    }
}
