//! Compiled pattern table.
//!
//! Each expression is expanded, compiled to a `regex-automata` meta regex
//! and stored under a [`PatternId`]. Index 0 is unused (pattern id 0 means
//! "no pattern"), and ids are never reused after a pattern is freed.

use regex_automata::meta::Regex;
use regex_automata::util::captures::Captures;
use regex_automata::{Anchored, Input, PatternID, Span};
use serde::Serialize;

use crate::package::{Expansion, RefGroup, Violation, expand::group_name};
use crate::{Error, Result};

/// Handle to a compiled pattern within one engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PatternId(i32);

impl PatternId {
    /// Wrap a raw id. Non-positive ids are never valid.
    pub fn new(raw: i32) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    #[inline]
    pub fn get(self) -> i32 {
        self.0
    }
}

/// A node of the match tree, as produced by the `json` encoder.
///
/// Offsets are 1-based; `e` is exclusive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchNode {
    #[serde(rename = "type")]
    pub kind: String,
    pub s: usize,
    pub e: usize,
    pub data: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subs: Vec<MatchNode>,
}

impl MatchNode {
    /// Zero-based byte range of the node in the input.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.s - 1..self.e - 1
    }
}

#[derive(Debug)]
pub struct CompiledPattern {
    pub(crate) expression: String,
    /// Match type of the root node.
    pub(crate) type_name: String,
    pub(crate) regex: Regex,
    pub(crate) refs: Vec<RefGroup>,
    /// Capture group index for each entry of `refs`.
    group_index: Vec<usize>,
    /// When the expression is a single non-alias reference, its group is the root.
    pub(crate) root_ref: Option<usize>,
}

impl CompiledPattern {
    pub fn new(
        expression: &str,
        type_name: String,
        expansion: Expansion,
        root_ref: Option<usize>,
    ) -> std::result::Result<Self, Violation> {
        let regex = Regex::new(&expansion.regex).map_err(|e| Violation::new(build_message(&e)))?;
        let group_info = regex.group_info();
        let group_index = (0..expansion.refs.len())
            .map(|i| {
                group_info
                    .to_index(PatternID::ZERO, &group_name(i))
                    .ok_or_else(|| Violation::new(format!("missing capture group {}", group_name(i))))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            expression: expression.to_owned(),
            type_name,
            regex,
            refs: expansion.refs,
            group_index,
            root_ref,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Heap bytes used by the compiled regex.
    pub fn memory_usage(&self) -> usize {
        self.regex.memory_usage()
    }

    /// Run an anchored search at zero-based offset `at`.
    pub(crate) fn captures(&self, input: &[u8], at: usize) -> Option<Captures> {
        let mut caps = self.regex.create_captures();
        let search = Input::new(input).range(at..).anchored(Anchored::Yes);
        self.regex.search_captures(&search, &mut caps);
        caps.is_match().then_some(caps)
    }

    /// Span of reference `index` in a successful match.
    pub(crate) fn ref_span(&self, caps: &Captures, index: usize) -> Option<Span> {
        caps.get_group(self.group_index[index])
    }

    /// Indices of the references nested directly under `parent`.
    pub(crate) fn children(&self, parent: Option<usize>) -> impl Iterator<Item = usize> + '_ {
        self.refs
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.parent == parent)
            .map(|(i, _)| i)
    }

    /// Build the match tree for a successful match.
    pub(crate) fn tree(&self, input: &[u8], caps: &Captures) -> Option<MatchNode> {
        let whole = caps.get_match()?.span();
        Some(self.node(input, caps, self.type_name.clone(), whole, self.root_ref))
    }

    fn node(
        &self,
        input: &[u8],
        caps: &Captures,
        kind: String,
        span: Span,
        scope: Option<usize>,
    ) -> MatchNode {
        let subs = self
            .children(scope)
            .filter_map(|i| {
                let sub = self.ref_span(caps, i)?;
                Some(self.node(input, caps, self.refs[i].name.clone(), sub, Some(i)))
            })
            .collect();
        MatchNode {
            kind,
            s: span.start + 1,
            e: span.end + 1,
            data: String::from_utf8_lossy(&input[span.range()]).into_owned(),
            subs,
        }
    }
}

fn build_message(err: &regex_automata::meta::BuildError) -> String {
    match err.syntax_error() {
        Some(syntax) => crate::package::load::syntax_message(syntax),
        None => err.to_string(),
    }
}

/// Compiled patterns of one engine.
#[derive(Debug)]
pub struct PatternTable {
    /// Compiled entries (index 0 is unused).
    entries: Vec<Option<CompiledPattern>>,
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternTable {
    pub fn new() -> Self {
        Self {
            entries: vec![None], // index 0 reserved
        }
    }

    pub fn insert(&mut self, pattern: CompiledPattern) -> Result<PatternId> {
        let id = i32::try_from(self.entries.len())
            .map_err(|_| Error::Internal("too many compiled patterns".into()))?;
        self.entries.push(Some(pattern));
        Ok(PatternId(id))
    }

    pub fn get(&self, id: PatternId) -> Result<&CompiledPattern> {
        usize::try_from(id.0)
            .ok()
            .and_then(|i| self.entries.get(i))
            .and_then(Option::as_ref)
            .ok_or(Error::InvalidPattern(id.0))
    }

    pub fn remove(&mut self, id: PatternId) -> Result<CompiledPattern> {
        usize::try_from(id.0)
            .ok()
            .and_then(|i| self.entries.get_mut(i))
            .and_then(Option::take)
            .ok_or(Error::InvalidPattern(id.0))
    }

    /// Number of live patterns.
    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total heap bytes used by live patterns.
    pub fn memory_usage(&self) -> usize {
        self.entries
            .iter()
            .flatten()
            .map(CompiledPattern::memory_usage)
            .sum()
    }
}
