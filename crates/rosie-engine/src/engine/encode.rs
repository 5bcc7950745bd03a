//! Output encoders for match results.

use std::fmt;
use std::str::FromStr;

use rosie_core::ColorMap;

use super::pattern::MatchNode;
use crate::{Error, Result};

/// How a successful match is turned into output bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Encoder {
    /// Compact JSON match tree.
    Json,
    /// Pretty-printed JSON match tree.
    JsonPretty,
    /// The entire input.
    Line,
    /// Only the matched bytes.
    Data,
    /// Matched bytes of each top-level sub-match, one per line.
    Subs,
    /// The input with sub-matches colored by type.
    Color,
    /// No output; only whether the pattern matched.
    Bool,
}

impl Encoder {
    pub const ALL: [Encoder; 7] = [
        Encoder::Json,
        Encoder::JsonPretty,
        Encoder::Line,
        Encoder::Data,
        Encoder::Subs,
        Encoder::Color,
        Encoder::Bool,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Encoder::Json => "json",
            Encoder::JsonPretty => "jsonpp",
            Encoder::Line => "line",
            Encoder::Data => "data",
            Encoder::Subs => "subs",
            Encoder::Color => "color",
            Encoder::Bool => "bool",
        }
    }

    /// Encode a match of `tree` against `input`.
    pub fn encode(self, input: &[u8], tree: &MatchNode, colors: &ColorMap) -> Result<Vec<u8>> {
        let out = match self {
            Encoder::Json => serde_json::to_vec(tree).map_err(json_error)?,
            Encoder::JsonPretty => serde_json::to_vec_pretty(tree).map_err(json_error)?,
            Encoder::Line => input.to_vec(),
            Encoder::Data => input[tree.range()].to_vec(),
            Encoder::Subs => {
                let parts: Vec<&[u8]> = tree.subs.iter().map(|sub| &input[sub.range()]).collect();
                parts.join(&b'\n')
            }
            Encoder::Color => colorize(input, tree, colors),
            Encoder::Bool => Vec::new(),
        };
        Ok(out)
    }
}

fn json_error(e: serde_json::Error) -> Error {
    Error::Internal(format!("json encoding failed: {e}"))
}

fn colorize(input: &[u8], tree: &MatchNode, colors: &ColorMap) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + 16);
    let mut cursor = 0;
    let mut paint = |node: &MatchNode, out: &mut Vec<u8>| {
        let range = node.range();
        if range.start < cursor {
            return;
        }
        out.extend_from_slice(&input[cursor..range.start]);
        colors.paint(&node.kind, &input[range.clone()], out);
        cursor = range.end;
    };

    if tree.subs.is_empty() {
        paint(tree, &mut out);
    } else {
        for sub in &tree.subs {
            paint(sub, &mut out);
        }
    }
    out.extend_from_slice(&input[cursor..]);
    out
}

impl FromStr for Encoder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Encoder::Json),
            "jsonpp" => Ok(Encoder::JsonPretty),
            "line" => Ok(Encoder::Line),
            "data" | "matches" => Ok(Encoder::Data),
            "subs" => Ok(Encoder::Subs),
            "color" => Ok(Encoder::Color),
            "bool" => Ok(Encoder::Bool),
            other => Err(Error::InvalidEncoder(other.to_owned())),
        }
    }
}

impl fmt::Display for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
