//! rc files: `key = value` lines applied to a fresh engine.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{Error, Result};

/// File name of the default rc file in the user's home directory.
pub const RCFILE_NAME: &str = ".rosierc";

/// `~/.rosierc`, if the home directory is known.
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(RCFILE_NAME))
}

/// One `key = value` line. Serializes as a single-entry map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RcOption {
    pub key: String,
    pub value: String,
}

impl Serialize for RcOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.value)?;
        map.end()
    }
}

/// Contents of an rc file.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RcFile {
    pub exists: bool,
    /// `None` when the file exists but a line is malformed.
    pub options: Option<Vec<RcOption>>,
}

/// Read and parse the rc file at `path`. A missing file is not an error.
pub fn read(path: &Path) -> Result<RcFile> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(RcFile::default()),
        Err(e) => return Err(Error::io(path, e)),
    };
    Ok(RcFile {
        exists: true,
        options: parse(&text),
    })
}

/// Parse rc file text. Returns `None` if any line is malformed.
pub fn parse(text: &str) -> Option<Vec<RcOption>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("--"))
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<RcOption> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    let value = value.trim();
    let value = match value.strip_prefix('"') {
        Some(quoted) => quoted.strip_suffix('"')?,
        None => value,
    };
    Some(RcOption {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}
