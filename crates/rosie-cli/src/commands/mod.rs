pub mod check;
pub mod config;
pub mod list;
pub mod match_cmd;
pub mod session;
pub mod trace;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod match_tests;
#[cfg(test)]
mod session_tests;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use rosie_engine::{Engine, PatternId, Violation};

/// Failure of a command. Reported on stderr with exit status 2.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Engine(#[from] rosie_engine::Error),

    #[error("invalid expression: {0}")]
    Compile(String),

    #[error("cannot load {path}: {details}")]
    Load { path: String, details: String },

    #[error("cannot import {package}: {details}")]
    Import { package: String, details: String },

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl CommandError {
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn stdout(source: io::Error) -> Self {
        Self::io("<stdout>", source)
    }
}

/// Exit according to a command outcome: 0 on success, 1 when nothing
/// matched (or the expression was rejected by `check`), 2 on error.
pub fn finish(outcome: Result<bool, CommandError>) {
    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    }
}

pub(crate) fn describe(errors: &[Violation]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn compile(engine: &mut Engine, expression: &str) -> Result<PatternId, CommandError> {
    let compiled = engine.compile(expression);
    compiled
        .pattern
        .ok_or_else(|| CommandError::Compile(describe(&compiled.errors)))
}

/// Open `path`, or standard input when `None`.
pub(crate) fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>, CommandError> {
    match path {
        Some(path) => {
            let file =
                File::open(path).map_err(|e| CommandError::io(path.display().to_string(), e))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

/// Call `f` with each line of `reader` (without its line terminator), or
/// once with the whole input when `wholefile` is set.
pub(crate) fn for_each_record(
    mut reader: impl BufRead,
    wholefile: bool,
    name: &str,
    mut f: impl FnMut(&[u8]) -> Result<(), CommandError>,
) -> Result<(), CommandError> {
    if wholefile {
        let mut all = Vec::new();
        reader
            .read_to_end(&mut all)
            .map_err(|e| CommandError::io(name, e))?;
        return f(&all);
    }

    let mut line = Vec::new();
    loop {
        line.clear();
        let n = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| CommandError::io(name, e))?;
        if n == 0 {
            return Ok(());
        }
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        f(&line)?;
    }
}
