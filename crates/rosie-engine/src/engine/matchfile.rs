//! Matching every line (or the whole) of a file.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use rosie_core::ColorMap;
use serde::Serialize;

use super::encode::Encoder;
use super::pattern::CompiledPattern;
use crate::{Error, Result};

/// Where `matchfile` reads and writes. `None` selects the standard stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchFileIo {
    pub infile: Option<PathBuf>,
    pub outfile: Option<PathBuf>,
    pub errfile: Option<PathBuf>,
    /// Match the whole input as one record instead of line by line.
    pub wholefile: bool,
}

/// Records read, matched (written to out) and unmatched (written to err).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MatchFileCounts {
    pub cin: usize,
    pub cout: usize,
    pub cerr: usize,
}

pub(crate) fn run(
    pattern: &CompiledPattern,
    encoder: Encoder,
    colors: &ColorMap,
    files: &MatchFileIo,
) -> Result<MatchFileCounts> {
    let reader = open_input(files.infile.as_deref())?;
    let mut out = Sink::open(files.outfile.as_deref(), Stream::Stdout)?;
    let mut err = Sink::open(files.errfile.as_deref(), Stream::Stderr)?;
    let in_name = display_name(files.infile.as_deref(), "<stdin>");

    let records: Box<dyn Iterator<Item = io::Result<Vec<u8>>>> = if files.wholefile {
        let mut reader = reader;
        let mut all = Vec::new();
        Box::new(std::iter::once(reader.read_to_end(&mut all).map(|_| all)))
    } else {
        Box::new(reader.split(b'\n').map(|line| {
            line.map(|mut l| {
                if l.last() == Some(&b'\r') {
                    l.pop();
                }
                l
            })
        }))
    };

    let mut counts = MatchFileCounts::default();
    for record in records {
        let record = record.map_err(|e| Error::io(&in_name, e))?;
        counts.cin += 1;

        let tree = pattern
            .captures(&record, 0)
            .and_then(|caps| pattern.tree(&record, &caps));
        match tree {
            Some(tree) => {
                let data = match encoder {
                    Encoder::Bool => record,
                    _ => encoder.encode(&record, &tree, colors)?,
                };
                out.write_line(&data)?;
                counts.cout += 1;
            }
            None => {
                err.write_line(&record)?;
                counts.cerr += 1;
            }
        }
    }

    out.flush()?;
    err.flush()?;
    Ok(counts)
}

fn display_name(path: Option<&Path>, stream: &str) -> PathBuf {
    path.map_or_else(|| PathBuf::from(stream), Path::to_path_buf)
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        None => Ok(Box::new(io::stdin().lock())),
        Some(path) => File::open(path)
            .map(|f| Box::new(BufReader::new(f)) as Box<dyn BufRead>)
            .map_err(|e| Error::io(path, e)),
    }
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

struct Sink {
    name: PathBuf,
    writer: Box<dyn Write>,
}

impl Sink {
    fn open(path: Option<&Path>, stream: Stream) -> Result<Self> {
        let writer: Box<dyn Write> = match (path, stream) {
            (Some(path), _) => {
                Box::new(BufWriter::new(File::create(path).map_err(|e| Error::io(path, e))?))
            }
            (None, Stream::Stdout) => Box::new(io::stdout().lock()),
            (None, Stream::Stderr) => Box::new(io::stderr().lock()),
        };
        let name = match stream {
            Stream::Stdout => display_name(path, "<stdout>"),
            Stream::Stderr => display_name(path, "<stderr>"),
        };
        Ok(Self { name, writer })
    }

    fn write_line(&mut self, data: &[u8]) -> Result<()> {
        self.writer
            .write_all(data)
            .and_then(|()| self.writer.write_all(b"\n"))
            .map_err(|e| Error::io(&self.name, e))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| Error::io(&self.name, e))
    }
}
