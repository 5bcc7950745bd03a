//! String-tagged request dispatch.
//!
//! [`Request::from_raw`] turns an operation name plus byte-string arguments
//! into a typed [`Request`]; [`Runtime::dispatch`] executes it. Integers
//! travel as decimal text and trailing optional arguments may be omitted.

use std::path::PathBuf;
use std::str::FromStr;

use rosie_core::VERSION;
use serde::Serialize;

use crate::config::{ConfigEntry, SetBy, join_libpath, split_libpath};
use crate::engine::{
    AllocLimit, Compiled, Encoder, Loaded, MatchFileCounts, MatchFileIo, MatchResult, PatternId,
    RcExecution, RcFile, TraceResult, TraceStyle,
};
use crate::registry::EngineId;
use crate::{Error, Result, Runtime};

/// One operation of the request table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    Version,
    NewEngine,
    Finalize {
        engine: String,
    },
    Config {
        engine: String,
    },
    Compile {
        engine: String,
        expression: String,
    },
    FreePattern {
        engine: String,
        pattern: i32,
    },
    Match {
        engine: String,
        pattern: i32,
        input: Vec<u8>,
        start: usize,
        encoder: Encoder,
    },
    Trace {
        engine: String,
        pattern: i32,
        input: Vec<u8>,
        start: usize,
        style: TraceStyle,
    },
    Load {
        engine: String,
        source: String,
    },
    LoadFile {
        engine: String,
        path: PathBuf,
    },
    Import {
        engine: String,
        package: String,
        as_name: Option<String>,
    },
    Libpath {
        engine: String,
        libpath: Option<String>,
    },
    AllocLimit {
        engine: String,
        limit: Option<usize>,
    },
    MatchFile {
        engine: String,
        pattern: i32,
        encoder: Encoder,
        files: MatchFileIo,
    },
    ReadRcfile {
        engine: String,
        path: Option<PathBuf>,
    },
    ExecuteRcfile {
        engine: String,
        path: Option<PathBuf>,
    },
}

impl Request {
    /// Operation names accepted by [`Request::from_raw`].
    pub const OPERATIONS: [&'static str; 16] = [
        "version",
        "new_engine",
        "finalize",
        "config",
        "compile",
        "free_pattern",
        "match",
        "trace",
        "load",
        "loadfile",
        "import",
        "libpath",
        "alloc_limit",
        "matchfile",
        "read_rcfile",
        "execute_rcfile",
    ];

    /// Parse an operation name and its arguments.
    pub fn from_raw(op: &str, args: &[&[u8]]) -> Result<Self> {
        let mut a = Args::new(op, args);
        let request = match op {
            "version" => Request::Version,
            "new_engine" => Request::NewEngine,
            "finalize" => Request::Finalize {
                engine: a.string("engine")?,
            },
            "config" => Request::Config {
                engine: a.string("engine")?,
            },
            "compile" => Request::Compile {
                engine: a.string("engine")?,
                expression: a.string("expression")?,
            },
            "free_pattern" => Request::FreePattern {
                engine: a.string("engine")?,
                pattern: a.parse("pattern")?,
            },
            "match" => Request::Match {
                engine: a.string("engine")?,
                pattern: a.parse("pattern")?,
                input: a.bytes("input")?.to_vec(),
                start: a.parse_or("start", 1)?,
                encoder: a.parse_or("encoder", Encoder::Json)?,
            },
            "trace" => Request::Trace {
                engine: a.string("engine")?,
                pattern: a.parse("pattern")?,
                input: a.bytes("input")?.to_vec(),
                start: a.parse_or("start", 1)?,
                style: a.parse_or("style", TraceStyle::default())?,
            },
            "load" => Request::Load {
                engine: a.string("engine")?,
                source: a.string("source")?,
            },
            "loadfile" => Request::LoadFile {
                engine: a.string("engine")?,
                path: a.string("path")?.into(),
            },
            "import" => Request::Import {
                engine: a.string("engine")?,
                package: a.string("package")?,
                as_name: a.optional("as")?.map(str::to_owned),
            },
            "libpath" => Request::Libpath {
                engine: a.string("engine")?,
                libpath: a.optional("libpath")?.map(str::to_owned),
            },
            "alloc_limit" => Request::AllocLimit {
                engine: a.string("engine")?,
                limit: a.parse_optional("limit")?,
            },
            "matchfile" => Request::MatchFile {
                engine: a.string("engine")?,
                pattern: a.parse("pattern")?,
                encoder: a.parse("encoder")?,
                files: MatchFileIo {
                    infile: a.path("infile")?,
                    outfile: a.path("outfile")?,
                    errfile: a.path("errfile")?,
                    wholefile: a.parse_or::<i32>("wholefile", 0)? != 0,
                },
            },
            "read_rcfile" => Request::ReadRcfile {
                engine: a.string("engine")?,
                path: a.optional("path")?.map(PathBuf::from),
            },
            "execute_rcfile" => Request::ExecuteRcfile {
                engine: a.string("engine")?,
                path: a.optional("path")?.map(PathBuf::from),
            },
            other => return Err(Error::UnknownOperation(other.to_owned())),
        };
        a.finish()?;
        Ok(request)
    }
}

/// Cursor over raw request arguments.
struct Args<'a> {
    op: &'a str,
    args: &'a [&'a [u8]],
    pos: usize,
}

impl<'a> Args<'a> {
    fn new(op: &'a str, args: &'a [&'a [u8]]) -> Self {
        Self { op, args, pos: 0 }
    }

    fn next(&mut self) -> Option<&'a [u8]> {
        let arg = self.args.get(self.pos).copied();
        self.pos += 1;
        arg
    }

    fn bytes(&mut self, name: &str) -> Result<&'a [u8]> {
        self.next().ok_or_else(|| {
            Error::InvalidArgument(format!("{}: missing argument '{name}'", self.op))
        })
    }

    fn text(&self, name: &str, bytes: &'a [u8]) -> Result<&'a str> {
        std::str::from_utf8(bytes).map_err(|_| {
            Error::InvalidArgument(format!("{}: argument '{name}' is not valid UTF-8", self.op))
        })
    }

    fn string(&mut self, name: &str) -> Result<String> {
        let bytes = self.bytes(name)?;
        self.text(name, bytes).map(str::to_owned)
    }

    fn optional(&mut self, name: &str) -> Result<Option<&'a str>> {
        self.next().map(|bytes| self.text(name, bytes)).transpose()
    }

    /// An optional path; empty text means "not given".
    fn path(&mut self, name: &str) -> Result<Option<PathBuf>> {
        let bytes = self.bytes(name)?;
        let text = self.text(name, bytes)?;
        Ok((!text.is_empty()).then(|| PathBuf::from(text)))
    }

    fn parse<T: FromArg>(&mut self, name: &str) -> Result<T> {
        let bytes = self.bytes(name)?;
        let text = self.text(name, bytes)?;
        T::from_arg(self.op, name, text)
    }

    fn parse_optional<T: FromArg>(&mut self, name: &str) -> Result<Option<T>> {
        match self.optional(name)? {
            Some(text) => T::from_arg(self.op, name, text).map(Some),
            None => Ok(None),
        }
    }

    fn parse_or<T: FromArg>(&mut self, name: &str, default: T) -> Result<T> {
        self.parse_optional(name).map(|v| v.unwrap_or(default))
    }

    fn finish(&self) -> Result<()> {
        if self.pos < self.args.len() {
            return Err(Error::InvalidArgument(format!(
                "{}: expected at most {} arguments, got {}",
                self.op,
                self.pos,
                self.args.len()
            )));
        }
        Ok(())
    }
}

/// Conversion from argument text. Encoders and trace styles keep their own
/// error statuses; everything else is an invalid argument.
trait FromArg: Sized {
    fn from_arg(op: &str, name: &str, text: &str) -> Result<Self>;
}

macro_rules! from_arg_numeric {
    ($($ty:ty),*) => {$(
        impl FromArg for $ty {
            fn from_arg(op: &str, name: &str, text: &str) -> Result<Self> {
                text.trim().parse().map_err(|_| {
                    Error::InvalidArgument(format!("{op}: argument '{name}' is not a number: {text}"))
                })
            }
        }
    )*};
}

from_arg_numeric!(i32, usize);

impl FromArg for Encoder {
    fn from_arg(_op: &str, _name: &str, text: &str) -> Result<Self> {
        Encoder::from_str(text)
    }
}

impl FromArg for TraceStyle {
    fn from_arg(_op: &str, _name: &str, text: &str) -> Result<Self> {
        TraceStyle::from_str(text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LibpathResponse {
    pub libpath: String,
}

/// Result of a dispatched [`Request`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Version(String),
    Engine(EngineId),
    Done,
    Config(Vec<ConfigEntry>),
    Compiled(Compiled),
    Matched(MatchResult),
    Traced(TraceResult),
    Loaded(Loaded),
    Libpath(LibpathResponse),
    AllocLimit(AllocLimit),
    MatchFile(MatchFileCounts),
    RcFile(RcFile),
    RcExecuted(RcExecution),
}

impl Response {
    /// Wire form: plain text for `version` and `new_engine`, nothing for
    /// `finalize` and `free_pattern`, JSON otherwise.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let json = match self {
            Response::Version(v) => return Ok(v.as_bytes().to_vec()),
            Response::Engine(id) => return Ok(id.as_str().as_bytes().to_vec()),
            Response::Done => return Ok(Vec::new()),
            Response::Config(entries) => serde_json::to_vec(entries),
            Response::Compiled(c) => serde_json::to_vec(c),
            Response::Matched(m) => serde_json::to_vec(m),
            Response::Traced(t) => serde_json::to_vec(t),
            Response::Loaded(l) => serde_json::to_vec(l),
            Response::Libpath(l) => serde_json::to_vec(l),
            Response::AllocLimit(a) => serde_json::to_vec(a),
            Response::MatchFile(c) => serde_json::to_vec(c),
            Response::RcFile(r) => serde_json::to_vec(r),
            Response::RcExecuted(r) => serde_json::to_vec(r),
        };
        json.map_err(|e| Error::Internal(format!("json encoding failed: {e}")))
    }
}

fn pattern_id(raw: i32) -> Result<PatternId> {
    PatternId::new(raw).ok_or(Error::InvalidPattern(raw))
}

impl Runtime {
    /// Execute one request.
    pub fn dispatch(&self, request: Request) -> Result<Response> {
        match request {
            Request::Version => Ok(Response::Version(VERSION.to_owned())),
            Request::NewEngine => self.new_engine().map(Response::Engine),
            Request::Finalize { engine } => self.finalize(&engine).map(|()| Response::Done),
            Request::Config { engine } => {
                self.with_engine(&engine, |e| Ok(Response::Config(e.config())))
            }
            Request::Compile { engine, expression } => self.with_engine(&engine, |e| {
                Ok(Response::Compiled(e.compile(&expression)))
            }),
            Request::FreePattern { engine, pattern } => self.with_engine(&engine, |e| {
                e.free_pattern(pattern_id(pattern)?).map(|()| Response::Done)
            }),
            Request::Match {
                engine,
                pattern,
                input,
                start,
                encoder,
            } => self.with_engine(&engine, |e| {
                e.match_input(pattern_id(pattern)?, &input, start, encoder)
                    .map(Response::Matched)
            }),
            Request::Trace {
                engine,
                pattern,
                input,
                start,
                style,
            } => self.with_engine(&engine, |e| {
                e.trace(pattern_id(pattern)?, &input, start, style)
                    .map(Response::Traced)
            }),
            Request::Load { engine, source } => {
                self.with_engine(&engine, |e| Ok(Response::Loaded(e.load(&source))))
            }
            Request::LoadFile { engine, path } => {
                self.with_engine(&engine, |e| e.loadfile(&path).map(Response::Loaded))
            }
            Request::Import {
                engine,
                package,
                as_name,
            } => self.with_engine(&engine, |e| {
                Ok(Response::Loaded(e.import(&package, as_name.as_deref())))
            }),
            Request::Libpath { engine, libpath } => self.with_engine(&engine, |e| {
                if let Some(libpath) = libpath {
                    e.set_libpath(split_libpath(&libpath), SetBy::Api);
                }
                Ok(Response::Libpath(LibpathResponse {
                    libpath: join_libpath(e.libpath()),
                }))
            }),
            Request::AllocLimit { engine, limit } => {
                self.with_engine(&engine, |e| e.alloc_limit(limit).map(Response::AllocLimit))
            }
            Request::MatchFile {
                engine,
                pattern,
                encoder,
                files,
            } => self.with_engine(&engine, |e| {
                e.matchfile(pattern_id(pattern)?, encoder, &files)
                    .map(Response::MatchFile)
            }),
            Request::ReadRcfile { engine, path } => self.with_engine(&engine, |e| {
                e.read_rcfile(path.as_deref()).map(Response::RcFile)
            }),
            Request::ExecuteRcfile { engine, path } => self.with_engine(&engine, |e| {
                e.execute_rcfile(path.as_deref()).map(Response::RcExecuted)
            }),
        }
    }

    /// Parse and execute a string-tagged request, returning its wire bytes.
    pub fn dispatch_raw(&self, op: &str, args: &[&[u8]]) -> Result<Vec<u8>> {
        let request = Request::from_raw(op, args)?;
        self.dispatch(request)?.to_bytes()
    }
}
