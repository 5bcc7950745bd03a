//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! This module contains:
//! - `*Params` structs that mirror command `*Args` but are populated from clap
//! - `from_matches()` extractors, including the global session flags
//! - `Into<*Args>` impls to bridge dispatch → command handlers

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::check::CheckArgs;
use crate::commands::config::ConfigArgs;
use crate::commands::list::ListArgs;
use crate::commands::match_cmd::MatchArgs;
use crate::commands::session::SessionArgs;
use crate::commands::trace::TraceArgs;

/// Flags shared by every command.
pub struct SessionParams {
    pub home: Option<PathBuf>,
    pub libpath: Option<String>,
    pub rcfile: Option<PathBuf>,
    pub norcfile: bool,
    pub loads: Vec<PathBuf>,
    pub imports: Vec<String>,
}

impl SessionParams {
    fn from_matches(m: &ArgMatches) -> Self {
        Self {
            home: m.get_one::<PathBuf>("home").cloned(),
            libpath: m.get_one::<String>("libpath").cloned(),
            rcfile: m.get_one::<PathBuf>("rcfile").cloned(),
            norcfile: m.get_flag("norcfile"),
            loads: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Also extract `--load` and `--import`, for commands that define them.
    fn with_packages(m: &ArgMatches) -> Self {
        Self {
            loads: m
                .get_many::<PathBuf>("load")
                .map(|v| v.cloned().collect())
                .unwrap_or_default(),
            imports: m
                .get_many::<String>("import")
                .map(|v| v.cloned().collect())
                .unwrap_or_default(),
            ..Self::from_matches(m)
        }
    }
}

impl From<SessionParams> for SessionArgs {
    fn from(p: SessionParams) -> Self {
        Self {
            home: p.home,
            libpath: p.libpath,
            rcfile: p.rcfile,
            norcfile: p.norcfile,
            loads: p.loads,
            imports: p.imports,
        }
    }
}

pub struct MatchParams {
    pub session: SessionParams,
    pub expression: String,
    pub files: Vec<PathBuf>,
    pub output: String,
    pub wholefile: bool,
}

impl MatchParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            session: SessionParams::with_packages(m),
            expression: expression(m),
            files: m
                .get_many::<PathBuf>("files")
                .map(|v| v.cloned().collect())
                .unwrap_or_default(),
            output: m
                .get_one::<String>("output")
                .cloned()
                .unwrap_or_else(|| "json".to_owned()),
            wholefile: m.get_flag("wholefile"),
        }
    }
}

impl From<MatchParams> for MatchArgs {
    fn from(p: MatchParams) -> Self {
        Self {
            session: p.session.into(),
            expression: p.expression,
            files: p.files,
            output: p.output,
            wholefile: p.wholefile,
        }
    }
}

pub struct TraceParams {
    pub session: SessionParams,
    pub expression: String,
    pub file: Option<PathBuf>,
    pub style: String,
}

impl TraceParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            session: SessionParams::with_packages(m),
            expression: expression(m),
            file: m.get_one::<PathBuf>("file").cloned(),
            style: m
                .get_one::<String>("style")
                .cloned()
                .unwrap_or_else(|| "condensed".to_owned()),
        }
    }
}

impl From<TraceParams> for TraceArgs {
    fn from(p: TraceParams) -> Self {
        Self {
            session: p.session.into(),
            expression: p.expression,
            file: p.file,
            style: p.style,
        }
    }
}

pub struct CheckParams {
    pub session: SessionParams,
    pub expression: String,
    pub color: ColorChoice,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            session: SessionParams::with_packages(m),
            expression: expression(m),
            color: parse_color(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            session: p.session.into(),
            expression: p.expression,
            color: p.color.should_colorize(),
        }
    }
}

pub struct ListParams {
    pub session: SessionParams,
    pub filter: Option<String>,
    pub json: bool,
    pub color: ColorChoice,
}

impl ListParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            session: SessionParams::with_packages(m),
            filter: m.get_one::<String>("filter").cloned(),
            json: m.get_flag("json"),
            color: parse_color(m),
        }
    }
}

impl From<ListParams> for ListArgs {
    fn from(p: ListParams) -> Self {
        Self {
            session: p.session.into(),
            filter: p.filter,
            json: p.json,
            color: p.color.should_colorize(),
        }
    }
}

pub struct ConfigParams {
    pub session: SessionParams,
    pub json: bool,
    pub color: ColorChoice,
}

impl ConfigParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            session: SessionParams::from_matches(m),
            json: m.get_flag("json"),
            color: parse_color(m),
        }
    }
}

impl From<ConfigParams> for ConfigArgs {
    fn from(p: ConfigParams) -> Self {
        Self {
            session: p.session.into(),
            json: p.json,
            color: p.color.should_colorize(),
        }
    }
}

/// Verbosity from `-v` occurrences.
pub fn verbosity(m: &ArgMatches) -> u8 {
    m.get_count("verbose")
}

fn expression(m: &ArgMatches) -> String {
    m.get_one::<String>("expression").cloned().unwrap_or_default()
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
