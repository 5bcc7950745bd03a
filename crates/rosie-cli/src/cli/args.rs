//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands.
//! Session flags are global so they are accepted before or after the
//! subcommand name.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Rosie home directory (--home).
pub fn home_arg() -> Arg {
    Arg::new("home")
        .long("home")
        .value_name("DIR")
        .value_parser(value_parser!(PathBuf))
        .global(true)
        .help("Rosie home directory (default: $ROSIE_HOME, else the current directory)")
}

/// Package search path (--libpath).
pub fn libpath_arg() -> Arg {
    Arg::new("libpath")
        .long("libpath")
        .value_name("PATH")
        .global(true)
        .help("Colon-separated directories searched for packages")
}

/// Rc file to execute (--rcfile).
pub fn rcfile_arg() -> Arg {
    Arg::new("rcfile")
        .long("rcfile")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .global(true)
        .conflicts_with("norcfile")
        .help("Initialization file (default: ~/.rosierc)")
}

/// Skip the rc file (--norcfile).
pub fn norcfile_arg() -> Arg {
    Arg::new("norcfile")
        .long("norcfile")
        .action(ArgAction::SetTrue)
        .global(true)
        .help("Do not read an initialization file")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .global(true)
        .help("Colorize output")
}

/// Log verbosity (-v, -vv, -vvv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .global(true)
        .help("Verbosity level (-v for info, -vv for debug, -vvv for trace)")
}

/// Package file to load first (--load, repeatable).
pub fn load_arg() -> Arg {
    Arg::new("load")
        .long("load")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .action(ArgAction::Append)
        .help("Load an RPL file before running (repeatable)")
}

/// Package to import first (--import, repeatable).
pub fn import_arg() -> Arg {
    Arg::new("import")
        .long("import")
        .value_name("PKG")
        .action(ArgAction::Append)
        .help("Import a package before running (repeatable)")
}

/// Pattern expression (positional).
pub fn expression_arg() -> Arg {
    Arg::new("expression")
        .value_name("EXPR")
        .required(true)
        .help("RPL expression to compile")
}

/// Input files for `match` (positional, any number).
pub fn files_arg() -> Arg {
    Arg::new("files")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .num_args(0..)
        .help("Input files (default: standard input)")
}

/// Input file for `trace` (positional).
pub fn file_arg() -> Arg {
    Arg::new("file")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Input file (default: standard input)")
}

/// Output encoder (-o/--output).
pub fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("ENCODER")
        .default_value("json")
        .value_parser(["json", "jsonpp", "line", "data", "matches", "subs", "color", "bool"])
        .help("Output encoder")
}

/// Match whole files instead of lines (--wholefile).
pub fn wholefile_arg() -> Arg {
    Arg::new("wholefile")
        .long("wholefile")
        .action(ArgAction::SetTrue)
        .help("Match each file as a single record")
}

/// Trace detail (--style).
pub fn style_arg() -> Arg {
    Arg::new("style")
        .long("style")
        .value_name("STYLE")
        .default_value("condensed")
        .value_parser(["condensed", "full", "json"])
        .help("Trace style")
}

/// Substring filter for `list` (positional).
pub fn filter_arg() -> Arg {
    Arg::new("filter")
        .value_name("FILTER")
        .help("Only list bindings whose name contains FILTER")
}

/// Machine-readable output (--json).
pub fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}
