//! Command builders for the CLI.
//!
//! Session flags (`--home`, `--libpath`, rc file, color, verbosity) are
//! global. Commands that compile patterns also take `--load` and `--import`.

use clap::Command;

use super::args::*;

/// Add the package preloading args.
fn with_package_args(cmd: Command) -> Command {
    cmd.arg(load_arg()).arg(import_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("rosie")
        .about("Rosie Pattern Language: match text with named, composable patterns")
        .version(rosie_core::VERSION)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(home_arg())
        .arg(libpath_arg())
        .arg(rcfile_arg())
        .arg(norcfile_arg())
        .arg(color_arg())
        .arg(verbose_arg())
        .subcommand(match_command())
        .subcommand(trace_command())
        .subcommand(check_command())
        .subcommand(list_command())
        .subcommand(config_command())
}

/// Match each input line against an expression.
pub fn match_command() -> Command {
    let cmd = Command::new("match")
        .about("Match input against an RPL expression")
        .after_help(
            r#"EXAMPLES:
  rosie match '[0-9]+' data.txt               # json match trees
  rosie match --import num -o data num.int data.txt
  rosie match --import net -o subs net.ipv4 access.log
  rosie match --wholefile -o bool '.*' a.txt  # exit status only

EXIT STATUS:
  0 if any record matched, 1 if none matched, 2 on error"#,
        )
        .arg(expression_arg())
        .arg(files_arg())
        .arg(output_arg())
        .arg(wholefile_arg());

    with_package_args(cmd)
}

/// Trace matching of each input line.
pub fn trace_command() -> Command {
    let cmd = Command::new("trace")
        .about("Trace how an RPL expression matches input")
        .after_help(
            r#"EXAMPLES:
  rosie trace --import num num.int numbers.txt
  rosie trace --import num --style full '${num.int},${num.int}' input.txt"#,
        )
        .arg(expression_arg())
        .arg(file_arg())
        .arg(style_arg());

    with_package_args(cmd)
}

/// Compile an expression and report errors.
pub fn check_command() -> Command {
    let cmd = Command::new("check")
        .about("Compile an RPL expression and report errors")
        .arg(expression_arg());

    with_package_args(cmd)
}

/// List visible bindings.
pub fn list_command() -> Command {
    let cmd = Command::new("list")
        .about("List the bindings visible to expressions")
        .arg(filter_arg())
        .arg(json_arg());

    with_package_args(cmd)
}

/// Show configuration.
pub fn config_command() -> Command {
    Command::new("config")
        .about("Show the engine configuration")
        .arg(json_arg())
}
