mod cli;
mod commands;
mod logging;


use cli::{CheckParams, ConfigParams, ListParams, MatchParams, TraceParams, build_cli, verbosity};

fn main() {
    let matches = build_cli().get_matches();

    if let Some((_, m)) = matches.subcommand() {
        logging::init(verbosity(m));
    }

    match matches.subcommand() {
        Some(("match", m)) => {
            let params = MatchParams::from_matches(m);
            commands::match_cmd::run(params.into());
        }
        Some(("trace", m)) => {
            let params = TraceParams::from_matches(m);
            commands::trace::run(params.into());
        }
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into());
        }
        Some(("list", m)) => {
            let params = ListParams::from_matches(m);
            commands::list::run(params.into());
        }
        Some(("config", m)) => {
            let params = ConfigParams::from_matches(m);
            commands::config::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
