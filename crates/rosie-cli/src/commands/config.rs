//! Show the engine configuration.

use std::io::{self, Write};

use rosie_core::Colors;
use rosie_engine::ConfigEntry;

use super::CommandError;
use super::session::{Session, SessionArgs};

pub struct ConfigArgs {
    pub session: SessionArgs,
    pub json: bool,
    pub color: bool,
}

pub fn run(args: ConfigArgs) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    super::finish(execute(&args, &mut out).map(|()| true));
}

pub fn execute(args: &ConfigArgs, out: &mut impl Write) -> Result<(), CommandError> {
    let session = Session::open(&args.session)?;
    let entries = session.with_engine(|engine| Ok(engine.config()))?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &entries)
            .map_err(|e| CommandError::stdout(e.into()))?;
        writeln!(out).map_err(CommandError::stdout)?;
        return Ok(());
    }

    print_table(&entries, Colors::new(args.color), out).map_err(CommandError::stdout)
}

fn print_table(entries: &[ConfigEntry], colors: Colors, out: &mut impl Write) -> io::Result<()> {
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    for entry in entries {
        writeln!(
            out,
            "{}{:<width$}{} = {}",
            colors.blue, entry.name, colors.reset, entry.value
        )?;
        writeln!(
            out,
            "{:width$}   {}{} (set by {}){}",
            "",
            colors.dim,
            entry.description,
            entry.set_by.name(),
            colors.reset
        )?;
    }
    Ok(())
}
