//! List bindings visible to expressions.

use std::io::{self, Write};

use rosie_core::Colors;
use rosie_engine::BindingInfo;

use super::CommandError;
use super::session::{Session, SessionArgs};

pub struct ListArgs {
    pub session: SessionArgs,
    pub filter: Option<String>,
    pub json: bool,
    pub color: bool,
}

pub fn run(args: ListArgs) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    super::finish(execute(&args, &mut out).map(|()| true));
}

pub fn execute(args: &ListArgs, out: &mut impl Write) -> Result<(), CommandError> {
    let session = Session::open(&args.session)?;
    let mut bindings = session.with_engine(|engine| Ok(engine.bindings()))?;
    if let Some(filter) = &args.filter {
        bindings.retain(|b| b.name.contains(filter.as_str()));
    }
    bindings.sort_by(|a, b| a.name.cmp(&b.name));

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &bindings)
            .map_err(|e| CommandError::stdout(e.into()))?;
        writeln!(out).map_err(CommandError::stdout)?;
        return Ok(());
    }

    print_table(&bindings, Colors::new(args.color), out).map_err(CommandError::stdout)
}

fn print_table(bindings: &[BindingInfo], colors: Colors, out: &mut impl Write) -> io::Result<()> {
    let width = bindings.iter().map(|b| b.name.len()).max().unwrap_or(0);
    for binding in bindings {
        let kind = if binding.alias { "alias" } else { "pattern" };
        writeln!(
            out,
            "{}{:<width$}{}  {}{:<7}{}  {}",
            colors.blue,
            binding.name,
            colors.reset,
            colors.dim,
            kind,
            colors.reset,
            binding.expression,
        )?;
    }
    writeln!(out)?;
    writeln!(out, "{} bindings", bindings.len())
}
