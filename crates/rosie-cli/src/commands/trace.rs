//! Trace matching for debugging expressions.

use std::io::{self, Write};
use std::path::PathBuf;

use rosie_engine::TraceStyle;

use super::session::{Session, SessionArgs};
use super::{CommandError, compile, for_each_record, open_input};

pub struct TraceArgs {
    pub session: SessionArgs,
    pub expression: String,
    pub file: Option<PathBuf>,
    pub style: String,
}

pub fn run(args: TraceArgs) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    super::finish(execute(&args, &mut out));
}

/// Trace every line of the input. Returns whether any line matched.
pub fn execute(args: &TraceArgs, out: &mut impl Write) -> Result<bool, CommandError> {
    let style: TraceStyle = args.style.parse()?;
    let session = Session::open(&args.session)?;

    session.with_engine(|engine| {
        let pattern = compile(engine, &args.expression)?;
        let name = args
            .file
            .as_ref()
            .map_or_else(|| "<stdin>".to_owned(), |p| p.display().to_string());
        let reader = open_input(args.file.as_deref())?;

        let mut matched = false;
        for_each_record(reader, false, &name, |record| {
            let result = engine.trace(pattern, record, 1, style)?;
            matched |= result.matched;
            out.write_all(result.trace.as_bytes())
                .map_err(CommandError::stdout)?;
            if !result.trace.ends_with('\n') {
                out.write_all(b"\n").map_err(CommandError::stdout)?;
            }
            Ok(())
        })?;
        out.flush().map_err(CommandError::stdout)?;
        Ok(matched)
    })
}
