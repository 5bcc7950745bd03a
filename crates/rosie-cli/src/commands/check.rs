//! Compile an expression without matching anything.

use std::io::{self, Write};

use rosie_core::Colors;

use super::CommandError;
use super::session::{Session, SessionArgs};

pub struct CheckArgs {
    pub session: SessionArgs,
    pub expression: String,
    pub color: bool,
}

pub fn run(args: CheckArgs) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    super::finish(execute(&args, &mut out));
}

/// Print the pattern type, or one line per violation.
/// Returns whether the expression compiled.
pub fn execute(args: &CheckArgs, out: &mut impl Write) -> Result<bool, CommandError> {
    let colors = Colors::new(args.color);
    let session = Session::open(&args.session)?;

    session.with_engine(|engine| {
        let compiled = engine.compile(&args.expression);
        let Some(id) = compiled.pattern else {
            for violation in &compiled.errors {
                writeln!(out, "{}error{}: {}", colors.red, colors.reset, violation)
                    .map_err(CommandError::stdout)?;
            }
            return Ok(false);
        };

        let type_name = engine.pattern(id)?.type_name().to_owned();
        engine.free_pattern(id)?;
        writeln!(
            out,
            "{}ok{}: {} {}(type {}){}",
            colors.green,
            colors.reset,
            args.expression.trim(),
            colors.dim,
            type_name,
            colors.reset
        )
        .map_err(CommandError::stdout)?;
        Ok(true)
    })
}
