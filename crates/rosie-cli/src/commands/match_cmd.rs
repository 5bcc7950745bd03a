//! Match input records against an expression.

use std::io::{self, Write};
use std::path::PathBuf;

use rosie_engine::Encoder;

use super::session::{Session, SessionArgs};
use super::{CommandError, compile, for_each_record, open_input};

pub struct MatchArgs {
    pub session: SessionArgs,
    pub expression: String,
    pub files: Vec<PathBuf>,
    pub output: String,
    pub wholefile: bool,
}

pub fn run(args: MatchArgs) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    super::finish(execute(&args, &mut out));
}

/// Write the encoded output of every matching record to `out`.
/// Returns whether any record matched.
pub fn execute(args: &MatchArgs, out: &mut impl Write) -> Result<bool, CommandError> {
    let encoder: Encoder = args.output.parse()?;
    let session = Session::open(&args.session)?;

    session.with_engine(|engine| {
        let pattern = compile(engine, &args.expression)?;
        let inputs: Vec<Option<&PathBuf>> = if args.files.is_empty() {
            vec![None]
        } else {
            args.files.iter().map(Some).collect()
        };

        let mut matched = false;
        for input in inputs {
            let name = input.map_or_else(|| "<stdin>".to_owned(), |p| p.display().to_string());
            let reader = open_input(input.map(PathBuf::as_path))?;
            for_each_record(reader, args.wholefile, &name, |record| {
                let result = engine.match_input(pattern, record, 1, encoder)?;
                if !result.matched {
                    return Ok(());
                }
                matched = true;
                if encoder != Encoder::Bool {
                    out.write_all(&result.data).map_err(CommandError::stdout)?;
                    out.write_all(b"\n").map_err(CommandError::stdout)?;
                }
                Ok(())
            })?;
        }
        out.flush().map_err(CommandError::stdout)?;
        Ok(matched)
    })
}
