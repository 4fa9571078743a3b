use std::io::Write;

use crate::builtins::{self, BuiltinCommand};
use crate::errors::{Error, ErrorKind, Result};
use crate::shell::Shell;

pub struct Jobs;

impl BuiltinCommand for Jobs {
    const NAME: &'static str = builtins::JOBS_NAME;

    fn run(shell: &mut Shell, args: &[String], stdout: &mut dyn Write) -> Result<()> {
        if !args.is_empty() {
            return Err(ErrorKind::InvalidCommand.into());
        }
        shell.list_jobs(stdout)
    }
}

pub struct Fg;

impl BuiltinCommand for Fg {
    const NAME: &'static str = builtins::FG_NAME;

    fn run(shell: &mut Shell, args: &[String], _stdout: &mut dyn Write) -> Result<()> {
        let index = match args {
            [index] if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) => index,
            _ => return Err(ErrorKind::InvalidCommand.into()),
        };
        // Digits-only but unrepresentable cannot name a live table slot.
        let index = index
            .parse::<usize>()
            .map_err(|_| Error::from(ErrorKind::InvalidJob))?;
        shell.resume_job_in_foreground(index)
    }
}
