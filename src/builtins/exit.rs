use std::io::Write;

use crate::builtins::{self, BuiltinCommand};
use crate::errors::{ErrorKind, Result};
use crate::shell::Shell;

pub struct Exit;

impl BuiltinCommand for Exit {
    const NAME: &'static str = builtins::EXIT_NAME;

    fn run(shell: &mut Shell, args: &[String], _stdout: &mut dyn Write) -> Result<()> {
        if !args.is_empty() {
            return Err(ErrorKind::InvalidCommand.into());
        }
        if shell.has_suspended_jobs() {
            return Err(ErrorKind::SuspendedJobs.into());
        }
        shell.exit(0)
    }
}
