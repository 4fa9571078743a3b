use std::io::Write;
use std::path::Path;

use nix::unistd;

use crate::builtins::{self, BuiltinCommand};
use crate::errors::{Error, ErrorKind, Result};
use crate::shell::Shell;

pub struct Cd;

impl BuiltinCommand for Cd {
    const NAME: &'static str = builtins::CD_NAME;

    fn run(_shell: &mut Shell, args: &[String], _stdout: &mut dyn Write) -> Result<()> {
        if args.len() != 1 {
            return Err(ErrorKind::InvalidCommand.into());
        }
        unistd::chdir(Path::new(&args[0])).map_err(|_| Error::from(ErrorKind::InvalidDirectory))?;
        Ok(())
    }
}
