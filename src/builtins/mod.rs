//! Plush builtins
//!
//! The builtins are intercepted before the execution engine ever sees the
//! pipeline, and only for a lone command without redirections; `jobs | cat`
//! is an invalid command, not a pipeline. Only the first stage's program
//! name is consulted, so a builtin name in a later stage is handed to the
//! execution engine like any other program.

use std::io::Write;

use self::dirs::Cd;
use self::exit::Exit;
use self::jobs::{Fg, Jobs};
use crate::errors::Result;
use crate::shell::Shell;

mod dirs;
mod exit;
mod jobs;

const CD_NAME: &str = "cd";
const EXIT_NAME: &str = "exit";
const FG_NAME: &str = "fg";
const JOBS_NAME: &str = "jobs";

/// Represents a plush builtin command such as cd or fg.
pub trait BuiltinCommand {
    /// The NAME of the command.
    #[allow(dead_code)]
    const NAME: &'static str;
    /// Runs the command with the given arguments in the `shell` environment.
    fn run(shell: &mut Shell, args: &[String], stdout: &mut dyn Write) -> Result<()>;
}

pub fn is_builtin(program: &str) -> bool {
    [CD_NAME, EXIT_NAME, FG_NAME, JOBS_NAME].contains(&program)
}

/// precondition: `program` is a builtin.
pub fn run(shell: &mut Shell, program: &str, args: &[String], stdout: &mut dyn Write) -> Result<()> {
    debug_assert!(is_builtin(program));

    match program {
        CD_NAME => Cd::run(shell, args, stdout),
        EXIT_NAME => Exit::run(shell, args, stdout),
        FG_NAME => Fg::run(shell, args, stdout),
        JOBS_NAME => Jobs::run(shell, args, stdout),
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_four_builtin_names_are_recognized() {
        for name in &["cd", "exit", "jobs", "fg"] {
            assert!(is_builtin(name));
        }
        for name in &["ls", "echo", "CD", "fg1", ""] {
            assert!(!is_builtin(name));
        }
    }
}
