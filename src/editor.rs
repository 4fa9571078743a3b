use failure::Fail;
use rustyline::error::ReadlineError;

use crate::errors::{ErrorKind, Result};

/// Thin wrapper around rustyline. Line editing only; plush keeps no
/// persistent command history.
pub struct Editor {
    internal: rustyline::Editor<()>,
}

impl Editor {
    pub fn new() -> Editor {
        Editor {
            internal: rustyline::Editor::new(),
        }
    }

    /// Returns `None` at end of input. A ctrl-c interrupt yields an empty
    /// line so the caller simply prompts again.
    pub fn readline(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.internal.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(e) => Err(e.context(ErrorKind::Readline).into()),
        }
    }
}
