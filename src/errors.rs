//! Error module. See the [failure](https://crates.io/crates/failure) crate for details.

use std::fmt;
use std::result;

use failure::{Backtrace, Context, Fail};

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    ctx: Context<ErrorKind>,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.ctx.get_context()
    }
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.ctx.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.ctx.backtrace()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.ctx.fmt(f)
    }
}

/// Everything the shell can report.
///
/// The first six variants render the fixed single-line diagnostics the shell
/// prints verbatim to stderr; the rest cover internal failures and display
/// with a `plush:` prefix so they cannot be mistaken for the fixed set.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidCommand,
    InvalidProgram,
    InvalidFile,
    InvalidDirectory,
    InvalidJob,
    SuspendedJobs,
    Io,
    Nix,
    Readline,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ErrorKind::InvalidCommand => write!(f, "Error: invalid command"),
            ErrorKind::InvalidProgram => write!(f, "Error: invalid program"),
            ErrorKind::InvalidFile => write!(f, "Error: invalid file"),
            ErrorKind::InvalidDirectory => write!(f, "Error: invalid directory"),
            ErrorKind::InvalidJob => write!(f, "Error: invalid job"),
            ErrorKind::SuspendedJobs => write!(f, "Error: there are suspended jobs"),
            ErrorKind::Io => write!(f, "plush: i/o error"),
            ErrorKind::Nix => write!(f, "plush: system call failed"),
            ErrorKind::Readline => write!(f, "plush: readline error"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error::from(Context::new(kind))
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(ctx: Context<ErrorKind>) -> Error {
        Error { ctx }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_render_verbatim() {
        assert_eq!(
            format!("{}", Error::from(ErrorKind::InvalidCommand)),
            "Error: invalid command"
        );
        assert_eq!(
            format!("{}", Error::from(ErrorKind::InvalidProgram)),
            "Error: invalid program"
        );
        assert_eq!(
            format!("{}", Error::from(ErrorKind::InvalidFile)),
            "Error: invalid file"
        );
        assert_eq!(
            format!("{}", Error::from(ErrorKind::InvalidDirectory)),
            "Error: invalid directory"
        );
        assert_eq!(
            format!("{}", Error::from(ErrorKind::InvalidJob)),
            "Error: invalid job"
        );
        assert_eq!(
            format!("{}", Error::from(ErrorKind::SuspendedJobs)),
            "Error: there are suspended jobs"
        );
    }

    #[test]
    fn internal_errors_do_not_collide_with_diagnostics() {
        for kind in &[ErrorKind::Io, ErrorKind::Nix, ErrorKind::Readline] {
            assert!(format!("{}", kind).starts_with("plush: "));
        }
    }
}
