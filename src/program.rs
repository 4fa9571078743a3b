//! Program path resolution.

use std::path::{Path, PathBuf};

use nix::unistd::{access, AccessFlags};

use crate::errors::{Error, ErrorKind, Result};

/// The single directory searched for bare program names.
const SYSTEM_BIN_DIR: &str = "/usr/bin";

/// Resolves `name` to an executable path.
///
/// A name containing a `/` anywhere is taken literally; everything else is
/// looked up in the system binary directory. The verdict here is advisory:
/// the `execv` attempt in the child is authoritative, so a hit can still
/// fail at exec time.
pub fn locate(name: &str) -> Result<PathBuf> {
    let path = if name.contains('/') {
        PathBuf::from(name)
    } else {
        Path::new(SYSTEM_BIN_DIR).join(name)
    };

    access(path.as_path(), AccessFlags::X_OK)
        .map(|_| path)
        .map_err(|_| Error::from(ErrorKind::InvalidProgram))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_names_resolve_in_the_system_bin_dir() {
        let path = locate("ls").unwrap();
        assert_eq!(path, Path::new("/usr/bin/ls"));
    }

    #[test]
    fn names_with_a_slash_are_taken_literally() {
        let path = locate("/bin/sh").unwrap();
        assert_eq!(path, Path::new("/bin/sh"));
    }

    #[test]
    fn missing_bare_name_is_an_invalid_program() {
        let err = locate("plush-no-such-program").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidProgram);
    }

    #[test]
    fn missing_relative_path_is_an_invalid_program() {
        let err = locate("./no/such/binary").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidProgram);
    }
}
