//! Pipeline execution.
//!
//! Forks one process per stage, wires the stages together with pipes and
//! redirection files, execs the resolved programs, and waits for the whole
//! pipeline to finish or stop.

use std::ffi::{CString, NulError};
use std::fs::File;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::{AsRawFd, FromRawFd, RawFd};
use std::path::Path;

use failure::ResultExt;
use log::{debug, warn};
use nix::errno::Errno;
use nix::fcntl::{self, OFlag};
use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::{self, AccessFlags, ForkResult, Pid};

use crate::errors::{ErrorKind, Result};
use crate::jobs::JobTable;
use crate::parser::{Command, OutputMode, Pipeline};
use crate::program;

/// Exit status of a child that could not resolve or exec its program.
const PROGRAM_FAILURE_EXIT_STATUS: i32 = 127;

/// Mode bits for files created by output redirection, before the umask.
const REDIRECT_CREATE_MODE: libc::mode_t = 0o666;

/// Runs `pipeline` to completion or suspension.
///
/// Returns `true` when the pipeline consisted of a single command and that
/// command stopped rather than terminated, in which case it has been
/// recorded in `job_table`. Multi-stage pipelines are never recorded as
/// jobs, even when one of their stages stops.
pub fn run_pipeline(job_table: &mut JobTable, pipeline: &Pipeline) -> Result<bool> {
    if let Some(ref filename) = pipeline.first().infile {
        if unistd::access(Path::new(filename), AccessFlags::R_OK).is_err() {
            return Err(ErrorKind::InvalidFile.into());
        }
    }

    let stage_count = pipeline.stage_count();
    let pipes = create_pipes(stage_count - 1)?;

    let mut pids = Vec::with_capacity(stage_count);
    for (index, command) in pipeline.commands.iter().enumerate() {
        pids.push(spawn_stage(command, index, stage_count, &pipes)?);
    }
    debug!("spawned pipeline of {} stage(s): {:?}", stage_count, pids);

    // The children hold their own copies; keeping these open would leave
    // every reader waiting for an EOF that never comes.
    drop(pipes);

    let stopped = wait_for_pipeline(stage_count);

    if stage_count == 1 {
        if let Some(pid) = stopped {
            job_table.push(pid, &pipeline.input);
            return Ok(true);
        }
    }
    Ok(false)
}

/// Wraps `unistd::pipe()` to return RAII structs instead of raw, owning
/// file descriptors. Each pair is (read end, write end).
fn create_pipes(count: usize) -> Result<Vec<(File, File)>> {
    let mut pipes = Vec::with_capacity(count);
    for _ in 0..count {
        // Move the RawFds into File immediately; an error on a later
        // iteration must not leak the descriptors already created.
        let (read_end, write_end) = unistd::pipe().context(ErrorKind::Nix)?;
        unsafe { pipes.push((File::from_raw_fd(read_end), File::from_raw_fd(write_end))) };
    }
    Ok(pipes)
}

fn spawn_stage(
    command: &Command,
    index: usize,
    stage_count: usize,
    pipes: &[(File, File)],
) -> Result<Pid> {
    // The controller is single threaded, so no other thread can hold a lock
    // across this fork.
    match unsafe { unistd::fork() }.context(ErrorKind::Nix)? {
        ForkResult::Parent { child } => Ok(child),
        ForkResult::Child => exec_stage(command, index, stage_count, pipes),
    }
}

/// Child-side setup between `fork` and `execv`. Never returns.
fn exec_stage(command: &Command, index: usize, stage_count: usize, pipes: &[(File, File)]) -> ! {
    restore_default_signals();

    if index == 0 {
        if let Some(ref filename) = command.infile {
            match fcntl::open(Path::new(filename), OFlag::O_RDONLY, Mode::empty()) {
                Ok(fd) => redirect_fd(fd, libc::STDIN_FILENO),
                Err(_) => {
                    // Readability was checked before spawning; losing the
                    // race is still a bad input file.
                    eprintln!("{}", ErrorKind::InvalidFile);
                    child_exit(1);
                }
            }
        }
    } else {
        let read_end = &pipes[index - 1].0;
        let _ = unistd::dup2(read_end.as_raw_fd(), libc::STDIN_FILENO);
    }

    if index == stage_count - 1 {
        if let Some(ref redirect) = command.outfile {
            let mut oflag = OFlag::O_WRONLY | OFlag::O_CREAT;
            oflag |= match redirect.mode {
                OutputMode::Truncate => OFlag::O_TRUNC,
                OutputMode::Append => OFlag::O_APPEND,
            };
            let mode = Mode::from_bits_truncate(REDIRECT_CREATE_MODE);
            match fcntl::open(Path::new(&redirect.filename), oflag, mode) {
                Ok(fd) => redirect_fd(fd, libc::STDOUT_FILENO),
                Err(_) => child_exit(1),
            }
        }
    } else {
        let write_end = &pipes[index].1;
        let _ = unistd::dup2(write_end.as_raw_fd(), libc::STDOUT_FILENO);
    }

    // No pipe descriptor may survive the exec boundary.
    for (read_end, write_end) in pipes {
        let _ = unistd::close(read_end.as_raw_fd());
        let _ = unistd::close(write_end.as_raw_fd());
    }

    let path = match program::locate(command.program()) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{}", e);
            child_exit(PROGRAM_FAILURE_EXIT_STATUS);
        }
    };

    if let Ok((path, argv)) = build_argv(&path, &command.argv) {
        let _ = unistd::execv(&path, &argv);
    }
    eprintln!("{}", ErrorKind::InvalidProgram);
    child_exit(PROGRAM_FAILURE_EXIT_STATUS)
}

/// Undo the shell's SIG_IGN dispositions so the command behaves like a
/// normal program with respect to the interactive signals.
fn restore_default_signals() {
    unsafe {
        let _ = signal::signal(Signal::SIGINT, SigHandler::SigDfl);
        let _ = signal::signal(Signal::SIGQUIT, SigHandler::SigDfl);
        let _ = signal::signal(Signal::SIGTSTP, SigHandler::SigDfl);
    }
}

fn redirect_fd(fd: RawFd, target: RawFd) {
    let _ = unistd::dup2(fd, target);
    let _ = unistd::close(fd);
}

/// `_exit(2)`: the child shares the shell's stdio buffers after `fork`, and
/// a plain `exit` would flush them a second time.
fn child_exit(status: i32) -> ! {
    unsafe { libc::_exit(status) }
}

fn build_argv(
    path: &Path,
    argv: &[String],
) -> std::result::Result<(CString, Vec<CString>), NulError> {
    let path = CString::new(path.as_os_str().as_bytes())?;
    let argv = argv
        .iter()
        .map(|arg| CString::new(arg.as_bytes()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((path, argv))
}

/// Waits until every spawned stage has exited, been killed, or stopped.
/// Returns the most recently observed stopped pid, if any.
fn wait_for_pipeline(stage_count: usize) -> Option<Pid> {
    let mut remaining = stage_count;
    let mut stopped = None;
    while remaining > 0 {
        match wait::waitpid(None, Some(WaitPidFlag::WUNTRACED)) {
            Ok(WaitStatus::Stopped(pid, _)) => {
                stopped = Some(pid);
                remaining -= 1;
            }
            Ok(WaitStatus::Exited(..)) | Ok(WaitStatus::Signaled(..)) => remaining -= 1,
            Ok(_) => {}
            Err(Errno::EINTR) => continue,
            Err(e) => {
                // Outstanding children leak as zombies here; without a pid
                // to wait for there is nothing sensible left to do.
                warn!("waitpid failed while collecting pipeline: {}", e);
                break;
            }
        }
    }
    stopped
}
