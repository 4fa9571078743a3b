//! Suspended-job bookkeeping and job-control signal setup.

use std::io::Write;

use failure::ResultExt;
use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::errors::{ErrorKind, Result};

/// Most suspended jobs the table will track; pushes beyond this are dropped.
pub const MAX_JOBS: usize = 100;

/// Ignore the interactive signals for the lifetime of the shell so they
/// reach foreground children instead of the shell itself. Every spawned
/// child restores the default dispositions before exec.
pub fn initialize_job_control() -> Result<()> {
    unsafe {
        signal::signal(Signal::SIGINT, SigHandler::SigIgn).context(ErrorKind::Nix)?;
        signal::signal(Signal::SIGQUIT, SigHandler::SigIgn).context(ErrorKind::Nix)?;
        signal::signal(Signal::SIGTSTP, SigHandler::SigIgn).context(ErrorKind::Nix)?;
    }
    Ok(())
}

/// A suspended command: its process and the line that started it.
///
/// Only single-stage pipelines become jobs, so one pid is all there is to
/// remember.
#[derive(Debug)]
pub struct Job {
    pid: Pid,
    input: String,
}

impl Job {
    fn new(pid: Pid, input: &str) -> Job {
        Job {
            pid,
            input: input.to_string(),
        }
    }
}

/// Append-ordered table of suspended jobs, displayed 1-indexed.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    pub fn has_jobs(&self) -> bool {
        !self.jobs.is_empty()
    }

    /// Records a freshly suspended command. A full table drops the job on
    /// the floor: the process stays stopped but can no longer be resumed.
    pub fn push(&mut self, pid: Pid, input: &str) {
        if self.jobs.len() >= MAX_JOBS {
            warn!("job table full, dropping job for pid {}", pid);
            return;
        }
        debug!("recording suspended job {}: {}", pid, input);
        self.jobs.push(Job::new(pid, input));
    }

    /// Writes one `[index] line` entry per job, in table order.
    pub fn write_listing(&self, out: &mut dyn Write) -> Result<()> {
        for (index, job) in self.jobs.iter().enumerate() {
            writeln!(out, "[{}] {}", index + 1, job.input).context(ErrorKind::Io)?;
        }
        Ok(())
    }

    /// Resumes the job at 1-based `display_index` and waits for it in the
    /// foreground. A job that stops again moves to the back of the table; a
    /// job that terminates is removed.
    pub fn resume_to_foreground(&mut self, display_index: usize) -> Result<()> {
        let position = display_index
            .checked_sub(1)
            .filter(|&position| position < self.jobs.len())
            .ok_or(ErrorKind::InvalidJob)?;
        let pid = self.jobs[position].pid;

        debug!("resuming job [{}] ({})", display_index, pid);
        signal::kill(pid, Signal::SIGCONT).context(ErrorKind::Nix)?;

        loop {
            match wait::waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
                Ok(WaitStatus::Stopped(..)) => {
                    self.move_to_back(position);
                    break;
                }
                Ok(WaitStatus::Exited(..)) | Ok(WaitStatus::Signaled(..)) => {
                    self.jobs.remove(position);
                    break;
                }
                Ok(_) => continue,
                Err(Errno::EINTR) => continue,
                Err(e) => {
                    warn!("waitpid for resumed job {} failed: {}", pid, e);
                    break;
                }
            }
        }
        Ok(())
    }

    fn move_to_back(&mut self, position: usize) {
        let job = self.jobs.remove(position);
        self.jobs.push(job);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(inputs: &[&str]) -> JobTable {
        let mut table = JobTable::default();
        for (index, input) in inputs.iter().enumerate() {
            table.push(Pid::from_raw(index as i32 + 1000), input);
        }
        table
    }

    fn listing(table: &JobTable) -> String {
        let mut out = Vec::new();
        table.write_listing(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn listing_is_one_indexed_in_insertion_order() {
        let table = table_with(&["sleep 100", "vim notes", "cat"]);
        assert_eq!(listing(&table), "[1] sleep 100\n[2] vim notes\n[3] cat\n");
    }

    #[test]
    fn empty_table_lists_nothing() {
        assert_eq!(listing(&JobTable::default()), "");
        assert!(!JobTable::default().has_jobs());
    }

    #[test]
    fn pushes_beyond_capacity_are_dropped() {
        let mut table = JobTable::default();
        for index in 0..MAX_JOBS + 5 {
            table.push(Pid::from_raw(index as i32 + 1), "sleep 1");
        }
        assert_eq!(listing(&table).lines().count(), MAX_JOBS);
    }

    #[test]
    fn resuspension_moves_a_job_to_the_back() {
        let mut table = table_with(&["a", "b", "c"]);
        table.move_to_back(1);
        assert_eq!(listing(&table), "[1] a\n[2] c\n[3] b\n");
    }

    #[test]
    fn out_of_range_indexes_are_invalid_jobs() {
        let mut table = table_with(&["a"]);
        for index in &[0usize, 2, 100] {
            let err = table.resume_to_foreground(*index).unwrap_err();
            assert_eq!(*err.kind(), ErrorKind::InvalidJob);
        }
        // The failed resumes must not have touched the table.
        assert_eq!(listing(&table), "[1] a\n");
    }

    #[test]
    fn resume_on_an_empty_table_is_an_invalid_job() {
        let mut table = JobTable::default();
        let err = table.resume_to_foreground(1).unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidJob);
    }
}
