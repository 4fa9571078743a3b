//! Plush - Shell Module
//!
//! The Shell owns the line editor and the table of suspended jobs, and runs
//! the read-parse-dispatch loop. One failed line prints one diagnostic;
//! nothing short of `exit` or end of input stops the shell.

use std::env;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process;

use atty::Stream;
use failure::ResultExt;
use log::{debug, info};

use crate::builtins;
use crate::editor::Editor;
use crate::errors::{ErrorKind, Result};
use crate::execute_command;
use crate::jobs::{self, JobTable};
use crate::parser;

/// Plush Shell
pub struct Shell {
    /// Responsible for reading lines.
    editor: Editor,
    job_table: JobTable,
    config: ShellConfig,
    /// Is `false` when input comes from a pipe or file; no prompt then.
    is_interactive: bool,
}

impl Shell {
    /// Constructs a new Shell to manage suspended jobs.
    pub fn new(config: ShellConfig) -> Result<Shell> {
        let shell = Shell {
            editor: Editor::new(),
            job_table: JobTable::default(),
            config,
            is_interactive: atty::is(Stream::Stdin),
        };

        if shell.config.enable_job_control {
            let result = jobs::initialize_job_control();
            log_if_err!(result, "failed to initialize job control");
        }

        info!("plush started up");
        Ok(shell)
    }

    pub fn is_interactive(&self) -> bool {
        self.is_interactive
    }

    /// Prompt with the basename of the working directory.
    /// Returns `None` when end of input is reached.
    fn prompt(&mut self) -> Result<Option<String>> {
        let prompt = if self.is_interactive {
            let cwd = env::current_dir().context(ErrorKind::Io)?;
            let base = cwd.file_name().map_or_else(
                || String::from("/"),
                |name| name.to_string_lossy().into_owned(),
            );
            format!("[plush {}]$ ", base)
        } else {
            String::new()
        };
        self.editor.readline(&prompt)
    }

    /// Parses and runs one input line.
    pub fn execute_command_string(&mut self, input: &str) -> Result<()> {
        let pipeline = match parser::parse(input)? {
            Some(pipeline) => pipeline,
            None => return Ok(()),
        };

        if builtins::is_builtin(pipeline.first().program()) {
            // A builtin combined with a pipe or a redirection is itself an
            // invalid command, not a pipeline.
            if !pipeline.is_simple() {
                return Err(ErrorKind::InvalidCommand.into());
            }
            let command = pipeline.first();
            return builtins::run(self, command.program(), &command.argv[1..], &mut io::stdout());
        }

        let job_created = execute_command::run_pipeline(&mut self.job_table, &pipeline)?;
        if job_created {
            debug!("suspended job recorded for: {}", pipeline.input);
        }
        Ok(())
    }

    /// Runs every line of `path` as if typed at the prompt.
    pub fn execute_commands_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut file = File::open(path).context(ErrorKind::Io)?;
        let mut buffer = String::new();
        file.read_to_string(&mut buffer).context(ErrorKind::Io)?;

        for line in buffer.lines() {
            self.execute_line(line);
        }
        Ok(())
    }

    /// Reads and executes lines until end of input.
    pub fn execute_from_stdin(&mut self) {
        loop {
            let input = match self.prompt() {
                Ok(Some(line)) => line,
                Ok(None) => break,
                e => {
                    log_if_err!(e, "prompt");
                    continue;
                }
            };
            self.execute_line(&input);
        }
    }

    /// One reported diagnostic per failed line; the shell itself carries on.
    fn execute_line(&mut self, input: &str) {
        if input.trim().is_empty() {
            return;
        }
        if let Err(e) = self.execute_command_string(input) {
            eprintln!("{}", e);
        }
    }

    /// Returns `true` if the shell has suspended jobs.
    pub fn has_suspended_jobs(&self) -> bool {
        self.job_table.has_jobs()
    }

    /// Writes the job listing, 1-indexed, in table order.
    pub fn list_jobs(&self, out: &mut dyn Write) -> Result<()> {
        self.job_table.write_listing(out)
    }

    /// Resumes the job at 1-based `display_index` and waits for it.
    pub fn resume_job_in_foreground(&mut self, display_index: usize) -> Result<()> {
        self.job_table.resume_to_foreground(display_index)
    }

    /// Exits the shell immediately.
    pub fn exit(&mut self, status: i32) -> ! {
        info!("plush shut down");
        process::exit(status);
    }
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Shell {{ interactive: {}, jobs: {:?} }}",
            self.is_interactive, self.job_table
        )
    }
}

/// Policy object to control a Shell's behavior
#[derive(Debug, Copy, Clone)]
pub struct ShellConfig {
    /// Determines if the interactive signals are ignored for the lifetime
    /// of the shell so suspended jobs can be tracked and resumed.
    enable_job_control: bool,
}

impl ShellConfig {
    /// Creates an interactive shell: job control enabled.
    pub fn interactive() -> ShellConfig {
        ShellConfig {
            enable_job_control: true,
        }
    }

    /// Creates a noninteractive shell, e.g. for `-c` strings and script
    /// files: no job control.
    pub fn noninteractive() -> ShellConfig {
        Default::default()
    }
}

impl Default for ShellConfig {
    fn default() -> ShellConfig {
        ShellConfig {
            enable_job_control: false,
        }
    }
}
