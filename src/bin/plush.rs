use std::path::PathBuf;
use std::process;

use docopt::Docopt;
use log::{debug, error};
use serde_derive::Deserialize;

use plush::errors::{Error, Result};
use plush::{Shell, ShellConfig};

const LOG_FILE_NAME: &str = ".plush_log";

const USAGE: &str = "
plush.

Usage:
    plush [options]
    plush [options] -c <command>
    plush [options] <file>
    plush (-h | --help)
    plush --version

Options:
    -h --help       Show this screen.
    --version       Show version.
    -c              If the -c option is present, then commands are read from the first non-option
                        argument command_string.
    --log=<path>    File to write log to, defaults to ~/.plush_log
";

/// Docopts input arguments.
#[derive(Debug, Deserialize)]
struct Args {
    arg_command: Option<String>,
    arg_file: Option<String>,
    flag_version: bool,
    flag_c: bool,
    flag_log: Option<String>,
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    init_logger(&args.flag_log);
    debug!("{:?}", args);

    if args.flag_version {
        println!("plush version {}", env!("CARGO_PKG_VERSION"));
    } else if args.flag_c || args.arg_file.is_some() {
        execute_from_command_string_or_file(&args);
    } else {
        execute_from_stdin();
    }
}

/// Best effort: a shell without a log file is still a shell.
fn init_logger(path: &Option<String>) {
    let log_path = match path.clone().map(PathBuf::from).or_else(default_log_path) {
        Some(path) => path,
        None => return,
    };
    let log_file = match fern::log_file(&log_path) {
        Ok(file) => file,
        Err(_) => return,
    };

    let pid = process::id();
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                pid,
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .chain(log_file)
        .apply()
        .ok();
}

fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(LOG_FILE_NAME))
}

fn execute_from_command_string_or_file(args: &Args) -> ! {
    let mut shell =
        Shell::new(ShellConfig::noninteractive()).unwrap_or_else(|e| display_error_and_exit(&e));

    let result = if let Some(ref command) = args.arg_command {
        shell.execute_command_string(command)
    } else if let Some(ref file_path) = args.arg_file {
        shell.execute_commands_from_file(file_path)
    } else {
        unreachable!();
    };

    exit(result, &mut shell)
}

fn execute_from_stdin() -> ! {
    let mut shell =
        Shell::new(ShellConfig::interactive()).unwrap_or_else(|e| display_error_and_exit(&e));
    shell.execute_from_stdin();
    shell.exit(0)
}

fn display_error_and_exit(error: &Error) -> ! {
    error!("failed to create shell: {}", error);
    eprintln!("{}", error);
    process::exit(1);
}

fn exit(result: Result<()>, shell: &mut Shell) -> ! {
    if let Err(e) = result {
        eprintln!("{}", e);
        shell.exit(1);
    }
    shell.exit(0)
}
