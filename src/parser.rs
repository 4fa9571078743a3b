//! Plush Parser
//!
//! Turns one raw input line into a [`Pipeline`]: an owned sequence of
//! commands connected by `|`, with redirection grammar validated along the
//! way. A parse failure drops everything built so far in one piece.

use crate::errors::{ErrorKind, Result};

/// Tokens consumed from a single line; anything past the cap is dropped.
pub const MAX_TOKENS: usize = 2048;
/// Upper bound on the argument list of a single pipeline stage.
pub const MAX_ARGS: usize = 256;

/// How an output redirection opens its target file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputMode {
    Truncate,
    Append,
}

/// Output redirection target for one pipeline stage.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputRedirect {
    pub filename: String,
    pub mode: OutputMode,
}

/// One stage of a pipeline: a program, its arguments, and its redirections.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Command {
    pub argv: Vec<String>,
    pub infile: Option<String>,
    pub outfile: Option<OutputRedirect>,
}

impl Command {
    fn new() -> Command {
        Command {
            argv: Vec::new(),
            infile: None,
            outfile: None,
        }
    }

    /// The program name. Valid on any parsed command; the parser rejects
    /// stages with an empty argument list.
    pub fn program(&self) -> &str {
        &self.argv[0]
    }
}

/// A parsed input line: the original text plus one or more commands.
///
/// The original text is kept because the job table displays suspended
/// commands exactly as they were typed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pipeline {
    pub input: String,
    pub commands: Vec<Command>,
}

impl Pipeline {
    pub fn stage_count(&self) -> usize {
        self.commands.len()
    }

    pub fn first(&self) -> &Command {
        &self.commands[0]
    }

    /// `true` for a lone command without redirections, the only shape a
    /// builtin may take.
    pub fn is_simple(&self) -> bool {
        self.commands.len() == 1
            && self.first().infile.is_none()
            && self.first().outfile.is_none()
    }
}

/// Parses one input line into a pipeline.
///
/// Returns `Ok(None)` for a line with no tokens, `Ok(Some(pipeline))` for a
/// well-formed line, and the invalid-command error otherwise.
///
/// # Examples
///
/// ```
/// use plush::parser;
///
/// let pipeline = parser::parse("echo test").unwrap().unwrap();
/// assert_eq!(pipeline.input, "echo test");
/// assert_eq!(pipeline.commands.len(), 1);
/// assert_eq!(pipeline.commands[0].argv, vec!["echo", "test"]);
/// assert!(pipeline.commands[0].infile.is_none());
/// ```
pub fn parse(input: &str) -> Result<Option<Pipeline>> {
    let tokens = tokenize(input);
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut commands = vec![Command::new()];
    let mut index = 0;
    while index < tokens.len() {
        let token = tokens[index];
        match token {
            "|" => {
                {
                    let current = commands.last().unwrap();
                    if current.argv.is_empty() || current.outfile.is_some() {
                        return Err(ErrorKind::InvalidCommand.into());
                    }
                }
                commands.push(Command::new());
            }
            "<" => {
                let filename = redirect_target(&tokens, index)?;
                let first_stage = commands.len() == 1;
                let current = commands.last_mut().unwrap();
                if !first_stage || current.infile.is_some() {
                    return Err(ErrorKind::InvalidCommand.into());
                }
                current.infile = Some(filename.to_string());
                index += 1;
            }
            ">" | ">>" => {
                let filename = redirect_target(&tokens, index)?;
                let current = commands.last_mut().unwrap();
                if current.outfile.is_some() {
                    return Err(ErrorKind::InvalidCommand.into());
                }
                let mode = if token == ">>" {
                    OutputMode::Append
                } else {
                    OutputMode::Truncate
                };
                current.outfile = Some(OutputRedirect {
                    filename: filename.to_string(),
                    mode,
                });
                // Output redirection is only meaningful on the terminal
                // stage; a later pipe invalidates the whole line.
                if tokens[index + 2..].iter().any(|&t| t == "|") {
                    return Err(ErrorKind::InvalidCommand.into());
                }
                index += 1;
            }
            _ => {
                let current = commands.last_mut().unwrap();
                if current.argv.len() + 1 >= MAX_ARGS {
                    return Err(ErrorKind::InvalidCommand.into());
                }
                current.argv.push(token.to_string());
            }
        }
        index += 1;
    }

    if commands.iter().any(|command| command.argv.is_empty()) {
        return Err(ErrorKind::InvalidCommand.into());
    }

    Ok(Some(Pipeline {
        input: input.to_string(),
        commands,
    }))
}

/// The token after a redirection operator, which must exist and must not be
/// an operator itself.
fn redirect_target<'a>(tokens: &[&'a str], index: usize) -> Result<&'a str> {
    match tokens.get(index + 1) {
        Some(&next) if !is_operator(next) => Ok(next),
        _ => Err(ErrorKind::InvalidCommand.into()),
    }
}

fn is_operator(token: &str) -> bool {
    token == "|" || token == "<" || token == ">" || token == ">>"
}

fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().take(MAX_TOKENS).collect()
}
