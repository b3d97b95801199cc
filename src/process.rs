//! # External Process Execution
//!
//! Every interaction with `git`, `gh`, and the container tool goes through the
//! [`CommandRunner`] trait. The default implementation wraps
//! `std::process::Command`; tests swap in a scripted runner so behaviour can
//! be verified without spawning processes.
//!
//! A non-zero exit code is not an error at this layer. Callers decide whether
//! a failed `git rev-parse` means "unknown" or a failed build means failure.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use log::debug;

use crate::cancel::CancellationToken;
use crate::error::{Error, Result};

/// How often a streaming run checks for cancellation when the child is quiet.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A fully described external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// The command as a single display line, `program arg1 arg2`.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        for (key, value) in &self.env {
            command.env(key, value);
        }
        command
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or -1 when the process was terminated by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Trait for running external commands - allows mocking in tests
pub trait CommandRunner: Send + Sync {
    /// Run to completion and capture both output channels.
    ///
    /// Fails only when the program cannot be started.
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Run while forwarding each output line as it is produced.
    ///
    /// Returns the exit code. If `cancel` fires while the child is running
    /// the child is killed and [`Error::Cancelled`] is returned.
    fn stream(
        &self,
        spec: &CommandSpec,
        on_stdout: &mut dyn FnMut(&str),
        on_stderr: &mut dyn FnMut(&str),
        cancel: &CancellationToken,
    ) -> Result<i32>;
}

/// The default runner, backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

enum StreamLine {
    Stdout(String),
    Stderr(String),
}

fn spawn_error(spec: &CommandSpec, e: std::io::Error) -> Error {
    Error::ToolSpawn {
        program: spec.program.clone(),
        message: e.to_string(),
    }
}

fn forward_lines<R, F>(reader: R, tx: mpsc::Sender<StreamLine>, wrap: F) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
    F: Fn(String) -> StreamLine + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        let mut forwarding = true;
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            // drain to EOF even once the receiver is gone
            if forwarding {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                forwarding = tx.send(wrap(line)).is_ok();
            }
        }
    })
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!("running: {}", spec.command_line());
        let output = spec
            .to_command()
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(spec, e))?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn stream(
        &self,
        spec: &CommandSpec,
        on_stdout: &mut dyn FnMut(&str),
        on_stderr: &mut dyn FnMut(&str),
        cancel: &CancellationToken,
    ) -> Result<i32> {
        cancel.check()?;
        debug!("streaming: {}", spec.command_line());

        let mut child = spec
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(spec, e))?;

        let (tx, rx) = mpsc::channel();
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(forward_lines(stdout, tx.clone(), StreamLine::Stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(forward_lines(stderr, tx.clone(), StreamLine::Stderr));
        }
        drop(tx);

        loop {
            if cancel.is_cancelled() {
                debug!("cancellation requested, killing {}", spec.program);
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Cancelled);
            }
            match rx.recv_timeout(CANCEL_POLL_INTERVAL) {
                Ok(StreamLine::Stdout(line)) => on_stdout(&line),
                Ok(StreamLine::Stderr(line)) => on_stderr(&line),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let status = child.wait()?;
        for reader in readers {
            let _ = reader.join();
        }
        Ok(status.code().unwrap_or(-1))
    }
}

/// Split a command string into an executable and its arguments.
///
/// Tokens are separated by whitespace. Single quotes keep their content
/// literally; double quotes group and honour `\"` and `\\`. Backslashes
/// outside quotes are literal so Windows paths survive. There is no variable
/// expansion, globbing, or redirection: the first token is run directly.
pub fn split_command(command: &str) -> Result<Vec<String>> {
    let invalid = |message: &str| Error::InvalidBuildCommand {
        command: command.to_string(),
        message: message.to_string(),
    };

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err(invalid("unterminated single quote")),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch @ ('"' | '\\')) => current.push(ch),
                            Some(ch) => {
                                current.push('\\');
                                current.push(ch);
                            }
                            None => return Err(invalid("unterminated double quote")),
                        },
                        Some(ch) => current.push(ch),
                        None => return Err(invalid("unterminated double quote")),
                    }
                }
            }
            _ => {
                in_token = true;
                current.push(c);
            }
        }
    }
    if in_token {
        tokens.push(current);
    }

    if tokens.is_empty() {
        return Err(Error::EmptyBuildCommand);
    }
    Ok(tokens)
}
