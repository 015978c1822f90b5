//! External tool invocation.
//!
//! `CommandRunner` is the seam between the setup sequence and the host: the
//! runner only decides what to run; implementations decide how.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use crate::steps::Step;

/// A fully resolved tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program_display(&self) -> String {
        self.program.to_string_lossy().to_string()
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// How a tool finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    Success,
    Exited(i32),
    Signaled(i32),
}

impl From<ExitStatus> for ToolStatus {
    fn from(status: ExitStatus) -> Self {
        if status.success() {
            return ToolStatus::Success;
        }
        if let Some(code) = status.code() {
            return ToolStatus::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ToolStatus::Signaled(signal);
            }
        }
        ToolStatus::Exited(1)
    }
}

/// Runs one tool to completion.
pub trait CommandRunner {
    /// Block until `cmd` exits. `Err` means the tool could not be started.
    fn run(&self, step: Step, cmd: &ToolCommand) -> std::io::Result<ToolStatus>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, step: Step, cmd: &ToolCommand) -> std::io::Result<ToolStatus> {
        (**self).run(step, cmd)
    }
}

/// Runs tools as child processes that inherit stdin, stdout and stderr, so
/// their diagnostics reach the terminal unmodified.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, step: Step, cmd: &ToolCommand) -> std::io::Result<ToolStatus> {
        tracing::debug!("[{}] exec: {}", step, cmd);
        let status = Command::new(&cmd.program).args(&cmd.args).status()?;
        Ok(status.into())
    }
}
