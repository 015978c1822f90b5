//! Setup failures and the exit status each one maps to.

use std::path::PathBuf;

use thiserror::Error;

use crate::steps::Step;

/// Generic failure status.
pub const EXIT_FAILURE: i32 = 1;

/// Shell status for "found but cannot execute".
pub const EXIT_CANNOT_EXECUTE: i32 = 126;

/// Shell status for "command not found".
pub const EXIT_NOT_FOUND: i32 = 127;

/// Base of the shell status for a process killed by a signal.
pub const EXIT_SIGNAL_BASE: i32 = 128;

/// Errors returned by the setup sequence. Each carries the step it stopped at.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("{step}: `{program}` exited with status {code}")]
    CommandFailed {
        step: Step,
        program: String,
        code: i32,
    },

    #[error("{step}: `{program}` was terminated by signal {signal}")]
    Terminated {
        step: Step,
        program: String,
        signal: i32,
    },

    #[error("Python interpreter '{spec}' not found on this host")]
    InterpreterNotFound { spec: String },

    #[error("{step}: cannot start `{program}`: {source}")]
    Spawn {
        step: Step,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment at {} is malformed: missing {missing}", .path.display())]
    MalformedEnvironment { path: PathBuf, missing: String },

    #[error("Manifest not found: {}", .path.display())]
    ManifestMissing { path: PathBuf },

    #[error("Cannot read manifest {}: {source}", .path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SetupError>;

impl SetupError {
    /// The step the sequence stopped at.
    pub fn step(&self) -> Step {
        match self {
            SetupError::CommandFailed { step, .. }
            | SetupError::Terminated { step, .. }
            | SetupError::Spawn { step, .. } => *step,
            SetupError::InterpreterNotFound { .. } => Step::CreateEnvironment,
            SetupError::MalformedEnvironment { .. } => Step::ActivateEnvironment,
            SetupError::ManifestMissing { .. } | SetupError::ManifestRead { .. } => {
                Step::InstallDependencies
            }
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            SetupError::CommandFailed { code, .. } => *code,
            SetupError::Terminated { signal, .. } => EXIT_SIGNAL_BASE + signal,
            SetupError::InterpreterNotFound { .. } => EXIT_NOT_FOUND,
            SetupError::Spawn { source, .. } => {
                if source.kind() == std::io::ErrorKind::NotFound {
                    EXIT_NOT_FOUND
                } else {
                    EXIT_CANNOT_EXECUTE
                }
            }
            SetupError::MalformedEnvironment { .. }
            | SetupError::ManifestMissing { .. }
            | SetupError::ManifestRead { .. } => EXIT_FAILURE,
        }
    }

    /// True when the failing tool already printed its own diagnostics.
    pub fn reported_by_tool(&self) -> bool {
        matches!(
            self,
            SetupError::CommandFailed { .. } | SetupError::Terminated { .. }
        )
    }
}
