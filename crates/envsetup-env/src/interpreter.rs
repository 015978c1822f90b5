//! Host interpreter lookup for creating the environment.
//!
//! A spec is either an explicit path (contains a path separator), a program
//! name (`python3`, `py`) or a version (`3.11` -> `python3.11`).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Result, SetupError};

/// Host interpreter plus the arguments that select it (e.g. `py -3.11`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Interpreter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }
}

fn is_path_spec(spec: &str) -> bool {
    spec.contains('/') || spec.contains(std::path::MAIN_SEPARATOR)
}

/// Program name for a version or name spec.
pub fn program_name(spec: &str) -> String {
    if spec.starts_with("python") || spec == "py" {
        spec.to_string()
    } else {
        format!("python{spec}")
    }
}

/// Resolve `spec` to an interpreter on this host.
pub fn resolve_interpreter(spec: &str) -> Result<Interpreter> {
    let spec = spec.trim();
    let not_found = || SetupError::InterpreterNotFound {
        spec: spec.to_string(),
    };

    if is_path_spec(spec) {
        let path = Path::new(spec);
        return if path.is_file() {
            Ok(Interpreter::new(path))
        } else {
            Err(not_found())
        };
    }

    let name = program_name(spec);
    if let Ok(path) = which::which(&name) {
        tracing::debug!("Resolved interpreter {} -> {}", spec, path.display());
        return Ok(Interpreter::new(path));
    }

    // Windows installs rarely ship `python3.11.exe`; the `py` launcher selects by version.
    if cfg!(windows) && name != spec {
        if let Ok(launcher) = which::which("py") {
            return Ok(Interpreter {
                program: launcher,
                args: vec![OsString::from(format!("-{spec}"))],
            });
        }
    }

    Err(not_found())
}
