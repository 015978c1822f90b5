//! Virtual environment layout and activation.
//!
//! Activation never touches `PATH` or `VIRTUAL_ENV`: it checks the layout and
//! hands back the environment's interpreter by full path, which later steps
//! invoke directly.

use std::path::{Path, PathBuf};

use crate::error::{Result, SetupError};

/// Marker file written by `python -m venv`.
pub const PYVENV_CFG: &str = "pyvenv.cfg";

/// Interpreter locations inside a venv: POSIX first, then Windows.
const PYTHON_CANDIDATES: &[&[&str]] = &[&["bin", "python"], &["Scripts", "python.exe"]];

#[derive(Debug, Clone)]
pub struct EnvLayout {
    root: PathBuf,
}

/// An environment whose layout has been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEnv {
    pub root: PathBuf,
    /// Full path to the environment's interpreter.
    pub python: PathBuf,
}

impl EnvLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `python -m venv` puts the interpreter on this platform.
    pub fn expected_python(&self) -> PathBuf {
        if cfg!(windows) {
            self.root.join("Scripts").join("python.exe")
        } else {
            self.root.join("bin").join("python")
        }
    }

    fn find_python(&self) -> Option<PathBuf> {
        PYTHON_CANDIDATES
            .iter()
            .map(|parts| parts.iter().fold(self.root.clone(), |p, s| p.join(s)))
            .find(|p| p.is_file())
    }

    /// Validate the layout and resolve the environment's tooling.
    pub fn activate(&self) -> Result<ActiveEnv> {
        let malformed = |missing: &str| SetupError::MalformedEnvironment {
            path: self.root.clone(),
            missing: missing.to_string(),
        };

        if !self.root.is_dir() {
            return Err(malformed("environment directory"));
        }
        if !self.root.join(PYVENV_CFG).is_file() {
            return Err(malformed(PYVENV_CFG));
        }
        let python = self
            .find_python()
            .ok_or_else(|| malformed("bin/python (or Scripts/python.exe)"))?;

        Ok(ActiveEnv {
            root: self.root.clone(),
            python,
        })
    }
}
