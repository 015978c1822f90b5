//! Python environment setup: create a venv, resolve its tooling, upgrade pip
//! and install the requirements manifest, stopping at the first failure.
//!
//! Callers build a [`SetupConfig`](envsetup_core::config::SetupConfig) and hand
//! it to [`runner::SetupRunner`] together with a [`command::CommandRunner`].
//! External tools are always invoked by their full path inside the
//! environment; the process environment is never mutated.

pub mod log;

pub mod command;
pub mod error;
pub mod interpreter;
pub mod layout;
pub mod manifest;
pub mod runner;
pub mod steps;

pub use error::{Result, SetupError};
pub use runner::{SetupReport, SetupRunner};
pub use steps::Step;
