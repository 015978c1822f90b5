//! Config structs grouped by concern, loaded from the environment.

use super::env_keys::{observability as obv_keys, setup as setup_keys};
use super::loader::{env_bool, env_optional, env_or};
use std::path::PathBuf;

/// Default environment directory, relative to the working directory.
pub const DEFAULT_ENV_DIR: &str = "venv";

/// Default dependency manifest, relative to the working directory.
pub const DEFAULT_MANIFEST: &str = "requirements.txt";

/// Default interpreter version used to create the environment.
pub const DEFAULT_PYTHON_VERSION: &str = "3.11";

/// Inputs of one setup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupConfig {
    pub env_dir: PathBuf,
    pub manifest: PathBuf,
    /// Interpreter version (`3.11`) or path to an interpreter executable.
    pub python: String,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            env_dir: PathBuf::from(DEFAULT_ENV_DIR),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            python: DEFAULT_PYTHON_VERSION.to_string(),
        }
    }
}

impl SetupConfig {
    /// Load from environment variables; unset or empty values use the defaults.
    pub fn from_env() -> Self {
        Self {
            env_dir: PathBuf::from(env_or(
                setup_keys::ENVSETUP_ENV_DIR,
                &[],
                || DEFAULT_ENV_DIR.to_string(),
            )),
            manifest: PathBuf::from(env_or(
                setup_keys::ENVSETUP_MANIFEST,
                &[],
                || DEFAULT_MANIFEST.to_string(),
            )),
            python: env_or(
                setup_keys::ENVSETUP_PYTHON,
                &[],
                || DEFAULT_PYTHON_VERSION.to_string(),
            ),
        }
    }

    /// Apply CLI flags on top. Priority: CLI > environment > default.
    pub fn with_cli_overrides(
        mut self,
        env_dir: Option<PathBuf>,
        manifest: Option<PathBuf>,
        python: Option<String>,
    ) -> Self {
        if let Some(dir) = env_dir {
            self.env_dir = dir;
        }
        if let Some(m) = manifest {
            self.manifest = m;
        }
        if let Some(p) = python.filter(|p| !p.trim().is_empty()) {
            self.python = p.trim().to_string();
        }
        self
    }
}

/// Observability config: quiet, log_level, log_json, audit_log
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(Self::load)
    }

    fn load() -> Self {
        Self {
            quiet: env_bool(obv_keys::ENVSETUP_QUIET, &[], false),
            log_level: env_or(obv_keys::ENVSETUP_LOG_LEVEL, &[], || {
                "envsetup=warn".to_string()
            }),
            log_json: env_bool(obv_keys::ENVSETUP_LOG_JSON, &[], false),
            audit_log: env_optional(obv_keys::ENVSETUP_AUDIT_LOG, &[]),
        }
    }
}
