//! Environment variable keys.
//!
//! Setup keys carry the `ENVSETUP_*` prefix only. Generic names such as
//! `PYTHON_VERSION` are exported by host images and must not change a run.

/// Setup inputs
pub mod setup {
    pub const ENVSETUP_ENV_DIR: &str = "ENVSETUP_ENV_DIR";

    pub const ENVSETUP_MANIFEST: &str = "ENVSETUP_MANIFEST";

    /// Interpreter version (`3.11`) or an explicit interpreter path.
    pub const ENVSETUP_PYTHON: &str = "ENVSETUP_PYTHON";
}

/// Observability and logging
pub mod observability {
    pub const ENVSETUP_QUIET: &str = "ENVSETUP_QUIET";
    pub const ENVSETUP_LOG_LEVEL: &str = "ENVSETUP_LOG_LEVEL";
    pub const ENVSETUP_LOG_JSON: &str = "ENVSETUP_LOG_JSON";
    pub const ENVSETUP_AUDIT_LOG: &str = "ENVSETUP_AUDIT_LOG";
}
