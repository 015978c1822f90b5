//! Unified configuration layer.
//!
//! Every environment variable read lives here; the rest of the workspace goes
//! through the structured configs instead of calling `std::env::var`.
//!
//! - `loader`: `env_or`, `env_optional`, `env_bool` helpers
//! - `schema`: `SetupConfig`, `ObservabilityConfig`
//! - `env_keys`: key constants and their aliases

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or};
pub use schema::{ObservabilityConfig, SetupConfig};
