//! Unified configuration layer.
//!
//! Every environment lookup goes through this module and reads from an
//! [`AmbientEnv`](crate::AmbientEnv) snapshot, never from `std::env` directly.
//!
//! - `loader`: `env_or`, `env_optional`, `env_bool`, `env_list`
//! - `schema`: `HarnessConfig`, `ObservabilityConfig`
//! - `env_keys`: key constants (with legacy aliases)

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_list, env_optional, env_or};
pub use schema::{HarnessConfig, ObservabilityConfig};
