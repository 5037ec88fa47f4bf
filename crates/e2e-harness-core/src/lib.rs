pub mod ambient;
pub mod config;
pub mod observability;
pub mod platform;

pub use ambient::{AmbientEnv, EnvMap};
pub use platform::Platform;
