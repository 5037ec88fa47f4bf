//! Isolated environment lifecycle: create or reuse a venv, install the tool
//! under test into it, and tear it down at suite end.
//!
//! The suite driver owns the resulting [`EnvironmentContext`](crate::EnvironmentContext);
//! everything here only reads it or hands it back.

pub mod builder;
pub mod install;

pub use builder::VenvProvisioner;
pub use install::{InstallPlan, InstallationPipeline};
