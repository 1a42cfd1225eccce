//! Shipit Core - Core library for the release pipeline
//!
//! This crate provides the foundational types shared by every other shipit
//! crate: the error taxonomy, configuration loading, the mutable
//! [`ReleaseContext`], version-token location and succession, and the
//! external process runner used by the version-control backends and task steps.

pub mod config;
pub mod context;
pub mod error;
pub mod process;
pub mod version;

pub use config::Config;
pub use context::ReleaseContext;
pub use error::{
    CommandError, ConfigError, PipelineError, Result, ShipitError, VcError, VersionError,
};
pub use process::{ToolCommand, ToolOutput};
pub use version::{successor, VersionSplice};
