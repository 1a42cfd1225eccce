//! Shipit VC - Version control backends for the release pipeline
//!
//! A [`VcBackend`] exposes the handful of operations a release needs
//! (precommit validation, commit, tag existence and creation, diff inspection)
//! over a command-line tool. [`VcResolver`] picks exactly one backend for a
//! working directory from the marker each backend recognises.

mod backend;
pub mod git;
mod resolver;
pub mod svn;

pub use backend::{commit_message, tag_message, TreeStatus, VcBackend};
pub use git::GitBackend;
pub use resolver::{BackendEntry, VcResolver};
pub use svn::SvnBackend;
