//! CLI commands

mod diff;
mod init;
mod run;
mod status;
mod steps;

pub use diff::DiffCommand;
pub use init::InitCommand;
pub use run::RunCommand;
pub use status::StatusCommand;
pub use steps::StepsCommand;
