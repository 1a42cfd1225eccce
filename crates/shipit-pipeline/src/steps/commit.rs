//! Commit the working tree

use tracing::{info, warn};

use shipit_core::Result;
use shipit_vc::{commit_message, TreeStatus};

use crate::context::StepContext;
use crate::step::{not_prepared, Step, StepArgs};

/// `commit [message]`
///
/// Prepare refuses a tree with untracked files. Run commits every tracked
/// change with `message`, or `Release <version>` when none was given. A clean
/// tree with no version advance in this run is skipped with a warning.
#[derive(Debug, Default)]
pub struct Commit {
    message: Option<String>,
    version: Option<String>,
    nothing_to_commit: bool,
}

impl Commit {
    /// Kind identifier
    pub const KIND: &'static str = "commit";

    /// Commit with the default message
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit with `message`
    pub fn message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = Some(message.into());
        self
    }

    /// Registry factory
    pub fn from_args(args: &StepArgs) -> Result<Box<dyn Step>> {
        let mut step = Self::new();
        if !args.is_empty() {
            step.message(args.all().join(" "));
        }
        Ok(Box::new(step))
    }
}

impl Step for Commit {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn describe(&self) -> String {
        match &self.version {
            Some(version) => format!(
                "commit \"{}\"",
                commit_message(self.message.as_deref(), version)
            ),
            None => "commit".to_string(),
        }
    }

    fn prepare(&mut self, ctx: &mut StepContext) -> Result<()> {
        let vc = ctx.vc()?;
        let status = vc.precommit()?;
        self.nothing_to_commit = status == TreeStatus::NoChanges && !ctx.release.is_advanced();
        if self.nothing_to_commit {
            warn!(backend = vc.name(), "no locally changed files, skipping commit");
        }
        self.version = Some(ctx.release.require_version()?.to_string());
        Ok(())
    }

    fn run(&mut self, ctx: &mut StepContext) -> Result<()> {
        let version = self
            .version
            .clone()
            .ok_or_else(|| not_prepared(Self::KIND))?;
        if self.nothing_to_commit {
            info!(%version, "commit skipped");
            return Ok(());
        }
        let vc = ctx.vc()?;
        vc.commit(self.message.as_deref(), &version)?;
        info!(backend = vc.name(), %version, "committed");
        Ok(())
    }
}
