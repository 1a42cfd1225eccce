//! Run configured tasks

use shipit_core::config::TaskConfig;
use shipit_core::{PipelineError, Result, ToolCommand};

use crate::context::StepContext;
use crate::step::{Step, StepArgs};

/// `task <name>...`
///
/// Runs each named `[tasks]` entry through `sh -c` in the project root, in
/// order. The release metadata is exported as `SHIPIT_NAME`, `SHIPIT_VERSION`
/// and `SHIPIT_DESCRIPTION`.
#[derive(Debug)]
pub struct TaskInvoke {
    names: Vec<String>,
}

impl TaskInvoke {
    /// Kind identifier
    pub const KIND: &'static str = "task";

    /// Run `names` in order
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Registry factory
    pub fn from_args(args: &StepArgs) -> Result<Box<dyn Step>> {
        args.at_least(Self::KIND, 1, "task name")?;
        Ok(Box::new(Self::new(args.all().iter().cloned())))
    }

    fn lookup<'c>(&self, ctx: &'c StepContext, name: &str) -> Result<&'c TaskConfig> {
        ctx.config()
            .tasks
            .get(name)
            .ok_or_else(|| PipelineError::UnknownTaskReference(name.to_string()).into())
    }
}

impl Step for TaskInvoke {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn describe(&self) -> String {
        format!("task {}", self.names.join(", "))
    }

    fn prepare(&mut self, ctx: &mut StepContext) -> Result<()> {
        for name in &self.names {
            self.lookup(ctx, name)?;
        }
        Ok(())
    }

    fn run(&mut self, ctx: &mut StepContext) -> Result<()> {
        for name in &self.names {
            let task = self.lookup(ctx, name)?;
            let mut command = ToolCommand::shell(task.command())
                .current_dir(ctx.root())
                .env("SHIPIT_NAME", ctx.release.name())
                .env("SHIPIT_VERSION", ctx.release.version())
                .env("SHIPIT_DESCRIPTION", ctx.release.description());
            if let Some(env) = task.env() {
                for (key, value) in env {
                    command = command.env(key, value);
                }
            }
            ctx.run_task(name, command)?;
        }
        Ok(())
    }
}
