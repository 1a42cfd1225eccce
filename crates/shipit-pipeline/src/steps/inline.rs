//! Steps declared from closures

use shipit_core::Result;

use crate::context::StepContext;
use crate::step::Step;

type Action = Box<dyn FnMut(&mut StepContext) -> Result<()> + Send>;

/// A step whose phases are closures, for pipelines declared in code
pub struct InlineStep {
    label: String,
    prepare: Action,
    run: Action,
}

impl InlineStep {
    /// Kind identifier
    pub const KIND: &'static str = "inline";

    /// Step labelled `label`
    pub fn new<P, R>(label: impl Into<String>, prepare: P, run: R) -> Self
    where
        P: FnMut(&mut StepContext) -> Result<()> + Send + 'static,
        R: FnMut(&mut StepContext) -> Result<()> + Send + 'static,
    {
        Self {
            label: label.into(),
            prepare: Box::new(prepare),
            run: Box::new(run),
        }
    }
}

impl Step for InlineStep {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn describe(&self) -> String {
        self.label.clone()
    }

    fn prepare(&mut self, ctx: &mut StepContext) -> Result<()> {
        (self.prepare)(ctx)
    }

    fn run(&mut self, ctx: &mut StepContext) -> Result<()> {
        (self.run)(ctx)
    }
}
