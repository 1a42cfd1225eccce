//! Discard the steps declared so far

use shipit_core::Result;

use crate::context::StepContext;
use crate::step::{Step, StepArgs};

/// `skip`: removes every step declared before it. Useful for trying out the
/// tail of a long pipeline.
#[derive(Debug, Default)]
pub struct Skip;

impl Skip {
    /// Kind identifier
    pub const KIND: &'static str = "skip";

    /// Registry factory
    pub fn from_args(args: &StepArgs) -> Result<Box<dyn Step>> {
        args.at_most(Self::KIND, 0)?;
        Ok(Box::new(Self))
    }
}

impl Step for Skip {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn describe(&self) -> String {
        "skip".to_string()
    }

    fn on_declare(&self, preceding: &mut Vec<Box<dyn Step>>) {
        tracing::debug!(dropped = preceding.len(), "skipping earlier steps");
        preceding.clear();
    }

    fn run(&mut self, _ctx: &mut StepContext) -> Result<()> {
        Ok(())
    }
}
