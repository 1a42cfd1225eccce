//! The step contract

use std::any::Any;

use shipit_core::{PipelineError, Result};

use crate::context::StepContext;

/// Access a trait object as [`Any`] so builders can hand back concrete steps
pub trait AsAny: Any {
    /// Shared view as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Mutable view as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// One unit of a release pipeline.
///
/// `prepare` validates preconditions and caches whatever `run` needs without
/// mutating anything outside the [`StepContext`]'s release metadata. `run`
/// performs the step's effect.
pub trait Step: AsAny + Send {
    /// Registry kind identifier
    fn kind(&self) -> &'static str;

    /// Label shown to the operator
    fn describe(&self) -> String;

    /// Called once when the step is declared, with the steps declared before it
    fn on_declare(&self, _preceding: &mut Vec<Box<dyn Step>>) {}

    /// Validate and compute derived state
    fn prepare(&mut self, _ctx: &mut StepContext) -> Result<()> {
        Ok(())
    }

    /// Perform the step
    fn run(&mut self, ctx: &mut StepContext) -> Result<()>;
}

/// Positional arguments handed to a step factory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepArgs {
    args: Vec<String>,
}

impl StepArgs {
    /// Build from any list of strings
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// No arguments
    pub fn none() -> Self {
        Self::default()
    }

    /// Argument at `index`
    pub fn get(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Every argument
    pub fn all(&self) -> &[String] {
        &self.args
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Whether there are no arguments
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Fail when more than `max` arguments were given
    pub fn at_most(&self, kind: &str, max: usize) -> Result<()> {
        if self.args.len() > max {
            return Err(invalid(
                kind,
                format!("expected at most {} argument(s), got {}", max, self.args.len()),
            ));
        }
        Ok(())
    }

    /// Fail when fewer than `min` arguments were given
    pub fn at_least(&self, kind: &str, min: usize, what: &str) -> Result<()> {
        if self.args.len() < min {
            return Err(invalid(kind, format!("missing {}", what)));
        }
        Ok(())
    }
}

impl From<&[String]> for StepArgs {
    fn from(args: &[String]) -> Self {
        Self::new(args.iter().cloned())
    }
}

impl From<Vec<String>> for StepArgs {
    fn from(args: Vec<String>) -> Self {
        Self { args }
    }
}

impl<const N: usize> From<[&str; N]> for StepArgs {
    fn from(args: [&str; N]) -> Self {
        Self::new(args)
    }
}

/// `InvalidStepArguments` for `kind`
pub(crate) fn invalid(kind: &str, reason: impl Into<String>) -> shipit_core::ShipitError {
    PipelineError::InvalidStepArguments {
        kind: kind.to_string(),
        reason: reason.into(),
    }
    .into()
}

/// `StepFailed` for a step whose run found no prepared state
pub(crate) fn not_prepared(label: impl Into<String>) -> shipit_core::ShipitError {
    PipelineError::StepFailed {
        step: label.into(),
        source: Box::new(shipit_core::ShipitError::other("run called before prepare")),
    }
    .into()
}
