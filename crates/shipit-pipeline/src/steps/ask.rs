//! Ask the operator during prepare

use shipit_core::{PipelineError, Result};

use crate::context::StepContext;
use crate::step::{Step, StepArgs};

/// `ask <question...>`: a declined answer cancels the pipeline before
/// anything runs.
#[derive(Debug)]
pub struct Ask {
    question: String,
}

impl Ask {
    /// Kind identifier
    pub const KIND: &'static str = "ask";

    /// Ask `question`
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }

    /// Registry factory
    pub fn from_args(args: &StepArgs) -> Result<Box<dyn Step>> {
        args.at_least(Self::KIND, 1, "question")?;
        Ok(Box::new(Self::new(args.all().join(" "))))
    }
}

impl Step for Ask {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn describe(&self) -> String {
        format!("ask \"{}\"", self.question)
    }

    fn prepare(&mut self, ctx: &mut StepContext) -> Result<()> {
        if ctx.confirm(&self.question)? {
            Ok(())
        } else {
            Err(PipelineError::Cancelled.into())
        }
    }

    fn run(&mut self, _ctx: &mut StepContext) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompt;
    use crate::steps::test_support::{config, context};
    use std::sync::Arc;

    #[test]
    fn test_ask() {
        let prompt = ScriptedPrompt::new(["y", "n"]);
        let asked = prompt.questions();
        let mut ctx = context("/tmp", config("1.0.0"), Arc::default()).with_prompt(prompt);

        let mut step = Ask::from_args(&StepArgs::from(["Changelog", "updated?"])).unwrap();
        step.prepare(&mut ctx).unwrap();
        let err = step.prepare(&mut ctx).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(
            *asked.lock().unwrap(),
            vec!["Changelog updated?", "Changelog updated?"]
        );
    }

    #[test]
    fn test_requires_question() {
        assert!(Ask::from_args(&StepArgs::none()).is_err());
    }
}
