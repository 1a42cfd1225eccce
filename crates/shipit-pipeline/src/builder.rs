//! Declaring pipelines

use shipit_core::config::Config;
use shipit_core::Result;

use crate::context::StepContext;
use crate::registry::StepRegistry;
use crate::step::{Step, StepArgs};
use crate::steps::{
    Ask, ChangeVersion, Commit, InlineStep, PublishNotify, RepositoryPublish, Skip, Tag,
    TaskInvoke,
};

/// Position of a declared step, for reaching it again after later declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepHandle {
    index: usize,
    kind: &'static str,
}

impl StepHandle {
    /// Index in the declaration order at the time it was declared
    pub fn index(&self) -> usize {
        self.index
    }

    /// Step kind
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

/// Collects steps in declaration order.
///
/// Typed declarations return the concrete step so it can be configured in
/// place:
///
/// ```ignore
/// Pipeline::build(&registry, |p| {
///     p.change_version("lib/version.rb");
///     p.commit().message("Bump version");
///     p.tag().format("v{version}")?;
///     Ok(())
/// })
/// ```
pub struct PipelineBuilder<'r> {
    registry: &'r StepRegistry,
    steps: Vec<Box<dyn Step>>,
}

impl<'r> PipelineBuilder<'r> {
    /// Builder resolving kinds through `registry`
    pub fn new(registry: &'r StepRegistry) -> Self {
        Self {
            registry,
            steps: Vec::new(),
        }
    }

    /// Declare a step by kind name
    pub fn add(&mut self, kind: &str, args: impl Into<StepArgs>) -> Result<StepHandle> {
        let step = self.registry.create(kind, &args.into())?;
        Ok(self.declare(step))
    }

    /// Declare a concrete step and return it for configuration
    pub fn push<S: Step>(&mut self, step: S) -> &mut S {
        let handle = self.declare(Box::new(step));
        self.step_mut::<S>(handle)
            .expect("step just declared with this type")
    }

    /// A previously declared step, if `handle` still names a step of type `S`
    pub fn step_mut<S: Step>(&mut self, handle: StepHandle) -> Option<&mut S> {
        self.steps
            .get_mut(handle.index)
            .and_then(|s| s.as_mut().as_any_mut().downcast_mut::<S>())
    }

    /// `change_version <file>`
    pub fn change_version(&mut self, file: &str) -> &mut ChangeVersion {
        self.push(ChangeVersion::new(file))
    }

    /// `commit`
    pub fn commit(&mut self) -> &mut Commit {
        self.push(Commit::new())
    }

    /// `tag`
    pub fn tag(&mut self) -> &mut Tag {
        self.push(Tag::new())
    }

    /// `task <names...>`
    pub fn task<I, S>(&mut self, names: I) -> &mut TaskInvoke
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(TaskInvoke::new(names))
    }

    /// `notify`
    pub fn notify(&mut self) -> &mut PublishNotify {
        self.push(PublishNotify::new())
    }

    /// `publish`
    pub fn publish(&mut self) -> &mut RepositoryPublish {
        self.push(RepositoryPublish::new())
    }

    /// `ask <question>`
    pub fn ask(&mut self, question: &str) -> &mut Ask {
        self.push(Ask::new(question))
    }

    /// `skip`
    pub fn skip(&mut self) {
        self.push(Skip);
    }

    /// Declare a step from closures
    pub fn inline<P, R>(&mut self, label: &str, prepare: P, run: R) -> &mut InlineStep
    where
        P: FnMut(&mut StepContext) -> Result<()> + Send + 'static,
        R: FnMut(&mut StepContext) -> Result<()> + Send + 'static,
    {
        self.push(InlineStep::new(label, prepare, run))
    }

    /// Number of declared steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether nothing is declared
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Finish declaring
    pub fn finish(self) -> Pipeline {
        Pipeline { steps: self.steps }
    }

    fn declare(&mut self, step: Box<dyn Step>) -> StepHandle {
        step.on_declare(&mut self.steps);
        let handle = StepHandle {
            index: self.steps.len(),
            kind: step.kind(),
        };
        self.steps.push(step);
        handle
    }
}

/// An ordered, declared list of steps
pub struct Pipeline {
    steps: Vec<Box<dyn Step>>,
}

impl Pipeline {
    /// Declare a pipeline in code
    pub fn build<F>(registry: &StepRegistry, declare: F) -> Result<Self>
    where
        F: FnOnce(&mut PipelineBuilder<'_>) -> Result<()>,
    {
        let mut builder = PipelineBuilder::new(registry);
        declare(&mut builder)?;
        Ok(builder.finish())
    }

    /// Declare the pipeline listed under `steps` in the configuration
    pub fn from_config(registry: &StepRegistry, config: &Config) -> Result<Self> {
        Self::build(registry, |p| {
            for step in &config.steps {
                p.add(step.kind(), step.args())?;
            }
            Ok(())
        })
    }

    /// Step labels in order
    pub fn labels(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.describe()).collect()
    }

    /// Step kinds in order
    pub fn kinds(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.kind()).collect()
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the pipeline has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub(crate) fn steps_mut(&mut self) -> &mut [Box<dyn Step>] {
        &mut self.steps
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipit_core::config::StepConfig;
    use shipit_core::{PipelineError, ShipitError};

    #[test]
    fn test_typed_declarations() {
        let registry = StepRegistry::builtin();
        let pipeline = Pipeline::build(&registry, |p| {
            p.change_version("VERSION").ident("VERS");
            p.commit().message("Bump");
            p.tag().format("v{version}")?.message("Tagged");
            Ok(())
        })
        .unwrap();
        assert_eq!(pipeline.kinds(), vec!["change_version", "commit", "tag"]);
    }

    #[test]
    fn test_skip_clears_preceding() {
        let registry = StepRegistry::builtin();
        let pipeline = Pipeline::build(&registry, |p| {
            p.commit();
            p.tag();
            p.skip();
            p.add("task", ["build"])?;
            Ok(())
        })
        .unwrap();
        assert_eq!(pipeline.kinds(), vec!["skip", "task"]);
    }

    #[test]
    fn test_handles() {
        let registry = StepRegistry::builtin();
        let mut builder = PipelineBuilder::new(&registry);
        let handle = builder.add("commit", StepArgs::none()).unwrap();
        assert_eq!(handle.kind(), "commit");
        assert!(builder.step_mut::<Commit>(handle).is_some());
        assert!(builder.step_mut::<Tag>(handle).is_none());
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            steps: vec![
                StepConfig::Kind("change_version".to_string()),
                StepConfig::Detailed {
                    kind: "tag".to_string(),
                    args: vec!["v{version}".to_string()],
                },
            ],
            ..Default::default()
        };
        let pipeline = Pipeline::from_config(&StepRegistry::builtin(), &config).unwrap();
        assert_eq!(pipeline.len(), 2);

        let config = Config {
            steps: vec![StepConfig::Kind("deploy".to_string())],
            ..Default::default()
        };
        let err = Pipeline::from_config(&StepRegistry::builtin(), &config).unwrap_err();
        assert!(matches!(
            err,
            ShipitError::Pipeline(PipelineError::UnknownStepKind(_))
        ));
    }

    #[test]
    fn test_invalid_arguments_fail_declaration() {
        let err = Pipeline::build(&StepRegistry::builtin(), |p| {
            p.add("tag", ["latest"])?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ShipitError::Pipeline(PipelineError::InvalidStepArguments { .. })
        ));
    }
}
