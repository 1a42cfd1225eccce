//! Step registry

use std::fmt;

use shipit_core::{PipelineError, Result};

use crate::step::{Step, StepArgs};
use crate::steps::{Ask, ChangeVersion, Commit, PublishNotify, RepositoryPublish, Skip, Tag, TaskInvoke};

/// Constructor turning positional arguments into a step
pub type StepFactory = fn(&StepArgs) -> Result<Box<dyn Step>>;

/// A registered step kind
#[derive(Clone, Copy)]
pub struct StepKind {
    /// Identifier used in configuration
    pub name: &'static str,
    /// One-line description
    pub summary: &'static str,
    /// Constructor
    pub factory: StepFactory,
}

impl fmt::Debug for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepKind")
            .field("name", &self.name)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

const BUILTIN_STEPS: &[StepKind] = &[
    StepKind {
        name: ChangeVersion::KIND,
        summary: "Bump the version token in a file",
        factory: ChangeVersion::from_args,
    },
    StepKind {
        name: Commit::KIND,
        summary: "Commit all tracked changes",
        factory: Commit::from_args,
    },
    StepKind {
        name: Tag::KIND,
        summary: "Tag the release version",
        factory: Tag::from_args,
    },
    StepKind {
        name: TaskInvoke::KIND,
        summary: "Run configured tasks",
        factory: TaskInvoke::from_args,
    },
    StepKind {
        name: PublishNotify::KIND,
        summary: "Post a release announcement",
        factory: PublishNotify::from_args,
    },
    StepKind {
        name: RepositoryPublish::KIND,
        summary: "Upload artifacts to the package forge",
        factory: RepositoryPublish::from_args,
    },
    StepKind {
        name: Ask::KIND,
        summary: "Ask the operator before continuing",
        factory: Ask::from_args,
    },
    StepKind {
        name: Skip::KIND,
        summary: "Drop every step declared before it",
        factory: Skip::from_args,
    },
];

/// Registry of step kinds, looked up by name
#[derive(Debug, Clone)]
pub struct StepRegistry {
    kinds: Vec<StepKind>,
}

impl StepRegistry {
    /// Registry with every built-in step kind
    pub fn builtin() -> Self {
        Self {
            kinds: BUILTIN_STEPS.to_vec(),
        }
    }

    /// Empty registry
    pub fn new() -> Self {
        Self { kinds: Vec::new() }
    }

    /// Register a kind; a later registration replaces one with the same name
    pub fn register(&mut self, name: &'static str, summary: &'static str, factory: StepFactory) {
        self.kinds.retain(|k| k.name != name);
        self.kinds.push(StepKind {
            name,
            summary,
            factory,
        });
    }

    /// Look up a kind
    pub fn get(&self, name: &str) -> Option<&StepKind> {
        self.kinds.iter().find(|k| k.name == name)
    }

    /// Every registered kind, in registration order
    pub fn kinds(&self) -> &[StepKind] {
        &self.kinds
    }

    /// Construct a step of kind `name`
    pub fn create(&self, name: &str, args: &StepArgs) -> Result<Box<dyn Step>> {
        let kind = self
            .get(name)
            .ok_or_else(|| PipelineError::UnknownStepKind(name.to_string()))?;
        (kind.factory)(args)
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
