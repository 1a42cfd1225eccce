//! Configuration types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use shipit_publish::{FeedConfig, ForgeConfig};

use super::defaults::DEFAULT_ARTIFACT_PATTERN;

/// Main configuration for shipit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ordered step declarations
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepConfig>,

    /// Release metadata
    pub package: PackageConfig,

    /// Named shell tasks
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tasks: BTreeMap<String, TaskConfig>,

    /// Version-control configuration
    pub vc: VcConfig,

    /// Publishing configuration
    pub publish: PublishConfig,

    /// Confirmation gate configuration
    pub confirm: ConfirmConfig,
}

/// Release metadata (`[package]`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Package identifier
    pub name: String,

    /// Current version (`X.Y.Z`, may be empty when a change_version step supplies it)
    pub version: String,

    /// One-line description used in announcements
    pub description: String,
}

/// One entry of `steps`
///
/// Either a bare kind (`"commit"`) or a table with positional arguments
/// (`{ kind = "tag", args = ["v{version}"] }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepConfig {
    /// Step kind without arguments
    Kind(String),
    /// Step kind with positional arguments
    Detailed {
        kind: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl StepConfig {
    /// Step kind identifier
    pub fn kind(&self) -> &str {
        match self {
            Self::Kind(kind) => kind,
            Self::Detailed { kind, .. } => kind,
        }
    }

    /// Positional arguments
    pub fn args(&self) -> &[String] {
        match self {
            Self::Kind(_) => &[],
            Self::Detailed { args, .. } => args,
        }
    }
}

/// A named task in `[tasks]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskConfig {
    /// Shell command only
    Command(String),
    /// Shell command with extra environment
    Detailed {
        command: String,
        #[serde(default)]
        env: BTreeMap<String, String>,
    },
}

impl TaskConfig {
    /// Shell command to run
    pub fn command(&self) -> &str {
        match self {
            Self::Command(command) => command,
            Self::Detailed { command, .. } => command,
        }
    }

    /// Extra environment variables
    pub fn env(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Command(_) => None,
            Self::Detailed { env, .. } => Some(env),
        }
    }
}

/// Version-control configuration (`[vc]`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VcConfig {
    /// Force a backend by name instead of detecting it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

/// Publishing configuration (`[publish]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Artifact glob patterns; `{name}` and `{version}` are substituted
    pub artifacts: Vec<String>,

    /// Status feed
    pub feed: FeedConfig,

    /// Package forge
    pub forge: ForgeConfig,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            artifacts: vec![DEFAULT_ARTIFACT_PATTERN.to_string()],
            feed: FeedConfig::default(),
            forge: ForgeConfig::default(),
        }
    }
}

/// Confirmation gate configuration (`[confirm]`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmConfig {
    /// Answer the confirmation gate affirmatively
    pub assume_yes: bool,
}
