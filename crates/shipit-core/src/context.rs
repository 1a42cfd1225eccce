//! Release metadata shared by every step of one pipeline run

use serde::Serialize;
use tracing::info;

use shipit_publish::ReleaseInfo;

use crate::config::PackageConfig;
use crate::error::{PipelineError, Result, VersionError};

/// Name, version and description of the release being made.
///
/// `version` may be advanced once per run, by the step that bumps it during
/// prepare. Every later step reads the advanced value in both phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseContext {
    name: String,
    version: String,
    description: String,
    previous_version: Option<String>,
}

impl ReleaseContext {
    /// Create a context
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: description.into(),
            previous_version: None,
        }
    }

    /// Create a context from `[package]`
    pub fn from_config(package: &PackageConfig) -> Self {
        Self::new(&package.name, &package.version, &package.description)
    }

    /// Package identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current release version (may be empty)
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Package description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Version before it was advanced, if it was
    pub fn previous_version(&self) -> Option<&str> {
        self.previous_version.as_deref()
    }

    /// Whether the version has been advanced in this run
    pub fn is_advanced(&self) -> bool {
        self.previous_version.is_some()
    }

    /// Release version, failing when none is known
    pub fn require_version(&self) -> Result<&str> {
        if self.version.is_empty() {
            Err(PipelineError::MissingVersion.into())
        } else {
            Ok(&self.version)
        }
    }

    /// Advance the version. Only the first call succeeds.
    pub fn advance_version(&mut self, next: impl Into<String>) -> Result<()> {
        let next = next.into();
        if self.previous_version.is_some() {
            return Err(VersionError::AlreadyAdvanced {
                current: self.version.clone(),
                attempted: next,
            }
            .into());
        }

        info!(from = %self.version, to = %next, "advancing release version");
        self.previous_version = Some(std::mem::replace(&mut self.version, next));
        Ok(())
    }

    /// Snapshot for publish collaborators
    pub fn release_info(&self) -> ReleaseInfo {
        ReleaseInfo::new(&self.name, &self.version, &self.description)
    }
}
