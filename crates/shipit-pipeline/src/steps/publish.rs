//! Upload the release to the package forge

use std::path::PathBuf;

use tracing::{debug, info};

use shipit_core::{ConfigError, Result};
use shipit_publish::PublishError;

use crate::context::StepContext;
use crate::step::{not_prepared, Step, StepArgs};

/// `publish [group]`
///
/// Uploads the files matching `[publish] artifacts` as a new release of the
/// package and posts a news item. The group defaults to `[publish.forge]
/// group`, then to the package name.
#[derive(Debug, Default)]
pub struct RepositoryPublish {
    group: Option<String>,
    resolved: Option<String>,
}

impl RepositoryPublish {
    /// Kind identifier
    pub const KIND: &'static str = "publish";

    /// Publish into the configured group
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish into `group`
    pub fn group(&mut self, group: impl Into<String>) -> &mut Self {
        self.group = Some(group.into());
        self
    }

    /// Registry factory
    pub fn from_args(args: &StepArgs) -> Result<Box<dyn Step>> {
        args.at_most(Self::KIND, 1)?;
        let mut step = Self::new();
        if let Some(group) = args.get(0) {
            step.group(group);
        }
        Ok(Box::new(step))
    }

    fn artifacts(&self, ctx: &StepContext) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for pattern in &ctx.config().publish.artifacts {
            let pattern = pattern
                .replace("{name}", ctx.release.name())
                .replace("{version}", ctx.release.version());
            let full = ctx.resolve_path(&pattern);
            let full = full.to_string_lossy();

            let paths = glob::glob(&full).map_err(|e| ConfigError::InvalidValue {
                field: "publish.artifacts".to_string(),
                message: format!("{}: {}", pattern, e),
            })?;
            for path in paths.flatten() {
                if path.is_file() {
                    debug!(path = %path.display(), "found artifact");
                    files.push(path);
                }
            }
        }

        files.sort();
        files.dedup();
        if files.is_empty() {
            return Err(PublishError::MissingArtifact(
                ctx.config().publish.artifacts.join(", "),
            )
            .into());
        }
        Ok(files)
    }
}

impl Step for RepositoryPublish {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn describe(&self) -> String {
        match &self.resolved {
            Some(group) => format!("publish to {}", group),
            None => "publish".to_string(),
        }
    }

    fn prepare(&mut self, ctx: &mut StepContext) -> Result<()> {
        let group = self
            .group
            .clone()
            .or_else(|| ctx.config().publish.forge.group.clone())
            .unwrap_or_else(|| ctx.release.name().to_string());

        let forge = ctx.forge()?;
        forge.authenticate()?;
        if !forge.knows_group(&group) {
            return Err(PublishError::UnknownGroup {
                service: forge.service().to_string(),
                group,
            }
            .into());
        }
        ctx.release.require_version()?;
        self.resolved = Some(group);
        Ok(())
    }

    fn run(&mut self, ctx: &mut StepContext) -> Result<()> {
        let group = self
            .resolved
            .clone()
            .ok_or_else(|| not_prepared(Self::KIND))?;
        let files = self.artifacts(ctx)?;
        let release = ctx.release.release_info();

        let forge = ctx.forge()?;
        forge.ensure_package(&group, &release.name)?;
        forge.add_release(&group, &release, &files)?;
        forge.post_news(
            &group,
            &format!("{} {} released.", release.name, release.version),
            &release.description,
        )?;
        info!(
            service = forge.service(),
            %group,
            files = files.len(),
            "published release"
        );
        Ok(())
    }
}
