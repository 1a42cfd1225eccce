//! Bump the version token in a project file

use std::path::PathBuf;

use tracing::info;

use shipit_core::config::DEFAULT_VERSION_FILE;
use shipit_core::{Result, VersionError, VersionSplice};

use crate::context::StepContext;
use crate::step::{not_prepared, Step, StepArgs};

/// `change_version [file] [ident]`
///
/// Prepare reads the file, locates the version token, checks it against the
/// configured package version and advances the release version to the
/// successor. The file itself is only written by run.
pub struct ChangeVersion {
    file: PathBuf,
    ident: Option<String>,
    splice: Option<VersionSplice>,
}

impl ChangeVersion {
    /// Kind identifier
    pub const KIND: &'static str = "change_version";

    /// Step editing `file`
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            ident: None,
            splice: None,
        }
    }

    /// Identifier the token is assigned to (default: `VERS` or `VERSION`)
    pub fn ident(&mut self, ident: impl Into<String>) -> &mut Self {
        self.ident = Some(ident.into());
        self
    }

    /// Splice computed by prepare
    pub fn splice(&self) -> Option<&VersionSplice> {
        self.splice.as_ref()
    }

    /// Registry factory
    pub fn from_args(args: &StepArgs) -> Result<Box<dyn Step>> {
        args.at_most(Self::KIND, 2)?;
        let mut step = Self::new(args.get(0).unwrap_or(DEFAULT_VERSION_FILE));
        if let Some(ident) = args.get(1) {
            step.ident(ident);
        }
        Ok(Box::new(step))
    }
}

impl Step for ChangeVersion {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn describe(&self) -> String {
        match &self.splice {
            Some(s) => format!(
                "change version in {} ({} -> {})",
                self.file.display(),
                s.current,
                s.next
            ),
            None => format!("change version in {}", self.file.display()),
        }
    }

    fn prepare(&mut self, ctx: &mut StepContext) -> Result<()> {
        let path = ctx.resolve_path(&self.file);
        let splice = VersionSplice::read(&path, self.ident.as_deref())?;

        let configured = ctx.release.version();
        if !configured.is_empty() && configured != splice.current {
            return Err(VersionError::VersionMismatch {
                path,
                configured: configured.to_string(),
                found: splice.current.clone(),
            }
            .into());
        }

        info!(
            file = %self.file.display(),
            current = %splice.current,
            next = %splice.next,
            "found version string"
        );
        ctx.release.advance_version(splice.next.clone())?;
        self.splice = Some(splice);
        Ok(())
    }

    fn run(&mut self, ctx: &mut StepContext) -> Result<()> {
        let label = self.describe();
        let splice = self.splice.as_ref().ok_or_else(|| not_prepared(label))?;

        let content = ctx.read_file(&splice.path)?;
        splice.verify_unchanged(&content)?;
        ctx.write_file(&splice.path, &splice.spliced())?;
        info!(file = %self.file.display(), version = %splice.next, "changed version");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::test_support::{config, context, FakeBackend};
    use shipit_core::ShipitError;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn project(content: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("VERSION"), content).unwrap();
        temp
    }

    #[test]
    fn test_prepare_advances_without_writing() {
        let temp = project("VERS = \"1.2.3\"\n");
        let mut ctx = context(temp.path(), config(""), Arc::default());
        let mut step = ChangeVersion::new("VERSION");

        step.prepare(&mut ctx).unwrap();
        assert_eq!(ctx.release.version(), "1.2.4");
        assert_eq!(
            std::fs::read_to_string(temp.path().join("VERSION")).unwrap(),
            "VERS = \"1.2.3\"\n"
        );
        assert_eq!(step.describe(), "change version in VERSION (1.2.3 -> 1.2.4)");

        step.run(&mut ctx).unwrap();
        assert_eq!(
            std::fs::read_to_string(temp.path().join("VERSION")).unwrap(),
            "VERS = \"1.2.4\"\n"
        );
    }

    #[test]
    fn test_version_not_found() {
        let temp = project("no version here\n");
        let mut ctx = context(temp.path(), config(""), Arc::default());
        let err = ChangeVersion::new("VERSION").prepare(&mut ctx).unwrap_err();
        assert!(matches!(
            err,
            ShipitError::Version(VersionError::VersionStringNotFound(_))
        ));
        assert_eq!(ctx.release.version(), "");
    }

    #[test]
    fn test_configured_version_must_match() {
        let temp = project("VERSION = '2.0.0'");
        let mut ctx = context(temp.path(), config("1.9.0"), Arc::<FakeBackend>::default());
        let err = ChangeVersion::new("VERSION").prepare(&mut ctx).unwrap_err();
        assert!(matches!(
            err,
            ShipitError::Version(VersionError::VersionMismatch { .. })
        ));

        let mut ctx = context(temp.path(), config("2.0.0"), Arc::default());
        ChangeVersion::new("VERSION").prepare(&mut ctx).unwrap();
        assert_eq!(ctx.release.version(), "2.0.1");
    }

    #[test]
    fn test_custom_ident() {
        let temp = project("VERS = '0.0.1'\nAPP = '4.5.6'\n");
        let mut ctx = context(temp.path(), config(""), Arc::default());
        let mut step = ChangeVersion::new("VERSION");
        step.ident("APP");
        step.prepare(&mut ctx).unwrap();
        step.run(&mut ctx).unwrap();
        assert_eq!(
            std::fs::read_to_string(temp.path().join("VERSION")).unwrap(),
            "VERS = '0.0.1'\nAPP = '4.5.7'\n"
        );
    }

    #[test]
    fn test_run_refuses_changed_file() {
        let temp = project("VERS = '1.0.0'");
        let mut ctx = context(temp.path(), config(""), Arc::default());
        let mut step = ChangeVersion::new("VERSION");
        step.prepare(&mut ctx).unwrap();

        std::fs::write(temp.path().join("VERSION"), "VERS = '1.0.0' # edited").unwrap();
        let err = step.run(&mut ctx).unwrap_err();
        assert!(matches!(
            err,
            ShipitError::Version(VersionError::FileChangedSincePrepare(_))
        ));
    }

    #[test]
    fn test_second_bump_is_rejected() {
        let temp = project("VERS = '1.0.0'");
        let mut ctx = context(temp.path(), config(""), Arc::default());
        ChangeVersion::new("VERSION").prepare(&mut ctx).unwrap();
        let err = ChangeVersion::new("VERSION").prepare(&mut ctx).unwrap_err();
        assert!(matches!(
            err,
            ShipitError::Version(VersionError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_from_args() {
        assert!(ChangeVersion::from_args(&StepArgs::none()).is_ok());
        assert!(ChangeVersion::from_args(&StepArgs::from(["lib/version.rb", "VERSION"])).is_ok());
        assert!(ChangeVersion::from_args(&StepArgs::from(["a", "b", "c"])).is_err());
    }
}
