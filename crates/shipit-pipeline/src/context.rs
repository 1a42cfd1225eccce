//! Capabilities handed to every step

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use shipit_core::config::Config;
use shipit_core::{ReleaseContext, Result, ToolCommand};
use shipit_publish::{CredentialProvider, FeedPoster, HttpFeed, HttpForge, PackageForge};
use shipit_vc::{VcBackend, VcResolver};

use crate::prompt::{AssumeYes, LinePrompt, Prompt};
use crate::sandbox::{DryBackend, RecordedAction, Recorder, RecordingFeed, RecordingForge};

/// Everything a step may touch during prepare and run.
///
/// The VC backend and publish clients are created on first use and then
/// reused for the rest of the run. While a rehearsal is active every mutating
/// capability records instead of acting.
pub struct StepContext {
    /// Release metadata shared by every step
    pub release: ReleaseContext,
    root: PathBuf,
    config: Config,
    resolver: VcResolver,
    vc: Option<Arc<dyn VcBackend>>,
    feed: Option<Arc<dyn FeedPoster>>,
    forge: Option<Arc<dyn PackageForge>>,
    credentials: CredentialProvider,
    prompt: Box<dyn Prompt + Send>,
    sandbox: Option<Arc<Recorder>>,
}

impl StepContext {
    /// Context for the project at `root`
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        let prompt: Box<dyn Prompt + Send> = if config.confirm.assume_yes {
            Box::new(AssumeYes)
        } else {
            Box::new(LinePrompt::stdio())
        };

        Self {
            release: ReleaseContext::from_config(&config.package),
            root: root.into(),
            resolver: VcResolver::from_config(&config.vc),
            config,
            vc: None,
            feed: None,
            forge: None,
            credentials: CredentialProvider::new(),
            prompt,
            sandbox: None,
        }
    }

    /// Use a specific backend instead of resolving one
    pub fn with_vc(mut self, backend: Arc<dyn VcBackend>) -> Self {
        self.vc = Some(backend);
        self
    }

    /// Use a specific resolver
    pub fn with_resolver(mut self, resolver: VcResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Use a specific feed poster
    pub fn with_feed(mut self, feed: Arc<dyn FeedPoster>) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Use a specific package forge
    pub fn with_forge(mut self, forge: Arc<dyn PackageForge>) -> Self {
        self.forge = Some(forge);
        self
    }

    /// Use a specific credential provider
    pub fn with_credentials(mut self, credentials: CredentialProvider) -> Self {
        self.credentials = credentials;
        self
    }

    /// Use a specific prompt
    pub fn with_prompt(mut self, prompt: impl Prompt + Send + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    /// Replace the release metadata
    pub fn with_release(mut self, release: ReleaseContext) -> Self {
        self.release = release;
        self
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loaded configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `path` relative to the project root (absolute paths are kept)
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Whether a rehearsal is active
    pub fn is_rehearsal(&self) -> bool {
        self.sandbox.is_some()
    }

    /// The version-control backend, resolved on first use
    pub fn vc(&mut self) -> Result<Arc<dyn VcBackend>> {
        let backend = match &self.vc {
            Some(backend) => Arc::clone(backend),
            None => {
                let backend = self.resolver.resolve(&self.root)?;
                self.vc = Some(Arc::clone(&backend));
                backend
            }
        };

        Ok(match &self.sandbox {
            Some(recorder) => Arc::new(DryBackend::new(backend, Arc::clone(recorder))),
            None => backend,
        })
    }

    /// The status feed from `[publish.feed]`, created on first use
    pub fn feed(&mut self) -> Result<Arc<dyn FeedPoster>> {
        let feed = match &self.feed {
            Some(feed) => Arc::clone(feed),
            None => {
                let config = &self.config.publish.feed;
                let credential = self.credentials.get(&config.service)?;
                let feed: Arc<dyn FeedPoster> = Arc::new(HttpFeed::new(config, credential)?);
                self.feed = Some(Arc::clone(&feed));
                feed
            }
        };

        Ok(match &self.sandbox {
            Some(recorder) => Arc::new(RecordingFeed::new(feed, Arc::clone(recorder))),
            None => feed,
        })
    }

    /// The package forge from `[publish.forge]`, created on first use
    pub fn forge(&mut self) -> Result<Arc<dyn PackageForge>> {
        let forge = match &self.forge {
            Some(forge) => Arc::clone(forge),
            None => {
                let config = &self.config.publish.forge;
                let credential = self.credentials.get(&config.service)?;
                let forge: Arc<dyn PackageForge> = Arc::new(HttpForge::new(config, credential)?);
                self.forge = Some(Arc::clone(&forge));
                forge
            }
        };

        Ok(match &self.sandbox {
            Some(recorder) => Arc::new(RecordingForge::new(forge, Arc::clone(recorder))),
            None => forge,
        })
    }

    /// Ask the operator a yes/no question
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        self.prompt.confirm(question)
    }

    /// Read a project file
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<String> {
        Ok(std::fs::read_to_string(self.resolve_path(path))?)
    }

    /// Write a project file
    pub fn write_file(&self, path: impl AsRef<Path>, contents: &str) -> Result<()> {
        let path = self.resolve_path(path);
        if let Some(recorder) = &self.sandbox {
            recorder.record(RecordedAction::WriteFile {
                path,
                bytes: contents.len(),
            });
            return Ok(());
        }

        std::fs::write(&path, contents)?;
        info!(path = %path.display(), "wrote file");
        Ok(())
    }

    /// Run a named task command, failing on non-zero exit
    pub fn run_task(&self, name: &str, command: ToolCommand) -> Result<()> {
        if let Some(recorder) = &self.sandbox {
            recorder.record(RecordedAction::RunTask {
                name: name.to_string(),
                command: command.display(),
            });
            return Ok(());
        }

        info!(task = name, command = %command.display(), "running task");
        let output = command.output()?;
        for line in output.stdout.lines() {
            debug!(task = name, "{}", line);
        }
        Ok(())
    }

    pub(crate) fn enter_sandbox(&mut self, recorder: Arc<Recorder>) {
        self.sandbox = Some(recorder);
    }

    pub(crate) fn leave_sandbox(&mut self) {
        self.sandbox = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipit_core::config::PackageConfig;
    use shipit_core::{ShipitError, VcError};
    use tempfile::TempDir;

    fn config() -> Config {
        Config {
            package: PackageConfig {
                name: "demo".to_string(),
                version: "1.0.0".to_string(),
                description: "a demo".to_string(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_release_from_config() {
        let ctx = StepContext::new("/tmp", config());
        assert_eq!(ctx.release.name(), "demo");
        assert_eq!(ctx.release.version(), "1.0.0");
        assert_eq!(ctx.resolve_path("VERSION"), PathBuf::from("/tmp/VERSION"));
    }

    #[test]
    fn test_vc_resolution_is_cached() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        let mut ctx = StepContext::new(temp.path(), config());

        let first = ctx.vc().unwrap();
        std::fs::remove_dir(temp.path().join(".git")).unwrap();
        let second = ctx.vc().unwrap();
        assert_eq!(first.name(), "git");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_vc_resolution_failure() {
        let temp = TempDir::new().unwrap();
        let mut ctx = StepContext::new(temp.path(), config());
        assert!(matches!(
            ctx.vc().err().unwrap(),
            ShipitError::Vc(VcError::NoBackendDetected(_))
        ));
    }

    #[test]
    fn test_sandbox_records_writes() {
        let temp = TempDir::new().unwrap();
        let mut ctx = StepContext::new(temp.path(), config());
        let recorder = Arc::new(Recorder::default());

        ctx.enter_sandbox(Arc::clone(&recorder));
        assert!(ctx.is_rehearsal());
        ctx.write_file("VERSION", "VERS = '1.0.1'").unwrap();
        ctx.run_task("build", ToolCommand::shell("exit 1")).unwrap();
        ctx.leave_sandbox();

        assert!(!temp.path().join("VERSION").exists());
        assert_eq!(recorder.actions().len(), 2);

        ctx.write_file("VERSION", "VERS = '1.0.1'").unwrap();
        assert_eq!(ctx.read_file("VERSION").unwrap(), "VERS = '1.0.1'");
    }

    #[test]
    fn test_feed_without_url_is_configuration_error() {
        let mut ctx = StepContext::new("/tmp", config());
        assert!(matches!(
            ctx.feed().err().unwrap(),
            ShipitError::Publish(shipit_publish::PublishError::Configuration(_))
        ));
    }
}
