//! Recording capabilities for rehearsals
//!
//! During a rehearsal every capability a step can reach through its
//! [`StepContext`](crate::StepContext) is wrapped: reads are forwarded to the
//! real collaborator, mutations are appended to a shared [`Recorder`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use shipit_core::Result;
use shipit_publish::{FeedPoster, PackageForge, ReleaseInfo};
use shipit_vc::{commit_message, tag_message, TreeStatus, VcBackend};

/// A side effect a rehearsal did not perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RecordedAction {
    /// `VcBackend::commit`
    Commit { backend: String, message: String },
    /// `VcBackend::tag_version`
    Tag {
        backend: String,
        tag: String,
        message: String,
    },
    /// File write
    WriteFile { path: PathBuf, bytes: usize },
    /// Task command
    RunTask { name: String, command: String },
    /// `FeedPoster::post_status`
    PostStatus { service: String, message: String },
    /// `PackageForge::ensure_package`
    EnsurePackage { group: String, package: String },
    /// `PackageForge::add_release`
    AddRelease {
        group: String,
        package: String,
        version: String,
        files: Vec<PathBuf>,
    },
    /// `PackageForge::post_news`
    PostNews { group: String, subject: String },
}

impl fmt::Display for RecordedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Commit { backend, message } => write!(f, "{} commit: {}", backend, message),
            Self::Tag { backend, tag, .. } => write!(f, "{} tag {}", backend, tag),
            Self::WriteFile { path, bytes } => {
                write!(f, "write {} ({} bytes)", path.display(), bytes)
            }
            Self::RunTask { name, command } => write!(f, "task {}: {}", name, command),
            Self::PostStatus { service, message } => write!(f, "post to {}: {}", service, message),
            Self::EnsurePackage { group, package } => {
                write!(f, "ensure package {}/{}", group, package)
            }
            Self::AddRelease {
                group,
                package,
                version,
                files,
            } => write!(
                f,
                "release {}/{} {} ({} files)",
                group,
                package,
                version,
                files.len()
            ),
            Self::PostNews { group, subject } => write!(f, "news in {}: {}", group, subject),
        }
    }
}

/// Shared log of recorded actions
#[derive(Debug, Default)]
pub struct Recorder {
    actions: Mutex<Vec<RecordedAction>>,
}

impl Recorder {
    /// Append an action
    pub fn record(&self, action: RecordedAction) {
        tracing::info!(%action, "rehearsal recorded");
        self.lock().push(action);
    }

    /// Snapshot of the recorded actions
    pub fn actions(&self) -> Vec<RecordedAction> {
        self.lock().clone()
    }

    /// Drain the recorded actions
    pub fn take(&self) -> Vec<RecordedAction> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<RecordedAction>> {
        self.actions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Backend wrapper that records commits and tags
pub struct DryBackend {
    inner: Arc<dyn VcBackend>,
    recorder: Arc<Recorder>,
}

impl DryBackend {
    /// Wrap `inner`
    pub fn new(inner: Arc<dyn VcBackend>, recorder: Arc<Recorder>) -> Self {
        Self { inner, recorder }
    }
}

impl VcBackend for DryBackend {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn root(&self) -> &Path {
        self.inner.root()
    }

    fn precommit(&self) -> Result<TreeStatus> {
        self.inner.precommit()
    }

    fn commit(&self, message: Option<&str>, version: &str) -> Result<()> {
        self.recorder.record(RecordedAction::Commit {
            backend: self.inner.name().to_string(),
            message: commit_message(message, version),
        });
        Ok(())
    }

    fn exists_tagged_version(&self, version: &str) -> Result<bool> {
        self.inner.exists_tagged_version(version)
    }

    fn tag_version(&self, version: &str, message: Option<&str>) -> Result<()> {
        self.recorder.record(RecordedAction::Tag {
            backend: self.inner.name().to_string(),
            tag: version.to_string(),
            message: tag_message(message, version),
        });
        Ok(())
    }

    fn local_diff(&self, file: &Path) -> Result<String> {
        self.inner.local_diff(file)
    }

    fn are_local_diffs(&self, version: &str) -> Result<bool> {
        self.inner.are_local_diffs(version)
    }
}

/// Feed wrapper that records posts
pub struct RecordingFeed {
    inner: Arc<dyn FeedPoster>,
    recorder: Arc<Recorder>,
}

impl RecordingFeed {
    /// Wrap `inner`
    pub fn new(inner: Arc<dyn FeedPoster>, recorder: Arc<Recorder>) -> Self {
        Self { inner, recorder }
    }
}

impl FeedPoster for RecordingFeed {
    fn service(&self) -> &str {
        self.inner.service()
    }

    fn authenticate(&self) -> shipit_publish::Result<()> {
        self.inner.authenticate()
    }

    fn post_status(&self, message: &str) -> shipit_publish::Result<()> {
        self.recorder.record(RecordedAction::PostStatus {
            service: self.inner.service().to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

/// Forge wrapper that records uploads and news
pub struct RecordingForge {
    inner: Arc<dyn PackageForge>,
    recorder: Arc<Recorder>,
}

impl RecordingForge {
    /// Wrap `inner`
    pub fn new(inner: Arc<dyn PackageForge>, recorder: Arc<Recorder>) -> Self {
        Self { inner, recorder }
    }
}

impl PackageForge for RecordingForge {
    fn service(&self) -> &str {
        self.inner.service()
    }

    fn authenticate(&self) -> shipit_publish::Result<()> {
        self.inner.authenticate()
    }

    fn knows_group(&self, group: &str) -> bool {
        self.inner.knows_group(group)
    }

    fn ensure_package(&self, group: &str, package: &str) -> shipit_publish::Result<()> {
        self.recorder.record(RecordedAction::EnsurePackage {
            group: group.to_string(),
            package: package.to_string(),
        });
        Ok(())
    }

    fn add_release(
        &self,
        group: &str,
        release: &ReleaseInfo,
        files: &[PathBuf],
    ) -> shipit_publish::Result<()> {
        self.recorder.record(RecordedAction::AddRelease {
            group: group.to_string(),
            package: release.name.clone(),
            version: release.version.clone(),
            files: files.to_vec(),
        });
        Ok(())
    }

    fn post_news(&self, group: &str, subject: &str, _body: &str) -> shipit_publish::Result<()> {
        self.recorder.record(RecordedAction::PostNews {
            group: group.to_string(),
            subject: subject.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipit_vc::GitBackend;

    #[test]
    fn test_dry_backend_records_mutations() {
        let recorder = Arc::new(Recorder::default());
        let backend = DryBackend::new(Arc::new(GitBackend::new("/nonexistent")), recorder.clone());

        backend.commit(None, "1.2.4").unwrap();
        backend.tag_version("1.2.4", Some("Release 1.2.4")).unwrap();

        assert_eq!(
            recorder.actions(),
            vec![
                RecordedAction::Commit {
                    backend: "git".to_string(),
                    message: "Release 1.2.4".to_string(),
                },
                RecordedAction::Tag {
                    backend: "git".to_string(),
                    tag: "1.2.4".to_string(),
                    message: "Release 1.2.4".to_string(),
                },
            ]
        );
        assert_eq!(backend.name(), "git");
    }

    #[test]
    fn test_take_drains() {
        let recorder = Recorder::default();
        recorder.record(RecordedAction::WriteFile {
            path: PathBuf::from("VERSION"),
            bytes: 14,
        });
        assert_eq!(recorder.take().len(), 1);
        assert!(recorder.actions().is_empty());
    }

    #[test]
    fn test_action_display_and_json() {
        let action = RecordedAction::RunTask {
            name: "build".to_string(),
            command: "sh -c make".to_string(),
        };
        assert_eq!(action.to_string(), "task build: sh -c make");
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], "run_task");
        assert_eq!(json["name"], "build");
    }
}
