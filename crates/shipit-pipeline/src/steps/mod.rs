//! Built-in step variants

pub mod ask;
pub mod change_version;
pub mod commit;
pub mod inline;
pub mod notify;
pub mod publish;
pub mod skip;
pub mod tag;
pub mod task;

pub use ask::Ask;
pub use change_version::ChangeVersion;
pub use commit::Commit;
pub use inline::InlineStep;
pub use notify::PublishNotify;
pub use publish::RepositoryPublish;
pub use skip::Skip;
pub use tag::Tag;
pub use task::TaskInvoke;

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use shipit_core::config::{Config, PackageConfig};
    use shipit_core::{Result, VcError};
    use shipit_publish::{FeedPoster, PackageForge, PublishError, ReleaseInfo};
    use shipit_vc::{TreeStatus, VcBackend};

    use crate::context::StepContext;
    use crate::prompt::ScriptedPrompt;

    /// In-memory backend recording every call
    #[derive(Default)]
    pub struct FakeBackend {
        pub modified: bool,
        pub untracked: Vec<String>,
        pub tags: Mutex<Vec<String>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl VcBackend for FakeBackend {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn root(&self) -> &Path {
            Path::new(".")
        }

        fn precommit(&self) -> Result<TreeStatus> {
            self.calls.lock().unwrap().push("precommit".to_string());
            if !self.untracked.is_empty() {
                Err(VcError::DirtyOrUntrackedTree(self.untracked.clone()).into())
            } else if self.modified {
                Ok(TreeStatus::Changes)
            } else {
                Ok(TreeStatus::NoChanges)
            }
        }

        fn commit(&self, message: Option<&str>, version: &str) -> Result<()> {
            self.calls.lock().unwrap().push(format!(
                "commit {}",
                shipit_vc::commit_message(message, version)
            ));
            Ok(())
        }

        fn exists_tagged_version(&self, version: &str) -> Result<bool> {
            self.calls.lock().unwrap().push(format!("exists {}", version));
            Ok(self.tags.lock().unwrap().iter().any(|t| t == version))
        }

        fn tag_version(&self, version: &str, message: Option<&str>) -> Result<()> {
            self.calls.lock().unwrap().push(format!(
                "tag {} {}",
                version,
                shipit_vc::tag_message(message, version)
            ));
            self.tags.lock().unwrap().push(version.to_string());
            Ok(())
        }

        fn local_diff(&self, _file: &Path) -> Result<String> {
            Ok(String::new())
        }

        fn are_local_diffs(&self, _version: &str) -> Result<bool> {
            Ok(false)
        }
    }

    /// Feed recording posted messages
    #[derive(Default)]
    pub struct FakeFeed {
        pub reject: bool,
        pub posts: Mutex<Vec<String>>,
    }

    impl FakeFeed {
        pub fn posts(&self) -> Vec<String> {
            self.posts.lock().unwrap().clone()
        }
    }

    impl FeedPoster for FakeFeed {
        fn service(&self) -> &str {
            "fake-feed"
        }

        fn authenticate(&self) -> shipit_publish::Result<()> {
            if self.reject {
                Err(PublishError::auth("fake-feed", "no token"))
            } else {
                Ok(())
            }
        }

        fn post_status(&self, message: &str) -> shipit_publish::Result<()> {
            self.posts.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    /// Forge recording every mutating call
    #[derive(Default)]
    pub struct FakeForge {
        pub groups: Vec<String>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeForge {
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PackageForge for FakeForge {
        fn service(&self) -> &str {
            "fake-forge"
        }

        fn authenticate(&self) -> shipit_publish::Result<()> {
            Ok(())
        }

        fn knows_group(&self, group: &str) -> bool {
            self.groups.is_empty() || self.groups.iter().any(|g| g == group)
        }

        fn ensure_package(&self, group: &str, package: &str) -> shipit_publish::Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("ensure {}/{}", group, package));
            Ok(())
        }

        fn add_release(
            &self,
            group: &str,
            release: &ReleaseInfo,
            files: &[PathBuf],
        ) -> shipit_publish::Result<()> {
            let names: Vec<String> = files
                .iter()
                .filter_map(|f| f.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .collect();
            self.calls.lock().unwrap().push(format!(
                "release {}/{} {} {}",
                group,
                release.name,
                release.version,
                names.join(" ")
            ));
            Ok(())
        }

        fn post_news(&self, group: &str, subject: &str, _body: &str) -> shipit_publish::Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("news {}: {}", group, subject));
            Ok(())
        }
    }

    pub fn config(version: &str) -> Config {
        Config {
            package: PackageConfig {
                name: "demo".to_string(),
                version: version.to_string(),
                description: "a demo".to_string(),
            },
            ..Default::default()
        }
    }

    pub fn context(root: impl Into<PathBuf>, config: Config, backend: Arc<FakeBackend>) -> StepContext {
        StepContext::new(root, config)
            .with_vc(backend)
            .with_prompt(ScriptedPrompt::default())
    }
}
