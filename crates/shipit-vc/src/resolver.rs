//! Backend resolution by marker detection

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use shipit_core::config::VcConfig;
use shipit_core::{Result, VcError};

use crate::backend::VcBackend;
use crate::git::GitBackend;
use crate::svn::SvnBackend;

/// Registered backend: a name, a marker predicate and a constructor
#[derive(Clone, Copy)]
pub struct BackendEntry {
    /// Backend name, also accepted by `[vc] backend`
    pub name: &'static str,
    /// Whether the directory is a working copy of this backend
    pub detect: fn(&Path) -> bool,
    /// Build the backend for a working copy root
    pub construct: fn(&Path) -> Arc<dyn VcBackend>,
}

const BUILTIN_BACKENDS: &[BackendEntry] = &[
    BackendEntry {
        name: "git",
        detect: GitBackend::detect,
        construct: construct_git,
    },
    BackendEntry {
        name: "svn",
        detect: SvnBackend::detect,
        construct: construct_svn,
    },
];

fn construct_git(root: &Path) -> Arc<dyn VcBackend> {
    Arc::new(GitBackend::new(root))
}

fn construct_svn(root: &Path) -> Arc<dyn VcBackend> {
    Arc::new(SvnBackend::new(root))
}

/// Picks exactly one backend for a working copy
#[derive(Clone)]
pub struct VcResolver {
    entries: Vec<BackendEntry>,
    forced: Option<String>,
}

impl VcResolver {
    /// Resolver with no backends
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            forced: None,
        }
    }

    /// Resolver with the git and subversion backends, in that order
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_BACKENDS.to_vec(),
            forced: None,
        }
    }

    /// Builtin resolver honouring `[vc] backend`
    pub fn from_config(config: &VcConfig) -> Self {
        Self::builtin().with_forced(config.backend.clone())
    }

    /// Register another backend after the existing ones
    pub fn register(&mut self, entry: BackendEntry) {
        self.entries.push(entry);
    }

    /// Skip detection and always use the named backend
    pub fn with_forced(mut self, backend: Option<String>) -> Self {
        self.forced = backend;
        self
    }

    /// Registered backend names
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    /// Names of every backend whose marker is present in `root`
    pub fn detect(&self, root: &Path) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|e| (e.detect)(root))
            .map(|e| e.name)
            .collect()
    }

    /// Resolve the backend for `root`
    #[instrument(skip(self), fields(root = %root.display()))]
    pub fn resolve(&self, root: &Path) -> Result<Arc<dyn VcBackend>> {
        if let Some(name) = &self.forced {
            let entry = self
                .entries
                .iter()
                .find(|e| e.name == name.as_str())
                .ok_or_else(|| VcError::UnknownBackend(name.clone()))?;
            info!(backend = entry.name, "using configured backend");
            return Ok((entry.construct)(root));
        }

        let matches: Vec<&BackendEntry> =
            self.entries.iter().filter(|e| (e.detect)(root)).collect();
        debug!(candidates = matches.len(), "evaluated backend markers");

        match matches.as_slice() {
            [] => Err(VcError::NoBackendDetected(root.to_path_buf()).into()),
            [entry] => {
                info!(backend = entry.name, "detected backend");
                Ok((entry.construct)(root))
            }
            many => Err(VcError::AmbiguousBackend {
                root: root.to_path_buf(),
                backends: many.iter().map(|e| e.name.to_string()).collect(),
            }
            .into()),
        }
    }
}

impl Default for VcResolver {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipit_core::ShipitError;
    use tempfile::TempDir;

    fn dir_with(markers: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for marker in markers {
            std::fs::create_dir(temp.path().join(marker)).unwrap();
        }
        temp
    }

    #[test]
    fn test_git_marker_resolves_git() {
        let temp = dir_with(&[".git"]);
        let backend = VcResolver::builtin().resolve(temp.path()).unwrap();
        assert_eq!(backend.name(), "git");
        assert_eq!(backend.root(), temp.path());
    }

    #[test]
    fn test_svn_marker_resolves_svn() {
        let temp = dir_with(&[".svn"]);
        let backend = VcResolver::builtin().resolve(temp.path()).unwrap();
        assert_eq!(backend.name(), "svn");
    }

    #[test]
    fn test_no_marker_fails() {
        let temp = dir_with(&[]);
        let err = VcResolver::builtin().resolve(temp.path()).err().unwrap();
        assert!(matches!(
            err,
            ShipitError::Vc(VcError::NoBackendDetected(_))
        ));
    }

    #[test]
    fn test_both_markers_are_ambiguous() {
        let temp = dir_with(&[".git", ".svn"]);
        let resolver = VcResolver::builtin();
        assert_eq!(resolver.detect(temp.path()), vec!["git", "svn"]);

        match resolver.resolve(temp.path()).err().unwrap() {
            ShipitError::Vc(VcError::AmbiguousBackend { backends, .. }) => {
                assert_eq!(backends, vec!["git", "svn"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_forced_backend_skips_detection() {
        let temp = dir_with(&[".git", ".svn"]);
        let resolver = VcResolver::from_config(&VcConfig {
            backend: Some("svn".to_string()),
        });
        assert_eq!(resolver.resolve(temp.path()).unwrap().name(), "svn");

        let resolver = VcResolver::builtin().with_forced(Some("hg".to_string()));
        assert!(matches!(
            resolver.resolve(temp.path()).err().unwrap(),
            ShipitError::Vc(VcError::UnknownBackend(name)) if name == "hg"
        ));
    }

    #[test]
    fn test_register_custom_backend() {
        let temp = dir_with(&[".fossil"]);
        let mut resolver = VcResolver::new();
        assert!(resolver.names().is_empty());
        resolver.register(BackendEntry {
            name: "fossil",
            detect: |root| root.join(".fossil").exists(),
            construct: |root| Arc::new(GitBackend::new(root)) as Arc<dyn VcBackend>,
        });
        assert_eq!(resolver.detect(temp.path()), vec!["fossil"]);
        assert!(resolver.resolve(temp.path()).is_ok());
    }
}
