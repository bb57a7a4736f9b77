//! Source artifacts backing a template, and the store they are read from.
//!
//! A template is backed by zero (in-memory text), one, or several artifacts.
//! All of them live in one [`ArtifactSet`], so naming, refresh and the
//! staleness probe are written once for every case.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{PoolError, PoolResult};

/// Read access to wherever template sources live.
pub trait ArtifactStore: fmt::Debug + Send + Sync {
    /// Current modification time of the artifact at `path`.
    fn modified(&self, path: &Path) -> std::io::Result<SystemTime>;

    /// Full text of the artifact at `path`.
    fn read(&self, path: &Path) -> std::io::Result<String>;
}

/// [`ArtifactStore`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl ArtifactStore for FsStore {
    fn modified(&self, path: &Path) -> std::io::Result<SystemTime> {
        std::fs::metadata(path)?.modified()
    }

    fn read(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// One source file and the modification time seen when it was last loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub last_observed_mod_time: Option<SystemTime>,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_observed_mod_time: None,
        }
    }

    /// Base filename, which is also the name the source is registered under
    /// inside its executable.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Ordered artifacts backing one template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    /// Set with no backing files, for templates registered from text.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self {
            artifacts: vec![Artifact::new(path)],
        }
    }

    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            artifacts: paths.into_iter().map(Artifact::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }

    /// Base filename of the first artifact, or empty for an empty set.
    pub fn primary_name(&self) -> String {
        self.artifacts
            .first()
            .map(Artifact::file_name)
            .unwrap_or_default()
    }

    /// Artifact paths in registration order.
    pub fn paths(&self) -> Vec<&Path> {
        self.artifacts.iter().map(|a| a.path.as_path()).collect()
    }

    /// Record every artifact's current modification time.
    ///
    /// Stops at the first artifact that cannot be stat'ed.
    pub fn refresh_mod_times(&mut self, store: &dyn ArtifactStore) -> PoolResult<()> {
        for artifact in &mut self.artifacts {
            let modified = store
                .modified(&artifact.path)
                .map_err(|e| PoolError::unavailable(&artifact.path, e))?;
            artifact.last_observed_mod_time = Some(modified);
        }
        Ok(())
    }

    /// True iff any artifact's current modification time is strictly after `since`.
    ///
    /// Artifacts that cannot be stat'ed count as unchanged: a probe failure
    /// suppresses the reload for this check only and never fails a render.
    pub fn changed_since(&self, since: SystemTime, store: &dyn ArtifactStore) -> bool {
        self.artifacts.iter().any(|artifact| match store.modified(&artifact.path) {
            Ok(modified) => modified > since,
            Err(e) => {
                tracing::trace!(path = %artifact.path.display(), error = %e, "Skipping unreadable artifact in staleness probe");
                false
            }
        })
    }
}
