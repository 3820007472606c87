use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use changeset_core::{BumpType, Changeset, DependencyKind, Package, PackageRelease};
use changeset_manifest::ManifestPatch;
use changeset_project::{Config, PreState};
use changeset_workspace::{Workspace, WorkspaceKind};

use crate::Result;
use crate::traits::{
    ChangesetReader, ChangesetRemover, ConfigLoader, ManifestWriter, PreStateIO,
    WorkspaceProvider,
};

pub struct MockWorkspaceProvider {
    workspace: Workspace,
}

impl MockWorkspaceProvider {
    #[must_use]
    pub fn new(packages: Vec<Package>) -> Self {
        Self {
            workspace: Workspace {
                root: PathBuf::from("/mock/workspace"),
                kind: WorkspaceKind::Npm,
                packages,
            },
        }
    }

    /// # Panics
    ///
    /// Panics if any version string is not valid semver.
    #[must_use]
    pub fn packages(packages: &[(&str, &str)]) -> Self {
        Self::new(
            packages
                .iter()
                .map(|(name, version)| make_package(name, version))
                .collect(),
        )
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.workspace.root
    }
}

impl WorkspaceProvider for MockWorkspaceProvider {
    fn discover(&self, _start_path: &Path) -> Result<Workspace> {
        Ok(self.workspace.clone())
    }
}

/// In-memory changeset directory. Removal drops the changeset from later reads.
pub struct MockChangesetStore {
    changesets: RwLock<Vec<Changeset>>,
    removed: Mutex<Vec<String>>,
}

impl MockChangesetStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            changesets: RwLock::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
        }
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_changeset(self, changeset: Changeset) -> Self {
        self.changesets
            .write()
            .expect("lock poisoned")
            .push(changeset);
        self
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().expect("lock poisoned").clone()
    }
}

impl Default for MockChangesetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangesetReader for MockChangesetStore {
    fn read_changesets(&self, _changeset_dir: &Path) -> Result<Vec<Changeset>> {
        let mut changesets = self.changesets.read().expect("lock poisoned").clone();
        changesets.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(changesets)
    }
}

impl ChangesetRemover for MockChangesetStore {
    fn remove_changeset(&self, _changeset_dir: &Path, id: &str) -> Result<()> {
        self.changesets
            .write()
            .expect("lock poisoned")
            .retain(|c| c.id != id);
        self.removed
            .lock()
            .expect("lock poisoned")
            .push(id.to_string());
        Ok(())
    }
}

impl ChangesetReader for Arc<MockChangesetStore> {
    fn read_changesets(&self, changeset_dir: &Path) -> Result<Vec<Changeset>> {
        (**self).read_changesets(changeset_dir)
    }
}

impl ChangesetRemover for Arc<MockChangesetStore> {
    fn remove_changeset(&self, changeset_dir: &Path, id: &str) -> Result<()> {
        (**self).remove_changeset(changeset_dir, id)
    }
}

#[derive(Default)]
pub struct MockConfigLoader {
    config: Config,
}

impl MockConfigLoader {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for MockConfigLoader {
    fn load_config(&self, _root: &Path) -> Result<Config> {
        Ok(self.config.clone())
    }
}

pub struct MockPreStateIO {
    state: RwLock<Option<PreState>>,
}

impl MockPreStateIO {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(None),
        }
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_state(self, state: PreState) -> Self {
        *self.state.write().expect("lock poisoned") = Some(state);
        self
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn state(&self) -> Option<PreState> {
        self.state.read().expect("lock poisoned").clone()
    }
}

impl Default for MockPreStateIO {
    fn default() -> Self {
        Self::new()
    }
}

impl PreStateIO for MockPreStateIO {
    fn load(&self, _root: &Path) -> Result<Option<PreState>> {
        Ok(self.state.read().expect("lock poisoned").clone())
    }

    fn save(&self, _root: &Path, state: &PreState) -> Result<()> {
        *self.state.write().expect("lock poisoned") = Some(state.clone());
        Ok(())
    }

    fn remove(&self, _root: &Path) -> Result<bool> {
        Ok(self.state.write().expect("lock poisoned").take().is_some())
    }
}

impl PreStateIO for Arc<MockPreStateIO> {
    fn load(&self, root: &Path) -> Result<Option<PreState>> {
        (**self).load(root)
    }

    fn save(&self, root: &Path, state: &PreState) -> Result<()> {
        (**self).save(root, state)
    }

    fn remove(&self, root: &Path) -> Result<bool> {
        (**self).remove(root)
    }
}

pub struct MockManifestWriter {
    applied: Mutex<Vec<(PathBuf, ManifestPatch)>>,
}

impl MockManifestWriter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            applied: Mutex::new(Vec::new()),
        }
    }

    /// Applied patches, sorted by package directory.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn applied(&self) -> Vec<(PathBuf, ManifestPatch)> {
        let mut applied = self.applied.lock().expect("lock poisoned").clone();
        applied.sort_by(|(a, _), (b, _)| a.cmp(b));
        applied
    }
}

impl Default for MockManifestWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestWriter for MockManifestWriter {
    fn apply(&self, package_dir: &Path, patch: &ManifestPatch) -> Result<bool> {
        if patch.is_empty() {
            return Ok(false);
        }
        self.applied
            .lock()
            .expect("lock poisoned")
            .push((package_dir.to_path_buf(), patch.clone()));
        Ok(true)
    }
}

impl ManifestWriter for Arc<MockManifestWriter> {
    fn apply(&self, package_dir: &Path, patch: &ManifestPatch) -> Result<bool> {
        (**self).apply(package_dir, patch)
    }
}

/// # Panics
///
/// Panics if the version string is not valid semver.
#[must_use]
pub fn make_package(name: &str, version: &str) -> Package {
    Package::new(
        name,
        version.parse().expect("valid version"),
        format!("/mock/workspace/packages/{name}"),
    )
}

/// # Panics
///
/// Panics if the version string is not valid semver.
#[must_use]
pub fn make_dependent(name: &str, version: &str, kind: DependencyKind, on: &str, range: &str) -> Package {
    make_package(name, version).with_dependency(kind, on, range)
}

#[must_use]
pub fn make_changeset(id: &str, releases: &[(&str, BumpType)]) -> Changeset {
    Changeset {
        id: id.to_string(),
        summary: format!("Changes from {id}"),
        releases: releases
            .iter()
            .map(|(name, bump_type)| PackageRelease {
                name: (*name).to_string(),
                bump_type: *bump_type,
            })
            .collect(),
    }
}
