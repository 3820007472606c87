use std::path::Path;

use changeset_core::{DependencyKind, Package};
use indexmap::IndexMap;
use semver::Version;
use serde::Deserialize;

use crate::error::WorkspaceError;

pub const MANIFEST_FILE: &str = "package.json";

/// The subset of `package.json` that release planning reads.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub private: bool,
    pub workspaces: Option<WorkspacesField>,
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub peer_dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub optional_dependencies: IndexMap<String, String>,
}

/// `workspaces` is either a pattern list or `{ "packages": [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WorkspacesField {
    Patterns(Vec<String>),
    Object {
        #[serde(default)]
        packages: Vec<String>,
    },
}

impl WorkspacesField {
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        match self {
            Self::Patterns(patterns) | Self::Object { packages: patterns } => patterns,
        }
    }
}

impl PackageJson {
    fn block(&mut self, kind: DependencyKind) -> IndexMap<String, String> {
        std::mem::take(match kind {
            DependencyKind::Dependencies => &mut self.dependencies,
            DependencyKind::DevDependencies => &mut self.dev_dependencies,
            DependencyKind::PeerDependencies => &mut self.peer_dependencies,
            DependencyKind::OptionalDependencies => &mut self.optional_dependencies,
        })
    }

    /// Converts into a [`Package`] rooted at `dir`. Private packages without a
    /// version are treated as `0.0.0`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is missing, or the version is missing on a
    /// public package or is not valid semver.
    pub fn into_package(mut self, dir: &Path) -> Result<Package, WorkspaceError> {
        let manifest_path = dir.join(MANIFEST_FILE);

        let name = self.name.take().ok_or_else(|| WorkspaceError::MissingField {
            path: manifest_path.clone(),
            field: "name",
        })?;

        let version = match self.version.take() {
            Some(raw) => {
                Version::parse(&raw).map_err(|source| WorkspaceError::InvalidVersion {
                    path: manifest_path.clone(),
                    version: raw,
                    source,
                })?
            }
            None if self.private => Version::new(0, 0, 0),
            None => {
                return Err(WorkspaceError::MissingField {
                    path: manifest_path,
                    field: "version",
                });
            }
        };

        let mut dependencies = IndexMap::new();
        for kind in DependencyKind::ALL {
            let block = self.block(kind);
            if !block.is_empty() {
                dependencies.insert(kind, block);
            }
        }

        Ok(Package {
            name,
            version,
            private: self.private,
            dependencies,
            dir: dir.to_path_buf(),
        })
    }
}

pub(crate) fn read_manifest(path: &Path) -> Result<PackageJson, WorkspaceError> {
    let content = std::fs::read_to_string(path).map_err(|source| WorkspaceError::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| WorkspaceError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the package whose `package.json` lives in `dir`.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read, parsed, or converted.
pub fn read_package(dir: &Path) -> Result<Package, WorkspaceError> {
    read_manifest(&dir.join(MANIFEST_FILE))?.into_package(dir)
}
