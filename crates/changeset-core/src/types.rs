use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use semver::Version;
use serde::{Deserialize, Serialize};

/// Release level of a package, totally ordered `none < patch < minor < major`.
///
/// `None` never comes from a changeset. It marks a package whose manifest is
/// rewritten (for example a dev-only dependent) without changing its version.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
    #[default]
    None,
    Patch,
    Minor,
    Major,
}

impl BumpType {
    /// Numeric level used when comparing against configured thresholds.
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Patch => 1,
            Self::Minor => 2,
            Self::Major => 3,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }

    #[must_use]
    pub fn is_release(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dependency blocks of a manifest, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyKind {
    Dependencies,
    DevDependencies,
    PeerDependencies,
    OptionalDependencies,
}

impl DependencyKind {
    pub const ALL: [Self; 4] = [
        Self::Dependencies,
        Self::DevDependencies,
        Self::PeerDependencies,
        Self::OptionalDependencies,
    ];

    /// Key of this block in `package.json`.
    #[must_use]
    pub const fn manifest_key(self) -> &'static str {
        match self {
            Self::Dependencies => "dependencies",
            Self::DevDependencies => "devDependencies",
            Self::PeerDependencies => "peerDependencies",
            Self::OptionalDependencies => "optionalDependencies",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRelease {
    pub name: String,
    pub bump_type: BumpType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changeset {
    pub id: String,
    pub summary: String,
    pub releases: Vec<PackageRelease>,
}

/// A workspace package as read from its manifest. Never mutated by planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub version: Version,
    pub private: bool,
    pub dependencies: IndexMap<DependencyKind, IndexMap<String, String>>,
    pub dir: PathBuf,
}

impl Package {
    #[must_use]
    pub fn new(name: impl Into<String>, version: Version, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            version,
            private: false,
            dependencies: IndexMap::new(),
            dir: dir.into(),
        }
    }

    #[must_use]
    pub fn with_dependency(
        mut self,
        kind: DependencyKind,
        name: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        self.dependencies
            .entry(kind)
            .or_default()
            .insert(name.into(), range.into());
        self
    }

    #[must_use]
    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    #[must_use]
    pub fn dependency_range(&self, kind: DependencyKind, name: &str) -> Option<&str> {
        self.dependencies
            .get(&kind)
            .and_then(|deps| deps.get(name))
            .map(String::as_str)
    }

    /// Every dependency block that names `dependency`, in lookup order.
    pub fn relationships_to<'a>(
        &'a self,
        dependency: &'a str,
    ) -> impl Iterator<Item = (DependencyKind, &'a str)> + 'a {
        DependencyKind::ALL
            .into_iter()
            .filter_map(move |kind| self.dependency_range(kind, dependency).map(|r| (kind, r)))
    }

    /// All declared dependencies across blocks as `(kind, name, range)`.
    pub fn all_dependencies(&self) -> impl Iterator<Item = (DependencyKind, &str, &str)> {
        DependencyKind::ALL.into_iter().flat_map(move |kind| {
            self.dependencies
                .get(&kind)
                .into_iter()
                .flat_map(move |deps| deps.iter().map(move |(n, r)| (kind, n.as_str(), r.as_str())))
        })
    }
}
