use changeset_core::{BumpType, Changeset};
use changeset_manifest::ReleasedVersion;
use changeset_project::PreState;
use indexmap::IndexMap;
use semver::Version;

/// A package release with its computed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComprehensiveRelease {
    pub name: String,
    pub bump_type: BumpType,
    pub old_version: Version,
    pub new_version: Version,
    pub changeset_ids: Vec<String>,
}

/// Changeset entries for a package that no longer exists in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedRelease {
    pub name: String,
    pub changeset_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePlan {
    pub changesets: Vec<Changeset>,
    /// In workspace package order.
    pub releases: Vec<ComprehensiveRelease>,
    pub deleted: Vec<DeletedRelease>,
    /// State to persist after applying the plan. `None` when no session is
    /// active or the session is being exited.
    pub pre_state: Option<PreState>,
}

impl ReleasePlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    #[must_use]
    pub fn release(&self, name: &str) -> Option<&ComprehensiveRelease> {
        self.releases.iter().find(|r| r.name == name)
    }

    /// Releases that change a version, skipping `none` entries.
    pub fn versioned(&self) -> impl Iterator<Item = &ComprehensiveRelease> {
        self.releases.iter().filter(|r| r.bump_type.is_release())
    }

    /// Per-package outcome keyed by name, as consumed by manifest patching.
    #[must_use]
    pub fn released_versions(&self) -> IndexMap<String, ReleasedVersion> {
        self.releases
            .iter()
            .map(|r| {
                (
                    r.name.clone(),
                    ReleasedVersion {
                        bump_type: r.bump_type,
                        old_version: r.old_version.clone(),
                        new_version: r.new_version.clone(),
                    },
                )
            })
            .collect()
    }
}
