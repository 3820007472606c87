//! Decides which manifest fields change for a release plan.
//!
//! Planning works on the already-read [`Package`] data and never touches the
//! filesystem; [`crate::apply_patch`] writes the result.

use changeset_core::{BumpType, DependencyKind, Package};
use changeset_version::{
    DeclaredRange, RangeOperator, VersionError, VersionRange, WORKSPACE_PROTOCOL,
    is_local_path_protocol, strip_workspace_protocol,
};
use indexmap::IndexMap;
use semver::Version;

use crate::error::ManifestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchOptions {
    /// Lowest bump that rewrites in-range declarations of non-peer kinds.
    pub update_internal_dependencies: BumpType,
    pub only_update_peer_dependents_when_out_of_range: bool,
    pub bump_versions_with_workspace_protocol_only: bool,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            update_internal_dependencies: BumpType::Patch,
            only_update_peer_dependents_when_out_of_range: false,
            bump_versions_with_workspace_protocol_only: false,
        }
    }
}

/// Outcome of the release plan for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasedVersion {
    pub bump_type: BumpType,
    pub old_version: Version,
    pub new_version: Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyUpdate {
    pub kind: DependencyKind,
    pub name: String,
    pub range: String,
}

/// Field changes for a single `package.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestPatch {
    pub version: Option<Version>,
    pub dependencies: Vec<DependencyUpdate>,
}

impl ManifestPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.version.is_none() && self.dependencies.is_empty()
    }
}

/// Whether a declaration of `kind` on a released dependency is rewritten.
///
/// A declaration the new version falls outside of is always rewritten. Peer
/// declarations otherwise follow `only_update_peer_dependents_when_out_of_range`,
/// every other kind follows the `update_internal_dependencies` threshold.
///
/// # Errors
///
/// Returns `VersionError::InvalidRange` if `raw` cannot be parsed.
pub fn should_update_dependency(
    kind: DependencyKind,
    raw: &str,
    release: &ReleasedVersion,
    options: &PatchOptions,
) -> Result<bool, VersionError> {
    let declared = DeclaredRange::resolve(raw, &release.old_version)?;
    if !declared.admits(&release.new_version) {
        return Ok(true);
    }

    Ok(match kind {
        DependencyKind::PeerDependencies => !options.only_update_peer_dependents_when_out_of_range,
        _ => release.bump_type >= options.update_internal_dependencies,
    })
}

/// Rewrites `raw` to point at `new_version`, keeping its operator and any
/// `workspace:` prefix. `None` when the declaration is left as is: local
/// paths, the `workspace:*`/`^`/`~` shorthands and unconstrained ranges.
///
/// # Errors
///
/// Returns `VersionError::InvalidRange` if `raw` cannot be parsed.
pub fn rewrite_range(raw: &str, new_version: &Version) -> Result<Option<String>, VersionError> {
    if is_local_path_protocol(raw) {
        return Ok(None);
    }

    let (prefix, range) = match strip_workspace_protocol(raw) {
        Some("*" | "^" | "~") => return Ok(None),
        Some(inner) => (WORKSPACE_PROTOCOL, inner),
        None => ("", raw),
    };

    if VersionRange::parse(range)?.is_any() {
        return Ok(None);
    }

    let operator = RangeOperator::detect(range.trim_start());
    Ok(Some(format!("{prefix}{operator}{new_version}")))
}

/// Computes the changes to `package`'s manifest given every released package.
///
/// # Errors
///
/// Returns `ManifestError::InvalidRange` if a declaration on a released
/// package cannot be parsed.
pub fn plan_patch(
    package: &Package,
    releases: &IndexMap<String, ReleasedVersion>,
    options: &PatchOptions,
) -> Result<ManifestPatch, ManifestError> {
    let version = releases
        .get(&package.name)
        .filter(|release| release.new_version != package.version)
        .map(|release| release.new_version.clone());

    let mut dependencies = Vec::new();

    for (kind, name, raw) in package.all_dependencies() {
        let Some(release) = releases.get(name) else {
            continue;
        };
        if is_local_path_protocol(raw) {
            continue;
        }

        let invalid = |source| ManifestError::InvalidRange {
            package: package.name.clone(),
            dependency: name.to_string(),
            source,
        };

        if !should_update_dependency(kind, raw, release, options).map_err(invalid)? {
            continue;
        }
        if options.bump_versions_with_workspace_protocol_only
            && strip_workspace_protocol(raw).is_none()
        {
            continue;
        }

        let Some(range) = rewrite_range(raw, &release.new_version).map_err(invalid)? else {
            continue;
        };
        if range != raw {
            dependencies.push(DependencyUpdate {
                kind,
                name: name.to_string(),
                range,
            });
        }
    }

    Ok(ManifestPatch {
        version,
        dependencies,
    })
}
