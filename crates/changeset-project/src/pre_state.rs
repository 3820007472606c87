//! Prerelease session state persisted in `.changeset/pre.json`.

use std::path::{Path, PathBuf};

use changeset_core::{BumpType, Package};
use changeset_version::PrereleaseSuffix;
use indexmap::IndexMap;
use semver::{Prerelease, Version};
use serde::{Deserialize, Serialize};

use crate::error::ProjectError;
use crate::{DEFAULT_CHANGESET_DIR, PRE_STATE_FILE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreMode {
    Pre,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrePackageState {
    pub initial_version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_bump_type_seen_this_pre_session: Option<BumpType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreState {
    pub mode: PreMode,
    pub tag: String,
    pub sequence_number: u64,
    #[serde(default)]
    pub per_package: IndexMap<String, PrePackageState>,
}

impl PreState {
    /// Starts a session tagged `tag`, recording each package's current version.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::InvalidTag` if `tag` cannot be used as a semver
    /// prerelease identifier.
    pub fn enter(tag: &str, packages: &[Package]) -> Result<Self, ProjectError> {
        validate_tag(tag)?;

        let per_package = packages
            .iter()
            .map(|package| {
                (
                    package.name.clone(),
                    PrePackageState {
                        initial_version: package.version.clone(),
                        highest_bump_type_seen_this_pre_session: None,
                    },
                )
            })
            .collect();

        Ok(Self {
            mode: PreMode::Pre,
            tag: tag.to_string(),
            sequence_number: 0,
            per_package,
        })
    }

    /// Re-enters a session that was being exited, switching to `tag`.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::AlreadyInPreMode` if the session is active, or
    /// `ProjectError::InvalidTag` for an unusable tag.
    pub fn reenter(&mut self, tag: &str) -> Result<(), ProjectError> {
        if self.mode == PreMode::Pre {
            return Err(ProjectError::AlreadyInPreMode {
                tag: self.tag.clone(),
            });
        }
        validate_tag(tag)?;
        self.mode = PreMode::Pre;
        self.tag = tag.to_string();
        Ok(())
    }

    /// Marks the session as exiting. The next versioning run releases stable
    /// versions and drops the state.
    pub fn exit(&mut self) {
        self.mode = PreMode::Exit;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.mode == PreMode::Pre
    }

    /// Suffix to decorate new versions with, if the session is active.
    #[must_use]
    pub fn active_suffix(&self) -> Option<PrereleaseSuffix<'_>> {
        self.is_active().then(|| PrereleaseSuffix {
            tag: &self.tag,
            sequence: self.sequence_number,
        })
    }

    #[must_use]
    pub fn highest_bump(&self, name: &str) -> Option<BumpType> {
        self.per_package
            .get(name)
            .and_then(|p| p.highest_bump_type_seen_this_pre_session)
    }

    /// Raises the highest bump seen for `name`, creating the entry with
    /// `initial_version` when it does not exist yet.
    pub fn record_bump(&mut self, name: &str, initial_version: &Version, bump: BumpType) {
        let entry = self
            .per_package
            .entry(name.to_string())
            .or_insert_with(|| PrePackageState {
                initial_version: initial_version.clone(),
                highest_bump_type_seen_this_pre_session: None,
            });

        let highest = entry
            .highest_bump_type_seen_this_pre_session
            .map_or(bump, |seen| seen.max(bump));
        entry.highest_bump_type_seen_this_pre_session = Some(highest);
    }

    /// # Errors
    ///
    /// Returns `ProjectError::PreStateSerialize` if serialization fails.
    pub fn to_json(&self) -> Result<String, ProjectError> {
        let mut json =
            serde_json::to_string_pretty(self).map_err(ProjectError::PreStateSerialize)?;
        json.push('\n');
        Ok(json)
    }
}

fn validate_tag(tag: &str) -> Result<(), ProjectError> {
    Prerelease::new(&format!("{tag}.0"))
        .map(drop)
        .map_err(|source| ProjectError::InvalidTag {
            tag: tag.to_string(),
            source,
        })
}

fn pre_state_path(root: &Path) -> PathBuf {
    root.join(DEFAULT_CHANGESET_DIR).join(PRE_STATE_FILE)
}

/// Reads `.changeset/pre.json` under `root`, if present.
///
/// # Errors
///
/// Returns `ProjectError` if the file exists but cannot be read or parsed.
pub fn read_pre_state(root: &Path) -> Result<Option<PreState>, ProjectError> {
    let path = pre_state_path(root);

    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ProjectError::Read {
        path: path.clone(),
        source,
    })?;

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| ProjectError::PreStateParse { path, source })
}

/// # Errors
///
/// Returns `ProjectError` if the state cannot be serialized or written.
pub fn write_pre_state(root: &Path, state: &PreState) -> Result<PathBuf, ProjectError> {
    let path = pre_state_path(root);
    let json = state.to_json()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(&path, json).map_err(|source| ProjectError::Write {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

/// Deletes `.changeset/pre.json`. Returns false if there was nothing to delete.
///
/// # Errors
///
/// Returns `ProjectError::Write` if the file exists but cannot be removed.
pub fn remove_pre_state(root: &Path) -> Result<bool, ProjectError> {
    let path = pre_state_path(root);

    if !path.exists() {
        return Ok(false);
    }

    std::fs::remove_file(&path).map_err(|source| ProjectError::Write { path, source })?;
    Ok(true)
}
