use std::path::PathBuf;

use thiserror::Error;

use crate::validate::ValidationErrors;

/// Broken engine invariants. These indicate a bug rather than bad input.
#[derive(Debug, Error)]
pub enum InternalError {
    #[error("package '{name}' has no node in the dependents graph")]
    MissingGraphNode { name: String },

    #[error(
        "package '{name}' is on a prerelease version but the prerelease state records no bump for it"
    )]
    MissingPrereleaseHistory { name: String },

    #[error("release assembly did not settle after {passes} passes")]
    FixpointDiverged { passes: usize },

    #[error("dependents graph has {graph} nodes but the workspace has {packages} packages")]
    GraphMismatch { graph: usize, packages: usize },
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Workspace(#[from] changeset_workspace::WorkspaceError),

    #[error(transparent)]
    Project(#[from] changeset_project::ProjectError),

    #[error(transparent)]
    Manifest(#[from] changeset_manifest::ManifestError),

    #[error("version calculation failed")]
    VersionCalculation(#[from] changeset_version::VersionError),

    #[error("failed to read changeset file '{path}'")]
    ChangesetFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse changeset file '{path}'")]
    ChangesetParse {
        path: PathBuf,
        #[source]
        source: changeset_parse::FormatError,
    },

    #[error("failed to list changeset files in '{path}'")]
    ChangesetList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove changeset file '{path}'")]
    ChangesetRemove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no packages found in workspace at '{0}'")]
    EmptyWorkspace(PathBuf),

    #[error("changeset '{changeset}' names unknown package '{name}'")]
    UnknownPackage { name: String, changeset: String },

    #[error("package '{package}' declares an invalid range for '{dependency}'")]
    InvalidRange {
        package: String,
        dependency: String,
        #[source]
        source: changeset_version::VersionError,
    },

    #[error("release validation failed")]
    ValidationFailed(#[from] ValidationErrors),

    #[error("internal error")]
    Internal(#[from] InternalError),

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OperationError>;
