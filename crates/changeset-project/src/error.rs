use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("failed to read '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{path}'")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at '{path}'")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse prerelease state at '{path}'")]
    PreStateParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize prerelease state")]
    PreStateSerialize(#[source] serde_json::Error),

    #[error("invalid package pattern '{pattern}'")]
    GlobPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("invalid prerelease tag '{tag}'")]
    InvalidTag {
        tag: String,
        #[source]
        source: semver::Error,
    },

    #[error("already in prerelease mode with tag '{tag}'")]
    AlreadyInPreMode { tag: String },

    #[error("not in prerelease mode")]
    NotInPreMode,
}
