use thiserror::Error;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("invalid version range '{range}'")]
    InvalidRange {
        range: String,
        #[source]
        source: semver::Error,
    },

    #[error("invalid prerelease identifier '{identifier}'")]
    InvalidPrerelease {
        identifier: String,
        #[source]
        source: semver::Error,
    },
}
