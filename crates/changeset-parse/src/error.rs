use thiserror::Error;

/// Problems locating the `---` fenced release list.
#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("changeset must start with a '---' line")]
    MissingOpeningDelimiter,

    #[error("release list is not closed by a '---' line")]
    MissingClosingDelimiter,

    #[error("release list between the '---' lines is empty")]
    EmptyFrontMatter,
}

/// Problems with the packages a changeset releases.
#[derive(Debug, Error)]
pub enum ReleaseListError {
    #[error("changeset names no packages to release")]
    NoReleases,

    #[error("package '{package}' is listed with bump type 'none'; use patch, minor or major, or drop the entry")]
    NoneBump { package: String },

    #[error("changeset is {size} bytes, over the {max_bytes} byte limit")]
    InputTooLarge { size: usize, max_bytes: usize },
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("release list is not a map of npm package names to bump types")]
    Yaml(#[from] serde_yml::Error),

    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),

    #[error(transparent)]
    Releases(#[from] ReleaseListError),
}
