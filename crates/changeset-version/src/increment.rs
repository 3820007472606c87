use changeset_core::BumpType;
use semver::{BuildMetadata, Prerelease, Version};

use crate::error::VersionError;

/// Prerelease decoration appended while a pre session is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrereleaseSuffix<'a> {
    pub tag: &'a str,
    pub sequence: u64,
}

impl PrereleaseSuffix<'_> {
    fn identifier(&self) -> String {
        format!("{}.{}", self.tag, self.sequence)
    }
}

#[must_use]
pub fn is_prerelease(version: &Version) -> bool {
    !version.pre.is_empty()
}

/// Applies `bump` to `version` following npm `inc` rules.
///
/// A prerelease base is promoted to its release when the bump is already
/// contained in it: `1.1.0-next.0` bumped by `minor` or `patch` yields `1.1.0`.
#[must_use]
pub fn increment(version: &Version, bump: BumpType) -> Version {
    let mut next = version.clone();
    let pre = is_prerelease(version);

    match bump {
        BumpType::None => return next,
        BumpType::Major => {
            if !(pre && version.minor == 0 && version.patch == 0) {
                next.major += 1;
            }
            next.minor = 0;
            next.patch = 0;
        }
        BumpType::Minor => {
            if !(pre && version.patch == 0) {
                next.minor += 1;
            }
            next.patch = 0;
        }
        BumpType::Patch => {
            if !pre {
                next.patch += 1;
            }
        }
    }

    next.pre = Prerelease::EMPTY;
    next.build = BuildMetadata::EMPTY;
    next
}

/// Increments and, when `suffix` is set, decorates the result with
/// `-{tag}.{sequence}`. A `none` bump returns `version` untouched.
///
/// # Errors
///
/// Returns `VersionError::InvalidPrerelease` if the tag is not a valid
/// semver prerelease identifier.
pub fn increment_with_prerelease(
    version: &Version,
    bump: BumpType,
    suffix: Option<PrereleaseSuffix<'_>>,
) -> Result<Version, VersionError> {
    if bump == BumpType::None {
        return Ok(version.clone());
    }

    with_prerelease(increment(version, bump), suffix)
}

/// Decorates an already computed release version with `-{tag}.{sequence}`
/// when `suffix` is set.
///
/// # Errors
///
/// Returns `VersionError::InvalidPrerelease` if the tag is not a valid
/// semver prerelease identifier.
pub fn with_prerelease(
    mut version: Version,
    suffix: Option<PrereleaseSuffix<'_>>,
) -> Result<Version, VersionError> {
    if let Some(suffix) = suffix {
        let identifier = suffix.identifier();
        version.pre = Prerelease::new(&identifier)
            .map_err(|source| VersionError::InvalidPrerelease { identifier, source })?;
    }

    Ok(version)
}

/// Smallest bump whose level separates `from` and `to`: `major` when the
/// major components differ, then `minor`, otherwise `patch`. Returns `none`
/// when `to` is not above `from`.
#[must_use]
pub fn bump_to_reach(from: &Version, to: &Version) -> BumpType {
    if to <= from {
        BumpType::None
    } else if to.major != from.major {
        BumpType::Major
    } else if to.minor != from.minor {
        BumpType::Minor
    } else {
        BumpType::Patch
    }
}
