mod error;
mod increment;
mod range;

pub use error::VersionError;
pub use increment::{
    PrereleaseSuffix, bump_to_reach, increment, increment_with_prerelease, is_prerelease,
    with_prerelease,
};
pub use range::{
    DeclaredRange, RangeOperator, VersionRange, WORKSPACE_PROTOCOL, is_local_path_protocol,
    strip_workspace_protocol,
};
