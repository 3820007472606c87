use std::path::Path;

use changeset_manifest::ManifestPatch;

use crate::Result;

pub trait ManifestWriter: Send + Sync {
    /// Applies `patch` to the manifest in `package_dir`.
    ///
    /// Returns whether the manifest was rewritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read, parsed, or written.
    fn apply(&self, package_dir: &Path, patch: &ManifestPatch) -> Result<bool>;
}
