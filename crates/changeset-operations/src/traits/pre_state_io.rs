use std::path::Path;

use changeset_project::PreState;

use crate::Result;

/// Persistence of the prerelease session state in `.changeset/pre.json`.
pub trait PreStateIO: Send + Sync {
    /// Returns `Ok(None)` if no session was ever entered.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self, root: &Path) -> Result<Option<PreState>>;

    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized or written.
    fn save(&self, root: &Path, state: &PreState) -> Result<()>;

    /// Removes the state file. Returns whether a file existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    fn remove(&self, root: &Path) -> Result<bool>;
}
