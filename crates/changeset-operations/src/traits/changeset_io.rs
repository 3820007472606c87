use std::path::Path;

use changeset_core::Changeset;

use crate::Result;

pub trait ChangesetReader: Send + Sync {
    /// Reads every changeset in `changeset_dir`, ordered by id.
    ///
    /// A missing directory holds no changesets.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed or a file cannot be
    /// read or parsed.
    fn read_changesets(&self, changeset_dir: &Path) -> Result<Vec<Changeset>>;
}

pub trait ChangesetRemover: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the changeset file cannot be removed.
    fn remove_changeset(&self, changeset_dir: &Path, id: &str) -> Result<()>;
}
