use std::path::Path;

use changeset_workspace::Workspace;

use crate::Result;

pub trait WorkspaceProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if no workspace can be found from the given path.
    fn discover(&self, start_path: &Path) -> Result<Workspace>;
}
