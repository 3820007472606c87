use std::path::Path;

use changeset_workspace::{Workspace, discover_workspace};

use crate::Result;
use crate::traits::WorkspaceProvider;

pub struct FileSystemWorkspaceProvider;

impl FileSystemWorkspaceProvider {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemWorkspaceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceProvider for FileSystemWorkspaceProvider {
    fn discover(&self, start_path: &Path) -> Result<Workspace> {
        Ok(discover_workspace(start_path)?)
    }
}
