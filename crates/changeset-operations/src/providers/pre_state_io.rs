use std::path::Path;

use changeset_project::{PreState, read_pre_state, remove_pre_state, write_pre_state};

use crate::Result;
use crate::traits::PreStateIO;

pub struct FileSystemPreStateIO;

impl FileSystemPreStateIO {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemPreStateIO {
    fn default() -> Self {
        Self::new()
    }
}

impl PreStateIO for FileSystemPreStateIO {
    fn load(&self, root: &Path) -> Result<Option<PreState>> {
        Ok(read_pre_state(root)?)
    }

    fn save(&self, root: &Path, state: &PreState) -> Result<()> {
        write_pre_state(root, state)?;
        Ok(())
    }

    fn remove(&self, root: &Path) -> Result<bool> {
        Ok(remove_pre_state(root)?)
    }
}
