use std::path::Path;

use changeset_project::{Config, load_config};

use crate::Result;
use crate::traits::ConfigLoader;

pub struct FileSystemConfigLoader;

impl FileSystemConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader for FileSystemConfigLoader {
    fn load_config(&self, root: &Path) -> Result<Config> {
        Ok(load_config(root)?)
    }
}
