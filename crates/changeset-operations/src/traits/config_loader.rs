use std::path::Path;

use changeset_project::Config;

use crate::Result;

pub trait ConfigLoader: Send + Sync {
    /// Loads the configuration for the workspace rooted at `root`. A missing
    /// configuration file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed.
    fn load_config(&self, root: &Path) -> Result<Config>;
}
