use std::path::Path;

use changeset_manifest::{ManifestPatch, apply_patch};
use changeset_workspace::MANIFEST_FILE;

use crate::Result;
use crate::traits::ManifestWriter;

pub struct FileSystemManifestWriter;

impl FileSystemManifestWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemManifestWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestWriter for FileSystemManifestWriter {
    fn apply(&self, package_dir: &Path, patch: &ManifestPatch) -> Result<bool> {
        Ok(apply_patch(&package_dir.join(MANIFEST_FILE), patch)?)
    }
}
