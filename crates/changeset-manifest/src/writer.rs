use std::path::Path;

use crate::document::ManifestDocument;
use crate::error::ManifestError;
use crate::patch::ManifestPatch;

/// Applies `patch` to the manifest at `path`. The file is read and written at
/// most once, and only written when a field actually changes.
///
/// Returns whether the file was written.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read, parsed, or written.
pub fn apply_patch(path: &Path, patch: &ManifestPatch) -> Result<bool, ManifestError> {
    if patch.is_empty() {
        return Ok(false);
    }

    let mut doc = ManifestDocument::read(path)?;
    let mut changed = false;

    if let Some(version) = &patch.version {
        changed |= doc.set_str("version", &version.to_string());
    }

    for update in &patch.dependencies {
        changed |= doc.set_dependency(update.kind.manifest_key(), &update.name, &update.range);
    }

    if changed {
        doc.write()?;
    }

    Ok(changed)
}
