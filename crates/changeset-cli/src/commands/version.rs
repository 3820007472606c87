use std::collections::HashSet;
use std::path::Path;

use changeset_operations::operations::{PreStateChange, VersionInput, VersionOperation};
use changeset_operations::providers::{
    FileSystemChangesetIO, FileSystemConfigLoader, FileSystemManifestWriter, FileSystemPreStateIO,
    FileSystemWorkspaceProvider,
};

use crate::error::Result;

pub(crate) fn run(start_path: &Path, deleted: HashSet<String>) -> Result<()> {
    let operation = VersionOperation::new(
        FileSystemWorkspaceProvider::new(),
        FileSystemChangesetIO::new(),
        FileSystemConfigLoader::new(),
        FileSystemPreStateIO::new(),
        FileSystemManifestWriter::new(),
    );
    let output = operation.execute(start_path, &VersionInput { deleted })?;

    if output.plan.is_empty() && output.removed_changesets.is_empty() {
        println!("No unreleased changesets, nothing to do.");
        return Ok(());
    }

    for release in output.plan.versioned() {
        println!(
            "{}: {} -> {}",
            release.name, release.old_version, release.new_version
        );
    }
    println!(
        "Updated {} manifest(s), consumed {} changeset(s).",
        output.patched.len(),
        output.removed_changesets.len()
    );

    match output.pre_state {
        PreStateChange::Saved => println!("Prerelease state updated."),
        PreStateChange::Removed => println!("Exited prerelease mode."),
        PreStateChange::Unchanged => {}
    }

    Ok(())
}
