use std::collections::HashSet;
use std::path::Path;

use changeset_operations::operations::StatusOperation;
use changeset_operations::providers::{
    FileSystemChangesetIO, FileSystemConfigLoader, FileSystemPreStateIO,
    FileSystemWorkspaceProvider,
};

use crate::error::Result;
use crate::output::{PlainTextStatusFormatter, StatusFormatter};

pub(crate) fn run(start_path: &Path, deleted: &HashSet<String>) -> Result<()> {
    let operation = StatusOperation::new(
        FileSystemWorkspaceProvider::new(),
        FileSystemChangesetIO::new(),
        FileSystemConfigLoader::new(),
        FileSystemPreStateIO::new(),
    );
    let output = operation.execute(start_path, deleted)?;

    print!("{}", PlainTextStatusFormatter.format_status(&output));

    Ok(())
}
