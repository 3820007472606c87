use std::path::Path;

use changeset_operations::operations::{PreCommand, PreOperation};
use changeset_operations::providers::{FileSystemPreStateIO, FileSystemWorkspaceProvider};

use super::PreCommands;
use crate::error::Result;

pub(crate) fn run(start_path: &Path, command: PreCommands) -> Result<()> {
    let command = match command {
        PreCommands::Enter { tag } => PreCommand::Enter { tag },
        PreCommands::Exit => PreCommand::Exit,
    };

    let operation = PreOperation::new(FileSystemWorkspaceProvider::new(), FileSystemPreStateIO::new());
    let state = operation.execute(start_path, &command)?;

    match command {
        PreCommand::Enter { .. } => println!(
            "Entered prerelease mode with tag '{}'. Run `changeset version` to version packages.",
            state.tag
        ),
        PreCommand::Exit => println!(
            "Exiting prerelease mode. Run `changeset version` to release stable versions."
        ),
    }

    Ok(())
}
