use std::path::Path;

use changeset_project::{PreMode, PreState, ProjectError};
use tracing::debug;

use crate::Result;
use crate::traits::{PreStateIO, WorkspaceProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreCommand {
    /// Start, or resume after `Exit`, a session tagged with the given tag.
    Enter { tag: String },
    /// Release stable versions on the next versioning run.
    Exit,
}

/// Enters and exits prerelease sessions.
pub struct PreOperation<W, S> {
    workspace_provider: W,
    pre_state_io: S,
}

impl<W, S> PreOperation<W, S>
where
    W: WorkspaceProvider,
    S: PreStateIO,
{
    pub fn new(workspace_provider: W, pre_state_io: S) -> Self {
        Self {
            workspace_provider,
            pre_state_io,
        }
    }

    /// Applies `command` and returns the stored state.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::AlreadyInPreMode` when entering an active
    /// session, `ProjectError::NotInPreMode` when exiting without a session,
    /// `ProjectError::InvalidTag` for an unusable tag, or an error if the
    /// state cannot be read or written.
    pub fn execute(&self, start_path: &Path, command: &PreCommand) -> Result<PreState> {
        let workspace = self.workspace_provider.discover(start_path)?;
        let stored = self.pre_state_io.load(&workspace.root)?;

        let state = match (command, stored) {
            (PreCommand::Enter { tag }, None) => PreState::enter(tag, &workspace.packages)?,
            (PreCommand::Enter { tag }, Some(mut state)) => {
                state.reenter(tag)?;
                state
            }
            (PreCommand::Exit, None) => return Err(ProjectError::NotInPreMode.into()),
            (PreCommand::Exit, Some(mut state)) => {
                state.exit();
                state
            }
        };

        self.pre_state_io.save(&workspace.root, &state)?;
        debug!(
            tag = %state.tag,
            active = state.mode == PreMode::Pre,
            "updated prerelease state"
        );

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use semver::Version;

    use super::*;
    use crate::error::OperationError;
    use crate::mocks::{MockPreStateIO, MockWorkspaceProvider};

    fn workspace() -> MockWorkspaceProvider {
        MockWorkspaceProvider::packages(&[("a", "1.0.0"), ("b", "0.4.2")])
    }

    fn enter(tag: &str) -> PreCommand {
        PreCommand::Enter {
            tag: tag.to_string(),
        }
    }

    #[test]
    fn enter_records_initial_versions() {
        let io = Arc::new(MockPreStateIO::new());
        let operation = PreOperation::new(workspace(), Arc::clone(&io));

        let state = operation
            .execute(Path::new("/any"), &enter("beta"))
            .expect("enter succeeds");

        assert_eq!(state.mode, PreMode::Pre);
        assert_eq!(state.tag, "beta");
        assert_eq!(state.sequence_number, 0);
        assert_eq!(
            state.per_package["b"].initial_version,
            Version::new(0, 4, 2)
        );
        assert_eq!(io.state(), Some(state));
    }

    #[test]
    fn entering_twice_is_rejected() {
        let io = Arc::new(MockPreStateIO::new());
        let operation = PreOperation::new(workspace(), Arc::clone(&io));
        operation
            .execute(Path::new("/any"), &enter("beta"))
            .expect("enter succeeds");

        let err = operation
            .execute(Path::new("/any"), &enter("rc"))
            .expect_err("already in pre mode");

        assert!(matches!(
            err,
            OperationError::Project(ProjectError::AlreadyInPreMode { ref tag }) if tag == "beta"
        ));
    }

    #[test]
    fn exit_then_reenter_keeps_history() {
        let io = Arc::new(MockPreStateIO::new());
        let operation = PreOperation::new(workspace(), Arc::clone(&io));
        let mut state = operation
            .execute(Path::new("/any"), &enter("beta"))
            .expect("enter succeeds");
        state.sequence_number = 4;
        io.save(Path::new("/mock/workspace"), &state).expect("save");

        let exited = operation
            .execute(Path::new("/any"), &PreCommand::Exit)
            .expect("exit succeeds");
        assert_eq!(exited.mode, PreMode::Exit);

        let resumed = operation
            .execute(Path::new("/any"), &enter("rc"))
            .expect("re-enter succeeds");
        assert_eq!(resumed.mode, PreMode::Pre);
        assert_eq!(resumed.tag, "rc");
        assert_eq!(resumed.sequence_number, 4);
    }

    #[test]
    fn exit_without_session_is_rejected() {
        let operation = PreOperation::new(workspace(), MockPreStateIO::new());

        let err = operation
            .execute(Path::new("/any"), &PreCommand::Exit)
            .expect_err("not in pre mode");

        assert!(matches!(
            err,
            OperationError::Project(ProjectError::NotInPreMode)
        ));
    }

    #[test]
    fn invalid_tag_is_rejected() {
        let operation = PreOperation::new(workspace(), MockPreStateIO::new());

        let err = operation
            .execute(Path::new("/any"), &enter("not valid"))
            .expect_err("invalid tag");

        assert!(matches!(
            err,
            OperationError::Project(ProjectError::InvalidTag { .. })
        ));
    }
}
