use std::collections::HashSet;
use std::path::Path;

use changeset_core::Package;
use changeset_project::PreState;

use super::planning::{PlanSources, prepare_plan};
use crate::Result;
use crate::assemble::ReleasePlan;
use crate::traits::{ChangesetReader, ConfigLoader, PreStateIO, WorkspaceProvider};

#[derive(Debug)]
pub struct StatusOutput {
    pub plan: ReleasePlan,
    /// Packages the plan does not re-version.
    pub unchanged_packages: Vec<Package>,
    /// Prerelease session as currently stored.
    pub pre_state: Option<PreState>,
}

/// Computes the release plan without modifying anything.
pub struct StatusOperation<W, R, C, S> {
    workspace_provider: W,
    changeset_reader: R,
    config_loader: C,
    pre_state_io: S,
}

impl<W, R, C, S> StatusOperation<W, R, C, S>
where
    W: WorkspaceProvider,
    R: ChangesetReader,
    C: ConfigLoader,
    S: PreStateIO,
{
    pub fn new(workspace_provider: W, changeset_reader: R, config_loader: C, pre_state_io: S) -> Self {
        Self {
            workspace_provider,
            changeset_reader,
            config_loader,
            pre_state_io,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the workspace cannot be discovered, the
    /// configuration or changesets cannot be read, validation fails, or the
    /// plan cannot be assembled.
    pub fn execute(&self, start_path: &Path, deleted: &HashSet<String>) -> Result<StatusOutput> {
        let prepared = prepare_plan(
            &PlanSources {
                workspace_provider: &self.workspace_provider,
                changeset_reader: &self.changeset_reader,
                config_loader: &self.config_loader,
                pre_state_io: &self.pre_state_io,
            },
            start_path,
            deleted,
        )?;

        let versioned: HashSet<&str> = prepared.plan.versioned().map(|r| r.name.as_str()).collect();
        let unchanged_packages = prepared
            .workspace
            .packages
            .iter()
            .filter(|p| !versioned.contains(p.name.as_str()))
            .cloned()
            .collect();

        Ok(StatusOutput {
            plan: prepared.plan,
            unchanged_packages,
            pre_state: prepared.pre_state,
        })
    }
}
