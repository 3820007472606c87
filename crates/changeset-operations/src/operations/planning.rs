use std::collections::HashSet;
use std::path::Path;

use changeset_project::{Config, PreState};
use changeset_workspace::{DependentsGraph, GraphOptions, Workspace};
use tracing::debug;

use crate::Result;
use crate::assemble::{AssembleInput, ReleasePlan, assemble_release_plan};
use crate::error::OperationError;
use crate::traits::{ChangesetReader, ConfigLoader, PreStateIO, WorkspaceProvider};
use crate::validate::{ValidationInput, validate};

/// Providers needed to compute a plan without touching any file.
pub(crate) struct PlanSources<'a, W, R, C, S> {
    pub workspace_provider: &'a W,
    pub changeset_reader: &'a R,
    pub config_loader: &'a C,
    pub pre_state_io: &'a S,
}

pub(crate) struct PreparedPlan {
    pub workspace: Workspace,
    pub config: Config,
    /// State as stored before this plan.
    pub pre_state: Option<PreState>,
    pub plan: ReleasePlan,
}

/// Discovers the workspace, validates its changesets against the
/// configuration and assembles the release plan.
pub(crate) fn prepare_plan<W, R, C, S>(
    sources: &PlanSources<'_, W, R, C, S>,
    start_path: &Path,
    deleted: &HashSet<String>,
) -> Result<PreparedPlan>
where
    W: WorkspaceProvider,
    R: ChangesetReader,
    C: ConfigLoader,
    S: PreStateIO,
{
    let workspace = sources.workspace_provider.discover(start_path)?;
    if workspace.packages.is_empty() {
        return Err(OperationError::EmptyWorkspace(workspace.root));
    }

    let config = sources.config_loader.load_config(&workspace.root)?;
    let names: Vec<&str> = workspace.packages.iter().map(|p| p.name.as_str()).collect();
    let groups = config.resolve(&names)?;

    let changesets = sources
        .changeset_reader
        .read_changesets(&workspace.changeset_dir())?;

    validate(&ValidationInput {
        packages: &workspace.packages,
        changesets: &changesets,
        groups: &groups,
        deleted,
    })?;

    let graph = DependentsGraph::build(
        &workspace.packages,
        GraphOptions {
            workspace_protocol_only: config.bump_versions_with_workspace_protocol_only,
        },
    )?;
    let pre_state = sources.pre_state_io.load(&workspace.root)?;

    debug!(
        packages = workspace.packages.len(),
        changesets = changesets.len(),
        pre = pre_state.as_ref().map(|s| s.tag.as_str()),
        "assembling release plan"
    );

    let plan = assemble_release_plan(&AssembleInput {
        packages: &workspace.packages,
        graph: &graph,
        changesets: &changesets,
        config: &config,
        groups: &groups,
        pre_state: pre_state.as_ref(),
        deleted,
    })?;

    Ok(PreparedPlan {
        workspace,
        config,
        pre_state,
        plan,
    })
}
