use changeset_core::Package;
use changeset_project::PreState;
use changeset_workspace::DependentsGraph;

use super::AssembleInput;
use crate::error::InternalError;

/// Read-only view of the workspace shared by every assembly stage.
pub(crate) struct Context<'a> {
    pub packages: &'a [Package],
    pub graph: &'a DependentsGraph,
    pub pre_state: Option<&'a PreState>,
    pub only_update_peer_dependents_when_out_of_range: bool,
    pub fixed: Vec<Vec<usize>>,
    pub linked: Vec<Vec<usize>>,
    skipped: Vec<bool>,
}

impl<'a> Context<'a> {
    pub fn new(input: &AssembleInput<'a>) -> Result<Self, InternalError> {
        let packages = input.packages;
        let graph = input.graph;

        let aligned = graph.len() == packages.len()
            && packages
                .iter()
                .enumerate()
                .all(|(index, package)| graph.name(index) == Some(package.name.as_str()));
        if !aligned {
            return Err(InternalError::GraphMismatch {
                graph: graph.len(),
                packages: packages.len(),
            });
        }

        let skipped: Vec<bool> = packages
            .iter()
            .map(|package| {
                input.groups.ignore.contains(&package.name)
                    || (package.private && !input.config.private_packages.version)
            })
            .collect();

        let to_indices = |groups: &[Vec<String>]| -> Vec<Vec<usize>> {
            groups
                .iter()
                .map(|group| {
                    group
                        .iter()
                        .filter_map(|name| graph.index_of(name))
                        .filter(|index| !skipped[*index])
                        .collect()
                })
                .collect()
        };

        let fixed = to_indices(&input.groups.fixed);
        let linked = to_indices(&input.groups.linked);

        Ok(Self {
            packages,
            graph,
            pre_state: input.pre_state,
            only_update_peer_dependents_when_out_of_range: input
                .config
                .only_update_peer_dependents_when_out_of_range,
            fixed,
            linked,
            skipped,
        })
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.graph.index_of(name)
    }

    pub fn package(&self, index: usize) -> &'a Package {
        &self.packages[index]
    }

    /// Ignored packages, and private ones when private packages are not versioned.
    pub fn is_skipped(&self, index: usize) -> bool {
        self.skipped.get(index).copied().unwrap_or(true)
    }
}
