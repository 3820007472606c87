//! Reverse dependency graph of in-repo packages.
//!
//! Nodes are created in package order, so a node index is the index of the
//! package in the slice the graph was built from. Edges point from the
//! dependent to its dependency and carry every declaration that links them.

use std::collections::HashMap;

use changeset_core::{DependencyKind, Package};
use changeset_version::{DeclaredRange, strip_workspace_protocol};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::{debug, warn};

use crate::error::WorkspaceError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphOptions {
    /// Only `workspace:` declarations create edges.
    pub workspace_protocol_only: bool,
}

/// One dependency declaration from a dependent onto an in-repo package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: DependencyKind,
    pub range: String,
}

/// All declarations by which one package depends on another, in lookup order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyEdge {
    pub declarations: Vec<Declaration>,
}

impl DependencyEdge {
    pub fn kinds(&self) -> impl Iterator<Item = DependencyKind> + '_ {
        self.declarations.iter().map(|d| d.kind)
    }

    #[must_use]
    pub fn has_kind(&self, kind: DependencyKind) -> bool {
        self.kinds().any(|k| k == kind)
    }

    /// True when every declaration is a `devDependencies` entry.
    #[must_use]
    pub fn is_dev_only(&self) -> bool {
        self.kinds().all(|k| k == DependencyKind::DevDependencies)
    }
}

#[derive(Debug, Clone)]
pub struct DependentsGraph {
    graph: DiGraph<String, DependencyEdge>,
    name_to_node: HashMap<String, NodeIndex>,
}

impl DependentsGraph {
    /// Builds the graph from `packages`.
    ///
    /// Declarations whose range the dependency's current version does not
    /// satisfy are logged and left out.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::InvalidRange` if a declaration on an in-repo
    /// package cannot be parsed.
    pub fn build(packages: &[Package], options: GraphOptions) -> Result<Self, WorkspaceError> {
        let mut graph = DiGraph::with_capacity(packages.len(), packages.len());
        let mut name_to_node = HashMap::with_capacity(packages.len());

        for package in packages {
            let node = graph.add_node(package.name.clone());
            name_to_node.insert(package.name.clone(), node);
        }

        for (index, dependent) in packages.iter().enumerate() {
            let mut edges: Vec<(NodeIndex, DependencyEdge)> = Vec::new();

            for (kind, name, raw) in dependent.all_dependencies() {
                if name == dependent.name {
                    continue;
                }
                let Some(&target) = name_to_node.get(name) else {
                    continue;
                };
                if options.workspace_protocol_only && strip_workspace_protocol(raw).is_none() {
                    continue;
                }

                let dependency = &packages[target.index()];
                let declared = DeclaredRange::resolve(raw, &dependency.version).map_err(
                    |source| WorkspaceError::InvalidRange {
                        package: dependent.name.clone(),
                        dependency: name.to_string(),
                        source,
                    },
                )?;

                if declared == DeclaredRange::LocalPath {
                    debug!(
                        package = %dependent.name,
                        dependency = %name,
                        range = %raw,
                        "local path reference; not a dependent"
                    );
                    continue;
                }
                if matches!(&declared, DeclaredRange::Range(range) if !range.matches(&dependency.version))
                {
                    warn!(
                        package = %dependent.name,
                        dependency = %name,
                        range = %raw,
                        version = %dependency.version,
                        "declared range does not match the in-repo version; ignoring"
                    );
                    continue;
                }

                let declaration = Declaration {
                    kind,
                    range: raw.to_string(),
                };
                match edges.iter_mut().find(|(node, _)| *node == target) {
                    Some((_, edge)) => edge.declarations.push(declaration),
                    None => edges.push((
                        target,
                        DependencyEdge {
                            declarations: vec![declaration],
                        },
                    )),
                }
            }

            let from = NodeIndex::new(index);
            for (to, edge) in edges {
                graph.add_edge(from, to, edge);
            }
        }

        debug!(
            packages = graph.node_count(),
            edges = graph.edge_count(),
            "built dependents graph"
        );

        Ok(Self {
            graph,
            name_to_node,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_node.get(name).map(|node| node.index())
    }

    #[must_use]
    pub fn name(&self, index: usize) -> Option<&str> {
        self.graph
            .node_weight(NodeIndex::new(index))
            .map(String::as_str)
    }

    /// Packages that depend on the package at `index`, with the edge that links
    /// them. `None` if `index` is not a node of this graph.
    #[must_use]
    pub fn dependents(&self, index: usize) -> Option<Vec<(usize, &DependencyEdge)>> {
        if index >= self.graph.node_count() {
            return None;
        }

        let mut dependents: Vec<_> = self
            .graph
            .edges_directed(NodeIndex::new(index), Direction::Incoming)
            .map(|edge| (edge.source().index(), edge.weight()))
            .collect();
        dependents.sort_by_key(|(dependent, _)| *dependent);
        Some(dependents)
    }

    /// Names of the packages that depend on `name`, sorted.
    #[must_use]
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        let Some(index) = self.index_of(name) else {
            return Vec::new();
        };

        let mut names: Vec<&str> = self
            .dependents(index)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(dependent, _)| self.name(dependent))
            .collect();
        names.sort_unstable();
        names
    }
}
