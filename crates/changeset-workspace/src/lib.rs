mod error;
mod graph;
mod package_json;
mod workspace;

pub use error::WorkspaceError;
pub use graph::{Declaration, DependencyEdge, DependentsGraph, GraphOptions};
pub use package_json::{MANIFEST_FILE, PackageJson, WorkspacesField, read_package};
pub use workspace::{Workspace, WorkspaceKind, discover_workspace};

pub type Result<T> = std::result::Result<T, WorkspaceError>;
