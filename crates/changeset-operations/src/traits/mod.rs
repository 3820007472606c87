mod changeset_io;
mod config_loader;
mod manifest_writer;
mod pre_state_io;
mod workspace_provider;

pub use changeset_io::{ChangesetReader, ChangesetRemover};
pub use config_loader::ConfigLoader;
pub use manifest_writer::ManifestWriter;
pub use pre_state_io::PreStateIO;
pub use workspace_provider::WorkspaceProvider;
