mod changeset_io;
mod config;
mod manifest;
mod pre_state_io;
mod workspace;

pub use changeset_io::FileSystemChangesetIO;
pub use config::FileSystemConfigLoader;
pub use manifest::FileSystemManifestWriter;
pub use pre_state_io::FileSystemPreStateIO;
pub use workspace::FileSystemWorkspaceProvider;
