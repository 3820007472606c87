mod config;
mod error;
mod pre_state;

pub const DEFAULT_CHANGESET_DIR: &str = ".changeset";
pub const CONFIG_FILE: &str = "config.toml";
pub const PRE_STATE_FILE: &str = "pre.json";

pub use config::{
    Config, PatternSection, PrivatePackages, ResolvedConfig, UnmatchedPattern,
    UpdateInternalDependencies, load_config, parse_config,
};
pub use error::ProjectError;
pub use pre_state::{
    PreMode, PrePackageState, PreState, read_pre_state, remove_pre_state, write_pre_state,
};

pub type Result<T> = std::result::Result<T, ProjectError>;
