mod pre;
mod status;
mod version;

use std::collections::HashSet;
use std::path::Path;

use clap::{Args, Subcommand};

use crate::error::Result;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Show the release plan for pending changesets without changing anything
    Status(PlanArgs),
    /// Apply pending changesets: bump versions and dependency ranges
    Version(PlanArgs),
    /// Enter or exit prerelease mode
    #[command(subcommand)]
    Pre(PreCommands),
}

#[derive(Args)]
pub(crate) struct PlanArgs {
    /// Package removed from the workspace that pending changesets may still name
    #[arg(long = "deleted", value_name = "PACKAGE")]
    deleted: Vec<String>,
}

impl PlanArgs {
    fn deleted(&self) -> HashSet<String> {
        self.deleted.iter().cloned().collect()
    }
}

#[derive(Subcommand)]
pub(crate) enum PreCommands {
    /// Start a prerelease session; versions get a `-<tag>.<n>` suffix
    Enter {
        /// Prerelease tag, for example `next` or `beta`
        tag: String,
    },
    /// Leave prerelease mode; the next `version` run releases stable versions
    Exit,
}

impl Commands {
    pub(crate) fn execute(self, start_path: &Path) -> Result<()> {
        match self {
            Self::Status(args) => status::run(start_path, &args.deleted()),
            Self::Version(args) => version::run(start_path, args.deleted()),
            Self::Pre(command) => pre::run(start_path, command),
        }
    }
}
