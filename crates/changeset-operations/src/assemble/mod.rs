//! Release plan assembly.
//!
//! Changesets are flattened into one release per package, then dependent
//! propagation and the fixed and linked group rules run until a pass changes
//! nothing. Bumps only ever grow and base versions only move up, so the loop
//! settles. Final versions are computed last, with prerelease decoration when
//! a session is active.

mod context;
mod flatten;
mod groups;
mod plan;
mod propagate;
mod release_set;
mod versions;

use std::collections::HashSet;

use changeset_core::{Changeset, Package};
use changeset_project::{Config, PreState, ResolvedConfig};
use changeset_workspace::DependentsGraph;
use tracing::debug;

pub use plan::{ComprehensiveRelease, DeletedRelease, ReleasePlan};

use self::context::Context;
use self::release_set::ReleaseSet;
use crate::Result;
use crate::error::InternalError;

/// Everything the engine reads. Nothing here is modified.
#[derive(Debug, Clone, Copy)]
pub struct AssembleInput<'a> {
    pub packages: &'a [Package],
    /// Must be built from `packages`.
    pub graph: &'a DependentsGraph,
    pub changesets: &'a [Changeset],
    pub config: &'a Config,
    pub groups: &'a ResolvedConfig,
    pub pre_state: Option<&'a PreState>,
    /// Package names changesets may still mention after their removal.
    pub deleted: &'a HashSet<String>,
}

/// Assembles the release plan for `input`.
///
/// Expects input that passed [`crate::validate::validate`].
///
/// # Errors
///
/// Returns `OperationError::UnknownPackage` for a changeset entry naming a
/// package that is neither in the workspace nor declared deleted,
/// `OperationError::InvalidRange` for an unparseable dependency range and
/// `OperationError::Internal` when an engine invariant is broken.
pub fn assemble_release_plan(input: &AssembleInput<'_>) -> Result<ReleasePlan> {
    let ctx = Context::new(input)?;
    let mut set = ReleaseSet::with_len(ctx.packages.len());

    let deleted = flatten::flatten(&ctx, input.changesets, input.deleted, &mut set)?;
    flatten::release_exiting_prereleases(&ctx, &mut set)?;

    let limit = ctx.packages.len() * 4 + 1;
    let mut passes = 0;
    loop {
        passes += 1;
        if passes > limit {
            return Err(InternalError::FixpointDiverged { passes: limit }.into());
        }

        let propagated = propagate::propagate(&ctx, &mut set)?;
        let fixed = groups::apply_fixed(&ctx, &mut set);
        let linked = groups::apply_linked(&ctx, &mut set);
        debug!(pass = passes, propagated, fixed, linked, "assembly pass");

        if !(propagated || fixed || linked) {
            break;
        }
    }

    let (releases, pre_state) = versions::finalize(&ctx, &set)?;

    Ok(ReleasePlan {
        changesets: input.changesets.to_vec(),
        releases,
        deleted,
        pre_state,
    })
}
