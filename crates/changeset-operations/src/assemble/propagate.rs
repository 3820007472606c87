use std::collections::VecDeque;

use changeset_core::{BumpType, DependencyKind};
use changeset_version::DeclaredRange;
use changeset_workspace::DependencyEdge;
use semver::Version;
use tracing::debug;

use super::context::Context;
use super::release_set::{InternalRelease, ReleaseSet};
use crate::Result;
use crate::error::{InternalError, OperationError};

/// Pushes releases onto dependents whose declared ranges the new versions
/// would leave, until no dependent needs a stronger release.
///
/// Returns true if any release was created or upgraded.
pub(super) fn propagate(ctx: &Context<'_>, set: &mut ReleaseSet) -> Result<bool> {
    let mut queue: VecDeque<usize> = set.indices().collect();
    let mut changed = false;

    while let Some(index) = queue.pop_front() {
        let Some(release) = set.get(index) else {
            continue;
        };
        if !release.bump_type.is_release() {
            continue;
        }
        let bump = release.bump_type;
        let prospective = release.next_version();

        let package = ctx.package(index);
        let name = &package.name;
        let dependents = ctx
            .graph
            .dependents(index)
            .ok_or_else(|| InternalError::MissingGraphNode { name: name.clone() })?;

        for (dependent, edge) in dependents {
            if ctx.is_skipped(dependent) {
                continue;
            }

            let out_of_range = leaves_range(ctx, dependent, name, edge, &package.version, &prospective)?;
            let Some(required) = required_bump(ctx, set, dependent, edge, bump, out_of_range) else {
                continue;
            };

            let dependent_name = &ctx.package(dependent).name;
            match set.get_mut(dependent) {
                Some(existing) if existing.bump_type >= required => continue,
                Some(existing) => {
                    debug!(
                        package = %dependent_name,
                        from = %existing.bump_type,
                        to = %required,
                        dependency = %name,
                        "upgrading dependent release"
                    );
                    existing.bump_type = required;
                }
                None => {
                    debug!(
                        package = %dependent_name,
                        bump = %required,
                        dependency = %name,
                        "creating dependent release"
                    );
                    set.insert(
                        dependent,
                        InternalRelease::new(required, ctx.package(dependent).version.clone()),
                    );
                }
            }

            changed = true;
            queue.push_back(dependent);
        }
    }

    Ok(changed)
}

fn leaves_range(
    ctx: &Context<'_>,
    dependent: usize,
    dependency: &str,
    edge: &DependencyEdge,
    current: &Version,
    prospective: &Version,
) -> Result<bool> {
    for declaration in &edge.declarations {
        let declared = DeclaredRange::resolve(&declaration.range, current).map_err(|source| {
            OperationError::InvalidRange {
                package: ctx.package(dependent).name.clone(),
                dependency: dependency.to_string(),
                source,
            }
        })?;
        if !declared.admits(prospective) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn required_bump(
    ctx: &Context<'_>,
    set: &ReleaseSet,
    dependent: usize,
    edge: &DependencyEdge,
    bump: BumpType,
    out_of_range: bool,
) -> Option<BumpType> {
    let current = set.bump_of(dependent);

    let peer_escalation = edge.has_kind(DependencyKind::PeerDependencies)
        && bump > BumpType::Patch
        && current != Some(BumpType::Major)
        && (!ctx.only_update_peer_dependents_when_out_of_range || out_of_range);
    if peer_escalation {
        return Some(BumpType::Major);
    }

    if out_of_range && !set.is_releasing(dependent) {
        if edge.is_dev_only() {
            return Some(BumpType::None);
        }
        return Some(BumpType::Patch);
    }

    None
}
