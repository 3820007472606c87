use changeset_core::BumpType;
use changeset_version::increment;
use semver::Version;
use tracing::debug;

use super::context::Context;
use super::release_set::{InternalRelease, ReleaseSet};

/// Releases every member of a fixed group together, with the same bump from
/// the same base version.
///
/// The base version only ever grows: it covers the members' current versions
/// and the base versions already assigned to their releases. A member that a
/// linked group pinned at or above the group's version carries the whole
/// group there.
pub(super) fn apply_fixed(ctx: &Context<'_>, set: &mut ReleaseSet) -> bool {
    let mut changed = false;

    for group in &ctx.fixed {
        let Some(bump) = highest_releasing_bump(set, group) else {
            continue;
        };

        let view: &ReleaseSet = set;
        let Some(old_version) = group
            .iter()
            .flat_map(|&member| {
                let current = &ctx.package(member).version;
                let assigned = view.get(member).map(|release| &release.old_version);
                std::iter::once(current).chain(assigned)
            })
            .max()
            .cloned()
        else {
            continue;
        };
        let version = increment(&old_version, bump);
        let aligned: Option<Version> = group
            .iter()
            .filter_map(|&member| view.get(member).and_then(|release| release.aligned_version.as_ref()))
            .filter(|aligned| **aligned >= version)
            .max()
            .cloned();

        for &member in group {
            if set.align(member, bump, &old_version, aligned.as_ref()) {
                debug!(package = %ctx.package(member).name, %bump, base = %old_version, "aligned fixed group member");
                changed = true;
            }
        }
    }

    changed
}

/// Lands every member of a linked group on the highest version any releasing
/// member would reach on its own.
///
/// Members keep their own old version and take the bump needed to reach the
/// shared version. A member that is not releasing joins only while its
/// current version is below the shared version.
pub(super) fn apply_linked(ctx: &Context<'_>, set: &mut ReleaseSet) -> bool {
    let mut changed = false;

    for group in &ctx.linked {
        let view: &ReleaseSet = set;
        let Some(target) = group
            .iter()
            .filter_map(|&member| view.get(member).filter(|release| release.bump_type.is_release()))
            .map(InternalRelease::next_version)
            .max()
        else {
            continue;
        };

        for &member in group {
            let current = &ctx.package(member).version;
            if !set.is_releasing(member) && *current >= target {
                continue;
            }
            if set.pin(member, current, &target) {
                debug!(package = %ctx.package(member).name, version = %target, "aligned linked group member");
                changed = true;
            }
        }
    }

    changed
}

fn highest_releasing_bump(set: &ReleaseSet, group: &[usize]) -> Option<BumpType> {
    group
        .iter()
        .filter_map(|&member| set.bump_of(member))
        .filter(|bump| bump.is_release())
        .max()
}
