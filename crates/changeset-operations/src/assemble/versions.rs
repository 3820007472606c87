use changeset_project::PreState;
use changeset_version::with_prerelease;

use super::context::Context;
use super::plan::ComprehensiveRelease;
use super::release_set::ReleaseSet;
use crate::Result;

/// Computes final versions for every release and the prerelease state that
/// follows from them.
///
/// The returned state is `None` unless a session is active.
pub(super) fn finalize(
    ctx: &Context<'_>,
    set: &ReleaseSet,
) -> Result<(Vec<ComprehensiveRelease>, Option<PreState>)> {
    let suffix = ctx.pre_state.and_then(PreState::active_suffix);

    let mut releases = Vec::new();
    for (index, release) in set.iter() {
        let new_version = if release.bump_type.is_release() {
            with_prerelease(release.next_version(), suffix)?
        } else {
            release.old_version.clone()
        };
        releases.push(ComprehensiveRelease {
            name: ctx.package(index).name.clone(),
            bump_type: release.bump_type,
            old_version: release.old_version.clone(),
            new_version,
            changeset_ids: release.changeset_ids.clone(),
        });
    }

    let next_state = ctx.pre_state.filter(|state| state.is_active()).map(|state| {
        let mut next = state.clone();
        let mut versioned = false;
        for release in releases.iter().filter(|r| r.bump_type.is_release()) {
            next.record_bump(&release.name, &release.old_version, release.bump_type);
            versioned = true;
        }
        if versioned {
            next.sequence_number += 1;
        }
        next
    });

    Ok((releases, next_state))
}
