use std::collections::HashSet;

use changeset_core::Changeset;
use changeset_version::is_prerelease;
use indexmap::IndexMap;
use tracing::debug;

use super::context::Context;
use super::plan::DeletedRelease;
use super::release_set::{InternalRelease, ReleaseSet};
use crate::Result;
use crate::error::{InternalError, OperationError};

/// Merges every changeset entry into one release per package, keeping the
/// highest bump. Entries naming declared-deleted packages are reported
/// separately.
pub(super) fn flatten(
    ctx: &Context<'_>,
    changesets: &[Changeset],
    deleted: &HashSet<String>,
    set: &mut ReleaseSet,
) -> Result<Vec<DeletedRelease>> {
    let mut deleted_report: IndexMap<&str, Vec<String>> = IndexMap::new();

    for changeset in changesets {
        for entry in &changeset.releases {
            let Some(index) = ctx.index_of(&entry.name) else {
                if deleted.contains(&entry.name) {
                    let ids = deleted_report.entry(entry.name.as_str()).or_default();
                    if !ids.contains(&changeset.id) {
                        ids.push(changeset.id.clone());
                    }
                    continue;
                }
                return Err(OperationError::UnknownPackage {
                    name: entry.name.clone(),
                    changeset: changeset.id.clone(),
                });
            };

            if ctx.is_skipped(index) {
                continue;
            }

            match set.get_mut(index) {
                Some(release) => {
                    release.bump_type = release.bump_type.max(entry.bump_type);
                    release.add_changeset(&changeset.id);
                }
                None => {
                    let mut release =
                        InternalRelease::new(entry.bump_type, ctx.package(index).version.clone());
                    release.add_changeset(&changeset.id);
                    set.insert(index, release);
                }
            }
        }
    }

    Ok(deleted_report
        .into_iter()
        .map(|(name, changeset_ids)| DeletedRelease {
            name: name.to_string(),
            changeset_ids,
        })
        .collect())
}

/// While exiting a prerelease session, every package still on a prerelease
/// version is released at the highest bump it saw during the session.
pub(super) fn release_exiting_prereleases(ctx: &Context<'_>, set: &mut ReleaseSet) -> Result<()> {
    let Some(pre_state) = ctx.pre_state.filter(|state| !state.is_active()) else {
        return Ok(());
    };

    for (index, package) in ctx.packages.iter().enumerate() {
        if ctx.is_skipped(index) || !is_prerelease(&package.version) {
            continue;
        }

        let highest = pre_state.highest_bump(&package.name);

        if let Some(release) = set.get_mut(index) {
            if let Some(highest) = highest {
                release.bump_type = release.bump_type.max(highest);
            }
            continue;
        }

        let highest = highest.ok_or_else(|| InternalError::MissingPrereleaseHistory {
            name: package.name.clone(),
        })?;
        debug!(package = %package.name, bump = %highest, "releasing prerelease on exit");
        set.insert(index, InternalRelease::new(highest, package.version.clone()));
    }

    Ok(())
}
