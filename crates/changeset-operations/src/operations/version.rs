use std::collections::HashSet;
use std::path::{Path, PathBuf};

use changeset_manifest::{ManifestPatch, PatchOptions, plan_patch};
use changeset_project::{Config, PreState};
use changeset_workspace::MANIFEST_FILE;
use rayon::prelude::*;
use tracing::{debug, info};

use super::planning::{PlanSources, prepare_plan};
use crate::Result;
use crate::assemble::ReleasePlan;
use crate::traits::{
    ChangesetReader, ChangesetRemover, ConfigLoader, ManifestWriter, PreStateIO,
    WorkspaceProvider,
};

#[derive(Debug, Clone, Default)]
pub struct VersionInput {
    /// Packages removed from the workspace that pending changesets may still name.
    pub deleted: HashSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreStateChange {
    Unchanged,
    Saved,
    Removed,
}

#[derive(Debug)]
pub struct VersionOutput {
    pub plan: ReleasePlan,
    /// Manifests that were rewritten, in workspace package order.
    pub patched: Vec<PathBuf>,
    pub removed_changesets: Vec<String>,
    pub pre_state: PreStateChange,
}

/// Applies the release plan: rewrites manifests, persists the prerelease
/// state and deletes the consumed changesets.
pub struct VersionOperation<W, R, C, S, M> {
    workspace_provider: W,
    changeset_io: R,
    config_loader: C,
    pre_state_io: S,
    manifest_writer: M,
}

impl<W, R, C, S, M> VersionOperation<W, R, C, S, M>
where
    W: WorkspaceProvider,
    R: ChangesetReader + ChangesetRemover,
    C: ConfigLoader,
    S: PreStateIO,
    M: ManifestWriter,
{
    pub fn new(
        workspace_provider: W,
        changeset_io: R,
        config_loader: C,
        pre_state_io: S,
        manifest_writer: M,
    ) -> Self {
        Self {
            workspace_provider,
            changeset_io,
            config_loader,
            pre_state_io,
            manifest_writer,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the plan cannot be computed, or if a manifest,
    /// the prerelease state or a changeset file cannot be written or removed.
    pub fn execute(&self, start_path: &Path, input: &VersionInput) -> Result<VersionOutput> {
        let prepared = prepare_plan(
            &PlanSources {
                workspace_provider: &self.workspace_provider,
                changeset_reader: &self.changeset_io,
                config_loader: &self.config_loader,
                pre_state_io: &self.pre_state_io,
            },
            start_path,
            &input.deleted,
        )?;
        let root = prepared.workspace.root.as_path();
        let plan = prepared.plan;

        let options = patch_options(&prepared.config);
        let released = plan.released_versions();
        let mut patches = Vec::new();
        for package in &prepared.workspace.packages {
            let patch = plan_patch(package, &released, &options)?;
            if !patch.is_empty() {
                patches.push((package.dir.as_path(), patch));
            }
        }

        let patched = self.apply_patches(&patches)?;

        let pre_state =
            self.persist_pre_state(root, prepared.pre_state.as_ref(), plan.pre_state.as_ref())?;

        let changeset_dir = prepared.workspace.changeset_dir();
        let mut removed_changesets = Vec::with_capacity(plan.changesets.len());
        for changeset in &plan.changesets {
            self.changeset_io
                .remove_changeset(&changeset_dir, &changeset.id)?;
            removed_changesets.push(changeset.id.clone());
        }

        info!(
            manifests = patched.len(),
            changesets = removed_changesets.len(),
            "applied release plan"
        );

        Ok(VersionOutput {
            plan,
            patched,
            removed_changesets,
            pre_state,
        })
    }

    fn apply_patches(&self, patches: &[(&Path, ManifestPatch)]) -> Result<Vec<PathBuf>> {
        let written = patches
            .par_iter()
            .map(|(dir, patch)| -> Result<Option<PathBuf>> {
                let changed = self.manifest_writer.apply(dir, patch)?;
                Ok(changed.then(|| dir.join(MANIFEST_FILE)))
            })
            .collect::<Result<Vec<Option<PathBuf>>>>()?;

        Ok(written.into_iter().flatten().collect())
    }

    fn persist_pre_state(
        &self,
        root: &Path,
        stored: Option<&PreState>,
        next: Option<&PreState>,
    ) -> Result<PreStateChange> {
        match (stored, next) {
            (_, Some(next)) => {
                self.pre_state_io.save(root, next)?;
                debug!(tag = %next.tag, sequence = next.sequence_number, "saved prerelease state");
                Ok(PreStateChange::Saved)
            }
            (Some(_), None) => {
                self.pre_state_io.remove(root)?;
                debug!("prerelease session finished");
                Ok(PreStateChange::Removed)
            }
            (None, None) => Ok(PreStateChange::Unchanged),
        }
    }
}

fn patch_options(config: &Config) -> PatchOptions {
    PatchOptions {
        update_internal_dependencies: config.update_internal_dependencies.threshold(),
        only_update_peer_dependents_when_out_of_range: config
            .only_update_peer_dependents_when_out_of_range,
        bump_versions_with_workspace_protocol_only: config.bump_versions_with_workspace_protocol_only,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use changeset_core::{BumpType, DependencyKind};
    use changeset_manifest::DependencyUpdate;
    use changeset_project::{PreMode, UpdateInternalDependencies};
    use semver::Version;

    use super::*;
    use crate::mocks::{
        MockChangesetStore, MockConfigLoader, MockManifestWriter, MockPreStateIO,
        MockWorkspaceProvider, make_changeset, make_dependent, make_package,
    };

    struct Harness {
        store: Arc<MockChangesetStore>,
        pre_state_io: Arc<MockPreStateIO>,
        writer: Arc<MockManifestWriter>,
    }

    impl Harness {
        fn new(store: MockChangesetStore, pre_state_io: MockPreStateIO) -> Self {
            Self {
                store: Arc::new(store),
                pre_state_io: Arc::new(pre_state_io),
                writer: Arc::new(MockManifestWriter::new()),
            }
        }

        fn run(&self, workspace: MockWorkspaceProvider, config: Config) -> Result<VersionOutput> {
            VersionOperation::new(
                workspace,
                Arc::clone(&self.store),
                MockConfigLoader::new(config),
                Arc::clone(&self.pre_state_io),
                Arc::clone(&self.writer),
            )
            .execute(Path::new("/any"), &VersionInput::default())
        }
    }

    fn v(s: &str) -> Version {
        Version::parse(s).expect("valid version")
    }

    #[test]
    fn patches_released_packages_and_dependents() {
        let workspace = MockWorkspaceProvider::new(vec![
            make_package("a", "1.0.0"),
            make_dependent("b", "1.0.0", DependencyKind::Dependencies, "a", "^1.0.0"),
            make_package("c", "1.0.0"),
        ]);
        let harness = Harness::new(
            MockChangesetStore::new().with_changeset(make_changeset("break-a", &[("a", BumpType::Major)])),
            MockPreStateIO::new(),
        );

        let output = harness.run(workspace, Config::default()).expect("version succeeds");

        assert_eq!(
            output.patched,
            vec![
                PathBuf::from("/mock/workspace/packages/a/package.json"),
                PathBuf::from("/mock/workspace/packages/b/package.json"),
            ]
        );

        let applied = harness.writer.applied();
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0].1.version, Some(v("2.0.0")));
        assert_eq!(applied[1].1.version, Some(v("1.0.1")));
        assert_eq!(
            applied[1].1.dependencies,
            vec![DependencyUpdate {
                kind: DependencyKind::Dependencies,
                name: "a".to_string(),
                range: "^2.0.0".to_string(),
            }]
        );

        assert_eq!(output.removed_changesets, vec!["break-a"]);
        assert_eq!(harness.store.removed(), vec!["break-a"]);
        assert_eq!(output.pre_state, PreStateChange::Unchanged);
    }

    #[test]
    fn nothing_to_do_without_changesets() {
        let harness = Harness::new(MockChangesetStore::new(), MockPreStateIO::new());

        let output = harness
            .run(MockWorkspaceProvider::packages(&[("a", "1.0.0")]), Config::default())
            .expect("version succeeds");

        assert!(output.plan.is_empty());
        assert!(output.patched.is_empty());
        assert!(harness.writer.applied().is_empty());
    }

    #[test]
    fn minor_threshold_leaves_patch_ranges_alone() {
        let workspace = MockWorkspaceProvider::new(vec![
            make_package("a", "1.0.0"),
            make_dependent("b", "1.0.0", DependencyKind::Dependencies, "a", "^1.0.0"),
        ]);
        let harness = Harness::new(
            MockChangesetStore::new().with_changeset(make_changeset("fix-a", &[("a", BumpType::Patch)])),
            MockPreStateIO::new(),
        );
        let config = Config {
            update_internal_dependencies: UpdateInternalDependencies::Minor,
            ..Config::default()
        };

        let output = harness.run(workspace, config).expect("version succeeds");

        assert_eq!(
            output.patched,
            vec![PathBuf::from("/mock/workspace/packages/a/package.json")]
        );
    }

    #[test]
    fn pre_mode_saves_advanced_state() {
        let packages = vec![make_package("a", "1.0.0")];
        let state = PreState::enter("next", &packages).expect("valid tag");
        let harness = Harness::new(
            MockChangesetStore::new().with_changeset(make_changeset("fix-a", &[("a", BumpType::Patch)])),
            MockPreStateIO::new().with_state(state),
        );

        let output = harness
            .run(MockWorkspaceProvider::new(packages), Config::default())
            .expect("version succeeds");

        assert_eq!(output.pre_state, PreStateChange::Saved);
        assert_eq!(harness.writer.applied()[0].1.version, Some(v("1.0.1-next.0")));
        let saved = harness.pre_state_io.state().expect("state saved");
        assert_eq!(saved.sequence_number, 1);
        assert_eq!(saved.mode, PreMode::Pre);
    }

    #[test]
    fn exit_mode_removes_state() {
        let initial = vec![make_package("a", "1.0.0")];
        let mut state = PreState::enter("next", &initial).expect("valid tag");
        state.record_bump("a", &v("1.0.0"), BumpType::Minor);
        state.exit();
        let harness = Harness::new(MockChangesetStore::new(), MockPreStateIO::new().with_state(state));

        let output = harness
            .run(
                MockWorkspaceProvider::packages(&[("a", "1.1.0-next.3")]),
                Config::default(),
            )
            .expect("version succeeds");

        assert_eq!(output.pre_state, PreStateChange::Removed);
        assert!(harness.pre_state_io.state().is_none());
        assert_eq!(harness.writer.applied()[0].1.version, Some(v("1.1.0")));
    }
}
