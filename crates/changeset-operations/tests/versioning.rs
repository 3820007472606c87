use std::collections::HashSet;
use std::fs;
use std::path::Path;

use changeset_operations::OperationError;
use changeset_operations::operations::{
    PreCommand, PreOperation, PreStateChange, StatusOperation, VersionInput, VersionOperation,
};
use changeset_operations::providers::{
    FileSystemChangesetIO, FileSystemConfigLoader, FileSystemManifestWriter, FileSystemPreStateIO,
    FileSystemWorkspaceProvider,
};
use changeset_workspace::read_package;
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, content).expect("write fixture");
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read file")
}

fn write_changeset(root: &Path, id: &str, package: &str, bump: &str) {
    write(
        &root.join(".changeset").join(format!("{id}.md")),
        &format!("---\n\"{package}\": {bump}\n---\n\nChange {package}.\n"),
    );
}

fn version_operation() -> VersionOperation<
    FileSystemWorkspaceProvider,
    FileSystemChangesetIO,
    FileSystemConfigLoader,
    FileSystemPreStateIO,
    FileSystemManifestWriter,
> {
    VersionOperation::new(
        FileSystemWorkspaceProvider::new(),
        FileSystemChangesetIO::new(),
        FileSystemConfigLoader::new(),
        FileSystemPreStateIO::new(),
        FileSystemManifestWriter::new(),
    )
}

fn pre_operation() -> PreOperation<FileSystemWorkspaceProvider, FileSystemPreStateIO> {
    PreOperation::new(FileSystemWorkspaceProvider::new(), FileSystemPreStateIO::new())
}

fn acme_workspace() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let root = dir.path();

    write(
        &root.join("package.json"),
        r#"{ "name": "acme", "private": true, "workspaces": ["packages/*"] }"#,
    );
    write(
        &root.join("packages/a/package.json"),
        "{\n  \"name\": \"@acme/a\",\n  \"version\": \"1.0.0\"\n}\n",
    );
    write(
        &root.join("packages/b/package.json"),
        "{\n  \"name\": \"@acme/b\",\n  \"version\": \"1.0.0\",\n  \"dependencies\": {\n    \"@acme/a\": \"workspace:^1.0.0\"\n  }\n}\n",
    );
    write(
        &root.join("packages/c/package.json"),
        "{\n    \"name\": \"@acme/c\",\n    \"version\": \"2.0.0\",\n    \"peerDependencies\": {\n        \"@acme/a\": \"^1.0.0\"\n    }\n}\n",
    );
    write(&root.join(".changeset/README.md"), "# Changesets\n");

    dir
}

#[test]
fn version_rewrites_manifests_and_consumes_changesets() -> anyhow::Result<()> {
    let dir = acme_workspace();
    let root = dir.path();
    write_changeset(root, "brave-cats", "@acme/a", "minor");

    let output = version_operation().execute(root, &VersionInput::default())?;

    assert_eq!(output.patched.len(), 3);
    assert_eq!(output.removed_changesets, vec!["brave-cats"]);
    assert_eq!(output.pre_state, PreStateChange::Unchanged);

    assert_eq!(
        read(&root.join("packages/a/package.json")),
        "{\n  \"name\": \"@acme/a\",\n  \"version\": \"1.1.0\"\n}\n"
    );
    assert_eq!(
        read(&root.join("packages/b/package.json")),
        "{\n  \"name\": \"@acme/b\",\n  \"version\": \"1.0.0\",\n  \"dependencies\": {\n    \"@acme/a\": \"workspace:^1.1.0\"\n  }\n}\n"
    );
    assert_eq!(
        read(&root.join("packages/c/package.json")),
        "{\n    \"name\": \"@acme/c\",\n    \"version\": \"3.0.0\",\n    \"peerDependencies\": {\n        \"@acme/a\": \"^1.1.0\"\n    }\n}\n"
    );

    assert!(!root.join(".changeset/brave-cats.md").exists());
    assert!(root.join(".changeset/README.md").exists());
    Ok(())
}

#[test]
fn status_leaves_files_untouched() -> anyhow::Result<()> {
    let dir = acme_workspace();
    let root = dir.path();
    write_changeset(root, "quiet-owls", "@acme/a", "major");
    let before = read(&root.join("packages/b/package.json"));

    let output = StatusOperation::new(
        FileSystemWorkspaceProvider::new(),
        FileSystemChangesetIO::new(),
        FileSystemConfigLoader::new(),
        FileSystemPreStateIO::new(),
    )
    .execute(root, &HashSet::new())?;

    let names: Vec<&str> = output.plan.releases.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["@acme/a", "@acme/b", "@acme/c"]);
    assert!(output.unchanged_packages.is_empty());
    assert_eq!(read(&root.join("packages/b/package.json")), before);
    assert!(root.join(".changeset/quiet-owls.md").exists());
    Ok(())
}

#[test]
fn invalid_changeset_aborts_before_writing() {
    let dir = acme_workspace();
    let root = dir.path();
    write_changeset(root, "typo", "@acme/aa", "patch");
    let before = read(&root.join("packages/a/package.json"));

    let err = version_operation()
        .execute(root, &VersionInput::default())
        .expect_err("validation fails");

    assert!(matches!(err, OperationError::ValidationFailed(_)));
    assert_eq!(read(&root.join("packages/a/package.json")), before);
    assert!(root.join(".changeset/typo.md").exists());
}

#[test]
fn deleted_package_changesets_are_consumed() -> anyhow::Result<()> {
    let dir = acme_workspace();
    let root = dir.path();
    write_changeset(root, "old-news", "@acme/legacy", "major");

    let input = VersionInput {
        deleted: HashSet::from(["@acme/legacy".to_string()]),
    };
    let output = version_operation().execute(root, &input)?;

    assert!(output.plan.is_empty());
    assert_eq!(output.plan.deleted.len(), 1);
    assert!(!root.join(".changeset/old-news.md").exists());
    Ok(())
}

#[test]
fn prerelease_session_round_trip() -> anyhow::Result<()> {
    let dir = acme_workspace();
    let root = dir.path();
    let a_dir = root.join("packages/a");

    pre_operation().execute(
        root,
        &PreCommand::Enter {
            tag: "next".to_string(),
        },
    )?;
    assert!(root.join(".changeset/pre.json").exists());

    write_changeset(root, "first", "@acme/a", "patch");
    let output = version_operation().execute(root, &VersionInput::default())?;
    assert_eq!(output.pre_state, PreStateChange::Saved);
    assert_eq!(read_package(&a_dir)?.version.to_string(), "1.0.1-next.0");

    write_changeset(root, "second", "@acme/a", "patch");
    version_operation().execute(root, &VersionInput::default())?;
    assert_eq!(read_package(&a_dir)?.version.to_string(), "1.0.1-next.1");
    assert!(read(&root.join(".changeset/pre.json")).contains("\"sequenceNumber\": 2"));

    pre_operation().execute(root, &PreCommand::Exit)?;
    let output = version_operation().execute(root, &VersionInput::default())?;
    assert_eq!(output.pre_state, PreStateChange::Removed);
    assert_eq!(read_package(&a_dir)?.version.to_string(), "1.0.1");
    assert!(!root.join(".changeset/pre.json").exists());
    Ok(())
}

#[test]
fn second_run_without_changesets_changes_nothing() -> anyhow::Result<()> {
    let dir = acme_workspace();
    let root = dir.path();
    write_changeset(root, "first", "@acme/a", "major");
    version_operation().execute(root, &VersionInput::default())?;
    let before = read(&root.join("packages/c/package.json"));

    let output = version_operation().execute(root, &VersionInput::default())?;

    assert!(output.plan.is_empty());
    assert!(output.patched.is_empty());
    assert_eq!(read(&root.join("packages/c/package.json")), before);
    Ok(())
}
