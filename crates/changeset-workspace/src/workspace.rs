use std::collections::HashMap;
use std::path::{Path, PathBuf};

use changeset_core::Package;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use tracing::debug;

use crate::error::WorkspaceError;
use crate::package_json::{MANIFEST_FILE, PackageJson, read_manifest};

const PNPM_WORKSPACE_FILE: &str = "pnpm-workspace.yaml";
const SKIPPED_DIRS: &[&str] = &["node_modules"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceKind {
    /// Root `package.json` declares `workspaces`.
    Npm,
    /// Root holds a `pnpm-workspace.yaml`.
    Pnpm,
    /// A lone package without workspace configuration.
    Single,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub root: PathBuf,
    pub kind: WorkspaceKind,
    pub packages: Vec<Package>,
}

impl Workspace {
    #[must_use]
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn changeset_dir(&self) -> PathBuf {
        self.root.join(".changeset")
    }
}

#[derive(Debug, Default, Deserialize)]
struct PnpmWorkspace {
    #[serde(default)]
    packages: Vec<String>,
}

/// Finds the workspace containing `start_dir` and reads its packages.
///
/// Walks up from `start_dir` looking for a `pnpm-workspace.yaml` or a
/// `package.json` with a `workspaces` field. If none is found, the nearest
/// `package.json` is treated as a single-package repository.
///
/// # Errors
///
/// Returns `WorkspaceError` if no manifest can be found, a manifest fails to
/// parse, a workspace pattern is invalid, or two packages share a name.
pub fn discover_workspace(start_dir: &Path) -> Result<Workspace, WorkspaceError> {
    let start_dir = start_dir
        .canonicalize()
        .map_err(|source| WorkspaceError::ManifestRead {
            path: start_dir.to_path_buf(),
            source,
        })?;

    let root = find_workspace_root(&start_dir)?;

    let workspace = match root {
        Root::Pnpm(root) => {
            let patterns = read_pnpm_patterns(&root.join(PNPM_WORKSPACE_FILE))?;
            let packages = collect_packages(&root, &patterns)?;
            Workspace {
                root,
                kind: WorkspaceKind::Pnpm,
                packages,
            }
        }
        Root::Npm(root, patterns) => {
            let packages = collect_packages(&root, &patterns)?;
            Workspace {
                root,
                kind: WorkspaceKind::Npm,
                packages,
            }
        }
        Root::Single(root, manifest) => {
            let package = manifest.into_package(&root)?;
            Workspace {
                root,
                kind: WorkspaceKind::Single,
                packages: vec![package],
            }
        }
    };

    debug!(
        root = %workspace.root.display(),
        kind = ?workspace.kind,
        packages = workspace.packages.len(),
        "discovered workspace"
    );

    Ok(workspace)
}

enum Root {
    Pnpm(PathBuf),
    Npm(PathBuf, Vec<String>),
    Single(PathBuf, Box<PackageJson>),
}

fn find_workspace_root(start_dir: &Path) -> Result<Root, WorkspaceError> {
    let mut current = start_dir.to_path_buf();
    let mut fallback_single: Option<(PathBuf, PackageJson)> = None;

    loop {
        if current.join(PNPM_WORKSPACE_FILE).is_file() {
            return Ok(Root::Pnpm(current));
        }

        let manifest_path = current.join(MANIFEST_FILE);
        if manifest_path.is_file() {
            let mut manifest = read_manifest(&manifest_path)?;

            if let Some(workspaces) = manifest.workspaces.take() {
                return Ok(Root::Npm(current, workspaces.patterns().to_vec()));
            }

            if fallback_single.is_none() {
                fallback_single = Some((current.clone(), manifest));
            }
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => {
                return fallback_single
                    .map(|(dir, manifest)| Root::Single(dir, Box::new(manifest)))
                    .ok_or_else(|| WorkspaceError::NotFound {
                        start_dir: start_dir.to_path_buf(),
                    });
            }
        }
    }
}

fn read_pnpm_patterns(path: &Path) -> Result<Vec<String>, WorkspaceError> {
    let content = std::fs::read_to_string(path).map_err(|source| WorkspaceError::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let parsed: PnpmWorkspace =
        serde_yml::from_str(&content).map_err(|source| WorkspaceError::PnpmWorkspaceParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(parsed.packages)
}

fn collect_packages(root: &Path, patterns: &[String]) -> Result<Vec<Package>, WorkspaceError> {
    let matcher = PatternMatcher::new(patterns)?;

    let mut dirs = Vec::new();
    collect_matching_dirs(root, root, &matcher, &mut dirs)?;
    dirs.sort();

    let mut packages: Vec<Package> = Vec::with_capacity(dirs.len());
    let mut seen: HashMap<String, PathBuf> = HashMap::new();

    for dir in dirs {
        if !dir.join(MANIFEST_FILE).is_file() {
            continue;
        }

        let package = read_manifest(&dir.join(MANIFEST_FILE))?.into_package(&dir)?;

        if let Some(first) = seen.get(&package.name) {
            return Err(WorkspaceError::DuplicatePackage {
                name: package.name,
                first: first.clone(),
                second: dir,
            });
        }

        seen.insert(package.name.clone(), dir);
        packages.push(package);
    }

    Ok(packages)
}

/// Include patterns plus `!`-prefixed exclusions, matched against paths
/// relative to the workspace root.
struct PatternMatcher {
    include: GlobSet,
    exclude: GlobSet,
}

impl PatternMatcher {
    fn new(patterns: &[String]) -> Result<Self, WorkspaceError> {
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();

        for raw in patterns {
            let (negated, pattern) = match raw.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, raw.as_str()),
            };
            let pattern = normalize_pattern(pattern);

            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|source| WorkspaceError::GlobPattern {
                    pattern: raw.clone(),
                    source,
                })?;

            if negated {
                exclude.add(glob);
            } else {
                include.add(glob);
            }
        }

        let build = |builder: GlobSetBuilder| {
            builder.build().map_err(|source| WorkspaceError::GlobPattern {
                pattern: patterns.join(", "),
                source,
            })
        };

        Ok(Self {
            include: build(include)?,
            exclude: build(exclude)?,
        })
    }

    fn is_match(&self, relative: &Path) -> bool {
        self.include.is_match(relative) && !self.exclude.is_match(relative)
    }
}

fn normalize_pattern(pattern: &str) -> &str {
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    pattern.trim_end_matches('/')
}

fn is_skipped_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.') || SKIPPED_DIRS.contains(&name))
}

fn collect_matching_dirs(
    base: &Path,
    current: &Path,
    matcher: &PatternMatcher,
    results: &mut Vec<PathBuf>,
) -> Result<(), WorkspaceError> {
    for entry in std::fs::read_dir(current)? {
        let path = entry?.path();

        if !path.is_dir() || is_skipped_dir(&path) {
            continue;
        }

        let relative = path.strip_prefix(base).unwrap_or(&path);
        if matcher.is_match(relative) {
            results.push(path.clone());
        }

        collect_matching_dirs(base, &path, matcher, results)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(patterns: &[&str]) -> PatternMatcher {
        let patterns: Vec<String> = patterns.iter().map(ToString::to_string).collect();
        PatternMatcher::new(&patterns).expect("valid patterns")
    }

    #[test]
    fn single_star_matches_one_level() {
        let m = matcher(&["packages/*"]);

        assert!(m.is_match(Path::new("packages/a")));
        assert!(!m.is_match(Path::new("packages/a/nested")));
    }

    #[test]
    fn double_star_matches_nested() {
        let m = matcher(&["packages/**"]);

        assert!(m.is_match(Path::new("packages/group/a")));
    }

    #[test]
    fn negated_pattern_excludes() {
        let m = matcher(&["packages/*", "!packages/internal"]);

        assert!(m.is_match(Path::new("packages/a")));
        assert!(!m.is_match(Path::new("packages/internal")));
    }

    #[test]
    fn leading_dot_slash_and_trailing_slash_are_ignored() {
        let m = matcher(&["./apps/*/"]);

        assert!(m.is_match(Path::new("apps/web")));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let patterns = vec!["packages/[".to_string()];

        let result = PatternMatcher::new(&patterns);

        assert!(matches!(result, Err(WorkspaceError::GlobPattern { .. })));
    }

    #[test]
    fn hidden_and_node_modules_dirs_are_skipped() {
        assert!(is_skipped_dir(Path::new("/repo/node_modules")));
        assert!(is_skipped_dir(Path::new("/repo/.git")));
        assert!(!is_skipped_dir(Path::new("/repo/packages")));
    }
}
