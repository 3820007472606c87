use std::fmt;
use std::path::Path;

use changeset_core::BumpType;
use globset::{GlobBuilder, GlobMatcher};
use serde::Deserialize;

use crate::error::ProjectError;
use crate::{CONFIG_FILE, DEFAULT_CHANGESET_DIR};

/// Lowest dependency bump that rewrites dependents' in-range declarations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateInternalDependencies {
    #[default]
    Patch,
    Minor,
}

impl UpdateInternalDependencies {
    #[must_use]
    pub const fn threshold(self) -> BumpType {
        match self {
            Self::Patch => BumpType::Patch,
            Self::Minor => BumpType::Minor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrivatePackages {
    /// When false, private packages are never versioned.
    pub version: bool,
}

impl Default for PrivatePackages {
    fn default() -> Self {
        Self { version: true }
    }
}

/// Contents of `.changeset/config.toml`.
///
/// `fixed`, `linked` and `ignore` hold package names or glob patterns over
/// package names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub fixed: Vec<Vec<String>>,
    pub linked: Vec<Vec<String>>,
    pub ignore: Vec<String>,
    pub update_internal_dependencies: UpdateInternalDependencies,
    pub only_update_peer_dependents_when_out_of_range: bool,
    pub bump_versions_with_workspace_protocol_only: bool,
    pub private_packages: PrivatePackages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSection {
    Fixed,
    Linked,
    Ignore,
}

impl fmt::Display for PatternSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fixed => "fixed",
            Self::Linked => "linked",
            Self::Ignore => "ignore",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedPattern {
    pub section: PatternSection,
    pub pattern: String,
}

/// Config whose patterns have been expanded to concrete package names.
///
/// Group members and ignored names keep the order of the package list they
/// were resolved against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub fixed: Vec<Vec<String>>,
    pub linked: Vec<Vec<String>>,
    pub ignore: Vec<String>,
    pub unmatched: Vec<UnmatchedPattern>,
}

impl Config {
    /// Expands every pattern against `package_names`. Patterns that match no
    /// package are collected in [`ResolvedConfig::unmatched`].
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::GlobPattern` if a pattern is not a valid glob.
    pub fn resolve(&self, package_names: &[&str]) -> Result<ResolvedConfig, ProjectError> {
        let mut unmatched = Vec::new();

        let mut resolve_groups = |groups: &[Vec<String>], section| {
            groups
                .iter()
                .map(|group| expand(group, section, package_names, &mut unmatched))
                .collect::<Result<Vec<_>, _>>()
        };

        let fixed = resolve_groups(&self.fixed, PatternSection::Fixed)?;
        let linked = resolve_groups(&self.linked, PatternSection::Linked)?;
        let ignore = expand(&self.ignore, PatternSection::Ignore, package_names, &mut unmatched)?;

        Ok(ResolvedConfig {
            fixed,
            linked,
            ignore,
            unmatched,
        })
    }
}

fn matcher(pattern: &str) -> Result<GlobMatcher, ProjectError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| ProjectError::GlobPattern {
            pattern: pattern.to_string(),
            source,
        })
}

fn expand(
    patterns: &[String],
    section: PatternSection,
    package_names: &[&str],
    unmatched: &mut Vec<UnmatchedPattern>,
) -> Result<Vec<String>, ProjectError> {
    let mut selected = vec![false; package_names.len()];

    for pattern in patterns {
        let matcher = matcher(pattern)?;
        let mut any = false;
        for (index, name) in package_names.iter().enumerate() {
            if matcher.is_match(name) {
                selected[index] = true;
                any = true;
            }
        }
        if !any {
            unmatched.push(UnmatchedPattern {
                section,
                pattern: pattern.clone(),
            });
        }
    }

    Ok(package_names
        .iter()
        .zip(selected)
        .filter(|(_, selected)| *selected)
        .map(|(name, _)| (*name).to_string())
        .collect())
}

/// # Errors
///
/// Returns `ProjectError::ConfigParse` if the content is not a valid config.
pub fn parse_config(content: &str, path: &Path) -> Result<Config, ProjectError> {
    toml::from_str(content).map_err(|source| ProjectError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads `.changeset/config.toml` under `root`, or the defaults when the file
/// does not exist.
///
/// # Errors
///
/// Returns `ProjectError` if the file exists but cannot be read or parsed.
pub fn load_config(root: &Path) -> Result<Config, ProjectError> {
    let path = root.join(DEFAULT_CHANGESET_DIR).join(CONFIG_FILE);

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ProjectError::Read {
        path: path.clone(),
        source,
    })?;

    parse_config(&content, &path)
}
