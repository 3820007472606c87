//! User-facing checks run before a release plan is assembled.
//!
//! Every rule is evaluated and all failures are reported together.

use std::collections::{HashMap, HashSet};
use std::fmt;

use changeset_core::{Changeset, DependencyKind, Package};
use changeset_project::{PatternSection, ResolvedConfig};

/// A single validation error with an actionable tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A `fixed`, `linked` or `ignore` entry selects no workspace package.
    UnmatchedPattern {
        section: PatternSection,
        pattern: String,
    },
    /// A package belongs to more than one fixed group.
    MultipleFixedGroups { package: String },
    /// A changeset names a package that is neither in the workspace nor
    /// declared deleted.
    UnknownPackage { changeset: String, package: String },
    /// A changeset releases ignored and non-ignored packages together.
    MixedIgnoredChangeset {
        changeset: String,
        ignored: Vec<String>,
        released: Vec<String>,
    },
    /// A non-ignored package depends on an ignored one.
    DependsOnIgnored { package: String, dependency: String },
    /// An ignored package shares a fixed or linked group with non-ignored members.
    IgnoredInGroup {
        section: PatternSection,
        package: String,
    },
}

impl ValidationError {
    /// Returns an actionable tip for resolving this error.
    #[must_use]
    pub fn tip(&self) -> String {
        match self {
            Self::UnmatchedPattern { section, pattern } => {
                format!("Remove '{pattern}' from `{section}` in .changeset/config.toml or fix its spelling")
            }
            Self::MultipleFixedGroups { package } => {
                format!("Keep '{package}' in a single `fixed` group")
            }
            Self::UnknownPackage { changeset, package } => format!(
                "Edit .changeset/{changeset}.md to drop '{package}', or pass `--deleted {package}` if it was removed"
            ),
            Self::MixedIgnoredChangeset { changeset, .. } => format!(
                "Split .changeset/{changeset}.md so ignored packages get their own changeset"
            ),
            Self::DependsOnIgnored {
                package,
                dependency,
            } => format!("Add '{package}' to `ignore`, or stop ignoring '{dependency}'"),
            Self::IgnoredInGroup { section, package } => format!(
                "Ignore the whole `{section}` group containing '{package}', or stop ignoring it"
            ),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedPattern { section, pattern } => {
                write!(f, "`{section}` entry '{pattern}' matches no package")
            }
            Self::MultipleFixedGroups { package } => {
                write!(f, "package '{package}' is in more than one fixed group")
            }
            Self::UnknownPackage { changeset, package } => {
                write!(f, "changeset '{changeset}' names unknown package '{package}'")
            }
            Self::MixedIgnoredChangeset {
                changeset,
                ignored,
                released,
            } => write!(
                f,
                "changeset '{changeset}' mixes ignored packages ({}) with released ones ({})",
                ignored.join(", "),
                released.join(", ")
            ),
            Self::DependsOnIgnored {
                package,
                dependency,
            } => write!(
                f,
                "package '{package}' depends on ignored package '{dependency}'"
            ),
            Self::IgnoredInGroup { section, package } => write!(
                f,
                "ignored package '{package}' is in a {section} group with packages that are not ignored"
            ),
        }
    }
}

/// Collection of validation errors (guaranteed non-empty when constructed).
#[derive(Debug)]
#[allow(clippy::len_without_is_empty)]
pub struct ValidationErrors {
    first: ValidationError,
    rest: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Creates a new `ValidationErrors` from a vector, returning `None` if empty.
    #[must_use]
    pub fn try_from_vec(mut errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }
        let first = errors.remove(0);
        Some(Self {
            first,
            rest: errors,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ValidationError> {
        let mut errors = vec![self.first];
        errors.extend(self.rest);
        errors
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "validation failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {error}", i + 1)?;
            writeln!(f, "     Tip: {}", error.tip())?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

#[derive(Debug, Default)]
struct ValidationErrorCollector {
    errors: Vec<ValidationError>,
}

impl ValidationErrorCollector {
    fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        ValidationErrors::try_from_vec(self.errors).map_or(Ok(()), Err)
    }
}

pub struct ValidationInput<'a> {
    pub packages: &'a [Package],
    pub changesets: &'a [Changeset],
    pub groups: &'a ResolvedConfig,
    /// Packages removed from the workspace that changesets may still name.
    pub deleted: &'a HashSet<String>,
}

/// Runs every rule, collecting all failures.
///
/// # Errors
///
/// Returns `ValidationErrors` listing each failed rule.
pub fn validate(input: &ValidationInput<'_>) -> Result<(), ValidationErrors> {
    let mut collector = ValidationErrorCollector::default();

    for unmatched in &input.groups.unmatched {
        collector.push(ValidationError::UnmatchedPattern {
            section: unmatched.section,
            pattern: unmatched.pattern.clone(),
        });
    }

    check_fixed_disjoint(input.groups, &mut collector);
    check_changesets(input, &mut collector);
    check_ignored_dependencies(input, &mut collector);
    check_ignored_groups(input.groups, &mut collector);

    collector.into_result()
}

fn check_fixed_disjoint(groups: &ResolvedConfig, collector: &mut ValidationErrorCollector) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for name in groups.fixed.iter().flatten() {
        let count = counts.entry(name.as_str()).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(name.as_str());
        }
    }

    for package in order {
        collector.push(ValidationError::MultipleFixedGroups {
            package: package.to_string(),
        });
    }
}

fn check_changesets(input: &ValidationInput<'_>, collector: &mut ValidationErrorCollector) {
    let known: HashSet<&str> = input.packages.iter().map(|p| p.name.as_str()).collect();
    let ignored: HashSet<&str> = input.groups.ignore.iter().map(String::as_str).collect();

    for changeset in input.changesets {
        let mut ignored_names = Vec::new();
        let mut released_names = Vec::new();

        for release in &changeset.releases {
            let name = release.name.as_str();
            if !known.contains(name) {
                if !input.deleted.contains(name) {
                    collector.push(ValidationError::UnknownPackage {
                        changeset: changeset.id.clone(),
                        package: release.name.clone(),
                    });
                }
                continue;
            }
            if ignored.contains(name) {
                ignored_names.push(release.name.clone());
            } else {
                released_names.push(release.name.clone());
            }
        }

        if !ignored_names.is_empty() && !released_names.is_empty() {
            collector.push(ValidationError::MixedIgnoredChangeset {
                changeset: changeset.id.clone(),
                ignored: ignored_names,
                released: released_names,
            });
        }
    }
}

/// Dev-only dependencies are exempt: an ignored package never forces a
/// release through them.
fn check_ignored_dependencies(
    input: &ValidationInput<'_>,
    collector: &mut ValidationErrorCollector,
) {
    let ignored: HashSet<&str> = input.groups.ignore.iter().map(String::as_str).collect();
    if ignored.is_empty() {
        return;
    }

    for package in input.packages {
        if ignored.contains(package.name.as_str()) {
            continue;
        }

        let mut reported: HashSet<&str> = HashSet::new();
        for (kind, name, _) in package.all_dependencies() {
            if kind == DependencyKind::DevDependencies || !ignored.contains(name) {
                continue;
            }
            if reported.insert(name) {
                collector.push(ValidationError::DependsOnIgnored {
                    package: package.name.clone(),
                    dependency: name.to_string(),
                });
            }
        }
    }
}

fn check_ignored_groups(groups: &ResolvedConfig, collector: &mut ValidationErrorCollector) {
    let ignored: HashSet<&str> = groups.ignore.iter().map(String::as_str).collect();
    if ignored.is_empty() {
        return;
    }

    let sections = [
        (PatternSection::Fixed, &groups.fixed),
        (PatternSection::Linked, &groups.linked),
    ];

    for (section, section_groups) in sections {
        for group in section_groups {
            let has_released = group.iter().any(|name| !ignored.contains(name.as_str()));
            if !has_released {
                continue;
            }
            for name in group.iter().filter(|name| ignored.contains(name.as_str())) {
                collector.push(ValidationError::IgnoredInGroup {
                    section,
                    package: name.clone(),
                });
            }
        }
    }
}
