use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};

use crate::error::VersionError;

pub const WORKSPACE_PROTOCOL: &str = "workspace:";

const OPERATOR_CHARS: &[char] = &['<', '>', '=', '^', '~'];
const WILDCARDS: &[&str] = &["x", "X", "*"];

/// Returns true for `file:` and `link:` references, which point at local
/// paths rather than versions.
#[must_use]
pub fn is_local_path_protocol(raw: &str) -> bool {
    raw.starts_with("file:") || raw.starts_with("link:")
}

#[must_use]
pub fn strip_workspace_protocol(raw: &str) -> Option<&str> {
    raw.strip_prefix(WORKSPACE_PROTOCOL)
}

/// Leading operator of a declared range, preserved when the range is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOperator {
    Caret,
    Tilde,
    GreaterOrEqual,
    Greater,
    LessOrEqual,
    Exact,
}

impl RangeOperator {
    #[must_use]
    pub fn detect(range: &str) -> Self {
        if range.starts_with('^') {
            Self::Caret
        } else if range.starts_with('~') {
            Self::Tilde
        } else if range.starts_with(">=") {
            Self::GreaterOrEqual
        } else if range.starts_with('>') {
            Self::Greater
        } else if range.starts_with("<=") {
            Self::LessOrEqual
        } else {
            Self::Exact
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Caret => "^",
            Self::Tilde => "~",
            Self::GreaterOrEqual => ">=",
            Self::Greater => ">",
            Self::LessOrEqual => "<=",
            Self::Exact => "",
        }
    }
}

impl fmt::Display for RangeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An npm-style version range: `||`-separated alternatives of
/// space-separated comparators, with hyphen ranges and x-ranges.
///
/// Each alternative is lowered to a [`VersionReq`]. A bare full version
/// means an exact match, unlike Cargo where it means a caret requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    alternatives: Vec<VersionReq>,
    any: bool,
}

impl VersionRange {
    #[must_use]
    pub fn any() -> Self {
        Self {
            alternatives: vec![VersionReq::STAR],
            any: true,
        }
    }

    /// # Errors
    ///
    /// Returns `VersionError::InvalidRange` if a comparator cannot be parsed.
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let mut alternatives = Vec::new();
        let mut any = false;

        for alternative in raw.split("||") {
            match lower_alternative(alternative.trim(), raw)? {
                Some(req) => alternatives.push(req),
                None => {
                    any = true;
                    alternatives.push(VersionReq::STAR);
                }
            }
        }

        Ok(Self { alternatives, any })
    }

    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    /// True when the range places no constraint on the version (`*`, `x`, empty).
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.any
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A manifest dependency value interpreted against the dependency's version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredRange {
    /// `file:` or `link:`; follows whatever is on disk.
    LocalPath,
    Range(VersionRange),
}

impl DeclaredRange {
    /// Interprets `raw` as declared on a dependency currently at `current`.
    ///
    /// `workspace:*` pins the current version exactly, `workspace:^` and
    /// `workspace:~` mean `^current` and `~current`, any other workspace range
    /// is read with the protocol removed.
    ///
    /// # Errors
    ///
    /// Returns `VersionError::InvalidRange` if the range cannot be parsed.
    pub fn resolve(raw: &str, current: &Version) -> Result<Self, VersionError> {
        if is_local_path_protocol(raw) {
            return Ok(Self::LocalPath);
        }

        let range = match strip_workspace_protocol(raw) {
            Some("*") => VersionRange::parse(&format!("={current}"))?,
            Some("^") => VersionRange::parse(&format!("^{current}"))?,
            Some("~") => VersionRange::parse(&format!("~{current}"))?,
            Some(inner) => VersionRange::parse(inner)?,
            None => VersionRange::parse(raw)?,
        };

        Ok(Self::Range(range))
    }

    /// Local path references admit every version.
    #[must_use]
    pub fn admits(&self, version: &Version) -> bool {
        match self {
            Self::LocalPath => true,
            Self::Range(range) => range.matches(version),
        }
    }
}

fn lower_alternative(alternative: &str, full: &str) -> Result<Option<VersionReq>, VersionError> {
    let tokens = tokenize(alternative);

    let comparators: Vec<String> = match tokens.as_slice() {
        [from, dash, to] if dash == "-" => [
            lower_comparator(&format!(">={from}")),
            lower_comparator(&format!("<={to}")),
        ]
        .into_iter()
        .flatten()
        .collect(),
        _ => tokens.iter().filter_map(|t| lower_comparator(t)).collect(),
    };

    if comparators.is_empty() {
        return Ok(None);
    }

    VersionReq::parse(&comparators.join(", "))
        .map(Some)
        .map_err(|source| VersionError::InvalidRange {
            range: full.to_string(),
            source,
        })
}

/// Splits on whitespace, gluing a lone operator (`>= 1.0.0`) to its version.
fn tokenize(alternative: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut pending_operator: Option<String> = None;

    for word in alternative.split_whitespace() {
        if word != "-" && word.chars().all(|c| OPERATOR_CHARS.contains(&c)) {
            pending_operator = Some(word.to_string());
            continue;
        }
        match pending_operator.take() {
            Some(op) => tokens.push(format!("{op}{word}")),
            None => tokens.push(word.to_string()),
        }
    }

    tokens
}

/// Lowers one npm comparator to semver-crate syntax. `None` means "any".
fn lower_comparator(token: &str) -> Option<String> {
    let split = token
        .find(|c: char| !OPERATOR_CHARS.contains(&c))
        .unwrap_or(token.len());
    let (op, version) = token.split_at(split);
    let op = if op == "~>" { "~" } else { op };
    let version = version.strip_prefix('v').unwrap_or(version);

    let (core, suffix) = match version.find(['-', '+']) {
        Some(pos) => version.split_at(pos),
        None => (version, ""),
    };

    let parts: Vec<&str> = core
        .split('.')
        .take_while(|p| !p.is_empty() && !WILDCARDS.contains(p))
        .collect();

    if parts.is_empty() {
        return None;
    }

    let core = parts.join(".");
    let op = match op {
        "" => "=",
        other => other,
    };
    let suffix = if parts.len() == 3 { suffix } else { "" };

    Some(format!("{op}{core}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).expect("valid version")
    }

    fn range(s: &str) -> VersionRange {
        VersionRange::parse(s).expect("valid range")
    }

    #[test]
    fn caret_range_matches_same_major() {
        let r = range("^1.0.0");
        assert!(r.matches(&v("1.4.2")));
        assert!(!r.matches(&v("2.0.0")));
    }

    #[test]
    fn tilde_range_matches_same_minor() {
        let r = range("~1.2.0");
        assert!(r.matches(&v("1.2.9")));
        assert!(!r.matches(&v("1.3.0")));
    }

    #[test]
    fn bare_version_is_exact() {
        let r = range("1.0.0");
        assert!(r.matches(&v("1.0.0")));
        assert!(!r.matches(&v("1.0.1")));
    }

    #[test]
    fn partial_bare_version_is_x_range() {
        let r = range("1.2");
        assert!(r.matches(&v("1.2.7")));
        assert!(!r.matches(&v("1.3.0")));
    }

    #[test]
    fn x_range_with_wildcard() {
        let r = range("1.x");
        assert!(r.matches(&v("1.9.0")));
        assert!(!r.matches(&v("2.0.0")));
    }

    #[test]
    fn star_and_empty_are_any() {
        assert!(range("*").is_any());
        assert!(range("").is_any());
        assert!(range("x").is_any());
        assert!(!range("^1.0.0").is_any());
    }

    #[test]
    fn any_range_matches_release_versions() {
        assert!(range("*").matches(&v("42.0.0")));
    }

    #[test]
    fn space_separated_comparators_intersect() {
        let r = range(">=1.0.0 <2.0.0");
        assert!(r.matches(&v("1.5.0")));
        assert!(!r.matches(&v("2.0.0")));
    }

    #[test]
    fn operator_separated_from_version_by_space() {
        let r = range(">= 1.2.0 < 1.3.0");
        assert!(r.matches(&v("1.2.5")));
        assert!(!r.matches(&v("1.3.0")));
    }

    #[test]
    fn alternatives_union() {
        let r = range("^1.0.0 || ^3.0.0");
        assert!(r.matches(&v("1.1.0")));
        assert!(r.matches(&v("3.2.0")));
        assert!(!r.matches(&v("2.0.0")));
    }

    #[test]
    fn hyphen_range_is_inclusive() {
        let r = range("1.0.0 - 2.0.0");
        assert!(r.matches(&v("2.0.0")));
        assert!(!r.matches(&v("2.0.1")));
    }

    #[test]
    fn leading_v_is_accepted() {
        assert!(range("v1.0.0").matches(&v("1.0.0")));
    }

    #[test]
    fn prerelease_range_matches_same_tuple() {
        let r = range("^1.0.1-next.0");
        assert!(r.matches(&v("1.0.1-next.2")));
        assert!(r.matches(&v("1.0.1")));
    }

    #[test]
    fn invalid_range_reports_input() {
        let err = VersionRange::parse("^not.a.version").expect_err("invalid");
        assert!(err.to_string().contains("^not.a.version"));
    }

    #[test]
    fn workspace_star_pins_current_version() {
        let declared = DeclaredRange::resolve("workspace:*", &v("1.2.0")).expect("valid");
        assert!(declared.admits(&v("1.2.0")));
        assert!(!declared.admits(&v("1.2.1")));
    }

    #[test]
    fn workspace_caret_shorthand_uses_current_version() {
        let declared = DeclaredRange::resolve("workspace:^", &v("1.2.0")).expect("valid");
        assert!(declared.admits(&v("1.9.0")));
        assert!(!declared.admits(&v("2.0.0")));
    }

    #[test]
    fn workspace_explicit_range_drops_protocol() {
        let declared = DeclaredRange::resolve("workspace:~1.2.0", &v("1.2.0")).expect("valid");
        assert!(declared.admits(&v("1.2.5")));
        assert!(!declared.admits(&v("1.3.0")));
    }

    #[test]
    fn local_path_admits_any_version() {
        let declared = DeclaredRange::resolve("file:../a", &v("1.0.0")).expect("valid");
        assert_eq!(declared, DeclaredRange::LocalPath);
        assert!(declared.admits(&v("1.0.0")));
        assert!(declared.admits(&v("2.0.0")));
    }

    #[test]
    fn detects_operators() {
        assert_eq!(RangeOperator::detect("^1.0.0"), RangeOperator::Caret);
        assert_eq!(RangeOperator::detect("~1.0.0"), RangeOperator::Tilde);
        assert_eq!(RangeOperator::detect(">=1.0.0"), RangeOperator::GreaterOrEqual);
        assert_eq!(RangeOperator::detect(">1.0.0"), RangeOperator::Greater);
        assert_eq!(RangeOperator::detect("<=1.0.0"), RangeOperator::LessOrEqual);
        assert_eq!(RangeOperator::detect("1.0.0"), RangeOperator::Exact);
    }

    #[test]
    fn local_path_protocols() {
        assert!(is_local_path_protocol("file:../x"));
        assert!(is_local_path_protocol("link:../x"));
        assert!(!is_local_path_protocol("workspace:^1.0.0"));
    }

    #[test]
    fn workspace_protocol_is_stripped() {
        assert_eq!(strip_workspace_protocol("workspace:^1.0.0"), Some("^1.0.0"));
        assert_eq!(strip_workspace_protocol("^1.0.0"), None);
    }
}
