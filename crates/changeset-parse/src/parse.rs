use indexmap::IndexMap;
use serde::Deserialize;
use serde_with::{MapPreventDuplicates, serde_as};

use changeset_core::{BumpType, Changeset, PackageRelease};

use crate::error::{FormatError, FrontMatterError, ReleaseListError};

const DELIMITER: &str = "---";

const MAX_INPUT_SIZE: usize = 16 * 1024 * 1024;

#[serde_as]
#[derive(Deserialize)]
struct ReleaseHeader {
    #[serde(flatten)]
    #[serde_as(as = "MapPreventDuplicates<_, _>")]
    releases: IndexMap<String, BumpType>,
}

/// Front matter and body of a changeset file.
struct Sections<'a> {
    header: &'a str,
    body: &'a str,
}

fn skip_newline(s: &str) -> &str {
    s.strip_prefix("\r\n")
        .or_else(|| s.strip_prefix('\n'))
        .unwrap_or(s)
}

/// Position of the first line consisting of the delimiter.
fn closing_delimiter(rest: &str) -> Option<usize> {
    if rest.starts_with(DELIMITER) {
        return Some(0);
    }
    rest.match_indices(DELIMITER)
        .map(|(pos, _)| pos)
        .find(|&pos| rest[..pos].ends_with('\n'))
}

fn split_sections(content: &str) -> Result<Sections<'_>, FrontMatterError> {
    let rest = content
        .trim_start()
        .strip_prefix(DELIMITER)
        .ok_or(FrontMatterError::MissingOpeningDelimiter)?;
    let rest = skip_newline(rest);

    let end = closing_delimiter(rest).ok_or(FrontMatterError::MissingClosingDelimiter)?;

    let header = rest[..end].trim_end_matches(['\r', '\n']);
    if header.trim().is_empty() {
        return Err(FrontMatterError::EmptyFrontMatter);
    }

    Ok(Sections {
        header,
        body: skip_newline(&rest[end + DELIMITER.len()..]),
    })
}

/// Parses a changeset file. `id` is the file stem and becomes the changeset id.
///
/// # Errors
///
/// Returns `FormatError` if the front matter is malformed, names a package
/// twice, declares no releases, or declares a `none` bump.
pub fn parse_changeset(id: &str, content: &str) -> Result<Changeset, FormatError> {
    if content.len() > MAX_INPUT_SIZE {
        return Err(ReleaseListError::InputTooLarge {
            size: content.len(),
            max_bytes: MAX_INPUT_SIZE,
        }
        .into());
    }

    let sections = split_sections(content)?;
    let header: ReleaseHeader = serde_yml::from_str(sections.header)?;

    if header.releases.is_empty() {
        return Err(ReleaseListError::NoReleases.into());
    }

    let mut releases = Vec::with_capacity(header.releases.len());
    for (name, bump_type) in header.releases {
        if bump_type == BumpType::None {
            return Err(ReleaseListError::NoneBump { package: name }.into());
        }
        releases.push(PackageRelease { name, bump_type });
    }

    Ok(Changeset {
        id: id.to_string(),
        summary: sections.body.trim().to_string(),
        releases,
    })
}
