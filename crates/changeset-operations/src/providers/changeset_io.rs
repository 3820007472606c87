use std::fs;
use std::path::{Path, PathBuf};

use changeset_core::Changeset;
use changeset_parse::parse_changeset;

use crate::Result;
use crate::error::OperationError;
use crate::traits::{ChangesetReader, ChangesetRemover};

const CHANGESET_EXTENSION: &str = "md";
const README_STEM: &str = "README";

pub struct FileSystemChangesetIO;

impl FileSystemChangesetIO {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemChangesetIO {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangesetReader for FileSystemChangesetIO {
    fn read_changesets(&self, changeset_dir: &Path) -> Result<Vec<Changeset>> {
        let mut files = list_changeset_files(changeset_dir)?;
        files.sort_by(|(a, _), (b, _)| a.cmp(b));

        files
            .into_iter()
            .map(|(id, path)| {
                let content =
                    fs::read_to_string(&path).map_err(|source| OperationError::ChangesetFileRead {
                        path: path.clone(),
                        source,
                    })?;
                parse_changeset(&id, &content)
                    .map_err(|source| OperationError::ChangesetParse { path, source })
            })
            .collect()
    }
}

impl ChangesetRemover for FileSystemChangesetIO {
    fn remove_changeset(&self, changeset_dir: &Path, id: &str) -> Result<()> {
        let path = changeset_dir.join(format!("{id}.{CHANGESET_EXTENSION}"));
        fs::remove_file(&path).map_err(|source| OperationError::ChangesetRemove { path, source })
    }
}

fn list_changeset_files(changeset_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = match fs::read_dir(changeset_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(OperationError::ChangesetList {
                path: changeset_dir.to_path_buf(),
                source,
            });
        }
    };

    let mut files = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|source| OperationError::ChangesetList {
            path: changeset_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();

        if !path.is_file() || path.extension().is_none_or(|ext| ext != CHANGESET_EXTENSION) {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.eq_ignore_ascii_case(README_STEM) {
            continue;
        }

        files.push((stem.to_string(), path));
    }

    Ok(files)
}
