use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::error::ManifestError;

const DEFAULT_INDENT: &str = "  ";

/// A parsed `package.json` that serializes back with its original key order
/// and indentation.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    path: PathBuf,
    root: Map<String, Value>,
    indent: String,
}

impl ManifestDocument {
    /// # Errors
    ///
    /// Returns `ManifestError::Read` if the file cannot be read, or
    /// `ManifestError::Parse`/`NotAnObject` if it is not a JSON object.
    pub fn read(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(path, &content)
    }

    /// # Errors
    ///
    /// Returns `ManifestError::Parse` if `content` is not valid JSON, or
    /// `ManifestError::NotAnObject` if its root is not an object.
    pub fn parse(path: &Path, content: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_json::from_str(content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let Value::Object(root) = value else {
            return Err(ManifestError::NotAnObject {
                path: path.to_path_buf(),
            });
        };

        Ok(Self {
            path: path.to_path_buf(),
            root,
            indent: detect_indent(content),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn indent(&self) -> &str {
        &self.indent
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.root.get(key).and_then(Value::as_str)
    }

    /// Replaces a top-level string field. Returns true if the value changed.
    pub fn set_str(&mut self, key: &str, value: &str) -> bool {
        if self.get_str(key) == Some(value) {
            return false;
        }
        self.root.insert(key.to_string(), Value::String(value.to_string()));
        true
    }

    /// Replaces `block[name]` if the entry exists. Returns true if it changed.
    pub fn set_dependency(&mut self, block: &str, name: &str, range: &str) -> bool {
        let Some(entry) = self
            .root
            .get_mut(block)
            .and_then(Value::as_object_mut)
            .and_then(|deps| deps.get_mut(name))
        else {
            return false;
        };

        if entry.as_str() == Some(range) {
            return false;
        }
        *entry = Value::String(range.to_string());
        true
    }

    /// Serializes with the detected indentation and a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Serialize` if serialization fails.
    pub fn render(&self) -> Result<String, ManifestError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(self.indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);

        self.root
            .serialize(&mut serializer)
            .map_err(|source| ManifestError::Serialize {
                path: self.path.clone(),
                source,
            })?;

        let mut rendered = String::from_utf8_lossy(&buf).into_owned();
        rendered.push('\n');
        Ok(rendered)
    }

    /// # Errors
    ///
    /// Returns an error if the document cannot be rendered or written.
    pub fn write(&self) -> Result<(), ManifestError> {
        let rendered = self.render()?;
        std::fs::write(&self.path, rendered).map_err(|source| ManifestError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Indentation of the first indented line, or two spaces.
#[must_use]
pub fn detect_indent(content: &str) -> String {
    content
        .lines()
        .skip(1)
        .map(|line| {
            let trimmed = line.trim_start_matches([' ', '\t']);
            (&line[..line.len() - trimmed.len()], trimmed)
        })
        .find(|(indent, rest)| !indent.is_empty() && !rest.is_empty())
        .map_or_else(|| DEFAULT_INDENT.to_string(), |(indent, _)| indent.to_string())
}
