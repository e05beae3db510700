//! Rendering and persisting menu trees
//!
//! JSON output is pretty-printed with a configurable indent (4 spaces by
//! default). Files are written through a temporary file in the destination
//! directory and renamed into place, so a failed write never leaves partial
//! output behind.

use crate::error::WriteError;
use crate::node::SerializableNode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::info;

pub const DEFAULT_INDENT: usize = 4;

/// Text encoding of the written tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            other => Err(format!("unknown output format '{other}' (expected json or yaml)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MenuWriter {
    format: OutputFormat,
    indent: usize,
}

impl Default for MenuWriter {
    fn default() -> Self {
        MenuWriter::new(OutputFormat::Json, DEFAULT_INDENT)
    }
}

impl MenuWriter {
    pub fn new(format: OutputFormat, indent: usize) -> Self {
        MenuWriter { format, indent }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Renders the tree as text, ending with a newline.
    pub fn render(&self, tree: &SerializableNode) -> Result<String, WriteError> {
        let mut text = match self.format {
            OutputFormat::Json => self.render_json(tree)?,
            OutputFormat::Yaml => {
                serde_yaml::to_string(tree).map_err(|e| WriteError::Serialize(e.to_string()))?
            }
        };
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Ok(text)
    }

    fn render_json(&self, tree: &SerializableNode) -> Result<String, WriteError> {
        let indent = " ".repeat(self.indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut buffer = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        tree.serialize(&mut serializer)
            .map_err(|e| WriteError::Serialize(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| WriteError::Serialize(e.to_string()))
    }

    /// Renders the tree and atomically replaces `path` with it.
    ///
    /// Missing parent directories are created.
    pub fn write_to_path(&self, tree: &SerializableNode, path: &Path) -> Result<(), WriteError> {
        let text = self.render(tree)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| WriteError::io(path, e))?;

        let mut staged = NamedTempFile::new_in(dir).map_err(|e| WriteError::io(path, e))?;
        staged
            .write_all(text.as_bytes())
            .map_err(|e| WriteError::io(path, e))?;
        staged
            .persist(path)
            .map_err(|e| WriteError::io(path, e.error))?;

        info!(path = %path.display(), bytes = text.len(), format = %self.format, "wrote menu");
        Ok(())
    }
}
