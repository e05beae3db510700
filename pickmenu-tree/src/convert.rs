//! End-to-end conversion: table file in, menu tree file out.

use crate::builder::{BranchStrategy, HierarchyBuilder};
use crate::error::ConvertError;
use crate::node::SerializableNode;
use crate::table::{Preprocessed, TableLoader};
use crate::writer::{MenuWriter, OutputFormat, DEFAULT_INDENT};
use std::path::{Path, PathBuf};
use tracing::{info, info_span};

/// Knobs shared by every conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    pub strategy: BranchStrategy,
    pub format: OutputFormat,
    pub indent: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            strategy: BranchStrategy::default(),
            format: OutputFormat::default(),
            indent: DEFAULT_INDENT,
        }
    }
}

/// What a successful conversion produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub rows: usize,
    pub nodes: usize,
    pub depth: usize,
    pub output: Option<PathBuf>,
}

pub struct Converter {
    builder: HierarchyBuilder,
    writer: MenuWriter,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Converter {
            builder: HierarchyBuilder::new(options.strategy),
            writer: MenuWriter::new(options.format, options.indent),
        }
    }

    /// Reads `input`, rebuilds the tree and writes it to `output`.
    pub fn run(&self, input: &Path, output: &Path) -> Result<ConversionSummary, ConvertError> {
        let span = info_span!(
            "convert",
            input = %input.display(),
            strategy = %self.builder.strategy(),
            format = %self.writer.format()
        );
        let _enter = span.enter();

        let loader = TableLoader::from_path(input)?;
        let (tree, mut summary) = self.build(&loader)?;
        self.writer.write_to_path(&tree, output)?;

        summary.output = Some(output.to_path_buf());
        info!(
            rows = summary.rows,
            nodes = summary.nodes,
            depth = summary.depth,
            output = %output.display(),
            "conversion finished"
        );
        Ok(summary)
    }

    /// Reads `input` and returns the rendered tree instead of writing it.
    pub fn render_path(&self, input: &Path) -> Result<(String, ConversionSummary), ConvertError> {
        let loader = TableLoader::from_path(input)?;
        self.render(&loader)
    }

    /// Converts CSV text in memory, returning the rendered tree.
    pub fn convert_str(&self, source: &str) -> Result<(String, ConversionSummary), ConvertError> {
        self.render(&TableLoader::from_string(source))
    }

    fn render(&self, loader: &TableLoader) -> Result<(String, ConversionSummary), ConvertError> {
        let (tree, summary) = self.build(loader)?;
        let text = self.writer.render(&tree)?;
        Ok((text, summary))
    }

    fn build(
        &self,
        loader: &TableLoader,
    ) -> Result<(SerializableNode, ConversionSummary), ConvertError> {
        let Preprocessed { root, rows, .. } = loader.preprocess()?;
        let tree = self.builder.build(root, &rows)?;
        let summary = ConversionSummary {
            rows: rows.len(),
            nodes: tree.node_count(),
            depth: tree.depth(),
            output: None,
        };
        Ok((tree.to_serializable(), summary))
    }
}
