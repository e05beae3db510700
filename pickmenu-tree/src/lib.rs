//! # pickmenu-tree
//!
//! Rebuilds a store pick menu tree from a flat CSV export.
//!
//! The export lists one root-to-node path per row, with depth encoded by
//! column position (three columns per level: label, id, link). The crate is
//! laid out along the conversion stages:
//!
//! ```text
//! table    CSV text  -> root TreeNode + Rows
//! builder  Rows      -> nested TreeNode
//! writer   TreeNode  -> JSON / YAML on disk
//! convert  all of the above, with logging
//! ```

pub mod builder;
pub mod convert;
pub mod error;
pub mod node;
pub mod table;
pub mod writer;

pub use builder::{BranchStrategy, HierarchyBuilder};
pub use convert::{ConversionSummary, ConvertOptions, Converter};
pub use error::{BuildError, ConvertError, TableError, WriteError};
pub use node::{SerializableNode, TreeNode};
pub use table::{Level, Preprocessed, Row, TableLoader};
pub use writer::{MenuWriter, OutputFormat};
