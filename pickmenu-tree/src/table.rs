//! Table loading and preprocessing
//!
//! The input is a CSV export where depth is encoded by column position:
//!
//! ```text
//! marker, label, id, link, label, id, link, ...
//!         |--- level 0 ---| |--- level 1 ---|
//! ```
//!
//! The header record is consumed, fully blank records are dropped, and the
//! first remaining record supplies the root node. Every other record becomes a
//! [`Row`] holding the populated `(id, label, link)` triples of one path.

use crate::error::TableError;
use crate::node::TreeNode;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Column holding the root label (and every row's level 1 label).
pub const ROOT_LABEL_COLUMN: usize = 1;
/// Column holding the root id.
pub const ROOT_ID_COLUMN: usize = 2;
/// Column holding the root link.
pub const ROOT_LINK_COLUMN: usize = 3;

/// Columns taken by one depth level.
const LEVEL_WIDTH: usize = 3;

/// One `(id, label, link)` triple of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub id: i64,
    pub label: String,
    pub link: String,
}

impl Level {
    pub fn new(id: i64, label: impl Into<String>, link: impl Into<String>) -> Self {
        Level {
            id,
            label: label.into(),
            link: link.into(),
        }
    }

    fn label_column(level: usize) -> usize {
        ROOT_LABEL_COLUMN + level * LEVEL_WIDTH
    }
}

/// A non-root table record: the flattened path from the root to one node.
///
/// `levels[0]` is the row's copy of the root triple. A `None` entry is a level
/// whose label cell was blank; trailing blank levels are never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    line: u64,
    marker: String,
    levels: Vec<Option<Level>>,
}

impl Row {
    /// Builds a row from fully populated levels, root triple first.
    pub fn new(line: u64, levels: Vec<Level>) -> Self {
        Row {
            line,
            marker: String::new(),
            levels: levels.into_iter().map(Some).collect(),
        }
    }

    /// Builds a row that may contain blank levels.
    pub fn with_gaps(line: u64, levels: Vec<Option<Level>>) -> Self {
        let mut row = Row {
            line,
            marker: String::new(),
            levels,
        };
        row.trim_trailing();
        row
    }

    fn from_record(line: u64, record: &StringRecord) -> Result<Self, TableError> {
        let mut levels = Vec::new();
        let mut level = 0;
        while Level::label_column(level) < record.len() {
            levels.push(parse_level(line, record, level)?);
            level += 1;
        }

        let mut row = Row {
            line,
            marker: record.get(0).unwrap_or_default().to_string(),
            levels,
        };
        row.trim_trailing();
        Ok(row)
    }

    fn trim_trailing(&mut self) {
        while matches!(self.levels.last(), Some(None)) {
            self.levels.pop();
        }
    }

    /// 1-based line in the source file.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Contents of the positional marker column.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// The row's level 1 label, which must equal the root label.
    pub fn root_label(&self) -> &str {
        self.levels
            .first()
            .and_then(|level| level.as_ref())
            .map(|level| level.label.as_str())
            .unwrap_or_default()
    }

    /// Number of levels present, the root triple included.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Levels below the root that this row inserts.
    pub fn depth(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// The triple at `index` (`0` is the root), `None` when blank or absent.
    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index).and_then(|level| level.as_ref())
    }
}

/// Root node and remaining rows of a preprocessed table.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub root: TreeNode,
    pub rows: Vec<Row>,
    pub columns: usize,
}

/// Loads CSV text from a file or string and preprocesses it.
pub struct TableLoader {
    source: Vec<u8>,
    origin: Option<PathBuf>,
}

impl TableLoader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let path = path.as_ref();
        let source = fs::read(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => TableError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => TableError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Ok(TableLoader {
            source,
            origin: Some(path.to_path_buf()),
        })
    }

    pub fn from_string<S: Into<String>>(source: S) -> Self {
        TableLoader {
            source: source.into().into_bytes(),
            origin: None,
        }
    }

    /// Path the table was read from, if any.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Drops blank records, consumes the header and splits off the root.
    pub fn preprocess(&self) -> Result<Preprocessed, TableError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(self.source.as_slice());

        let columns = reader.headers()?.len();

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            records.push((line, record));
        }

        let empty = TableError::EmptyInput {
            rows: records.len(),
            columns,
        };
        if columns == 0 {
            return Err(empty);
        }

        let mut records = records.into_iter();
        let Some((line, record)) = records.next() else {
            return Err(empty);
        };
        let root = parse_root(line, &record)?;

        let rows = records
            .map(|(line, record)| Row::from_record(line, &record))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            root = root.label(),
            rows = rows.len(),
            columns,
            "preprocessed table"
        );
        Ok(Preprocessed {
            root,
            rows,
            columns,
        })
    }
}

fn parse_root(line: u64, record: &StringRecord) -> Result<TreeNode, TableError> {
    if record.len() <= ROOT_LINK_COLUMN {
        return Err(TableError::TooFewColumns {
            line,
            expected: ROOT_LINK_COLUMN + 1,
            found: record.len(),
        });
    }
    let field = |column: usize| record.get(column).unwrap_or_default();
    let id = parse_id(line, ROOT_ID_COLUMN, field(ROOT_ID_COLUMN))?;
    debug!(line, id, label = field(ROOT_LABEL_COLUMN), "root row");
    Ok(TreeNode::new(
        id,
        field(ROOT_LABEL_COLUMN),
        field(ROOT_LINK_COLUMN),
    ))
}

fn parse_level(line: u64, record: &StringRecord, level: usize) -> Result<Option<Level>, TableError> {
    let label_column = Level::label_column(level);
    let field = |column: usize| record.get(column).unwrap_or_default();

    let label = field(label_column);
    if label.is_empty() {
        return Ok(None);
    }
    let id = parse_id(line, label_column + 1, field(label_column + 1))?;
    Ok(Some(Level::new(id, label, field(label_column + 2))))
}

/// Parses an id cell. Spreadsheet exports often write integers as `2.0`.
fn parse_id(line: u64, column: usize, value: &str) -> Result<i64, TableError> {
    if let Ok(id) = value.parse::<i64>() {
        return Ok(id);
    }
    match value.parse::<f64>() {
        Ok(float)
            if float.is_finite()
                && float.fract() == 0.0
                && float >= i64::MIN as f64
                && float <= i64::MAX as f64 =>
        {
            Ok(float as i64)
        }
        _ => Err(TableError::InvalidId {
            line,
            column,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const HEADER: &str = "Position,Level 1 Label,Level 1 ID,Level 1 URL,\
Level 2 Label,Level 2 ID,Level 2 URL,Level 3 Label,Level 3 ID,Level 3 URL\n";

    fn table(body: &str) -> String {
        format!("{HEADER}{body}")
    }

    #[test]
    fn root_comes_from_first_data_row() {
        let source = table("1,Store,1,/store,,,,,,\n2,Store,1,/store,Bakery,2,/bakery,,,\n");
        let pre = TableLoader::from_string(source).preprocess().unwrap();

        assert_eq!(pre.root, TreeNode::new(1, "Store", "/store"));
        assert_eq!(pre.columns, 10);
        assert_eq!(pre.rows.len(), 1);

        let row = &pre.rows[0];
        assert_eq!(row.line(), 3);
        assert_eq!(row.marker(), "2");
        assert_eq!(row.root_label(), "Store");
        assert_eq!(row.depth(), 1);
        assert_eq!(row.level(1), Some(&Level::new(2, "Bakery", "/bakery")));
    }

    #[test]
    fn blank_rows_are_dropped() {
        let source = table(",,,,,,,,,\n1,Store,1,/store,,,,,,\n,,,,,,,,,\n\n2,Store,1,/store,Dairy,3,/dairy,,,\n");
        let pre = TableLoader::from_string(source).preprocess().unwrap();

        assert_eq!(pre.root.label(), "Store");
        assert_eq!(pre.rows.len(), 1);
        assert_eq!(pre.rows[0].level(1).map(|l| l.label.as_str()), Some("Dairy"));
    }

    #[test]
    fn trailing_blank_levels_are_not_counted() {
        let source = table("1,Store,1,/store\n2,Store,1,/store,Bakery,2,/bakery,,,\n");
        let pre = TableLoader::from_string(source).preprocess().unwrap();
        assert_eq!(pre.rows[0].level_count(), 2);
    }

    #[test]
    fn interior_blank_level_is_kept_as_gap() {
        let source = table("1,Store,1,/store\n2,Store,1,/store,,,,Bread,5,/bread\n");
        let pre = TableLoader::from_string(source).preprocess().unwrap();
        let row = &pre.rows[0];
        assert_eq!(row.depth(), 2);
        assert_eq!(row.level(1), None);
        assert_eq!(row.level(2).map(|l| l.id), Some(5));
    }

    #[rstest]
    #[case("7", 7)]
    #[case("7.0", 7)]
    #[case("-3", -3)]
    fn ids_accept_integral_values(#[case] raw: &str, #[case] expected: i64) {
        assert_eq!(parse_id(2, 2, raw).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("7.5")]
    #[case("seven")]
    #[case("NaN")]
    fn ids_reject_non_integral_values(#[case] raw: &str) {
        assert!(matches!(
            parse_id(2, 2, raw),
            Err(TableError::InvalidId { .. })
        ));
    }

    #[test]
    fn header_only_table_is_empty_input() {
        let err = TableLoader::from_string(HEADER).preprocess().unwrap_err();
        assert!(matches!(err, TableError::EmptyInput { rows: 0, columns: 10 }));
    }

    #[test]
    fn blank_file_is_empty_input() {
        let err = TableLoader::from_string("").preprocess().unwrap_err();
        assert!(matches!(err, TableError::EmptyInput { rows: 0, .. }));
    }

    #[test]
    fn narrow_root_row_is_rejected() {
        let err = TableLoader::from_string("a,b\n1,Store\n")
            .preprocess()
            .unwrap_err();
        assert!(matches!(
            err,
            TableError::TooFewColumns {
                expected: 4,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        match TableLoader::from_path(&path) {
            Err(TableError::FileNotFound { path: reported }) => assert_eq!(reported, path),
            other => panic!("expected FileNotFound, got {:?}", other.err()),
        }
    }

    #[test]
    fn loader_remembers_origin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.csv");
        fs::write(&path, table("1,Store,1,/store\n")).unwrap();

        let loader = TableLoader::from_path(&path).unwrap();
        assert_eq!(loader.origin(), Some(path.as_path()));
        assert!(loader.preprocess().unwrap().rows.is_empty());
    }

    #[test]
    fn invalid_utf8_is_a_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        let mut bytes = table("1,Store,1,/store\n").into_bytes();
        bytes.extend_from_slice(b"2,Store,1,/store,Caf\xe9,2,/cafe,,,\n");
        fs::write(&path, bytes).unwrap();

        let err = TableLoader::from_path(&path)
            .unwrap()
            .preprocess()
            .unwrap_err();
        assert!(matches!(err, TableError::Csv(_)), "got {err:?}");
    }
}
