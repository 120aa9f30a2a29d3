use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during sheet and workbook operations
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("File {} was not found.", path.display())]
    FileMissing { path: PathBuf },

    #[error("Cannot access {}. Check the permissions.", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Sheet '{name}' does not exist in the workbook.")]
    SheetMissing { name: String },

    #[error("Index out of bounds: row {row}, col {col} (sheet has {rows} rows, {cols} cols)")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Row index out of bounds: {index} (sheet has {count} rows)")]
    RowIndexOutOfBounds { index: usize, count: usize },

    #[error("Column index out of bounds: {index} (sheet has {count} columns)")]
    ColumnIndexOutOfBounds { index: usize, count: usize },

    #[error("Invalid row number {0}: rows are numbered from 1")]
    InvalidRow(usize),

    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    #[error("Columns not named: {0}")]
    ColumnsNotNamed(String),

    #[error("Duplicate column name: {name}")]
    DuplicateColumnName { name: String },

    #[error("Sheet already exists: {name}")]
    SheetAlreadyExists { name: String },

    #[error("Workbook read error: {0}")]
    Read(String),

    #[error("Workbook write error: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SheetError {
    /// Classify an I/O failure on `path` into the reported categories.
    pub(crate) fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => SheetError::FileMissing {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => SheetError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => SheetError::Io(err),
        }
    }

    /// Whether this error is one of the conditions a handler reports and
    /// absorbs instead of propagating.
    #[must_use]
    pub fn is_reported(&self) -> bool {
        matches!(
            self,
            SheetError::FileMissing { .. }
                | SheetError::PermissionDenied { .. }
                | SheetError::SheetMissing { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
