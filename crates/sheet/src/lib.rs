//! Excel workbook access for feuille
//!
//! Reads and writes `.xlsx` files one sheet or one cell at a time. A sheet is
//! loaded whole into a [`Sheet`], a grid of [`CellValue`]s whose first row
//! names the columns, and every call re-opens the file.
//!
//! # Examples
//!
//! ## Building a table
//!
//! ```
//! use feuille_sheet::{Sheet, CellValue};
//!
//! let mut sheet = Sheet::from_data(vec![
//!     vec!["Name", "Age"],
//!     vec!["Alice", "30"],
//! ]);
//! sheet.name_columns_by_header().unwrap();
//!
//! assert_eq!(sheet.record_count(), 1);
//! assert_eq!(sheet.record(1, "Name").unwrap(), &CellValue::from("Alice"));
//! ```
//!
//! ## Working with a file
//!
//! ```no_run
//! use feuille_sheet::Workbook;
//!
//! let workbook = Workbook::new("/data/budget.xlsx");
//! workbook.write_cell("Feuille1", 2, "B", 42).unwrap();
//! assert_eq!(
//!     workbook.read_cell("Feuille1", 2, "B").unwrap().as_deref(),
//!     Some("42")
//! );
//! ```

mod book;
mod cell;
mod describe;
mod error;
mod report;
mod sheet;
mod workbook;
mod xlsx;

/// Re-export book type.
pub use book::Book;
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export column description types.
pub use describe::{ColumnInfo, ColumnSummary, ColumnType};
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export report sinks.
pub use report::{ConsoleReport, RecordingReport, Report};
/// Re-export sheet type.
pub use sheet::Sheet;
/// Re-export the file handler.
pub use workbook::{Workbook, DEFAULT_SHEET_NAME};
/// Re-export XLSX read options.
pub use xlsx::XlsxReadOptions;
