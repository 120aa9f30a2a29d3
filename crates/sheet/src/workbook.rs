use crate::book::Book;
use crate::cell::CellValue;
use crate::describe::ColumnSummary;
use crate::error::Result;
use crate::report::{ConsoleReport, Report};
use crate::sheet::Sheet;
use crate::xlsx::XlsxReadOptions;
use std::path::{Path, PathBuf};

/// Sheet name used when a table is written without an explicit name
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Handler for one Excel file on disk.
///
/// The handler holds nothing but the path: every operation re-opens and
/// re-parses the file, and writes rewrite the whole workbook in place with
/// no locking and no backup. A missing file, a missing sheet and refused
/// access are passed to the [`Report`] sink and turned into `None`, an
/// empty list or `false`; any other failure is returned as an error.
///
/// # Example
/// ```no_run
/// use feuille_sheet::Workbook;
///
/// let workbook = Workbook::new("/data/budget.xlsx");
/// if let Some(sheet) = workbook.read_sheet(Some("Feuille1")).unwrap() {
///     println!("{} records", sheet.record_count());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Workbook<R = ConsoleReport> {
    path: PathBuf,
    report: R,
}

impl Workbook {
    /// Create a handler that reports to the console
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self::with_report(path, ConsoleReport)
    }
}

impl<R: Report> Workbook<R> {
    /// Create a handler with a custom report sink
    pub fn with_report<P: Into<PathBuf>>(path: P, report: R) -> Self {
        Workbook {
            path: path.into(),
            report,
        }
    }

    /// Path of the underlying file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load a sheet with its first row as column names.
    ///
    /// Without a name the first sheet of the workbook is loaded.
    pub fn read_sheet(&self, sheet_name: Option<&str>) -> Result<Option<Sheet>> {
        self.absorb(self.load(sheet_name))
    }

    /// Add `table` to the workbook as `sheet_name`, replacing a sheet of the
    /// same name in place.
    ///
    /// The other sheets are rewritten with their values only, each cell at
    /// its original position. Formatting is lost, so date cells come back as
    /// plain serial numbers. A table without named columns gets a header of
    /// column indices. Returns `false` when the write was refused and the
    /// file left untouched.
    pub fn write_sheet(&self, table: &Sheet, sheet_name: &str) -> Result<bool> {
        let framed = with_header(table);
        let written = self.absorb(self.store(framed, sheet_name))?.is_some();
        if written {
            self.report
                .notice(&format!("Data written to {}.", self.path.display()));
        }
        Ok(written)
    }

    /// Sheet names in workbook order; empty when the file is missing
    pub fn list_sheet_names(&self) -> Result<Vec<String>> {
        Ok(self
            .absorb(Book::xlsx_sheet_names(&self.path))?
            .unwrap_or_default())
    }

    /// Report the inferred type and non-null count of every column.
    ///
    /// Returns `None`, and reports nothing more, when the sheet could not be
    /// loaded.
    pub fn describe_columns(&self, sheet_name: Option<&str>) -> Result<Option<ColumnSummary>> {
        let Some(sheet) = self.read_sheet(sheet_name)? else {
            return Ok(None);
        };

        let summary = sheet.describe_columns();
        self.report.notice(&summary.to_string());
        Ok(Some(summary))
    }

    /// Set one cell, addressed by 1-based record number and column name.
    ///
    /// This is a full read-modify-write of the workbook: the cost is
    /// proportional to the size of the file, not to the cell, and two
    /// writers on the same file race with the last one winning. Writing
    /// past the last record or to an unknown column enlarges the sheet.
    ///
    /// As with [`Workbook::write_sheet`], every sheet is rewritten with its
    /// values only and dates turn into serial numbers.
    pub fn write_cell<T: Into<CellValue>>(
        &self,
        sheet_name: &str,
        row: usize,
        column: &str,
        value: T,
    ) -> Result<bool> {
        let value = value.into();
        let updated = self.absorb(self.update_cell(sheet_name, row, column, value.clone()))?;

        if updated.is_none() {
            return Ok(false);
        }
        self.report.notice(&format!(
            "Value '{value}' written to cell {column}{row} of sheet '{sheet_name}'."
        ));
        Ok(true)
    }

    /// Textual form of one cell, addressed by 1-based record number and
    /// column name.
    ///
    /// An unknown column or a record past the end is an error, not a
    /// reported condition.
    pub fn read_cell(&self, sheet_name: &str, row: usize, column: &str) -> Result<Option<String>> {
        let Some(sheet) = self.read_sheet(Some(sheet_name))? else {
            return Ok(None);
        };
        Ok(Some(sheet.record(row, column)?.to_text()))
    }

    fn load(&self, sheet_name: Option<&str>) -> Result<Sheet> {
        let options = XlsxReadOptions::default().with_headers(true);
        match sheet_name {
            Some(name) => Sheet::from_xlsx_sheet_with_options(&self.path, name, options),
            None => Sheet::from_xlsx_with_options(&self.path, options),
        }
    }

    fn store(&self, sheet: Sheet, sheet_name: &str) -> Result<()> {
        let mut book = Book::from_xlsx(&self.path)?;
        let replaced = book.put_sheet(sheet_name, sheet);
        book.save_as_xlsx(&self.path)?;
        tracing::info!(
            "{} sheet '{}' in {}",
            if replaced { "Replaced" } else { "Added" },
            sheet_name,
            self.path.display()
        );
        Ok(())
    }

    fn update_cell(&self, sheet_name: &str, row: usize, column: &str, value: CellValue) -> Result<()> {
        let mut sheet = self.load(Some(sheet_name))?;

        // an empty sheet still needs a header row to hold the new column
        if sheet.is_empty() {
            sheet.data_mut().push(Vec::new());
            sheet.name_columns_from_header();
        }
        sheet.set_record(row, column, value)?;

        let mut book = Book::from_xlsx(&self.path)?;
        book.put_sheet(sheet_name, sheet);
        book.save_as_xlsx(&self.path)?;
        tracing::info!(
            "Updated {}{} of sheet '{}' in {}",
            column,
            row,
            sheet_name,
            self.path.display()
        );
        Ok(())
    }

    /// Pass reported conditions to the sink, propagate everything else
    fn absorb<T>(&self, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_reported() => {
                tracing::warn!("{}", err);
                self.report.problem(&err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// Give an unnamed table a header row of column indices
fn with_header(table: &Sheet) -> Sheet {
    if table.column_names().is_some() || table.is_empty() {
        return table.clone();
    }

    let mut framed = table.clone();
    let header: Vec<CellValue> = (0..table.col_count())
        .map(|i| CellValue::Int(i as i64))
        .collect();
    framed.data_mut().insert(0, header);
    framed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SheetError;
    use crate::report::RecordingReport;
    use tempfile::tempdir;

    fn sample(path: &Path) {
        let mut book = Book::new();
        book.add_sheet(
            "Feuille1",
            Sheet::from_data(vec![
                vec![CellValue::from("A"), CellValue::from("B")],
                vec![CellValue::Int(1), CellValue::Int(10)],
                vec![CellValue::Int(2), CellValue::Int(20)],
                vec![CellValue::Int(3), CellValue::Int(30)],
            ]),
        )
        .unwrap();
        book.save_as_xlsx(path).unwrap();
    }

    #[test]
    fn test_unnamed_table_gets_index_header() {
        let table = Sheet::from_data(vec![vec![1, 2], vec![3, 4]]);
        let framed = with_header(&table);

        assert_eq!(framed.row_count(), 3);
        assert_eq!(framed.get(0, 1).unwrap(), &CellValue::Int(1));
    }

    #[test]
    fn test_write_cell_reports_success() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        sample(&path);

        let report = RecordingReport::new();
        let workbook = Workbook::with_report(&path, &report);

        assert!(workbook.write_cell("Feuille1", 2, "B", 42).unwrap());
        assert_eq!(
            report.notices(),
            vec!["Value '42' written to cell B2 of sheet 'Feuille1'.".to_string()]
        );
        assert!(report.problems().is_empty());
    }

    #[test]
    fn test_write_cell_missing_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        sample(&path);
        let before = std::fs::read(&path).unwrap();

        let report = RecordingReport::new();
        let workbook = Workbook::with_report(&path, &report);

        assert!(!workbook.write_cell("Feuille9", 1, "A", 1).unwrap());
        assert_eq!(
            report.problems(),
            vec!["Sheet 'Feuille9' does not exist in the workbook.".to_string()]
        );
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_read_cell_unknown_column_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        sample(&path);

        let workbook = Workbook::with_report(&path, RecordingReport::new());
        assert!(matches!(
            workbook.read_cell("Feuille1", 1, "Z"),
            Err(SheetError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_describe_reports_summary() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        sample(&path);

        let report = RecordingReport::new();
        let workbook = Workbook::with_report(&path, &report);

        let summary = workbook.describe_columns(None).unwrap().unwrap();
        assert_eq!(summary.entries, 3);
        assert_eq!(report.notices().len(), 1);
        assert!(report.notices()[0].contains("dtypes: int64(2)"));
    }
}
