use crate::book::Book;
use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use calamine::{open_workbook, Data, Reader, Xlsx, XlsxError};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::Path;

/// Largest integer an Excel number (f64) holds exactly
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Options for reading Excel files
#[derive(Debug, Clone, Default)]
pub struct XlsxReadOptions {
    /// Whether the first row contains headers
    pub has_headers: bool,
    /// Keep cells at their absolute positions instead of starting the grid
    /// at the first non-empty cell
    pub keep_offset: bool,
}

impl XlsxReadOptions {
    /// Set whether the first row contains headers
    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Set whether leading empty rows and columns are kept as nulls
    #[must_use]
    pub fn with_offset(mut self, keep_offset: bool) -> Self {
        self.keep_offset = keep_offset;
        self
    }
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        // Excel stores every number as f64; integral values come back as Int
        Data::Float(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_INT => {
            CellValue::Int(*f as i64)
        }
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        // Excel stores dates as days since 1899-12-30
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

fn read_error(path: &Path, err: XlsxError) -> SheetError {
    match err {
        XlsxError::Io(e) => SheetError::from_io(path, e),
        other => SheetError::Read(other.to_string()),
    }
}

fn open(path: &Path) -> Result<Xlsx<BufReader<File>>> {
    tracing::debug!("Opening workbook {}", path.display());
    open_workbook(path).map_err(|e| read_error(path, e))
}

fn load_sheet(
    workbook: &mut Xlsx<BufReader<File>>,
    path: &Path,
    sheet_name: &str,
    options: &XlsxReadOptions,
) -> Result<Sheet> {
    if !workbook.sheet_names().iter().any(|n| n == sheet_name) {
        return Err(SheetError::SheetMissing {
            name: sheet_name.to_string(),
        });
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| read_error(path, e))?;

    // calamine ranges begin at the first non-empty cell
    let (top, left) = if options.keep_offset {
        range.start().unwrap_or((0, 0))
    } else {
        (0, 0)
    };
    let left = left as usize;
    let width = left + range.width();

    let mut data: Vec<Vec<CellValue>> = vec![vec![CellValue::Null; width]; top as usize];
    data.extend(range.rows().map(|row| {
        let mut cells = vec![CellValue::Null; left];
        cells.extend(row.iter().map(data_to_cell_value));
        cells
    }));

    let mut sheet = Sheet::with_name(sheet_name);
    *sheet.data_mut() = data;

    if options.has_headers && sheet.row_count() > 0 {
        sheet.name_columns_from_header();
    }

    Ok(sheet)
}

impl Sheet {
    /// Load the first sheet of an Excel file with options
    ///
    /// A workbook without sheets yields an empty sheet.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened or read.
    pub fn from_xlsx_with_options<P: AsRef<Path>>(
        path: P,
        options: XlsxReadOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        let mut workbook = open(path)?;

        let Some(first) = workbook.sheet_names().first().cloned() else {
            return Ok(Sheet::new());
        };

        load_sheet(&mut workbook, path, &first, &options)
    }

    /// Load a specific sheet from an Excel file with options
    ///
    /// # Errors
    ///
    /// Returns `SheetError::SheetMissing` if the workbook has no such sheet.
    pub fn from_xlsx_sheet_with_options<P: AsRef<Path>>(
        path: P,
        sheet_name: &str,
        options: XlsxReadOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        let mut workbook = open(path)?;
        load_sheet(&mut workbook, path, sheet_name, &options)
    }
}

impl Book {
    /// Load every sheet of an Excel file, values only.
    ///
    /// Cells keep their absolute positions, so saving the book back puts
    /// every value where it was. Dates load as their serial numbers.
    pub fn from_xlsx<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut workbook = open(path)?;
        let options = XlsxReadOptions::default().with_offset(true);

        let mut book = Book::new();
        for sheet_name in workbook.sheet_names() {
            let sheet = load_sheet(&mut workbook, path, &sheet_name, &options)?;
            book.add_sheet(&sheet_name, sheet)?;
        }

        Ok(book)
    }

    /// Serialize the book to xlsx bytes
    pub fn to_xlsx_buffer(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        for (name, sheet) in self.sheets() {
            write_to_worksheet(workbook.add_worksheet(), name, sheet)?;
        }
        Ok(workbook.save_to_buffer()?)
    }

    /// Save the book to an Excel file
    ///
    /// The workbook is fully serialized before the file is touched, and the
    /// file is opened without truncation, so a refused open leaves the
    /// previous content intact.
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let buffer = self.to_xlsx_buffer()?;
        write_in_place(path.as_ref(), &buffer)
    }

    /// Get sheet names from an Excel file without loading data
    pub fn xlsx_sheet_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
        let workbook = open(path.as_ref())?;
        Ok(workbook.sheet_names().iter().map(|s| s.to_string()).collect())
    }
}

fn write_in_place(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| SheetError::from_io(path, e))?;
    file.set_len(0)?;
    file.write_all(bytes)?;
    file.flush()?;
    tracing::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Write sheet data to a worksheet
fn write_to_worksheet(worksheet: &mut Worksheet, name: &str, sheet: &Sheet) -> Result<()> {
    worksheet.set_name(name)?;

    for (row_idx, row) in sheet.data().iter().enumerate() {
        let row_num = u32::try_from(row_idx).map_err(|_| SheetError::RowIndexOutOfBounds {
            index: row_idx,
            count: sheet.row_count(),
        })?;
        for (col_idx, cell) in row.iter().enumerate() {
            let col_num = u16::try_from(col_idx).map_err(|_| SheetError::ColumnIndexOutOfBounds {
                index: col_idx,
                count: row.len(),
            })?;

            match cell {
                CellValue::Null => {}
                CellValue::Bool(b) => {
                    worksheet.write_boolean(row_num, col_num, *b)?;
                }
                CellValue::Int(i) => {
                    // integers above 2^53 lose precision as Excel numbers
                    worksheet.write_number(row_num, col_num, *i as f64)?;
                }
                CellValue::Float(f) => {
                    worksheet.write_number(row_num, col_num, *f)?;
                }
                CellValue::String(s) => {
                    worksheet.write_string(row_num, col_num, s)?;
                }
            }
        }
    }

    Ok(())
}
