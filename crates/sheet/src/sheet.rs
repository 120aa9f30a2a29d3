use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use indexmap::IndexMap;
use std::collections::HashMap;

/// A sheet representing a 2D grid of cells (row-major storage)
///
/// When columns are named, row 0 holds the header and the remaining rows are
/// records. Record numbers used by [`Sheet::record`] and
/// [`Sheet::set_record`] are 1-based and do not count the header.
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    data: Vec<Vec<CellValue>>,
    column_names: Option<Vec<String>>,
    column_index: Option<HashMap<String, usize>>,
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            data: Vec::new(),
            column_names: None,
            column_index: None,
        }
    }

    /// Create a sheet from a 2D vector of values
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let converted: Vec<Vec<CellValue>> = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        Sheet {
            name: "Sheet1".to_string(),
            data: converted,
            column_names: None,
            column_index: None,
        }
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of rows (including the header row, if any)
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    /// Check if the sheet is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of data rows, excluding the header row when columns are named
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.data.len().saturating_sub(self.header_offset())
    }

    fn header_offset(&self) -> usize {
        usize::from(self.column_names.is_some())
    }

    // ===== Cell Access =====

    /// Get a cell value by row and column index (0-based)
    pub fn get(&self, row: usize, col: usize) -> Result<&CellValue> {
        self.data
            .get(row)
            .and_then(|r| r.get(col))
            .ok_or(SheetError::IndexOutOfBounds {
                row,
                col,
                rows: self.row_count(),
                cols: self.col_count(),
            })
    }

    /// Get a mutable cell value by row and column index (0-based)
    pub fn get_mut(&mut self, row: usize, col: usize) -> Result<&mut CellValue> {
        let rows = self.row_count();
        let cols = self.col_count();
        self.data
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(SheetError::IndexOutOfBounds {
                row,
                col,
                rows,
                cols,
            })
    }

    /// Set a cell value by row and column index (0-based)
    pub fn set<T: Into<CellValue>>(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let cell = self.get_mut(row, col)?;
        *cell = value.into();
        Ok(())
    }

    /// Read a cell by 1-based record number and column name.
    ///
    /// Record 1 is the first row after the header.
    pub fn record(&self, record: usize, column: &str) -> Result<&CellValue> {
        if record == 0 {
            return Err(SheetError::InvalidRow(record));
        }
        let col = self.column_index_by_name(column)?;
        let row = record - 1 + self.header_offset();
        if row >= self.row_count() {
            return Err(SheetError::RowIndexOutOfBounds {
                index: record,
                count: self.record_count(),
            });
        }
        self.get(row, col)
    }

    /// Set a cell by 1-based record number and column name.
    ///
    /// Writing past the last record appends null-filled rows, and an unknown
    /// column name appends a new null-filled column, so the target cell always
    /// exists afterwards.
    pub fn set_record<T: Into<CellValue>>(
        &mut self,
        record: usize,
        column: &str,
        value: T,
    ) -> Result<()> {
        if record == 0 {
            return Err(SheetError::InvalidRow(record));
        }
        let col = match self.column_index_by_name(column) {
            Ok(col) => col,
            Err(SheetError::ColumnNotFound { .. }) => self.add_column(column)?,
            Err(err) => return Err(err),
        };

        let row = record - 1 + self.header_offset();
        let width = self.col_count();
        while self.data.len() <= row {
            self.data.push(vec![CellValue::Null; width]);
        }
        self.set(row, col, value)
    }

    // ===== Row Operations =====

    /// Get a row by index
    pub fn row(&self, index: usize) -> Result<&Vec<CellValue>> {
        self.data.get(index).ok_or(SheetError::RowIndexOutOfBounds {
            index,
            count: self.row_count(),
        })
    }

    // ===== Column Operations =====

    /// Get the values of a named column, without its header cell
    pub fn column_by_name(&self, name: &str) -> Result<Vec<CellValue>> {
        let index = self.column_index_by_name(name)?;
        Ok(self
            .data
            .iter()
            .skip(self.header_offset())
            .map(|row| row.get(index).cloned().unwrap_or_default())
            .collect())
    }

    /// Append a named, null-filled column and return its index.
    /// Only called once columns are named, so row 0 is the header.
    fn add_column(&mut self, name: &str) -> Result<usize> {
        let index = self.col_count();
        for (i, row) in self.data.iter_mut().enumerate() {
            if i == 0 {
                row.push(CellValue::String(name.to_string()));
            } else {
                row.push(CellValue::Null);
            }
        }

        let names = self.column_names.get_or_insert_with(Vec::new);
        names.push(name.to_string());
        self.column_index
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), index);
        Ok(index)
    }

    // ===== Named Access =====

    /// Use the first row as column headers
    ///
    /// # Errors
    ///
    /// Returns `SheetError::RowIndexOutOfBounds` for an empty sheet and
    /// `SheetError::DuplicateColumnName` if the header row contains duplicate names.
    pub fn name_columns_by_header(&mut self) -> Result<()> {
        let header_row = self.row(0)?;
        let names: Vec<String> = header_row.iter().map(CellValue::as_str).collect();

        let mut index_map = HashMap::new();
        for (i, name) in names.iter().enumerate() {
            if index_map.contains_key(name) {
                return Err(SheetError::DuplicateColumnName { name: name.clone() });
            }
            index_map.insert(name.clone(), i);
        }

        self.column_names = Some(names);
        self.column_index = Some(index_map);
        Ok(())
    }

    /// Use the first row as column headers, repairing names that could not
    /// be used as-is.
    ///
    /// Blank header cells become `Unnamed: <index>` and repeated names get a
    /// numeric suffix (`A`, `A.1`, `A.2`). The header row itself is rewritten
    /// with the repaired names so that saving the sheet keeps them.
    pub(crate) fn name_columns_from_header(&mut self) {
        let Some(header) = self.data.first_mut() else {
            return;
        };

        let mut names: Vec<String> = Vec::with_capacity(header.len());
        let mut index_map = HashMap::with_capacity(header.len());
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (i, cell) in header.iter_mut().enumerate() {
            let base = match cell.as_str() {
                s if s.trim().is_empty() => format!("Unnamed: {i}"),
                s => s,
            };

            let mut name = base.clone();
            while index_map.contains_key(&name) {
                let count = seen.entry(base.clone()).or_insert(0);
                *count += 1;
                name = format!("{base}.{count}");
            }

            *cell = CellValue::String(name.clone());
            index_map.insert(name.clone(), i);
            names.push(name);
        }

        self.column_names = Some(names);
        self.column_index = Some(index_map);
    }

    /// Get column names (if set)
    #[must_use]
    pub fn column_names(&self) -> Option<&Vec<String>> {
        self.column_names.as_ref()
    }

    /// Get the column index by name
    pub fn column_index_by_name(&self, name: &str) -> Result<usize> {
        self.column_index
            .as_ref()
            .ok_or_else(|| {
                SheetError::ColumnsNotNamed("Call name_columns_by_header() first".to_string())
            })?
            .get(name)
            .copied()
            .ok_or_else(|| SheetError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    // ===== Conversion =====

    /// Convert to a dictionary (column name -> values, header excluded)
    /// Returns None if columns are not named
    #[must_use]
    pub fn to_dict(&self) -> Option<IndexMap<String, Vec<CellValue>>> {
        let names = self.column_names.as_ref()?;
        let mut dict = IndexMap::with_capacity(names.len());

        for (i, name) in names.iter().enumerate() {
            let col: Vec<CellValue> = self
                .data
                .iter()
                .skip(self.header_offset())
                .map(|row| row.get(i).cloned().unwrap_or_default())
                .collect();
            dict.insert(name.clone(), col);
        }

        Some(dict)
    }

    /// Get rows iterator
    pub fn rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter()
    }

    /// Get internal data reference
    #[must_use]
    pub fn data(&self) -> &Vec<Vec<CellValue>> {
        &self.data
    }

    /// Get mutable internal data reference
    pub fn data_mut(&mut self) -> &mut Vec<Vec<CellValue>> {
        &mut self.data
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}
