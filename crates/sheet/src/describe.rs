//! Column descriptions: inferred type and non-null count per column.

use crate::cell::CellValue;
use crate::sheet::Sheet;
use indexmap::IndexMap;
use std::fmt;

/// Inferred storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Int64,
    Float64,
    Bool,
    Object,
}

impl ColumnType {
    /// Infer the type of a column from its values.
    ///
    /// Integers with floats or nulls widen to `Float64`, and a column with
    /// no values at all is `Float64` as well. Any string, or booleans mixed
    /// with anything else, make the column `Object`.
    #[must_use]
    pub fn infer(values: &[CellValue]) -> Self {
        let mut ints = 0usize;
        let mut floats = 0usize;
        let mut bools = 0usize;
        let mut nulls = 0usize;

        for value in values {
            match value {
                CellValue::Null => nulls += 1,
                CellValue::Int(_) => ints += 1,
                CellValue::Float(_) => floats += 1,
                CellValue::Bool(_) => bools += 1,
                CellValue::String(_) => return ColumnType::Object,
            }
        }

        if bools > 0 {
            if bools == values.len() {
                ColumnType::Bool
            } else {
                ColumnType::Object
            }
        } else if ints > 0 && floats == 0 && nulls == 0 {
            ColumnType::Int64
        } else {
            ColumnType::Float64
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ColumnType::Int64 => "int64",
            ColumnType::Float64 => "float64",
            ColumnType::Bool => "bool",
            ColumnType::Object => "object",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of one column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub non_null: usize,
    pub dtype: ColumnType,
}

/// Description of every column of a sheet
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub sheet: String,
    pub entries: usize,
    pub columns: Vec<ColumnInfo>,
}

impl ColumnSummary {
    /// Number of columns of each type, in order of first appearance
    #[must_use]
    pub fn dtype_counts(&self) -> IndexMap<ColumnType, usize> {
        let mut counts = IndexMap::new();
        for column in &self.columns {
            *counts.entry(column.dtype).or_insert(0) += 1;
        }
        counts
    }
}

impl Sheet {
    /// Describe the columns of this sheet.
    ///
    /// With named columns the header row is excluded; otherwise columns are
    /// named by their 0-based index and every row counts as an entry.
    #[must_use]
    pub fn describe_columns(&self) -> ColumnSummary {
        let columns: IndexMap<String, Vec<CellValue>> = self.to_dict().unwrap_or_else(|| {
            (0..self.col_count())
                .map(|i| {
                    let values = self
                        .rows()
                        .map(|row| row.get(i).cloned().unwrap_or_default())
                        .collect();
                    (i.to_string(), values)
                })
                .collect()
        });

        let entries = columns
            .values()
            .next()
            .map_or(self.record_count(), Vec::len);

        ColumnSummary {
            sheet: self.name().to_string(),
            entries,
            columns: columns
                .into_iter()
                .map(|(name, values)| ColumnInfo {
                    non_null: values.iter().filter(|v| !v.is_null()).count(),
                    dtype: ColumnType::infer(&values),
                    name,
                })
                .collect(),
        }
    }
}

impl fmt::Display for ColumnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sheet: {}", self.sheet)?;
        if self.entries == 0 {
            writeln!(f, "RangeIndex: 0 entries")?;
        } else {
            writeln!(
                f,
                "RangeIndex: {} entries, 0 to {}",
                self.entries,
                self.entries - 1
            )?;
        }
        writeln!(f, "Data columns (total {} columns):", self.columns.len())?;

        let width = self
            .columns
            .iter()
            .map(|c| c.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Column".len());

        writeln!(f, " #   {:<width$}  Non-Null Count  Dtype", "Column")?;
        writeln!(f, "---  {:<width$}  --------------  -----", "-".repeat(6))?;
        for (i, column) in self.columns.iter().enumerate() {
            let count = format!("{} non-null", column.non_null);
            writeln!(
                f,
                " {i:<3} {:<width$}  {count:<14}  {}",
                column.name, column.dtype
            )?;
        }

        let tally: Vec<String> = self
            .dtype_counts()
            .iter()
            .map(|(dtype, n)| format!("{dtype}({n})"))
            .collect();
        write!(f, "dtypes: {}", tally.join(", "))
    }
}
