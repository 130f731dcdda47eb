//! Tabular query results.
//!
//! A [`RawTable`] is what the database layer hands over: storage column names
//! and typed cells, in query order. A [`DisplayTable`] has the same shape but
//! carries display column names and is what the panels serialize.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ViewError;

/// A single typed cell of a query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

fn check_arity(row_index: usize, width: usize, row: &[CellValue]) -> Result<(), ViewError> {
    if row.len() == width {
        Ok(())
    } else {
        Err(ViewError::RowArity {
            row: row_index,
            expected: width,
            got: row.len(),
        })
    }
}

/// Wire form of both table types, checked before it becomes one.
#[derive(Deserialize)]
struct TableShape {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl TableShape {
    fn checked(self) -> Result<(Vec<String>, Vec<Vec<CellValue>>), ViewError> {
        for (i, row) in self.rows.iter().enumerate() {
            check_arity(i, self.columns.len(), row)?;
        }
        Ok((self.columns, self.rows))
    }
}

/// Column-ordered result of a SQL query, using storage column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableShape")]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Create an empty table with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Create a table and fill it, checking every row's width.
    pub fn with_rows<I, S>(columns: I, rows: Vec<Vec<CellValue>>) -> Result<Self, ViewError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<(), ViewError> {
        check_arity(self.rows.len(), self.columns.len(), &row)?;
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by storage name.
    pub fn column_index(&self, name: &str) -> Result<usize, ViewError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ViewError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    /// Iterate the cells of one column, top to bottom.
    pub fn column<'a>(
        &'a self,
        name: &str,
    ) -> Result<impl Iterator<Item = &'a CellValue> + 'a, ViewError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }
}

impl TryFrom<TableShape> for RawTable {
    type Error = ViewError;

    fn try_from(shape: TableShape) -> Result<Self, Self::Error> {
        let (columns, rows) = shape.checked()?;
        Ok(Self { columns, rows })
    }
}

/// Presentation-shaped table with display column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableShape")]
pub struct DisplayTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl TryFrom<TableShape> for DisplayTable {
    type Error = ViewError;

    fn try_from(shape: TableShape) -> Result<Self, Self::Error> {
        let (columns, rows) = shape.checked()?;
        Ok(Self { columns, rows })
    }
}

impl DisplayTable {
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by display name.
    pub fn column_index(&self, name: &str) -> Result<usize, ViewError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ViewError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    /// Keep only the rows matching `keep`, preserving order.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }
}
