//! Borrowed column and row views over a [`Record`].
//!
//! Views hold only a record reference and an index. The mutable views write
//! through [`Record`] so every change is recorded.

use crate::{Cell, Record, Result, Value};

/// All cells of one column, top to bottom
#[derive(Debug, Clone, Copy)]
pub struct ColumnView<'a> {
    record: &'a Record,
    column: usize,
}

impl<'a> ColumnView<'a> {
    pub(crate) fn new(record: &'a Record, column: usize) -> Self {
        Self { record, column }
    }

    pub fn name(&self) -> &'a str {
        &self.record.schema().column_names()[self.column]
    }

    pub fn len(&self) -> usize {
        self.record.row_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, row: isize) -> Result<&'a Cell> {
        let row = self.record.resolve_row(row)?;
        Ok(self.record.cell_at(row, self.column))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Cell> + 'a {
        let (record, column) = (self.record, self.column);
        (0..record.row_len()).map(move |row| record.cell_at(row, column))
    }

    /// Known values, `None` for cells not known yet
    pub fn values(&self) -> Vec<Option<&'a Value>> {
        self.iter().map(Cell::value).collect()
    }
}

/// One row, addressed by column name
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    record: &'a Record,
    row: usize,
}

impl<'a> RowView<'a> {
    pub(crate) fn new(record: &'a Record, row: usize) -> Self {
        Self { record, row }
    }

    pub fn index(&self) -> usize {
        self.row
    }

    pub fn cell(&self, column: &str) -> Result<&'a Cell> {
        let column = self.record.schema().column_index(column)?;
        Ok(self.record.cell_at(self.row, column))
    }

    pub fn get(&self, column: &str) -> Result<Option<&'a Value>> {
        Ok(self.cell(column)?.value())
    }

    /// `(column, cell)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Cell)> + 'a {
        let (record, row) = (self.record, self.row);
        record
            .schema()
            .column_names()
            .iter()
            .enumerate()
            .map(move |(column, name)| (name.as_str(), record.cell_at(row, column)))
    }
}

/// Write access to one column
#[derive(Debug)]
pub struct ColumnViewMut<'a> {
    record: &'a mut Record,
    column: usize,
}

impl<'a> ColumnViewMut<'a> {
    pub(crate) fn new(record: &'a mut Record, column: usize) -> Self {
        Self { record, column }
    }

    pub fn len(&self) -> usize {
        self.record.row_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, row: isize) -> Result<&Cell> {
        let row = self.record.resolve_row(row)?;
        Ok(self.record.cell_at(row, self.column))
    }

    pub fn set(&mut self, row: isize, value: impl Into<Value>) -> Result<()> {
        let row = self.record.resolve_row(row)?;
        self.record.set_at(row, self.column, value.into())
    }
}

/// Write access to one row
#[derive(Debug)]
pub struct RowViewMut<'a> {
    record: &'a mut Record,
    row: usize,
}

impl<'a> RowViewMut<'a> {
    pub(crate) fn new(record: &'a mut Record, row: usize) -> Self {
        Self { record, row }
    }

    pub fn get(&self, column: &str) -> Result<Option<&Value>> {
        let column = self.record.schema().column_index(column)?;
        Ok(self.record.cell_at(self.row, column).value())
    }

    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> Result<()> {
        let column = self.record.schema().column_index(column)?;
        self.record.set_at(self.row, column, value.into())
    }

    /// Set several columns; each one is recorded as if set on its own.
    pub fn update<I, K, V>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        values
            .into_iter()
            .try_for_each(|(column, value)| self.set(column.as_ref(), value))
    }
}
