//! Grouped, change-tracked records.
//!
//! A [`Record`] is one logical entity spread over consecutive rows that share
//! the schema's group-by values. Cells live in one flat row-major vector.
//! Every write goes through the record and is recorded in its [`ChangeLog`],
//! which [`Record::save`] flushes as a single batch.

use crate::executor::{perform, ConnectionPool, RowSet};
use crate::view::{ColumnView, ColumnViewMut, RowView, RowViewMut};
use crate::{Cell, ChangeKey, ChangeLog, Dialect, Error, Result, Schema, Value};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    cells: Vec<Cell>,
    group_key: IndexMap<String, Value>,
    changes: ChangeLog,
    /// Per row: the pending INSERT of an appended, unsaved row
    inserts: Vec<Option<ChangeKey>>,
}

impl Record {
    /// An empty record; the first appended row supplies its group key.
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        Self {
            schema: schema.into(),
            cells: Vec::new(),
            group_key: IndexMap::new(),
            changes: ChangeLog::new(),
            inserts: Vec::new(),
        }
    }

    /// Fix the group key up front, so appends inherit it.
    pub fn with_group_key<I, K, V>(mut self, key: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (column, value) in key {
            let column = column.into();
            self.schema.column_index(&column)?;
            if !self.schema.is_group_column(&column) {
                return Err(Error::invalid_query(format!(
                    "{column} is not a group-by column of {}",
                    self.schema.table()
                )));
            }
            self.group_key.insert(column, value.into());
        }
        Ok(self)
    }

    pub(crate) fn from_rows(schema: Arc<Schema>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut record = Record::new(schema);
        if let Some(first) = rows.first() {
            for column in record.schema.group_columns() {
                let index = record.schema.column_index(column)?;
                let value = first.get(index).cloned().unwrap_or(Value::Null);
                record.group_key.insert(column.clone(), value);
            }
        }
        record.inserts = vec![None; rows.len()];
        record.cells = rows
            .into_iter()
            .flat_map(|row| row.into_iter().map(Cell::Known))
            .collect();
        Ok(record)
    }

    /// All fetched rows as one record, without grouping.
    ///
    /// The rows need not share group-by values, so the record has no group
    /// key and appends inherit nothing.
    pub fn from_row_set(schema: impl Into<Arc<Schema>>, rows: RowSet) -> Result<Self> {
        let schema = schema.into();
        let rows = reorder(&schema, rows)?;
        let mut record = Record::from_rows(schema, rows)?;
        record.group_key.clear();
        Ok(record)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn column_count(&self) -> usize {
        self.schema.column_count()
    }

    pub fn row_len(&self) -> usize {
        match self.column_count() {
            0 => 0,
            count => self.cells.len() / count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The group-by values shared by every row
    pub fn group_key(&self) -> &IndexMap<String, Value> {
        &self.group_key
    }

    /// A group-level value: a group-by column, or a squashed column read
    /// from the first row. `None` when there is no such row or the cell is
    /// not known.
    pub fn group_value(&self, column: &str) -> Result<Option<&Value>> {
        let index = self.schema.column_index(column)?;
        if self.schema.is_group_column(column) {
            return Ok(self.group_key.get(column));
        }
        if self.schema.is_squashed_column(column) {
            return Ok(self
                .cells
                .get(index)
                .and_then(Cell::value));
        }
        Err(Error::invalid_query(format!(
            "{column} is not a group-level column of {}",
            self.schema.table()
        )))
    }

    /// Resolve a possibly negative row index against the current row count.
    pub(crate) fn resolve_row(&self, index: isize) -> Result<usize> {
        let len = self.row_len();
        let resolved = if index < 0 {
            index + len as isize
        } else {
            index
        };
        if resolved < 0 || resolved as usize >= len {
            return Err(Error::RowOutOfRange { index, len });
        }
        Ok(resolved as usize)
    }

    pub(crate) fn cell_at(&self, row: usize, column: usize) -> &Cell {
        &self.cells[row * self.column_count() + column]
    }

    pub fn cell(&self, row: isize, column: &str) -> Result<&Cell> {
        let row = self.resolve_row(row)?;
        let column = self.schema.column_index(column)?;
        Ok(self.cell_at(row, column))
    }

    /// The known value of one cell
    pub fn get(&self, row: isize, column: &str) -> Result<Option<&Value>> {
        Ok(self.cell(row, column)?.value())
    }

    fn identity(&self, row: usize) -> Result<Vec<Value>> {
        let columns = self.schema.identity_columns();
        if columns.is_empty() {
            return Err(Error::invalid_query(format!(
                "{} declares no identity columns",
                self.schema.table()
            )));
        }
        columns
            .iter()
            .map(|column| {
                let index = self.schema.column_index(column)?;
                match self.cell_at(row, index) {
                    Cell::Known(value) => Ok(value.clone()),
                    Cell::Pending | Cell::UseDefault => Err(Error::identity(columns)),
                }
            })
            .collect()
    }

    pub(crate) fn set_at(&mut self, row: usize, column: usize, value: Value) -> Result<()> {
        let identity = self.identity(row)?;
        let name = self.schema.column_names()[column].clone();
        match &self.inserts[row] {
            Some(key) => self.changes.amend_insert(key, &name, value.clone())?,
            None => self.changes.record_update(
                self.schema.identity_columns(),
                identity,
                &name,
                value.clone(),
            )?,
        }
        if row == 0 && self.schema.is_group_column(&name) {
            self.group_key.insert(name, value.clone());
        }
        let offset = row * self.column_count() + column;
        self.cells[offset] = Cell::from(value);
        Ok(())
    }

    /// Write one cell and record an UPDATE for its row. On a row appended
    /// since the last save the value joins that row's INSERT instead.
    ///
    /// Fails with an identity error when the row's identity is not known yet.
    pub fn set(&mut self, row: isize, column: &str, value: impl Into<Value>) -> Result<()> {
        let row = self.resolve_row(row)?;
        let column = self.schema.column_index(column)?;
        self.set_at(row, column, value.into())
    }

    /// Add a row and record an INSERT.
    ///
    /// Group-by columns missing from `row` are taken from the group key.
    /// Other missing columns stay [`Cell::Pending`] and are left out of the
    /// INSERT so the database fills them.
    pub fn append<I, K, V>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut given = IndexMap::new();
        for (column, value) in row {
            let column = column.into();
            self.schema.column_index(&column)?;
            given.insert(column, value.into());
        }
        for (column, value) in &self.group_key {
            given
                .entry(column.clone())
                .or_insert_with(|| value.clone());
        }

        let mut payload = IndexMap::new();
        let mut cells = Vec::with_capacity(self.column_count());
        for column in self.schema.column_names() {
            match given.shift_remove(column) {
                Some(value) => {
                    cells.push(Cell::from(value.clone()));
                    payload.insert(column.clone(), value);
                }
                None => cells.push(Cell::Pending),
            }
        }

        if self.is_empty() && self.group_key.is_empty() {
            for column in self.schema.group_columns() {
                if let Some(value) = payload.get(column) {
                    self.group_key.insert(column.clone(), value.clone());
                }
            }
        }
        let key = self.changes.record_insert(payload);
        self.inserts.push(Some(key));
        self.cells.extend(cells);
        Ok(())
    }

    /// Remove the last row and record a DELETE.
    pub fn pop(&mut self) -> Result<Vec<Cell>> {
        self.pop_at(-1)
    }

    /// Remove a row and record a DELETE for it. Popping a row appended
    /// since the last save drops its INSERT instead.
    pub fn pop_at(&mut self, row: isize) -> Result<Vec<Cell>> {
        let row = self.resolve_row(row)?;
        let identity = self.identity(row)?;
        match self.inserts.remove(row) {
            Some(key) => {
                self.changes.discard_insert(&key);
            }
            None => self
                .changes
                .record_delete(self.schema.identity_columns(), identity)?,
        }
        let start = row * self.column_count();
        Ok(self.cells.drain(start..start + self.column_count()).collect())
    }

    /// Pop every row, last first.
    pub fn clear(&mut self) -> Result<()> {
        while !self.is_empty() {
            self.pop()?;
        }
        Ok(())
    }

    pub fn column(&self, column: &str) -> Result<ColumnView<'_>> {
        let index = self.schema.column_index(column)?;
        Ok(ColumnView::new(self, index))
    }

    pub fn column_mut(&mut self, column: &str) -> Result<ColumnViewMut<'_>> {
        let index = self.schema.column_index(column)?;
        Ok(ColumnViewMut::new(self, index))
    }

    pub fn row(&self, row: isize) -> Result<RowView<'_>> {
        let row = self.resolve_row(row)?;
        Ok(RowView::new(self, row))
    }

    pub fn row_mut(&mut self, row: isize) -> Result<RowViewMut<'_>> {
        let row = self.resolve_row(row)?;
        Ok(RowViewMut::new(self, row))
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        (0..self.row_len()).map(move |row| RowView::new(self, row))
    }

    pub fn changes(&self) -> &ChangeLog {
        &self.changes
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// The statements [`Record::save`] would send, in recording order
    pub fn to_statements(&self, dialect: &Dialect) -> Result<Vec<String>> {
        self.changes.to_statements(dialect, self.schema.table())
    }

    /// Flush every recorded change as one `; `-joined batch, then clear the
    /// change log. Nothing is sent when there are no changes.
    ///
    /// Values the database assigns (serial keys, defaults) are not read back;
    /// fetch the record again to learn them.
    pub async fn save<P: ConnectionPool>(&mut self, pool: &P) -> Result<()> {
        if !self.has_changes() {
            return Ok(());
        }
        let batch = self.to_statements(&Dialect::current())?.join("; ");
        perform(pool, &batch).await?;
        self.changes.clear();
        self.inserts.fill(None);
        Ok(())
    }

    /// [`Record::save`] for synchronous callers
    pub fn save_blocking<P: ConnectionPool>(&mut self, pool: &P) -> Result<()> {
        futures::executor::block_on(self.save(pool))
    }
}

/// Rows reordered to schema column order; extra result columns are dropped.
fn reorder(schema: &Schema, rows: RowSet) -> Result<Vec<Vec<Value>>> {
    // An empty result may come without column names.
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let positions = schema
        .column_names()
        .iter()
        .map(|column| {
            rows.column_index(column)
                .ok_or_else(|| Error::column_not_found(schema.table(), column))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(rows
        .rows
        .into_iter()
        .map(|row| {
            positions
                .iter()
                .map(|&i| row.get(i).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect())
}

/// Split rows into records by runs of equal group-by values.
///
/// Rows must already be ordered by the group-by columns: grouping is a single
/// pass over consecutive rows, so a key that reappears later starts a new
/// record.
pub fn group_rows(schema: impl Into<Arc<Schema>>, rows: RowSet) -> Result<Vec<Record>> {
    let schema = schema.into();
    let group_positions = schema
        .group_columns()
        .iter()
        .map(|column| schema.column_index(column))
        .collect::<Result<Vec<_>>>()?;
    let rows = reorder(&schema, rows)?;
    let row_count = rows.len();

    let mut records = Vec::new();
    let mut run: Vec<Vec<Value>> = Vec::new();
    let mut run_key: Option<Vec<Value>> = None;
    for row in rows {
        let key: Vec<Value> = group_positions.iter().map(|&i| row[i].clone()).collect();
        if run_key.as_ref().is_some_and(|current| *current != key) {
            records.push(Record::from_rows(schema.clone(), std::mem::take(&mut run))?);
        }
        run_key = Some(key);
        run.push(row);
    }
    if !run.is_empty() {
        records.push(Record::from_rows(schema.clone(), run)?);
    }

    debug!(
        target: "quarry.model",
        table = schema.table(),
        rows = row_count,
        records = records.len(),
        "grouped rows"
    );
    Ok(records)
}
