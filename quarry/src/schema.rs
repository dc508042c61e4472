//! Table descriptor shared by records and finders

use crate::{Error, IntoColumns, Result};

/// Describes how rows of one table map onto records.
///
/// ```
/// use quarry::Schema;
///
/// let detail = Schema::new("detail", ("detail_id", "person_id", "key", "val"))
///     .identify_by("detail_id")
///     .group_by(("person_id", "key"))
///     .arrange_by("detail_id");
///
/// assert_eq!(detail.column_index("key").unwrap(), 2);
/// assert!(detail.column_index("nope").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    table: String,
    column_names: Vec<String>,
    identify_by: Vec<String>,
    group_by: Vec<String>,
    squashed: Vec<String>,
    arrange_by: Vec<String>,
}

impl Schema {
    pub fn new(table: &str, columns: impl IntoColumns) -> Self {
        Self {
            table: table.to_string(),
            column_names: columns.into_columns(),
            identify_by: Vec::new(),
            group_by: Vec::new(),
            squashed: Vec::new(),
            arrange_by: Vec::new(),
        }
    }

    /// Columns that address one physical row in UPDATE and DELETE
    pub fn identify_by(mut self, columns: impl IntoColumns) -> Self {
        self.identify_by = columns.into_columns();
        self
    }

    /// Columns whose shared value makes consecutive rows one record
    pub fn group_by(mut self, columns: impl IntoColumns) -> Self {
        self.group_by = columns.into_columns();
        self
    }

    /// Non-grouping columns read at group level from the first row
    pub fn squashed(mut self, columns: impl IntoColumns) -> Self {
        self.squashed = columns.into_columns();
        self
    }

    /// Extra ORDER BY columns for finders, after the group-by columns
    pub fn arrange_by(mut self, columns: impl IntoColumns) -> Self {
        self.arrange_by = columns.into_columns();
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }

    pub fn identity_columns(&self) -> &[String] {
        &self.identify_by
    }

    pub fn group_columns(&self) -> &[String] {
        &self.group_by
    }

    pub fn squashed_columns(&self) -> &[String] {
        &self.squashed
    }

    pub fn arrange_columns(&self) -> &[String] {
        &self.arrange_by
    }

    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.column_names
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| Error::column_not_found(&self.table, column))
    }

    pub(crate) fn is_group_column(&self, column: &str) -> bool {
        self.group_by.iter().any(|c| c == column)
    }

    pub(crate) fn is_squashed_column(&self, column: &str) -> bool {
        self.squashed.iter().any(|c| c == column)
    }

    /// Every column named by identify/group/squash/arrange must be declared.
    pub fn validate(&self) -> Result<()> {
        self.identify_by
            .iter()
            .chain(&self.group_by)
            .chain(&self.squashed)
            .chain(&self.arrange_by)
            .try_for_each(|column| self.column_index(column).map(|_| ()))
    }
}
