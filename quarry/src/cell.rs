//! Cell contents of a record's backing store

use crate::Value;

/// One cell of a [`Record`](crate::Record).
///
/// `Pending` marks a value the database assigns and that has not been fetched
/// yet, such as a serial key of an appended row. `UseDefault` asks the
/// database for the column default on insert.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    Known(Value),
    #[default]
    Pending,
    UseDefault,
}

impl Cell {
    pub fn is_known(&self) -> bool {
        matches!(self, Cell::Known(_))
    }

    /// The value, if known
    pub fn value(&self) -> Option<&Value> {
        match self {
            Cell::Known(value) => Some(value),
            Cell::Pending | Cell::UseDefault => None,
        }
    }

    /// The value written into an INSERT or UPDATE, or `None` when the cell
    /// has nothing to send.
    pub fn to_sql_value(&self) -> Option<Value> {
        match self {
            Cell::Known(value) => Some(value.clone()),
            Cell::UseDefault => Some(Value::Default),
            Cell::Pending => None,
        }
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        match value {
            Value::Default => Cell::UseDefault,
            value => Cell::Known(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_marker_becomes_use_default() {
        assert_eq!(Cell::from(Value::Default), Cell::UseDefault);
        assert_eq!(Cell::from(Value::Null), Cell::Known(Value::Null));
    }

    #[test]
    fn test_sql_value() {
        assert_eq!(Cell::Known(1.into()).to_sql_value(), Some(Value::I32(1)));
        assert_eq!(Cell::UseDefault.to_sql_value(), Some(Value::Default));
        assert_eq!(Cell::Pending.to_sql_value(), None);
        assert!(Cell::Pending.value().is_none());
    }
}
