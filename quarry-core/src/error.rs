//! Error types for Quarry

use thiserror::Error;

/// The main error type for Quarry operations
#[derive(Error, Debug)]
pub enum Error {
    /// A value the active dialect cannot represent as a literal
    #[error("Cannot escape {value:?}: {reason}")]
    Escape { value: String, reason: String },

    /// An operator outside the allow-list. Operators are emitted unescaped,
    /// so this is never downgraded.
    #[error("Operator '{operator}' is not allowed")]
    Operator { operator: String },

    /// An ORDER BY direction outside the allow-list
    #[error("Invalid sort direction '{direction}'")]
    Direction { direction: String },

    /// A constrained keyword argument (join type and the like) with an invalid value
    #[error("Invalid option '{option}' for {clause}")]
    Option { clause: String, option: String },

    /// A row was addressed through identity columns that are not yet known
    #[error("Row identity is unresolved: {columns:?} hold values not yet assigned by the database")]
    Identity { columns: Vec<String> },

    /// Column not found error
    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    /// Row index outside the record
    #[error("Row index {index} out of range for {len} rows")]
    RowOutOfRange { index: isize, len: usize },

    /// Invalid query configuration
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    /// Database connection or execution error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Error raised by a non-sqlx connection collaborator
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience Result type for Quarry operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new escape error
    pub fn escape(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Escape {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a new operator error
    pub fn operator(operator: impl Into<String>) -> Self {
        Self::Operator {
            operator: operator.into(),
        }
    }

    /// Create a new direction error
    pub fn direction(direction: impl Into<String>) -> Self {
        Self::Direction {
            direction: direction.into(),
        }
    }

    /// Create a new option error
    pub fn option(clause: impl Into<String>, option: impl Into<String>) -> Self {
        Self::Option {
            clause: clause.into(),
            option: option.into(),
        }
    }

    /// Create a new identity error
    pub fn identity<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Identity {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a new column not found error
    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Create a new invalid query error
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Create a new connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_error() {
        let err = Error::escape("a\0b", "NUL byte");
        assert!(matches!(err, Error::Escape { .. }));
        assert_eq!(err.to_string(), "Cannot escape \"a\\0b\": NUL byte");
    }

    #[test]
    fn test_operator_error_names_operator() {
        let err = Error::operator("; DROP");
        assert_eq!(err.to_string(), "Operator '; DROP' is not allowed");
    }

    #[test]
    fn test_option_error() {
        let err = Error::option("JOIN", "SIDEWAYS");
        assert_eq!(err.to_string(), "Invalid option 'SIDEWAYS' for JOIN");
    }

    #[test]
    fn test_identity_error() {
        let err = Error::identity(["person_id", "key"]);
        assert!(matches!(err, Error::Identity { ref columns } if columns.len() == 2));
    }

    #[test]
    fn test_column_not_found_error() {
        let err = Error::column_not_found("users", "invalid_column");
        assert_eq!(
            err.to_string(),
            "Column 'invalid_column' not found in table 'users'"
        );
    }

    #[test]
    fn test_invalid_query_error() {
        let err = Error::invalid_query("UPDATE requires SET");
        assert_eq!(err.to_string(), "Invalid query: UPDATE requires SET");
    }
}
