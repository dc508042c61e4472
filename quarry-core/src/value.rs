//! Value types rendered into SQL literals

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A bound-parameter marker. Rendered as the dialect's placeholder instead of
/// an inlined literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Param {
    /// Positional placeholder (`%s`, `?`)
    Positional,
    /// Named placeholder (`%(name)s`, `:name`)
    Named(String),
}

/// A SQL value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 32-bit integer
    I32(i32),
    /// 64-bit integer
    I64(i64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// String value
    String(String),
    /// Bytes value
    Bytes(Vec<u8>),
    /// JSON value
    Json(serde_json::Value),
    /// Array of values
    Array(Vec<Value>),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Date and time without zone
    DateTime(NaiveDateTime),
    /// UTC timestamp
    Timestamp(DateTime<Utc>),
    /// UUID value
    #[cfg(feature = "uuid-support")]
    Uuid(uuid::Uuid),
    /// Arbitrary precision decimal
    #[cfg(feature = "decimal-support")]
    Decimal(rust_decimal::Decimal),
    /// SQL emitted verbatim, without escaping.
    ///
    /// This bypasses every safety check in the formatter. Only wrap text that
    /// is already trusted SQL (subqueries, function calls, column references).
    Raw(String),
    /// Bound parameter placeholder
    Param(Param),
    /// The `DEFAULT` keyword, letting the database choose the value
    Default,
}

impl Value {
    /// Mark `sql` as trusted SQL to be emitted verbatim.
    pub fn raw(sql: impl Into<String>) -> Self {
        Value::Raw(sql.into())
    }

    /// Positional bound-parameter placeholder
    pub fn param() -> Self {
        Value::Param(Param::Positional)
    }

    /// Named bound-parameter placeholder
    pub fn named_param(name: impl Into<String>) -> Self {
        Value::Param(Param::Named(name.into()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the SQL type name for this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::I32(_) => "INTEGER",
            Value::I64(_) => "BIGINT",
            Value::F32(_) => "REAL",
            Value::F64(_) => "DOUBLE PRECISION",
            Value::String(_) => "TEXT",
            Value::Bytes(_) => "BYTEA",
            Value::Json(_) => "JSON",
            Value::Array(_) => "ARRAY",
            Value::Date(_) => "DATE",
            Value::Time(_) => "TIME",
            Value::DateTime(_) => "TIMESTAMP",
            Value::Timestamp(_) => "TIMESTAMPTZ",
            #[cfg(feature = "uuid-support")]
            Value::Uuid(_) => "UUID",
            #[cfg(feature = "decimal-support")]
            Value::Decimal(_) => "NUMERIC",
            Value::Raw(_) => "RAW",
            Value::Param(_) => "PARAMETER",
            Value::Default => "DEFAULT",
        }
    }

    /// Extract array values if this is an Array variant
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

// Implement From for common types
impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Bool(val)
    }
}

impl From<i32> for Value {
    fn from(val: i32) -> Self {
        Value::I32(val)
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::I64(val)
    }
}

impl From<f32> for Value {
    fn from(val: f32) -> Self {
        Value::F32(val)
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::F64(val)
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::String(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::String(val.to_string())
    }
}

impl From<&String> for Value {
    fn from(val: &String) -> Self {
        Value::String(val.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(val: Vec<u8>) -> Self {
        Value::Bytes(val)
    }
}

impl From<serde_json::Value> for Value {
    fn from(val: serde_json::Value) -> Self {
        Value::Json(val)
    }
}

impl From<NaiveDate> for Value {
    fn from(val: NaiveDate) -> Self {
        Value::Date(val)
    }
}

impl From<NaiveTime> for Value {
    fn from(val: NaiveTime) -> Self {
        Value::Time(val)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(val: NaiveDateTime) -> Self {
        Value::DateTime(val)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(val: DateTime<Utc>) -> Self {
        Value::Timestamp(val)
    }
}

#[cfg(feature = "uuid-support")]
impl From<uuid::Uuid> for Value {
    fn from(val: uuid::Uuid) -> Self {
        Value::Uuid(val)
    }
}

#[cfg(feature = "decimal-support")]
impl From<rust_decimal::Decimal> for Value {
    fn from(val: rust_decimal::Decimal) -> Self {
        Value::Decimal(val)
    }
}

impl From<Param> for Value {
    fn from(val: Param) -> Self {
        Value::Param(val)
    }
}

// Vec<u8> is bytes, so arrays of small integers go through i32/i64.
impl From<Vec<i32>> for Value {
    fn from(vals: Vec<i32>) -> Self {
        Value::Array(vals.into_iter().map(Value::I32).collect())
    }
}

impl From<Vec<i64>> for Value {
    fn from(vals: Vec<i64>) -> Self {
        Value::Array(vals.into_iter().map(Value::I64).collect())
    }
}

impl From<Vec<&str>> for Value {
    fn from(vals: Vec<&str>) -> Self {
        Value::Array(vals.into_iter().map(Value::from).collect())
    }
}

impl From<Vec<String>> for Value {
    fn from(vals: Vec<String>) -> Self {
        Value::Array(vals.into_iter().map(Value::String).collect())
    }
}

impl From<Vec<Value>> for Value {
    fn from(vals: Vec<Value>) -> Self {
        Value::Array(vals)
    }
}

impl<T> From<&[T]> for Value
where
    T: Clone + Into<Value>,
{
    fn from(vals: &[T]) -> Self {
        Value::Array(vals.iter().cloned().map(|v| v.into()).collect())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}
