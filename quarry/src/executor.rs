//! Connection collaborator interface and the perform/fetch cycle

use crate::{Error, Result, Value};
use std::future::Future;
use tracing::{debug, warn};

/// Rows returned by a query, with column names in result order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows,
        }
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Trait for database connection pools
pub trait ConnectionPool: Send + Sync {
    /// The connection type for this pool
    type Connection: Connection;

    /// Borrow a connection
    fn acquire(&self) -> impl Future<Output = Result<Self::Connection>> + Send;

    /// Hand a connection back; uncommitted work is discarded
    fn release(&self, connection: Self::Connection) -> impl Future<Output = ()> + Send;
}

/// A borrowed connection running complete SQL text
pub trait Connection: Send {
    /// Execute one or more `;`-separated statements
    fn execute(&mut self, sql: &str) -> impl Future<Output = Result<u64>> + Send;

    fn fetch_all(&mut self, sql: &str) -> impl Future<Output = Result<RowSet>> + Send;

    fn commit(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn rollback(&mut self) -> impl Future<Output = Result<()>> + Send;
}

/// Execute `sql` on a borrowed connection and commit.
///
/// Any execution or commit failure is followed by a rollback and returned
/// unchanged; a failing rollback is only logged. The connection is released
/// in every case.
pub async fn perform<P: ConnectionPool>(pool: &P, sql: &str) -> Result<u64> {
    debug!(target: "quarry.sql", sql, "perform");
    let mut connection = pool.acquire().await?;
    let outcome = execute_and_commit(&mut connection, sql).await;
    if let Err(error) = &outcome {
        if let Err(rollback_error) = connection.rollback().await {
            warn!(
                target: "quarry.sql",
                %error,
                %rollback_error,
                "rollback failed after execution error"
            );
        }
    }
    pool.release(connection).await;
    outcome
}

async fn execute_and_commit<C: Connection>(connection: &mut C, sql: &str) -> Result<u64> {
    let affected = connection.execute(sql).await?;
    connection.commit().await?;
    Ok(affected)
}

/// Run a query on a borrowed connection and return its rows.
pub async fn fetch<P: ConnectionPool>(pool: &P, sql: &str) -> Result<RowSet> {
    let mut connection = pool.acquire().await?;
    let rows = connection.fetch_all(sql).await;
    pool.release(connection).await;
    let rows = rows?;
    debug!(target: "quarry.sql", sql, rows = rows.len(), "fetch");
    Ok(rows)
}

/// [`perform`] for synchronous callers
pub fn perform_blocking<P: ConnectionPool>(pool: &P, sql: &str) -> Result<u64> {
    futures::executor::block_on(perform(pool, sql))
}

/// [`fetch`] for synchronous callers
pub fn fetch_blocking<P: ConnectionPool>(pool: &P, sql: &str) -> Result<RowSet> {
    futures::executor::block_on(fetch(pool, sql))
}

/// SQLx connection pool wrapper
#[cfg(feature = "postgres")]
pub mod postgres {
    use super::*;
    use sqlx::postgres::PgRow;
    use sqlx::{Column, Executor, PgPool, Postgres, Row, TypeInfo};

    /// PostgreSQL connection pool wrapper
    #[derive(Clone)]
    pub struct PostgresPool {
        inner: PgPool,
    }

    impl PostgresPool {
        /// Create a new PostgreSQL pool from a connection string
        pub async fn new(database_url: &str) -> Result<Self> {
            let pool = PgPool::connect(database_url).await?;
            Ok(Self { inner: pool })
        }

        /// Create from an existing PgPool
        pub fn from_pool(pool: PgPool) -> Self {
            Self { inner: pool }
        }
    }

    /// A pooled connection inside one open transaction
    pub struct PostgresConnection {
        tx: Option<sqlx::Transaction<'static, Postgres>>,
    }

    impl PostgresConnection {
        fn transaction(&mut self) -> Result<&mut sqlx::Transaction<'static, Postgres>> {
            self.tx
                .as_mut()
                .ok_or_else(|| Error::connection("transaction already finished"))
        }
    }

    impl ConnectionPool for PostgresPool {
        type Connection = PostgresConnection;

        async fn acquire(&self) -> Result<Self::Connection> {
            let tx = self.inner.begin().await?;
            Ok(PostgresConnection { tx: Some(tx) })
        }

        async fn release(&self, connection: Self::Connection) {
            // Dropping an open transaction rolls it back and returns the
            // connection to the pool.
            drop(connection);
        }
    }

    impl Connection for PostgresConnection {
        async fn execute(&mut self, sql: &str) -> Result<u64> {
            let tx = self.transaction()?;
            let result = (&mut **tx).execute(sql).await?;
            Ok(result.rows_affected())
        }

        async fn fetch_all(&mut self, sql: &str) -> Result<RowSet> {
            let tx = self.transaction()?;
            let rows = (&mut **tx).fetch_all(sql).await?;
            let columns = rows
                .first()
                .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
                .unwrap_or_default();
            let rows = rows.iter().map(decode_row).collect::<Result<Vec<_>>>()?;
            Ok(RowSet { columns, rows })
        }

        async fn commit(&mut self) -> Result<()> {
            if let Some(tx) = self.tx.take() {
                tx.commit().await?;
            }
            Ok(())
        }

        async fn rollback(&mut self) -> Result<()> {
            if let Some(tx) = self.tx.take() {
                tx.rollback().await?;
            }
            Ok(())
        }
    }

    fn decode_row(row: &PgRow) -> Result<Vec<Value>> {
        (0..row.len()).map(|i| decode_cell(row, i)).collect()
    }

    /// Column types the adapter can decode
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum PgKind {
        Bool,
        Int2,
        Int4,
        Int8,
        Float4,
        Float8,
        Text,
        Bytes,
        Json,
        Date,
        Time,
        Timestamp,
        TimestampTz,
        #[cfg(feature = "uuid-support")]
        Uuid,
        #[cfg(feature = "decimal-support")]
        Numeric,
    }

    fn kind_of(column: &str, type_name: &str) -> Result<PgKind> {
        let kind = match type_name {
            "BOOL" => PgKind::Bool,
            "INT2" => PgKind::Int2,
            "INT4" => PgKind::Int4,
            "INT8" => PgKind::Int8,
            "FLOAT4" => PgKind::Float4,
            "FLOAT8" => PgKind::Float8,
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "UNKNOWN" => PgKind::Text,
            "BYTEA" => PgKind::Bytes,
            "JSON" | "JSONB" => PgKind::Json,
            "DATE" => PgKind::Date,
            "TIME" => PgKind::Time,
            "TIMESTAMP" => PgKind::Timestamp,
            "TIMESTAMPTZ" => PgKind::TimestampTz,
            #[cfg(feature = "uuid-support")]
            "UUID" => PgKind::Uuid,
            #[cfg(not(feature = "uuid-support"))]
            "UUID" => return Err(needs_feature(column, type_name, "uuid-support")),
            #[cfg(feature = "decimal-support")]
            "NUMERIC" => PgKind::Numeric,
            #[cfg(not(feature = "decimal-support"))]
            "NUMERIC" => return Err(needs_feature(column, type_name, "decimal-support")),
            other => {
                return Err(Error::invalid_query(format!(
                    "column {column} has unsupported type {other}; cast it in the query"
                )));
            }
        };
        Ok(kind)
    }

    #[cfg(not(all(feature = "uuid-support", feature = "decimal-support")))]
    fn needs_feature(column: &str, type_name: &str, feature: &str) -> Error {
        Error::invalid_query(format!(
            "column {column} has type {type_name}, which needs the {feature} feature"
        ))
    }

    fn decode_cell(row: &PgRow, index: usize) -> Result<Value> {
        let column = row.column(index);
        let kind = kind_of(column.name(), column.type_info().name())?;
        let value = match kind {
            PgKind::Bool => row.try_get::<Option<bool>, _>(index)?.into(),
            PgKind::Int2 => row
                .try_get::<Option<i16>, _>(index)?
                .map(i32::from)
                .into(),
            PgKind::Int4 => row.try_get::<Option<i32>, _>(index)?.into(),
            PgKind::Int8 => row.try_get::<Option<i64>, _>(index)?.into(),
            PgKind::Float4 => row.try_get::<Option<f32>, _>(index)?.into(),
            PgKind::Float8 => row.try_get::<Option<f64>, _>(index)?.into(),
            PgKind::Text => row.try_get::<Option<String>, _>(index)?.into(),
            PgKind::Bytes => row.try_get::<Option<Vec<u8>>, _>(index)?.into(),
            PgKind::Json => row.try_get::<Option<serde_json::Value>, _>(index)?.into(),
            PgKind::Date => row.try_get::<Option<chrono::NaiveDate>, _>(index)?.into(),
            PgKind::Time => row.try_get::<Option<chrono::NaiveTime>, _>(index)?.into(),
            PgKind::Timestamp => row
                .try_get::<Option<chrono::NaiveDateTime>, _>(index)?
                .into(),
            PgKind::TimestampTz => row
                .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index)?
                .into(),
            #[cfg(feature = "uuid-support")]
            PgKind::Uuid => row.try_get::<Option<uuid::Uuid>, _>(index)?.into(),
            #[cfg(feature = "decimal-support")]
            PgKind::Numeric => row
                .try_get::<Option<rust_decimal::Decimal>, _>(index)?
                .into(),
        };
        Ok(value)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_known_types() {
            assert_eq!(kind_of("id", "INT8").unwrap(), PgKind::Int8);
            assert_eq!(kind_of("name", "VARCHAR").unwrap(), PgKind::Text);
            assert_eq!(kind_of("doc", "JSONB").unwrap(), PgKind::Json);
            assert_eq!(kind_of("at", "TIMESTAMPTZ").unwrap(), PgKind::TimestampTz);
        }

        #[test]
        fn test_unknown_type_is_named() {
            let err = kind_of("span", "INTERVAL").unwrap_err();
            assert!(matches!(err, Error::InvalidQuery { .. }));
            assert!(err.to_string().contains("span has unsupported type INTERVAL"));
            assert!(kind_of("ids", "INT4[]").is_err());
        }

        #[cfg(feature = "decimal-support")]
        #[test]
        fn test_numeric_with_decimal_support() {
            assert_eq!(kind_of("price", "NUMERIC").unwrap(), PgKind::Numeric);
        }

        #[cfg(not(feature = "decimal-support"))]
        #[test]
        fn test_numeric_needs_decimal_support() {
            assert!(kind_of("price", "NUMERIC")
                .unwrap_err()
                .to_string()
                .contains("decimal-support"));
        }

        #[cfg(feature = "uuid-support")]
        #[test]
        fn test_uuid_with_uuid_support() {
            assert_eq!(kind_of("token", "UUID").unwrap(), PgKind::Uuid);
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory pool recording every call, for tests.

    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub struct MockPool {
        pub log: Arc<Mutex<Vec<String>>>,
        pub rows: RowSet,
        pub fail_execute: bool,
        pub fail_rollback: bool,
        pub fail_acquire: bool,
    }

    impl MockPool {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_rows(rows: RowSet) -> Self {
            Self {
                rows,
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.log.lock().map(|log| log.clone()).unwrap_or_default()
        }

        fn push(&self, call: String) {
            if let Ok(mut log) = self.log.lock() {
                log.push(call);
            }
        }
    }

    pub struct MockConnection {
        pool: MockPool,
    }

    impl ConnectionPool for MockPool {
        type Connection = MockConnection;

        async fn acquire(&self) -> Result<Self::Connection> {
            if self.fail_acquire {
                return Err(Error::connection("Mock connection failure"));
            }
            self.push("acquire".to_string());
            Ok(MockConnection { pool: self.clone() })
        }

        async fn release(&self, _connection: Self::Connection) {
            self.push("release".to_string());
        }
    }

    impl Connection for MockConnection {
        async fn execute(&mut self, sql: &str) -> Result<u64> {
            self.pool.push(format!("execute: {sql}"));
            if self.pool.fail_execute {
                return Err(Error::connection("Mock execute failure"));
            }
            Ok(sql.split("; ").count() as u64)
        }

        async fn fetch_all(&mut self, sql: &str) -> Result<RowSet> {
            self.pool.push(format!("fetch: {sql}"));
            Ok(self.pool.rows.clone())
        }

        async fn commit(&mut self) -> Result<()> {
            self.pool.push("commit".to_string());
            Ok(())
        }

        async fn rollback(&mut self) -> Result<()> {
            self.pool.push("rollback".to_string());
            if self.pool.fail_rollback {
                return Err(Error::connection("Mock rollback failure"));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockPool;
    use super::*;

    #[tokio::test]
    async fn test_perform_commits_and_releases() {
        let pool = MockPool::new();
        let affected = perform(&pool, "DELETE FROM \"t\" WHERE \"id\" = 1").await.unwrap();
        assert_eq!(affected, 1);
        assert_eq!(
            pool.calls(),
            vec![
                "acquire",
                "execute: DELETE FROM \"t\" WHERE \"id\" = 1",
                "commit",
                "release"
            ]
        );
    }

    #[tokio::test]
    async fn test_perform_rolls_back_on_error() {
        let pool = MockPool {
            fail_execute: true,
            ..MockPool::new()
        };
        let err = perform(&pool, "UPDATE x").await.unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));
        assert_eq!(
            pool.calls(),
            vec!["acquire", "execute: UPDATE x", "rollback", "release"]
        );
    }

    #[tokio::test]
    async fn test_failed_rollback_keeps_original_error() {
        let pool = MockPool {
            fail_execute: true,
            fail_rollback: true,
            ..MockPool::new()
        };
        let err = perform(&pool, "UPDATE x").await.unwrap_err();
        assert!(err.to_string().contains("Mock execute failure"));
        assert_eq!(pool.calls().last().map(String::as_str), Some("release"));
    }

    #[tokio::test]
    async fn test_acquire_failure() {
        let pool = MockPool {
            fail_acquire: true,
            ..MockPool::new()
        };
        assert!(fetch(&pool, "SELECT 1").await.is_err());
        assert!(pool.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_returns_rows() {
        let rows = RowSet::new(["id"], vec![vec![Value::I32(1)], vec![Value::I32(2)]]);
        let pool = MockPool::with_rows(rows.clone());
        assert_eq!(fetch(&pool, "SELECT \"id\" FROM \"t\"").await.unwrap(), rows);
        assert_eq!(
            pool.calls(),
            vec!["acquire", "fetch: SELECT \"id\" FROM \"t\"", "release"]
        );
    }

    #[test]
    fn test_blocking_helpers() {
        let pool = MockPool::new();
        assert_eq!(perform_blocking(&pool, "A; B").unwrap(), 2);
        assert!(fetch_blocking(&pool, "SELECT 1").unwrap().is_empty());
    }

    #[test]
    fn test_perform_drives_on_any_executor() {
        let pool = MockPool::new();
        let affected = tokio_test::block_on(perform(&pool, "A; B; C")).unwrap();
        assert_eq!(affected, 3);
        assert_eq!(pool.calls().len(), 4);
    }

    #[test]
    fn test_row_set_lookup() {
        let rows = RowSet::new(["id", "name"], Vec::new());
        assert_eq!(rows.column_index("name"), Some(1));
        assert_eq!(rows.column_index("age"), None);
    }
}
