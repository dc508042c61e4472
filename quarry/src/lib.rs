//! Quarry - SQL statements from plain data, and grouped records that write
//! their changes back.
//!
//! The statement builders live in `quarry-core` and are re-exported here.
//! This crate adds [`Record`]: rows of one table grouped into logical
//! entities, edited in place and flushed as one batch through a
//! [`ConnectionPool`].
//!
//! ```
//! use quarry::{group_rows, Dialect, RowSet, Schema};
//!
//! let schema = Schema::new("detail", ("detail_id", "person_id", "val"))
//!     .identify_by("detail_id")
//!     .group_by("person_id");
//! let rows = RowSet::new(
//!     ["detail_id", "person_id", "val"],
//!     vec![
//!         vec![1.into(), "andy".into(), "a@x".into()],
//!         vec![2.into(), "andy".into(), "b@x".into()],
//!     ],
//! );
//!
//! let mut andy = group_rows(schema, rows).unwrap().remove(0);
//! andy.set(-1, "val", "b@y").unwrap();
//! andy.append([("val", "c@x")]).unwrap();
//!
//! assert_eq!(
//!     andy.to_statements(&Dialect::standard()).unwrap(),
//!     vec![
//!         r#"UPDATE "detail" SET "val" = 'b@y' WHERE "detail_id" = 2"#,
//!         r#"INSERT INTO "detail" ("person_id", "val") VALUES ('andy', 'c@x')"#,
//!     ]
//! );
//! ```

pub mod cell;
pub mod change;
pub mod executor;
pub mod finder;
pub mod record;
pub mod schema;
pub mod view;

// Re-export the statement builders
pub use quarry_core::{
    builder, condition, delete, dialect, format, from, insert, into, join, join_using, op,
    order_term, select, update, value, Arg, Args, Clause, Condition, Dialect, DialectGuard, Error,
    IntoColumns, IntoOperator, Operator, Param, Predicate, Query, QueryBuilder, Result,
    SortDirection, Statement, Value, Where,
};

pub use cell::Cell;
pub use change::{Change, ChangeKey, ChangeLog};
pub use executor::{
    fetch, fetch_blocking, perform, perform_blocking, Connection, ConnectionPool, RowSet,
};
pub use record::{group_rows, Record};
pub use schema::Schema;
pub use view::{ColumnView, ColumnViewMut, RowView, RowViewMut};
