//! Quarry Core - SQL text generation from plain data
//!
//! Statements are declared as ordered lists of clauses and rendered from
//! per-clause arguments. Values are escaped and identifiers quoted through a
//! replaceable [`Dialect`], so the output is complete SQL text.
//!
//! ```
//! use quarry_core::{insert, select, update, Value};
//!
//! assert_eq!(
//!     select("person", [("name", Value::Null)]).unwrap(),
//!     r#"SELECT * FROM "person" WHERE "name" IS NULL"#
//! );
//! assert_eq!(
//!     insert("person", [("person_id", "dave"), ("name", "Dave")]).unwrap(),
//!     r#"INSERT INTO "person" ("person_id", "name") VALUES ('dave', 'Dave')"#
//! );
//! assert_eq!(
//!     update("person", [("person_id", "dave")], [("age", 42)]).unwrap(),
//!     r#"UPDATE "person" SET "age" = 42 WHERE "person_id" = 'dave'"#
//! );
//! ```

pub mod builder;
pub mod condition;
pub mod dialect;
pub mod error;
pub mod format;
pub mod operator;
pub mod value;

// Re-export main types
pub use builder::{
    delete, from, insert, into, join, join_using, order_term, select, update, Arg, Args, Clause,
    IntoColumns, Query, QueryBuilder, SortDirection, Statement,
};
pub use condition::{Condition, Predicate, Where};
pub use dialect::{Dialect, DialectGuard};
pub use error::{Error, Result};
pub use format::{escape, quote_identifier, render_value};
pub use operator::{op, IntoOperator, Operator};
pub use value::{Param, Value};
