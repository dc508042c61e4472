//! SELECT statement

use super::common::{
    condition, flag, order_terms, space, values, verbatim, Arg, Args, Clause, Query, Statement,
};
use crate::{Condition, Result};
use std::sync::LazyLock;

pub static SELECT: LazyLock<Statement> = LazyLock::new(|| {
    Statement::new(
        "SELECT",
        vec![
            Clause::new("select", "SELECT").alias("columns").default("*"),
            Clause::new("from", "FROM").alias("table"),
            Clause::new("joins", "")
                .hidden()
                .qualify_with(verbatim)
                .join_with(space),
            Clause::new("where", "WHERE").qualify_with(condition),
            Clause::new("group_by", "GROUP BY"),
            Clause::new("having", "HAVING").qualify_with(condition),
            Clause::new("order_by", "ORDER BY").qualify_with(order_terms),
            Clause::new("limit", "LIMIT").qualify_with(values),
            Clause::new("offset", "OFFSET").qualify_with(values),
            Clause::new("for_update", "FOR UPDATE").qualify_with(flag),
            Clause::new("for_share", "FOR SHARE").qualify_with(flag),
        ],
    )
});

impl Query {
    pub fn select() -> Query {
        Query::new(&SELECT)
    }
}

/// Create a SELECT query for the given table
pub fn from(table: &str) -> Query {
    Query::select().table(table)
}

/// `SELECT * FROM table WHERE ..` with the current dialect
///
/// ```
/// use quarry_core::select;
///
/// let sql = select("person", [("person_id", vec!["andy", "bob"])]).unwrap();
/// assert_eq!(sql, r#"SELECT * FROM "person" WHERE "person_id" IN ('andy', 'bob')"#);
/// ```
pub fn select(table: &str, where_: impl Into<Condition>) -> Result<String> {
    SELECT.render(
        Args::new()
            .with("table", table)
            .with("where", Arg::Condition(where_.into())),
    )
}
