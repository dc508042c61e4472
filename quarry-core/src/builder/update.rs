//! UPDATE statement

use super::common::{assignments, condition, Arg, Args, Clause, Query, Statement};
use crate::{Condition, Error, Result, Value};
use std::sync::LazyLock;

pub static UPDATE: LazyLock<Statement> = LazyLock::new(|| {
    Statement::new(
        "UPDATE",
        vec![
            Clause::new("update", "UPDATE").alias("table"),
            Clause::new("set", "SET").qualify_with(assignments),
            Clause::new("where", "WHERE").qualify_with(condition),
            Clause::new("returning", "RETURNING"),
        ],
    )
    .with_preprocessor(require_set)
});

fn require_set(args: &mut Args) -> Result<()> {
    if args.get("set").is_none_or(Arg::is_empty) {
        return Err(Error::invalid_query("UPDATE requires SET clauses"));
    }
    Ok(())
}

impl Query {
    pub fn update() -> Query {
        Query::new(&UPDATE)
    }
}

/// `UPDATE table SET .. WHERE ..` with the current dialect
///
/// ```
/// use quarry_core::update;
///
/// let sql = update("person", [("person_id", "dave")], [("name", "David")]).unwrap();
/// assert_eq!(sql, r#"UPDATE "person" SET "name" = 'David' WHERE "person_id" = 'dave'"#);
/// ```
pub fn update<I, K, V>(table: &str, where_: impl Into<Condition>, set: I) -> Result<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    UPDATE.render(
        Args::new()
            .with("table", table)
            .with("where", Arg::Condition(where_.into()))
            .with("set", Arg::set(set)),
    )
}
