//! INSERT statement

use super::common::{assignments, paren, rows, verbatim, Arg, Args, Clause, Query, Statement};
use crate::{Error, Result, Value};
use std::sync::LazyLock;

pub static INSERT: LazyLock<Statement> = LazyLock::new(|| {
    Statement::new(
        "INSERT",
        vec![
            Clause::new("insert_into", "INSERT INTO").alias("table"),
            Clause::new("columns", "").hidden().join_with(paren),
            Clause::new("values", "VALUES").qualify_with(rows),
            Clause::new("select", "").hidden().qualify_with(verbatim),
            Clause::new("on_duplicate_key_update", "ON DUPLICATE KEY UPDATE")
                .qualify_with(assignments),
            Clause::new("returning", "RETURNING"),
        ],
    )
    .with_preprocessor(split_set)
});

/// Turns `set` into `columns` + a single `values` row.
fn split_set(args: &mut Args) -> Result<()> {
    match args.remove("set") {
        Some(Arg::Set(set)) => {
            let (columns, row): (Vec<String>, Vec<Value>) = set.into_iter().unzip();
            args.insert("columns", Arg::Idents(columns));
            args.insert("values", Arg::Row(row));
        }
        Some(other) if other.is_empty() => {}
        Some(other) => {
            return Err(Error::invalid_query(format!(
                "INSERT set expects assignments, got {}",
                other.kind()
            )));
        }
        None => {}
    }

    let has = |key: &str| args.get(key).is_some_and(|arg| !arg.is_empty());
    if !has("values") && !has("select") {
        return Err(Error::invalid_query("INSERT requires values or a SELECT"));
    }
    Ok(())
}

impl Query {
    pub fn insert() -> Query {
        Query::new(&INSERT)
    }
}

/// Create an INSERT query for the given table
pub fn into(table: &str) -> Query {
    Query::insert().table(table)
}

/// `INSERT INTO table (..) VALUES (..)` with the current dialect
///
/// ```
/// use quarry_core::insert;
///
/// let sql = insert("person", [("person_id", "dave"), ("name", "Dave")]).unwrap();
/// assert_eq!(sql, r#"INSERT INTO "person" ("person_id", "name") VALUES ('dave', 'Dave')"#);
/// ```
pub fn insert<I, K, V>(table: &str, set: I) -> Result<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    INSERT.render(Args::new().with("table", table).with("set", Arg::set(set)))
}
