//! DELETE statement

use super::common::{condition, Arg, Args, Clause, Query, Statement};
use crate::{Condition, Error, Result};
use std::sync::LazyLock;

pub static DELETE: LazyLock<Statement> = LazyLock::new(|| {
    Statement::new(
        "DELETE",
        vec![
            Clause::new("delete_from", "DELETE FROM").alias("table"),
            Clause::new("where", "WHERE").qualify_with(condition),
            Clause::new("returning", "RETURNING"),
        ],
    )
    .with_preprocessor(require_where)
});

/// A DELETE without a condition would empty the table.
fn require_where(args: &mut Args) -> Result<()> {
    if args.get("where").is_none_or(Arg::is_empty) {
        return Err(Error::invalid_query(
            "DELETE requires WHERE condition for safety",
        ));
    }
    Ok(())
}

impl Query {
    pub fn delete() -> Query {
        Query::new(&DELETE)
    }
}

/// `DELETE FROM table WHERE ..` with the current dialect
pub fn delete(table: &str, where_: impl Into<Condition>) -> Result<String> {
    DELETE.render(
        Args::new()
            .with("table", table)
            .with("where", Arg::Condition(where_.into())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::common::QueryBuilder;
    use crate::{Operator, Where};

    #[test]
    fn test_delete_builder() {
        let sql = delete("users", [("id", 1)]).unwrap();
        assert_eq!(sql, r#"DELETE FROM "users" WHERE "id" = 1"#);
    }

    #[test]
    fn test_delete_multiple_conditions() {
        let sql = Query::delete()
            .table("users")
            .where_(
                Where::new()
                    .and("status", "inactive")
                    .and_op("last_login", Operator::LT, "2023-01-01"),
            )
            .returning("id")
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            r#"DELETE FROM "users" WHERE "status" = 'inactive' AND "last_login" < '2023-01-01' RETURNING "id""#
        );
    }

    #[test]
    fn test_delete_without_where_fails() {
        let err = delete("users", Where::new()).unwrap_err();
        assert!(err.to_string().contains("DELETE requires WHERE"));
        assert!(Query::delete().table("users").to_sql().is_err());
    }
}
