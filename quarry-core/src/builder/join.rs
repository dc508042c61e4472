//! JOIN fragments, rendered on their own and spliced into SELECT via `joins`.

use super::common::{
    and, join_condition, paren, verbatim, Arg, Args, Clause, IntoColumns, Query, Statement,
};
use crate::{Error, Result};
use std::sync::LazyLock;

const JOIN_TYPES: &[&str] = &[
    "INNER",
    "CROSS",
    "LEFT",
    "LEFT OUTER",
    "RIGHT",
    "RIGHT OUTER",
    "FULL",
    "FULL OUTER",
    "NATURAL",
    "NATURAL INNER",
    "NATURAL LEFT",
    "NATURAL LEFT OUTER",
    "NATURAL RIGHT",
    "NATURAL RIGHT OUTER",
    "NATURAL FULL",
    "NATURAL FULL OUTER",
];

pub static JOIN: LazyLock<Statement> = LazyLock::new(|| {
    Statement::new(
        "JOIN",
        vec![
            Clause::new("type", "").hidden().qualify_with(verbatim),
            Clause::new("join", "JOIN").alias("table"),
            Clause::new("on", "ON")
                .qualify_with(join_condition)
                .join_with(and),
            Clause::new("using", "USING").join_with(paren),
        ],
    )
    .with_preprocessor(resolve_type)
});

/// Validates an explicit join type, or infers `INNER` when ON/USING is
/// given and `NATURAL` otherwise.
fn resolve_type(args: &mut Args) -> Result<()> {
    let explicit = match args.remove("type") {
        Some(Arg::Ident(kind) | Arg::Raw(kind)) if !kind.trim().is_empty() => Some(kind),
        Some(other) if other.is_empty() => None,
        Some(other) => return Err(Error::option("JOIN", format!("{other:?}"))),
        None => None,
    };

    let kind = match explicit {
        Some(raw) => {
            let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
            if !JOIN_TYPES.contains(&normalized.as_str()) {
                return Err(Error::option("JOIN", raw));
            }
            normalized
        }
        None => {
            let given = |key: &str| args.get(key).is_some_and(|arg| !arg.is_empty());
            if given("on") || given("using") {
                "INNER".to_string()
            } else {
                "NATURAL".to_string()
            }
        }
    };
    args.insert("type", Arg::Raw(kind));
    Ok(())
}

impl Query {
    pub fn join() -> Query {
        Query::new(&JOIN)
    }
}

/// `[INNER|NATURAL] JOIN table ON l = r AND ..` with the current dialect;
/// no pairs gives a NATURAL join.
///
/// ```
/// use quarry_core::join;
///
/// let sql = join("detail", [("person.person_id", "detail.person_id")]).unwrap();
/// assert_eq!(
///     sql,
///     r#"INNER JOIN "detail" ON "person"."person_id" = "detail"."person_id""#
/// );
/// ```
pub fn join<I, L, R>(table: &str, on: I) -> Result<String>
where
    I: IntoIterator<Item = (L, R)>,
    L: Into<String>,
    R: Into<String>,
{
    JOIN.render(Args::new().with("table", table).with("on", Arg::pairs(on)))
}

/// `INNER JOIN table USING (..)` with the current dialect
pub fn join_using(table: &str, columns: impl IntoColumns) -> Result<String> {
    JOIN.render(
        Args::new()
            .with("table", table)
            .with("using", Arg::columns(columns)),
    )
}
