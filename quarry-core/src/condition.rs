//! WHERE/HAVING/ON condition building.
//!
//! A [`Where`] is an ordered list of predicates joined with `AND`. Each
//! predicate pairs a key with a value; the key is a column name, optionally
//! followed by a space and an operator (`"age >="`, `"name not like"`). Without
//! an explicit operator one is inferred from the value: `IN` for arrays, `IS`
//! for null, `=` otherwise.
//!
//! ```
//! use quarry_core::{Value, Where};
//!
//! let cond = Where::new()
//!     .and("person_id", vec!["andy", "bob"])
//!     .and("age >=", 18)
//!     .and("email", Value::Null);
//! assert_eq!(
//!     cond.render().unwrap(),
//!     r#""person_id" IN ('andy', 'bob') AND "age" >= 18 AND "email" IS NULL"#
//! );
//! ```

use crate::format::{quote_identifier_with, render_value_with, render_values_with};
use crate::{Dialect, Operator, Result, Value};
use indexmap::IndexMap;

/// One predicate of a [`Where`]
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `"column"` or `"column operator"` compared against a value
    Pair { key: String, value: Value },
    /// A typed comparison with an operator from the allow-list
    Compare {
        column: String,
        operator: Operator,
        value: Value,
    },
    /// Key emitted verbatim (no split, no quoting); operator inferred from the value
    RawKey { key: String, value: Value },
    /// Trusted SQL emitted verbatim as the whole predicate
    Raw(String),
}

/// Predicates joined with `AND`, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Where {
    predicates: Vec<Predicate>,
}

impl Where {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `column` / `"column operator"` predicate.
    pub fn and(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Pair {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Add a predicate with an explicit operator.
    ///
    /// # Examples
    /// ```
    /// use quarry_core::{op, Where};
    ///
    /// let cond = Where::new().and_op("age", op::GT, 18);
    /// assert_eq!(cond.render().unwrap(), r#""age" > 18"#);
    /// ```
    pub fn and_op(mut self, column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Compare {
            column: column.into(),
            operator,
            value: value.into(),
        });
        self
    }

    /// Add a predicate whose left-hand side is trusted SQL, such as a function call.
    pub fn and_raw_key(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::RawKey {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Add trusted SQL as a predicate. It is not escaped.
    pub fn and_raw(mut self, sql: impl Into<String>) -> Self {
        self.predicates.push(Predicate::Raw(sql.into()));
        self
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Render predicates joined with `AND`.
    pub fn render_with(&self, dialect: &Dialect) -> Result<String> {
        let parts = self
            .predicates
            .iter()
            .map(|p| render_predicate(dialect, p))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(" AND "))
    }

    pub fn render(&self) -> Result<String> {
        self.render_with(&Dialect::current())
    }
}

fn render_predicate(dialect: &Dialect, predicate: &Predicate) -> Result<String> {
    match predicate {
        Predicate::Raw(sql) => Ok(sql.clone()),
        Predicate::RawKey { key, value } => {
            render_comparison(dialect, key, infer_operator(value), value)
        }
        Predicate::Compare {
            column,
            operator,
            value,
        } => render_comparison(dialect, &quote_identifier_with(dialect, column), *operator, value),
        Predicate::Pair { key, value } => {
            let key = key.trim();
            let (column, operator) = match key.split_once(' ') {
                Some((column, operator)) => (column, Operator::parse(operator)?),
                None => (key, infer_operator(value)),
            };
            render_comparison(dialect, &quote_identifier_with(dialect, column), operator, value)
        }
    }
}

fn infer_operator(value: &Value) -> Operator {
    match value {
        Value::Array(_) => Operator::IN,
        Value::Null => Operator::IS,
        _ => Operator::EQ,
    }
}

fn render_comparison(dialect: &Dialect, lhs: &str, operator: Operator, value: &Value) -> Result<String> {
    if operator.is_membership() {
        let rhs = match value {
            // `x IN ()` is not valid SQL; an empty list can never match.
            Value::Array(items) if items.is_empty() => {
                return Ok((dialect.boolean)(operator == Operator::NOT_IN).to_string());
            }
            Value::Array(items) => format!("({})", render_values_with(dialect, items)?),
            Value::Raw(sql) => sql.clone(),
            other => format!("({})", render_value_with(dialect, other)?),
        };
        return Ok(format!("{lhs} {operator} {rhs}"));
    }
    Ok(format!("{lhs} {operator} {}", render_value_with(dialect, value)?))
}

impl<K, V, const N: usize> From<[(K, V); N]> for Where
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().fold(Where::new(), |w, (k, v)| w.and(k, v))
    }
}

impl<K, V> From<Vec<(K, V)>> for Where
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().fold(Where::new(), |w, (k, v)| w.and(k, v))
    }
}

impl From<IndexMap<String, Value>> for Where {
    fn from(map: IndexMap<String, Value>) -> Self {
        map.into_iter().fold(Where::new(), |w, (k, v)| w.and(k, v))
    }
}

impl From<Predicate> for Where {
    fn from(predicate: Predicate) -> Self {
        Where {
            predicates: vec![predicate],
        }
    }
}

/// A condition tree: a [`Where`] leaf, or groups combined with `OR` / `AND`.
///
/// Each group is parenthesized before joining, so operator precedence inside a
/// group never leaks out.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Where(Where),
    Any(Vec<Condition>),
    All(Vec<Condition>),
}

impl Condition {
    /// Groups joined with `OR`
    ///
    /// # Examples
    /// ```
    /// use quarry_core::{Condition, Where};
    ///
    /// let cond = Condition::any([
    ///     Where::from([("name", "Dave")]).and("age >", 30),
    ///     Where::from([("name", "Andy")]),
    /// ]);
    /// assert_eq!(
    ///     cond.render().unwrap(),
    ///     r#"("name" = 'Dave' AND "age" > 30) OR ("name" = 'Andy')"#
    /// );
    /// ```
    pub fn any<I, C>(groups: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        Condition::Any(groups.into_iter().map(Into::into).collect())
    }

    /// Groups joined with `AND`
    pub fn all<I, C>(groups: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        Condition::All(groups.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Condition::Where(w) => w.is_empty(),
            Condition::Any(groups) | Condition::All(groups) => groups.iter().all(Condition::is_empty),
        }
    }

    pub fn render_with(&self, dialect: &Dialect) -> Result<String> {
        let (groups, joiner) = match self {
            Condition::Where(w) => return w.render_with(dialect),
            Condition::Any(groups) => (groups, " OR "),
            Condition::All(groups) => (groups, " AND "),
        };
        let parts = groups
            .iter()
            .filter(|g| !g.is_empty())
            .map(|g| -> Result<String> { Ok(format!("({})", g.render_with(dialect)?)) })
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(joiner))
    }

    pub fn render(&self) -> Result<String> {
        self.render_with(&Dialect::current())
    }
}

impl Default for Condition {
    fn default() -> Self {
        Condition::Where(Where::new())
    }
}

impl From<Where> for Condition {
    fn from(w: Where) -> Self {
        Condition::Where(w)
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Condition
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        Condition::Where(pairs.into())
    }
}

impl<K, V> From<Vec<(K, V)>> for Condition
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        Condition::Where(pairs.into())
    }
}

impl From<IndexMap<String, Value>> for Condition {
    fn from(map: IndexMap<String, Value>) -> Self {
        Condition::Where(map.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{op, Error};

    fn render(w: Where) -> String {
        w.render_with(&Dialect::standard()).unwrap()
    }

    #[test]
    fn test_inferred_operators() {
        assert_eq!(render(Where::from([("name", "Dave")])), r#""name" = 'Dave'"#);
        assert_eq!(render(Where::from([("name", Value::Null)])), r#""name" IS NULL"#);
        assert_eq!(
            render(Where::from([("person_id", vec!["andy", "bob"])])),
            r#""person_id" IN ('andy', 'bob')"#
        );
    }

    #[test]
    fn test_explicit_operator_in_key() {
        assert_eq!(render(Where::new().and("age >=", 18)), r#""age" >= 18"#);
        assert_eq!(
            render(Where::new().and("name not like", "D%")),
            r#""name" NOT LIKE 'D%'"#
        );
        assert_eq!(
            render(Where::new().and("deleted_at is not", Value::Null)),
            r#""deleted_at" IS NOT NULL"#
        );
    }

    #[test]
    fn test_rejected_operator_names_it() {
        let err = Where::new()
            .and("name = 'x' OR 1", 1)
            .render_with(&Dialect::standard())
            .unwrap_err();
        match err {
            Error::Operator { operator } => assert_eq!(operator, "= 'x' OR 1"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_in_is_false() {
        let empty: Vec<&str> = Vec::new();
        assert_eq!(render(Where::from([("id", empty.clone())])), "FALSE");
        assert_eq!(render(Where::new().and("id not in", empty.clone())), "TRUE");
        assert_eq!(
            Where::from([("id", empty)])
                .render_with(&Dialect::sqlite())
                .unwrap(),
            "0"
        );
    }

    #[test]
    fn test_in_with_raw_subquery_and_scalar() {
        assert_eq!(
            render(Where::new().and("id in", Value::raw("(SELECT id FROM t)"))),
            r#""id" IN (SELECT id FROM t)"#
        );
        assert_eq!(render(Where::new().and("id in", 3)), r#""id" IN (3)"#);
    }

    #[test]
    fn test_raw_predicates_bypass_parsing() {
        assert_eq!(
            render(Where::new().and_raw("age > 3 OR 1 = 1")),
            "age > 3 OR 1 = 1"
        );
        assert_eq!(
            render(Where::new().and_raw_key("lower(name)", "dave")),
            "lower(name) = 'dave'"
        );
    }

    #[test]
    fn test_typed_operator() {
        assert_eq!(
            render(Where::new().and_op("person.age", op::LTE, 40)),
            r#""person"."age" <= 40"#
        );
    }

    #[test]
    fn test_params_in_conditions() {
        assert_eq!(
            render(Where::new().and("id", Value::named_param("id"))),
            r#""id" = %(id)s"#
        );
    }

    #[test]
    fn test_predicates_keep_order() {
        assert_eq!(
            render(Where::new().and("b", 2).and("a", 1)),
            r#""b" = 2 AND "a" = 1"#
        );
    }

    #[test]
    fn test_all_and_nested_groups() {
        let cond = Condition::all([
            Condition::from([("a", 1)]),
            Condition::any([Where::from([("b", 2)]), Where::from([("c", 3)])]),
        ]);
        assert_eq!(
            cond.render_with(&Dialect::standard()).unwrap(),
            r#"("a" = 1) AND (("b" = 2) OR ("c" = 3))"#
        );
    }

    #[test]
    fn test_empty_groups_are_skipped() {
        let cond = Condition::any([Where::new(), Where::from([("a", 1)])]);
        assert_eq!(cond.render_with(&Dialect::standard()).unwrap(), r#"("a" = 1)"#);
        assert!(Condition::any(Vec::<Where>::new()).is_empty());
    }
}
