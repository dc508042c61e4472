//! Clause, Statement and Query: the declarative grammar every builder is made of.
//!
//! A [`Clause`] renders one keyword-prefixed fragment from one argument. A
//! [`Statement`] is an ordered list of clauses; clause order alone fixes the
//! keyword order of the output. A [`Query`] is a statement with baseline
//! arguments bound by [`Query::breed`].

use crate::condition::{Condition, Where};
use crate::format::{quote_identifier_with, render_value_with, render_values_with};
use crate::{Dialect, Error, Result, Value};
use indexmap::IndexMap;
use std::fmt;

/// Core trait for all query builders
pub trait QueryBuilder {
    /// Generate the SQL query string
    fn to_sql(&self) -> Result<String>;
}

/// An argument handed to a clause
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// One identifier (table, column)
    Ident(String),
    /// A list of identifiers
    Idents(Vec<String>),
    /// One value (LIMIT, OFFSET)
    Value(Value),
    /// One row of values
    Row(Vec<Value>),
    /// Several rows of values
    Rows(Vec<Vec<Value>>),
    /// Ordered column/value assignments
    Set(IndexMap<String, Value>),
    /// A condition tree
    Condition(Condition),
    /// Identifier pairs compared for equality (JOIN ON)
    Pairs(Vec<(String, String)>),
    /// Trusted SQL emitted verbatim
    Raw(String),
    /// Several trusted fragments
    Raws(Vec<String>),
    /// A keyword switch (FOR UPDATE)
    Flag(bool),
}

impl Arg {
    /// Trusted SQL emitted verbatim. Not escaped.
    pub fn raw(sql: impl Into<String>) -> Self {
        Arg::Raw(sql.into())
    }

    pub fn columns(columns: impl IntoColumns) -> Self {
        Arg::Idents(columns.into_columns())
    }

    /// Ordered assignments from `(column, value)` pairs.
    pub fn set<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Arg::Set(collect_set(pairs))
    }

    /// Identifier pairs for `JOIN .. ON`.
    pub fn pairs<I, L, R>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, R)>,
        L: Into<String>,
        R: Into<String>,
    {
        Arg::Pairs(pairs.into_iter().map(|(l, r)| (l.into(), r.into())).collect())
    }

    /// Empty collections, null, blank SQL and a cleared flag
    pub fn is_empty(&self) -> bool {
        match self {
            Arg::Ident(s) | Arg::Raw(s) => s.is_empty(),
            Arg::Idents(v) | Arg::Raws(v) => v.is_empty(),
            Arg::Value(v) => v.is_null(),
            Arg::Row(v) => v.is_empty(),
            Arg::Rows(v) => v.iter().all(Vec::is_empty),
            Arg::Set(set) => set.is_empty(),
            Arg::Condition(c) => c.is_empty(),
            Arg::Pairs(v) => v.is_empty(),
            Arg::Flag(f) => !f,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Arg::Ident(_) => "identifier",
            Arg::Idents(_) => "identifier list",
            Arg::Value(_) => "value",
            Arg::Row(_) => "row",
            Arg::Rows(_) => "rows",
            Arg::Set(_) => "assignments",
            Arg::Condition(_) => "condition",
            Arg::Pairs(_) => "identifier pairs",
            Arg::Raw(_) => "raw SQL",
            Arg::Raws(_) => "raw SQL list",
            Arg::Flag(_) => "flag",
        }
    }
}

pub(crate) fn collect_set<I, K, V>(pairs: I) -> IndexMap<String, Value>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

impl From<&str> for Arg {
    fn from(name: &str) -> Self {
        Arg::Ident(name.to_string())
    }
}

impl From<String> for Arg {
    fn from(name: String) -> Self {
        Arg::Ident(name)
    }
}

impl From<Vec<&str>> for Arg {
    fn from(names: Vec<&str>) -> Self {
        Arg::Idents(names.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Arg {
    fn from(names: Vec<String>) -> Self {
        Arg::Idents(names)
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

impl From<i32> for Arg {
    fn from(n: i32) -> Self {
        Arg::Value(Value::I32(n))
    }
}

impl From<i64> for Arg {
    fn from(n: i64) -> Self {
        Arg::Value(Value::I64(n))
    }
}

impl From<u64> for Arg {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => Arg::Value(Value::I64(n)),
            // digits only, so verbatim output is safe
            Err(_) => Arg::Value(Value::Raw(n.to_string())),
        }
    }
}

impl From<bool> for Arg {
    fn from(flag: bool) -> Self {
        Arg::Flag(flag)
    }
}

impl From<Vec<Value>> for Arg {
    fn from(row: Vec<Value>) -> Self {
        Arg::Row(row)
    }
}

impl From<Vec<Vec<Value>>> for Arg {
    fn from(rows: Vec<Vec<Value>>) -> Self {
        Arg::Rows(rows)
    }
}

impl From<IndexMap<String, Value>> for Arg {
    fn from(set: IndexMap<String, Value>) -> Self {
        Arg::Set(set)
    }
}

impl From<Condition> for Arg {
    fn from(condition: Condition) -> Self {
        Arg::Condition(condition)
    }
}

impl From<Where> for Arg {
    fn from(w: Where) -> Self {
        Arg::Condition(Condition::Where(w))
    }
}

/// Clause arguments keyed by clause name (or alias)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(IndexMap<String, Arg>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, arg: impl Into<Arg>) -> Self {
        self.insert(key, arg);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, arg: impl Into<Arg>) {
        self.0.insert(key.into(), arg.into());
    }

    pub fn get(&self, key: &str) -> Option<&Arg> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Arg> {
        self.0.shift_remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A copy of `self` overlaid with `other`; `other` wins on key collisions.
    pub fn merge(&self, other: &Args) -> Args {
        let mut merged = self.clone();
        for (key, arg) in &other.0 {
            merged.0.insert(key.clone(), arg.clone());
        }
        merged
    }
}

impl<K, A, const N: usize> From<[(K, A); N]> for Args
where
    K: Into<String>,
    A: Into<Arg>,
{
    fn from(pairs: [(K, A); N]) -> Self {
        pairs.into_iter().fold(Args::new(), |args, (k, a)| args.with(k, a))
    }
}

impl From<()> for Args {
    fn from(_: ()) -> Self {
        Args::new()
    }
}

/// Turns an argument into rendered parts; no parts means "omit the clause".
pub type Qualifier = fn(&Dialect, &Arg) -> Result<Vec<String>>;
/// Joins rendered parts into the clause body.
pub type Joiner = fn(Vec<String>) -> String;

/// One named, keyword-prefixed fragment of a statement
#[derive(Clone)]
pub struct Clause {
    pub name: &'static str,
    pub prefix: &'static str,
    pub qualifier: Qualifier,
    pub joiner: Joiner,
    /// Render only the body, without the prefix
    pub hidden: bool,
    pub alias: Option<&'static str>,
    pub default: Option<Arg>,
}

impl Clause {
    /// A clause rendering an identifier list separated by commas.
    pub fn new(name: &'static str, prefix: &'static str) -> Self {
        Self {
            name,
            prefix,
            qualifier: identifiers,
            joiner: comma,
            hidden: false,
            alias: None,
            default: None,
        }
    }

    pub fn qualify_with(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = qualifier;
        self
    }

    pub fn join_with(mut self, joiner: Joiner) -> Self {
        self.joiner = joiner;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn default(mut self, arg: impl Into<Arg>) -> Self {
        self.default = Some(arg.into());
        self
    }

    /// Whether `key` addresses this clause
    pub fn accepts(&self, key: &str) -> bool {
        self.name == key || self.alias == Some(key)
    }

    /// Render with `arg`, or `None` when the argument is empty.
    pub fn format(&self, dialect: &Dialect, arg: &Arg) -> Result<Option<String>> {
        let parts = (self.qualifier)(dialect, arg)?;
        if parts.is_empty() {
            return Ok(None);
        }
        let body = (self.joiner)(parts);
        let rendered = if self.hidden {
            body
        } else if body.is_empty() {
            self.prefix.to_string()
        } else {
            format!("{} {}", self.prefix, body)
        };
        Ok(Some(rendered))
    }
}

/// Normalizes arguments before clause resolution.
pub type Preprocessor = fn(&mut Args) -> Result<()>;

/// An ordered composition of clauses forming one SQL command template
#[derive(Clone)]
pub struct Statement {
    pub name: &'static str,
    clauses: Vec<Clause>,
    preprocessor: Option<Preprocessor>,
}

impl Statement {
    pub fn new(name: &'static str, clauses: Vec<Clause>) -> Self {
        Self {
            name,
            clauses,
            preprocessor: None,
        }
    }

    pub fn with_preprocessor(mut self, preprocessor: Preprocessor) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Render the statement.
    ///
    /// Each clause takes its argument by name, then alias, then its default;
    /// an empty argument counts as absent. Clauses left without one are
    /// skipped. Fragments are joined with a
    /// single space in clause order.
    pub fn render_with(&self, dialect: &Dialect, mut args: Args) -> Result<String> {
        if let Some(preprocess) = self.preprocessor {
            preprocess(&mut args)?;
        }
        if let Some(unknown) = args.keys().find(|k| !self.clauses.iter().any(|c| c.accepts(k))) {
            return Err(Error::invalid_query(format!(
                "{} has no clause named '{unknown}'",
                self.name
            )));
        }

        let mut fragments = Vec::with_capacity(self.clauses.len());
        for clause in &self.clauses {
            let arg = args
                .get(clause.name)
                .filter(|a| !a.is_empty())
                .or_else(|| clause.alias.and_then(|alias| args.get(alias)))
                .filter(|a| !a.is_empty())
                .or(clause.default.as_ref());
            let Some(arg) = arg else { continue };
            if let Some(fragment) = clause.format(dialect, arg)? {
                fragments.push(fragment);
            }
        }
        Ok(fragments.join(" "))
    }

    pub fn render(&self, args: impl Into<Args>) -> Result<String> {
        self.render_with(&Dialect::current(), args.into())
    }
}

/// A statement with baseline arguments.
///
/// Breeding never mutates: it returns a new query whose baseline is the
/// parent's overlaid with the new arguments. At render time call arguments
/// are overlaid on the baseline the same way.
///
/// ```
/// use quarry_core::{Query, QueryBuilder, Where};
///
/// let people = Query::select().table("person");
/// let daves = people.where_(Where::from([("name", "Dave")]));
///
/// assert_eq!(people.to_sql().unwrap(), r#"SELECT * FROM "person""#);
/// assert_eq!(
///     daves.limit(1).to_sql().unwrap(),
///     r#"SELECT * FROM "person" WHERE "name" = 'Dave' LIMIT 1"#
/// );
/// ```
#[derive(Clone)]
pub struct Query {
    statement: &'static Statement,
    baseline: Args,
}

impl Query {
    pub fn new(statement: &'static Statement) -> Self {
        Self {
            statement,
            baseline: Args::new(),
        }
    }

    pub fn statement(&self) -> &'static Statement {
        self.statement
    }

    pub fn baseline(&self) -> &Args {
        &self.baseline
    }

    /// A child query with `args` merged over this query's baseline.
    pub fn breed(&self, args: impl Into<Args>) -> Query {
        Query {
            statement: self.statement,
            baseline: self.baseline.merge(&args.into()),
        }
    }

    fn breed_one(&self, key: &str, arg: Arg) -> Query {
        self.breed(Args::new().with(key, arg))
    }

    pub fn render_with(&self, dialect: &Dialect, args: impl Into<Args>) -> Result<String> {
        self.statement
            .render_with(dialect, self.baseline.merge(&args.into()))
    }

    pub fn render(&self, args: impl Into<Args>) -> Result<String> {
        self.render_with(&Dialect::current(), args)
    }

    pub fn table(&self, table: &str) -> Query {
        self.breed_one("table", Arg::Ident(table.to_string()))
    }

    pub fn columns(&self, columns: impl IntoColumns) -> Query {
        self.breed_one("columns", Arg::columns(columns))
    }

    pub fn where_(&self, condition: impl Into<Condition>) -> Query {
        self.breed_one("where", Arg::Condition(condition.into()))
    }

    pub fn set<I, K, V>(&self, pairs: I) -> Query
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.breed_one("set", Arg::set(pairs))
    }

    /// ORDER BY terms such as `"name"` or `"created_at DESC"`
    pub fn order_by(&self, terms: impl IntoColumns) -> Query {
        self.breed_one("order_by", Arg::columns(terms))
    }

    pub fn limit(&self, limit: u64) -> Query {
        self.breed_one("limit", Arg::from(limit))
    }

    pub fn offset(&self, offset: u64) -> Query {
        self.breed_one("offset", Arg::from(offset))
    }

    /// Pre-rendered JOIN fragments, see [`crate::join`]
    pub fn joins(&self, joins: Vec<String>) -> Query {
        self.breed_one("joins", Arg::Raws(joins))
    }

    pub fn returning(&self, columns: impl IntoColumns) -> Query {
        self.breed_one("returning", Arg::columns(columns))
    }
}

impl QueryBuilder for Query {
    fn to_sql(&self) -> Result<String> {
        self.render(Args::new())
    }
}

impl fmt::Debug for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clause")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .field("hidden", &self.hidden)
            .field("alias", &self.alias)
            .field("default", &self.default)
            .finish()
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("name", &self.name)
            .field("clauses", &self.clauses)
            .finish()
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("statement", &self.statement.name)
            .field("baseline", &self.baseline)
            .finish()
    }
}

/// Sort direction for ORDER BY clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// An ORDER BY term built from a column and a direction
pub fn order_term(column: &str, direction: SortDirection) -> String {
    format!("{column} {direction}")
}

/// Trait to convert various types into columns
pub trait IntoColumns {
    fn into_columns(self) -> Vec<String>;
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoColumns for Vec<String> {
    fn into_columns(self) -> Vec<String> {
        self
    }
}

impl IntoColumns for Vec<&str> {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(|s| s.to_string()).collect()
    }
}

impl IntoColumns for &[String] {
    fn into_columns(self) -> Vec<String> {
        self.to_vec()
    }
}

// For tuples
impl IntoColumns for (&str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string()]
    }
}

impl IntoColumns for (&str, &str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string(), self.2.to_string()]
    }
}

impl IntoColumns for (&str, &str, &str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![
            self.0.to_string(),
            self.1.to_string(),
            self.2.to_string(),
            self.3.to_string(),
        ]
    }
}

fn unexpected(arg: &Arg, wanted: &str) -> Error {
    Error::invalid_query(format!("expected {wanted}, got {}", arg.kind()))
}

fn raw_parts(sql: &str) -> Vec<String> {
    if sql.is_empty() {
        Vec::new()
    } else {
        vec![sql.to_string()]
    }
}

/// Quoted identifiers
pub fn identifiers(dialect: &Dialect, arg: &Arg) -> Result<Vec<String>> {
    match arg {
        Arg::Ident(name) => Ok(vec![quote_identifier_with(dialect, name)]),
        Arg::Idents(names) => Ok(names
            .iter()
            .map(|n| quote_identifier_with(dialect, n))
            .collect()),
        Arg::Raw(sql) => Ok(raw_parts(sql)),
        Arg::Raws(fragments) => Ok(fragments.clone()),
        other => Err(unexpected(other, "identifiers")),
    }
}

/// Rendered literal values; a null value omits the clause
pub fn values(dialect: &Dialect, arg: &Arg) -> Result<Vec<String>> {
    match arg {
        Arg::Value(Value::Null) => Ok(Vec::new()),
        Arg::Value(value) => Ok(vec![render_value_with(dialect, value)?]),
        Arg::Row(row) => row.iter().map(|v| render_value_with(dialect, v)).collect(),
        Arg::Raw(sql) => Ok(raw_parts(sql)),
        other => Err(unexpected(other, "values")),
    }
}

/// Parenthesized value rows for VALUES
pub fn rows(dialect: &Dialect, arg: &Arg) -> Result<Vec<String>> {
    let render_row = |row: &Vec<Value>| -> Result<String> {
        Ok(format!("({})", render_values_with(dialect, row)?))
    };
    match arg {
        Arg::Row(row) if row.is_empty() => Ok(Vec::new()),
        Arg::Row(row) => Ok(vec![render_row(row)?]),
        Arg::Rows(rows) => rows
            .iter()
            .filter(|row| !row.is_empty())
            .map(render_row)
            .collect(),
        Arg::Raw(sql) => Ok(raw_parts(sql)),
        other => Err(unexpected(other, "rows")),
    }
}

/// `"column" = value` assignments
pub fn assignments(dialect: &Dialect, arg: &Arg) -> Result<Vec<String>> {
    match arg {
        Arg::Set(set) => set
            .iter()
            .map(|(column, value)| {
                Ok(format!(
                    "{} = {}",
                    quote_identifier_with(dialect, column),
                    render_value_with(dialect, value)?
                ))
            })
            .collect(),
        Arg::Raw(sql) => Ok(raw_parts(sql)),
        other => Err(unexpected(other, "assignments")),
    }
}

/// A rendered condition; an empty condition omits the clause
pub fn condition(dialect: &Dialect, arg: &Arg) -> Result<Vec<String>> {
    match arg {
        Arg::Condition(c) if c.is_empty() => Ok(Vec::new()),
        Arg::Condition(c) => Ok(vec![c.render_with(dialect)?]),
        Arg::Set(set) if set.is_empty() => Ok(Vec::new()),
        Arg::Set(set) => Ok(vec![Where::from(set.clone()).render_with(dialect)?]),
        Arg::Raw(sql) => Ok(raw_parts(sql)),
        other => Err(unexpected(other, "a condition")),
    }
}

/// JOIN ON: identifier pairs compared for equality, or a condition
pub fn join_condition(dialect: &Dialect, arg: &Arg) -> Result<Vec<String>> {
    match arg {
        Arg::Pairs(pairs) => Ok(pairs
            .iter()
            .map(|(l, r)| {
                format!(
                    "{} = {}",
                    quote_identifier_with(dialect, l),
                    quote_identifier_with(dialect, r)
                )
            })
            .collect()),
        other => condition(dialect, other),
    }
}

/// ORDER BY terms: `column [ASC|DESC] [NULLS FIRST|LAST]`
pub fn order_terms(dialect: &Dialect, arg: &Arg) -> Result<Vec<String>> {
    let render_term = |term: &String| -> Result<String> {
        let term = term.trim();
        match term.split_once(' ') {
            Some((column, direction)) => Ok(format!(
                "{} {}",
                quote_identifier_with(dialect, column),
                normalize_direction(direction)?
            )),
            None => Ok(quote_identifier_with(dialect, term)),
        }
    };
    match arg {
        Arg::Ident(term) => Ok(vec![render_term(term)?]),
        Arg::Idents(terms) => terms.iter().map(render_term).collect(),
        Arg::Raw(sql) => Ok(raw_parts(sql)),
        other => Err(unexpected(other, "order terms")),
    }
}

fn normalize_direction(raw: &str) -> Result<String> {
    let words: Vec<String> = raw.split_whitespace().map(str::to_uppercase).collect();
    let words: Vec<&str> = words.iter().map(String::as_str).collect();
    match words.as_slice() {
        ["ASC" | "DESC"]
        | ["ASC" | "DESC", "NULLS", "FIRST" | "LAST"]
        | ["NULLS", "FIRST" | "LAST"] => Ok(words.join(" ")),
        _ => Err(Error::direction(raw)),
    }
}

/// Pre-rendered fragments passed through untouched
pub fn verbatim(_dialect: &Dialect, arg: &Arg) -> Result<Vec<String>> {
    match arg {
        Arg::Raw(sql) => Ok(raw_parts(sql)),
        Arg::Raws(fragments) => Ok(fragments.iter().filter(|f| !f.is_empty()).cloned().collect()),
        other => Err(unexpected(other, "raw SQL")),
    }
}

/// A bare keyword, present when the flag is set
pub fn flag(_dialect: &Dialect, arg: &Arg) -> Result<Vec<String>> {
    match arg {
        Arg::Flag(true) => Ok(vec![String::new()]),
        Arg::Flag(false) => Ok(Vec::new()),
        other => Err(unexpected(other, "a flag")),
    }
}

pub fn comma(parts: Vec<String>) -> String {
    parts.join(", ")
}

pub fn paren(parts: Vec<String>) -> String {
    format!("({})", parts.join(", "))
}

pub fn space(parts: Vec<String>) -> String {
    parts.join(" ")
}

pub fn and(parts: Vec<String>) -> String {
    parts.join(" AND ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static PICK: LazyLock<Statement> = LazyLock::new(|| {
        Statement::new(
            "PICK",
            vec![
                Clause::new("pick", "PICK").alias("columns").default("*"),
                Clause::new("from", "FROM").alias("table"),
                Clause::new("fields", "").hidden().join_with(paren),
                Clause::new("where", "WHERE").qualify_with(condition),
                Clause::new("order_by", "ORDER BY").qualify_with(order_terms),
                Clause::new("lock", "FOR UPDATE").qualify_with(flag),
            ],
        )
    });

    fn render(args: Args) -> Result<String> {
        PICK.render_with(&Dialect::standard(), args)
    }

    #[test]
    fn test_default_and_alias_resolution() {
        assert_eq!(
            render(Args::new().with("table", "person")).unwrap(),
            r#"PICK * FROM "person""#
        );
        assert_eq!(
            render(Args::new().with("from", "a").with("columns", vec!["x", "y"])).unwrap(),
            r#"PICK "x", "y" FROM "a""#
        );
    }

    #[test]
    fn test_primary_name_beats_alias() {
        let args = Args::new().with("from", "primary").with("table", "alias");
        assert_eq!(render(args).unwrap(), r#"PICK * FROM "primary""#);
    }

    #[test]
    fn test_clause_order_not_argument_order() {
        let args = Args::new()
            .with("lock", true)
            .with("where", Where::from([("id", 1)]))
            .with("from", "t");
        assert_eq!(
            render(args).unwrap(),
            r#"PICK * FROM "t" WHERE "id" = 1 FOR UPDATE"#
        );
    }

    #[test]
    fn test_empty_arguments_omit_clause() {
        let args = Args::new()
            .with("from", "t")
            .with("where", Where::new())
            .with("lock", false)
            .with("fields", Vec::<String>::new());
        assert_eq!(render(args).unwrap(), r#"PICK * FROM "t""#);
    }

    #[test]
    fn test_empty_argument_falls_back_to_default() {
        let args = Args::new()
            .with("from", "t")
            .with("pick", Vec::<String>::new());
        assert_eq!(render(args).unwrap(), r#"PICK * FROM "t""#);
    }

    #[test]
    fn test_hidden_clause_has_no_prefix() {
        let args = Args::new().with("from", "t").with("fields", vec!["a", "b"]);
        assert_eq!(render(args).unwrap(), r#"PICK * FROM "t" ("a", "b")"#);
    }

    #[test]
    fn test_unknown_clause_is_rejected() {
        let err = render(Args::new().with("wher", Where::new())).unwrap_err();
        assert!(err.to_string().contains("no clause named 'wher'"));
    }

    #[test]
    fn test_order_directions() {
        let args = Args::new()
            .with("from", "t")
            .with("order_by", vec!["a", "b desc", "c asc nulls last"]);
        assert_eq!(
            render(args).unwrap(),
            r#"PICK * FROM "t" ORDER BY "a", "b" DESC, "c" ASC NULLS LAST"#
        );
    }

    #[test]
    fn test_invalid_direction() {
        let args = Args::new().with("order_by", vec!["a; DROP TABLE t"]);
        assert!(matches!(render(args), Err(Error::Direction { .. })));
    }

    #[test]
    fn test_wrong_argument_shape() {
        let args = Args::new().with("where", "not a condition");
        let err = render(args).unwrap_err();
        assert!(err.to_string().contains("expected a condition, got identifier"));
    }

    #[test]
    fn test_args_merge_prefers_other() {
        let base = Args::new().with("a", 1).with("b", 2);
        let merged = base.merge(&Args::new().with("b", 3).with("c", 4));
        assert_eq!(merged.get("b"), Some(&Arg::from(3)));
        assert_eq!(merged.len(), 3);
        assert_eq!(base.get("b"), Some(&Arg::from(2)));
    }

    #[test]
    fn test_breeding_is_pure() {
        let root = Query::new(&PICK);
        let child = root.breed([("table", "person")]);
        let grandchild = child.breed([("columns", "name")]);

        assert!(root.baseline().is_empty());
        assert_eq!(child.baseline().len(), 1);
        assert_eq!(
            grandchild.to_sql().unwrap(),
            root.render(
                Args::new()
                    .with("table", "person")
                    .with("columns", "name")
            )
            .unwrap()
        );
    }

    #[test]
    fn test_call_arguments_override_baseline() {
        let q = Query::new(&PICK).breed([("table", "person")]);
        assert_eq!(
            q.render([("table", "detail")]).unwrap(),
            r#"PICK * FROM "detail""#
        );
        assert_eq!(q.to_sql().unwrap(), r#"PICK * FROM "person""#);
    }

    #[test]
    fn test_into_columns_implementations() {
        assert_eq!("name".into_columns(), vec!["name"]);
        assert_eq!(("name", "age").into_columns(), vec!["name", "age"]);
        assert_eq!(vec!["name", "age"].into_columns(), vec!["name", "age"]);
    }

    #[test]
    fn test_order_term() {
        assert_eq!(order_term("name", SortDirection::Desc), "name DESC");
    }
}
