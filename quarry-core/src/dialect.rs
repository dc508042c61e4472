//! SQL dialect support.
//!
//! A [`Dialect`] is a set of four replaceable functions: literal escaping,
//! identifier quoting, placeholder formatting and boolean spelling. Every
//! renderer has a `*_with(&Dialect, ..)` form that takes one explicitly; the
//! plain forms read the current dialect of the calling thread.
//!
//! ```
//! use quarry_core::{select, Dialect};
//!
//! let sql = {
//!     let _guard = Dialect::mysql().activate();
//!     select("person", [("name", "Dave")]).unwrap()
//! };
//! assert_eq!(sql, "SELECT * FROM `person` WHERE `name` = 'Dave'");
//!
//! // The guard restored the standard dialect on drop.
//! assert_eq!(Dialect::current().name, "standard");
//! ```

use crate::{Error, Param, Result};
use std::cell::Cell;
use std::fmt;

/// Turns raw text into the body of a single-quoted literal.
pub type EscapeFn = fn(&str) -> Result<String>;
/// Quotes one identifier part (no dots).
pub type QuoteIdentifierFn = fn(&str) -> String;
/// Renders a bound-parameter placeholder.
pub type PlaceholderFn = fn(&Param) -> String;
/// Spells a boolean literal.
pub type BooleanFn = fn(bool) -> &'static str;

/// The replaceable formatting policy of one SQL dialect.
///
/// Override a single slot with struct-update syntax:
///
/// ```
/// use quarry_core::{Dialect, Param};
///
/// fn numbered(_: &Param) -> String {
///     "$1".to_string()
/// }
///
/// let dialect = Dialect { placeholder: numbered, ..Dialect::standard() };
/// assert_eq!((dialect.placeholder)(&Param::Positional), "$1");
/// ```
#[derive(Clone, Copy)]
pub struct Dialect {
    pub name: &'static str,
    pub escape: EscapeFn,
    pub quote_identifier: QuoteIdentifierFn,
    pub placeholder: PlaceholderFn,
    pub boolean: BooleanFn,
}

thread_local! {
    static CURRENT: Cell<Dialect> = const { Cell::new(Dialect::STANDARD) };
}

impl Dialect {
    const STANDARD: Dialect = Dialect {
        name: "standard",
        escape: escape_standard,
        quote_identifier: quote_double,
        placeholder: placeholder_pyformat,
        boolean: boolean_keyword,
    };

    /// ANSI/PostgreSQL: `"ident"`, `''` doubling, `%s` / `%(name)s`, `TRUE`/`FALSE`
    pub const fn standard() -> Self {
        Self::STANDARD
    }

    /// MySQL: `` `ident` ``, backslash escaping, `%s` / `%(name)s`
    pub const fn mysql() -> Self {
        Dialect {
            name: "mysql",
            escape: escape_mysql,
            quote_identifier: quote_backtick,
            placeholder: placeholder_pyformat,
            boolean: boolean_keyword,
        }
    }

    /// SQLite: `"ident"`, `''` doubling, `?` / `:name`, `1`/`0`
    pub const fn sqlite() -> Self {
        Dialect {
            name: "sqlite",
            escape: escape_standard,
            quote_identifier: quote_double,
            placeholder: placeholder_qmark,
            boolean: boolean_numeric,
        }
    }

    /// The dialect used by the calling thread's plain renderers.
    pub fn current() -> Self {
        CURRENT.with(Cell::get)
    }

    /// Replace the calling thread's dialect, returning the previous one.
    pub fn install(self) -> Dialect {
        CURRENT.with(|current| current.replace(self))
    }

    /// Make this the current dialect until the returned guard is dropped.
    #[must_use = "the previous dialect is restored as soon as the guard is dropped"]
    pub fn activate(self) -> DialectGuard {
        DialectGuard {
            previous: self.install(),
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialect").field("name", &self.name).finish()
    }
}

/// Restores the previously current dialect when dropped.
#[derive(Debug)]
pub struct DialectGuard {
    previous: Dialect,
}

impl Drop for DialectGuard {
    fn drop(&mut self) {
        self.previous.install();
    }
}

/// Doubles single quotes. NUL cannot appear inside a PostgreSQL or SQLite
/// text literal, so it is rejected.
pub fn escape_standard(raw: &str) -> Result<String> {
    if raw.contains('\0') {
        return Err(Error::escape(raw, "string contains a NUL byte"));
    }
    Ok(raw.replace('\'', "''"))
}

/// Backslash-escapes the characters MySQL treats specially inside literals.
pub fn escape_mysql(raw: &str) -> Result<String> {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\0' => escaped.push_str("\\0"),
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\x1a' => escaped.push_str("\\Z"),
            c => escaped.push(c),
        }
    }
    Ok(escaped)
}

pub fn quote_double(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn quote_backtick(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

pub fn placeholder_pyformat(param: &Param) -> String {
    match param {
        Param::Positional => "%s".to_string(),
        Param::Named(name) => format!("%({name})s"),
    }
}

pub fn placeholder_qmark(param: &Param) -> String {
    match param {
        Param::Positional => "?".to_string(),
        Param::Named(name) => format!(":{name}"),
    }
}

pub fn boolean_keyword(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}

pub fn boolean_numeric(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}
