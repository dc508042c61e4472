//! SQL operator types and conversions

use crate::{Error, Result};
use std::fmt::{self, Display};

/// A comparison operator from the allow-list.
///
/// Operators are written into SQL without escaping, so the only way to get
/// one is through a constant or [`Operator::parse`], which rejects anything
/// not listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operator(&'static str);

impl Operator {
    pub const EQ: Self = Operator("=");
    pub const NEQ: Self = Operator("<>");
    pub const LT: Self = Operator("<");
    pub const GT: Self = Operator(">");
    pub const LTE: Self = Operator("<=");
    pub const GTE: Self = Operator(">=");
    pub const IS: Self = Operator("IS");
    pub const IS_NOT: Self = Operator("IS NOT");
    pub const IN: Self = Operator("IN");
    pub const NOT_IN: Self = Operator("NOT IN");
    pub const LIKE: Self = Operator("LIKE");
    pub const NOT_LIKE: Self = Operator("NOT LIKE");
    pub const ILIKE: Self = Operator("ILIKE");
    pub const NOT_ILIKE: Self = Operator("NOT ILIKE");
    pub const SIMILAR_TO: Self = Operator("SIMILAR TO");
    pub const NOT_SIMILAR_TO: Self = Operator("NOT SIMILAR TO");
    pub const REGEXP: Self = Operator("REGEXP");
    pub const NOT_REGEXP: Self = Operator("NOT REGEXP");
    pub const MATCH: Self = Operator("~");
    pub const MATCH_CI: Self = Operator("~*");
    pub const NOT_MATCH: Self = Operator("!~");
    pub const NOT_MATCH_CI: Self = Operator("!~*");
    pub const TEXT_SEARCH: Self = Operator("@@");

    const ALLOWED: &'static [Operator] = &[
        Self::EQ,
        Self::NEQ,
        Self::LT,
        Self::GT,
        Self::LTE,
        Self::GTE,
        Self::IS,
        Self::IS_NOT,
        Self::IN,
        Self::NOT_IN,
        Self::LIKE,
        Self::NOT_LIKE,
        Self::ILIKE,
        Self::NOT_ILIKE,
        Self::SIMILAR_TO,
        Self::NOT_SIMILAR_TO,
        Self::REGEXP,
        Self::NOT_REGEXP,
        Self::MATCH,
        Self::MATCH_CI,
        Self::NOT_MATCH,
        Self::NOT_MATCH_CI,
        Self::TEXT_SEARCH,
    ];

    /// Normalize (case, inner whitespace) and validate an operator.
    ///
    /// `!=` is accepted as a spelling of `<>`.
    ///
    /// # Examples
    /// ```
    /// use quarry_core::Operator;
    ///
    /// assert_eq!(Operator::parse("not  like").unwrap(), Operator::NOT_LIKE);
    /// assert!(Operator::parse("= 1; DROP TABLE person; --").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        if normalized == "!=" {
            return Ok(Self::NEQ);
        }
        Self::ALLOWED
            .iter()
            .copied()
            .find(|op| op.0 == normalized)
            .ok_or_else(|| Error::operator(raw))
    }

    /// Get the string representation of the operator
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Whether the operator takes a parenthesized list
    pub fn is_membership(&self) -> bool {
        *self == Self::IN || *self == Self::NOT_IN
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait for types that can be converted to SQL operators
pub trait IntoOperator {
    fn into_operator(self) -> Result<Operator>;
}

impl IntoOperator for Operator {
    fn into_operator(self) -> Result<Operator> {
        Ok(self)
    }
}

impl IntoOperator for &str {
    fn into_operator(self) -> Result<Operator> {
        Operator::parse(self)
    }
}

/// Convenience module for operator constants
pub mod op {
    use super::Operator;

    pub const EQ: Operator = Operator::EQ;
    pub const NEQ: Operator = Operator::NEQ;
    pub const LT: Operator = Operator::LT;
    pub const GT: Operator = Operator::GT;
    pub const LTE: Operator = Operator::LTE;
    pub const GTE: Operator = Operator::GTE;
    pub const IS: Operator = Operator::IS;
    pub const IS_NOT: Operator = Operator::IS_NOT;
    pub const IN: Operator = Operator::IN;
    pub const NOT_IN: Operator = Operator::NOT_IN;
    pub const LIKE: Operator = Operator::LIKE;
    pub const NOT_LIKE: Operator = Operator::NOT_LIKE;
    pub const ILIKE: Operator = Operator::ILIKE;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_constants() {
        assert_eq!(Operator::GT.as_str(), ">");
        assert_eq!(Operator::NEQ.as_str(), "<>");
        assert_eq!(Operator::NOT_IN.as_str(), "NOT IN");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Operator::GT), ">");
        assert_eq!(format!("{}", Operator::IS_NOT), "IS NOT");
    }

    #[test]
    fn test_string_conversion() {
        assert_eq!(">".into_operator().unwrap(), Operator::GT);
        assert_eq!("like".into_operator().unwrap(), Operator::LIKE);
        assert_eq!("is not".into_operator().unwrap(), Operator::IS_NOT);
        assert_eq!("!=".into_operator().unwrap(), Operator::NEQ);
        assert_eq!("~*".into_operator().unwrap(), Operator::MATCH_CI);
    }

    #[test]
    fn test_unknown_operator_is_error() {
        for raw in ["INVALID", "==", "= 1 OR 1", ";", "IS NULL"] {
            match Operator::parse(raw) {
                Err(Error::Operator { operator }) => assert_eq!(operator, raw),
                other => panic!("expected operator error for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_membership() {
        assert!(Operator::IN.is_membership());
        assert!(Operator::NOT_IN.is_membership());
        assert!(!Operator::EQ.is_membership());
    }
}
