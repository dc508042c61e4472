//! Value and identifier rendering.
//!
//! Every function here goes through the slots of a [`Dialect`], never a
//! hardcoded policy, so swapping the dialect changes all call sites at once.

use crate::{Dialect, Result, Value};

/// Escape `raw` as the body of a single-quoted literal.
pub fn escape_with(dialect: &Dialect, raw: &str) -> Result<String> {
    (dialect.escape)(raw)
}

/// Escape `raw` with the current dialect.
pub fn escape(raw: &str) -> Result<String> {
    escape_with(&Dialect::current(), raw)
}

/// Quote an identifier.
///
/// A dotted name is split on the first dot and each side is quoted on its
/// own, so `person.name` becomes `"person"."name"`: a dot is always a
/// table/column separator. `*` (alone or after a table) is left bare.
pub fn quote_identifier_with(dialect: &Dialect, name: &str) -> String {
    if name == "*" {
        return name.to_string();
    }
    match name.split_once('.') {
        Some((table, "*")) => format!("{}.*", (dialect.quote_identifier)(table)),
        Some((table, column)) => format!(
            "{}.{}",
            (dialect.quote_identifier)(table),
            (dialect.quote_identifier)(column)
        ),
        None => (dialect.quote_identifier)(name),
    }
}

/// Quote an identifier with the current dialect.
pub fn quote_identifier(name: &str) -> String {
    quote_identifier_with(&Dialect::current(), name)
}

fn quote_literal(dialect: &Dialect, raw: &str) -> Result<String> {
    Ok(format!("'{}'", escape_with(dialect, raw)?))
}

/// Render a value as a SQL literal.
///
/// [`Value::Raw`] is emitted verbatim and is the caller's responsibility:
/// it is the one way to put unescaped text into a statement.
pub fn render_value_with(dialect: &Dialect, value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(b) => Ok((dialect.boolean)(*b).to_string()),
        Value::I32(i) => Ok(i.to_string()),
        Value::I64(i) => Ok(i.to_string()),
        Value::F32(f) if f.is_finite() => Ok(f.to_string()),
        Value::F64(f) if f.is_finite() => Ok(f.to_string()),
        Value::F32(f) => quote_literal(dialect, &non_finite(f64::from(*f))),
        Value::F64(f) => quote_literal(dialect, &non_finite(*f)),
        Value::String(s) => quote_literal(dialect, s),
        Value::Bytes(bytes) => {
            let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
            Ok(format!("X'{hex}'"))
        }
        Value::Json(json) => quote_literal(dialect, &serde_json::to_string(json)?),
        Value::Array(items) => Ok(format!("({})", render_values_with(dialect, items)?)),
        Value::Date(d) => quote_literal(dialect, &d.format("%Y-%m-%d").to_string()),
        Value::Time(t) => quote_literal(dialect, &t.format("%H:%M:%S%.f").to_string()),
        Value::DateTime(dt) => {
            quote_literal(dialect, &dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
        }
        Value::Timestamp(ts) => quote_literal(dialect, &ts.to_rfc3339()),
        #[cfg(feature = "uuid-support")]
        Value::Uuid(u) => quote_literal(dialect, &u.to_string()),
        #[cfg(feature = "decimal-support")]
        Value::Decimal(d) => Ok(d.to_string()),
        Value::Raw(sql) => Ok(sql.clone()),
        Value::Param(param) => Ok((dialect.placeholder)(param)),
        Value::Default => Ok("DEFAULT".to_string()),
    }
}

/// Render a value with the current dialect.
pub fn render_value(value: &Value) -> Result<String> {
    render_value_with(&Dialect::current(), value)
}

/// Render values separated by `", "`.
pub fn render_values_with(dialect: &Dialect, values: &[Value]) -> Result<String> {
    let rendered = values
        .iter()
        .map(|v| render_value_with(dialect, v))
        .collect::<Result<Vec<_>>>()?;
    Ok(rendered.join(", "))
}

fn non_finite(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f > 0.0 {
        "Infinity".to_string()
    } else {
        "-Infinity".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn standard() -> Dialect {
        Dialect::standard()
    }

    #[test]
    fn test_quote_plain_and_dotted() {
        let d = standard();
        assert_eq!(quote_identifier_with(&d, "person"), "\"person\"");
        assert_eq!(quote_identifier_with(&d, "person.name"), "\"person\".\"name\"");
        assert_eq!(quote_identifier_with(&d, "a.b.c"), "\"a\".\"b.c\"");
    }

    #[test]
    fn test_quote_doubles_embedded_delimiter() {
        assert_eq!(
            quote_identifier_with(&standard(), "we\"ird"),
            "\"we\"\"ird\""
        );
    }

    #[test]
    fn test_star_stays_bare() {
        let d = standard();
        assert_eq!(quote_identifier_with(&d, "*"), "*");
        assert_eq!(quote_identifier_with(&d, "person.*"), "\"person\".*");
    }

    #[test]
    fn test_mysql_identifier() {
        assert_eq!(
            quote_identifier_with(&Dialect::mysql(), "person.name"),
            "`person`.`name`"
        );
    }

    #[test]
    fn test_render_scalars() {
        let d = standard();
        assert_eq!(render_value_with(&d, &Value::Null).unwrap(), "NULL");
        assert_eq!(render_value_with(&d, &true.into()).unwrap(), "TRUE");
        assert_eq!(render_value_with(&d, &42i32.into()).unwrap(), "42");
        assert_eq!(render_value_with(&d, &1.5f64.into()).unwrap(), "1.5");
        assert_eq!(render_value_with(&d, &"Dave".into()).unwrap(), "'Dave'");
    }

    #[test]
    fn test_apostrophe_cannot_end_literal() {
        let d = standard();
        let rendered = render_value_with(&d, &"x' OR '1'='1".into()).unwrap();
        assert_eq!(rendered, "'x'' OR ''1''=''1'");

        let rendered = render_value_with(&d, &r"back\'slash".into()).unwrap();
        assert_eq!(rendered, r"'back\''slash'");
    }

    #[test]
    fn test_nul_is_escape_error() {
        let err = render_value_with(&standard(), &"a\0".into()).unwrap_err();
        assert!(matches!(err, Error::Escape { .. }));
    }

    #[test]
    fn test_sqlite_booleans() {
        let d = Dialect::sqlite();
        assert_eq!(render_value_with(&d, &false.into()).unwrap(), "0");
    }

    #[test]
    fn test_dates() {
        let d = standard();
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(render_value_with(&d, &date.into()).unwrap(), "'2024-01-15'");

        let dt = date.and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(
            render_value_with(&d, &dt.into()).unwrap(),
            "'2024-01-15 09:30:00'"
        );

        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        assert_eq!(
            render_value_with(&d, &ts.into()).unwrap(),
            "'2024-01-15T09:30:00+00:00'"
        );
    }

    #[test]
    fn test_markers() {
        let d = standard();
        assert_eq!(render_value_with(&d, &Value::raw("now()")).unwrap(), "now()");
        assert_eq!(render_value_with(&d, &Value::param()).unwrap(), "%s");
        assert_eq!(
            render_value_with(&Dialect::sqlite(), &Value::named_param("id")).unwrap(),
            ":id"
        );
        assert_eq!(render_value_with(&d, &Value::Default).unwrap(), "DEFAULT");
    }

    #[test]
    fn test_arrays_bytes_json() {
        let d = standard();
        assert_eq!(
            render_value_with(&d, &vec!["a", "b"].into()).unwrap(),
            "('a', 'b')"
        );
        assert_eq!(
            render_value_with(&d, &vec![0xdeu8, 0xad].into()).unwrap(),
            "X'dead'"
        );
        assert_eq!(
            render_value_with(&d, &serde_json::json!({"k": "it's"}).into()).unwrap(),
            r#"'{"k":"it''s"}'"#
        );
    }

    #[test]
    fn test_non_finite_floats_are_quoted() {
        let d = standard();
        assert_eq!(render_value_with(&d, &f64::NAN.into()).unwrap(), "'NaN'");
        assert_eq!(
            render_value_with(&d, &f64::NEG_INFINITY.into()).unwrap(),
            "'-Infinity'"
        );
    }

    /// Read a quoted literal back the way a standard SQL lexer does. `None`
    /// when an unpaired quote ends the literal before its last character.
    fn unquote_standard(literal: &str) -> Option<String> {
        let body = literal.strip_prefix('\'')?.strip_suffix('\'')?;
        let mut out = String::new();
        let mut chars = body.chars();
        while let Some(c) = chars.next() {
            if c == '\'' && chars.next() != Some('\'') {
                return None;
            }
            out.push(c);
        }
        Some(out)
    }

    /// Read a quoted literal back the way MySQL does, honoring backslashes.
    fn unquote_mysql(literal: &str) -> Option<String> {
        let body = literal.strip_prefix('\'')?.strip_suffix('\'')?;
        let mut out = String::new();
        let mut chars = body.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => out.push(match chars.next()? {
                    '0' => '\0',
                    'n' => '\n',
                    'r' => '\r',
                    'Z' => '\x1a',
                    other => other,
                }),
                '\'' if chars.next() != Some('\'') => return None,
                c => out.push(c),
            }
        }
        Some(out)
    }

    fn generated_strings(count: usize) -> Vec<String> {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        const TRICKY: &[char] = &['\'', '\\', '"', ';', '-', ' ', '\n', '\r', '\x1a', '%', 'é'];
        let mut rng = StdRng::seed_from_u64(0x5eed);
        (0..count)
            .map(|_| {
                let len = rng.gen_range(0..24);
                (0..len)
                    .map(|_| {
                        if rng.gen_bool(0.6) {
                            TRICKY[rng.gen_range(0..TRICKY.len())]
                        } else {
                            rng.gen::<char>()
                        }
                    })
                    .filter(|&c| c != '\0')
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_generated_strings_read_back_unchanged() {
        let (std_dialect, mysql) = (standard(), Dialect::mysql());
        for raw in generated_strings(2000) {
            let value = Value::from(raw.as_str());
            let literal = render_value_with(&std_dialect, &value).unwrap();
            assert_eq!(unquote_standard(&literal).as_deref(), Some(raw.as_str()), "{literal}");

            let literal = render_value_with(&mysql, &value).unwrap();
            assert_eq!(unquote_mysql(&literal).as_deref(), Some(raw.as_str()), "{literal}");
        }
    }

    #[test]
    fn test_mysql_keeps_nul() {
        let literal = render_value_with(&Dialect::mysql(), &"a\0b".into()).unwrap();
        assert_eq!(unquote_mysql(&literal).as_deref(), Some("a\0b"));
    }

    #[test]
    fn test_current_dialect_is_used() {
        let _guard = Dialect::mysql().activate();
        assert_eq!(quote_identifier("person"), "`person`");
        assert_eq!(render_value(&"it's".into()).unwrap(), r"'it\'s'");
    }
}
