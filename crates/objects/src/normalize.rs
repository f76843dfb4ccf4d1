//! Generic schema interpreter.

use std::collections::HashSet;

use ammonia::Builder;
use once_cell::sync::Lazy;
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::errors::NormalizationError;
use crate::schema::{Kind, Schema};

// Allow-list cleaner, built once. `script` and `style` lose their content too,
// `on*` attributes are never allowed and links keep only http(s) and mailto.
static HTML_CLEANER: Lazy<Builder<'static>> = Lazy::new(|| {
    let mut cleaner = Builder::default();
    cleaner.url_schemes(HashSet::from(["http", "https", "mailto"]));
    cleaner.link_rel(None);
    cleaner
});

/// Validate and normalize `raw` against `schema`.
///
/// Per node: coerce to the schema kind (recursing into lists and dicts), check `choices`,
/// run post-normalizers, then validators, each in declaration order.
pub fn normalize_against_schema(raw: &Value, schema: &Schema) -> Result<Value, NormalizationError> {
    let res = normalize_at(raw, schema, "$");
    if let Err(e) = &res {
        debug!(path = %e.path, reason = %e.reason, "value rejected by schema");
    }
    res
}

fn normalize_at(raw: &Value, schema: &Schema, path: &str) -> Result<Value, NormalizationError> {
    let mut value = coerce(raw, &schema.kind, path)?;

    if let Some(choices) = &schema.choices {
        if !choices.contains(&value) {
            return Err(NormalizationError::new(path, format!("{value} is not one of the allowed choices")));
        }
    }
    for normalizer in &schema.post_normalizers {
        value = normalizer.apply(value).map_err(|reason| NormalizationError::new(path, reason))?;
    }
    for validator in &schema.validators {
        validator.check(&value).map_err(|reason| NormalizationError::new(path, reason))?;
    }
    Ok(value)
}

fn coerce(raw: &Value, kind: &Kind, path: &str) -> Result<Value, NormalizationError> {
    let mismatch = |expected: &str| NormalizationError::new(path, format!("expected {expected}, received {raw}"));

    match kind {
        Kind::Bool => raw.as_bool().map(Value::Bool).ok_or_else(|| mismatch("a boolean")),
        Kind::Int => coerce_int(raw).map(Value::from).ok_or_else(|| mismatch("an integer")),
        Kind::Float => coerce_float(raw)
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| mismatch("a real number")),
        Kind::Unicode => raw.as_str().map(|s| Value::String(s.to_owned())).ok_or_else(|| mismatch("a string")),
        Kind::Html => raw.as_str().map(|s| Value::String(scrub_html(s))).ok_or_else(|| mismatch("an HTML string")),
        Kind::List { items, len } => {
            let list = raw.as_array().ok_or_else(|| mismatch("a list"))?;
            if let Some(n) = len {
                if list.len() != *n {
                    return Err(NormalizationError::new(
                        path,
                        format!("expected a list of length {n}, received length {}", list.len()),
                    ));
                }
            }
            list.iter()
                .enumerate()
                .map(|(i, item)| normalize_at(item, items, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        Kind::Dict { properties } => {
            let obj = raw.as_object().ok_or_else(|| mismatch("a dict"))?;
            if let Some(extra) = obj.keys().find(|k| !properties.iter().any(|p| &p.name == *k)) {
                return Err(NormalizationError::new(path, format!("unexpected key '{extra}'")));
            }
            let mut out = Map::with_capacity(properties.len());
            for prop in properties {
                let child = format!("{path}.{}", prop.name);
                let item = obj
                    .get(&prop.name)
                    .ok_or_else(|| NormalizationError::new(child.as_str(), "missing required field"))?;
                out.insert(prop.name.clone(), normalize_at(item, &prop.schema, &child)?);
            }
            Ok(Value::Object(out))
        }
    }
}

/// Integers, integral floats and numeric strings.
fn coerce_int(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Any finite number or numeric string.
fn coerce_float(raw: &Value) -> Option<f64> {
    let f = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}

/// Sanitize an HTML fragment against the allow-list.
pub fn scrub_html(s: &str) -> String {
    HTML_CLEANER.clean(s).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Property;
    use crate::validators::{PostNormalizer, Validator};
    use serde_json::json;

    #[test]
    fn bool_accepts_only_booleans() {
        assert_eq!(normalize_against_schema(&json!(true), &Schema::bool()), Ok(json!(true)));
        assert!(normalize_against_schema(&json!("notabool"), &Schema::bool()).is_err());
        assert!(normalize_against_schema(&json!(1), &Schema::bool()).is_err());
    }

    #[test]
    fn int_coerces_integral_numbers_and_strings() {
        let s = Schema::int();
        assert_eq!(normalize_against_schema(&json!(3), &s), Ok(json!(3)));
        assert_eq!(normalize_against_schema(&json!(3.0), &s), Ok(json!(3)));
        assert_eq!(normalize_against_schema(&json!(" 42 "), &s), Ok(json!(42)));
        assert!(normalize_against_schema(&json!(3.5), &s).is_err());
        assert!(normalize_against_schema(&json!(null), &s).is_err());
    }

    #[test]
    fn float_widens_integers() {
        let out = normalize_against_schema(&json!(2), &Schema::float()).unwrap();
        assert_eq!(out.as_f64(), Some(2.0));
        assert!(normalize_against_schema(&json!("nan"), &Schema::float()).is_err());
    }

    #[test]
    fn html_strips_scripts_and_handlers() {
        let out = normalize_against_schema(
            &json!("<p onclick=\"x()\">hi</p><script>alert(1)</script>"),
            &Schema::html(),
        )
        .unwrap();
        assert_eq!(out, json!("<p>hi</p>"));
    }

    #[test]
    fn html_scrub_survives_malformed_markup() {
        let clean = |s: &str| normalize_against_schema(&json!(s), &Schema::html()).unwrap();
        assert_eq!(clean("<p>hi</p><script>alert(1)"), json!("<p>hi</p>"));
        assert_eq!(clean("<style>p{color:red}</style><b>x</b>"), json!("<b>x</b>"));
        assert_eq!(clean("<img src=\"x\" onerror=\"alert(1)\">"), json!("<img src=\"x\">"));
        assert_eq!(clean("<a href=\"javascript:alert(1)\">x</a>"), json!("<a>x</a>"));
        assert_eq!(clean("<a href=\"https://a.org/\">x</a>"), json!("<a href=\"https://a.org/\">x</a>"));

        let slashed = clean("<img src=x/onerror=alert(1)>");
        assert!(!slashed.as_str().unwrap_or_default().contains(" onerror"));
    }

    #[test]
    fn int_rejects_values_beyond_i64() {
        let s = Schema::int();
        assert!(normalize_against_schema(&json!(9223372036854775808u64), &s).is_err());
        assert!(normalize_against_schema(&json!(9.3e18), &s).is_err());
        assert_eq!(normalize_against_schema(&json!(i64::MAX), &s), Ok(json!(i64::MAX)));
    }

    #[test]
    fn list_len_is_exact() {
        let s = Schema::list(Schema::float()).with_len(2);
        assert!(normalize_against_schema(&json!([1.5, 2]), &s).is_ok());
        let err = normalize_against_schema(&json!([1.5]), &s).unwrap_err();
        assert!(err.reason.contains("length 2"));
    }

    #[test]
    fn dict_requires_exact_keys_and_reports_path() {
        let s = Schema::list(Schema::dict(vec![
            Property::new("a", Schema::int()),
            Property::new("b", Schema::unicode()),
        ]));
        let err = normalize_against_schema(&json!([{"a": 1, "b": "x"}, {"a": 2}]), &s).unwrap_err();
        assert_eq!(err.path, "$[1].b");
        let err = normalize_against_schema(&json!([{"a": 1, "b": "x", "c": 0}]), &s).unwrap_err();
        assert_eq!(err.path, "$[0]");
        assert!(err.reason.contains("'c'"));
    }

    #[test]
    fn choices_are_checked_after_coercion() {
        let s = Schema::unicode().with_choices(["x", "y"]);
        assert!(normalize_against_schema(&json!("x"), &s).is_ok());
        assert!(normalize_against_schema(&json!("z"), &s).is_err());
    }

    #[test]
    fn post_normalizers_run_before_validators() {
        let s = Schema::unicode()
            .with_post_normalizer(PostNormalizer::NormalizeSpaces)
            .with_validator(Validator::IsNonempty);
        assert_eq!(normalize_against_schema(&json!("  a   b  "), &s), Ok(json!("a b")));
        assert!(normalize_against_schema(&json!("   "), &s).is_err());
    }
}
