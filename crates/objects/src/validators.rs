//! Validator and post-normalizer capability tables.
//!
//! Both are closed enums resolved from `{"id": ..., <params>}` specs when a schema is built.
//! Running them never fails on configuration, only on the value being checked.

use serde_json::{json, Map, Value};

use crate::errors::SchemaError;

#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    IsAtLeast { min_value: f64 },
    IsAtMost { max_value: f64 },
    IsNonempty,
    IsUniquified,
    HasLengthAtLeast { min_value: usize },
    HasLengthAtMost { max_value: usize },
}

impl Validator {
    pub fn id(&self) -> &'static str {
        match self {
            Validator::IsAtLeast { .. } => "is_at_least",
            Validator::IsAtMost { .. } => "is_at_most",
            Validator::IsNonempty => "is_nonempty",
            Validator::IsUniquified => "is_uniquified",
            Validator::HasLengthAtLeast { .. } => "has_length_at_least",
            Validator::HasLengthAtMost { .. } => "has_length_at_most",
        }
    }

    pub fn from_spec(spec: &Map<String, Value>) -> Result<Self, SchemaError> {
        let id = spec_id(spec)?;
        match id {
            "is_at_least" => Ok(Validator::IsAtLeast { min_value: number_param(spec, id, "min_value")? }),
            "is_at_most" => Ok(Validator::IsAtMost { max_value: number_param(spec, id, "max_value")? }),
            "is_nonempty" => Ok(Validator::IsNonempty),
            "is_uniquified" => Ok(Validator::IsUniquified),
            "has_length_at_least" => Ok(Validator::HasLengthAtLeast { min_value: count_param(spec, id, "min_value")? }),
            "has_length_at_most" => Ok(Validator::HasLengthAtMost { max_value: count_param(spec, id, "max_value")? }),
            other => Err(SchemaError::UnknownValidator(other.to_string())),
        }
    }

    pub fn to_spec(&self) -> Value {
        match self {
            Validator::IsAtLeast { min_value } => json!({"id": self.id(), "min_value": number_json(*min_value)}),
            Validator::IsAtMost { max_value } => json!({"id": self.id(), "max_value": number_json(*max_value)}),
            Validator::HasLengthAtLeast { min_value } => json!({"id": self.id(), "min_value": min_value}),
            Validator::HasLengthAtMost { max_value } => json!({"id": self.id(), "max_value": max_value}),
            Validator::IsNonempty | Validator::IsUniquified => json!({"id": self.id()}),
        }
    }

    /// Check an already-normalized value. The error string is the rejection reason.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Validator::IsAtLeast { min_value } => {
                let n = value.as_f64().ok_or_else(|| format!("{} applies to numbers, got {value}", self.id()))?;
                if n < *min_value {
                    return Err(format!("{value} is less than the minimum {min_value}"));
                }
                Ok(())
            }
            Validator::IsAtMost { max_value } => {
                let n = value.as_f64().ok_or_else(|| format!("{} applies to numbers, got {value}", self.id()))?;
                if n > *max_value {
                    return Err(format!("{value} is greater than the maximum {max_value}"));
                }
                Ok(())
            }
            Validator::IsNonempty => match length_of(value) {
                Some(0) => Err("value must not be empty".into()),
                Some(_) => Ok(()),
                None => Err(format!("{} applies to strings and lists, got {value}", self.id())),
            },
            Validator::IsUniquified => {
                let items = value
                    .as_array()
                    .ok_or_else(|| format!("{} applies to lists, got {value}", self.id()))?;
                for (i, item) in items.iter().enumerate() {
                    if items[..i].contains(item) {
                        return Err(format!("list contains duplicate element {item}"));
                    }
                }
                Ok(())
            }
            Validator::HasLengthAtLeast { min_value } => {
                let len = length_of(value).ok_or_else(|| format!("{} applies to strings and lists, got {value}", self.id()))?;
                if len < *min_value {
                    return Err(format!("length {len} is less than the minimum {min_value}"));
                }
                Ok(())
            }
            Validator::HasLengthAtMost { max_value } => {
                let len = length_of(value).ok_or_else(|| format!("{} applies to strings and lists, got {value}", self.id()))?;
                if len > *max_value {
                    return Err(format!("length {len} is greater than the maximum {max_value}"));
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostNormalizer {
    /// Collapse whitespace runs to one space and trim both ends.
    NormalizeSpaces,
    /// Accept only http(s) URLs, percent-encoding their components.
    SanitizeUrl,
}

impl PostNormalizer {
    pub fn id(&self) -> &'static str {
        match self {
            PostNormalizer::NormalizeSpaces => "normalize_spaces",
            PostNormalizer::SanitizeUrl => "sanitize_url",
        }
    }

    pub fn from_spec(spec: &Map<String, Value>) -> Result<Self, SchemaError> {
        match spec_id(spec)? {
            "normalize_spaces" => Ok(PostNormalizer::NormalizeSpaces),
            "sanitize_url" => Ok(PostNormalizer::SanitizeUrl),
            other => Err(SchemaError::UnknownPostNormalizer(other.to_string())),
        }
    }

    pub fn to_spec(&self) -> Value {
        json!({"id": self.id()})
    }

    pub fn apply(&self, value: Value) -> Result<Value, String> {
        let Value::String(s) = value else {
            return Err(format!("{} applies to strings, got {value}", self.id()));
        };
        match self {
            PostNormalizer::NormalizeSpaces => Ok(Value::String(normalize_spaces(&s))),
            PostNormalizer::SanitizeUrl => sanitize_url(&s).map(Value::String),
        }
    }
}

pub fn normalize_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Percent-encode every component of an http(s) URL.
///
/// Components are decoded before encoding so that an already-sanitized URL is a fixed point.
/// The empty string is allowed through.
pub fn sanitize_url(raw: &str) -> Result<String, String> {
    if raw.is_empty() {
        return Ok(String::new());
    }
    let invalid = || format!("Invalid URL: sanitized URL should start with 'http://' or 'https://'; received {raw}");

    let (scheme, rest) = raw.split_once("://").ok_or_else(invalid)?;
    let scheme = scheme.to_ascii_lowercase();
    if scheme != "http" && scheme != "https" {
        return Err(invalid());
    }

    let (rest, fragment) = match rest.split_once('#') {
        Some((r, f)) => (r, Some(f)),
        None => (rest, None),
    };
    let (rest, query) = match rest.split_once('?') {
        Some((r, q)) => (r, Some(q)),
        None => (rest, None),
    };
    let (netloc, path) = match rest.find('/') {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    if netloc.is_empty() || netloc.chars().any(|c| c.is_whitespace() || "<>\"'`\\{}|^".contains(c)) {
        return Err(format!("Invalid URL: bad host in {raw}"));
    }

    let mut out = format!("{scheme}://{netloc}");
    let segments = path
        .split('/')
        .map(requote)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("Invalid URL: {e}"))?;
    out.push_str(&segments.join("/"));
    if let Some(q) = query {
        let pairs = q
            .split('&')
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => Ok(format!("{}={}", requote(k)?, requote(v)?)),
                None => requote(pair),
            })
            .collect::<Result<Vec<_>, String>>()
            .map_err(|e| format!("Invalid URL: {e}"))?;
        out.push('?');
        out.push_str(&pairs.join("&"));
    }
    if let Some(f) = fragment {
        out.push('#');
        out.push_str(&requote(f).map_err(|e| format!("Invalid URL: {e}"))?);
    }
    Ok(out)
}

fn requote(component: &str) -> Result<String, String> {
    let decoded = urlencoding::decode(component).map_err(|e| e.to_string())?;
    Ok(urlencoding::encode(&decoded).into_owned())
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(a) => Some(a.len()),
        _ => None,
    }
}

fn number_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

fn spec_id(spec: &Map<String, Value>) -> Result<&str, SchemaError> {
    spec.get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| SchemaError::Malformed(format!("spec is missing 'id': {}", Value::Object(spec.clone()))))
}

fn number_param(spec: &Map<String, Value>, id: &str, param: &str) -> Result<f64, SchemaError> {
    spec.get(param)
        .and_then(Value::as_f64)
        .ok_or_else(|| SchemaError::MissingParameter { id: id.into(), param: param.into() })
}

fn count_param(spec: &Map<String, Value>, id: &str, param: &str) -> Result<usize, SchemaError> {
    spec.get(param)
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .ok_or_else(|| SchemaError::MissingParameter { id: id.into(), param: param.into() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_at_least_bounds_inclusively() {
        let v = Validator::IsAtLeast { min_value: 0.0 };
        assert!(v.check(&json!(0)).is_ok());
        assert!(v.check(&json!(-1)).is_err());
        assert!(v.check(&json!("0")).is_err());
    }

    #[test]
    fn uniquified_rejects_duplicates() {
        let v = Validator::IsUniquified;
        assert!(v.check(&json!(["a", "b"])).is_ok());
        let err = v.check(&json!(["a", "a", "b"])).unwrap_err();
        assert!(err.contains("duplicate"));
    }

    #[test]
    fn length_validators_count_chars_and_items() {
        assert!(Validator::HasLengthAtMost { max_value: 2 }.check(&json!("éé")).is_ok());
        assert!(Validator::HasLengthAtLeast { min_value: 2 }.check(&json!([1])).is_err());
        assert!(Validator::IsNonempty.check(&json!("")).is_err());
        assert!(Validator::IsNonempty.check(&json!([0])).is_ok());
    }

    #[test]
    fn normalize_spaces_collapses_and_trims() {
        assert_eq!(normalize_spaces("  a   b  "), "a b");
        assert_eq!(normalize_spaces("\ta\n\nb"), "a b");
        assert_eq!(normalize_spaces("   "), "");
    }

    #[test]
    fn sanitize_url_accepts_http_and_https() {
        assert_eq!(sanitize_url("https://example.com/a b?q=x y#top").unwrap(), "https://example.com/a%20b?q=x%20y#top");
        assert_eq!(sanitize_url("HTTP://example.com").unwrap(), "http://example.com");
        assert_eq!(sanitize_url("").unwrap(), "");
    }

    #[test]
    fn sanitize_url_is_a_fixed_point() {
        let once = sanitize_url("http://example.com/caf\u{e9}/x").unwrap();
        assert_eq!(sanitize_url(&once).unwrap(), once);
    }

    #[test]
    fn sanitize_url_rejects_other_schemes() {
        assert!(sanitize_url("javascript:alert(1)").is_err());
        assert!(sanitize_url("ftp://example.com").is_err());
        assert!(sanitize_url("example.com").is_err());
        assert!(sanitize_url("http://").is_err());
    }

    #[test]
    fn specs_round_trip_through_ids() {
        let spec = json!({"id": "is_at_least", "min_value": 1});
        let v = Validator::from_spec(spec.as_object().unwrap()).unwrap();
        assert_eq!(v, Validator::IsAtLeast { min_value: 1.0 });
        assert_eq!(v.to_spec(), spec);
        assert_eq!(PostNormalizer::SanitizeUrl.to_spec(), json!({"id": "sanitize_url"}));
    }
}
