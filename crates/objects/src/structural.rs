//! Hand-written validators for shapes with cross-field rules.
//!
//! These bypass the schema interpreter. Every failure is reported as a single
//! "cannot convert" error for the type, with the path of the failing field.

use serde_json::{Map, Value};

use crate::errors::NormalizationError;

/// Proof attempt: error details are required only when `correct` is false.
pub fn checked_proof(raw: &Value) -> Result<Value, NormalizationError> {
    let fail = |path: &str| NormalizationError::new(path, format!("Cannot convert to checked proof {raw}"));

    let obj = raw.as_object().ok_or_else(|| fail("$"))?;
    for key in ["assumptions_string", "target_string", "proof_string"] {
        require_str(obj, key).ok_or_else(|| fail(&format!("$.{key}")))?;
    }
    let correct = obj.get("correct").and_then(Value::as_bool).ok_or_else(|| fail("$.correct"))?;
    if !correct {
        for key in ["error_category", "error_code", "error_message"] {
            require_str(obj, key).ok_or_else(|| fail(&format!("$.{key}")))?;
        }
        obj.get("error_line_number")
            .filter(|v| v.is_i64() || v.is_u64())
            .ok_or_else(|| fail("$.error_line_number"))?;
    }
    Ok(raw.clone())
}

/// Logic question: `assumptions` and `results` are expression arrays, plus a default proof.
///
/// Expressions nest through `arguments` and `dummies` without a depth limit. They are
/// walked with an explicit stack instead of recursion, depth-first in field order
/// (`assumptions`, then `results`, then `default_proof_string`), so the reported path is
/// the first failing field in that order.
pub fn logic_question(raw: &Value) -> Result<Value, NormalizationError> {
    let fail = |path: &str| NormalizationError::new(path, format!("Cannot convert to a logic question {raw}"));

    let obj = raw.as_object().ok_or_else(|| fail("$"))?;
    let mut pending: Vec<Pending> = Vec::new();
    let mut top = Vec::with_capacity(2);
    for key in ["assumptions", "results"] {
        let array = obj.get(key).ok_or_else(|| fail(&format!("$.{key}")))?;
        top.push(Pending::Array(format!("$.{key}"), array));
    }
    pending.extend(top.into_iter().rev());

    while let Some(next) = pending.pop() {
        match next {
            Pending::Array(path, array) => {
                let items = array.as_array().ok_or_else(|| fail(&path))?;
                // reversed so the first item is popped first
                for (i, expr) in items.iter().enumerate().rev() {
                    pending.push(Pending::Expr(format!("{path}[{i}]"), expr));
                }
            }
            Pending::Expr(path, expr) => {
                let e = expr.as_object().ok_or_else(|| fail(&path))?;
                for key in ["top_kind_name", "top_operator_name"] {
                    require_str(e, key).ok_or_else(|| fail(&format!("{path}.{key}")))?;
                }
                for key in ["dummies", "arguments"] {
                    let child = e.get(key).ok_or_else(|| fail(&format!("{path}.{key}")))?;
                    pending.push(Pending::Array(format!("{path}.{key}"), child));
                }
            }
        }
    }
    require_str(obj, "default_proof_string").ok_or_else(|| fail("$.default_proof_string"))?;
    Ok(raw.clone())
}

enum Pending<'a> {
    Array(String, &'a Value),
    Expr(String, &'a Value),
}

fn require_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}
