//! Definitions of the built-in object types.

use serde_json::Value;

use crate::catalog::{ObjectKind, ObjectType};
use crate::errors::NormalizationError;
use crate::schema::{Property, Schema};
use crate::structural;
use crate::validators::{PostNormalizer, Validator};

const NOTE_NAMES: [&str; 13] = ["C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5", "D5", "E5", "F5", "G5", "A5"];

const LOGIC_ERROR_CATEGORIES: [&str; 8] =
    ["parsing", "typing", "line", "layout", "variables", "logic", "target", "mistake"];

fn real() -> Schema {
    Schema::float()
}

fn unicode() -> Schema {
    Schema::unicode()
}

/// Positive integer used for both parts of a note duration.
fn fraction_part() -> Schema {
    Schema::int().with_validator(Validator::IsAtLeast { min_value: 1.0 })
}

fn music_phrase() -> Schema {
    Schema::list(Schema::dict(vec![
        Property::new("readableNoteName", unicode().with_choices(NOTE_NAMES)),
        Property::new(
            "noteDuration",
            Schema::dict(vec![Property::new("num", fraction_part()), Property::new("den", fraction_part())]),
        ),
    ]))
}

fn graph() -> Schema {
    let vertex = Schema::dict(vec![
        Property::new("label", unicode()),
        Property::new("x", real()),
        Property::new("y", real()),
    ]);
    let edge = Schema::dict(vec![
        Property::new("src", Schema::int()),
        Property::new("dst", Schema::int()),
        Property::new("weight", Schema::int()),
    ]);
    Schema::dict(vec![
        Property::new("vertices", Schema::list(vertex)),
        Property::new("edges", Schema::list(edge)),
        Property::new("isDirected", Schema::bool()),
        Property::new("isWeighted", Schema::bool()),
        Property::new("isLabeled", Schema::bool()),
    ])
}

fn null(_: &ObjectType, _: &Value) -> Result<Value, NormalizationError> {
    Ok(Value::Null)
}

/// Absent (`null`) and empty-string input mean `false`.
fn boolean(object_type: &ObjectType, raw: &Value) -> Result<Value, NormalizationError> {
    match raw {
        Value::Null => crate::catalog::by_schema(object_type, &Value::Bool(false)),
        Value::String(s) if s.is_empty() => crate::catalog::by_schema(object_type, &Value::Bool(false)),
        other => crate::catalog::by_schema(object_type, other),
    }
}

fn checked_proof(_: &ObjectType, raw: &Value) -> Result<Value, NormalizationError> {
    structural::checked_proof(raw)
}

fn logic_question(_: &ObjectType, raw: &Value) -> Result<Value, NormalizationError> {
    structural::logic_question(raw)
}

pub(crate) fn define(kind: ObjectKind) -> ObjectType {
    let name = kind.name();
    match kind {
        ObjectKind::Null => ObjectType::structural(name, "A null object.", null),
        ObjectKind::Boolean => ObjectType::with_schema(name, "A boolean.", Schema::bool())
            .with_editors("boolean_editor", "BooleanEditor")
            .normalized_by(boolean),
        ObjectKind::Real => ObjectType::with_schema(name, "A real number.", real())
            .with_editors("real_editor", "RealEditor"),
        ObjectKind::Int => ObjectType::with_schema(name, "An integer.", Schema::int())
            .with_editors("int_editor", "IntEditor"),
        ObjectKind::UnicodeString => ObjectType::with_schema(name, "A unicode string.", unicode())
            .with_editors("unicode_string_editor", "UnicodeStringEditor"),
        ObjectKind::Html => ObjectType::with_schema(name, "An HTML string.", Schema::html())
            .with_editors("html_editor", "HtmlEditor"),
        ObjectKind::NonnegativeInt => ObjectType::with_schema(
            name,
            "A non-negative integer.",
            Schema::int().with_validator(Validator::IsAtLeast { min_value: 0.0 }),
        )
        .with_editors("nonnegative_int_editor", "NonnegativeIntEditor"),
        ObjectKind::CodeEvaluation => ObjectType::with_schema(
            name,
            "Code and its evaluation results.",
            Schema::dict(
                ["code", "output", "evaluation", "error"]
                    .into_iter()
                    .map(|field| Property::new(field, unicode()))
                    .collect(),
            ),
        ),
        ObjectKind::CoordTwoDim => ObjectType::with_schema(
            name,
            "A two-dimensional coordinate (a pair of reals).",
            Schema::list(real()).with_len(2),
        )
        .with_editors("coord_two_dim_editor", "CoordTwoDimEditor"),
        ObjectKind::ListOfUnicodeString => ObjectType::with_schema(name, "A list.", Schema::list(unicode()))
            .with_editors("list_editor", "ListOfUnicodeStringEditor"),
        ObjectKind::SetOfUnicodeString => ObjectType::with_schema(
            name,
            "A set (a list with unique elements) of unicode strings.",
            Schema::list(unicode()).with_validator(Validator::IsUniquified),
        )
        .with_editors("list_editor", "SetOfUnicodeStringEditor"),
        ObjectKind::NormalizedString => ObjectType::with_schema(
            name,
            "A unicode string with adjacent whitespace collapsed.",
            unicode().with_post_normalizer(PostNormalizer::NormalizeSpaces),
        )
        .with_editors("unicode_string_editor", "NormalizedStringEditor"),
        ObjectKind::MathLatexString => ObjectType::with_schema(name, "A LaTeX string.", unicode())
            .with_editors("math_latex_string_editor", "MathLatexStringEditor"),
        ObjectKind::SanitizedUrl => ObjectType::with_schema(
            name,
            "An HTTP or HTTPS url.",
            unicode().with_post_normalizer(PostNormalizer::SanitizeUrl),
        )
        .with_editors("unicode_string_editor", "SanitizedUrlEditor"),
        ObjectKind::MusicPhrase => ObjectType::with_schema(
            name,
            "A musical phrase that contains zero or more notes, rests, and time signature.",
            music_phrase(),
        )
        .with_editors("music_phrase_editor", "MusicPhraseEditor"),
        // Stored relative to the exploration's asset directory.
        ObjectKind::Filepath => ObjectType::with_schema(name, "A string that represents a filepath", unicode())
            .with_editors("filepath_editor", "FilepathEditor"),
        ObjectKind::CheckedProof => {
            ObjectType::structural(name, "A proof attempt and any errors it makes.", checked_proof)
        }
        ObjectKind::LogicQuestion => {
            ObjectType::structural(name, "A question giving a formula to prove.", logic_question)
                .with_editors("logic_question_editor", "LogicQuestionEditor")
        }
        ObjectKind::LogicErrorCategory => ObjectType::with_schema(
            name,
            "One of the possible error categories of a logic proof.",
            unicode().with_choices(LOGIC_ERROR_CATEGORIES),
        )
        .with_editors("logic_error_category_editor", "LogicErrorCategoryEditor"),
        ObjectKind::Graph => ObjectType::with_schema(name, "A (mathematical) graph", graph())
            .with_editors("graph_editor", "GraphEditor"),
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::catalog;
    use serde_json::json;

    fn normalize(name: &str, raw: serde_json::Value) -> Result<serde_json::Value, crate::ObjectError> {
        catalog().normalize(name, &raw)
    }

    #[test]
    fn null_discards_input() {
        assert_eq!(normalize("Null", json!({"a": 1})).unwrap(), json!(null));
    }

    #[test]
    fn boolean_treats_empty_and_absent_as_false() {
        assert_eq!(normalize("Boolean", json!("")).unwrap(), json!(false));
        assert_eq!(normalize("Boolean", json!(null)).unwrap(), json!(false));
        assert_eq!(normalize("Boolean", json!(true)).unwrap(), json!(true));
        assert!(normalize("Boolean", json!("notabool")).is_err());
    }

    #[test]
    fn nonnegative_int_rejects_negatives() {
        assert_eq!(normalize("NonnegativeInt", json!(0)).unwrap(), json!(0));
        assert!(normalize("NonnegativeInt", json!(-1)).is_err());
    }

    #[test]
    fn normalized_string_collapses_whitespace() {
        assert_eq!(normalize("NormalizedString", json!("  a   b  ")).unwrap(), json!("a b"));
    }

    #[test]
    fn set_of_unicode_string_rejects_duplicates() {
        assert!(normalize("SetOfUnicodeString", json!(["a", "a", "b"])).is_err());
        assert_eq!(normalize("SetOfUnicodeString", json!(["a", "b"])).unwrap(), json!(["a", "b"]));
    }

    #[test]
    fn sanitized_url_only_allows_http() {
        assert_eq!(normalize("SanitizedUrl", json!("https://a.org/x y")).unwrap(), json!("https://a.org/x%20y"));
        assert!(normalize("SanitizedUrl", json!("javascript:void(0)")).is_err());
    }

    #[test]
    fn coord_two_dim_is_a_pair_of_reals() {
        let out = normalize("CoordTwoDim", json!([1, 2.5])).unwrap();
        assert_eq!(out[0].as_f64(), Some(1.0));
        assert!(normalize("CoordTwoDim", json!([1, 2, 3])).is_err());
        assert!(normalize("CoordTwoDim", json!(["a", 2])).is_err());
    }

    #[test]
    fn music_phrase_checks_notes_and_durations() {
        let ok = json!([{"readableNoteName": "C4", "noteDuration": {"num": 1, "den": 4}}]);
        assert_eq!(normalize("MusicPhrase", ok.clone()).unwrap(), ok);

        let bad_note = json!([{"readableNoteName": "C9", "noteDuration": {"num": 1, "den": 4}}]);
        assert!(normalize("MusicPhrase", bad_note).is_err());

        let zero_den = json!([{"readableNoteName": "A5", "noteDuration": {"num": 1, "den": 0}}]);
        match normalize("MusicPhrase", zero_den) {
            Err(crate::ObjectError::Normalization(e)) => assert_eq!(e.path, "$[0].noteDuration.den"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn code_evaluation_requires_all_fields() {
        let ok = json!({"code": "x", "output": "", "evaluation": "", "error": ""});
        assert!(normalize("CodeEvaluation", ok).is_ok());
        assert!(normalize("CodeEvaluation", json!({"code": "x"})).is_err());
    }

    #[test]
    fn logic_error_category_is_enumerated() {
        assert!(normalize("LogicErrorCategory", json!("typing")).is_ok());
        assert!(normalize("LogicErrorCategory", json!("spelling")).is_err());
    }

    #[test]
    fn graph_does_not_cross_check_edges() {
        let raw = json!({
            "vertices": [{"label": "a", "x": 0.0, "y": 0.0}, {"label": "b", "x": 1.0, "y": 1.0}],
            "edges": [{"src": 5, "dst": 0, "weight": 1}],
            "isDirected": false,
            "isWeighted": false,
            "isLabeled": true
        });
        assert_eq!(normalize("Graph", raw.clone()).unwrap(), raw);
    }

    #[test]
    fn graph_rejects_missing_flags() {
        let raw = json!({"vertices": [], "edges": [], "isDirected": false, "isWeighted": false});
        assert!(normalize("Graph", raw).is_err());
    }

    #[test]
    fn checked_proof_and_logic_question_are_wired() {
        assert!(normalize("CheckedProof", json!({"correct": false})).is_err());
        let q = json!({"assumptions": [], "results": [], "default_proof_string": ""});
        assert_eq!(normalize("LogicQuestion", q.clone()).unwrap(), q);
    }
}
