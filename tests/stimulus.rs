use serde_json::{Value, json};
use tdfpack::error::{Category, Severity};
use tdfpack::stimulus::{cluster_index_set, validate_stimulus};

/// Helper: a minimal valid stimulus document with one cluster of one stim.
fn minimal() -> Value {
    json!({
        "setspec": {
            "clusters": [
                {"stims": [{"response": {"correctResponse": "cat"}}]}
            ]
        }
    })
}

fn errors(doc: &Value) -> Vec<String> {
    validate_stimulus(doc, "s.json")
        .into_iter()
        .filter(|f| f.is_error())
        .map(|f| f.message)
        .collect()
}

fn warnings(doc: &Value) -> Vec<String> {
    validate_stimulus(doc, "s.json")
        .into_iter()
        .filter(|f| f.severity == Severity::Warning)
        .map(|f| f.message)
        .collect()
}

#[test]
fn minimal_document_is_clean() {
    assert!(validate_stimulus(&minimal(), "s.json").is_empty());
}

#[test]
fn missing_setspec() {
    let findings = validate_stimulus(&json!({"other": 1}), "s.json");
    assert_eq!(findings.len(), 1);
    assert!(findings[0].is_error());
    assert_eq!(findings[0].category, Category::Structural);
    assert!(findings[0].message.contains("setspec"));
}

#[test]
fn clusters_missing_not_array_or_empty() {
    assert_eq!(errors(&json!({"setspec": {}})).len(), 1);
    assert_eq!(errors(&json!({"setspec": {"clusters": "nope"}})).len(), 1);

    let doc = json!({"setspec": {"clusters": []}});
    assert!(!errors(&doc).is_empty());
    assert_eq!(cluster_index_set(&doc), None);
}

#[test]
fn cluster_index_set_matches_cluster_positions() {
    let doc = json!({"setspec": {"clusters": [
        {"stims": [{"response": {"correctResponse": "a"}}]},
        {"stims": [{"response": {"correctResponse": "b"}}]},
        {"stims": [{"response": {"correctResponse": "c"}}]}
    ]}});
    let set = cluster_index_set(&doc).unwrap();
    assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn cluster_missing_or_empty_stims() {
    let missing = json!({"setspec": {"clusters": [{"responseType": "text"}]}});
    assert!(errors(&missing).iter().any(|m| m.contains("stims")));

    let empty = json!({"setspec": {"clusters": [{"stims": []}]}});
    assert!(errors(&empty).iter().any(|m| m.contains("empty")));
}

#[test]
fn missing_correct_response() {
    let doc = json!({"setspec": {"clusters": [{"stims": [{"response": {}}]}]}});
    let errs = errors(&doc);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].contains("correctResponse"));
}

#[test]
fn missing_response_is_reported_once() {
    // The nested correctResponse rule must not double-report when the whole
    // response object is absent.
    let doc = json!({"setspec": {"clusters": [{"stims": [{"parameter": "0,.7"}]}]}});
    let errs = errors(&doc);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].contains("'response'"));
}

#[test]
fn incorrect_responses_accepts_string_or_string_array() {
    let as_string = json!({"setspec": {"clusters": [{"stims": [
        {"response": {"correctResponse": "a", "incorrectResponses": "b,c"}}
    ]}]}});
    assert!(errors(&as_string).is_empty());

    let as_array = json!({"setspec": {"clusters": [{"stims": [
        {"response": {"correctResponse": "a", "incorrectResponses": ["b", "c"]}}
    ]}]}});
    assert!(errors(&as_array).is_empty());

    let as_number = json!({"setspec": {"clusters": [{"stims": [
        {"response": {"correctResponse": "a", "incorrectResponses": 7}}
    ]}]}});
    assert_eq!(errors(&as_number).len(), 1);

    let mixed = json!({"setspec": {"clusters": [{"stims": [
        {"response": {"correctResponse": "a", "incorrectResponses": ["b", 3]}}
    ]}]}});
    let errs = errors(&mixed);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].contains("incorrectResponses[1]"));
}

#[test]
fn parameter_format() {
    let good = json!({"setspec": {"clusters": [{"stims": [
        {"response": {"correctResponse": "a"}, "parameter": "0,.7"}
    ]}]}});
    assert!(errors(&good).is_empty());

    let bad = json!({"setspec": {"clusters": [{"stims": [
        {"response": {"correctResponse": "a"}, "parameter": "fast"}
    ]}]}});
    let errs = errors(&bad);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].contains("number,number"));
}

#[test]
fn optimal_prob_must_be_a_number() {
    let doc = json!({"setspec": {"clusters": [{"stims": [
        {"response": {"correctResponse": "a"}, "optimalProb": "0.8"}
    ]}]}});
    assert_eq!(errors(&doc).len(), 1);
}

#[test]
fn display_fields_must_be_strings() {
    let doc = json!({"setspec": {"clusters": [{"stims": [
        {"response": {"correctResponse": "a"},
         "display": {"text": "hello", "imgSrc": 42}}
    ]}]}});
    let errs = errors(&doc);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].contains("display.imgSrc"));
}

#[test]
fn array_fields_must_be_arrays() {
    let doc = json!({"setspec": {"clusters": [{"stims": [
        {"response": {"correctResponse": "a"}, "tags": "noun", "alternateDisplays": {}}
    ]}]}});
    assert_eq!(errors(&doc).len(), 2);
}

#[test]
fn response_type_must_be_string() {
    let doc = json!({"setspec": {"clusters": [
        {"responseType": 3,
         "stims": [{"response": {"correctResponse": "a"}}]}
    ]}});
    assert_eq!(errors(&doc).len(), 1);
}

#[test]
fn nonstandard_response_type_warns() {
    let doc = json!({"setspec": {"clusters": [
        {"responseType": "telepathy",
         "stims": [{"response": {"correctResponse": "a"}}]}
    ]}});
    assert!(errors(&doc).is_empty());
    let warns = warnings(&doc);
    assert_eq!(warns.len(), 1);
    assert!(warns[0].contains("telepathy"));
}

#[test]
fn duplicate_correct_responses_in_cluster() {
    let doc = json!({"setspec": {"clusters": [{"stims": [
        {"response": {"correctResponse": "cat"}},
        {"response": {"correctResponse": "cat"}}
    ]}]}});
    let errs = errors(&doc);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].contains("duplicate correctResponse"));
    assert!(errs[0].contains("cat"));
}

#[test]
fn question_without_distractors_warns() {
    let doc = json!({"setspec": {"clusters": [{"stims": [
        {"response": {"correctResponse": "4"},
         "display": {"text": "What is 2+2?"}}
    ]}]}});
    assert!(errors(&doc).is_empty());
    assert!(warnings(&doc).iter().any(|m| m.contains("question")));
}

#[test]
fn question_with_distractors_is_clean() {
    let doc = json!({"setspec": {"clusters": [{"stims": [
        {"response": {"correctResponse": "4", "incorrectResponses": ["3", "5"]},
         "display": {"text": "What is 2+2?"}}
    ]}]}});
    assert!(validate_stimulus(&doc, "s.json").is_empty());
}

#[test]
fn invisible_characters_warn_but_never_fail() {
    let doc = json!({"setspec": {"clusters": [{"stims": [
        {"response": {"correctResponse": "cat\u{00A0}"}}
    ]}]}});
    let findings = validate_stimulus(&doc, "s.json");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Warning);
    assert_eq!(findings[0].category, Category::Content);
    assert!(findings[0].message.contains("invisible"));
}

#[test]
fn invisible_characters_in_incorrect_responses() {
    let doc = json!({"setspec": {"clusters": [{"stims": [
        {"response": {"correctResponse": "a",
                      "incorrectResponses": ["ok", "bad\u{0085}"]}}
    ]}]}});
    let warns = warnings(&doc);
    assert_eq!(warns.len(), 1);
}

#[test]
fn findings_carry_cluster_and_stim_indices() {
    let doc = json!({"setspec": {"clusters": [
        {"stims": [{"response": {"correctResponse": "a"}}]},
        {"stims": [
            {"response": {"correctResponse": "b"}},
            {"response": {}}
        ]}
    ]}});
    let findings = validate_stimulus(&doc, "s.json");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].location.cluster, Some(1));
    assert_eq!(findings[0].location.stimulus, Some(1));
}
