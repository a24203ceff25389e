//! TDF (tutor definition file) document validation.

use crate::error::{Category, Finding, Location};
use crate::rangelist::parse_range_list;
use crate::rules::{FieldKind, FieldRule, check_fields, lookup};
use serde_json::Value;

static TDF_RULES: &[FieldRule] = &[
    FieldRule::required("tutor", FieldKind::Object),
    FieldRule::required("tutor.setspec", FieldKind::Object),
    FieldRule::required("tutor.setspec.lessonname", FieldKind::String).with_check(non_blank),
    FieldRule::required("tutor.setspec.stimulusfile", FieldKind::String),
    // Value is lowercased downstream; only the type is checked here.
    FieldRule::optional("tutor.setspec.experimentTarget", FieldKind::String),
    FieldRule::optional("tutor.unit", FieldKind::Array),
    FieldRule::optional("tutor.unitTemplate", FieldKind::Array),
];

fn non_blank(value: &Value) -> Option<String> {
    let s = value.as_str()?;
    if s.trim().is_empty() {
        Some("'tutor.setspec.lessonname' must not be blank".to_string())
    } else {
        None
    }
}

/// Validate one TDF document. Units are validated independently; errors are
/// collected across all of them.
pub fn validate_tdf(doc: &Value, filename: &str) -> Vec<Finding> {
    let loc = Location::tdf(filename);
    let mut findings = check_fields(doc, TDF_RULES, &loc);

    if let Some(tutor) = doc.get("tutor")
        && tutor.is_object()
        && tutor.get("unit").is_none()
        && tutor.get("unitTemplate").is_none()
    {
        findings.push(Finding::warning(
            Category::Content,
            loc.clone(),
            "has no unit or unitTemplate - this may be a root TDF",
        ));
    }

    for array in ["tutor.unit", "tutor.unitTemplate"] {
        if let Some(units) = lookup(doc, array).and_then(Value::as_array) {
            for (ui, unit) in units.iter().enumerate() {
                validate_unit(unit, ui, array, &loc, &mut findings);
            }
        }
    }

    findings
}

fn validate_unit(
    unit: &Value,
    ui: usize,
    array: &str,
    loc: &Location,
    findings: &mut Vec<Finding>,
) {
    let unit_loc = loc.clone().unit(ui).field(&format!("{}[{}]", array, ui));

    if !unit.is_object() {
        findings.push(Finding::error(
            Category::Structural,
            unit_loc,
            "unit is not an object",
        ));
        return;
    }

    if let Some(index) = unit.get("clusterIndex")
        && coerce_cluster_index(index).is_none()
    {
        findings.push(Finding::error(
            Category::Structural,
            loc.clone()
                .unit(ui)
                .field(&format!("{}[{}].clusterIndex", array, ui)),
            "clusterIndex must be a number or a numeric string",
        ));
    }

    let Some(session) = unit.get("assessmentsession") else {
        return;
    };

    if !session.is_object() {
        findings.push(Finding::error(
            Category::Structural,
            loc.clone()
                .unit(ui)
                .field(&format!("{}[{}].assessmentsession", array, ui)),
            "assessmentsession must be an object",
        ));
        return;
    }

    let Some(clusterlist) = session.get("clusterlist") else {
        return;
    };

    let list_loc = || {
        loc.clone()
            .unit(ui)
            .field(&format!("{}[{}].assessmentsession.clusterlist", array, ui))
    };

    let Some(clusterlist) = clusterlist.as_str() else {
        findings.push(Finding::error(
            Category::Structural,
            list_loc(),
            "assessmentsession.clusterlist must be a string",
        ));
        return;
    };

    if let Err(err) = parse_range_list(clusterlist) {
        for tok in &err.bad_tokens {
            findings.push(Finding::error(
                Category::Structural,
                list_loc(),
                format!(
                    "clusterlist '{}' has bad token '{}' at offset {}",
                    err.input, tok.text, tok.offset
                ),
            ));
        }
    }
}

/// Coerce a `clusterIndex` value to an integer. Accepts an integral number
/// or a string holding one; anything else is `None`.
pub fn coerce_cluster_index(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
