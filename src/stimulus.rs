//! Stimulus document validation.
//!
//! Structural checks are driven by a [`FieldRule`] table per stimulus; the
//! cluster/stim nesting and the content heuristics (question-like text,
//! invisible characters) are handled here because the generic checker cannot
//! express them.

use crate::error::{Category, Finding, Location};
use crate::rules::{FieldKind, FieldRule, check_fields, lookup};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::LazyLock;

// Two comma-separated numbers, e.g. "0,.7".
static PARAMETER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d*\.?\d+,-?\d*\.?\d+$").unwrap());

/// Standard cluster response types; anything else is accepted with a warning.
const RESPONSE_TYPES: [&str; 5] = ["text", "audio", "image", "video", "cloze"];

/// Lowercased substrings that make display text look like a question.
const QUESTION_MARKERS: [&str; 5] = ["?", "choose", "select", "which", "what is"];

static STIM_RULES: &[FieldRule] = &[
    FieldRule::required("response", FieldKind::Object),
    FieldRule::required("response.correctResponse", FieldKind::String),
    FieldRule::optional("response.incorrectResponses", FieldKind::StringOrArray)
        .with_check(incorrect_responses_all_strings),
    FieldRule::optional("parameter", FieldKind::String).with_check(parameter_format),
    FieldRule::optional("optimalProb", FieldKind::Number),
    FieldRule::optional("display", FieldKind::Object),
    FieldRule::optional("display.text", FieldKind::String),
    FieldRule::optional("display.audioSrc", FieldKind::String),
    FieldRule::optional("display.imgSrc", FieldKind::String),
    FieldRule::optional("display.videoSrc", FieldKind::String),
    FieldRule::optional("display.clozeText", FieldKind::String),
    FieldRule::optional("display.clozeStimulus", FieldKind::String),
    FieldRule::optional("display.textStimulus", FieldKind::String),
    FieldRule::optional("display.audioStimulus", FieldKind::String),
    FieldRule::optional("display.imageStimulus", FieldKind::String),
    FieldRule::optional("display.videoStimulus", FieldKind::String),
    FieldRule::optional("speechHintExclusionList", FieldKind::String),
    FieldRule::optional("alternateDisplays", FieldKind::Array),
    FieldRule::optional("tags", FieldKind::Array),
];

fn incorrect_responses_all_strings(value: &Value) -> Option<String> {
    let items = value.as_array()?;
    for (i, item) in items.iter().enumerate() {
        if !item.is_string() {
            return Some(format!("'response.incorrectResponses[{}]' is not a string", i));
        }
    }
    None
}

fn parameter_format(value: &Value) -> Option<String> {
    let s = value.as_str()?;
    if PARAMETER_RE.is_match(s) {
        None
    } else {
        Some(format!(
            "parameter '{}' does not match expected format 'number,number'",
            s
        ))
    }
}

/// Validate one stimulus document. Collects every finding; never fails fast
/// within the document.
pub fn validate_stimulus(doc: &Value, filename: &str) -> Vec<Finding> {
    let loc = Location::stim_file(filename);
    let mut findings = Vec::new();

    let Some(setspec) = doc.get("setspec") else {
        findings.push(Finding::error(
            Category::Structural,
            loc.field("setspec"),
            "missing 'setspec' key",
        ));
        return findings;
    };

    let clusters = match setspec.get("clusters") {
        None => {
            findings.push(Finding::error(
                Category::Structural,
                loc.field("setspec.clusters"),
                "missing 'clusters' in setspec",
            ));
            return findings;
        }
        Some(value) => match value.as_array() {
            None => {
                findings.push(Finding::error(
                    Category::Structural,
                    loc.field("setspec.clusters"),
                    "'setspec.clusters' is not an array",
                ));
                return findings;
            }
            Some(clusters) => clusters,
        },
    };

    if clusters.is_empty() {
        findings.push(Finding::error(
            Category::Structural,
            loc.field("setspec.clusters"),
            "has no clusters",
        ));
        return findings;
    }

    for (ci, cluster) in clusters.iter().enumerate() {
        validate_cluster(cluster, ci, &loc, &mut findings);
    }

    findings
}

fn validate_cluster(cluster: &Value, ci: usize, loc: &Location, findings: &mut Vec<Finding>) {
    let cluster_loc = loc.clone().cluster(ci);

    if !cluster.is_object() {
        findings.push(Finding::error(
            Category::Structural,
            cluster_loc,
            "cluster is not an object",
        ));
        return;
    }

    if let Some(response_type) = cluster.get("responseType") {
        match response_type.as_str() {
            None => findings.push(Finding::error(
                Category::Structural,
                cluster_loc.clone().field("responseType"),
                "responseType must be a string",
            )),
            Some(rt) if !RESPONSE_TYPES.contains(&rt) => findings.push(Finding::warning(
                Category::Content,
                cluster_loc.clone().field("responseType"),
                format!(
                    "responseType '{}' is not a standard type (expected: {})",
                    rt,
                    RESPONSE_TYPES.join(", ")
                ),
            )),
            Some(_) => {}
        }
    }

    let stims = match cluster.get("stims") {
        None => {
            findings.push(Finding::error(
                Category::Structural,
                cluster_loc.field("stims"),
                "missing 'stims' array",
            ));
            return;
        }
        Some(value) => match value.as_array() {
            None => {
                findings.push(Finding::error(
                    Category::Structural,
                    cluster_loc.field("stims"),
                    "'stims' is not an array",
                ));
                return;
            }
            Some(stims) => stims,
        },
    };

    if stims.is_empty() {
        findings.push(Finding::error(
            Category::Structural,
            cluster_loc.field("stims"),
            "has an empty stims array",
        ));
        return;
    }

    check_duplicate_responses(stims, &cluster_loc, findings);

    for (si, stim) in stims.iter().enumerate() {
        let stim_loc = cluster_loc.clone().stimulus(si);
        if !stim.is_object() {
            findings.push(Finding::error(
                Category::Structural,
                stim_loc,
                "stim is not an object",
            ));
            continue;
        }
        findings.extend(check_fields(stim, STIM_RULES, &stim_loc));
        content_heuristics(stim, &stim_loc, findings);
    }
}

/// Duplicate `correctResponse` values within one cluster would make answers
/// ambiguous at runtime.
fn check_duplicate_responses(stims: &[Value], cluster_loc: &Location, findings: &mut Vec<Finding>) {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for stim in stims {
        if let Some(answer) = lookup(stim, "response.correctResponse").and_then(Value::as_str)
            && !seen.insert(answer)
        {
            duplicates.insert(answer);
        }
    }
    if !duplicates.is_empty() {
        let values: Vec<&str> = duplicates.into_iter().collect();
        findings.push(Finding::error(
            Category::Structural,
            cluster_loc.clone().field("stims"),
            format!("duplicate correctResponse values: {}", values.join(", ")),
        ));
    }
}

/// Non-fatal content signals: question-like text without distractors, and
/// response strings carrying U+0080..U+00FF code points that downstream
/// processing strips.
fn content_heuristics(stim: &Value, stim_loc: &Location, findings: &mut Vec<Finding>) {
    let incorrect = lookup(stim, "response.incorrectResponses");

    if incorrect.is_none() {
        let text = lookup(stim, "display.text")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_lowercase();
        if QUESTION_MARKERS.iter().any(|marker| text.contains(marker)) {
            findings.push(Finding::warning(
                Category::Content,
                stim_loc.clone(),
                "appears to be a question but is missing incorrectResponses",
            ));
        }
    }

    if let Some(answer) = lookup(stim, "response.correctResponse").and_then(Value::as_str)
        && has_invisible_chars(answer)
    {
        findings.push(Finding::warning(
            Category::Content,
            stim_loc.clone().field("response.correctResponse"),
            "correctResponse contains invisible unicode characters that will be removed",
        ));
    }

    match incorrect {
        Some(Value::String(s)) if has_invisible_chars(s) => {
            findings.push(Finding::warning(
                Category::Content,
                stim_loc.clone().field("response.incorrectResponses"),
                "incorrectResponses contains invisible unicode characters that will be removed",
            ));
        }
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                if let Some(s) = item.as_str()
                    && has_invisible_chars(s)
                {
                    findings.push(Finding::warning(
                        Category::Content,
                        stim_loc
                            .clone()
                            .field(&format!("response.incorrectResponses[{}]", i)),
                        "incorrectResponses entry contains invisible unicode characters that will be removed",
                    ));
                }
            }
        }
        _ => {}
    }
}

fn has_invisible_chars(s: &str) -> bool {
    s.chars().any(|c| ('\u{0080}'..='\u{00FF}').contains(&c))
}

/// The set of 0-based cluster indices a stimulus document defines.
///
/// `None` when the clusters array is missing, malformed, or empty — those
/// cases already carry structural errors and must not produce an index set.
pub fn cluster_index_set(doc: &Value) -> Option<BTreeSet<usize>> {
    let clusters = lookup(doc, "setspec.clusters")?.as_array()?;
    if clusters.is_empty() {
        return None;
    }
    Some((0..clusters.len()).collect())
}
