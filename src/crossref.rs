//! Cross-reference resolution across the whole document set.
//!
//! This is the one stage that must see every validated document at once:
//! TDF → stimulus pairing, cluster-index membership, and media references
//! against the archive entry list. The three passes run independently and
//! their findings are concatenated in a fixed order (pairing, cluster
//! indices, media), each in document-then-unit/cluster order, so output is
//! deterministic. Nothing here mutates the input documents.

use crate::error::{Category, Finding, Location};
use crate::rangelist::parse_range_list;
use crate::rules::lookup;
use crate::stimulus::cluster_index_set;
use crate::tdf::coerce_cluster_index;
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://").unwrap());

const MEDIA_FIELDS: [&str; 3] = ["audioSrc", "imgSrc", "videoSrc"];

/// Resolve all cross-references between TDF documents, stimulus documents,
/// and archive entries.
pub fn resolve(
    stim_docs: &BTreeMap<String, Value>,
    tdf_docs: &BTreeMap<String, Value>,
    archive_entries: &BTreeSet<String>,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let pairable = check_pairing(stim_docs, tdf_docs, &mut findings);
    for (tdf_name, stim_name) in &pairable {
        check_cluster_references(tdf_name, &tdf_docs[tdf_name], stim_name, &stim_docs[stim_name], &mut findings);
    }
    for (name, doc) in stim_docs {
        check_media_references(name, doc, archive_entries, &mut findings);
    }

    findings
}

/// Pair each TDF with its declared stimulus file. Returns the pairable
/// (tdf, stimulus) name pairs; unpairable TDFs get an error. Zero pairable
/// pairs over a non-empty package is the headline package-level failure.
fn check_pairing(
    stim_docs: &BTreeMap<String, Value>,
    tdf_docs: &BTreeMap<String, Value>,
    findings: &mut Vec<Finding>,
) -> Vec<(String, String)> {
    let mut pairable = Vec::new();

    for (name, doc) in tdf_docs {
        // A TDF with no usable stimulusfile already carries a structural
        // error; pairing has nothing to check.
        let Some(stim_name) = lookup(doc, "tutor.setspec.stimulusfile").and_then(Value::as_str)
        else {
            continue;
        };
        if stim_docs.contains_key(stim_name) {
            pairable.push((name.clone(), stim_name.to_string()));
        } else {
            findings.push(Finding::error(
                Category::CrossReference,
                Location::tdf(name).field("tutor.setspec.stimulusfile"),
                format!(
                    "references stimulus file '{}' which was not found in package",
                    stim_name
                ),
            ));
        }
    }

    if pairable.is_empty() && !tdf_docs.is_empty() && !stim_docs.is_empty() {
        findings.push(Finding::error(
            Category::CrossReference,
            Location::package(),
            "no valid TDF-stimulus file pairs found",
        ));
    }

    pairable
}

/// Verify every cluster index a TDF unit references exists in the paired
/// stimulus document. Skipped entirely when the stimulus document has no
/// well-formed cluster list (its own validation already failed).
fn check_cluster_references(
    tdf_name: &str,
    tdf: &Value,
    stim_name: &str,
    stim: &Value,
    findings: &mut Vec<Finding>,
) {
    let Some(defined) = cluster_index_set(stim) else {
        return;
    };
    let count = defined.len();
    let loc = Location::tdf(tdf_name);

    let mut report = |index: i64, ui: usize, field: String| {
        findings.push(Finding::error(
            Category::CrossReference,
            loc.clone().unit(ui).field(&field),
            format!(
                "references cluster index {}, but stimulus file '{}' only has {} clusters",
                index, stim_name, count
            ),
        ));
    };

    for array in ["tutor.unit", "tutor.unitTemplate"] {
        let Some(units) = lookup(tdf, array).and_then(Value::as_array) else {
            continue;
        };
        for (ui, unit) in units.iter().enumerate() {
            if let Some(index) = unit.get("clusterIndex").and_then(coerce_cluster_index)
                && (index < 0 || !defined.contains(&(index as usize)))
            {
                report(index, ui, format!("{}[{}].clusterIndex", array, ui));
            }

            if let Some(clusterlist) = lookup(unit, "assessmentsession.clusterlist")
                .and_then(Value::as_str)
                // A malformed clusterlist was already reported by TDF
                // validation; only well-formed lists are range-checked.
                && let Ok(listed) = parse_range_list(clusterlist)
            {
                for index in listed {
                    if !defined.contains(&index) {
                        report(
                            index as i64,
                            ui,
                            format!("{}[{}].assessmentsession.clusterlist", array, ui),
                        );
                    }
                }
            }
        }
    }
}

/// Every media source must be an HTTP(S) URL or name a present archive
/// entry. Media file *content* is never inspected.
fn check_media_references(
    name: &str,
    doc: &Value,
    archive_entries: &BTreeSet<String>,
    findings: &mut Vec<Finding>,
) {
    let Some(clusters) = lookup(doc, "setspec.clusters").and_then(Value::as_array) else {
        return;
    };
    for (ci, cluster) in clusters.iter().enumerate() {
        let Some(stims) = cluster.get("stims").and_then(Value::as_array) else {
            continue;
        };
        for (si, stim) in stims.iter().enumerate() {
            for field in MEDIA_FIELDS {
                let Some(src) = lookup(stim, "display")
                    .and_then(|d| d.get(field))
                    .and_then(Value::as_str)
                else {
                    continue;
                };
                if !URL_RE.is_match(src) && !archive_entries.contains(src) {
                    findings.push(Finding::error(
                        Category::CrossReference,
                        Location::stim_file(name)
                            .cluster(ci)
                            .stimulus(si)
                            .field(&format!("display.{}", field)),
                        format!("references {} '{}' which was not found in package", field, src),
                    ));
                }
            }
        }
    }
}
