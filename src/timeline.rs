//! Execution-order reconstruction for a validated TDF document.
//!
//! A pure, read-only projection over `tutor.unit`: declared order is the
//! execution order, no reordering. Assumes validation has already rejected
//! malformed units and does not re-validate; malformed scraps are simply
//! skipped. Building a timeline never affects the package verdict.

use crate::rangelist::parse_range_list;
use crate::rules::lookup;
use crate::tdf::coerce_cluster_index;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Whether an execution step drills practice items or runs an assessment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Practice,
    Assessment,
}

/// Assessment-session metadata attached to a timeline unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// The raw clusterlist string as authored, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clusterlist: Option<String>,
    /// The cluster indices the clusterlist resolves to.
    pub clusters: BTreeSet<usize>,
}

/// One reconstructed execution step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineUnit {
    /// Ordinal position in `tutor.unit` (0-based).
    pub position: usize,
    pub kind: UnitKind,
    /// All cluster indices the unit references: `clusterIndex` unioned with
    /// the session's resolved clusterlist.
    pub clusters: BTreeSet<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionInfo>,
}

/// Build the ordered execution timeline from a validated TDF document.
pub fn build_timeline(doc: &Value) -> Vec<TimelineUnit> {
    let Some(units) = lookup(doc, "tutor.unit").and_then(Value::as_array) else {
        return Vec::new();
    };

    units
        .iter()
        .enumerate()
        .map(|(position, unit)| {
            let mut clusters = BTreeSet::new();
            if let Some(index) = unit.get("clusterIndex").and_then(coerce_cluster_index)
                && index >= 0
            {
                clusters.insert(index as usize);
            }

            let session = unit
                .get("assessmentsession")
                .filter(|s| s.is_object())
                .map(|s| {
                    let clusterlist = s
                        .get("clusterlist")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    let resolved = clusterlist
                        .as_deref()
                        .and_then(|list| parse_range_list(list).ok())
                        .unwrap_or_default();
                    SessionInfo {
                        clusterlist,
                        clusters: resolved,
                    }
                });

            if let Some(session) = &session {
                clusters.extend(session.clusters.iter().copied());
            }

            TimelineUnit {
                position,
                kind: if session.is_some() {
                    UnitKind::Assessment
                } else {
                    UnitKind::Practice
                },
                clusters,
                session,
            }
        })
        .collect()
}
