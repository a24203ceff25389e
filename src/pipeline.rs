//! Orchestration: archive index, fixed-order validation stages, verdict.

use crate::crossref;
use crate::error::{Category, Finding, Location, Severity};
use crate::parse::parse;
use crate::stimulus::validate_stimulus;
use crate::tdf::validate_tdf;
use crate::timeline::{TimelineUnit, build_timeline};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// The entry names and JSON text of one content package, as provided by the
/// archive-reading collaborator. Immutable once built; entry names are
/// case-sensitive.
#[derive(Clone, Debug, Default)]
pub struct ArchiveIndex {
    json_entries: BTreeMap<String, String>,
    media_entries: BTreeSet<String>,
}

impl ArchiveIndex {
    pub fn new() -> Self {
        ArchiveIndex::default()
    }

    /// Register a JSON entry (TDF or stimulus; classification happens during
    /// the run) with its decoded text.
    pub fn add_json(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.json_entries.insert(name.into(), text.into());
    }

    /// Register a non-JSON (media) entry.
    pub fn add_media(&mut self, name: impl Into<String>) {
        self.media_entries.insert(name.into());
    }

    /// All entry names in the package, JSON and media alike.
    pub fn entry_names(&self) -> BTreeSet<String> {
        self.json_entries
            .keys()
            .chain(self.media_entries.iter())
            .cloned()
            .collect()
    }
}

/// Discovered file counts by kind. JSON entries that failed to parse are
/// counted under neither kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCounts {
    pub tdf: usize,
    pub stim: usize,
    pub media: usize,
}

/// Terminal aggregate of one validation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// All findings, in stage order (syntax, package structure, stimulus,
    /// TDF, cross-reference), each stage in filename order.
    pub findings: Vec<Finding>,
    pub error_count: usize,
    pub warning_count: usize,
    pub counts: FileCounts,
}

impl Verdict {
    fn new(findings: Vec<Finding>, counts: FileCounts) -> Self {
        let error_count = findings.iter().filter(|f| f.is_error()).count();
        let warning_count = findings.len() - error_count;
        Verdict {
            findings,
            error_count,
            warning_count,
            counts,
        }
    }

    /// The package passes iff no error-severity finding exists. Warnings
    /// never fail a package.
    pub fn passed(&self) -> bool {
        self.error_count == 0
    }

    /// Process exit-code mapping: 0 on pass, 1 on fail.
    pub fn exit_code(&self) -> i32 {
        if self.passed() { 0 } else { 1 }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }
}

/// Runs the validation stages in a fixed order over one archive index and
/// aggregates all findings into a [`Verdict`].
///
/// Construction parses and classifies every JSON entry; [`run`](Self::run)
/// performs the per-document and cross-document stages. Both are
/// deterministic: the same index always yields an identical verdict.
pub struct ValidationPipeline {
    stim_docs: BTreeMap<String, Value>,
    tdf_docs: BTreeMap<String, Value>,
    entry_names: BTreeSet<String>,
    media_count: usize,
    parse_findings: Vec<Finding>,
}

impl ValidationPipeline {
    /// Parse and classify every JSON entry. A syntax error fails that file
    /// outright (one error finding, file dropped from later stages) without
    /// affecting sibling files.
    pub fn new(index: &ArchiveIndex) -> Self {
        let mut stim_docs = BTreeMap::new();
        let mut tdf_docs = BTreeMap::new();
        let mut parse_findings = Vec::new();

        for (name, text) in &index.json_entries {
            match parse(text) {
                Ok(doc) => {
                    // A stimulus file is recognized by its top-level setspec.
                    if doc.get("setspec").is_some() {
                        stim_docs.insert(name.clone(), doc);
                    } else {
                        tdf_docs.insert(name.clone(), doc);
                    }
                }
                Err(e) => parse_findings.push(Finding::error(
                    Category::Syntax,
                    Location::entry(name),
                    format!("invalid JSON: {}", e),
                )),
            }
        }

        ValidationPipeline {
            stim_docs,
            tdf_docs,
            entry_names: index.entry_names(),
            media_count: index.media_entries.len(),
            parse_findings,
        }
    }

    /// Run all remaining stages and aggregate the verdict.
    pub fn run(&self) -> Verdict {
        let mut findings = self.parse_findings.clone();

        if self.tdf_docs.is_empty() {
            findings.push(Finding::error(
                Category::Structural,
                Location::package(),
                "no TDF files found in package",
            ));
        }
        if self.stim_docs.is_empty() {
            findings.push(Finding::error(
                Category::Structural,
                Location::package(),
                "no stimulus files found in package",
            ));
        }

        for (name, doc) in &self.stim_docs {
            findings.extend(validate_stimulus(doc, name));
        }
        for (name, doc) in &self.tdf_docs {
            findings.extend(validate_tdf(doc, name));
        }

        findings.extend(crossref::resolve(
            &self.stim_docs,
            &self.tdf_docs,
            &self.entry_names,
        ));

        Verdict::new(
            findings,
            FileCounts {
                tdf: self.tdf_docs.len(),
                stim: self.stim_docs.len(),
                media: self.media_count,
            },
        )
    }

    /// Build the execution timeline for one TDF by filename. `None` when no
    /// such TDF was classified. Requesting (or skipping) a timeline never
    /// changes the verdict.
    pub fn timeline(&self, tdf_name: &str) -> Option<Vec<TimelineUnit>> {
        self.tdf_docs.get(tdf_name).map(build_timeline)
    }

    /// Filenames of the classified TDF documents, in order.
    pub fn tdf_names(&self) -> impl Iterator<Item = &str> {
        self.tdf_docs.keys().map(String::as_str)
    }
}
