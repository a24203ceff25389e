//! Generic declarative field checking.
//!
//! Stimulus and TDF validation express their per-document shape as tables of
//! [`FieldRule`]s consumed by [`check_fields`], so a new field is added by
//! extending a table rather than duplicating control flow. This module is
//! pure and stateless: it never reads the archive or other documents.

use crate::error::{Category, Finding, Location};
use serde_json::Value;

/// Whether a field must be present or may be absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// Expected JSON kind for a field value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
    /// A bare string or an array (of strings, refined by the rule's check).
    StringOrArray,
    /// A number or a string holding one (e.g. `clusterIndex`).
    NumberOrString,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Array => value.is_array(),
            FieldKind::Object => value.is_object(),
            FieldKind::StringOrArray => value.is_string() || value.is_array(),
            FieldKind::NumberOrString => value.is_number() || value.is_string(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            FieldKind::String => "a string",
            FieldKind::Number => "a number",
            FieldKind::Boolean => "a boolean",
            FieldKind::Array => "an array",
            FieldKind::Object => "an object",
            FieldKind::StringOrArray => "a string or an array",
            FieldKind::NumberOrString => "a number or a string",
        }
    }
}

/// Refinement predicate: returns a message when the (type-correct) value is
/// still unacceptable.
pub type Refinement = fn(&Value) -> Option<String>;

/// One declarative rule: dotted field path, presence, expected kind, and an
/// optional refinement applied only when the type check passes.
pub struct FieldRule {
    pub path: &'static str,
    pub presence: Presence,
    pub kind: FieldKind,
    pub check: Option<Refinement>,
}

impl FieldRule {
    pub const fn required(path: &'static str, kind: FieldKind) -> Self {
        FieldRule {
            path,
            presence: Presence::Required,
            kind,
            check: None,
        }
    }

    pub const fn optional(path: &'static str, kind: FieldKind) -> Self {
        FieldRule {
            path,
            presence: Presence::Optional,
            kind,
            check: None,
        }
    }

    pub const fn with_check(mut self, check: Refinement) -> Self {
        self.check = Some(check);
        self
    }
}

/// Resolve a dotted path against a value tree.
pub fn lookup<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(tree, |value, segment| value.get(segment))
}

/// Apply a rule table to a value tree, collecting all findings.
///
/// Evaluation order: every missing required field first (a rule nested under
/// an already-missing required path is not re-reported), then type checks for
/// every present field, then refinements for fields whose type check passed.
pub fn check_fields(tree: &Value, rules: &[FieldRule], location: &Location) -> Vec<Finding> {
    let mut findings = Vec::new();

    let mut missing: Vec<&str> = Vec::new();
    for rule in rules {
        if rule.presence == Presence::Required && lookup(tree, rule.path).is_none() {
            if missing.iter().any(|m| is_path_prefix(m, rule.path)) {
                continue;
            }
            missing.push(rule.path);
            findings.push(Finding::error(
                Category::Structural,
                location.clone().field(rule.path),
                format!("missing required field '{}'", rule.path),
            ));
        }
    }

    for rule in rules {
        if let Some(value) = lookup(tree, rule.path)
            && !rule.kind.matches(value)
        {
            findings.push(Finding::error(
                Category::Structural,
                location.clone().field(rule.path),
                format!("'{}' must be {}", rule.path, rule.kind.describe()),
            ));
        }
    }

    for rule in rules {
        if let Some(check) = rule.check
            && let Some(value) = lookup(tree, rule.path)
            && rule.kind.matches(value)
            && let Some(message) = check(value)
        {
            findings.push(Finding::error(
                Category::Structural,
                location.clone().field(rule.path),
                message,
            ));
        }
    }

    findings
}

/// True when `prefix` is a proper dotted-path ancestor of `path`.
fn is_path_prefix(prefix: &str, path: &str) -> bool {
    path.len() > prefix.len()
        && path.starts_with(prefix)
        && path.as_bytes()[prefix.len()] == b'.'
}
