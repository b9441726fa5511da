pub mod collection_rules;
pub mod iter_rules;
pub mod registry;
pub mod sort_rules;
pub mod string_rules;

use crate::engine::AnalysisContext;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// The closed set of patterns the detectors recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionKind {
    StringConcatInLoop,
    ListAppendInLoop,
    RangeLenIteration,
    MembershipTestOnSequence,
    SortInsideLoop,
}

impl DetectionKind {
    /// Report `type` string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionKind::StringConcatInLoop => "string_concat_in_loop",
            DetectionKind::ListAppendInLoop => "list_append",
            DetectionKind::RangeLenIteration => "range_len",
            DetectionKind::MembershipTestOnSequence => "membership_test",
            DetectionKind::SortInsideLoop => "sort_in_loop",
        }
    }

    /// Report key naming the finding's subject, if the kind has one.
    pub fn subject_key(&self) -> Option<&'static str> {
        match self {
            DetectionKind::StringConcatInLoop => Some("variable"),
            DetectionKind::ListAppendInLoop => Some("listName"),
            DetectionKind::RangeLenIteration => Some("sequence"),
            DetectionKind::MembershipTestOnSequence => Some("container"),
            DetectionKind::SortInsideLoop => None,
        }
    }

    pub fn suggestion(&self) -> &'static str {
        match self {
            DetectionKind::StringConcatInLoop => "Use ''.join(...) instead of += in a loop.",
            DetectionKind::ListAppendInLoop => {
                "Consider using a list comprehension instead of append in loop."
            }
            DetectionKind::RangeLenIteration => "Use enumerate() instead of range(len(...)).",
            DetectionKind::MembershipTestOnSequence => {
                "Convert list to set for faster membership tests."
            }
            DetectionKind::SortInsideLoop => {
                "Move sorting outside loop to avoid O(n log n) each iteration."
            }
        }
    }
}

impl std::fmt::Display for DetectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported occurrence of a recognised pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: DetectionKind,
    /// 1-indexed line of the matched node.
    pub line: usize,
    pub subject: Option<String>,
    pub suggestion: String,
}

impl Finding {
    pub fn new(kind: DetectionKind, line: usize, subject: Option<String>) -> Self {
        Self {
            kind,
            line,
            subject,
            suggestion: kind.suggestion().to_string(),
        }
    }
}

impl Serialize for Finding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.kind.as_str())?;
        map.serialize_entry("lineno", &self.line)?;
        if let (Some(key), Some(subject)) = (self.kind.subject_key(), &self.subject) {
            map.serialize_entry(key, subject)?;
        }
        map.serialize_entry("suggestion", &self.suggestion)?;
        map.end()
    }
}

/// A detector: one independent, total pass over the tree.
pub trait Rule: Send + Sync {
    /// Unique identifier for this rule (e.g., "range-len-iteration")
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Description of what this rule checks
    fn description(&self) -> &'static str;

    /// The kind of every finding this rule emits
    fn kind(&self) -> DetectionKind;

    /// Run the check and return findings in document order
    fn check(&self, ctx: &AnalysisContext) -> Vec<Finding>;
}
