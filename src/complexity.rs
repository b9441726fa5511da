//! Heuristic time and space complexity estimates.
//!
//! These are classifications, not bounds: loop nesting is purely lexical and
//! sort calls are noted alongside the loop estimate rather than multiplied
//! into it.

use crate::ast::visit::{self, LoopDepth, Visitor};
use crate::ast::{Module, Node, NodeKind};
use crate::rules::{DetectionKind, Finding};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeDetails {
    pub max_loop_nesting: usize,
    /// Lines of every `sorted(...)` / `.sort()` call.
    pub sort_calls: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEstimate {
    pub summary: String,
    pub details: TimeDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceDetails {
    pub list_comprehensions: usize,
    /// `(line, receiver)` of every `name.append(...)` call.
    pub list_appends: Vec<(usize, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceEstimate {
    pub summary: String,
    pub details: SpaceDetails,
}

/// Deepest lexical nesting of `for` / `while` loops. `async for` is not counted.
pub fn max_loop_nesting(module: &Module) -> usize {
    struct NestingVisitor {
        depth: LoopDepth,
    }

    impl Visitor for NestingVisitor {
        fn visit_node(&mut self, node: &Node) {
            let is_loop = matches!(
                node.kind,
                NodeKind::For {
                    is_async: false,
                    ..
                } | NodeKind::While { .. }
            );
            if is_loop {
                self.depth.enter_loop();
                visit::walk_node(self, node);
                self.depth.exit_loop();
            } else {
                visit::walk_node(self, node);
            }
        }
    }

    let mut visitor = NestingVisitor {
        depth: LoopDepth::new(),
    };
    visitor.visit_module(module);
    visitor.depth.max
}

/// Number of list comprehensions anywhere in the tree.
pub fn count_list_comprehensions(module: &Module) -> usize {
    struct CompCounter(usize);

    impl Visitor for CompCounter {
        fn visit_node(&mut self, node: &Node) {
            if let NodeKind::ListComp { .. } = node.kind {
                self.0 += 1;
            }
            visit::walk_node(self, node);
        }
    }

    let mut counter = CompCounter(0);
    counter.visit_module(module);
    counter.0
}

/// Classify running time from loop nesting, annotated with any sort calls.
///
/// `findings` are the detector results; only sort findings are consulted.
pub fn estimate_time(module: &Module, findings: &[Finding]) -> TimeEstimate {
    let max_loops = max_loop_nesting(module);
    let sort_calls: Vec<usize> = findings
        .iter()
        .filter(|f| f.kind == DetectionKind::SortInsideLoop)
        .map(|f| f.line)
        .collect();

    let mut summary = match max_loops {
        0 => "O(n) or O(1) (no loops detected)".to_string(),
        1 => "Heuristic: O(n) (one loop).".to_string(),
        n => format!("Heuristic: O(n^{n}) (max loop nesting={n})"),
    };
    if !sort_calls.is_empty() {
        summary.push_str(&format!(
            " Sorting detected at lines {:?} (O(n log n)).",
            sort_calls
        ));
    }

    TimeEstimate {
        summary,
        details: TimeDetails {
            max_loop_nesting: max_loops,
            sort_calls,
        },
    }
}

/// Classify extra space from comprehensions and append-built lists.
pub fn estimate_space(module: &Module, findings: &[Finding]) -> SpaceEstimate {
    let list_comprehensions = count_list_comprehensions(module);
    let list_appends: Vec<(usize, String)> = findings
        .iter()
        .filter(|f| f.kind == DetectionKind::ListAppendInLoop)
        .map(|f| (f.line, f.subject.clone().unwrap_or_default()))
        .collect();

    let summary = if list_comprehensions > 0 || !list_appends.is_empty() {
        "Heuristic: O(n) (building new containers)."
    } else {
        "Heuristic: O(1) (no major containers built)."
    };

    SpaceEstimate {
        summary: summary.to_string(),
        details: SpaceDetails {
            list_comprehensions,
            list_appends,
        },
    }
}
