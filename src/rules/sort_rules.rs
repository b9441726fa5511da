use super::{DetectionKind, Finding, Rule};
use crate::ast::visit::{self, Visitor};
use crate::ast::{Node, NodeKind};
use crate::engine::AnalysisContext;

/// Detects `sorted(...)` and `.sort(...)` calls.
///
/// Matches anywhere in the tree; the enclosing loop, if any, is not recorded.
pub struct SortInsideLoopRule;

impl Rule for SortInsideLoopRule {
    fn id(&self) -> &'static str {
        "sort-in-loop"
    }

    fn name(&self) -> &'static str {
        "Sort in Loop"
    }

    fn description(&self) -> &'static str {
        "Detects `sorted(...)` and `.sort()` calls, O(n log n) each time they run"
    }

    fn kind(&self) -> DetectionKind {
        DetectionKind::SortInsideLoop
    }

    fn check(&self, ctx: &AnalysisContext) -> Vec<Finding> {
        let mut visitor = SortVisitor {
            findings: Vec::new(),
        };
        visitor.visit_module(ctx.module);
        visitor.findings
    }
}

struct SortVisitor {
    findings: Vec<Finding>,
}

impl Visitor for SortVisitor {
    fn visit_node(&mut self, node: &Node) {
        if let NodeKind::Call { func, .. } = &node.kind {
            let is_sort = match &func.kind {
                NodeKind::Name(id) => id == "sorted",
                NodeKind::Attribute { attr, .. } => attr == "sort",
                _ => false,
            };
            if is_sort {
                self.findings.push(Finding::new(
                    DetectionKind::SortInsideLoop,
                    node.line(),
                    None,
                ));
            }
        }
        visit::walk_node(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::parser::parse_module;

    fn check(source: &str) -> Vec<Finding> {
        let module = parse_module(source).unwrap();
        let ctx = AnalysisContext::new(&module);
        SortInsideLoopRule.check(&ctx)
    }

    #[test]
    fn test_detects_free_function_and_method() {
        let findings = check("a = sorted(xs)\nfor y in ys:\n    y.parts.sort()\n");
        let lines: Vec<_> = findings.iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![1, 3]);
        assert!(findings.iter().all(|f| f.subject.is_none()));
    }

    #[test]
    fn test_ignores_lookalikes() {
        let findings = check("sort(xs)\nxs.sorted()\nsorted\n");
        assert!(findings.is_empty());
    }

    #[test]
    fn test_nested_sort_calls() {
        let findings = check("sorted(sorted(xs))\n");
        assert_eq!(findings.len(), 2);
    }
}
