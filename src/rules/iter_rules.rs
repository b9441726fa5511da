use super::{DetectionKind, Finding, Rule};
use crate::ast::visit::{self, Visitor};
use crate::ast::{Node, NodeKind};
use crate::engine::AnalysisContext;

/// Detects `for i in range(len(seq))`, which `enumerate(seq)` expresses directly
pub struct RangeLenIterationRule;

impl Rule for RangeLenIterationRule {
    fn id(&self) -> &'static str {
        "range-len-iteration"
    }

    fn name(&self) -> &'static str {
        "Range Over Length"
    }

    fn description(&self) -> &'static str {
        "Detects `for i in range(len(seq))` loops over an index"
    }

    fn kind(&self) -> DetectionKind {
        DetectionKind::RangeLenIteration
    }

    fn check(&self, ctx: &AnalysisContext) -> Vec<Finding> {
        let mut visitor = RangeLenVisitor {
            findings: Vec::new(),
        };
        visitor.visit_module(ctx.module);
        visitor.findings
    }
}

struct RangeLenVisitor {
    findings: Vec<Finding>,
}

/// If `node` is a call to the bare function `name`, return its positional arguments.
fn call_to<'n>(node: &'n Node, name: &str) -> Option<&'n [Node]> {
    match &node.kind {
        NodeKind::Call { func, args, .. } if func.as_name() == Some(name) => Some(args),
        _ => None,
    }
}

fn range_len_sequence(iter: &Node) -> Option<&str> {
    let range_args = call_to(iter, "range")?;
    let len_args = call_to(range_args.first()?, "len")?;
    len_args.first()?.as_name()
}

impl Visitor for RangeLenVisitor {
    fn visit_node(&mut self, node: &Node) {
        if let NodeKind::For {
            is_async: false,
            iter,
            ..
        } = &node.kind
        {
            if let Some(sequence) = range_len_sequence(iter) {
                self.findings.push(Finding::new(
                    DetectionKind::RangeLenIteration,
                    node.line(),
                    Some(sequence.to_string()),
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
        RangeLenIterationRule.check(&ctx)
    }

    #[test]
    fn test_detects_range_len() {
        let findings = check("for i in range(len(arr)):\n    print(arr[i])\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 1);
        assert_eq!(findings[0].subject.as_deref(), Some("arr"));
    }

    #[test]
    fn test_extra_range_arguments_still_match() {
        let findings = check("for i in range(len(arr), 0, -1):\n    pass\n");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_ignores_non_name_sequences() {
        let findings = check(
            "for i in range(len(self.items)):\n    pass\nfor i in range(10):\n    pass\nfor i in range(n):\n    pass\n",
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_ignores_range_len_outside_for_header() {
        let findings = check("idx = list(range(len(arr)))\n");
        assert!(findings.is_empty());
    }

    #[test]
    fn test_detects_nested_loops() {
        let findings = check(
            "for i in range(len(rows)):\n    for j in range(len(cols)):\n        pass\n",
        );
        let names: Vec<_> = findings.iter().filter_map(|f| f.subject.as_deref()).collect();
        assert_eq!(names, vec!["rows", "cols"]);
    }

    #[test]
    fn test_empty_range_call_does_not_match() {
        let findings = check("for i in range():\n    pass\n");
        assert!(findings.is_empty());
    }
}
