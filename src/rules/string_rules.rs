use super::{DetectionKind, Finding, Rule};
use crate::ast::visit::{self, Visitor};
use crate::ast::{Node, NodeKind, Operator};
use crate::engine::AnalysisContext;

/// Detects `name += value`, the string-building idiom that is quadratic in a loop.
///
/// Matches anywhere in the tree, not only inside loop bodies.
pub struct StringConcatInLoopRule;

impl Rule for StringConcatInLoopRule {
    fn id(&self) -> &'static str {
        "string-concat-in-loop"
    }

    fn name(&self) -> &'static str {
        "String Concatenation in Loop"
    }

    fn description(&self) -> &'static str {
        "Detects `name += value` augmented additions to a bare name"
    }

    fn kind(&self) -> DetectionKind {
        DetectionKind::StringConcatInLoop
    }

    fn check(&self, ctx: &AnalysisContext) -> Vec<Finding> {
        let mut visitor = StringConcatVisitor {
            findings: Vec::new(),
        };
        visitor.visit_module(ctx.module);
        visitor.findings
    }
}

struct StringConcatVisitor {
    findings: Vec<Finding>,
}

impl Visitor for StringConcatVisitor {
    fn visit_node(&mut self, node: &Node) {
        if let NodeKind::AugAssign {
            target,
            op: Operator::Add,
            ..
        } = &node.kind
        {
            if let Some(name) = target.as_name() {
                self.findings.push(Finding::new(
                    DetectionKind::StringConcatInLoop,
                    node.line(),
                    Some(name.to_string()),
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
        StringConcatInLoopRule.check(&ctx)
    }

    #[test]
    fn test_detects_concat_in_loop() {
        let findings = check("s = ''\nfor w in words:\n    s += w\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 3);
        assert_eq!(findings[0].subject.as_deref(), Some("s"));
    }

    #[test]
    fn test_matches_outside_loops_too() {
        let findings = check("total = 0\ntotal += 1\n");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_ignores_other_operators_and_attribute_targets() {
        let findings = check("n -= 1\nself.buf += chunk\nitems[0] += 1\n");
        assert!(findings.is_empty());
    }

    #[test]
    fn test_finds_nested_in_function() {
        let findings = check("def build(parts):\n    out = ''\n    while parts:\n        out += parts.pop()\n    return out\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 4);
    }
}
