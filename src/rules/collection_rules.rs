use super::{DetectionKind, Finding, Rule};
use crate::ast::visit::{self, Visitor};
use crate::ast::{CmpOp, Node, NodeKind};
use crate::engine::AnalysisContext;

/// Detects `name.append(...)` calls, candidates for a list comprehension.
///
/// Matches anywhere in the tree, not only inside loop bodies.
pub struct ListAppendInLoopRule;

impl Rule for ListAppendInLoopRule {
    fn id(&self) -> &'static str {
        "list-append-in-loop"
    }

    fn name(&self) -> &'static str {
        "List Append in Loop"
    }

    fn description(&self) -> &'static str {
        "Detects `name.append(...)` calls that could be a list comprehension"
    }

    fn kind(&self) -> DetectionKind {
        DetectionKind::ListAppendInLoop
    }

    fn check(&self, ctx: &AnalysisContext) -> Vec<Finding> {
        let mut visitor = ListAppendVisitor {
            findings: Vec::new(),
        };
        visitor.visit_module(ctx.module);
        visitor.findings
    }
}

struct ListAppendVisitor {
    findings: Vec<Finding>,
}

impl Visitor for ListAppendVisitor {
    fn visit_node(&mut self, node: &Node) {
        if let NodeKind::Call { func, .. } = &node.kind {
            if let NodeKind::Attribute { value, attr } = &func.kind {
                if let (Some(receiver), "append") = (value.as_name(), attr.as_str()) {
                    self.findings.push(Finding::new(
                        DetectionKind::ListAppendInLoop,
                        node.line(),
                        Some(receiver.to_string()),
                    ));
                }
            }
        }
        visit::walk_node(self, node);
    }
}

/// Detects `x in name`, a linear scan when `name` is a list.
pub struct MembershipTestRule;

impl Rule for MembershipTestRule {
    fn id(&self) -> &'static str {
        "membership-test"
    }

    fn name(&self) -> &'static str {
        "Membership Test on Sequence"
    }

    fn description(&self) -> &'static str {
        "Detects `x in name` containment tests against a bare name"
    }

    fn kind(&self) -> DetectionKind {
        DetectionKind::MembershipTestOnSequence
    }

    fn check(&self, ctx: &AnalysisContext) -> Vec<Finding> {
        let mut visitor = MembershipVisitor {
            findings: Vec::new(),
        };
        visitor.visit_module(ctx.module);
        visitor.findings
    }
}

struct MembershipVisitor {
    findings: Vec<Finding>,
}

impl Visitor for MembershipVisitor {
    fn visit_node(&mut self, node: &Node) {
        if let NodeKind::Compare {
            ops, comparators, ..
        } = &node.kind
        {
            // One finding per `in`, always naming the first comparator.
            if let Some(container) = comparators.first().and_then(Node::as_name) {
                for _ in ops.iter().filter(|op| **op == CmpOp::In) {
                    self.findings.push(Finding::new(
                        DetectionKind::MembershipTestOnSequence,
                        node.line(),
                        Some(container.to_string()),
                    ));
                }
            }
        }
        visit::walk_node(self, node);
    }
}
