//! Default-walking visitor over the structural tree.
//!
//! Implementors override [`Visitor::visit_node`], inspect the node, and call
//! [`walk_node`] to continue into its children.

use super::{Module, Node, NodeKind};

pub trait Visitor {
    fn visit_module(&mut self, module: &Module) {
        walk_module(self, module);
    }

    fn visit_node(&mut self, node: &Node) {
        walk_node(self, node);
    }
}

pub fn walk_module<V: Visitor + ?Sized>(visitor: &mut V, module: &Module) {
    for stmt in &module.body {
        visitor.visit_node(stmt);
    }
}

/// Visit the children of `node` in document order.
pub fn walk_node<V: Visitor + ?Sized>(visitor: &mut V, node: &Node) {
    match &node.kind {
        NodeKind::Assign { targets, value } => {
            walk_all(visitor, targets);
            visitor.visit_node(value);
        }
        NodeKind::AnnAssign {
            target,
            annotation,
            value,
        } => {
            visitor.visit_node(target);
            visitor.visit_node(annotation);
            if let Some(value) = value {
                visitor.visit_node(value);
            }
        }
        NodeKind::AugAssign { target, value, .. } => {
            visitor.visit_node(target);
            visitor.visit_node(value);
        }
        NodeKind::Expr(inner) | NodeKind::Starred(inner) => visitor.visit_node(inner),
        NodeKind::For {
            target,
            iter,
            body,
            orelse,
            ..
        } => {
            visitor.visit_node(target);
            visitor.visit_node(iter);
            walk_all(visitor, body);
            walk_all(visitor, orelse);
        }
        NodeKind::While { test, body, orelse } => {
            visitor.visit_node(test);
            walk_all(visitor, body);
            walk_all(visitor, orelse);
        }
        NodeKind::Name(_) => {}
        NodeKind::Attribute { value, .. } => visitor.visit_node(value),
        NodeKind::Call {
            func,
            args,
            keywords,
        } => {
            visitor.visit_node(func);
            walk_all(visitor, args);
            walk_all(visitor, keywords);
        }
        NodeKind::Keyword { value, .. } => visitor.visit_node(value),
        NodeKind::Compare {
            left, comparators, ..
        } => {
            visitor.visit_node(left);
            walk_all(visitor, comparators);
        }
        NodeKind::List { elts } => walk_all(visitor, elts),
        NodeKind::ListComp { elt, generators } => {
            visitor.visit_node(elt);
            walk_all(visitor, generators);
        }
        NodeKind::Comprehension {
            target, iter, ifs, ..
        } => {
            visitor.visit_node(target);
            visitor.visit_node(iter);
            walk_all(visitor, ifs);
        }
        NodeKind::Other { children, .. } => walk_all(visitor, children),
    }
}

fn walk_all<V: Visitor + ?Sized>(visitor: &mut V, nodes: &[Node]) {
    for node in nodes {
        visitor.visit_node(node);
    }
}

/// Tracks lexical loop nesting while walking.
///
/// Embed this in a visitor and bracket loop nodes with
/// [`enter_loop`](LoopDepth::enter_loop) / [`exit_loop`](LoopDepth::exit_loop).
#[derive(Debug, Default)]
pub struct LoopDepth {
    pub current: usize,
    pub max: usize,
}

impl LoopDepth {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn enter_loop(&mut self) {
        self.current += 1;
        self.max = self.max.max(self.current);
    }

    #[inline]
    pub fn exit_loop(&mut self) {
        self.current = self.current.saturating_sub(1);
    }
}
