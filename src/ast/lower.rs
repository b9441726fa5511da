//! Lowering from the tree-sitter concrete syntax tree to [`Node`]s.
//!
//! Lowering is total: any grammar shape that does not fit a dedicated
//! variant falls back to [`NodeKind::Other`] with its children preserved.

use super::{CmpOp, Module, Node, NodeKind, Operator, Span};
use tree_sitter::Node as TsNode;

/// Lower a `module` node. `source` must be the text the tree was parsed from.
pub(crate) fn lower_module(root: TsNode<'_>, source: &str) -> Module {
    let lowerer = Lowerer { source };
    Module {
        body: lowerer.lower_block(root),
    }
}

struct Lowerer<'s> {
    source: &'s str,
}

fn span_of(node: TsNode<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte(), node.start_position().row + 1)
}

/// Named children, minus comments and line continuations.
fn named_children<'t>(node: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

fn starts_with_async(node: TsNode<'_>) -> bool {
    node.child(0).is_some_and(|first| first.kind() == "async")
}

impl<'s> Lowerer<'s> {
    fn text(&self, node: TsNode<'_>) -> &'s str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    fn lower_block(&self, node: TsNode<'_>) -> Vec<Node> {
        named_children(node)
            .into_iter()
            .map(|child| self.lower(child))
            .collect()
    }

    fn lower(&self, node: TsNode<'_>) -> Node {
        let lowered = match node.kind() {
            "expression_statement" => self.lower_expression_statement(node),
            "assignment" => self.lower_assignment(node, span_of(node)),
            "augmented_assignment" => self.lower_aug_assign(node, span_of(node)),
            "for_statement" => self.lower_for(node),
            "while_statement" => self.lower_while(node),
            "identifier" => Some(Node::new(
                NodeKind::Name(self.text(node).to_string()),
                span_of(node),
            )),
            "attribute" => self.lower_attribute(node),
            "call" => self.lower_call(node),
            "keyword_argument" => self.lower_keyword(node),
            "dictionary_splat" => self.lower_single(node).map(|value| {
                Node::new(
                    NodeKind::Keyword {
                        arg: None,
                        value: Box::new(value),
                    },
                    span_of(node),
                )
            }),
            "list_splat" => self
                .lower_single(node)
                .map(|inner| Node::new(NodeKind::Starred(Box::new(inner)), span_of(node))),
            "comparison_operator" => self.lower_compare(node),
            "list" => Some(Node::new(
                NodeKind::List {
                    elts: self.lower_block(node),
                },
                span_of(node),
            )),
            "list_comprehension" => self.lower_list_comp(node),
            // Parentheses are transparent, as in Python's own tree.
            "parenthesized_expression" => self.lower_single(node),
            _ => None,
        };
        lowered.unwrap_or_else(|| self.generic(node))
    }

    fn generic(&self, node: TsNode<'_>) -> Node {
        Node::new(
            NodeKind::Other {
                kind: node.kind(),
                children: self.lower_block(node),
            },
            span_of(node),
        )
    }

    /// Lower a node that wraps exactly one named child.
    fn lower_single(&self, node: TsNode<'_>) -> Option<Node> {
        match named_children(node).as_slice() {
            [only] => Some(self.lower(*only)),
            _ => None,
        }
    }

    fn field(&self, node: TsNode<'_>, name: &str) -> Option<Node> {
        node.child_by_field_name(name).map(|child| self.lower(child))
    }

    fn lower_expression_statement(&self, node: TsNode<'_>) -> Option<Node> {
        let span = span_of(node);
        let children = named_children(node);
        match children.as_slice() {
            [only] => match only.kind() {
                "assignment" => self.lower_assignment(*only, span),
                "augmented_assignment" => self.lower_aug_assign(*only, span),
                _ => Some(Node::new(
                    NodeKind::Expr(Box::new(self.lower(*only))),
                    span,
                )),
            },
            // `a, b` as a statement is an implicit tuple.
            [_, _, ..] => {
                let tuple = Node::new(
                    NodeKind::Other {
                        kind: "expression_list",
                        children: children.iter().map(|c| self.lower(*c)).collect(),
                    },
                    span,
                );
                Some(Node::new(NodeKind::Expr(Box::new(tuple)), span))
            }
            [] => None,
        }
    }

    fn lower_assignment(&self, node: TsNode<'_>, span: Span) -> Option<Node> {
        if let Some(annotation) = node.child_by_field_name("type") {
            return Some(Node::new(
                NodeKind::AnnAssign {
                    target: Box::new(self.field(node, "left")?),
                    annotation: Box::new(self.lower(annotation)),
                    value: self.field(node, "right").map(Box::new),
                },
                span,
            ));
        }

        let mut targets = Vec::new();
        let mut current = node;
        let value = loop {
            targets.push(self.field(current, "left")?);
            let right = current.child_by_field_name("right")?;
            if right.kind() == "assignment" && right.child_by_field_name("type").is_none() {
                current = right;
                continue;
            }
            break self.lower(right);
        };

        Some(Node::new(
            NodeKind::Assign {
                targets,
                value: Box::new(value),
            },
            span,
        ))
    }

    fn lower_aug_assign(&self, node: TsNode<'_>, span: Span) -> Option<Node> {
        let op = Operator::from_augmented(self.text(node.child_by_field_name("operator")?))?;
        Some(Node::new(
            NodeKind::AugAssign {
                target: Box::new(self.field(node, "left")?),
                op,
                value: Box::new(self.field(node, "right")?),
            },
            span,
        ))
    }

    fn lower_else(&self, node: TsNode<'_>) -> Vec<Node> {
        node.child_by_field_name("alternative")
            .and_then(|clause| clause.child_by_field_name("body"))
            .map(|body| self.lower_block(body))
            .unwrap_or_default()
    }

    fn lower_for(&self, node: TsNode<'_>) -> Option<Node> {
        Some(Node::new(
            NodeKind::For {
                is_async: starts_with_async(node),
                target: Box::new(self.field(node, "left")?),
                iter: Box::new(self.field(node, "right")?),
                body: self.lower_block(node.child_by_field_name("body")?),
                orelse: self.lower_else(node),
            },
            span_of(node),
        ))
    }

    fn lower_while(&self, node: TsNode<'_>) -> Option<Node> {
        Some(Node::new(
            NodeKind::While {
                test: Box::new(self.field(node, "condition")?),
                body: self.lower_block(node.child_by_field_name("body")?),
                orelse: self.lower_else(node),
            },
            span_of(node),
        ))
    }

    fn lower_attribute(&self, node: TsNode<'_>) -> Option<Node> {
        let attr = node.child_by_field_name("attribute")?;
        Some(Node::new(
            NodeKind::Attribute {
                value: Box::new(self.field(node, "object")?),
                attr: self.text(attr).to_string(),
            },
            span_of(node),
        ))
    }

    fn lower_call(&self, node: TsNode<'_>) -> Option<Node> {
        let func = self.field(node, "function")?;
        let arguments = node.child_by_field_name("arguments")?;

        let mut args = Vec::new();
        let mut keywords = Vec::new();
        if arguments.kind() == "generator_expression" {
            // `f(x for x in y)` passes the generator as the only argument.
            args.push(self.lower(arguments));
        } else {
            for child in named_children(arguments) {
                let lowered = self.lower(child);
                match lowered.kind {
                    NodeKind::Keyword { .. } => keywords.push(lowered),
                    _ => args.push(lowered),
                }
            }
        }

        Some(Node::new(
            NodeKind::Call {
                func: Box::new(func),
                args,
                keywords,
            },
            span_of(node),
        ))
    }

    fn lower_keyword(&self, node: TsNode<'_>) -> Option<Node> {
        let name = node.child_by_field_name("name")?;
        Some(Node::new(
            NodeKind::Keyword {
                arg: Some(self.text(name).to_string()),
                value: Box::new(self.field(node, "value")?),
            },
            span_of(node),
        ))
    }

    fn lower_compare(&self, node: TsNode<'_>) -> Option<Node> {
        let mut cursor = node.walk();
        let ops = node
            .children_by_field_name("operators", &mut cursor)
            .map(|op| CmpOp::from_token(op.kind()).or_else(|| CmpOp::from_token(self.text(op))))
            .collect::<Option<Vec<_>>>()?;

        let mut operands = named_children(node).into_iter().map(|c| self.lower(c));
        let left = operands.next()?;
        let comparators: Vec<Node> = operands.collect();
        if comparators.len() != ops.len() {
            return None;
        }

        Some(Node::new(
            NodeKind::Compare {
                left: Box::new(left),
                ops,
                comparators,
            },
            span_of(node),
        ))
    }

    fn lower_list_comp(&self, node: TsNode<'_>) -> Option<Node> {
        let body = node.child_by_field_name("body")?;
        let mut generators: Vec<Node> = Vec::new();

        for clause in named_children(node) {
            if clause.id() == body.id() {
                continue;
            }
            match clause.kind() {
                "for_in_clause" => generators.push(self.lower_for_in_clause(clause)?),
                "if_clause" => {
                    let condition = self.lower_single(clause)?;
                    match generators.last_mut().map(|g| &mut g.kind) {
                        Some(NodeKind::Comprehension { ifs, .. }) => ifs.push(condition),
                        _ => return None,
                    }
                }
                _ => return None,
            }
        }

        Some(Node::new(
            NodeKind::ListComp {
                elt: Box::new(self.lower(body)),
                generators,
            },
            span_of(node),
        ))
    }

    fn lower_for_in_clause(&self, clause: TsNode<'_>) -> Option<Node> {
        let mut cursor = clause.walk();
        let rights: Vec<TsNode<'_>> = clause
            .children_by_field_name("right", &mut cursor)
            .filter(|child| child.is_named())
            .collect();

        let iter = match rights.as_slice() {
            [only] => self.lower(*only),
            [first, .., last] => Node::new(
                NodeKind::Other {
                    kind: "expression_list",
                    children: rights.iter().map(|r| self.lower(*r)).collect(),
                },
                span_of(*first).cover(&span_of(*last)),
            ),
            [] => return None,
        };

        Some(Node::new(
            NodeKind::Comprehension {
                is_async: starts_with_async(clause),
                target: Box::new(self.field(clause, "left")?),
                iter: Box::new(iter),
                ifs: Vec::new(),
            },
            span_of(clause),
        ))
    }
}
