//! Serialize a structural tree back to Python source.
//!
//! Nodes that came from the parsed text are emitted verbatim, which keeps
//! the author's formatting and comments. Only synthesized nodes are rendered
//! structurally, so the renderer covers the handful of kinds a rewrite can
//! build.

use super::{Module, Node, NodeKind, Origin};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnparseError {
    #[error("cannot render synthesized `{0}` node")]
    Unsupported(&'static str),

    #[error("span {start}..{end} is outside the source text")]
    OutOfBounds { start: usize, end: usize },
}

/// Render `module`, using `source` for every node that was not synthesized.
///
/// Text between top-level statements (blank lines, comments) is copied from
/// `source` unchanged.
pub fn unparse_module(module: &Module, source: &str) -> Result<String, UnparseError> {
    let renderer = Renderer { source };
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;

    for stmt in &module.body {
        if stmt.span.start >= cursor {
            out.push_str(renderer.slice(cursor, stmt.span.start)?);
        }
        renderer.render(stmt, &mut out)?;
        cursor = cursor.max(stmt.span.end);
    }
    out.push_str(renderer.slice(cursor.min(source.len()), source.len())?);

    Ok(out)
}

struct Renderer<'s> {
    source: &'s str,
}

impl Renderer<'_> {
    fn slice(&self, start: usize, end: usize) -> Result<&str, UnparseError> {
        self.source
            .get(start..end)
            .ok_or(UnparseError::OutOfBounds { start, end })
    }

    fn render(&self, node: &Node, out: &mut String) -> Result<(), UnparseError> {
        if node.origin == Origin::Source {
            out.push_str(self.slice(node.span.start, node.span.end)?);
            return Ok(());
        }

        match &node.kind {
            NodeKind::Assign { targets, value } => {
                for target in targets {
                    self.render(target, out)?;
                    out.push_str(" = ");
                }
                self.render(value, out)?;
            }
            NodeKind::Expr(inner) => self.render(inner, out)?,
            NodeKind::Name(id) => out.push_str(id),
            NodeKind::Attribute { value, attr } => {
                self.render(value, out)?;
                out.push('.');
                out.push_str(attr);
            }
            NodeKind::Call {
                func,
                args,
                keywords,
            } => {
                self.render(func, out)?;
                out.push('(');
                self.render_separated(args.iter().chain(keywords), ", ", out)?;
                out.push(')');
            }
            NodeKind::Keyword { arg, value } => {
                match arg {
                    Some(arg) => {
                        out.push_str(arg);
                        out.push('=');
                    }
                    None => out.push_str("**"),
                }
                self.render(value, out)?;
            }
            NodeKind::Starred(inner) => {
                out.push('*');
                self.render(inner, out)?;
            }
            NodeKind::List { elts } => {
                out.push('[');
                self.render_separated(elts.iter(), ", ", out)?;
                out.push(']');
            }
            NodeKind::ListComp { elt, generators } => {
                out.push('[');
                self.render(elt, out)?;
                for generator in generators {
                    out.push(' ');
                    self.render(generator, out)?;
                }
                out.push(']');
            }
            NodeKind::Comprehension {
                is_async,
                target,
                iter,
                ifs,
            } => {
                if *is_async {
                    out.push_str("async ");
                }
                out.push_str("for ");
                self.render(target, out)?;
                out.push_str(" in ");
                self.render_clause_operand(iter, out)?;
                for condition in ifs {
                    out.push_str(" if ");
                    self.render_clause_operand(condition, out)?;
                }
            }
            NodeKind::AnnAssign { .. } => return Err(UnparseError::Unsupported("AnnAssign")),
            NodeKind::AugAssign { .. } => return Err(UnparseError::Unsupported("AugAssign")),
            NodeKind::For { .. } => return Err(UnparseError::Unsupported("For")),
            NodeKind::While { .. } => return Err(UnparseError::Unsupported("While")),
            NodeKind::Compare { .. } => return Err(UnparseError::Unsupported("Compare")),
            NodeKind::Other { kind, .. } => return Err(UnparseError::Unsupported(*kind)),
        }
        Ok(())
    }

    fn render_separated<'n>(
        &self,
        nodes: impl Iterator<Item = &'n Node>,
        separator: &str,
        out: &mut String,
    ) -> Result<(), UnparseError> {
        for (i, node) in nodes.enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            self.render(node, out)?;
        }
        Ok(())
    }

    /// Comprehension iterables and conditions only admit `or_test`-level
    /// expressions; anything looser needs explicit parentheses.
    fn render_clause_operand(&self, node: &Node, out: &mut String) -> Result<(), UnparseError> {
        if needs_parens_in_clause(node) {
            out.push('(');
            self.render(node, out)?;
            out.push(')');
            Ok(())
        } else {
            self.render(node, out)
        }
    }
}

fn needs_parens_in_clause(node: &Node) -> bool {
    match &node.kind {
        NodeKind::Starred(_) => true,
        NodeKind::Other { kind, .. } => matches!(
            *kind,
            "expression_list"
                | "conditional_expression"
                | "lambda"
                | "named_expression"
                | "yield"
                | "await"
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;
    use crate::engine::parser::parse_module;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unchanged_module_round_trips_verbatim() {
        let source = "# header\nx = 1   # keep spacing\n\n\nfor i in x:\n    pass\n";
        let module = parse_module(source).unwrap();
        assert_eq!(unparse_module(&module, source).unwrap(), source);
    }

    #[test]
    fn test_renders_synthesized_comprehension() {
        let source = "items\nf(x)\nx\n";
        let module = parse_module(source).unwrap();
        let expr = |i: usize| match &module.body[i].kind {
            NodeKind::Expr(inner) => (**inner).clone(),
            other => panic!("expected Expr, got {:?}", other),
        };

        let span = Span::new(0, source.len(), 1);
        let comp = Node::synthesized(
            NodeKind::ListComp {
                elt: Box::new(expr(1)),
                generators: vec![Node::synthesized(
                    NodeKind::Comprehension {
                        is_async: false,
                        target: Box::new(expr(2)),
                        iter: Box::new(expr(0)),
                        ifs: vec![],
                    },
                    span,
                )],
            },
            span,
        );
        let assign = Node::synthesized(
            NodeKind::Assign {
                targets: vec![Node::synthesized(NodeKind::Name("result".into()), span)],
                value: Box::new(comp),
            },
            span,
        );

        let rewritten = Module { body: vec![assign] };
        assert_eq!(
            unparse_module(&rewritten, source).unwrap(),
            "result = [f(x) for x in items]"
        );
    }

    #[test]
    fn test_parenthesizes_bare_tuple_iterable() {
        let source = "a, b\n";
        let module = parse_module(source).unwrap();
        let tuple = match &module.body[0].kind {
            NodeKind::Expr(inner) => (**inner).clone(),
            other => panic!("expected Expr, got {:?}", other),
        };
        let span = Span::new(0, source.len(), 1);
        let name = |id: &str| Node::synthesized(NodeKind::Name(id.into()), span);
        let clause = Node::synthesized(
            NodeKind::Comprehension {
                is_async: false,
                target: Box::new(name("x")),
                iter: Box::new(tuple),
                ifs: vec![],
            },
            span,
        );
        let assign = Node::synthesized(
            NodeKind::Assign {
                targets: vec![name("r")],
                value: Box::new(Node::synthesized(
                    NodeKind::ListComp {
                        elt: Box::new(name("x")),
                        generators: vec![clause],
                    },
                    span,
                )),
            },
            span,
        );
        let rewritten = Module { body: vec![assign] };
        assert_eq!(
            unparse_module(&rewritten, source).unwrap(),
            "r = [x for x in (a, b)]"
        );
    }

    #[test]
    fn test_unsupported_synthesized_kind() {
        let node = Node::synthesized(
            NodeKind::Other {
                kind: "if_statement",
                children: vec![],
            },
            Span::default(),
        );
        let module = Module { body: vec![node] };
        assert_eq!(
            unparse_module(&module, ""),
            Err(UnparseError::Unsupported("if_statement"))
        );
    }

    #[test]
    fn test_out_of_bounds_span() {
        let module = Module {
            body: vec![Node::new(NodeKind::Name("x".into()), Span::new(10, 20, 1))],
        };
        assert!(matches!(
            unparse_module(&module, "x"),
            Err(UnparseError::OutOfBounds { .. })
        ));
    }
}
