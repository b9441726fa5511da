//! Rewrite of the top-level "empty list, then append in a loop" idiom.
//!
//! ```python
//! result = []
//! for x in items:
//!     result.append(f(x))
//! ```
//!
//! becomes `result = [f(x) for x in items]`. Only statements directly in
//! the module body are considered; the same idiom inside a function, loop,
//! or conditional is left alone.

mod write;

pub use write::{write_atomically, WriteError};

use crate::ast::unparse::unparse_module;
use crate::ast::{Module, Node, NodeKind};
use crate::engine::parser::parse_module;
use crate::error::Result;
use crate::format::{format_or_keep, SourceFormatter};
use tracing::debug;

/// One applied rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedRewrite {
    /// Line of the original `name = []` statement.
    pub line: usize,
    pub name: String,
}

/// A rewritten tree and what changed in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    pub module: Module,
    pub applied: Vec<AppliedRewrite>,
}

/// Rewritten source text and what changed in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefactorOutput {
    pub source: String,
    pub applied: Vec<AppliedRewrite>,
}

/// Rewrite `source` without running a formatter.
///
/// Invalid Python is returned as [`crate::Error::Parse`].
pub fn refactor(source: &str) -> Result<String> {
    refactor_source(source, None).map(|out| out.source)
}

/// Rewrite `source`, then pass the result through `formatter`.
///
/// A formatter failure is logged and the unformatted text is returned.
pub fn refactor_with(source: &str, formatter: &dyn SourceFormatter) -> Result<String> {
    refactor_source(source, Some(formatter)).map(|out| out.source)
}

/// Rewrite `source`, optionally formatting the result, and report each rewrite.
pub fn refactor_source(
    source: &str,
    formatter: Option<&dyn SourceFormatter>,
) -> Result<RefactorOutput> {
    let module = parse_module(source)?;
    let Rewrite { module, applied } = rewrite_module(&module);
    debug!(rewrites = applied.len(), "rewrote top-level append loops");

    let rendered = unparse_module(&module, source)?;
    let source = match formatter {
        Some(formatter) => format_or_keep(formatter, rendered),
        None => rendered,
    };

    Ok(RefactorOutput { source, applied })
}

/// Fold over the module body with one statement of lookahead.
///
/// Matches never overlap: a consumed loop is not reconsidered as the start
/// of another pair.
pub fn rewrite_module(module: &Module) -> Rewrite {
    let mut body = Vec::with_capacity(module.body.len());
    let mut applied = Vec::new();
    let mut stmts = module.body.iter().peekable();

    while let Some(stmt) = stmts.next() {
        let replacement = stmts
            .peek()
            .and_then(|next| comprehension_for(stmt, next));

        match replacement {
            Some((node, name)) => {
                applied.push(AppliedRewrite {
                    line: stmt.line(),
                    name,
                });
                body.push(node);
                stmts.next();
            }
            None => body.push(stmt.clone()),
        }
    }

    Rewrite {
        module: Module { body },
        applied,
    }
}

/// `name = []` with a bare name as the only target.
fn empty_list_target(stmt: &Node) -> Option<&Node> {
    let NodeKind::Assign { targets, value } = &stmt.kind else {
        return None;
    };
    let [target] = targets.as_slice() else {
        return None;
    };
    target.as_name()?;
    match &value.kind {
        NodeKind::List { elts } if elts.is_empty() => Some(target),
        _ => None,
    }
}

/// The argument of `name.append(arg)` when `stmt` is exactly that call.
fn appended_element<'n>(stmt: &'n Node, name: &str) -> Option<&'n Node> {
    let NodeKind::Expr(call) = &stmt.kind else {
        return None;
    };
    let NodeKind::Call {
        func,
        args,
        keywords,
    } = &call.kind
    else {
        return None;
    };
    let NodeKind::Attribute { value, attr } = &func.kind else {
        return None;
    };
    if attr != "append" || value.as_name() != Some(name) || !keywords.is_empty() {
        return None;
    }
    match args.as_slice() {
        [arg] if !matches!(arg.kind, NodeKind::Starred(_)) => Some(arg),
        _ => None,
    }
}

/// Build `name = [elt for target in iter]` from an `Assign` and the `For` after it.
fn comprehension_for(assign: &Node, next: &Node) -> Option<(Node, String)> {
    let target = empty_list_target(assign)?;
    let name = target.as_name()?;

    let NodeKind::For {
        is_async: false,
        target: loop_target,
        iter,
        body,
        orelse,
    } = &next.kind
    else {
        return None;
    };
    if !orelse.is_empty() {
        return None;
    }
    let [stmt] = body.as_slice() else {
        return None;
    };
    let element = appended_element(stmt, name)?;

    // The assignment disappears, so nothing in the comprehension may read
    // the list it used to initialise.
    if element.mentions(name) || loop_target.mentions(name) || iter.mentions(name) {
        debug!(name, line = assign.line(), "skipping self-referential append loop");
        return None;
    }
    // Inside a comprehension an assignment expression may not rebind the
    // iteration variable or appear in the iterable, and `yield` is not
    // allowed at all.
    if [element, &**iter]
        .iter()
        .any(|node| node.contains_other("named_expression") || node.contains_other("yield"))
    {
        debug!(name, line = assign.line(), "skipping append loop with scope-sensitive expression");
        return None;
    }

    let span = assign.span.cover(&next.span);
    let generator = Node::synthesized(
        NodeKind::Comprehension {
            is_async: false,
            target: loop_target.clone(),
            iter: iter.clone(),
            ifs: Vec::new(),
        },
        span,
    );
    let comprehension = Node::synthesized(
        NodeKind::ListComp {
            elt: Box::new(element.clone()),
            generators: vec![generator],
        },
        span,
    );
    let replacement = Node::synthesized(
        NodeKind::Assign {
            targets: vec![target.clone()],
            value: Box::new(comprehension),
        },
        span,
    );

    Some((replacement, name.to_string()))
}
