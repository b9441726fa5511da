//! Python source parser for py-perf.
//!
//! This module wraps the `tree-sitter-python` grammar and lowers the
//! concrete tree into [`crate::ast::Module`]. Any syntax error short-circuits
//! with a located [`ParseError`]; partially valid trees are never analysed.

use crate::ast::{self, Module};
use thiserror::Error;
use tree_sitter::{Node as TsNode, Parser};

/// Source text that is not valid Python.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (line {line}, column {column})")]
pub struct ParseError {
    pub message: String,
    /// 1-indexed.
    pub line: usize,
    /// 1-indexed, in bytes.
    pub column: usize,
}

impl ParseError {
    fn at(node: TsNode<'_>, message: impl Into<String>) -> Self {
        let position = node.start_position();
        Self {
            message: message.into(),
            line: position.row + 1,
            column: position.column + 1,
        }
    }
}

/// Parse Python source into a structural tree.
///
/// # Example
///
/// ```
/// use py_perf::engine::parser::parse_module;
///
/// let module = parse_module("total = sum(values)\n").expect("valid Python");
/// assert_eq!(module.body.len(), 1);
/// ```
pub fn parse_module(source: &str) -> Result<Module, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| ParseError {
            message: format!("failed to load Python grammar: {e}"),
            line: 1,
            column: 1,
        })?;

    let tree = parser.parse(source, None).ok_or_else(|| ParseError {
        message: "parser produced no tree".to_string(),
        line: 1,
        column: 1,
    })?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(first_error(root, source).unwrap_or_else(|| ParseError::at(root, "invalid syntax")));
    }
    check_structure(root, source)?;

    Ok(ast::lower_module(root, source))
}

/// Bracket nesting CPython's tokenizer accepts.
const MAX_BRACKET_DEPTH: usize = 200;

/// Deepest grammar tree that is lowered. Lowering and tree walks recurse
/// once per level, so this also bounds their stack use.
const MAX_TREE_DEPTH: usize = 500;

/// Checks the grammar does not enforce: block indentation and nesting limits.
///
/// The walk is iterative so that pathological nesting is rejected before
/// anything recurses over the tree.
fn check_structure(root: TsNode<'_>, source: &str) -> Result<(), ParseError> {
    check_module_indent(root, source)?;

    let mut cursor = root.walk();
    let mut depth = 1;
    let mut brackets = 0usize;

    loop {
        let node = cursor.node();

        if depth > MAX_TREE_DEPTH {
            return Err(ParseError::at(node, "expression is too deeply nested"));
        }
        if !node.is_named() {
            match node.kind() {
                "(" | "[" | "{" => {
                    brackets += 1;
                    if brackets > MAX_BRACKET_DEPTH {
                        return Err(ParseError::at(node, "too many nested parentheses"));
                    }
                }
                ")" | "]" | "}" => brackets = brackets.saturating_sub(1),
                _ => {}
            }
        } else if node.kind() == "block" {
            check_block_indent(node, source)?;
        }

        if cursor.goto_first_child() {
            depth += 1;
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return Ok(());
            }
            depth -= 1;
        }
    }
}

/// Statements directly inside `node`, without comments.
fn statements<'t>(node: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

/// The text between the start of `node`'s line and `node`.
fn line_prefix<'s>(node: TsNode<'_>, source: &'s str) -> &'s str {
    let start = node.start_byte();
    let line_start = start.saturating_sub(node.start_position().column);
    source.get(line_start..start).unwrap_or("")
}

/// True if only whitespace precedes `node` on its line.
fn starts_line(node: TsNode<'_>, source: &str) -> bool {
    line_prefix(node, source)
        .chars()
        .all(|c| matches!(c, ' ' | '\t' | '\x0c'))
}

/// Indentation width of `node`'s line, with tabs advancing to the next
/// multiple of eight.
fn indent_width(node: TsNode<'_>, source: &str) -> usize {
    let mut width = 0;
    for c in line_prefix(node, source).chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / 8 + 1) * 8,
            '\x0c' => width = 0,
            _ => break,
        }
    }
    width
}

fn check_module_indent(root: TsNode<'_>, source: &str) -> Result<(), ParseError> {
    for stmt in statements(root) {
        if starts_line(stmt, source) && indent_width(stmt, source) != 0 {
            return Err(ParseError::at(stmt, "unexpected indent"));
        }
    }
    Ok(())
}

fn check_block_indent(block: TsNode<'_>, source: &str) -> Result<(), ParseError> {
    let Some(header) = block.parent() else {
        return Ok(());
    };
    // The `:` ending the header, or the header itself if the grammar put
    // something else in between.
    let colon_row = block
        .prev_sibling()
        .map_or(header.start_position().row, |prev| prev.end_position().row);

    let stmts = statements(block);
    let Some((first, rest)) = stmts.split_first() else {
        return Err(ParseError {
            message: format!("expected an indented block after line {}", colon_row + 1),
            line: colon_row + 2,
            column: 1,
        });
    };

    // `if x: a; b` keeps the whole body on the header line.
    if first.start_position().row == colon_row {
        return match rest.iter().find(|stmt| starts_line(**stmt, source)) {
            Some(stmt) => Err(ParseError::at(*stmt, "unexpected indent")),
            None => Ok(()),
        };
    }

    let indent = indent_width(*first, source);
    if !starts_line(*first, source) || indent <= indent_width(header, source) {
        return Err(ParseError::at(
            *first,
            format!("expected an indented block after line {}", colon_row + 1),
        ));
    }

    for stmt in rest.iter().filter(|stmt| starts_line(**stmt, source)) {
        let width = indent_width(*stmt, source);
        if width > indent {
            return Err(ParseError::at(*stmt, "unexpected indent"));
        }
        if width < indent {
            return Err(ParseError::at(
                *stmt,
                "unindent does not match any outer indentation level",
            ));
        }
    }
    Ok(())
}

/// Locate the first `ERROR` or `MISSING` node in document order.
fn first_error(root: TsNode<'_>, source: &str) -> Option<ParseError> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_missing() {
            return Some(ParseError::at(node, format!("missing \"{}\"", node.kind())));
        }
        if node.is_error() {
            return Some(ParseError::at(node, error_message(node, source)));
        }

        // Only subtrees containing an error are worth entering.
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

fn error_message(node: TsNode<'_>, source: &str) -> String {
    let snippet = source
        .get(node.byte_range())
        .and_then(|text| text.lines().next())
        .map(str::trim)
        .unwrap_or("");
    if snippet.is_empty() {
        "invalid syntax".to_string()
    } else {
        format!("invalid syntax near `{}`", truncate(snippet, 40))
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
