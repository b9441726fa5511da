//! Structural tree for analysed Python source.
//!
//! The parser's concrete syntax tree is lowered into a closed set of node
//! kinds. Kinds the detectors and the rewrite care about get dedicated
//! variants; everything else is kept as [`NodeKind::Other`] so that a generic
//! walk still reaches every nested expression and statement.

mod lower;
pub mod unparse;
pub mod visit;

pub(crate) use lower::lower_module;

/// Byte range and first line of a node in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    /// 1-indexed line of the node's first token.
    pub line: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }

    /// Smallest span covering both `self` and `other`, positioned at `self`.
    pub fn cover(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line,
        }
    }
}

/// Where a node's text comes from when the tree is serialized again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The node maps to `source[span.start..span.end]`.
    Source,
    /// The node was built by a rewrite and has to be rendered.
    Synthesized,
}

/// Augmented assignment operators (`+=`, `-=`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitAnd,
    BitXor,
    BitOr,
}

impl Operator {
    /// Parse the augmented-assignment token, e.g. `"+="`.
    pub fn from_augmented(token: &str) -> Option<Self> {
        let op = match token {
            "+=" => Operator::Add,
            "-=" => Operator::Sub,
            "*=" => Operator::Mult,
            "@=" => Operator::MatMult,
            "/=" => Operator::Div,
            "//=" => Operator::FloorDiv,
            "%=" => Operator::Mod,
            "**=" => Operator::Pow,
            "<<=" => Operator::LShift,
            ">>=" => Operator::RShift,
            "&=" => Operator::BitAnd,
            "^=" => Operator::BitXor,
            "|=" => Operator::BitOr,
            _ => return None,
        };
        Some(op)
    }
}

/// Comparison operators in a (possibly chained) comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CmpOp {
    /// Parse an operator token. Whitespace inside `not in` / `is not` is ignored.
    pub fn from_token(token: &str) -> Option<Self> {
        let normalized = token.split_whitespace().collect::<Vec<_>>().join(" ");
        let op = match normalized.as_str() {
            "==" => CmpOp::Eq,
            "!=" | "<>" => CmpOp::NotEq,
            "<" => CmpOp::Lt,
            "<=" => CmpOp::LtE,
            ">" => CmpOp::Gt,
            ">=" => CmpOp::GtE,
            "is" => CmpOp::Is,
            "is not" => CmpOp::IsNot,
            "in" => CmpOp::In,
            "not in" => CmpOp::NotIn,
            _ => return None,
        };
        Some(op)
    }
}

/// Node kinds of the structural tree.
///
/// Statement and expression kinds share one union, like Python's own `ast`
/// module, so a single visitor reaches both.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// `a = b = value`; chained targets are flattened in source order.
    Assign {
        targets: Vec<Node>,
        value: Box<Node>,
    },
    /// `target: annotation = value`
    AnnAssign {
        target: Box<Node>,
        annotation: Box<Node>,
        value: Option<Box<Node>>,
    },
    AugAssign {
        target: Box<Node>,
        op: Operator,
        value: Box<Node>,
    },
    /// Expression statement.
    Expr(Box<Node>),
    For {
        is_async: bool,
        target: Box<Node>,
        iter: Box<Node>,
        body: Vec<Node>,
        orelse: Vec<Node>,
    },
    While {
        test: Box<Node>,
        body: Vec<Node>,
        orelse: Vec<Node>,
    },
    Name(String),
    Attribute {
        value: Box<Node>,
        attr: String,
    },
    Call {
        func: Box<Node>,
        args: Vec<Node>,
        keywords: Vec<Node>,
    },
    /// `name=value` or `**value` (when `arg` is `None`) inside a call.
    Keyword {
        arg: Option<String>,
        value: Box<Node>,
    },
    Compare {
        left: Box<Node>,
        ops: Vec<CmpOp>,
        comparators: Vec<Node>,
    },
    List {
        elts: Vec<Node>,
    },
    ListComp {
        elt: Box<Node>,
        generators: Vec<Node>,
    },
    /// One `for target in iter if ...` clause of a comprehension.
    Comprehension {
        is_async: bool,
        target: Box<Node>,
        iter: Box<Node>,
        ifs: Vec<Node>,
    },
    Starred(Box<Node>),
    /// Any other grammar node, children in document order.
    Other {
        kind: &'static str,
        children: Vec<Node>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub origin: Origin,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span,
            origin: Origin::Source,
        }
    }

    pub fn synthesized(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span,
            origin: Origin::Synthesized,
        }
    }

    pub fn line(&self) -> usize {
        self.span.line
    }

    /// The identifier if this node is a bare name.
    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Name(id) => Some(id),
            _ => None,
        }
    }

    /// True if `name` occurs as a bare name anywhere in this subtree.
    pub fn mentions(&self, name: &str) -> bool {
        self.any(|node| node.as_name() == Some(name))
    }

    /// True if this node or any descendant is a generic node of grammar `kind`.
    pub fn contains_other(&self, kind: &str) -> bool {
        self.any(|node| matches!(&node.kind, NodeKind::Other { kind: k, .. } if *k == kind))
    }

    /// True if `pred` holds for this node or any descendant.
    pub fn any(&self, pred: impl Fn(&Node) -> bool) -> bool {
        struct Finder<F> {
            pred: F,
            found: bool,
        }

        impl<F: Fn(&Node) -> bool> visit::Visitor for Finder<F> {
            fn visit_node(&mut self, node: &Node) {
                if self.found {
                    return;
                }
                if (self.pred)(node) {
                    self.found = true;
                    return;
                }
                visit::walk_node(self, node);
            }
        }

        let mut finder = Finder { pred, found: false };
        visit::Visitor::visit_node(&mut finder, self);
        finder.found
    }
}

/// Root of a parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub body: Vec<Node>,
}
