//! Abstract Syntax Tree for Quaint.
//!
//! Every node keeps its [`Location`] and the whitespace it owns on either
//! edge, so that `whitespace_left + raw + whitespace_right` is exactly the
//! source text the node covers.

use std::fmt;

use quaint_lexer::Location;

/// Operator tag of an [`Op`] node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// One operator text, possibly repeated: `a + b`, `a, b, c`.
    /// Juxtaposition has the empty tag.
    Single(String),
    /// An opening and a closing delimiter: `[a]`, `*a*`.
    Pair(String, String),
}

impl Tag {
    pub fn single(text: impl Into<String>) -> Self {
        Tag::Single(text.into())
    }

    /// The juxtaposition tag.
    pub fn is_empty(&self) -> bool {
        matches!(self, Tag::Single(text) if text.is_empty())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Single(text) if text.is_empty() => f.write_str("_"),
            Tag::Single(text) => f.write_str(text),
            Tag::Pair(open, close) => write!(f, "{open}{close}"),
        }
    }
}

/// An operator node: a tag and the operands it was applied to.
#[derive(Debug, Clone, PartialEq)]
pub struct Op {
    pub(crate) tag: Tag,
    pub(crate) children: Vec<Node>,
    /// Some operator of the group had whitespace next to it.
    pub(crate) wide: bool,
}

impl Op {
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn wide(&self) -> bool {
        self.wide
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Zero-width placeholder where an operand is missing.
    Void,
    /// An operator standing alone.
    Nullary(String),
    /// A word.
    Leaf(String),
    Inline(Op),
    /// Line-level structure: paragraphs (`P`), blank-line blocks (`B`),
    /// indented blocks (`I`) and line operators.
    Block(Op),
}

/// Node class, for [`Signature`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    Void,
    Nullary,
    Leaf,
    Inline,
    Block,
}

/// Structural key for pattern matching over the tree.
///
/// `args` has one entry per child, `false` where the child is a void
/// placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub class: NodeClass,
    pub tag: Option<Tag>,
    pub args: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) location: Location,
    pub(crate) whitespace_left: String,
    pub(crate) whitespace_right: String,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, location: Location) -> Self {
        Self {
            kind,
            location,
            whitespace_left: String::new(),
            whitespace_right: String::new(),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn whitespace_left(&self) -> &str {
        &self.whitespace_left
    }

    pub fn whitespace_right(&self) -> &str {
        &self.whitespace_right
    }

    pub fn class(&self) -> NodeClass {
        match self.kind {
            NodeKind::Void => NodeClass::Void,
            NodeKind::Nullary(_) => NodeClass::Nullary,
            NodeKind::Leaf(_) => NodeClass::Leaf,
            NodeKind::Inline(_) => NodeClass::Inline,
            NodeKind::Block(_) => NodeClass::Block,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, NodeKind::Void)
    }

    pub fn op(&self) -> Option<&Op> {
        match &self.kind {
            NodeKind::Inline(op) | NodeKind::Block(op) => Some(op),
            _ => None,
        }
    }

    /// Detach the children of an operator node.
    pub(crate) fn take_children(&mut self) -> Vec<Node> {
        match &mut self.kind {
            NodeKind::Inline(op) | NodeKind::Block(op) => std::mem::take(&mut op.children),
            _ => Vec::new(),
        }
    }

    pub fn tag(&self) -> Option<&Tag> {
        self.op().map(Op::tag)
    }

    /// Text of a leaf or nullary operator.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Leaf(text) | NodeKind::Nullary(text) => Some(text),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self.op() {
            Some(op) => &op.children,
            None => &[],
        }
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children().get(index)
    }

    /// Source text of the node without the whitespace it owns.
    pub fn raw(&self) -> &str {
        let text = self.location.text();
        let start = self.whitespace_left.len().min(text.len());
        let end = text.len().saturating_sub(self.whitespace_right.len()).max(start);
        &text[start..end]
    }

    /// Source text of the node, including the whitespace it owns.
    pub fn source_text(&self) -> &str {
        self.location.text()
    }

    pub fn signature(&self) -> Signature {
        Signature {
            class: self.class(),
            tag: self.tag().cloned(),
            args: self.children().iter().map(|c| !c.is_void()).collect(),
        }
    }
}

/// Rendering work for [`Node`]'s `Display`: a node still to print, or text.
enum Piece<'a> {
    Node(&'a Node),
    Text(&'static str),
}

impl fmt::Display for Node {
    /// S-expression form: `(+ a (* b c))`, blocks in braces, voids as `∅`.
    ///
    /// Walks the tree with an explicit stack; trees get as deep as the input
    /// is long.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![Piece::Node(self)];
        while let Some(piece) = stack.pop() {
            let node = match piece {
                Piece::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Piece::Node(node) => node,
            };
            let (open, close, op) = match &node.kind {
                NodeKind::Void => {
                    f.write_str("∅")?;
                    continue;
                }
                NodeKind::Nullary(text) | NodeKind::Leaf(text) => {
                    f.write_str(text)?;
                    continue;
                }
                NodeKind::Inline(op) => ("(", ")", op),
                NodeKind::Block(op) => ("{", "}", op),
            };
            write!(f, "{open}{}", op.tag)?;
            stack.push(Piece::Text(close));
            for child in op.children.iter().rev() {
                stack.push(Piece::Node(child));
                stack.push(Piece::Text(" "));
            }
        }
        Ok(())
    }
}

impl Drop for Node {
    /// Drops the subtree iteratively so deep trees do not exhaust the stack.
    fn drop(&mut self) {
        let mut pending = self.take_children();
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.take_children());
        }
    }
}
