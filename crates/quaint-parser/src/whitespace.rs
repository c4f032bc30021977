//! Whitespace ownership.
//!
//! After the engine, whitespace sits on the leaves it was lexed next to. This
//! pass moves it outward: a node keeps the whitespace on an edge it owns and
//! hands the rest to its parent, shrinking its location accordingly. The first
//! child of an operator node does not own its left edge and the last child
//! does not own its right edge, so whitespace at the edges of a subtree ends up
//! on the outermost node that starts or ends there.

use std::mem;
use std::vec::IntoIter;

use crate::ast::{Node, NodeKind};

/// A node whose children are being fixed.
struct Frame {
    node: Node,
    owns_left: bool,
    owns_right: bool,
    pending: IntoIter<Node>,
    fixed: Vec<Node>,
    /// Leftovers of the first and last child.
    edges: (String, String),
}

impl Frame {
    fn enter(mut node: Node, owns_left: bool, owns_right: bool) -> Self {
        let children = node.take_children();
        Self {
            node,
            owns_left,
            owns_right,
            fixed: Vec::with_capacity(children.len()),
            pending: children.into_iter(),
            edges: (String::new(), String::new()),
        }
    }

    /// Ownership of the next child to fix.
    fn next_child(&mut self) -> Option<(Node, bool, bool)> {
        let child = self.pending.next()?;
        let i = self.fixed.len();
        let last = self.pending.len() == 0;
        Some((child, i != 0, !last))
    }

    fn adopt(&mut self, child: Node, left: String, right: String) {
        if self.fixed.is_empty() {
            self.edges.0 = left;
        }
        if self.pending.len() == 0 {
            self.edges.1 = right;
        }
        self.fixed.push(child);
    }

    fn leave(self) -> (Node, String, String) {
        let Frame {
            mut node,
            owns_left,
            owns_right,
            fixed,
            edges,
            ..
        } = self;
        let (left, right) = match &mut node.kind {
            // Voids are zero-width: everything they cover is leading whitespace.
            NodeKind::Void => (node.location.text().to_string(), String::new()),
            NodeKind::Leaf(_) | NodeKind::Nullary(_) => (
                mem::take(&mut node.whitespace_left),
                mem::take(&mut node.whitespace_right),
            ),
            NodeKind::Inline(op) | NodeKind::Block(op) => {
                op.children = fixed;
                edges
            }
        };
        let (left, right) = settle(&mut node, left, right, owns_left, owns_right);
        (node, left, right)
    }
}

/// Keep the whitespace on owned edges, shrink the location over the rest and
/// return it.
fn settle(
    node: &mut Node,
    left: String,
    right: String,
    owns_left: bool,
    owns_right: bool,
) -> (String, String) {
    let mut start = node.location.start();
    let mut end = node.location.end();

    let leftover_left = if owns_left {
        node.whitespace_left = left;
        String::new()
    } else {
        start += left.len();
        node.whitespace_left.clear();
        left
    };
    let leftover_right = if owns_right {
        node.whitespace_right = right;
        String::new()
    } else {
        end -= right.len();
        node.whitespace_right.clear();
        right
    };

    node.location = node.location.with_span(start, end.max(start));
    (leftover_left, leftover_right)
}

/// Redistribute whitespace under `node`. Returns the whitespace left over on
/// the edges `node` does not own.
///
/// The walk is post-order over an explicit stack of frames: a node settles
/// its edges only once all of its children have.
pub fn fix(node: &mut Node, owns_left: bool, owns_right: bool) -> (String, String) {
    let placeholder = Node::new(NodeKind::Void, node.location.clone());
    let root = mem::replace(node, placeholder);
    let mut stack = vec![Frame::enter(root, owns_left, owns_right)];

    loop {
        let Some(frame) = stack.last_mut() else {
            return (String::new(), String::new());
        };
        if let Some((child, owns_left, owns_right)) = frame.next_child() {
            stack.push(Frame::enter(child, owns_left, owns_right));
            continue;
        }

        let Some(done) = stack.pop() else {
            continue;
        };
        let (fixed, left, right) = done.leave();
        match stack.last_mut() {
            Some(parent) => parent.adopt(fixed, left, right),
            None => {
                *node = fixed;
                return (left, right);
            }
        }
    }
}
