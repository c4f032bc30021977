//! Node construction: leaves from operand tokens, and operator nodes from the
//! groups the engine closes.

use quaint_lexer::{Lexeme, Location, Token, TokenKind};

use crate::ast::{Node, NodeClass, NodeKind, Op, Tag};
use crate::operator::Operator;
use crate::{ParseError, SyntaxError};

pub const PARAGRAPH: &str = "P";
pub const BLANK: &str = "B";
pub const INDENTED: &str = "I";

/// A leaf node. Whitespace on either side of the token text is parked on the
/// node until the whitespace pass decides who owns it.
pub fn leaf(token: Token) -> Node {
    let kind = match token.kind {
        TokenKind::Void => NodeKind::Void,
        TokenKind::Nullary => NodeKind::Nullary(token.text.clone()),
        TokenKind::Identifier | TokenKind::Operator(_) => NodeKind::Leaf(token.text.clone()),
    };
    let mut node = Node::new(kind, token.location.clone());
    if !node.is_void() {
        let slice = token.location.text();
        let left = token.wsb.len().min(slice.len());
        let right = (left + token.text.len()).min(slice.len());
        node.whitespace_left = slice[..left].to_string();
        node.whitespace_right = slice[right..].to_string();
    }
    node
}

fn spaced(op: &Operator) -> bool {
    op.token.metrics.spaced_before() || op.token.metrics.spaced_after()
}

fn block(tag: Tag, children: Vec<Node>, location: Location) -> Node {
    Node::new(
        NodeKind::Block(Op {
            tag,
            children,
            wide: true,
        }),
        location,
    )
}

fn internal(message: String, location: &Location) -> ParseError {
    SyntaxError::internal(message, Some(location.clone())).into()
}

/// Build the node for `ops` fused together over `operands`.
pub fn finalize(ops: Vec<Operator>, operands: Vec<Node>) -> Result<Node, ParseError> {
    let location = Location::merge(
        ops.iter()
            .map(Operator::location)
            .chain(operands.iter().map(Node::location)),
    )
    .ok_or_else(|| SyntaxError::internal("empty operator group", None))?;

    let Some(first) = ops.first() else {
        return Err(internal("operator group without operators".into(), &location));
    };
    if operands.len() != ops.len() + 1 {
        return Err(internal(
            format!("{} operators over {} operands", ops.len(), operands.len()),
            &location,
        ));
    }

    if let [open, close] = ops.as_slice() {
        if open.lexeme() == Lexeme::Indent && close.lexeme() == Lexeme::Dedent {
            return indent_block(&ops, operands, location);
        }
    }

    if first.is_line_level() {
        if !ops.iter().all(|op| op.is_line_level() && op.token.text == first.token.text) {
            return Err(internal("mixed line operators in one group".into(), &location));
        }
        let tag = if first.is_line_break() {
            let blank = ops.iter().any(|op| op.token.gap_height() >= 2);
            Tag::single(if blank { BLANK } else { PARAGRAPH })
        } else {
            Tag::single(first.token.text.clone())
        };
        return Ok(block(tag, operands, location));
    }

    let tag = match ops.as_slice() {
        _ if ops.iter().all(|op| op.token.text == first.token.text) => {
            Tag::single(first.token.text.clone())
        }
        [open, close] => Tag::Pair(open.token.text.clone(), close.token.text.clone()),
        _ => {
            let texts: Vec<&str> = ops.iter().map(Operator::name).collect();
            return Err(internal(
                format!("cannot tag operator group {}", texts.join(" ")),
                &location,
            ));
        }
    };
    Ok(Node::new(
        NodeKind::Inline(Op {
            tag,
            wide: ops.iter().any(spaced),
            children: operands,
        }),
        location,
    ))
}

/// `head INDENT body DEDENT tail`.
///
/// A head that is an operator written in the source (`key: <indented body>`)
/// takes the block as its last operand; anything else becomes the first line
/// of the block.
fn indent_block(ops: &[Operator], operands: Vec<Node>, location: Location) -> Result<Node, ParseError> {
    let Ok([mut head, mut body, tail]) = <[Node; 3]>::try_from(operands) else {
        return Err(internal("indented block needs three operands".into(), &location));
    };

    let paragraph =
        body.class() == NodeClass::Block && body.tag() == Some(&Tag::single(PARAGRAPH));
    let lines = if paragraph {
        body.take_children()
    } else {
        vec![body]
    };

    let spliced = match &mut head.kind {
        NodeKind::Inline(op) if !op.tag.is_empty() => op.children.pop().map(|last| (op, last)),
        _ => None,
    };

    match spliced {
        Some((op, last)) => {
            let children: Vec<Node> = std::iter::once(last)
                .chain(lines)
                .chain(std::iter::once(tail))
                .collect();
            let inner = Location::merge(
                ops.iter()
                    .map(Operator::location)
                    .chain(children.iter().map(Node::location)),
            )
            .unwrap_or_else(|| location.clone());
            op.children.push(block(Tag::single(INDENTED), children, inner));
            head.location = location;
            Ok(head)
        }
        None => {
            let children = std::iter::once(head)
                .chain(lines)
                .chain(std::iter::once(tail))
                .collect();
            Ok(block(Tag::single(INDENTED), children, location))
        }
    }
}
