//! Generic operator-precedence parser.
//!
//! The engine knows nothing about Quaint. It consumes a stream that strictly
//! alternates operands and operators, starting and ending with an operand,
//! and asks a [`Grammar`] three things: how two adjacent operators relate
//! ([`Grammar::order`]), how to turn an operand into a node
//! ([`Grammar::leaf`]) and how to build a node from a group of fused
//! operators and their operands ([`Grammar::finalize`]).
//!
//! Partially built groups live on an explicit stack of frames. A frame holds
//! the operators fused so far and the operands to their left; the operand
//! being read is the pending right side of the innermost frame.

use crate::SyntaxError;

/// One element of the alternating stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Element<T, O> {
    Operand(T),
    Operator(O),
}

/// Relation between a pending operator and the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// The pending operator binds tighter: close it.
    Left,
    /// The next operator binds tighter: open a new group for it.
    Right,
    /// Both belong to the same group.
    Aggregate,
}

pub trait Grammar {
    type Operand;
    type Operator;
    type Node;
    type Error: From<SyntaxError>;

    fn order(&self, left: &Self::Operator, right: &Self::Operator)
        -> Result<Order, Self::Error>;

    fn leaf(&self, operand: Self::Operand) -> Result<Self::Node, Self::Error>;

    /// Build a node from `ops.len()` fused operators and `ops.len() + 1` operands.
    fn finalize(
        &self,
        ops: Vec<Self::Operator>,
        operands: Vec<Self::Node>,
    ) -> Result<Self::Node, Self::Error>;

    /// Called before `op` opens a new group.
    fn check_shift(&self, _op: &Self::Operator) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when input ends while the group whose last operator is `op` is open.
    fn check_end(&self, _op: &Self::Operator) -> Result<(), Self::Error> {
        Ok(())
    }
}

struct Frame<O, N> {
    ops: Vec<O>,
    operands: Vec<N>,
}

impl<O, N> Frame<O, N> {
    fn open(op: O, operand: N) -> Self {
        Self {
            ops: vec![op],
            operands: vec![operand],
        }
    }

    fn close<G>(mut self, grammar: &G, last: N) -> Result<N, G::Error>
    where
        G: Grammar<Operator = O, Node = N>,
    {
        self.operands.push(last);
        grammar.finalize(self.ops, self.operands)
    }
}

fn expect_operand<G: Grammar>(
    grammar: &G,
    element: Option<Element<G::Operand, G::Operator>>,
) -> Result<G::Node, G::Error> {
    match element {
        Some(Element::Operand(operand)) => grammar.leaf(operand),
        Some(Element::Operator(_)) => Err(SyntaxError::internal(
            "two operators in a row; the stream does not alternate",
            None,
        )
        .into()),
        None => Err(SyntaxError::internal("expected an operand, found end of input", None).into()),
    }
}

/// Parse an alternating stream into a single node.
pub fn parse<G, I>(grammar: &G, elements: I) -> Result<G::Node, G::Error>
where
    G: Grammar,
    I: IntoIterator<Item = Result<Element<G::Operand, G::Operator>, G::Error>>,
{
    let mut elements = elements.into_iter();
    let mut stack: Vec<Frame<G::Operator, G::Node>> = Vec::new();
    let mut current = expect_operand(grammar, elements.next().transpose()?)?;

    while let Some(element) = elements.next().transpose()? {
        let op = match element {
            Element::Operator(op) => op,
            Element::Operand(_) => {
                return Err(SyntaxError::internal(
                    "two operands in a row; the stream does not alternate",
                    None,
                )
                .into())
            }
        };

        loop {
            let decision = match stack.last().and_then(|frame| frame.ops.last()) {
                Some(pending) => grammar.order(pending, &op)?,
                None => Order::Right,
            };
            match decision {
                Order::Left => {
                    let frame = stack.pop().ok_or_else(|| {
                        SyntaxError::internal("reduced with no pending operator", None)
                    })?;
                    current = frame.close(grammar, current)?;
                }
                Order::Right => {
                    grammar.check_shift(&op)?;
                    stack.push(Frame::open(op, current));
                    break;
                }
                Order::Aggregate => {
                    let frame = stack.last_mut().ok_or_else(|| {
                        SyntaxError::internal("merged with no pending operator", None)
                    })?;
                    frame.operands.push(current);
                    frame.ops.push(op);
                    break;
                }
            }
        }

        current = expect_operand(grammar, elements.next().transpose()?)?;
    }

    while let Some(frame) = stack.pop() {
        if let Some(last) = frame.ops.last() {
            grammar.check_end(last)?;
        }
        current = frame.close(grammar, current)?;
    }
    Ok(current)
}
