//! Quaint parser.
//!
//! Wires the lexer pipeline into the generic precedence engine with the
//! Quaint priority table, then runs the whitespace pass over the result.

use std::sync::Arc;

use quaint_lexer::{token_stream, Lexicon, Source, Token};
use tracing::debug;

use crate::ast::Node;
use crate::build;
use crate::engine::{self, Element, Grammar, Order};
use crate::operator::{assign, Merge, Operator};
use crate::order::order;
use crate::whitespace;
use crate::{ParseError, SyntaxError};

/// The Quaint grammar, as seen by the engine.
pub struct QuaintGrammar<'l> {
    lexicon: &'l Lexicon,
}

impl<'l> QuaintGrammar<'l> {
    pub fn new(lexicon: &'l Lexicon) -> Self {
        Self { lexicon }
    }

    /// Operands pass through; operators get their priority keys.
    pub fn element(&self, token: Token) -> Element<Token, Operator> {
        if token.is_operand() {
            Element::Operand(token)
        } else {
            Element::Operator(assign(token, self.lexicon))
        }
    }
}

fn mismatch(op: &Operator) -> ParseError {
    SyntaxError::BracketMismatch {
        delimiter: op.name().to_string(),
        location: op.location().clone(),
    }
    .into()
}

impl Grammar for QuaintGrammar<'_> {
    type Operand = Token;
    type Operator = Operator;
    type Node = Node;
    type Error = ParseError;

    fn order(&self, left: &Operator, right: &Operator) -> Result<Order, ParseError> {
        Ok(order(left, right)?)
    }

    fn leaf(&self, operand: Token) -> Result<Node, ParseError> {
        Ok(build::leaf(operand))
    }

    fn finalize(&self, ops: Vec<Operator>, operands: Vec<Node>) -> Result<Node, ParseError> {
        build::finalize(ops, operands)
    }

    /// A closing delimiter that starts a group closes nothing.
    fn check_shift(&self, op: &Operator) -> Result<(), ParseError> {
        match op.left.merge {
            Merge::Closes { required: true, .. } => Err(mismatch(op)),
            _ => Ok(()),
        }
    }

    fn check_end(&self, op: &Operator) -> Result<(), ParseError> {
        match op.right.merge {
            Merge::Opens { required: true, .. } => Err(mismatch(op)),
            _ => Ok(()),
        }
    }
}

/// Quaint document parser.
///
/// Stateless between calls: every parse builds its own token pipeline over a
/// shared, immutable [`Lexicon`].
#[derive(Debug, Clone, Copy)]
pub struct Parser<'l> {
    lexicon: &'l Lexicon,
}

impl Default for Parser<'static> {
    fn default() -> Self {
        Self {
            lexicon: Lexicon::standard(),
        }
    }
}

impl<'l> Parser<'l> {
    /// Create a parser over a custom lexicon.
    pub fn new(lexicon: &'l Lexicon) -> Self {
        Self { lexicon }
    }

    /// Parse source text with the standard lexicon.
    pub fn parse(source: &str) -> Result<Node, ParseError> {
        Parser::default().parse_source(Source::anonymous(source))
    }

    /// Parse a source, keeping its origin for diagnostics.
    pub fn parse_source(&self, source: Arc<Source>) -> Result<Node, ParseError> {
        debug!(
            origin = source.origin().unwrap_or("<anonymous>"),
            len = source.len(),
            "parsing"
        );

        let grammar = QuaintGrammar::new(self.lexicon);
        let elements =
            token_stream(self.lexicon, &source).map(|token| token.map(|t| grammar.element(t)));
        let mut root = engine::parse(&grammar, elements)?;
        whitespace::fix(&mut root, true, true);

        debug!(
            origin = source.origin().unwrap_or("<anonymous>"),
            root = ?root.class(),
            "parsed"
        );
        Ok(root)
    }
}
