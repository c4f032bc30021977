//! Operand/operator alternation.
//!
//! The precedence parser needs a stream that strictly alternates operand,
//! operator, operand, ... and starts and ends with an operand. [`alternate`]
//! fills the holes with zero-width void operands and juxtaposition operators;
//! [`adjust_locations`] then widens every operand over the whitespace up to
//! its neighbouring operators.

use std::collections::VecDeque;
use std::iter::Peekable;
use std::sync::Arc;

use crate::source::{Location, Source};
use crate::token::{Fixity, Lexeme, Token, TokenKind};
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Operand,
    Prefix,
    Infix,
    Suffix,
}

fn role(token: &Token) -> Role {
    match token.kind {
        TokenKind::Operator(Fixity::Prefix) => Role::Prefix,
        TokenKind::Operator(Fixity::Suffix) => Role::Suffix,
        // Ambiguous operators never reach this stage.
        TokenKind::Operator(Fixity::Infix | Fixity::Ambiguous) => Role::Infix,
        TokenKind::Identifier | TokenKind::Nullary | TokenKind::Void => Role::Operand,
    }
}

/// What to put between two tokens, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filler {
    Void,
    Juxtaposition,
}

fn fillers(last: Role, current: Role) -> &'static [Filler] {
    use Filler::*;
    match (last, current) {
        (Role::Operand, Role::Operand) => &[Juxtaposition],
        (Role::Operand, Role::Prefix) => &[Juxtaposition, Void],
        (Role::Operand, _) => &[],
        (Role::Suffix, Role::Operand) => &[Void, Juxtaposition],
        (Role::Suffix, Role::Prefix) => &[Void, Juxtaposition, Void],
        (_, Role::Operand) => &[],
        _ => &[Void],
    }
}

pub struct Alternator<I: Iterator<Item = Result<Token, Error>>> {
    tokens: I,
    /// Role of the last token emitted; the stream starts after a virtual infix.
    last: Role,
    /// End of the last token and the whitespace after it.
    gap: (Location, String),
    ready: VecDeque<Token>,
    done: bool,
}

pub fn alternate<I>(tokens: I, source: &Arc<Source>) -> Alternator<I>
where
    I: Iterator<Item = Result<Token, Error>>,
{
    Alternator {
        tokens,
        last: Role::Infix,
        gap: (Location::new(source, 0, 0), String::new()),
        ready: VecDeque::new(),
        done: false,
    }
}

impl<I: Iterator<Item = Result<Token, Error>>> Alternator<I> {
    /// Queue the fillers needed before a token of role `current`.
    fn fill(&mut self, current: Role) {
        let (at, gap) = &self.gap;
        let (at, gap) = (at.clone(), gap.clone());
        for filler in fillers(self.last, current) {
            let token = match filler {
                Filler::Void => Token::synthetic(TokenKind::Void, Lexeme::Filler, &gap, at.clone()),
                Filler::Juxtaposition => Token::synthetic(
                    TokenKind::Operator(Fixity::Infix),
                    Lexeme::Juxtaposition,
                    &gap,
                    at.clone(),
                ),
            };
            self.ready.push_back(token);
        }
    }

    fn emit(&mut self, token: Token) {
        self.last = role(&token);
        self.gap = (token.location.at_end(), token.wsa.clone());
        self.ready.push_back(token);
    }
}

impl<I: Iterator<Item = Result<Token, Error>>> Iterator for Alternator<I> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.ready.pop_front() {
                return Some(Ok(token));
            }
            if self.done {
                return None;
            }
            match self.tokens.next() {
                Some(Ok(token)) => {
                    self.fill(role(&token));
                    self.emit(token);
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    // The end acts as an infix operator.
                    self.fill(Role::Infix);
                }
            }
        }
    }
}

/// Widen every operand to touch the operators on either side of it.
///
/// The first operand starts at offset 0 and the last one ends at the end of
/// the source, so operands own all the whitespace between tokens.
pub struct LocationAdjuster<I: Iterator<Item = Result<Token, Error>>> {
    tokens: Peekable<I>,
    prev_end: usize,
}

pub fn adjust_locations<I>(tokens: I) -> LocationAdjuster<I>
where
    I: Iterator<Item = Result<Token, Error>>,
{
    LocationAdjuster {
        tokens: tokens.peekable(),
        prev_end: 0,
    }
}

impl<I: Iterator<Item = Result<Token, Error>>> Iterator for LocationAdjuster<I> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = match self.tokens.next()? {
            Ok(token) => token,
            Err(e) => return Some(Err(e)),
        };
        let token = if token.is_operand() {
            let end = match self.tokens.peek() {
                Some(Ok(next)) => next.location.start(),
                _ => token.location.source().len(),
            };
            let start = self.prev_end.min(token.location.start());
            let end = end.max(token.location.end());
            let location = token.location.with_span(start, end);
            token.with_location(location)
        } else {
            token
        };
        self.prev_end = token.location.end();
        Some(Ok(token))
    }
}
