//! Indentation lowering.
//!
//! Significant indentation is turned into explicit tokens so that the parser
//! never has to look at columns: an indent-open (infix) before a deeper line,
//! an indent-close (suffix) for each level left, and a line-break (infix)
//! between sibling lines.
//!
//! Inside brackets indentation is not significant: a newline there only ever
//! becomes a line break, so a bracket can wrap onto an indented line.

use std::collections::VecDeque;
use std::iter::Peekable;

use tracing::trace;

use crate::token::{Fixity, Lexeme, Token, TokenKind};
use crate::Error;

pub struct IndentLowerer<I: Iterator<Item = Result<Token, Error>>> {
    tokens: Peekable<I>,
    /// Widths of the enclosing levels.
    stack: Vec<usize>,
    /// Width of the current level, set from the first token.
    current: Option<usize>,
    /// Brackets opened and not yet closed.
    depth: usize,
    pending: VecDeque<Token>,
    done: bool,
}

pub fn lower_indent<I>(tokens: I) -> IndentLowerer<I>
where
    I: Iterator<Item = Result<Token, Error>>,
{
    IndentLowerer {
        tokens: tokens.peekable(),
        stack: Vec::new(),
        current: None,
        depth: 0,
        pending: VecDeque::new(),
        done: false,
    }
}

fn synthetic(after: &Token, fixity: Fixity, lexeme: Lexeme) -> Token {
    Token::synthetic(
        TokenKind::Operator(fixity),
        lexeme,
        &after.wsa,
        after.location.at_end(),
    )
}

impl<I: Iterator<Item = Result<Token, Error>>> IndentLowerer<I> {
    /// Queue the synthetic tokens that go between `token` and what follows it.
    fn splice_after(&mut self, token: &Token) {
        match token.lexeme {
            Lexeme::Open => self.depth += 1,
            Lexeme::Close => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        let mut current = *self.current.get_or_insert(token.metrics.space_before);

        match self.tokens.peek() {
            None => {
                while let Some(width) = self.stack.pop() {
                    trace!(from = current, to = width, "dedent at end of input");
                    current = width;
                    self.pending
                        .push_back(synthetic(token, Fixity::Suffix, Lexeme::Dedent));
                }
            }
            Some(Ok(next)) if token.metrics.height_after > 0 && self.depth > 0 => {
                let edge = token.lexeme == Lexeme::Open || next.lexeme == Lexeme::Close;
                if !edge && !token.line_operator && !next.line_operator {
                    self.pending
                        .push_back(synthetic(token, Fixity::Infix, Lexeme::LineBreak));
                }
            }
            Some(Ok(next)) if token.metrics.height_after > 0 => {
                let width = next.metrics.space_before;
                let next_is_line_operator = next.line_operator;
                if width > current {
                    trace!(from = current, to = width, "indent");
                    self.stack.push(current);
                    current = width;
                    self.pending
                        .push_back(synthetic(token, Fixity::Infix, Lexeme::Indent));
                } else {
                    while width < current && self.stack.last().is_some_and(|&top| width <= top) {
                        let top = self.stack.pop().unwrap_or(width);
                        trace!(from = current, to = top, "dedent");
                        current = top;
                        self.pending
                            .push_back(synthetic(token, Fixity::Suffix, Lexeme::Dedent));
                    }
                    if !token.line_operator && !next_is_line_operator {
                        self.pending
                            .push_back(synthetic(token, Fixity::Infix, Lexeme::LineBreak));
                    }
                }
            }
            _ => {}
        }

        self.current = Some(current);
    }
}

impl<I: Iterator<Item = Result<Token, Error>>> Iterator for IndentLowerer<I> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.pop_front() {
            return Some(Ok(token));
        }
        if self.done {
            return None;
        }
        match self.tokens.next() {
            None => {
                self.done = true;
                None
            }
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e))
            }
            Some(Ok(token)) => {
                self.splice_after(&token);
                Some(Ok(token))
            }
        }
    }
}
