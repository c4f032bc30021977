//! Fixity resolution for operator runs.
//!
//! Operator tokens come out of the lexer with [`Fixity::Ambiguous`]. Runs of
//! them are buffered until the next token with a known role arrives, then
//! resolved from context (does an operand need to start here, or end here?)
//! and, when context is not enough, from the whitespace around the first
//! operator of the run.

use std::collections::VecDeque;

use crate::token::{Fixity, Token, TokenKind};
use crate::{Error, SyntaxError};

pub struct Disambiguator<I: Iterator<Item = Result<Token, Error>>> {
    tokens: I,
    buffer: Vec<Token>,
    ready: VecDeque<Token>,
    /// An operand must follow: we are at the start or after a prefix/infix operator.
    prefix_expected: bool,
    done: bool,
}

pub fn disambiguate<I>(tokens: I) -> Disambiguator<I>
where
    I: Iterator<Item = Result<Token, Error>>,
{
    Disambiguator {
        tokens,
        buffer: Vec::new(),
        ready: VecDeque::new(),
        prefix_expected: true,
        done: false,
    }
}

fn prefix_expected_after(token: &Token) -> bool {
    matches!(
        token.kind,
        TokenKind::Operator(Fixity::Prefix | Fixity::Infix | Fixity::Ambiguous)
    )
}

fn resolve(
    tokens: &[Token],
    mut prefix: bool,
    suffix: bool,
    out: &mut Vec<Token>,
) -> Result<(), SyntaxError> {
    let as_fixity = |t: &Token, fixity| t.clone().with_kind(TokenKind::Operator(fixity));

    let mut run = tokens;
    while let Some((first, rest)) = run.split_first() {
        match (prefix, suffix) {
            (true, true) if rest.is_empty() => {
                out.push(first.clone().with_kind(TokenKind::Nullary));
                return Ok(());
            }
            (true, true) => {
                return Err(SyntaxError::AmbiguousNullary {
                    operators: run.to_vec(),
                })
            }
            (true, false) => {
                out.extend(run.iter().map(|t| as_fixity(t, Fixity::Prefix)));
                return Ok(());
            }
            (false, true) => {
                out.extend(run.iter().map(|t| as_fixity(t, Fixity::Suffix)));
                return Ok(());
            }
            (false, false) => {
                let (before, after) = if first.line_operator {
                    (first.blank_before(), first.blank_after())
                } else {
                    (first.metrics.space_before > 0, first.metrics.space_after > 0)
                };
                // The rest of the run starts after whatever `first` became.
                let fixity = match (before, after) {
                    (true, false) => Fixity::Prefix,
                    (false, true) => Fixity::Suffix,
                    _ => Fixity::Infix,
                };
                out.push(as_fixity(first, fixity));
                prefix = fixity != Fixity::Suffix;
            }
        }
        run = rest;
    }
    Ok(())
}

impl<I: Iterator<Item = Result<Token, Error>>> Disambiguator<I> {
    /// Resolve the buffered run. `suffix` tells whether the token after the run
    /// needs an operand before it (an infix or suffix operator, or the end).
    fn flush(&mut self, suffix: bool) -> Result<(), SyntaxError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let run = std::mem::take(&mut self.buffer);
        let mut resolved = Vec::with_capacity(run.len());
        resolve(&run, self.prefix_expected, suffix, &mut resolved)?;
        for token in resolved {
            self.push(token);
        }
        Ok(())
    }

    fn push(&mut self, token: Token) {
        self.prefix_expected = prefix_expected_after(&token);
        self.ready.push_back(token);
    }

    fn fail(&mut self, err: SyntaxError) -> Option<Result<Token, Error>> {
        self.done = true;
        self.ready.clear();
        Some(Err(err.into()))
    }
}

impl<I: Iterator<Item = Result<Token, Error>>> Iterator for Disambiguator<I> {
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
                Some(Ok(token)) if token.fixity() == Some(Fixity::Ambiguous) => {
                    self.buffer.push(token);
                }
                Some(Ok(token)) => {
                    let suffix = matches!(
                        token.kind,
                        TokenKind::Operator(Fixity::Infix | Fixity::Suffix)
                    );
                    if let Err(err) = self.flush(suffix) {
                        return self.fail(err);
                    }
                    self.push(token);
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    if let Err(err) = self.flush(true) {
                        return self.fail(err);
                    }
                }
            }
        }
    }
}
