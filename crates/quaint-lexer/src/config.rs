//! Lexer configuration and the compiled rule table.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::token::{Fixity, Lexeme, TokenKind};

/// Character classes the lexer is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerConfig {
    /// Opening and closing bracket glyphs, paired.
    pub brackets: Vec<(char, char)>,
    /// Characters that form operator runs.
    pub operator_chars: String,
    /// Characters that each form a single infix separator.
    pub separators: String,
    /// Insignificant characters between tokens, including the soft-continuation marker.
    pub whitespace: String,
    /// Makes the following character part of a word, whatever it is.
    pub escape: char,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            brackets: vec![('[', ']'), ('{', '}')],
            operator_chars: "+-*/^=%#$@&|!?<>:".into(),
            separators: ",;".into(),
            whitespace: " \t\r\n~".into(),
            escape: '\\',
        }
    }
}

/// Which characters a rule can start on.
#[derive(Debug, Clone)]
enum Trigger {
    Chars(Vec<char>),
    Any,
}

/// One entry of the rule table.
#[derive(Debug, Clone)]
pub struct Rule {
    pub kind: TokenKind,
    pub lexeme: Lexeme,
    /// Anchored at the start of the remaining text.
    pub pattern: Regex,
}

const BUCKETS: usize = 129;

fn bucket(c: char) -> usize {
    if c.is_ascii() {
        c as usize
    } else {
        BUCKETS - 1
    }
}

fn class(chars: impl IntoIterator<Item = char>) -> String {
    chars
        .into_iter()
        .map(|c| regex::escape(c.encode_utf8(&mut [0; 4])))
        .collect()
}

static STANDARD: Lazy<Lexicon> = Lazy::new(|| {
    Lexicon::new(&LexerConfig::default()).expect("built-in rule table must compile")
});

/// Immutable rule table, indexed by the first character of a token.
///
/// Rules are tried in table order within a bucket and the first match wins.
/// Characters outside ASCII share a single bucket.
#[derive(Debug, Clone)]
pub struct Lexicon {
    rules: Vec<Rule>,
    dispatch: Vec<Vec<usize>>,
    whitespace: Regex,
    brackets: Vec<(char, char)>,
}

impl Lexicon {
    pub fn new(config: &LexerConfig) -> Result<Self, regex::Error> {
        let opens: Vec<char> = config.brackets.iter().map(|&(o, _)| o).collect();
        let closes: Vec<char> = config.brackets.iter().map(|&(_, c)| c).collect();
        let operators: Vec<char> = config.operator_chars.chars().collect();
        let separators: Vec<char> = config.separators.chars().collect();

        let reserved = class(
            opens
                .iter()
                .chain(&closes)
                .chain(&operators)
                .chain(&separators)
                .copied()
                .chain(config.whitespace.chars())
                .chain(std::iter::once(config.escape)),
        );
        let escape = regex::escape(config.escape.encode_utf8(&mut [0; 4]));

        let table = [
            (
                Trigger::Chars(opens.clone()),
                format!("^[{}]", class(opens)),
                TokenKind::Operator(Fixity::Prefix),
                Lexeme::Open,
            ),
            (
                Trigger::Chars(closes.clone()),
                format!("^[{}]", class(closes)),
                TokenKind::Operator(Fixity::Suffix),
                Lexeme::Close,
            ),
            (
                Trigger::Chars(operators.clone()),
                format!("^[{}]+", class(operators)),
                TokenKind::Operator(Fixity::Ambiguous),
                Lexeme::Operator,
            ),
            (
                Trigger::Chars(separators.clone()),
                format!("^[{}]", class(separators)),
                TokenKind::Operator(Fixity::Infix),
                Lexeme::Separator,
            ),
            (
                Trigger::Any,
                format!("^(?s:{escape}.|[^{reserved}])+"),
                TokenKind::Identifier,
                Lexeme::Word,
            ),
        ];

        let mut rules: Vec<Rule> = Vec::with_capacity(table.len());
        let mut dispatch = vec![Vec::new(); BUCKETS];
        for (trigger, pattern, kind, lexeme) in table {
            let index = rules.len();
            match trigger {
                // An empty class would not compile; the rule just does not exist.
                Trigger::Chars(chars) if chars.is_empty() => continue,
                Trigger::Chars(chars) => {
                    for c in chars {
                        let slot: &mut Vec<usize> = &mut dispatch[bucket(c)];
                        if !slot.contains(&index) {
                            slot.push(index);
                        }
                    }
                }
                Trigger::Any => dispatch.iter_mut().for_each(|slot| slot.push(index)),
            }
            rules.push(Rule {
                kind,
                lexeme,
                pattern: Regex::new(&pattern)?,
            });
        }

        let whitespace = Regex::new(&format!("^[{}]*", class(config.whitespace.chars())))?;

        Ok(Self {
            rules,
            dispatch,
            whitespace,
            brackets: config.brackets.clone(),
        })
    }

    /// The lexicon for [`LexerConfig::default`], built on first use.
    pub fn standard() -> &'static Lexicon {
        &STANDARD
    }

    /// Candidate rules for a token starting with `c`, in priority order.
    pub fn rules_for(&self, c: char) -> impl Iterator<Item = &Rule> {
        self.dispatch[bucket(c)].iter().map(|&i| &self.rules[i])
    }

    /// Length in bytes of the whitespace run at the start of `text`.
    pub fn whitespace_len(&self, text: &str) -> usize {
        self.whitespace.find(text).map_or(0, |m| m.end())
    }

    pub fn closer_for(&self, open: &str) -> Option<char> {
        let mut chars = open.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        self.brackets.iter().find(|&&(o, _)| o == c).map(|&(_, close)| close)
    }

    pub fn opener_for(&self, close: &str) -> Option<char> {
        let mut chars = close.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        self.brackets.iter().find(|&&(_, cl)| cl == c).map(|&(open, _)| open)
    }
}
