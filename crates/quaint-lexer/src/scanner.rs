//! Table-driven tokenizer.
//!
//! The [`Lexer`] walks the source once, front to back. At each position it
//! skips insignificant whitespace, looks up the rules for the next character
//! in the [`Lexicon`] and takes the first one that matches. The whitespace on
//! both sides of the match is kept on the token.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Lexicon;
use crate::source::{Location, Source};
use crate::token::Token;
use crate::{Error, TokenizerError};

/// Memoized whitespace run lengths, keyed by byte offset.
///
/// Each gap is measured twice, once as the trailing whitespace of a token and
/// once as the leading whitespace of the next one.
#[derive(Debug, Default)]
pub struct WhitespaceCache {
    runs: HashMap<usize, usize>,
}

impl WhitespaceCache {
    pub fn run(&mut self, lexicon: &Lexicon, text: &str, pos: usize) -> usize {
        *self
            .runs
            .entry(pos)
            .or_insert_with(|| lexicon.whitespace_len(&text[pos..]))
    }
}

/// Lazy stream of raw tokens.
pub struct Lexer<'l> {
    lexicon: &'l Lexicon,
    source: Arc<Source>,
    pos: usize,
    cache: WhitespaceCache,
    done: bool,
}

impl<'l> Lexer<'l> {
    pub fn new(lexicon: &'l Lexicon, source: Arc<Source>) -> Self {
        Self {
            lexicon,
            source,
            pos: 0,
            cache: WhitespaceCache::default(),
            done: false,
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let source = Arc::clone(&self.source);
        let text = source.text();

        let gap = self.pos;
        let start = gap + self.cache.run(self.lexicon, text, gap);
        let Some(c) = text[start..].chars().next() else {
            self.done = true;
            return None;
        };

        for rule in self.lexicon.rules_for(c) {
            let Some(m) = rule.pattern.find(&text[start..]) else {
                continue;
            };
            if m.is_empty() {
                continue;
            }
            let end = start + m.end();
            let after = end + self.cache.run(self.lexicon, text, end);
            self.pos = end;
            return Some(Ok(Token::new(
                rule.kind,
                rule.lexeme,
                m.as_str(),
                &text[gap..start],
                &text[end..after],
                Location::new(&source, start, end),
            )));
        }

        self.done = true;
        let location = Location::new(&source, start, start + c.len_utf8());
        Some(Err(TokenizerError::NoToken { location }.into()))
    }
}

/// Tokenize `source` with `lexicon`.
pub fn tokenize(lexicon: &Lexicon, source: Arc<Source>) -> Lexer<'_> {
    Lexer::new(lexicon, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Fixity, Lexeme, TokenKind};
    use pretty_assertions::assert_eq;

    fn lex(src: &str) -> Vec<Token> {
        tokenize(Lexicon::standard(), Source::anonymous(src))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    fn texts(src: &str) -> Vec<String> {
        lex(src).into_iter().map(|t| t.text).collect()
    }

    fn lexemes(src: &str) -> Vec<Lexeme> {
        lex(src).into_iter().map(|t| t.lexeme).collect()
    }

    // =========================================================================
    // Basic tokens
    // =========================================================================

    #[test]
    fn test_empty_source() {
        assert!(lex("").is_empty());
        assert!(lex("  \n\t ").is_empty());
    }

    #[test]
    fn test_words() {
        assert_eq!(texts("hello world"), vec!["hello", "world"]);
    }

    #[test]
    fn test_operators_and_words() {
        assert_eq!(texts("a+b * c"), vec!["a", "+", "b", "*", "c"]);
        assert_eq!(
            lexemes("a+b"),
            vec![Lexeme::Word, Lexeme::Operator, Lexeme::Word]
        );
    }

    #[test]
    fn test_operator_run() {
        assert_eq!(texts("a :=> b"), vec!["a", ":=>", "b"]);
    }

    #[test]
    fn test_brackets_are_single_tokens() {
        let tokens = lex("[[a]]");
        assert_eq!(
            tokens.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(),
            vec!["[", "[", "a", "]", "]"]
        );
        assert_eq!(tokens[0].kind, TokenKind::Operator(Fixity::Prefix));
        assert_eq!(tokens[4].kind, TokenKind::Operator(Fixity::Suffix));
    }

    #[test]
    fn test_separators() {
        let tokens = lex("a,,b");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1].lexeme, Lexeme::Separator);
        assert_eq!(tokens[1].kind, TokenKind::Operator(Fixity::Infix));
        assert_eq!(tokens[2].text, ",");
    }

    #[test]
    fn test_ambiguous_operator_fixity() {
        let tokens = lex("-a");
        assert_eq!(tokens[0].kind, TokenKind::Operator(Fixity::Ambiguous));
    }

    #[test]
    fn test_escaped_operator_is_word() {
        assert_eq!(texts(r"a\*b c"), vec![r"a\*b", "c"]);
    }

    #[test]
    fn test_non_ascii_word() {
        assert_eq!(texts("café crème"), vec!["café", "crème"]);
    }

    // =========================================================================
    // Whitespace
    // =========================================================================

    #[test]
    fn test_whitespace_is_kept_on_both_sides() {
        let tokens = lex("  a \n b");
        assert_eq!(tokens[0].wsb, "  ");
        assert_eq!(tokens[0].wsa, " \n ");
        assert_eq!(tokens[1].wsb, " \n ");
        assert_eq!(tokens[1].wsa, "");
    }

    #[test]
    fn test_metrics() {
        let tokens = lex("a\n\n   b  c");
        assert_eq!(tokens[1].metrics.height_before, 2);
        assert_eq!(tokens[1].metrics.space_before, 3);
        assert_eq!(tokens[1].metrics.space_after, 2);
        assert_eq!(tokens[0].metrics.height_after, 2);
    }

    #[test]
    fn test_soft_continuation_is_whitespace() {
        assert_eq!(texts("a~b"), vec!["a", "b"]);
    }

    #[test]
    fn test_locations_cover_token_text() {
        let tokens = lex(" ab + c");
        let spans: Vec<_> = tokens
            .iter()
            .map(|t| (t.location.start(), t.location.end()))
            .collect();
        assert_eq!(spans, vec![(1, 3), (4, 5), (6, 7)]);
    }

    #[test]
    fn test_line_operator_detected() {
        let tokens = lex("Title\n=====\n\ntext");
        assert!(tokens[1].line_operator);
        assert!(!tokens[0].line_operator);
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn test_trailing_escape_is_error() {
        let mut lexer = tokenize(Lexicon::standard(), Source::anonymous("abc \\"));
        assert_eq!(lexer.next().unwrap().unwrap().text, "abc");
        let err = lexer.next().unwrap().unwrap_err();
        match err {
            Error::Tokenizer(TokenizerError::NoToken { location }) => {
                assert_eq!(location.start(), 4);
                assert_eq!(location.to_string(), "1:5");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_cache_memoizes_runs() {
        let lexicon = Lexicon::standard();
        let mut cache = WhitespaceCache::default();
        assert_eq!(cache.run(lexicon, "a   b", 1), 3);
        assert_eq!(cache.run(lexicon, "a   b", 1), 3);
        assert_eq!(cache.runs.len(), 1);
    }
}
