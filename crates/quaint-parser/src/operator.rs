//! Priority assignment.
//!
//! Every operator token gets two [`Key`]s: one facing the operand on its left
//! and one facing the operand on its right. The [`order`](crate::order)
//! relation compares the right key of a pending operator with the left key of
//! the next one.

use std::fmt;

use quaint_lexer::{Fixity, Lexeme, Lexicon, Location, Token, TokenKind};

/// Binding strength, compared lexicographically. Higher binds tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority {
    pub band: u16,
    pub rank: u16,
}

impl Priority {
    pub const fn new(band: u16, rank: u16) -> Self {
        Self { band, rank }
    }

    /// Inside faces of brackets.
    pub const DELIMITER: Priority = Priority::new(0, 0);
    /// Inside faces of indentation.
    pub const INDENT: Priority = Priority::new(1, 0);
    pub const WIDE_LINE: Priority = Priority::new(10, 0);
    pub const BLANK_LINE: Priority = Priority::new(20, 0);
    pub const LINE_EDGE: Priority = Priority::new(21, 0);
    pub const LINE: Priority = Priority::new(22, 0);
    /// Left face of an indent-open: what precedes it on the line becomes the head.
    pub const INDENT_HEAD: Priority = Priority::new(50, 0);
    pub const SPACED_OPERATOR: Priority = Priority::new(110, 0);
    pub const SPACED_JUXTAPOSITION: Priority = Priority::new(120, 0);
    pub const OPERATOR: Priority = Priority::new(310, 0);
    pub const JUXTAPOSITION: Priority = Priority::new(320, 0);
    /// Outside faces of prefix and suffix operators, which always take the
    /// void operand next to them first.
    pub const IMMEDIATE: Priority = Priority::new(1000, 0);

    /// Same band with a rank that decreases as the marker gets wider.
    fn by_width(self, width: usize) -> Self {
        let width = u16::try_from(width).unwrap_or(u16::MAX);
        Priority::new(self.band, 1000u16.saturating_sub(width))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.band, self.rank)
    }
}

/// How equal priorities resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tie {
    Left,
    Right,
    /// Equal priority is an error.
    None,
}

/// Which operators a key can fuse with into one node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Merge {
    Never,
    /// N-ary chains of the same operator: `a, b, c`.
    Same,
    /// Opening delimiter waiting for `closer`.
    Opens { closer: String, required: bool },
    /// Closing delimiter matching `opener`.
    Closes { opener: String, required: bool },
}

impl Merge {
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            Merge::Opens { required: true, .. } | Merge::Closes { required: true, .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub text: String,
    pub priority: Priority,
    pub tie: Tie,
    pub merge: Merge,
}

impl Key {
    pub fn new(text: impl Into<String>, priority: Priority, tie: Tie, merge: Merge) -> Self {
        Self {
            text: text.into(),
            priority,
            tie,
            merge,
        }
    }

    fn immediate(text: &str) -> Self {
        Key::new(text, Priority::IMMEDIATE, Tie::Left, Merge::Never)
    }

    /// Can `self`, facing right, fuse with `other`, facing left?
    pub fn accepts(&self, other: &Key) -> bool {
        match (&self.merge, &other.merge) {
            (Merge::Same, Merge::Same) => {
                self.text == other.text && self.priority == other.priority
            }
            (Merge::Opens { closer, .. }, Merge::Closes { opener, .. }) => {
                *closer == other.text && *opener == self.text
            }
            _ => false,
        }
    }
}

/// An operator token with its two faces.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub token: Token,
    pub left: Key,
    pub right: Key,
}

pub const INDENT: &str = "INDENT";
pub const DEDENT: &str = "DEDENT";

impl Operator {
    pub fn lexeme(&self) -> Lexeme {
        self.token.lexeme
    }

    pub fn location(&self) -> &Location {
        &self.token.location
    }

    /// The name used in messages; synthetic operators have no text of their own.
    pub fn name(&self) -> &str {
        match self.token.lexeme {
            Lexeme::Indent => INDENT,
            Lexeme::Dedent => DEDENT,
            Lexeme::LineBreak => "line break",
            Lexeme::Juxtaposition if self.is_line_break() => "line break",
            Lexeme::Juxtaposition => "juxtaposition",
            _ => &self.token.text,
        }
    }

    /// Line breaks, and juxtapositions standing in for a suppressed one.
    pub fn is_line_break(&self) -> bool {
        match self.token.lexeme {
            Lexeme::LineBreak => true,
            Lexeme::Juxtaposition => self.token.gap_height() > 0,
            _ => false,
        }
    }

    /// Operators that build block nodes.
    pub fn is_line_level(&self) -> bool {
        self.is_line_break() || self.token.line_operator
    }
}

fn line_break_priority(token: &Token) -> Priority {
    if token.gap_height() >= 2 {
        Priority::BLANK_LINE
    } else {
        Priority::LINE
    }
}

fn spaced(token: &Token) -> bool {
    token.metrics.spaced_before() || token.metrics.spaced_after()
}

/// Paired same-line delimiters: longer markers bind looser.
fn delimiter_priority(text: &str) -> Priority {
    let len = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
    Priority::new(99u16.saturating_sub(len).max(91), 0)
}

/// Assign left and right keys to an operator token.
pub fn assign(token: Token, lexicon: &Lexicon) -> Operator {
    let text = token.text.clone();
    let fixity = token.fixity().unwrap_or(Fixity::Infix);

    let (left, right) = match (token.lexeme, fixity) {
        (Lexeme::Open, _) => {
            let closer = lexicon
                .closer_for(&text)
                .map(String::from)
                .unwrap_or_default();
            (
                Key::immediate(&text),
                Key::new(
                    &text,
                    Priority::DELIMITER,
                    Tie::None,
                    Merge::Opens {
                        closer,
                        required: true,
                    },
                ),
            )
        }
        (Lexeme::Close, _) => {
            let opener = lexicon
                .opener_for(&text)
                .map(String::from)
                .unwrap_or_default();
            (
                Key::new(
                    &text,
                    Priority::DELIMITER,
                    Tie::None,
                    Merge::Closes {
                        opener,
                        required: true,
                    },
                ),
                Key::immediate(&text),
            )
        }
        (Lexeme::Indent, _) => (
            Key::new(INDENT, Priority::INDENT_HEAD, Tie::Left, Merge::Never),
            Key::new(
                INDENT,
                Priority::INDENT,
                Tie::None,
                Merge::Opens {
                    closer: DEDENT.into(),
                    required: true,
                },
            ),
        ),
        (Lexeme::Dedent, _) => (
            Key::new(
                DEDENT,
                Priority::INDENT,
                Tie::None,
                Merge::Closes {
                    opener: INDENT.into(),
                    required: true,
                },
            ),
            Key::immediate(DEDENT),
        ),
        (Lexeme::LineBreak, _) => {
            let key = Key::new("", line_break_priority(&token), Tie::Left, Merge::Same);
            (key.clone(), key)
        }
        (Lexeme::Juxtaposition, _) => {
            let priority = if token.gap_height() > 0 {
                line_break_priority(&token)
            } else if spaced(&token) {
                Priority::SPACED_JUXTAPOSITION
            } else {
                Priority::JUXTAPOSITION
            };
            let key = Key::new("", priority, Tie::Left, Merge::Same);
            (key.clone(), key)
        }
        (Lexeme::Separator, _) => {
            let band = match (text.as_str(), spaced(&token)) {
                (";", true) => 100,
                (";", false) => 300,
                (_, true) => 101,
                (_, false) => 301,
            };
            let key = Key::new(&text, Priority::new(band, 0), Tie::Right, Merge::Same);
            (key.clone(), key)
        }
        (_, fixity) if token.line_operator => {
            let width = text.chars().count();
            match fixity {
                Fixity::Prefix => (
                    Key::immediate(&text),
                    Key::new(&text, Priority::LINE_EDGE.by_width(width), Tie::Left, Merge::Never),
                ),
                Fixity::Suffix => (
                    Key::new(&text, Priority::LINE_EDGE.by_width(width), Tie::Left, Merge::Never),
                    Key::immediate(&text),
                ),
                _ => {
                    let key = Key::new(
                        &text,
                        Priority::WIDE_LINE.by_width(width),
                        Tie::Left,
                        Merge::Same,
                    );
                    (key.clone(), key)
                }
            }
        }
        (_, Fixity::Prefix) => {
            let right = if token.metrics.spaced_after() {
                Key::new(&text, Priority::SPACED_OPERATOR, Tie::Right, Merge::Never)
            } else {
                Key::new(
                    &text,
                    delimiter_priority(&text),
                    Tie::Left,
                    Merge::Opens {
                        closer: text.clone(),
                        required: false,
                    },
                )
            };
            (Key::immediate(&text), right)
        }
        (_, Fixity::Suffix) => {
            let left = if token.metrics.spaced_before() {
                Key::new(&text, Priority::SPACED_OPERATOR, Tie::Right, Merge::Never)
            } else {
                Key::new(
                    &text,
                    delimiter_priority(&text),
                    Tie::Left,
                    Merge::Closes {
                        opener: text.clone(),
                        required: false,
                    },
                )
            };
            (left, Key::immediate(&text))
        }
        (_, _) => {
            let priority = if spaced(&token) {
                Priority::SPACED_OPERATOR
            } else {
                Priority::OPERATOR
            };
            let key = Key::new(&text, priority, Tie::Right, Merge::Same);
            (key.clone(), key)
        }
    };

    debug_assert!(
        matches!(token.kind, TokenKind::Operator(_)),
        "priority assigned to an operand"
    );
    Operator { token, left, right }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quaint_lexer::{token_stream, Source};

    /// Operators of `src`, in order, with their keys assigned.
    fn operators(src: &str) -> Vec<Operator> {
        let lexicon = Lexicon::standard();
        token_stream(lexicon, &Source::anonymous(src))
            .map(|t| t.unwrap())
            .filter(|t| t.is_operator())
            .map(|t| assign(t, lexicon))
            .collect()
    }

    fn bands(src: &str) -> Vec<(u16, u16)> {
        operators(src)
            .iter()
            .map(|op| (op.left.priority.band, op.right.priority.band))
            .collect()
    }

    // =========================================================================
    // Inline operators
    // =========================================================================

    #[test]
    fn test_unspaced_binds_tighter() {
        assert_eq!(bands("a+b"), vec![(310, 310)]);
        assert_eq!(bands("a + b"), vec![(110, 110)]);
    }

    #[test]
    fn test_juxtaposition() {
        assert_eq!(bands("a b"), vec![(120, 120)]);
        assert_eq!(bands("a[b]"), vec![(320, 320), (1000, 0), (0, 1000)]);
    }

    #[test]
    fn test_separators() {
        assert_eq!(bands("a; b, c"), vec![(100, 100), (101, 101)]);
        assert_eq!(bands("a;b,c"), vec![(300, 300), (301, 301)]);
    }

    #[test]
    fn test_prefix_operator_faces() {
        let ops = operators("*a b*");
        assert_eq!(ops[0].left.priority, Priority::IMMEDIATE);
        assert_eq!(ops[0].right.priority, Priority::new(98, 0));
        assert_eq!(
            ops[0].right.merge,
            Merge::Opens {
                closer: "*".into(),
                required: false
            }
        );
        let last = ops.last().unwrap();
        assert!(ops[0].right.accepts(&last.left));
    }

    #[test]
    fn test_spaced_prefix_does_not_pair() {
        let ops = operators("- a");
        assert_eq!(ops[0].right.priority, Priority::SPACED_OPERATOR);
        assert_eq!(ops[0].right.merge, Merge::Never);
    }

    #[test]
    fn test_longer_delimiters_bind_looser() {
        let single = operators("*a*")[0].right.priority;
        let double = operators("**a**")[0].right.priority;
        assert!(double < single);
    }

    // =========================================================================
    // Brackets and lines
    // =========================================================================

    #[test]
    fn test_brackets_pair() {
        let ops = operators("[a]");
        assert_eq!(ops[0].right.priority, Priority::DELIMITER);
        assert!(ops[0].right.accepts(&ops[1].left));
        assert!(!operators("{a]")[0].right.accepts(&operators("{a]")[1].left));
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(bands("a\nb"), vec![(22, 22)]);
        assert_eq!(bands("a\n\nb"), vec![(20, 20)]);
    }

    #[test]
    fn test_indent_faces() {
        let ops = operators("h\n  a");
        assert_eq!(ops[0].name(), INDENT);
        assert_eq!(ops[0].left.priority, Priority::INDENT_HEAD);
        assert!(ops[0].right.accepts(&ops[1].left));
        assert_eq!(ops[1].name(), DEDENT);
    }

    #[test]
    fn test_wide_line_operators() {
        let ops = operators("a\n\n---\n\nb\n\n=====\n\nc");
        assert_eq!(ops[0].left.priority, Priority::new(10, 997));
        assert_eq!(ops[1].left.priority, Priority::new(10, 995));
        assert!(ops[1].left.priority < ops[0].right.priority);
    }

    #[test]
    fn test_underline_faces() {
        let ops = operators("Title\n=====\n\ntext");
        assert_eq!(ops[0].left.priority, Priority::new(21, 995));
        assert_eq!(ops[0].right.priority, Priority::IMMEDIATE);
        // The blank line after the underline is a juxtaposition across the gap.
        assert!(ops[1].is_line_break());
        assert_eq!(ops[1].left.priority, Priority::BLANK_LINE);
    }
}
