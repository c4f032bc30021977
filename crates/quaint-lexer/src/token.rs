use crate::source::Location;

/// How an operator attaches to its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Prefix,
    Infix,
    Suffix,
    /// Not decided yet; resolved from surrounding whitespace and context.
    Ambiguous,
}

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    /// An operator standing alone where an operand is expected, e.g. `[*]`.
    Nullary,
    /// Zero-text placeholder operand.
    Void,
    Operator(Fixity),
}

/// Where a token came from: a lexer rule or a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lexeme {
    Word,
    Operator,
    Separator,
    Open,
    Close,
    // Synthetic
    Indent,
    Dedent,
    LineBreak,
    Juxtaposition,
    Filler,
}

impl Lexeme {
    pub fn is_synthetic(self) -> bool {
        matches!(
            self,
            Lexeme::Indent
                | Lexeme::Dedent
                | Lexeme::LineBreak
                | Lexeme::Juxtaposition
                | Lexeme::Filler
        )
    }
}

/// Whitespace measurements around a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    /// Whitespace characters on the token's own line, before it.
    pub space_before: usize,
    /// Whitespace characters on the token's own line, after it.
    pub space_after: usize,
    /// Newlines crossed between the previous token and this one.
    pub height_before: usize,
    /// Newlines crossed between this token and the next one.
    pub height_after: usize,
}

impl Metrics {
    pub fn measure(wsb: &str, wsa: &str) -> Self {
        let same_line = |s: &str| s.chars().filter(|&c| c != '\r').count();
        Self {
            space_before: same_line(wsb.rsplit('\n').next().unwrap_or("")),
            space_after: same_line(wsa.split('\n').next().unwrap_or("")),
            height_before: wsb.matches('\n').count(),
            height_after: wsa.matches('\n').count(),
        }
    }

    pub fn spaced_before(&self) -> bool {
        self.space_before > 0 || self.height_before > 0
    }

    pub fn spaced_after(&self) -> bool {
        self.space_after > 0 || self.height_after > 0
    }
}

/// A token with the whitespace that surrounds it.
///
/// `location` covers the token text only. Tokens are values: every pipeline
/// stage that changes one produces a new token rather than editing it in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: Lexeme,
    pub text: String,
    /// Whitespace immediately before the token.
    pub wsb: String,
    /// Whitespace immediately after the token.
    pub wsa: String,
    pub metrics: Metrics,
    /// Operator of three or more characters alone on its line.
    pub line_operator: bool,
    pub location: Location,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        lexeme: Lexeme,
        text: impl Into<String>,
        wsb: impl Into<String>,
        wsa: impl Into<String>,
        location: Location,
    ) -> Self {
        let text = text.into();
        let wsb = wsb.into();
        let wsa = wsa.into();
        let metrics = Metrics::measure(&wsb, &wsa);
        let line_operator = lexeme == Lexeme::Operator && text.chars().count() >= 3 && {
            let starts_line = metrics.height_before > 0 || location.start() == wsb.len();
            let ends_line =
                metrics.height_after > 0 || location.end() + wsa.len() == location.source().len();
            starts_line && ends_line
        };
        Self {
            kind,
            lexeme,
            text,
            wsb,
            wsa,
            metrics,
            line_operator,
            location,
        }
    }

    /// A zero-width token placed at `at`, carrying the whitespace `gap` on both sides.
    pub fn synthetic(kind: TokenKind, lexeme: Lexeme, gap: &str, at: Location) -> Self {
        Self::new(kind, lexeme, "", gap, gap, at)
    }

    /// Same token with a different kind (used when resolving fixity).
    pub fn with_kind(self, kind: TokenKind) -> Self {
        Self { kind, ..self }
    }

    /// Same token with a different location.
    pub fn with_location(self, location: Location) -> Self {
        Self { location, ..self }
    }

    pub fn fixity(&self) -> Option<Fixity> {
        match self.kind {
            TokenKind::Operator(fixity) => Some(fixity),
            _ => None,
        }
    }

    pub fn is_operator(&self) -> bool {
        matches!(self.kind, TokenKind::Operator(_))
    }

    /// Identifiers, nullary operators and voids all stand where an operand goes.
    pub fn is_operand(&self) -> bool {
        !self.is_operator()
    }

    /// A blank line (or the edge of the input) separates this token from the previous one.
    pub fn blank_before(&self) -> bool {
        self.metrics.height_before >= 2 || self.location.start() == self.wsb.len()
    }

    /// A blank line (or the edge of the input) separates this token from the next one.
    pub fn blank_after(&self) -> bool {
        self.metrics.height_after >= 2
            || self.location.end() + self.wsa.len() == self.location.source().len()
    }

    /// Newlines in the gap a synthetic token stands for.
    pub fn gap_height(&self) -> usize {
        self.metrics.height_before.max(self.metrics.height_after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;
    use pretty_assertions::assert_eq;

    fn operator(src: &str, start: usize, end: usize) -> Token {
        let source = Source::anonymous(src);
        let wsb_start = src[..start].trim_end_matches(|c: char| c.is_whitespace()).len();
        let wsa_end = end + (src[end..].len() - src[end..].trim_start().len());
        Token::new(
            TokenKind::Operator(Fixity::Ambiguous),
            Lexeme::Operator,
            &src[start..end],
            &src[wsb_start..start],
            &src[end..wsa_end],
            Location::new(&source, start, end),
        )
    }

    #[test]
    fn test_measure_same_line() {
        let m = Metrics::measure("  ", " ");
        assert_eq!(m, Metrics { space_before: 2, space_after: 1, height_before: 0, height_after: 0 });
    }

    #[test]
    fn test_measure_across_lines() {
        let m = Metrics::measure(" \n\n   ", " \n");
        assert_eq!(m.space_before, 3);
        assert_eq!(m.space_after, 1);
        assert_eq!(m.height_before, 2);
        assert_eq!(m.height_after, 1);
    }

    #[test]
    fn test_measure_ignores_carriage_return() {
        let m = Metrics::measure("\r\n  ", "\r\n");
        assert_eq!(m.space_before, 2);
        assert_eq!(m.space_after, 0);
    }

    #[test]
    fn test_line_operator_own_line() {
        let tok = operator("a\n===\nb", 2, 5);
        assert!(tok.line_operator);
    }

    #[test]
    fn test_line_operator_at_input_edges() {
        let tok = operator("---", 0, 3);
        assert!(tok.line_operator);
    }

    #[test]
    fn test_short_operator_is_not_line_operator() {
        let tok = operator("a\n==\nb", 2, 4);
        assert!(!tok.line_operator);
    }

    #[test]
    fn test_operator_sharing_line_is_not_line_operator() {
        let tok = operator("a === b", 2, 5);
        assert!(!tok.line_operator);
    }

    #[test]
    fn test_blank_sides() {
        let tok = operator("a\n\n===\nb", 3, 6);
        assert!(tok.blank_before());
        assert!(!tok.blank_after());
    }
}
