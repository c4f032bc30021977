//! The order relation between adjacent operators.

use tracing::trace;

use crate::engine::Order;
use crate::operator::{Operator, Tie};
use crate::SyntaxError;

/// Decide between the pending operator `left` and the incoming one `right`.
///
/// Fusion takes precedence over priority, so a bracket closes its own opener
/// regardless of what it would otherwise bind to. Two required delimiters
/// that face each other without pairing are a mismatch of the opener, unless
/// the opener is synthetic and the other one was written in the source.
pub fn order(left: &Operator, right: &Operator) -> Result<Order, SyntaxError> {
    let (l, r) = (&left.right, &right.left);

    let decision = if l.accepts(r) {
        Order::Aggregate
    } else if l.merge.is_required() && r.merge.is_required() {
        let culprit = if left.token.lexeme.is_synthetic() && !right.token.lexeme.is_synthetic() {
            right
        } else {
            left
        };
        return Err(SyntaxError::BracketMismatch {
            delimiter: culprit.name().to_string(),
            location: culprit.location().clone(),
        });
    } else if l.priority > r.priority {
        Order::Left
    } else if l.priority < r.priority {
        Order::Right
    } else {
        match (l.tie, r.tie) {
            (Tie::Left, Tie::Left) => Order::Left,
            (Tie::Right, Tie::Right) => Order::Right,
            _ => {
                return Err(SyntaxError::UnknownOrder {
                    left: left.name().to_string(),
                    right: right.name().to_string(),
                    left_location: left.location().clone(),
                    right_location: right.location().clone(),
                })
            }
        }
    };

    trace!(
        left = left.name(),
        right = right.name(),
        left_priority = %l.priority,
        right_priority = %r.priority,
        ?decision,
        "order"
    );
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{assign, Key, Merge, Priority};
    use pretty_assertions::assert_eq;
    use quaint_lexer::{token_stream, Lexeme, Lexicon, Source};

    fn operators(src: &str) -> Vec<Operator> {
        let lexicon = Lexicon::standard();
        token_stream(lexicon, &Source::anonymous(src))
            .map(|t| t.unwrap())
            .filter(|t| t.is_operator())
            .map(|t| assign(t, lexicon))
            .collect()
    }

    fn first_pair(src: &str) -> Result<Order, SyntaxError> {
        let ops = operators(src);
        order(&ops[0], &ops[1])
    }

    fn with_faces(mut op: Operator, left: Key, right: Key) -> Operator {
        op.left = left;
        op.right = right;
        op
    }

    #[test]
    fn test_tighter_left_reduces() {
        assert_eq!(first_pair("a*b + c").unwrap(), Order::Left);
    }

    #[test]
    fn test_tighter_right_shifts() {
        assert_eq!(first_pair("a + b*c").unwrap(), Order::Right);
    }

    #[test]
    fn test_same_operator_aggregates() {
        assert_eq!(first_pair("a + b + c").unwrap(), Order::Aggregate);
        assert_eq!(first_pair("a b c").unwrap(), Order::Aggregate);
    }

    #[test]
    fn test_different_operators_same_band_tie_right() {
        assert_eq!(first_pair("a + b - c").unwrap(), Order::Right);
    }

    #[test]
    fn test_bracket_pair_aggregates() {
        let ops = operators("[a]");
        assert_eq!(order(&ops[0], &ops[1]).unwrap(), Order::Aggregate);
    }

    #[test]
    fn test_mismatched_brackets() {
        let ops = operators("[a}");
        match order(&ops[0], &ops[1]) {
            Err(SyntaxError::BracketMismatch { delimiter, location }) => {
                assert_eq!(delimiter, "[");
                assert_eq!(location.start(), 0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_mismatch_under_indent_names_written_delimiter() {
        let ops = operators("h\n  a]");
        assert_eq!(ops[0].token.lexeme, Lexeme::Indent);
        match order(&ops[0], &ops[1]) {
            Err(SyntaxError::BracketMismatch { delimiter, location }) => {
                assert_eq!(delimiter, "]");
                assert_eq!(location.start(), 5);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_order_without_tie() {
        let ops = operators("a + b - c");
        let left = with_faces(
            ops[0].clone(),
            ops[0].left.clone(),
            Key::new("+", Priority::new(5, 0), Tie::None, Merge::Never),
        );
        let right = with_faces(
            ops[1].clone(),
            Key::new("-", Priority::new(5, 0), Tie::Left, Merge::Never),
            ops[1].right.clone(),
        );
        match order(&left, &right) {
            Err(SyntaxError::UnknownOrder { left, right, .. }) => {
                assert_eq!((left.as_str(), right.as_str()), ("+", "-"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_optional_delimiters_fall_back_to_priority() {
        // `*` opens an optional pair; `+` closing it does not match, so priority decides.
        let ops = operators("*a+");
        assert_eq!(ops.len(), 2);
        assert_eq!(order(&ops[0], &ops[1]).unwrap(), Order::Left);
    }
}
