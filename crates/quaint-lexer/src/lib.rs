//! Quaint Lexer
//!
//! Turns Quaint markup into a strictly alternating stream of operands and
//! operators, ready for the precedence parser. The stream is built in stages,
//! each a lazy iterator over `Result<Token, Error>`:
//!
//! 1. [`tokenize`]: raw tokens with their surrounding whitespace.
//! 2. [`lower_indent`]: indentation becomes explicit indent/dedent/line-break tokens.
//! 3. [`disambiguate`]: ambiguous operators become prefix, infix, suffix or nullary.
//! 4. [`alternate`]: void operands and juxtapositions restore alternation.
//! 5. [`adjust_locations`]: operands grow to cover the whitespace around them.
//!
//! [`token_stream`] chains all of them.
//!
//! # Example
//!
//! ```
//! use quaint_lexer::{token_stream, Lexicon, Source};
//!
//! let source = Source::anonymous("a + b");
//! let tokens: Vec<_> = token_stream(Lexicon::standard(), &source)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(tokens.len(), 3);
//! ```

pub mod alternate;
pub mod config;
pub mod fixity;
pub mod indent;
pub mod scanner;
pub mod source;
pub mod token;

use std::sync::Arc;

pub use alternate::{adjust_locations, alternate};
pub use config::{LexerConfig, Lexicon};
pub use fixity::disambiguate;
pub use indent::lower_indent;
pub use scanner::{tokenize, Lexer};
pub use source::{Location, Source};
pub use token::{Fixity, Lexeme, Metrics, Token, TokenKind};

/// No lexer rule matches at some position.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TokenizerError {
    #[error("No token can be read at {location}")]
    NoToken { location: Location },
}

/// The token stream cannot be arranged into a tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("Ambiguous operators {} at {}", texts(.operators), span(.operators))]
    AmbiguousNullary { operators: Vec<Token> },

    #[error("Cannot order operator '{left}' at {left_location} against '{right}' at {right_location}")]
    UnknownOrder {
        left: String,
        right: String,
        left_location: Location,
        right_location: Location,
    },

    #[error("Unmatched delimiter '{delimiter}' at {location}")]
    BracketMismatch { delimiter: String, location: Location },

    #[error("Internal parser error: {message}")]
    Internal {
        message: String,
        location: Option<Location>,
    },
}

impl SyntaxError {
    pub fn internal(message: impl Into<String>, location: Option<Location>) -> Self {
        SyntaxError::Internal {
            message: message.into(),
            location,
        }
    }
}

/// Any error that aborts a parse.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl Error {
    /// Where the error happened, for excerpting.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Tokenizer(TokenizerError::NoToken { location }) => Some(location.clone()),
            Error::Syntax(SyntaxError::AmbiguousNullary { operators }) => {
                Location::merge(operators.iter().map(|t| &t.location))
            }
            Error::Syntax(SyntaxError::UnknownOrder {
                left_location,
                right_location,
                ..
            }) => Location::merge([left_location, right_location]),
            Error::Syntax(SyntaxError::BracketMismatch { location, .. }) => Some(location.clone()),
            Error::Syntax(SyntaxError::Internal { location, .. }) => location.clone(),
        }
    }
}

fn texts(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| format!("'{}'", t.text))
        .collect::<Vec<_>>()
        .join(" ")
}

fn span(tokens: &[Token]) -> String {
    Location::merge(tokens.iter().map(|t| &t.location))
        .map_or_else(|| "?".to_string(), |l| l.to_string())
}

/// The full lexing pipeline, from source text to the alternating stream.
pub fn token_stream<'l>(
    lexicon: &'l Lexicon,
    source: &Arc<Source>,
) -> impl Iterator<Item = Result<Token, Error>> + 'l {
    let tokens = disambiguate(lower_indent(tokenize(lexicon, Arc::clone(source))));
    adjust_locations(alternate(tokens, source))
}
