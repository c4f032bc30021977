//! Quaint Parser
//!
//! Parses Quaint markup into an Abstract Syntax Tree.
//! The heavy lifting is a generic operator-precedence [`engine`] driven by
//! the Quaint priority table in [`operator`] and [`order`]. Every node keeps
//! its location and the whitespace it owns, so the tree can be mapped back
//! onto the source byte for byte.
//!
//! # Example
//!
//! ```
//! use quaint_parser::Parser;
//!
//! let root = Parser::parse("a + b*c").unwrap();
//! assert_eq!(root.to_string(), "(+ a (* b c))");
//! ```

pub mod ast;
pub mod build;
pub mod engine;
pub mod operator;
pub mod order;
pub mod parser;
pub mod whitespace;


pub use ast::{Node, NodeClass, NodeKind, Op, Signature, Tag};
pub use parser::Parser;
pub use quaint_lexer::{
    Error as ParseError, LexerConfig, Lexicon, Location, Source, SyntaxError, TokenizerError,
};
