//! Parser for the dynamic-language subset
//!
//! Converts source text into an AST in two phases:
//! - [`lexer`]: tokenises source text into a flat [`lexer::Token`] stream
//! - [`parser`]: recursive-descent statement parser; expressions live in
//!   `expressions`
//! - [`ast`]: the resulting [`ast::Program`], [`ast::Stmt`] and [`ast::Expr`]
//!
//! The C-like subset is never parsed into an AST: its statements are recognized
//! one line at a time by [`crate::interpreter::matcher`].

pub mod ast;
mod expressions;
pub mod lexer;
pub mod parser;

use ast::{Expr, Program};
use parser::{ParseError, Parser};

/// Parse a whole snippet
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    Parser::new(source)?.parse_program()
}

/// Parse a single expression (e.g. the right-hand side of a declaration)
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    Parser::new(source)?.parse_standalone_expression()
}
