//! Pseudocode parser
//!
//! This module transforms pseudocode source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST), with error recovery
//! - [`ast`]: AST node definitions and the canonical printer
//!
//! # Supported Language
//!
//! - Instructions: `var`, assignment, `if`, `while`, `show`, `read`
//! - Expressions: numbers, identifiers, `+ - * /`, parentheses, unary minus
//! - Conditions: `== != < <= > >=`, `&&`/`and`, `||`/`or`, `!`/`not`
//! - Directives: `%default`, `%color`, `%figure`, `%font`, `%fontsize`
//!
//! Keywords are case-insensitive and accept Spanish spellings (`si`,
//! `mientras`, `mostrar`, `leer`). Semicolons are optional.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser, one token of lookahead.
//! No external parser generator dependencies.

pub mod ast;
mod directives;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use parse::{ParseError, ParseFailure, Parser, DEFAULT_MAX_DEPTH};
