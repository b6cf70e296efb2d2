//! The rule expression language: lexer, parser, static validation and
//! evaluation. Everything in this module is pure and I/O-free.

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod validate;

pub use ast::{CompareOp, Expr, Literal};
pub use eval::evaluate;
pub use parser::parse;
pub use validate::{Validity, ensure_valid, validate};
