//! Expression language: tokenizer, parser and interpreter.
//!
//! ```
//! use omnicalc_core::eval_str;
//!
//! assert_eq!(eval_str("4 × 5 - 2").unwrap(), 18.0);
//! assert_eq!(eval_str("pow(2, sqrt(9))").unwrap(), 8.0);
//! assert!(eval_str("7 +").is_err());
//! ```

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOp, Expr, Func};
pub use eval::evaluate;
pub use lexer::{tokenize, Spanned, Token};
pub use parser::parse;

use crate::error::CalcError;

/// Tokenize and parse without evaluating.
pub fn parse_str(input: &str) -> Result<Expr, CalcError> {
    let tokens = tokenize(input)?;
    parse(&tokens)
}

/// Tokenize, parse and evaluate in one step.
pub fn eval_str(input: &str) -> Result<f64, CalcError> {
    let expr = parse_str(input)?;
    tracing::trace!(input, parsed = %expr, "evaluating expression");
    evaluate(&expr)
}
