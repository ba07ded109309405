//! Error types for the calculator engine.
//!
//! None of these escape a [`Calculator`](crate::Calculator) session: the
//! session turns expression failures into the `"Error"` display sentinel.
//! They are public so that direct callers of [`eval_str`](crate::eval_str),
//! the EMI validator and rate providers can inspect the cause.

/// Errors raised while tokenizing, parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalcError {
    /// A character that is not part of the expression language.
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    /// A numeric literal that does not parse (e.g. `1.2.3`, `4e`).
    #[error("invalid number '{text}' at position {pos}")]
    InvalidNumber { text: String, pos: usize },

    /// A token that does not fit the grammar at this point.
    #[error("unexpected '{found}' at position {pos}")]
    UnexpectedToken { found: String, pos: usize },

    /// Input ended where an operand was required.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// An identifier that is neither a known function nor a constant.
    #[error("unknown function '{name}' at position {pos}")]
    UnknownFunction { name: String, pos: usize },

    /// A function called with the wrong number of arguments.
    #[error("{name}() takes {expected} argument(s), got {found}")]
    WrongArity {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    /// Nesting or operator chains beyond [`MAX_DEPTH`](crate::expr::parser::MAX_DEPTH).
    #[error("expression nested too deeply at position {pos}")]
    TooDeep { pos: usize },

    #[error("division by zero")]
    DivisionByZero,

    /// A function evaluated outside its domain (e.g. `sqrt(-1)`).
    #[error("{function}({value}) is undefined")]
    Domain { function: &'static str, value: f64 },

    /// The final result is infinite or not a number.
    #[error("result is not a finite number")]
    NonFinite,
}

/// Errors raised by an exchange-rate provider.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateError {
    #[error("exchange rate service returned HTTP {status}")]
    Http { status: u16 },

    #[error("failed to reach exchange rate service: {0}")]
    Transport(String),

    #[error("invalid exchange rate response: {0}")]
    Decode(String),

    /// The provider answered but reported a failure (e.g. unsupported code).
    #[error("exchange rate service error: {0}")]
    Provider(String),

    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Strict validation failures for EMI inputs.
///
/// [`emi::calculate`](crate::emi::calculate) never returns these; it clamps
/// degenerate inputs to zero. Use [`EmiInput::validate`](crate::EmiInput::validate)
/// when an explicit signal is wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EmiError {
    #[error("loan amount must be greater than zero")]
    NonPositivePrincipal,

    #[error("interest rate cannot be negative")]
    NegativeRate,

    #[error("tenure must be greater than zero")]
    NonPositiveTenure,

    #[error("loan inputs must be finite numbers")]
    NonFiniteInput,
}

/// A keypad label that does not name any key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key '{0}'")]
pub struct UnknownKey(pub String);
