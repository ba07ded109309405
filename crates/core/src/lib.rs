//! Omnicalc Core
//!
//! The engine behind the omnicalc front-ends: a keystroke-driven calculator
//! session, a small expression language, loan EMI maths and currency
//! conversion state.
//!
//! # Quick Start
//!
//! ```
//! use omnicalc_core::{Calculator, Key};
//!
//! let mut calc = Calculator::new();
//! for key in ["4", "×", "5", "-", "2", "="] {
//!     calc.press(key.parse::<Key>().unwrap());
//! }
//! assert_eq!(calc.display(), "18");
//!
//! // Every successful calculation lands in history, newest first.
//! let last = calc.history().newest().unwrap();
//! assert_eq!(last.expression, "4 × 5 - 2");
//! assert_eq!(last.result, "18");
//! ```
//!
//! # Expressions
//!
//! ```
//! use omnicalc_core::eval_str;
//!
//! assert_eq!(eval_str("sqrt(16) + pow(2, 3)").unwrap(), 12.0);
//! assert!(eval_str("1 ÷ 0").is_err());
//! ```
//!
//! # Loans
//!
//! ```
//! use omnicalc_core::{emi, EmiInput, TenureUnit};
//!
//! let input = EmiInput {
//!     loan_amount: 250_000.0,
//!     interest_rate: 6.0,
//!     tenure: 20.0,
//!     tenure_unit: TenureUnit::Years,
//!     ..EmiInput::default()
//! };
//! let out = emi::calculate(&input);
//! assert!((out.emi - 1791.08).abs() < 0.01);
//! ```

pub mod currency;
pub mod emi;
pub mod error;
pub mod expr;
pub mod format;
pub mod history;
pub mod math;
pub mod session;

pub use currency::{
    Currency, CurrencyConverter, FetchTicket, OpenErApi, RateProvider, RateTable, CURRENCIES,
};
pub use emi::{EmiBreakdown, EmiInput, TenureUnit};
pub use error::{CalcError, EmiError, RateError, UnknownKey};
pub use expr::eval_str;
pub use format::{format_currency, format_grouped, format_number, NumberFormatter};
pub use history::{History, HistoryItem};
pub use session::{Calculator, Key, MemoryAction, Operator, Scientific, SessionConfig};
