//! Keystroke-driven calculator session.
//!
//! A [`Calculator`] holds everything one user interaction needs: the entry
//! being typed (`display`), the operands and operators already committed
//! (`expression`), the reset flag, one memory register and the history.
//! Dropping the session drops all of it.
//!
//! ```
//! use omnicalc_core::{Calculator, Key};
//!
//! let mut calc = Calculator::new();
//! for key in ["7", "+", "3", "="] {
//!     calc.press(key.parse::<Key>().unwrap());
//! }
//! assert_eq!(calc.display(), "10");
//! assert_eq!(calc.history().newest().unwrap().expression, "7 + 3");
//! ```

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, UnknownKey};
use crate::expr;
use crate::format::{raw_number, NumberFormatter, DEFAULT_PRECISION, ERROR_SENTINEL};
use crate::history::{History, HistoryItem, DEFAULT_HISTORY_LIMIT};
use crate::math;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// The glyph written into the expression, as shown on the keypad.
    #[must_use]
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "×",
            Self::Divide => "÷",
        }
    }
}

/// Scientific keypad functions.
///
/// All except [`Scientific::Pow`] act immediately on the current entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scientific {
    Sin,
    Cos,
    Tan,
    Log,
    Ln,
    Sqrt,
    Square,
    /// Starts `pow(x, ` and waits for the exponent.
    Pow,
    Factorial,
    Pi,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryAction {
    /// `M+`
    Add,
    /// `M-`
    Subtract,
    /// `MR`
    Recall,
    /// `MC`
    Clear,
}

/// A single keypad press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A character typed into the entry: `0-9`, `.`, `(`, `)` or `e` (EXP).
    Input(char),
    Operator(Operator),
    Scientific(Scientific),
    Memory(MemoryAction),
    Equals,
    Clear,
    AllClear,
}

impl FromStr for Key {
    type Err = UnknownKey;

    /// Parse a keypad label. Accepts the glyphs on the keys and plain ASCII
    /// spellings (`*`, `sqrt`, `x^2`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let key = match label {
            "." | "(" | ")" => Self::Input(label.chars().next().unwrap_or('.')),
            d if d.len() == 1 && d.as_bytes()[0].is_ascii_digit() => {
                Self::Input(d.as_bytes()[0] as char)
            }
            "e" | "E" | "EXP" | "exp" => Self::Input('e'),
            "+" => Self::Operator(Operator::Add),
            "-" | "−" => Self::Operator(Operator::Subtract),
            "×" | "*" | "x" => Self::Operator(Operator::Multiply),
            "÷" | "/" => Self::Operator(Operator::Divide),
            "=" => Self::Equals,
            "sin" => Self::Scientific(Scientific::Sin),
            "cos" => Self::Scientific(Scientific::Cos),
            "tan" => Self::Scientific(Scientific::Tan),
            "log" => Self::Scientific(Scientific::Log),
            "ln" => Self::Scientific(Scientific::Ln),
            "√" | "sqrt" => Self::Scientific(Scientific::Sqrt),
            "x²" | "x^2" | "square" => Self::Scientific(Scientific::Square),
            "xʸ" | "x^y" | "pow" => Self::Scientific(Scientific::Pow),
            "n!" | "!" | "fact" => Self::Scientific(Scientific::Factorial),
            "π" | "pi" => Self::Scientific(Scientific::Pi),
            "%" | "percent" => Self::Scientific(Scientific::Percent),
            "C" | "c" | "clear" => Self::Clear,
            "AC" | "ac" | "allclear" => Self::AllClear,
            other => match other.to_ascii_uppercase().as_str() {
                "M+" => Self::Memory(MemoryAction::Add),
                "M-" => Self::Memory(MemoryAction::Subtract),
                "MR" => Self::Memory(MemoryAction::Recall),
                "MC" => Self::Memory(MemoryAction::Clear),
                _ => return Err(UnknownKey(s.to_string())),
            },
        };
        Ok(key)
    }
}

/// Tunables for a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub history_limit: usize,
    /// Fraction digits shown by [`Calculator::rendered_display`].
    pub precision: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            precision: DEFAULT_PRECISION,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Calculator {
    display: String,
    expression: String,
    /// Next input starts a new operand instead of extending `display`.
    should_reset: bool,
    memory: f64,
    history: History,
    formatter: NumberFormatter,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            display: "0".to_string(),
            expression: String::new(),
            should_reset: false,
            memory: 0.0,
            history: History::with_limit(config.history_limit),
            formatter: NumberFormatter::new(config.precision),
        }
    }

    /// The current entry, unformatted. This is what copy/share hands out.
    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Operands and operators committed so far, e.g. `7 + `.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    #[must_use]
    pub fn memory(&self) -> f64 {
        self.memory
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn formatter(&self) -> &NumberFormatter {
        &self.formatter
    }

    /// The entry as it should be shown on screen.
    ///
    /// Numeric entries go through the formatter. Partial entries such as
    /// `(2` are shown as typed.
    #[must_use]
    pub fn rendered_display(&self) -> String {
        if self.display == ERROR_SENTINEL {
            return self.display.clone();
        }
        match self.display.parse::<f64>() {
            Ok(value) => self.formatter.format(value),
            Err(_) => self.display.clone(),
        }
    }

    /// Dispatch one key press.
    pub fn press(&mut self, key: Key) {
        match key {
            Key::Input(c) => self.append_digit(c),
            Key::Operator(op) => self.append_operator(op),
            Key::Scientific(func) => self.handle_scientific(func),
            Key::Memory(action) => self.handle_memory(action),
            Key::Equals => {
                if let Err(e) = self.calculate() {
                    tracing::trace!(error = %e, "equals left the error sentinel on display");
                }
            }
            Key::Clear => self.clear(),
            Key::AllClear => self.all_clear(),
        }
    }

    /// Type a character into the entry.
    ///
    /// After an operator or a result the character starts a fresh entry. A
    /// lone `0` is replaced rather than extended. A second `.` within the
    /// same number is ignored.
    pub fn append_digit(&mut self, c: char) {
        if self.should_reset {
            self.display = if c == '.' { "0.".to_string() } else { c.to_string() };
            self.should_reset = false;
            return;
        }

        if c == '.' && trailing_number(&self.display).contains(|ch| ch == '.' || ch == 'e') {
            return;
        }

        if self.display == "0" && c != '.' {
            self.display = c.to_string();
        } else {
            self.display.push(c);
        }
    }

    /// Commit the entry and an operator to the expression.
    ///
    /// Consecutive operators are not rejected here; the evaluator reports
    /// the malformed expression on `=`.
    pub fn append_operator(&mut self, op: Operator) {
        self.expression.push_str(&self.display);
        self.expression.push(' ');
        self.expression.push_str(op.glyph());
        self.expression.push(' ');
        self.should_reset = true;
    }

    /// Evaluate `expression + display`.
    ///
    /// On success the result replaces the entry and is recorded in history.
    /// On failure the entry shows `"Error"`. Either way the expression is
    /// cleared and the next digit starts fresh.
    pub fn calculate(&mut self) -> Result<f64, CalcError> {
        let full = format!("{}{}", self.expression, self.display);
        self.expression.clear();
        self.should_reset = true;

        match expr::eval_str(&full) {
            Ok(value) => {
                let result = raw_number(value);
                tracing::debug!(expression = %full, %result, "evaluated");
                self.history.push(HistoryItem {
                    expression: full,
                    result: result.clone(),
                    timestamp: Utc::now(),
                });
                self.display = result;
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(expression = %full, error = %e, "evaluation failed");
                self.display = ERROR_SENTINEL.to_string();
                Err(e)
            }
        }
    }

    /// Apply a scientific function to the current entry.
    pub fn handle_scientific(&mut self, func: Scientific) {
        let value = self.display_value();
        let result = match func {
            Scientific::Sin => math::sin_deg(value),
            Scientific::Cos => math::cos_deg(value),
            Scientific::Tan => math::tan_deg(value),
            Scientific::Log => value.log10(),
            Scientific::Ln => value.ln(),
            Scientific::Sqrt => value.sqrt(),
            Scientific::Square => value * value,
            Scientific::Factorial => math::factorial(value),
            Scientific::Pi => PI,
            Scientific::Percent => value / 100.0,
            Scientific::Pow => {
                self.expression.push_str("pow(");
                self.expression.push_str(&self.display);
                self.expression.push_str(", ");
                self.should_reset = true;
                return;
            }
        };

        self.display = raw_number(result);
        self.should_reset = true;
    }

    /// Memory register actions. `M+`/`M-` ignore a non-numeric entry.
    pub fn handle_memory(&mut self, action: MemoryAction) {
        match action {
            MemoryAction::Add | MemoryAction::Subtract => match self.numeric_display() {
                Some(value) if action == MemoryAction::Add => self.memory += value,
                Some(value) => self.memory -= value,
                None => tracing::debug!(display = %self.display, "memory ignores non-numeric entry"),
            },
            MemoryAction::Recall => self.display = raw_number(self.memory),
            MemoryAction::Clear => self.memory = 0.0,
        }
        self.should_reset = true;
    }

    /// Reset the entry and expression. History and memory survive.
    pub fn clear(&mut self) {
        self.display = "0".to_string();
        self.expression.clear();
        self.should_reset = false;
    }

    /// [`clear`](Self::clear) and also empty the history.
    pub fn all_clear(&mut self) {
        self.clear();
        self.history.clear();
    }

    /// Replace the entry, e.g. with a value picked from history.
    pub fn set_display(&mut self, value: impl Into<String>) {
        self.display = value.into();
        self.should_reset = true;
    }

    /// Load the result of history entry `index` (0 = newest) into the entry.
    ///
    /// Returns `false` if there is no such entry.
    pub fn recall_history(&mut self, index: usize) -> bool {
        let Some(result) = self.history.get(index).map(|h| h.result.clone()) else {
            return false;
        };
        self.set_display(result);
        true
    }

    /// The entry as a number; `NaN` when it is not one.
    fn display_value(&self) -> f64 {
        self.display.parse().unwrap_or(f64::NAN)
    }

    fn numeric_display(&self) -> Option<f64> {
        Some(self.display_value()).filter(|v| v.is_finite())
    }
}

/// The run of number characters at the end of an entry.
fn trailing_number(entry: &str) -> &str {
    let start = entry
        .char_indices()
        .rev()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.' || *c == 'e'))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    &entry[start..]
}

impl fmt::Display for Calculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.expression, self.rendered_display())
    }
}
