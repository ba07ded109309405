//! Number formatting for the calculator display.
//!
//! [`NumberFormatter`] produces what the user sees. [`raw_number`] produces
//! the lossless string kept in session state and history, which the
//! formatter renders on demand.

use crate::currency;

/// Fraction digits kept before a decimal result is rounded.
pub const DEFAULT_PRECISION: usize = 10;

/// Display sentinel for undefined results and failed evaluations.
pub const ERROR_SENTINEL: &str = "Error";

/// Display sentinel for infinite results.
pub const INFINITY_SENTINEL: &str = "Infinity";

/// Magnitudes above this switch to exponential notation.
const EXPONENTIAL_ABOVE: f64 = 1e12;

/// Non-zero magnitudes below this switch to exponential notation.
const EXPONENTIAL_BELOW: f64 = 1e-7;

/// Fraction digits shown in exponential notation.
const EXPONENTIAL_DIGITS: usize = 4;

/// Renders numbers for the calculator display.
///
/// Total: every `f64`, including `NaN` and the infinities, maps to a string.
///
/// ```
/// use omnicalc_core::NumberFormatter;
///
/// let fmt = NumberFormatter::default();
/// assert_eq!(fmt.format(0.1 + 0.2), "0.3");
/// assert_eq!(fmt.format(f64::NAN), "Error");
/// assert_eq!(fmt.format(12_345_678_901_234.0), "1.2346e+13");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormatter {
    precision: usize,
}

impl Default for NumberFormatter {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl NumberFormatter {
    /// Create a formatter that rounds to `precision` fraction digits.
    #[must_use]
    pub fn new(precision: usize) -> Self {
        Self { precision }
    }

    #[must_use]
    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Format a value for display.
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        if value.is_nan() {
            return ERROR_SENTINEL.to_string();
        }
        if !value.is_finite() {
            return INFINITY_SENTINEL.to_string();
        }

        let magnitude = value.abs();
        if magnitude > EXPONENTIAL_ABOVE || (magnitude < EXPONENTIAL_BELOW && value != 0.0) {
            return exponential(value, EXPONENTIAL_DIGITS);
        }

        let repr = raw_number(value);
        match repr.split_once('.') {
            Some((_, fraction)) if fraction.len() > self.precision => {
                // Round, then re-render so trailing zeros from the fixed
                // representation disappear.
                let rounded = format!("{:.*}", self.precision, value)
                    .parse::<f64>()
                    .unwrap_or(value);
                raw_number(rounded)
            }
            _ => repr,
        }
    }
}

/// Format with the default precision.
#[must_use]
pub fn format_number(value: f64) -> String {
    NumberFormatter::default().format(value)
}

/// Lossless string form of a value, as stored in the session display.
///
/// Unlike [`NumberFormatter::format`] this never rounds and never switches to
/// exponential notation, so the string parses back to exactly `value`.
#[must_use]
pub fn raw_number(value: f64) -> String {
    if value.is_nan() {
        ERROR_SENTINEL.to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            INFINITY_SENTINEL.to_string()
        } else {
            format!("-{INFINITY_SENTINEL}")
        }
    } else if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Exponential notation with a signed exponent, e.g. `1.2346e+13`.
fn exponential(value: f64, digits: usize) -> String {
    let repr = format!("{:.*e}", digits, value);
    match repr.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => repr,
    }
}

/// Thousands-grouped decimal with at most `max_fraction_digits` digits.
///
/// ```
/// use omnicalc_core::format::format_grouped;
///
/// assert_eq!(format_grouped(1234567.891, 2), "1,234,567.89");
/// assert_eq!(format_grouped(0.5, 4), "0.5");
/// ```
#[must_use]
pub fn format_grouped(value: f64, max_fraction_digits: usize) -> String {
    if !value.is_finite() {
        return format_number(value);
    }

    let fixed = format!("{:.*}", max_fraction_digits, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Whole-unit currency amount, e.g. `$12,399` or `CHF 500`.
///
/// The symbol comes from the currency table; unknown codes are printed as
/// the code itself.
#[must_use]
pub fn format_currency(value: f64, code: &str) -> String {
    if !value.is_finite() {
        return format_number(value);
    }

    let amount = format_grouped(value.abs().round(), 0);
    let negative = value.round() < 0.0;
    let symbol = currency::find(code)
        .map(|c| c.symbol.to_string())
        .unwrap_or_else(|| code.to_uppercase());
    let spaced = symbol.chars().all(char::is_alphabetic);

    let sign = if negative { "-" } else { "" };
    if spaced {
        format!("{sign}{symbol} {amount}")
    } else {
        format!("{sign}{symbol}{amount}")
    }
}
