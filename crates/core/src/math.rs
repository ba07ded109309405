//! Scalar helpers shared by the keypad functions and the interpreter.

use std::f64::consts::PI;

/// Factorial by iterative product.
///
/// Negative input yields `NaN`. Large input overflows to infinity under
/// ordinary floating point rules; that is not treated as an error.
/// Fractional input multiplies `2..=floor(n)`.
///
/// ```
/// use omnicalc_core::math::factorial;
///
/// assert_eq!(factorial(5.0), 120.0);
/// assert!(factorial(-1.0).is_nan());
/// ```
#[must_use]
pub fn factorial(n: f64) -> f64 {
    if n.is_nan() || n < 0.0 {
        return f64::NAN;
    }
    if n == 0.0 {
        return 1.0;
    }

    let mut result = 1.0;
    let mut i = 2.0;
    while i <= n {
        result *= i;
        if result.is_infinite() {
            break;
        }
        i += 1.0;
    }
    result
}

#[must_use]
pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

#[must_use]
pub fn sin_deg(degrees: f64) -> f64 {
    deg_to_rad(degrees).sin()
}

#[must_use]
pub fn cos_deg(degrees: f64) -> f64 {
    deg_to_rad(degrees).cos()
}

#[must_use]
pub fn tan_deg(degrees: f64) -> f64 {
    deg_to_rad(degrees).tan()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factorial_base_cases() {
        assert_eq!(factorial(0.0), 1.0);
        assert_eq!(factorial(1.0), 1.0);
        assert_eq!(factorial(5.0), 120.0);
        assert_eq!(factorial(10.0), 3_628_800.0);
    }

    #[test]
    fn test_factorial_negative_is_nan() {
        assert!(factorial(-1.0).is_nan());
        assert!(factorial(-0.5).is_nan());
        assert!(factorial(f64::NAN).is_nan());
    }

    #[test]
    fn test_factorial_overflows_to_infinity() {
        assert!(factorial(171.0).is_infinite());
        assert!(factorial(170.0).is_finite());
        assert!(factorial(f64::INFINITY).is_infinite());
    }

    #[test]
    fn test_factorial_fractional() {
        assert_eq!(factorial(4.5), 24.0);
    }

    #[test]
    fn test_degree_trig() {
        assert!((sin_deg(90.0) - 1.0).abs() < 1e-12);
        assert!((cos_deg(180.0) + 1.0).abs() < 1e-12);
        assert!((tan_deg(45.0) - 1.0).abs() < 1e-12);
        assert!(sin_deg(0.0).abs() < 1e-12);
    }
}
