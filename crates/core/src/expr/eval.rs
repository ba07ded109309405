//! Tree-walking interpreter.

use std::f64::consts::PI;

use crate::error::CalcError;
use crate::expr::ast::{BinaryOp, Expr, Func};
use crate::math;

/// Evaluate an expression tree.
///
/// Fails on division by zero, on a function producing `NaN` from a
/// well-defined argument, and on a final result that is not finite.
pub fn evaluate(expr: &Expr) -> Result<f64, CalcError> {
    let value = eval_node(expr)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NonFinite)
    }
}

fn eval_node(expr: &Expr) -> Result<f64, CalcError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Pi => Ok(PI),
        Expr::Neg(inner) => Ok(-eval_node(inner)?),
        Expr::Binary { op, lhs, rhs } => {
            let l = eval_node(lhs)?;
            let r = eval_node(rhs)?;
            match op {
                BinaryOp::Add => Ok(l + r),
                BinaryOp::Sub => Ok(l - r),
                BinaryOp::Mul => Ok(l * r),
                BinaryOp::Div if r == 0.0 => Err(CalcError::DivisionByZero),
                BinaryOp::Div => Ok(l / r),
            }
        }
        Expr::Call { func, args } => {
            let values = args.iter().map(eval_node).collect::<Result<Vec<_>, _>>()?;
            apply(*func, &values)
        }
    }
}

fn apply(func: Func, args: &[f64]) -> Result<f64, CalcError> {
    let [x, rest @ ..] = args else {
        return Err(CalcError::WrongArity {
            name: func.name(),
            expected: func.arity(),
            found: 0,
        });
    };
    let x = *x;

    let result = match func {
        Func::Sin => math::sin_deg(x),
        Func::Cos => math::cos_deg(x),
        Func::Tan => math::tan_deg(x),
        Func::Log => x.log10(),
        Func::Ln => x.ln(),
        Func::Sqrt => x.sqrt(),
        Func::Pow => match rest {
            [y] => x.powf(*y),
            _ => {
                return Err(CalcError::WrongArity {
                    name: func.name(),
                    expected: 2,
                    found: args.len(),
                })
            }
        },
    };

    if result.is_nan() && !args.iter().any(|a| a.is_nan()) {
        return Err(CalcError::Domain {
            function: func.name(),
            value: x,
        });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::eval_str;
    use pretty_assertions::assert_eq;

    fn approx(input: &str, expected: f64) {
        let got = eval_str(input).unwrap_or_else(|e| panic!("{input}: {e}"));
        assert!(
            (got - expected).abs() < 1e-9,
            "{input}: expected {expected}, got {got}"
        );
    }

    #[test]
    fn test_arithmetic() {
        approx("7 + 3", 10.0);
        approx("4 × 5 - 2", 18.0);
        approx("10 ÷ 4", 2.5);
        approx("2 + 3 * 4", 14.0);
        approx("(2 + 3) * 4", 20.0);
        approx("3 - -5", 8.0);
    }

    #[test]
    fn test_degree_trig() {
        approx("sin(90)", 1.0);
        approx("cos(60)", 0.5);
        approx("tan(45)", 1.0);
    }

    #[test]
    fn test_logs_roots_powers() {
        approx("log(1000)", 3.0);
        approx("ln(1)", 0.0);
        approx("√(16)", 4.0);
        approx("sqrt(2) * sqrt(2)", 2.0);
        approx("pow(2, 10)", 1024.0);
        approx("pow(2, 3", 8.0);
    }

    #[test]
    fn test_nested_calls() {
        approx("sin(cos(0) × 90)", 1.0);
        approx("sqrt(pow(3, 2) + pow(4, 2))", 5.0);
        approx("log(pow(10, sqrt(9)))", 3.0);
    }

    #[test]
    fn test_pi() {
        approx("π", std::f64::consts::PI);
        approx("2 × pi", std::f64::consts::TAU);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval_str("1 / 0"), Err(CalcError::DivisionByZero));
        assert_eq!(eval_str("5 ÷ (2 - 2)"), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn test_domain_errors() {
        assert_eq!(
            eval_str("sqrt(-4)"),
            Err(CalcError::Domain {
                function: "sqrt",
                value: -4.0
            })
        );
        assert_eq!(
            eval_str("ln(-1)"),
            Err(CalcError::Domain {
                function: "ln",
                value: -1.0
            })
        );
    }

    #[test]
    fn test_non_finite_result() {
        assert_eq!(eval_str("log(0)"), Err(CalcError::NonFinite));
        assert_eq!(eval_str("pow(10, 400)"), Err(CalcError::NonFinite));
    }
}
