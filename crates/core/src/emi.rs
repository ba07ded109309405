//! Loan EMI (equated monthly installment) calculation.
//!
//! ```text
//! R   = annual_rate / 12 / 100
//! N   = tenure (months) or tenure × 12 (years)
//! EMI = P · R · (1 + R)^N / ((1 + R)^N − 1)
//! ```
//!
//! [`calculate`] is total: degenerate inputs and non-finite intermediates
//! produce zeros rather than errors. [`EmiInput::validate`] is the strict
//! counterpart for callers that want to tell the user what is wrong.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EmiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenureUnit {
    #[default]
    Months,
    Years,
}

impl fmt::Display for TenureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Months => f.write_str("months"),
            Self::Years => f.write_str("years"),
        }
    }
}

impl FromStr for TenureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "m" | "mo" | "month" | "months" => Ok(Self::Months),
            "y" | "yr" | "year" | "years" => Ok(Self::Years),
            other => Err(format!("unknown tenure unit '{other}' (use months or years)")),
        }
    }
}

/// Loan parameters as entered in the EMI form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmiInput {
    pub loan_amount: f64,
    /// Annual interest rate in percent.
    pub interest_rate: f64,
    pub tenure: f64,
    pub tenure_unit: TenureUnit,
    /// Currency code used only for display.
    pub currency: String,
}

impl Default for EmiInput {
    fn default() -> Self {
        Self {
            loan_amount: 1_000_000.0,
            interest_rate: 8.5,
            tenure: 120.0,
            tenure_unit: TenureUnit::Months,
            currency: "USD".to_string(),
        }
    }
}

impl EmiInput {
    /// Rate applied per installment, as a fraction.
    #[must_use]
    pub fn monthly_rate(&self) -> f64 {
        self.interest_rate / 12.0 / 100.0
    }

    /// Number of monthly installments.
    #[must_use]
    pub fn installments(&self) -> f64 {
        match self.tenure_unit {
            TenureUnit::Years => self.tenure * 12.0,
            TenureUnit::Months => self.tenure,
        }
    }

    /// Reject inputs that [`calculate`] would silently clamp to zero.
    pub fn validate(&self) -> Result<(), EmiError> {
        if !(self.loan_amount.is_finite()
            && self.interest_rate.is_finite()
            && self.tenure.is_finite())
        {
            return Err(EmiError::NonFiniteInput);
        }
        if self.loan_amount <= 0.0 {
            return Err(EmiError::NonPositivePrincipal);
        }
        if self.interest_rate < 0.0 {
            return Err(EmiError::NegativeRate);
        }
        if self.installments() <= 0.0 {
            return Err(EmiError::NonPositiveTenure);
        }
        Ok(())
    }
}

/// Derived loan figures. Never stored; recompute when any input changes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmiBreakdown {
    pub emi: f64,
    pub total_interest: f64,
    pub total_payment: f64,
}

impl EmiBreakdown {
    /// Fraction of the total payment that is interest, in `0.0..=1.0`.
    #[must_use]
    pub fn interest_share(&self) -> f64 {
        if self.total_payment > 0.0 {
            (self.total_interest / self.total_payment).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Compute the installment and totals for a loan.
///
/// ```
/// use omnicalc_core::emi::{calculate, EmiInput};
///
/// let out = calculate(&EmiInput::default());
/// assert!((out.emi - 12398.57).abs() < 0.01);
/// ```
#[must_use]
pub fn calculate(input: &EmiInput) -> EmiBreakdown {
    let principal = input.loan_amount;
    let rate = input.monthly_rate();
    let n = input.installments();

    // Negated comparisons so NaN inputs also take the zero path.
    if !(principal > 0.0) || !(rate >= 0.0) || !(n > 0.0) {
        return EmiBreakdown::default();
    }

    let growth = (1.0 + rate).powf(n);
    let emi = principal * rate * growth / (growth - 1.0);
    let total_payment = emi * n;
    let total_interest = total_payment - principal;

    EmiBreakdown {
        emi: finite_or_zero(emi),
        total_interest: finite_or_zero(total_interest),
        total_payment: finite_or_zero(total_payment),
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn loan(amount: f64, rate: f64, tenure: f64, unit: TenureUnit) -> EmiInput {
        EmiInput {
            loan_amount: amount,
            interest_rate: rate,
            tenure,
            tenure_unit: unit,
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn test_reference_loan() {
        let out = calculate(&loan(1_000_000.0, 8.5, 120.0, TenureUnit::Months));
        assert!((out.emi - 12398.57).abs() < 0.01, "emi = {}", out.emi);
        assert!(
            (out.total_payment - out.emi * 120.0).abs() < 1e-6,
            "total = {}",
            out.total_payment
        );
        assert!((out.total_interest - (out.total_payment - 1_000_000.0)).abs() < 1e-6);
        assert!((out.total_payment - 1_487_828.9).abs() < 1.0);
    }

    #[test]
    fn test_years_equal_months() {
        let years = calculate(&loan(250_000.0, 6.0, 20.0, TenureUnit::Years));
        let months = calculate(&loan(250_000.0, 6.0, 240.0, TenureUnit::Months));
        assert_eq!(years, months);
    }

    #[test]
    fn test_zero_principal_is_all_zero() {
        let out = calculate(&loan(0.0, 8.5, 120.0, TenureUnit::Months));
        assert_eq!(out, EmiBreakdown::default());
    }

    #[test]
    fn test_degenerate_inputs_are_all_zero() {
        for input in [
            loan(-5.0, 8.5, 12.0, TenureUnit::Months),
            loan(1000.0, -1.0, 12.0, TenureUnit::Months),
            loan(1000.0, 8.5, 0.0, TenureUnit::Years),
            loan(f64::NAN, 8.5, 12.0, TenureUnit::Months),
        ] {
            assert_eq!(calculate(&input), EmiBreakdown::default(), "{input:?}");
        }
    }

    #[test]
    fn test_zero_rate_is_clamped_to_zero() {
        // 0/0 inside the formula.
        let out = calculate(&loan(12_000.0, 0.0, 12.0, TenureUnit::Months));
        assert_eq!(out.emi, 0.0);
        assert_eq!(out.total_payment, 0.0);
        assert_eq!(out.total_interest, 0.0);
    }

    #[test]
    fn test_interest_share() {
        let out = calculate(&EmiInput::default());
        let share = out.interest_share();
        assert!(share > 0.32 && share < 0.33, "share = {share}");
        assert_eq!(EmiBreakdown::default().interest_share(), 0.0);
    }

    #[test]
    fn test_validate() {
        assert_eq!(EmiInput::default().validate(), Ok(()));
        assert_eq!(
            loan(0.0, 8.5, 12.0, TenureUnit::Months).validate(),
            Err(EmiError::NonPositivePrincipal)
        );
        assert_eq!(
            loan(100.0, -0.1, 12.0, TenureUnit::Months).validate(),
            Err(EmiError::NegativeRate)
        );
        assert_eq!(
            loan(100.0, 5.0, 0.0, TenureUnit::Years).validate(),
            Err(EmiError::NonPositiveTenure)
        );
        assert_eq!(
            loan(f64::INFINITY, 5.0, 1.0, TenureUnit::Years).validate(),
            Err(EmiError::NonFiniteInput)
        );
    }

    #[test]
    fn test_tenure_unit_parsing() {
        assert_eq!("years".parse::<TenureUnit>(), Ok(TenureUnit::Years));
        assert_eq!("M".parse::<TenureUnit>(), Ok(TenureUnit::Months));
        assert!("weeks".parse::<TenureUnit>().is_err());
        assert_eq!(TenureUnit::Years.to_string(), "years");
    }
}
