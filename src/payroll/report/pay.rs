use super::views::PayStatement;
use crate::payroll::domain::Cents;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayError {
    #[error("hours worked must be a finite, non-negative number, got {0}")]
    InvalidHours(f64),
    #[error("pay amount exceeds the representable range")]
    Overflow,
}

/// Hourly rate times hours, rounded once to the nearest cent.
pub fn base_pay(hourly_rate: Cents, hours: f64) -> Result<Cents, PayError> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(PayError::InvalidHours(hours));
    }
    Cents::from_fractional(hourly_rate.0 as f64 * hours).ok_or(PayError::Overflow)
}

impl PayStatement {
    pub fn new(hourly_rate: Cents, hours: f64, incentive_total: Cents) -> Result<Self, PayError> {
        let base_pay = base_pay(hourly_rate, hours)?;
        let gross_total = base_pay
            .checked_add(incentive_total)
            .ok_or(PayError::Overflow)?;
        Ok(Self {
            hourly_rate,
            hours,
            base_pay,
            incentive_total,
            gross_total,
        })
    }
}
