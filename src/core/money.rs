use rust_decimal::{Decimal, RoundingStrategy};

use crate::core::{AppError, Result};

/// Fee amounts are stored as DECIMAL(12,2)
pub const MONEY_SCALE: u32 = 2;

/// Rounds an amount to the ledger scale (half away from zero, like cashier arithmetic)
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Validates that an amount is non-negative and has at most two decimal places
pub fn validate_amount(field: &str, amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(AppError::validation(format!("{} cannot be negative", field)));
    }

    if amount.normalize().scale() > MONEY_SCALE {
        return Err(AppError::validation(format!(
            "{} must have at most {} decimal places, got {}",
            field, MONEY_SCALE, amount
        )));
    }

    Ok(())
}

/// Validates that an amount is strictly positive and has at most two decimal places
pub fn validate_positive(field: &str, amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(AppError::validation(format!(
            "{} must be greater than zero",
            field
        )));
    }

    validate_amount(field, amount)
}

/// `part / whole * 100` rounded to two places; zero when `whole` is zero
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    round_money(part / whole * Decimal::ONE_HUNDRED)
}
