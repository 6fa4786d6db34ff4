//! Interest accrual for loan repayments.
//!
//! Interest is settled in collateral-token units. Each repayment installment
//! accrues interest on the repaid fraction of the borrow amount, prorated by
//! whole days elapsed since engagement:
//!
//!   interest = collateral_amount * rate * days * amount / borrow_amount / 1e8
//!
//! All divisions truncate. The rate is a per-day rate scaled by 1e8, so a
//! rate of 10_000 earns 1/10_000 of the collateral amount per day on a fully
//! outstanding loan.

pub const SECONDS_PER_DAY: u64 = 86_400;

/// Divisor applied to `interest_rate`
pub const RATE_SCALE: i128 = 100_000_000;

/// Whole days between two timestamps, truncating
pub fn elapsed_days(from: u64, to: u64) -> u64 {
    to.saturating_sub(from) / SECONDS_PER_DAY
}

/// Interest accrued by repaying `amount` after `days` days.
///
/// Returns `None` on overflow or a non-positive borrow amount.
pub fn accrued_interest(
    collateral_amount: i128,
    interest_rate: u32,
    days: u64,
    amount: i128,
    borrow_amount: i128,
) -> Option<i128> {
    if borrow_amount <= 0 {
        return None;
    }

    collateral_amount
        .checked_mul(interest_rate as i128)?
        .checked_mul(days as i128)?
        .checked_mul(amount)?
        .checked_div(borrow_amount)?
        .checked_div(RATE_SCALE)
}
