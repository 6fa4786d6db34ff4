//! Seller-terms decoding.
//!
//! Two wire encodings are accepted. The canonical one is the contract-native
//! binary encoding of [`LoanTerms`] (XDR, fixed field order). The legacy one
//! is a URL-query string (`collateral-token-address=C...&collateral-amount=..`)
//! with the collateral token as a strkey. Decoding tries the binary form
//! first and falls back to the query form, then validates either result
//! against the same rules.

use crate::error::Error;
use soroban_sdk::{contracttype, xdr::FromXdr, Address, Bytes, Env};

/// Strkey-encoded addresses are always 56 characters
const STRKEY_LEN: u32 = 56;

#[contracttype]
#[derive(Clone, Debug)]
pub struct LoanTerms {
    pub collateral_token: Address,
    pub collateral_amount: i128,
    pub borrow_amount: i128,
    pub deposit_due_days: u32,
    pub collateral_due_days: u32,
    pub engagement_due_days: u32,
    pub tenor_days: u32,
    pub interest_rate: u32,
    pub grace_period: u32,
}

pub fn decode_terms(env: &Env, parameters: &Bytes) -> Result<LoanTerms, Error> {
    let terms = match LoanTerms::from_xdr(env, parameters) {
        Ok(terms) => terms,
        Err(_) => decode_query(env, parameters)?,
    };
    validate_terms(&terms)?;
    Ok(terms)
}

pub fn validate_terms(terms: &LoanTerms) -> Result<(), Error> {
    if terms.collateral_amount <= 0 {
        return Err(Error::CollateralAmountRequired);
    }
    if terms.borrow_amount <= 0 {
        return Err(Error::BorrowAmountRequired);
    }
    if terms.deposit_due_days == 0 {
        return Err(Error::DepositDueDaysRequired);
    }
    if terms.engagement_due_days == 0 {
        return Err(Error::EngagementDueDaysRequired);
    }
    if terms.collateral_due_days == 0 {
        return Err(Error::CollateralDueDaysRequired);
    }
    if terms.tenor_days == 0 {
        return Err(Error::TenorDaysRequired);
    }
    if terms.tenor_days <= terms.collateral_due_days {
        return Err(Error::TenorBeforeCollateralDue);
    }
    if terms.grace_period == 0 {
        return Err(Error::GracePeriodRequired);
    }
    Ok(())
}

fn decode_query(env: &Env, parameters: &Bytes) -> Result<LoanTerms, Error> {
    let mut collateral_token: Option<Address> = None;
    let mut collateral_amount: i128 = 0;
    let mut borrow_amount: i128 = 0;
    let mut deposit_due_days: u32 = 0;
    let mut collateral_due_days: u32 = 0;
    let mut engagement_due_days: u32 = 0;
    let mut tenor_days: u32 = 0;
    let mut interest_rate: u32 = 0;
    let mut grace_period: u32 = 0;

    let len = parameters.len();
    let mut start: u32 = 0;
    while start < len {
        let mut end = start;
        while end < len && parameters.get_unchecked(end) != b'&' {
            end += 1;
        }

        if end > start {
            let mut sep = start;
            while sep < end && parameters.get_unchecked(sep) != b'=' {
                sep += 1;
            }
            if sep == end {
                return Err(Error::MalformedParameters);
            }

            let key = parameters.slice(start..sep);
            let value = parameters.slice(sep + 1..end);

            if key == Bytes::from_slice(env, b"collateral-token-address") {
                // anything that is not a strkey (the legacy "0") counts as unset
                if value.len() == STRKEY_LEN {
                    collateral_token = Some(Address::from_string_bytes(&value));
                }
            } else if key == Bytes::from_slice(env, b"collateral-amount") {
                collateral_amount = parse_amount(&value)?;
            } else if key == Bytes::from_slice(env, b"borrow-amount") {
                borrow_amount = parse_amount(&value)?;
            } else if key == Bytes::from_slice(env, b"deposit-due-days") {
                deposit_due_days = parse_days(&value)?;
            } else if key == Bytes::from_slice(env, b"collateral-due-days") {
                collateral_due_days = parse_days(&value)?;
            } else if key == Bytes::from_slice(env, b"engagement-due-days") {
                engagement_due_days = parse_days(&value)?;
            } else if key == Bytes::from_slice(env, b"tenor-days") {
                tenor_days = parse_days(&value)?;
            } else if key == Bytes::from_slice(env, b"interest-rate") {
                interest_rate = parse_days(&value)?;
            } else if key == Bytes::from_slice(env, b"grace-period") {
                grace_period = parse_days(&value)?;
            }
            // unknown keys are ignored
        }

        start = end + 1;
    }

    let collateral_token = collateral_token.ok_or(Error::CollateralTokenRequired)?;

    Ok(LoanTerms {
        collateral_token,
        collateral_amount,
        borrow_amount,
        deposit_due_days,
        collateral_due_days,
        engagement_due_days,
        tenor_days,
        interest_rate,
        grace_period,
    })
}

fn parse_amount(value: &Bytes) -> Result<i128, Error> {
    if value.is_empty() {
        return Err(Error::MalformedParameters);
    }

    let mut out: i128 = 0;
    for b in value.iter() {
        if !b.is_ascii_digit() {
            return Err(Error::MalformedParameters);
        }
        out = out
            .checked_mul(10)
            .and_then(|v| v.checked_add((b - b'0') as i128))
            .ok_or(Error::MalformedParameters)?;
    }
    Ok(out)
}

fn parse_days(value: &Bytes) -> Result<u32, Error> {
    let amount = parse_amount(value)?;
    u32::try_from(amount).map_err(|_| Error::MalformedParameters)
}
