use instrument_core::IssuanceState;
use soroban_sdk::{contracttype, Address};

/// Full record of one loan issuance: the decoded seller terms plus the
/// runtime fields the state machine accumulates.
#[contracttype]
#[derive(Clone, Debug)]
pub struct LoanProperties {
    pub issuance_id: u64,
    pub seller: Address,
    /// Unset until a buyer engages
    pub buyer: Option<Address>,
    pub state: IssuanceState,
    /// Creation timestamp
    pub start_date: u64,
    /// Engagement timestamp, 0 until engaged
    pub engage_date: u64,
    pub collateral_token: Address,
    pub collateral_amount: i128,
    pub borrow_amount: i128,
    pub deposit_due_days: u32,
    pub collateral_due_days: u32,
    pub engagement_due_days: u32,
    pub tenor_days: u32,
    /// Per-day rate scaled by 1e8
    pub interest_rate: u32,
    pub grace_period: u32,
    pub collateral_complete: bool,
    /// Interest accrued so far, in collateral-token units
    pub interest: i128,
    /// Cumulative seller funding deposits
    pub deposited_amount: i128,
    /// Cumulative buyer collateral deposits
    pub collateral_deposited: i128,
    /// Cumulative buyer repayments
    pub repaid_amount: i128,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    /// The platform contract allowed to drive this instrument
    Platform,
    Properties(u64),
    Initialized,
}
