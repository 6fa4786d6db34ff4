use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (1-5)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,

    // ============================================
    // AUTHORIZATION ERRORS (10-15)
    // ============================================
    /// Caller is not a registered operator
    NotOperator = 10,

    // ============================================
    // BALANCE ERRORS (20-29)
    // ============================================
    /// Amount must be positive
    InvalidAmount = 20,
    /// Free balance too low for the requested debit
    InsufficientBalance = 21,
    /// Issuance sub-ledger balance too low for the requested debit
    InsufficientIssuanceBalance = 22,
    /// Balance would overflow i128
    BalanceOverflow = 23,
}
