use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    /// Settlement-token contract used for the native currency leg
    NativeToken,
    /// Contracts allowed to move value between accounts and issuances
    Operator(Address),
    /// Free settlement-token balance per account
    Balance(Address),
    /// Free token balance per (account, token)
    TokenBalance(Address, Address),
    /// Settlement-token balance held for an issuance
    IssuanceBalance(u64),
    /// Token balance held for an issuance, per (issuance, token)
    IssuanceTokenBalance(u64, Address),
    Initialized,
}
