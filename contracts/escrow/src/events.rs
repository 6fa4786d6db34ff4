use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug)]
pub struct DepositedEvent {
    pub account: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct WithdrawnEvent {
    pub account: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct TokenDepositedEvent {
    pub account: Address,
    pub token: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct TokenWithdrawnEvent {
    pub account: Address,
    pub token: Address,
    pub amount: i128,
}

/// Value moved from an account's free balance into an issuance sub-ledger.
#[contracttype]
#[derive(Clone, Debug)]
pub struct IssuanceCreditedEvent {
    pub issuance_id: u64,
    pub account: Address,
    pub token: Option<Address>,
    pub amount: i128,
}

/// Value moved from an issuance sub-ledger back to an account's free balance.
#[contracttype]
#[derive(Clone, Debug)]
pub struct IssuanceDebitedEvent {
    pub issuance_id: u64,
    pub account: Address,
    pub token: Option<Address>,
    pub amount: i128,
}
