use instrument_core::IssuanceState;
use soroban_sdk::{contracttype, Address, Symbol};

#[contracttype]
#[derive(Clone, Debug)]
pub struct InstrumentRecord {
    /// The financial-service provider who registered the instrument
    pub fsp: Address,
    /// Absolute expiration timestamp, 0 = never expires
    pub expiration: u64,
    pub active: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct IssuanceRecord {
    pub issuance_id: u64,
    pub instrument: Address,
    pub seller: Address,
    /// Last state reported by the instrument
    pub state: IssuanceState,
    pub created_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EventStatus {
    Pending = 0,
    Consumed = 1,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Escrow,
    FeeToken,
    /// Fee charged for registering an instrument
    InstrumentFee,
    /// Fee charged for creating an issuance
    IssuanceFee,
    Fsp(Address),
    Instrument(Address),
    Issuance(u64),
    IssuanceCounter,
    /// (issuance id, due timestamp, event name)
    ScheduledEvent(u64, u64, Symbol),
    Initialized,
}
