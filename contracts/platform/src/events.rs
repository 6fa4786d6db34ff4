use instrument_core::IssuanceState;
use soroban_sdk::{contracttype, Address, Symbol};

#[contracttype]
#[derive(Clone, Debug)]
pub struct InstrumentCreatedEvent {
    pub instrument: Address,
    pub fsp: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct InstrumentDeactivatedEvent {
    pub instrument: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct IssuanceCreatedEvent {
    pub issuance_id: u64,
    pub instrument: Address,
    pub seller: Address,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct IssuanceStateUpdatedEvent {
    pub issuance_id: u64,
    pub state: IssuanceState,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct EventScheduledEvent {
    pub issuance_id: u64,
    pub event_name: Symbol,
    pub timestamp: u64,
}
