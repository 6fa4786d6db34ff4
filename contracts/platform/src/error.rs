use soroban_sdk::contracterror;

// Codes are namespaced per contract (escrow 1-99, loan 100-199, platform
// 200-299) so a failure keeps its identity when it crosses a contract
// boundary.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (201-205)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 201,
    /// Contract not initialized
    NotInitialized = 202,

    // ============================================
    // ROLE ERRORS (210-219)
    // ============================================
    /// "FspRole: caller does not have the Fsp role"
    CallerNotFsp = 210,
    /// "Only admin or creator can deactivate an instrument"
    DeactivateNotAllowed = 211,

    // ============================================
    // REGISTRY ERRORS (220-229)
    // ============================================
    /// "Instrument already exists"
    InstrumentExists = 220,
    /// No instrument registered under this address
    InstrumentNotFound = 221,
    /// "Invalid instrument" (deactivated or expired)
    InvalidInstrument = 222,

    // ============================================
    // ISSUANCE ERRORS (230-239)
    // ============================================
    /// No issuance recorded under this id
    IssuanceNotFound = 230,

    // ============================================
    // SCHEDULER ERRORS (240-249)
    // ============================================
    /// No event registered for this (issuance, time, name) tuple
    EventNotScheduled = 240,
    /// "The scheduled event is not due now."
    EventNotDue = 241,
    /// The tuple was already processed
    EventAlreadyProcessed = 242,

    // ============================================
    // AMOUNT ERRORS (250-259)
    // ============================================
    /// Amount must be positive
    InvalidAmount = 250,
}
