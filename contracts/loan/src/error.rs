use soroban_sdk::contracterror;

// Codes are namespaced per contract (escrow 1-99, loan 100-199, platform
// 200-299) so a failure keeps its identity when it crosses a contract
// boundary.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (101-105)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 101,
    /// Contract not initialized
    NotInitialized = 102,

    // ============================================
    // TERMS DECODING & VALIDATION (110-119)
    // ============================================
    /// Parameter blob is neither the binary nor the query encoding
    MalformedParameters = 110,
    /// "Collateral token address must not be 0"
    CollateralTokenRequired = 111,
    /// "Collateral amount must be greater than 0"
    CollateralAmountRequired = 112,
    /// "Borrow amount must be greater than 0"
    BorrowAmountRequired = 113,
    /// "Deposit due days must be greater than 0"
    DepositDueDaysRequired = 114,
    /// "Engagement due days must be greater than 0"
    EngagementDueDaysRequired = 115,
    /// "Collateral due days must be greater than 0"
    CollateralDueDaysRequired = 116,
    /// "Tenor days must be greater than 0"
    TenorDaysRequired = 117,
    /// "Tenor days must be greater than collateral due days"
    TenorBeforeCollateralDue = 118,
    /// "Grace period must be greater than 0"
    GracePeriodRequired = 119,

    // ============================================
    // STATE MACHINE PRECONDITIONS (120-139)
    // ============================================
    /// No issuance recorded under this id
    IssuanceNotFound = 120,
    /// An issuance with this id already exists
    IssuanceExists = 121,
    /// "Issuance must be in the Engagable state"
    NotEngagable = 122,
    /// "Ether deposit must happen in Initiated state."
    DepositNotInitiated = 123,
    /// "The Ether deposit cannot exceed the borrow amount."
    DepositExceedsBorrowAmount = 124,
    /// "Ether repay must happen after collateral is deposited."
    RepayBeforeCollateral = 125,
    /// "The Ether repay cannot exceed the borrow amount."
    RepayExceedsBorrowAmount = 126,
    /// "Unknown transferer. Only seller or buyer can send Ether to issuance."
    UnknownTransferer = 127,
    /// "Collateral deposit must occur in Active state."
    CollateralNotActive = 128,
    /// "Collateral deposit must come from the buyer."
    CollateralNotFromBuyer = 129,
    /// Collateral deposits must use the agreed collateral token
    CollateralTokenMismatch = 130,
    /// "Collateral token balance must not exceed the collateral amount"
    CollateralExceedsAmount = 131,

    // ============================================
    // OPERATIONAL ERRORS (140-149)
    // ============================================
    /// Scheduled event name not recognized by this instrument
    UnknownEvent = 140,
    /// Amount must be positive
    InvalidAmount = 141,
    /// Arithmetic overflow in interest or balance tracking
    MathOverflow = 142,
}
