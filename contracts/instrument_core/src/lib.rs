//! Shared vocabulary between the platform and instrument contracts.
//!
//! Instruments cannot call back into the platform while a platform call is on
//! the stack, so every instrument hook returns an [`InstrumentResponse`]
//! describing the escrow transfers and scheduled events it wants, and the
//! platform executes them. The [`dispatch`] module wraps the dynamic
//! `invoke_contract` calls so the platform talks to any registered instrument
//! address through one typed seam.

#![no_std]

use soroban_sdk::{contracttype, vec, Address, Bytes, Env, IntoVal, Symbol, Vec};

/// Lifecycle states shared by all issuances.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IssuanceState {
    /// Created by the seller, waiting for the funding deposit
    Initiated = 0,
    /// Fully funded, open for a buyer to engage
    Engageable = 1,
    /// Engaged by a buyer, collateral and repayment in progress
    Active = 2,
    /// Fully repaid and settled
    Complete = 3,
    /// Funding deposit missed its deadline (terminal)
    Unfunded = 4,
    /// No buyer engaged before the deadline (terminal)
    CompleteNotEngaged = 5,
    /// Collateral or repayment obligations missed (terminal)
    Delinquent = 6,
}

/// Which side of the escrow a transfer moves value toward.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransferDirection {
    /// Account free balance -> issuance sub-ledger
    IntoIssuance = 0,
    /// Issuance sub-ledger -> account free balance
    FromIssuance = 1,
}

/// Currency leg of a transfer order.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransferKind {
    /// The escrow's configured settlement token
    Native,
    /// An arbitrary fungible token contract
    Token(Address),
}

/// One escrow instruction requested by an instrument hook.
#[contracttype]
#[derive(Clone, Debug)]
pub struct TransferOrder {
    pub direction: TransferDirection,
    pub kind: TransferKind,
    pub account: Address,
    pub amount: i128,
}

/// A deferred state-transition trigger to register with the scheduler.
#[contracttype]
#[derive(Clone, Debug)]
pub struct EventSchedule {
    pub name: Symbol,
    pub due: u64,
}

/// What an instrument hook asks the platform to do on its behalf.
///
/// `new_state` is `None` when the hook left the issuance state unchanged.
#[contracttype]
#[derive(Clone, Debug)]
pub struct InstrumentResponse {
    pub new_state: Option<IssuanceState>,
    pub transfers: Vec<TransferOrder>,
    pub schedules: Vec<EventSchedule>,
}

impl InstrumentResponse {
    /// A response that changes nothing.
    pub fn unchanged(env: &Env) -> Self {
        InstrumentResponse {
            new_state: None,
            transfers: Vec::new(env),
            schedules: Vec::new(env),
        }
    }
}

/// Typed wrappers around the dynamic instrument invocations.
pub mod dispatch {
    use super::*;

    pub fn on_create(
        env: &Env,
        instrument: &Address,
        issuance_id: u64,
        seller: &Address,
        parameters: &Bytes,
    ) -> InstrumentResponse {
        env.invoke_contract(
            instrument,
            &Symbol::new(env, "on_create"),
            vec![
                env,
                issuance_id.into_val(env),
                seller.into_val(env),
                parameters.into_val(env),
            ],
        )
    }

    pub fn on_engage(
        env: &Env,
        instrument: &Address,
        issuance_id: u64,
        buyer: &Address,
        payload: &Bytes,
    ) -> InstrumentResponse {
        env.invoke_contract(
            instrument,
            &Symbol::new(env, "on_engage"),
            vec![
                env,
                issuance_id.into_val(env),
                buyer.into_val(env),
                payload.into_val(env),
            ],
        )
    }

    pub fn on_deposit(
        env: &Env,
        instrument: &Address,
        issuance_id: u64,
        from: &Address,
        amount: i128,
    ) -> InstrumentResponse {
        env.invoke_contract(
            instrument,
            &Symbol::new(env, "on_deposit"),
            vec![
                env,
                issuance_id.into_val(env),
                from.into_val(env),
                amount.into_val(env),
            ],
        )
    }

    pub fn on_deposit_token(
        env: &Env,
        instrument: &Address,
        issuance_id: u64,
        from: &Address,
        token: &Address,
        amount: i128,
    ) -> InstrumentResponse {
        env.invoke_contract(
            instrument,
            &Symbol::new(env, "on_deposit_token"),
            vec![
                env,
                issuance_id.into_val(env),
                from.into_val(env),
                token.into_val(env),
                amount.into_val(env),
            ],
        )
    }

    pub fn on_scheduled_event(
        env: &Env,
        instrument: &Address,
        issuance_id: u64,
        name: &Symbol,
        payload: &Bytes,
    ) -> InstrumentResponse {
        env.invoke_contract(
            instrument,
            &Symbol::new(env, "on_scheduled_event"),
            vec![
                env,
                issuance_id.into_val(env),
                name.into_val(env),
                payload.into_val(env),
            ],
        )
    }
}
