#![no_std]

mod error;
mod events;
mod storage;

pub use error::Error;
pub use storage::{EventStatus, InstrumentRecord, IssuanceRecord};

use events::*;
use storage::DataKey;

use instrument_core::{dispatch, InstrumentResponse, IssuanceState, TransferDirection, TransferKind};
use soroban_sdk::{contract, contractimpl, token, vec, Address, Bytes, Env, IntoVal, Symbol, Val};

#[contract]
pub struct Platform;

#[contractimpl]
impl Platform {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Wire the platform to its escrow and fee configuration
    ///
    /// A zero fee disables the corresponding charge.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(
        env: Env,
        admin: Address,
        escrow: Address,
        fee_token: Address,
        instrument_fee: i128,
        issuance_fee: i128,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        if instrument_fee < 0 || issuance_fee < 0 {
            return Err(Error::InvalidAmount);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Escrow, &escrow);
        env.storage().instance().set(&DataKey::FeeToken, &fee_token);
        env.storage()
            .instance()
            .set(&DataKey::InstrumentFee, &instrument_fee);
        env.storage()
            .instance()
            .set(&DataKey::IssuanceFee, &issuance_fee);
        env.storage().instance().set(&DataKey::IssuanceCounter, &0u64);

        Ok(())
    }

    /// Grant the FSP role (admin only)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn add_fsp(env: Env, account: Address) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        env.storage().instance().set(&DataKey::Fsp(account), &true);

        Ok(())
    }

    /// Give up the FSP role (self-service)
    pub fn renounce_fsp(env: Env, account: Address) -> Result<(), Error> {
        account.require_auth();

        env.storage().instance().remove(&DataKey::Fsp(account));

        Ok(())
    }

    pub fn is_fsp(env: Env, account: Address) -> bool {
        Self::has_fsp_role(&env, &account)
    }

    /// Pull collected fees out of the platform (admin only)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount must be positive
    pub fn withdraw_fees(env: Env, to: Address, amount: i128) -> Result<(), Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        let fee_token: Address = env
            .storage()
            .instance()
            .get(&DataKey::FeeToken)
            .ok_or(Error::NotInitialized)?;
        token::Client::new(&env, &fee_token).transfer(
            &env.current_contract_address(),
            &to,
            &amount,
        );

        Ok(())
    }

    // ============================================
    // INSTRUMENT REGISTRY
    // ============================================

    /// Register an instrument contract (FSP role required)
    ///
    /// `expiration_seconds` of 0 registers a non-expiring instrument.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `CallerNotFsp`: Caller does not hold the FSP role
    /// - `InstrumentExists`: Address already registered
    pub fn create_instrument(
        env: Env,
        fsp: Address,
        instrument: Address,
        expiration_seconds: u64,
    ) -> Result<(), Error> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::NotInitialized);
        }

        fsp.require_auth();

        if !Self::has_fsp_role(&env, &fsp) {
            return Err(Error::CallerNotFsp);
        }

        if env
            .storage()
            .instance()
            .has(&DataKey::Instrument(instrument.clone()))
        {
            return Err(Error::InstrumentExists);
        }

        Self::charge_fee(&env, &fsp, &DataKey::InstrumentFee)?;

        let expiration = if expiration_seconds == 0 {
            0
        } else {
            env.ledger().timestamp() + expiration_seconds
        };

        let record = InstrumentRecord {
            fsp: fsp.clone(),
            expiration,
            active: true,
        };
        env.storage()
            .instance()
            .set(&DataKey::Instrument(instrument.clone()), &record);

        env.events().publish(
            (Symbol::new(&env, "instrument_created"), instrument.clone()),
            InstrumentCreatedEvent { instrument, fsp },
        );

        Ok(())
    }

    /// Deactivate an instrument (admin or original creator)
    ///
    /// Outstanding issuances keep processing; only new issuances are blocked.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InstrumentNotFound`: Address not registered
    /// - `DeactivateNotAllowed`: Caller is neither admin nor creator
    pub fn deactivate_instrument(
        env: Env,
        caller: Address,
        instrument: Address,
    ) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;

        caller.require_auth();

        let mut record: InstrumentRecord = env
            .storage()
            .instance()
            .get(&DataKey::Instrument(instrument.clone()))
            .ok_or(Error::InstrumentNotFound)?;

        if caller != admin && caller != record.fsp {
            return Err(Error::DeactivateNotAllowed);
        }

        record.active = false;
        env.storage()
            .instance()
            .set(&DataKey::Instrument(instrument.clone()), &record);

        env.events().publish(
            (
                Symbol::new(&env, "instrument_deactivated"),
                instrument.clone(),
            ),
            InstrumentDeactivatedEvent { instrument },
        );

        Ok(())
    }

    /// Active and not expired
    pub fn is_valid_instrument(env: Env, instrument: Address) -> bool {
        match env
            .storage()
            .instance()
            .get::<DataKey, InstrumentRecord>(&DataKey::Instrument(instrument))
        {
            Some(record) => {
                record.active
                    && (record.expiration == 0 || env.ledger().timestamp() < record.expiration)
            }
            None => false,
        }
    }

    // ============================================
    // ISSUANCE FACADE
    // ============================================

    /// Create a new issuance on a registered instrument
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InstrumentNotFound`: Instrument not registered
    /// - `InvalidInstrument`: Instrument deactivated or expired
    /// - any error raised by the instrument's parameter validation
    pub fn create_issuance(
        env: Env,
        seller: Address,
        instrument: Address,
        parameters: Bytes,
    ) -> Result<u64, Error> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::NotInitialized);
        }

        seller.require_auth();

        if !env
            .storage()
            .instance()
            .has(&DataKey::Instrument(instrument.clone()))
        {
            return Err(Error::InstrumentNotFound);
        }
        if !Self::is_valid_instrument(env.clone(), instrument.clone()) {
            return Err(Error::InvalidInstrument);
        }

        Self::charge_fee(&env, &seller, &DataKey::IssuanceFee)?;

        let issuance_id: u64 = env
            .storage()
            .instance()
            .get(&DataKey::IssuanceCounter)
            .unwrap_or(0)
            + 1;
        env.storage()
            .instance()
            .set(&DataKey::IssuanceCounter, &issuance_id);

        let response = dispatch::on_create(&env, &instrument, issuance_id, &seller, &parameters);

        let mut record = IssuanceRecord {
            issuance_id,
            instrument: instrument.clone(),
            seller: seller.clone(),
            state: IssuanceState::Initiated,
            created_at: env.ledger().timestamp(),
        };
        Self::apply_response(&env, &mut record, &response)?;

        env.events().publish(
            (Symbol::new(&env, "issuance_created"), issuance_id),
            IssuanceCreatedEvent {
                issuance_id,
                instrument,
                seller,
            },
        );

        Ok(issuance_id)
    }

    /// Engage an issuance as buyer
    ///
    /// # Errors
    /// - `IssuanceNotFound`: Unknown issuance id
    /// - any error raised by the instrument (wrong state, ...)
    pub fn engage_issuance(
        env: Env,
        buyer: Address,
        issuance_id: u64,
        payload: Bytes,
    ) -> Result<(), Error> {
        buyer.require_auth();

        let mut record = Self::load_issuance(&env, issuance_id)?;
        let response = dispatch::on_engage(&env, &record.instrument, issuance_id, &buyer, &payload);
        Self::apply_response(&env, &mut record, &response)?;

        Ok(())
    }

    /// Send settlement currency from the caller's escrow balance to an
    /// issuance (seller funding or buyer repayment; the instrument decides)
    ///
    /// # Errors
    /// - `IssuanceNotFound`: Unknown issuance id
    /// - `InvalidAmount`: Amount must be positive
    /// - escrow errors (insufficient balance) and instrument errors
    pub fn deposit(
        env: Env,
        from: Address,
        issuance_id: u64,
        amount: i128,
    ) -> Result<(), Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        from.require_auth();

        let mut record = Self::load_issuance(&env, issuance_id)?;

        // move the funds first; the instrument callback can still abort the
        // whole invocation, which unwinds this transfer as well
        let escrow = Self::escrow(&env)?;
        let operator: Val = env.current_contract_address().into_val(&env);
        env.invoke_contract::<()>(
            &escrow,
            &Symbol::new(&env, "transfer_to_issuance"),
            vec![
                &env,
                operator,
                from.clone().into_val(&env),
                issuance_id.into_val(&env),
                amount.into_val(&env),
            ],
        );

        let response = dispatch::on_deposit(&env, &record.instrument, issuance_id, &from, amount);
        Self::apply_response(&env, &mut record, &response)?;

        Ok(())
    }

    /// Token analogue of `deposit` (collateral leg)
    ///
    /// # Errors
    /// - `IssuanceNotFound`: Unknown issuance id
    /// - `InvalidAmount`: Amount must be positive
    /// - escrow errors (insufficient balance) and instrument errors
    pub fn deposit_token(
        env: Env,
        from: Address,
        issuance_id: u64,
        token: Address,
        amount: i128,
    ) -> Result<(), Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        from.require_auth();

        let mut record = Self::load_issuance(&env, issuance_id)?;

        let escrow = Self::escrow(&env)?;
        let operator: Val = env.current_contract_address().into_val(&env);
        env.invoke_contract::<()>(
            &escrow,
            &Symbol::new(&env, "transfer_token_to_issuance"),
            vec![
                &env,
                operator,
                from.clone().into_val(&env),
                issuance_id.into_val(&env),
                token.clone().into_val(&env),
                amount.into_val(&env),
            ],
        );

        let response = dispatch::on_deposit_token(
            &env,
            &record.instrument,
            issuance_id,
            &from,
            &token,
            amount,
        );
        Self::apply_response(&env, &mut record, &response)?;

        Ok(())
    }

    // ============================================
    // SCHEDULER
    // ============================================

    /// Process a due scheduled event. Anyone may call this; each
    /// (issuance, time, name) tuple is consumed exactly once.
    ///
    /// # Errors
    /// - `IssuanceNotFound`: Unknown issuance id
    /// - `EventNotScheduled`: Tuple never registered
    /// - `EventAlreadyProcessed`: Tuple already consumed
    /// - `EventNotDue`: Current time is before the due timestamp
    pub fn process_scheduled_event(
        env: Env,
        issuance_id: u64,
        timestamp: u64,
        name: Symbol,
        payload: Bytes,
    ) -> Result<(), Error> {
        let mut record = Self::load_issuance(&env, issuance_id)?;

        let key = DataKey::ScheduledEvent(issuance_id, timestamp, name.clone());
        let status: EventStatus = env
            .storage()
            .instance()
            .get(&key)
            .ok_or(Error::EventNotScheduled)?;

        if status == EventStatus::Consumed {
            return Err(Error::EventAlreadyProcessed);
        }
        if env.ledger().timestamp() < timestamp {
            return Err(Error::EventNotDue);
        }

        env.storage().instance().set(&key, &EventStatus::Consumed);

        let response =
            dispatch::on_scheduled_event(&env, &record.instrument, issuance_id, &name, &payload);
        Self::apply_response(&env, &mut record, &response)?;

        Ok(())
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn get_instrument(env: Env, instrument: Address) -> Result<InstrumentRecord, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Instrument(instrument))
            .ok_or(Error::InstrumentNotFound)
    }

    pub fn get_issuance(env: Env, issuance_id: u64) -> Result<IssuanceRecord, Error> {
        Self::load_issuance(&env, issuance_id)
    }

    pub fn get_scheduled_event(
        env: Env,
        issuance_id: u64,
        timestamp: u64,
        name: Symbol,
    ) -> Result<EventStatus, Error> {
        env.storage()
            .instance()
            .get(&DataKey::ScheduledEvent(issuance_id, timestamp, name))
            .ok_or(Error::EventNotScheduled)
    }

    pub fn issuance_count(env: Env) -> u64 {
        env.storage()
            .instance()
            .get(&DataKey::IssuanceCounter)
            .unwrap_or(0)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn escrow(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Escrow)
            .ok_or(Error::NotInitialized)
    }

    fn has_fsp_role(env: &Env, account: &Address) -> bool {
        env.storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::Fsp(account.clone()))
            .unwrap_or(false)
    }

    fn load_issuance(env: &Env, issuance_id: u64) -> Result<IssuanceRecord, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Issuance(issuance_id))
            .ok_or(Error::IssuanceNotFound)
    }

    fn charge_fee(env: &Env, payer: &Address, fee_key: &DataKey) -> Result<(), Error> {
        let fee: i128 = env
            .storage()
            .instance()
            .get::<DataKey, i128>(fee_key)
            .unwrap_or(0);
        if fee > 0 {
            let fee_token: Address = env
                .storage()
                .instance()
                .get(&DataKey::FeeToken)
                .ok_or(Error::NotInitialized)?;
            token::Client::new(env, &fee_token).transfer(
                payer,
                &env.current_contract_address(),
                &fee,
            );
        }
        Ok(())
    }

    /// Execute what the instrument asked for: escrow moves, scheduler
    /// registrations, and the state-change notification.
    fn apply_response(
        env: &Env,
        record: &mut IssuanceRecord,
        response: &InstrumentResponse,
    ) -> Result<(), Error> {
        let escrow = Self::escrow(env)?;
        let operator: Val = env.current_contract_address().into_val(env);
        let issuance_id = record.issuance_id;
        let id_val: Val = issuance_id.into_val(env);

        for order in response.transfers.iter() {
            match order.kind.clone() {
                TransferKind::Native => {
                    let method = match order.direction {
                        TransferDirection::IntoIssuance => "transfer_to_issuance",
                        TransferDirection::FromIssuance => "transfer_from_issuance",
                    };
                    env.invoke_contract::<()>(
                        &escrow,
                        &Symbol::new(env, method),
                        vec![
                            env,
                            operator,
                            order.account.clone().into_val(env),
                            id_val,
                            order.amount.into_val(env),
                        ],
                    );
                }
                TransferKind::Token(token) => {
                    let method = match order.direction {
                        TransferDirection::IntoIssuance => "transfer_token_to_issuance",
                        TransferDirection::FromIssuance => "transfer_token_from_issuance",
                    };
                    env.invoke_contract::<()>(
                        &escrow,
                        &Symbol::new(env, method),
                        vec![
                            env,
                            operator,
                            order.account.clone().into_val(env),
                            id_val,
                            token.into_val(env),
                            order.amount.into_val(env),
                        ],
                    );
                }
            }
        }

        for schedule in response.schedules.iter() {
            let key = DataKey::ScheduledEvent(issuance_id, schedule.due, schedule.name.clone());
            // registration is idempotent per tuple
            if !env.storage().instance().has(&key) {
                env.storage().instance().set(&key, &EventStatus::Pending);
                env.events().publish(
                    (Symbol::new(env, "event_scheduled"), issuance_id),
                    EventScheduledEvent {
                        issuance_id,
                        event_name: schedule.name.clone(),
                        timestamp: schedule.due,
                    },
                );
            }
        }

        if let Some(state) = response.new_state.clone() {
            record.state = state.clone();
            env.events().publish(
                (Symbol::new(env, "issuance_state_updated"), issuance_id),
                IssuanceStateUpdatedEvent { issuance_id, state },
            );
        }
        env.storage()
            .instance()
            .set(&DataKey::Issuance(issuance_id), record);

        Ok(())
    }
}
