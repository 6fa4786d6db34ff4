#![no_std]

mod error;
mod interest;
mod storage;
mod terms;

pub use error::Error;
pub use storage::LoanProperties;
pub use terms::LoanTerms;

use interest::SECONDS_PER_DAY;
use storage::DataKey;

use instrument_core::{
    EventSchedule, InstrumentResponse, IssuanceState, TransferDirection, TransferKind,
    TransferOrder,
};
use soroban_sdk::{contract, contractimpl, Address, Bytes, Env, Symbol};

#[contract]
pub struct LoanInstrument;

#[contractimpl]
impl LoanInstrument {
    // ============================================
    // INITIALIZATION
    // ============================================

    /// Bind this instrument to the platform allowed to drive it
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(env: Env, admin: Address, platform: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Platform, &platform);

        Ok(())
    }

    // ============================================
    // INSTRUMENT HOOKS (PLATFORM ONLY)
    // ============================================

    /// Validate seller terms and open a new issuance in `Initiated`
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `IssuanceExists`: Issuance id already in use
    /// - terms decoding and validation errors
    pub fn on_create(
        env: Env,
        issuance_id: u64,
        seller: Address,
        parameters: Bytes,
    ) -> Result<InstrumentResponse, Error> {
        Self::require_platform(&env)?;

        if env
            .storage()
            .instance()
            .has(&DataKey::Properties(issuance_id))
        {
            return Err(Error::IssuanceExists);
        }

        let terms = terms::decode_terms(&env, &parameters)?;
        let now = env.ledger().timestamp();

        let props = LoanProperties {
            issuance_id,
            seller,
            buyer: None,
            state: IssuanceState::Initiated,
            start_date: now,
            engage_date: 0,
            collateral_token: terms.collateral_token,
            collateral_amount: terms.collateral_amount,
            borrow_amount: terms.borrow_amount,
            deposit_due_days: terms.deposit_due_days,
            collateral_due_days: terms.collateral_due_days,
            engagement_due_days: terms.engagement_due_days,
            tenor_days: terms.tenor_days,
            interest_rate: terms.interest_rate,
            grace_period: terms.grace_period,
            collateral_complete: false,
            interest: 0,
            deposited_amount: 0,
            collateral_deposited: 0,
            repaid_amount: 0,
        };
        Self::store(&env, &props);

        let mut response = InstrumentResponse::unchanged(&env);
        response.new_state = Some(IssuanceState::Initiated);
        response.schedules.push_back(EventSchedule {
            name: Symbol::new(&env, "deposit_expired"),
            due: now + day_seconds(props.deposit_due_days),
        });

        Ok(response)
    }

    /// Record a buyer and move the issuance to `Active`
    ///
    /// # Errors
    /// - `NotEngagable`: Issuance is not open for engagement
    pub fn on_engage(
        env: Env,
        issuance_id: u64,
        buyer: Address,
        _payload: Bytes,
    ) -> Result<InstrumentResponse, Error> {
        Self::require_platform(&env)?;
        let mut props = Self::load(&env, issuance_id)?;

        if props.state != IssuanceState::Engageable {
            return Err(Error::NotEngagable);
        }

        let now = env.ledger().timestamp();
        props.buyer = Some(buyer);
        props.engage_date = now;
        props.state = IssuanceState::Active;
        Self::store(&env, &props);

        let mut response = InstrumentResponse::unchanged(&env);
        response.new_state = Some(IssuanceState::Active);
        response.schedules.push_back(EventSchedule {
            name: Symbol::new(&env, "collateral_expired"),
            due: now + day_seconds(props.collateral_due_days),
        });
        response.schedules.push_back(EventSchedule {
            name: Symbol::new(&env, "loan_expired"),
            due: now + day_seconds(props.tenor_days),
        });
        response.schedules.push_back(EventSchedule {
            name: Symbol::new(&env, "grace_period_expired"),
            due: now + day_seconds(props.tenor_days) + day_seconds(props.grace_period),
        });

        Ok(response)
    }

    /// Handle settlement currency arriving in the issuance escrow.
    ///
    /// From the seller this is the funding deposit; from the buyer it is a
    /// repayment installment; anyone else is rejected.
    ///
    /// # Errors
    /// - `DepositNotInitiated`: Seller funding outside `Initiated`
    /// - `DepositExceedsBorrowAmount`: Funding above the borrow amount
    /// - `RepayBeforeCollateral`: Buyer repaying before collateral complete
    /// - `RepayExceedsBorrowAmount`: Repayment above the borrow amount
    /// - `UnknownTransferer`: Neither seller nor buyer
    pub fn on_deposit(
        env: Env,
        issuance_id: u64,
        from: Address,
        amount: i128,
    ) -> Result<InstrumentResponse, Error> {
        Self::require_platform(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let mut props = Self::load(&env, issuance_id)?;
        let now = env.ledger().timestamp();
        let mut response = InstrumentResponse::unchanged(&env);

        if from == props.seller {
            if props.state != IssuanceState::Initiated {
                return Err(Error::DepositNotInitiated);
            }

            let new_deposited = props
                .deposited_amount
                .checked_add(amount)
                .ok_or(Error::MathOverflow)?;
            if new_deposited > props.borrow_amount {
                return Err(Error::DepositExceedsBorrowAmount);
            }

            props.deposited_amount = new_deposited;
            if new_deposited == props.borrow_amount {
                props.state = IssuanceState::Engageable;
                response.new_state = Some(IssuanceState::Engageable);
                response.schedules.push_back(EventSchedule {
                    name: Symbol::new(&env, "engagement_expired"),
                    due: now + day_seconds(props.engagement_due_days),
                });
            }
        } else if props.buyer == Some(from) {
            if props.state != IssuanceState::Active || !props.collateral_complete {
                return Err(Error::RepayBeforeCollateral);
            }

            let new_repaid = props
                .repaid_amount
                .checked_add(amount)
                .ok_or(Error::MathOverflow)?;
            if new_repaid > props.borrow_amount {
                return Err(Error::RepayExceedsBorrowAmount);
            }

            let days = interest::elapsed_days(props.engage_date, now);
            let accrued = interest::accrued_interest(
                props.collateral_amount,
                props.interest_rate,
                days,
                amount,
                props.borrow_amount,
            )
            .ok_or(Error::MathOverflow)?;

            props.interest = props
                .interest
                .checked_add(accrued)
                .ok_or(Error::MathOverflow)?;
            props.repaid_amount = new_repaid;
        } else {
            return Err(Error::UnknownTransferer);
        }

        Self::store(&env, &props);
        Ok(response)
    }

    /// Handle collateral tokens arriving in the issuance escrow.
    ///
    /// Completing the collateral releases the escrowed borrow amount to the
    /// buyer.
    ///
    /// # Errors
    /// - `CollateralNotActive`: Issuance not in `Active`
    /// - `CollateralNotFromBuyer`: Depositor is not the buyer
    /// - `CollateralTokenMismatch`: Wrong token contract
    /// - `CollateralExceedsAmount`: Deposit above the collateral amount
    pub fn on_deposit_token(
        env: Env,
        issuance_id: u64,
        from: Address,
        token: Address,
        amount: i128,
    ) -> Result<InstrumentResponse, Error> {
        Self::require_platform(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let mut props = Self::load(&env, issuance_id)?;

        if props.state != IssuanceState::Active {
            return Err(Error::CollateralNotActive);
        }
        if props.buyer != Some(from.clone()) {
            return Err(Error::CollateralNotFromBuyer);
        }
        if token != props.collateral_token {
            return Err(Error::CollateralTokenMismatch);
        }

        let new_total = props
            .collateral_deposited
            .checked_add(amount)
            .ok_or(Error::MathOverflow)?;
        if new_total > props.collateral_amount {
            return Err(Error::CollateralExceedsAmount);
        }

        props.collateral_deposited = new_total;

        let mut response = InstrumentResponse::unchanged(&env);
        if new_total == props.collateral_amount {
            props.collateral_complete = true;
            response.transfers.push_back(TransferOrder {
                direction: TransferDirection::FromIssuance,
                kind: TransferKind::Native,
                account: from,
                amount: props.borrow_amount,
            });
        }

        Self::store(&env, &props);
        Ok(response)
    }

    /// Advance the state machine for a due scheduled event.
    ///
    /// Events fired after the issuance has already moved past the state they
    /// guard are no-ops, not errors.
    ///
    /// # Errors
    /// - `UnknownEvent`: Event name not part of the loan lifecycle
    pub fn on_scheduled_event(
        env: Env,
        issuance_id: u64,
        name: Symbol,
        _payload: Bytes,
    ) -> Result<InstrumentResponse, Error> {
        Self::require_platform(&env)?;
        let mut props = Self::load(&env, issuance_id)?;
        let mut response = InstrumentResponse::unchanged(&env);

        if name == Symbol::new(&env, "deposit_expired") {
            if props.state == IssuanceState::Initiated {
                if props.deposited_amount > 0 {
                    response.transfers.push_back(TransferOrder {
                        direction: TransferDirection::FromIssuance,
                        kind: TransferKind::Native,
                        account: props.seller.clone(),
                        amount: props.deposited_amount,
                    });
                }
                props.state = IssuanceState::Unfunded;
                response.new_state = Some(IssuanceState::Unfunded);
            }
        } else if name == Symbol::new(&env, "engagement_expired") {
            if props.state == IssuanceState::Engageable {
                response.transfers.push_back(TransferOrder {
                    direction: TransferDirection::FromIssuance,
                    kind: TransferKind::Native,
                    account: props.seller.clone(),
                    amount: props.deposited_amount,
                });
                props.state = IssuanceState::CompleteNotEngaged;
                response.new_state = Some(IssuanceState::CompleteNotEngaged);
            }
        } else if name == Symbol::new(&env, "collateral_expired") {
            if props.state == IssuanceState::Active && !props.collateral_complete {
                let buyer = Self::engaged_buyer(&props)?;
                response.transfers.push_back(TransferOrder {
                    direction: TransferDirection::FromIssuance,
                    kind: TransferKind::Native,
                    account: props.seller.clone(),
                    amount: props.deposited_amount,
                });
                if props.collateral_deposited > 0 {
                    response.transfers.push_back(TransferOrder {
                        direction: TransferDirection::FromIssuance,
                        kind: TransferKind::Token(props.collateral_token.clone()),
                        account: buyer,
                        amount: props.collateral_deposited,
                    });
                }
                props.state = IssuanceState::Delinquent;
                response.new_state = Some(IssuanceState::Delinquent);
            }
        } else if name == Symbol::new(&env, "loan_expired") {
            if props.state == IssuanceState::Active
                && props.collateral_complete
                && props.repaid_amount == props.borrow_amount
            {
                Self::distribute_completion(&mut props, &mut response)?;
            }
        } else if name == Symbol::new(&env, "grace_period_expired") {
            if props.state == IssuanceState::Active && props.collateral_complete {
                if props.repaid_amount == props.borrow_amount {
                    Self::distribute_completion(&mut props, &mut response)?;
                } else {
                    Self::distribute_default(&mut props, &mut response)?;
                }
            }
        } else {
            return Err(Error::UnknownEvent);
        }

        Self::store(&env, &props);
        Ok(response)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn get_properties(env: Env, issuance_id: u64) -> Result<LoanProperties, Error> {
        Self::load(&env, issuance_id)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn require_platform(env: &Env) -> Result<(), Error> {
        let platform: Address = env
            .storage()
            .instance()
            .get(&DataKey::Platform)
            .ok_or(Error::NotInitialized)?;
        platform.require_auth();
        Ok(())
    }

    fn load(env: &Env, issuance_id: u64) -> Result<LoanProperties, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Properties(issuance_id))
            .ok_or(Error::IssuanceNotFound)
    }

    fn store(env: &Env, props: &LoanProperties) {
        env.storage()
            .instance()
            .set(&DataKey::Properties(props.issuance_id), props);
    }

    fn engaged_buyer(props: &LoanProperties) -> Result<Address, Error> {
        props.buyer.clone().ok_or(Error::NotEngagable)
    }

    /// Fully repaid: principal to the seller, interest in collateral tokens
    /// to the seller, the rest of the collateral back to the buyer.
    fn distribute_completion(
        props: &mut LoanProperties,
        response: &mut InstrumentResponse,
    ) -> Result<(), Error> {
        let buyer = Self::engaged_buyer(props)?;
        let interest_share = props.interest.min(props.collateral_amount);

        response.transfers.push_back(TransferOrder {
            direction: TransferDirection::FromIssuance,
            kind: TransferKind::Native,
            account: props.seller.clone(),
            amount: props.repaid_amount,
        });
        if interest_share > 0 {
            response.transfers.push_back(TransferOrder {
                direction: TransferDirection::FromIssuance,
                kind: TransferKind::Token(props.collateral_token.clone()),
                account: props.seller.clone(),
                amount: interest_share,
            });
        }
        let remainder = props.collateral_amount - interest_share;
        if remainder > 0 {
            response.transfers.push_back(TransferOrder {
                direction: TransferDirection::FromIssuance,
                kind: TransferKind::Token(props.collateral_token.clone()),
                account: buyer,
                amount: remainder,
            });
        }

        props.state = IssuanceState::Complete;
        response.new_state = Some(IssuanceState::Complete);
        Ok(())
    }

    /// Grace period ran out with the loan still outstanding: accrue default
    /// interest on the unpaid remainder over tenor + grace, pay the seller
    /// whatever was repaid plus the interest share of the collateral, return
    /// the rest of the collateral to the buyer.
    fn distribute_default(
        props: &mut LoanProperties,
        response: &mut InstrumentResponse,
    ) -> Result<(), Error> {
        let buyer = Self::engaged_buyer(props)?;

        let unpaid = props.borrow_amount - props.repaid_amount;
        let default_days = (props.tenor_days as u64) + (props.grace_period as u64);
        let accrued = interest::accrued_interest(
            props.collateral_amount,
            props.interest_rate,
            default_days,
            unpaid,
            props.borrow_amount,
        )
        .ok_or(Error::MathOverflow)?;
        props.interest = props
            .interest
            .checked_add(accrued)
            .ok_or(Error::MathOverflow)?;

        let interest_share = props.interest.min(props.collateral_amount);

        if props.repaid_amount > 0 {
            response.transfers.push_back(TransferOrder {
                direction: TransferDirection::FromIssuance,
                kind: TransferKind::Native,
                account: props.seller.clone(),
                amount: props.repaid_amount,
            });
        }
        if interest_share > 0 {
            response.transfers.push_back(TransferOrder {
                direction: TransferDirection::FromIssuance,
                kind: TransferKind::Token(props.collateral_token.clone()),
                account: props.seller.clone(),
                amount: interest_share,
            });
        }
        let remainder = props.collateral_amount - interest_share;
        if remainder > 0 {
            response.transfers.push_back(TransferOrder {
                direction: TransferDirection::FromIssuance,
                kind: TransferKind::Token(props.collateral_token.clone()),
                account: buyer,
                amount: remainder,
            });
        }

        props.state = IssuanceState::Delinquent;
        response.new_state = Some(IssuanceState::Delinquent);
        Ok(())
    }
}

fn day_seconds(days: u32) -> u64 {
    (days as u64) * SECONDS_PER_DAY
}
