#![no_std]

mod error;
mod events;
mod storage;

pub use error::Error;

use events::*;
use storage::DataKey;

use soroban_sdk::{contract, contractimpl, token, Address, Env, Symbol};

#[contract]
pub struct Escrow;

#[contractimpl]
impl Escrow {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Initialize the escrow with the settlement-token contract
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(env: Env, admin: Address, native_token: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::NativeToken, &native_token);

        Ok(())
    }

    /// Add an operator (the platform contract)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn add_operator(env: Env, operator: Address) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        env.storage()
            .instance()
            .set(&DataKey::Operator(operator), &true);

        Ok(())
    }

    /// Remove an operator
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn remove_operator(env: Env, operator: Address) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        env.storage().instance().remove(&DataKey::Operator(operator));

        Ok(())
    }

    pub fn is_operator(env: Env, address: Address) -> bool {
        env.storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::Operator(address))
            .unwrap_or(false)
    }

    // ============================================
    // ACCOUNT CUSTODY
    // ============================================

    /// Deposit settlement tokens into the caller's free balance
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount must be positive
    /// - `BalanceOverflow`: Balance would overflow
    pub fn deposit(env: Env, account: Address, amount: i128) -> Result<(), Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        account.require_auth();

        let native_token: Address = env
            .storage()
            .instance()
            .get(&DataKey::NativeToken)
            .ok_or(Error::NotInitialized)?;

        let client = token::Client::new(&env, &native_token);
        client.transfer(&account, &env.current_contract_address(), &amount);

        Self::credit(&env, &DataKey::Balance(account.clone()), amount)?;

        env.events().publish(
            (Symbol::new(&env, "deposited"), account.clone()),
            DepositedEvent { account, amount },
        );

        Ok(())
    }

    /// Withdraw settlement tokens from the caller's free balance
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount must be positive
    /// - `InsufficientBalance`: Free balance too low
    pub fn withdraw(env: Env, account: Address, amount: i128) -> Result<(), Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        account.require_auth();

        let native_token: Address = env
            .storage()
            .instance()
            .get(&DataKey::NativeToken)
            .ok_or(Error::NotInitialized)?;

        Self::debit(
            &env,
            &DataKey::Balance(account.clone()),
            amount,
            Error::InsufficientBalance,
        )?;

        let client = token::Client::new(&env, &native_token);
        client.transfer(&env.current_contract_address(), &account, &amount);

        env.events().publish(
            (Symbol::new(&env, "withdrawn"), account.clone()),
            WithdrawnEvent { account, amount },
        );

        Ok(())
    }

    /// Deposit fungible tokens into the caller's free balance
    ///
    /// The transfer is pull-based: the token contract rejects it unless the
    /// account authorized this invocation.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount must be positive
    /// - `BalanceOverflow`: Balance would overflow
    pub fn deposit_token(
        env: Env,
        account: Address,
        token: Address,
        amount: i128,
    ) -> Result<(), Error> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::NotInitialized);
        }

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        account.require_auth();

        let client = token::Client::new(&env, &token);
        client.transfer(&account, &env.current_contract_address(), &amount);

        Self::credit(
            &env,
            &DataKey::TokenBalance(account.clone(), token.clone()),
            amount,
        )?;

        env.events().publish(
            (Symbol::new(&env, "token_deposited"), account.clone()),
            TokenDepositedEvent {
                account,
                token,
                amount,
            },
        );

        Ok(())
    }

    /// Withdraw fungible tokens from the caller's free balance
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount must be positive
    /// - `InsufficientBalance`: Free balance too low
    pub fn withdraw_token(
        env: Env,
        account: Address,
        token: Address,
        amount: i128,
    ) -> Result<(), Error> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::NotInitialized);
        }

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        account.require_auth();

        Self::debit(
            &env,
            &DataKey::TokenBalance(account.clone(), token.clone()),
            amount,
            Error::InsufficientBalance,
        )?;

        let client = token::Client::new(&env, &token);
        client.transfer(&env.current_contract_address(), &account, &amount);

        env.events().publish(
            (Symbol::new(&env, "token_withdrawn"), account.clone()),
            TokenWithdrawnEvent {
                account,
                token,
                amount,
            },
        );

        Ok(())
    }

    // ============================================
    // ISSUANCE SUB-LEDGER (OPERATOR ONLY)
    // ============================================

    /// Move settlement tokens from an account's free balance into an issuance
    ///
    /// Bookkeeping only: custody stays with the escrow contract.
    ///
    /// # Errors
    /// - `NotOperator`: Caller is not a registered operator
    /// - `InvalidAmount`: Amount must be positive
    /// - `InsufficientBalance`: Account free balance too low
    pub fn transfer_to_issuance(
        env: Env,
        operator: Address,
        account: Address,
        issuance_id: u64,
        amount: i128,
    ) -> Result<(), Error> {
        Self::check_operator(&env, &operator)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        Self::debit(
            &env,
            &DataKey::Balance(account.clone()),
            amount,
            Error::InsufficientBalance,
        )?;
        Self::credit(&env, &DataKey::IssuanceBalance(issuance_id), amount)?;

        env.events().publish(
            (Symbol::new(&env, "issuance_credited"), issuance_id),
            IssuanceCreditedEvent {
                issuance_id,
                account,
                token: None,
                amount,
            },
        );

        Ok(())
    }

    /// Move settlement tokens from an issuance back to an account
    ///
    /// # Errors
    /// - `NotOperator`: Caller is not a registered operator
    /// - `InvalidAmount`: Amount must be positive
    /// - `InsufficientIssuanceBalance`: Issuance balance too low
    pub fn transfer_from_issuance(
        env: Env,
        operator: Address,
        account: Address,
        issuance_id: u64,
        amount: i128,
    ) -> Result<(), Error> {
        Self::check_operator(&env, &operator)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        Self::debit(
            &env,
            &DataKey::IssuanceBalance(issuance_id),
            amount,
            Error::InsufficientIssuanceBalance,
        )?;
        Self::credit(&env, &DataKey::Balance(account.clone()), amount)?;

        env.events().publish(
            (Symbol::new(&env, "issuance_debited"), issuance_id),
            IssuanceDebitedEvent {
                issuance_id,
                account,
                token: None,
                amount,
            },
        );

        Ok(())
    }

    /// Token analogue of `transfer_to_issuance`
    ///
    /// # Errors
    /// - `NotOperator`: Caller is not a registered operator
    /// - `InvalidAmount`: Amount must be positive
    /// - `InsufficientBalance`: Account free token balance too low
    pub fn transfer_token_to_issuance(
        env: Env,
        operator: Address,
        account: Address,
        issuance_id: u64,
        token: Address,
        amount: i128,
    ) -> Result<(), Error> {
        Self::check_operator(&env, &operator)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        Self::debit(
            &env,
            &DataKey::TokenBalance(account.clone(), token.clone()),
            amount,
            Error::InsufficientBalance,
        )?;
        Self::credit(
            &env,
            &DataKey::IssuanceTokenBalance(issuance_id, token.clone()),
            amount,
        )?;

        env.events().publish(
            (Symbol::new(&env, "issuance_credited"), issuance_id),
            IssuanceCreditedEvent {
                issuance_id,
                account,
                token: Some(token),
                amount,
            },
        );

        Ok(())
    }

    /// Token analogue of `transfer_from_issuance`
    ///
    /// # Errors
    /// - `NotOperator`: Caller is not a registered operator
    /// - `InvalidAmount`: Amount must be positive
    /// - `InsufficientIssuanceBalance`: Issuance token balance too low
    pub fn transfer_token_from_issuance(
        env: Env,
        operator: Address,
        account: Address,
        issuance_id: u64,
        token: Address,
        amount: i128,
    ) -> Result<(), Error> {
        Self::check_operator(&env, &operator)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        Self::debit(
            &env,
            &DataKey::IssuanceTokenBalance(issuance_id, token.clone()),
            amount,
            Error::InsufficientIssuanceBalance,
        )?;
        Self::credit(
            &env,
            &DataKey::TokenBalance(account.clone(), token.clone()),
            amount,
        )?;

        env.events().publish(
            (Symbol::new(&env, "issuance_debited"), issuance_id),
            IssuanceDebitedEvent {
                issuance_id,
                account,
                token: Some(token),
                amount,
            },
        );

        Ok(())
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn balance_of(env: Env, account: Address) -> i128 {
        Self::read(&env, &DataKey::Balance(account))
    }

    pub fn token_balance_of(env: Env, account: Address, token: Address) -> i128 {
        Self::read(&env, &DataKey::TokenBalance(account, token))
    }

    pub fn balance_of_issuance(env: Env, issuance_id: u64) -> i128 {
        Self::read(&env, &DataKey::IssuanceBalance(issuance_id))
    }

    pub fn token_balance_of_issuance(env: Env, issuance_id: u64, token: Address) -> i128 {
        Self::read(&env, &DataKey::IssuanceTokenBalance(issuance_id, token))
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn check_operator(env: &Env, operator: &Address) -> Result<(), Error> {
        let registered = env
            .storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::Operator(operator.clone()))
            .unwrap_or(false);

        if !registered {
            return Err(Error::NotOperator);
        }

        operator.require_auth();
        Ok(())
    }

    fn read(env: &Env, key: &DataKey) -> i128 {
        env.storage()
            .instance()
            .get::<DataKey, i128>(key)
            .unwrap_or(0)
    }

    fn credit(env: &Env, key: &DataKey, amount: i128) -> Result<(), Error> {
        let balance = Self::read(env, key);
        let new_balance = balance.checked_add(amount).ok_or(Error::BalanceOverflow)?;
        env.storage().instance().set(key, &new_balance);
        Ok(())
    }

    fn debit(env: &Env, key: &DataKey, amount: i128, insufficient: Error) -> Result<(), Error> {
        let balance = Self::read(env, key);
        if balance < amount {
            return Err(insufficient);
        }

        let new_balance = balance - amount;
        if new_balance == 0 {
            env.storage().instance().remove(key);
        } else {
            env.storage().instance().set(key, &new_balance);
        }
        Ok(())
    }
}
