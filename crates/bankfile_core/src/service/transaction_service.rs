//! Money-movement use-cases: deposit, withdraw and transfer.
//!
//! # Responsibility
//! - Validate amounts, credentials and funds before any write.
//! - Persist balance changes through the repository.
//!
//! # Invariants
//! - Balances never go below zero or become non-finite through this service.
//! - A transfer writes source and destination in one rewrite pass, so the
//!   sum of both balances is the same before and after, or nothing changes.

use super::{authorize, validate_amount, ServiceError, ServiceResult};
use crate::model::account::{Account, AccountNumber};
use crate::repo::account_repo::AccountRepository;
use log::info;

/// Balances after a completed transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub source: AccountNumber,
    pub destination: AccountNumber,
    pub amount: f64,
    pub source_balance: f64,
    pub destination_balance: f64,
}

/// Use-case service for balance mutations.
pub struct TransactionService<R: AccountRepository> {
    repo: R,
}

impl<R: AccountRepository> TransactionService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds `amount` to the account balance and returns the new balance.
    ///
    /// A sum that is no longer finite is rejected as `InvalidAmount`.
    pub fn deposit(&self, number: AccountNumber, amount: f64) -> ServiceResult<f64> {
        let mut account = self.load(number)?;
        let amount = validate_amount(amount)?;

        account.balance = credit(account.balance, amount)?;
        self.repo.replace_account(&account)?;

        info!("event=deposit module=service status=ok account={number} amount={amount:.2}");
        Ok(account.balance)
    }

    /// Removes `amount` from the balance after verifying `pin`.
    ///
    /// # Contract
    /// - Checks run in order: account exists, pin matches, amount is valid,
    ///   funds suffice.
    pub fn withdraw(&self, number: AccountNumber, pin: i32, amount: f64) -> ServiceResult<f64> {
        let mut account = self.load(number)?;
        authorize(&account, pin, "withdraw")?;
        let amount = validate_amount(amount)?;
        ensure_funds(&account, amount)?;

        account.balance -= amount;
        self.repo.replace_account(&account)?;

        info!("event=withdraw module=service status=ok account={number} amount={amount:.2}");
        Ok(account.balance)
    }

    /// Moves `amount` from `source` to `destination` after verifying the
    /// source `pin`.
    ///
    /// # Contract
    /// - Checks run in order: source exists, pin matches, destination exists,
    ///   accounts differ, amount is valid, funds suffice.
    /// - Both balances are written by a single rewrite pass.
    pub fn transfer(
        &self,
        source: AccountNumber,
        pin: i32,
        destination: AccountNumber,
        amount: f64,
    ) -> ServiceResult<TransferReceipt> {
        let mut from = self.load(source)?;
        authorize(&from, pin, "transfer")?;
        let mut to = self.load(destination)?;
        if source == destination {
            return Err(ServiceError::SameAccount(source));
        }
        let amount = validate_amount(amount)?;
        ensure_funds(&from, amount)?;

        to.balance = credit(to.balance, amount)?;
        from.balance -= amount;
        let (source_balance, destination_balance) = (from.balance, to.balance);
        self.repo.replace_accounts(&[from, to])?;

        info!(
            "event=transfer module=service status=ok source={source} destination={destination} amount={amount:.2}"
        );
        Ok(TransferReceipt {
            source,
            destination,
            amount,
            source_balance,
            destination_balance,
        })
    }

    fn load(&self, number: AccountNumber) -> ServiceResult<Account> {
        self.repo
            .find_account(number)?
            .ok_or(ServiceError::AccountNotFound(number))
    }
}

fn credit(balance: f64, amount: f64) -> ServiceResult<f64> {
    let credited = balance + amount;
    if credited.is_finite() {
        Ok(credited)
    } else {
        Err(ServiceError::InvalidAmount(amount))
    }
}

fn ensure_funds(account: &Account, amount: f64) -> ServiceResult<()> {
    if amount > account.balance {
        return Err(ServiceError::InsufficientFunds {
            number: account.number,
            balance: account.balance,
            requested: amount,
        });
    }
    Ok(())
}
