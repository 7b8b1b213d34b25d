//! Account use-case service.
//!
//! # Responsibility
//! - Provide create/find/list entry points for front ends.
//! - Gate update and delete behind the account's credential.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Service layer remains storage-agnostic.

use super::{authorize, ServiceError, ServiceResult};
use crate::model::account::{Account, AccountNumber, AccountUpdate};
use crate::repo::account_repo::AccountRepository;

/// Use-case service wrapper for account CRUD operations.
pub struct AccountService<R: AccountRepository> {
    repo: R,
}

impl<R: AccountRepository> AccountService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Opens a new account and returns it with its assigned number.
    ///
    /// # Contract
    /// - Negative `pin` is stored as its magnitude.
    /// - Negative or non-finite `initial_deposit` is stored as `0.0`.
    pub fn create_account(
        &self,
        name: &str,
        pin: i32,
        initial_deposit: f64,
    ) -> ServiceResult<Account> {
        Ok(self.repo.create_account(name, pin, initial_deposit)?)
    }

    /// Gets one account by number.
    pub fn find_account(&self, number: AccountNumber) -> ServiceResult<Account> {
        self.repo
            .find_account(number)?
            .ok_or(ServiceError::AccountNotFound(number))
    }

    /// Lists every account in storage order.
    pub fn list_accounts(&self) -> ServiceResult<Vec<Account>> {
        Ok(self.repo.list_accounts()?)
    }

    /// Changes the name or pin of an account after verifying `pin`.
    pub fn update_account(
        &self,
        number: AccountNumber,
        pin: i32,
        update: AccountUpdate,
    ) -> ServiceResult<Account> {
        let account = self.find_account(number)?;
        authorize(&account, pin, "account_update")?;
        Ok(self.repo.update_account(number, update)?)
    }

    /// Removes an account after verifying `pin`.
    pub fn delete_account(&self, number: AccountNumber, pin: i32) -> ServiceResult<()> {
        let account = self.find_account(number)?;
        authorize(&account, pin, "account_delete")?;
        Ok(self.repo.delete_account(number)?)
    }
}
