//! Account repository contract and flat-file implementation.
//!
//! # Responsibility
//! - Allocate account numbers and append new accounts.
//! - Locate, replace and delete accounts by number.
//!
//! # Invariants
//! - Next number is `max(stored numbers, ACCOUNT_NUMBER_FLOOR) + 1`; allocation
//!   fails rather than wrap or repeat once that overflows.
//! - `replace_accounts` writes all targets in one rewrite pass or none.

use crate::model::account::{Account, AccountNumber, AccountUpdate, ACCOUNT_NUMBER_FLOOR};
use crate::store::{RecordStore, StoreError, Substitution};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for account persistence and lookup.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    NotFound(AccountNumber),
    /// The highest stored number is `AccountNumber::MAX`.
    NumbersExhausted,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::NotFound(number) => write!(f, "account not found: {number}"),
            Self::NumbersExhausted => write!(f, "no account numbers left to allocate"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::NotFound(_) | Self::NumbersExhausted => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Repository interface for account CRUD operations.
pub trait AccountRepository {
    fn next_account_number(&self) -> RepoResult<AccountNumber>;
    fn create_account(&self, name: &str, pin: i32, initial_deposit: f64) -> RepoResult<Account>;
    fn find_account(&self, number: AccountNumber) -> RepoResult<Option<Account>>;
    fn list_accounts(&self) -> RepoResult<Vec<Account>>;
    fn replace_account(&self, account: &Account) -> RepoResult<()>;
    fn replace_accounts(&self, accounts: &[Account]) -> RepoResult<()>;
    fn update_account(&self, number: AccountNumber, update: AccountUpdate) -> RepoResult<Account>;
    fn delete_account(&self, number: AccountNumber) -> RepoResult<()>;
}

/// Account repository backed by a `RecordStore`.
pub struct FileAccountRepository<'store> {
    store: &'store RecordStore,
}

impl<'store> FileAccountRepository<'store> {
    pub fn new(store: &'store RecordStore) -> Self {
        Self { store }
    }
}

impl AccountRepository for FileAccountRepository<'_> {
    fn next_account_number(&self) -> RepoResult<AccountNumber> {
        let mut highest = ACCOUNT_NUMBER_FLOOR;
        for record in self.store.scan()? {
            highest = highest.max(record?.number);
        }
        highest.checked_add(1).ok_or_else(|| {
            warn!("event=account_allocate module=repo status=error error_code=numbers_exhausted");
            RepoError::NumbersExhausted
        })
    }

    fn create_account(&self, name: &str, pin: i32, initial_deposit: f64) -> RepoResult<Account> {
        let number = self.next_account_number()?;
        let account = Account::new(number, name, pin, initial_deposit);
        self.store.append(&account)?;

        info!("event=account_create module=repo status=ok account={number}");
        Ok(account)
    }

    fn find_account(&self, number: AccountNumber) -> RepoResult<Option<Account>> {
        for record in self.store.scan()? {
            let account = record?;
            if account.number == number {
                return Ok(Some(account));
            }
        }
        Ok(None)
    }

    fn list_accounts(&self) -> RepoResult<Vec<Account>> {
        let accounts = self.store.scan()?.collect::<Result<Vec<_>, _>>()?;
        Ok(accounts)
    }

    fn replace_account(&self, account: &Account) -> RepoResult<()> {
        if !self
            .store
            .rewrite_substituting(account.number, Some(account))?
        {
            warn!(
                "event=account_replace module=repo status=error account={} error_code=not_found",
                account.number
            );
            return Err(RepoError::NotFound(account.number));
        }
        Ok(())
    }

    fn replace_accounts(&self, accounts: &[Account]) -> RepoResult<()> {
        let substitutions = accounts
            .iter()
            .cloned()
            .map(Substitution::replace)
            .collect::<Vec<_>>();
        let report = self.store.rewrite_with(&substitutions)?;

        if let Some(number) = report.missing.first() {
            warn!(
                "event=account_replace module=repo status=error account={number} error_code=not_found"
            );
            return Err(RepoError::NotFound(*number));
        }
        Ok(())
    }

    fn update_account(&self, number: AccountNumber, update: AccountUpdate) -> RepoResult<Account> {
        let mut account = self
            .find_account(number)?
            .ok_or(RepoError::NotFound(number))?;
        let field = update.field();
        update.apply(&mut account);
        self.replace_account(&account)?;

        info!("event=account_update module=repo status=ok account={number} field={field}");
        Ok(account)
    }

    fn delete_account(&self, number: AccountNumber) -> RepoResult<()> {
        if self.find_account(number)?.is_none() {
            return Err(RepoError::NotFound(number));
        }
        if !self.store.rewrite_substituting(number, None)? {
            return Err(RepoError::NotFound(number));
        }

        info!("event=account_delete module=repo status=ok account={number}");
        Ok(())
    }
}
