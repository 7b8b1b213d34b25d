//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the boundary operations used by
//!   front ends (create/find/list/update/delete, deposit/withdraw/transfer).
//! - Own credential checks and amount validation.
//!
//! # Invariants
//! - A rejected operation performs no write.
//! - Pins are compared by plain equality; they are never logged.

use crate::model::account::{Account, AccountNumber};
use crate::repo::account_repo::RepoError;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod account_service;
pub mod transaction_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for account and transaction use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Target account does not exist.
    AccountNotFound(AccountNumber),
    /// Supplied pin does not match the stored one.
    CredentialMismatch(AccountNumber),
    /// Amount is not a finite value greater than zero.
    InvalidAmount(f64),
    /// Amount exceeds the current balance.
    InsufficientFunds {
        number: AccountNumber,
        balance: f64,
        requested: f64,
    },
    /// Transfer source and destination are the same account.
    SameAccount(AccountNumber),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccountNotFound(number) => write!(f, "account not found: {number}"),
            Self::CredentialMismatch(number) => {
                write!(f, "pin verification failed for account {number}")
            }
            Self::InvalidAmount(amount) => write!(f, "invalid amount: {amount}"),
            Self::InsufficientFunds {
                number,
                balance,
                requested,
            } => write!(
                f,
                "insufficient funds in account {number}: balance {balance:.2}, requested {requested:.2}"
            ),
            Self::SameAccount(number) => {
                write!(f, "cannot transfer from account {number} to itself")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(number) => Self::AccountNotFound(number),
            other => Self::Repo(other),
        }
    }
}

/// Checks `pin` against the stored credential, logging `event` on rejection.
pub(crate) fn authorize(account: &Account, pin: i32, event: &str) -> ServiceResult<()> {
    if account.pin_matches(pin) {
        return Ok(());
    }
    warn!(
        "event={event} module=service status=rejected account={} error_code=credential_mismatch",
        account.number
    );
    Err(ServiceError::CredentialMismatch(account.number))
}

pub(crate) fn validate_amount(amount: f64) -> ServiceResult<f64> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(ServiceError::InvalidAmount(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_amount_accepts_only_positive_finite_values() {
        assert_eq!(validate_amount(0.01).unwrap(), 0.01);
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                validate_amount(bad),
                Err(ServiceError::InvalidAmount(_))
            ));
        }
    }

    #[test]
    fn repo_not_found_maps_to_account_not_found() {
        let err = ServiceError::from(RepoError::NotFound(1001));
        assert!(matches!(err, ServiceError::AccountNotFound(1001)));
        assert_eq!(err.to_string(), "account not found: 1001");
    }

    #[test]
    fn authorize_uses_plain_equality() {
        let account = Account::new(1001, "Alice", 1234, 0.0);
        assert!(authorize(&account, 1234, "test").is_ok());
        assert!(matches!(
            authorize(&account, 4321, "test"),
            Err(ServiceError::CredentialMismatch(1001))
        ));
    }
}
