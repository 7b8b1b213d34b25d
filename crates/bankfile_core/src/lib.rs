//! Core domain logic for bankfile.
//! This crate is the single source of truth for account invariants and for
//! the on-disk record format.

pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::account::{Account, AccountNumber, AccountUpdate, NAME_LEN};
pub use repo::account_repo::{AccountRepository, FileAccountRepository, RepoError, RepoResult};
pub use service::account_service::AccountService;
pub use service::transaction_service::{TransactionService, TransferReceipt};
pub use service::{ServiceError, ServiceResult};
pub use store::{RecordStore, StoreConfig, StoreError, StoreResult};

