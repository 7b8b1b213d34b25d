//! Repository layer over the record store.
//!
//! # Responsibility
//! - Define the account data access contract used by services.
//! - Express allocation, lookup and mutation purely through store primitives.
//!
//! # Invariants
//! - Every call re-reads the data file; nothing is cached between calls.
//! - Mutations of a missing account report `NotFound` and leave the file as-is.

pub mod account_repo;
