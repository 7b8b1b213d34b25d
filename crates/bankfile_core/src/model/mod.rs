//! Domain model for the account store.
//!
//! # Responsibility
//! - Define the one persisted entity (`Account`) and its field-level updates.
//! - Own the normalization rules that make a value storable.
//!
//! # Invariants
//! - Every account is identified by a store-assigned `AccountNumber`.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod account;
