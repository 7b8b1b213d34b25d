//! Account domain model.
//!
//! # Responsibility
//! - Define the canonical account record shared by repository and services.
//! - Normalize holder names, credentials and opening balances.
//!
//! # Invariants
//! - `number` is assigned by the repository, never by callers.
//! - `name` is at most `NAME_LEN` bytes and holds no NUL or line break.
//! - `pin` is non-negative once normalized.
//! - `balance` non-negativity is enforced by services, not by this type.

use serde::Serialize;

/// Store-assigned account key.
pub type AccountNumber = i32;

/// Width in bytes of the encoded holder name.
pub const NAME_LEN: usize = 50;

/// Numbers are allocated strictly above this floor, so the first is 1001.
pub const ACCOUNT_NUMBER_FLOOR: AccountNumber = 1000;

/// One bank account as persisted in the record store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// Unique key, allocated as `max(stored, ACCOUNT_NUMBER_FLOOR) + 1`.
    pub number: AccountNumber,
    /// Holder display name, already normalized.
    pub name: String,
    /// Plain credential compared by equality. Never serialized out.
    #[serde(skip_serializing)]
    pub pin: i32,
    /// Current balance.
    pub balance: f64,
}

impl Account {
    /// Creates an account in canonical form.
    ///
    /// # Invariants
    /// - `name` is normalized with [`normalize_name`].
    /// - `pin` is normalized with [`normalize_pin`].
    /// - `balance` is clamped with [`normalize_opening_balance`].
    pub fn new(number: AccountNumber, name: &str, pin: i32, balance: f64) -> Self {
        Self {
            number,
            name: normalize_name(name),
            pin: normalize_pin(pin),
            balance: normalize_opening_balance(balance),
        }
    }

    /// Plain equality check against the stored credential.
    pub fn pin_matches(&self, pin: i32) -> bool {
        self.pin == pin
    }
}

/// Field-level change accepted by account updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountUpdate {
    Name(String),
    Pin(i32),
}

impl AccountUpdate {
    /// Applies this change to `account` with the same normalization as create.
    pub fn apply(self, account: &mut Account) {
        match self {
            Self::Name(name) => account.name = normalize_name(&name),
            Self::Pin(pin) => account.pin = normalize_pin(pin),
        }
    }

    /// Short field label used in log events.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Pin(_) => "pin",
        }
    }
}

/// Cuts `raw` at the first NUL or line break and truncates it to `NAME_LEN`
/// bytes on a character boundary.
pub fn normalize_name(raw: &str) -> String {
    let cut = raw.find(['\0', '\n', '\r']).unwrap_or(raw.len());
    let mut end = cut.min(NAME_LEN);
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    raw[..end].to_string()
}

/// Negative credentials keep their magnitude; `i32::MIN` saturates.
pub fn normalize_pin(pin: i32) -> i32 {
    pin.saturating_abs()
}

/// Non-finite and negative opening balances become zero.
pub fn normalize_opening_balance(balance: f64) -> f64 {
    if balance.is_finite() && balance > 0.0 {
        balance
    } else {
        0.0
    }
}
