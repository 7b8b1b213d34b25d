//! Fixed-width record codec.
//!
//! Layout, all integers little-endian, `RECORD_LEN` bytes per record:
//!
//! ```text
//! offset  size  field
//!      0     4  number   i32
//!      4    50  name     UTF-8, NUL-padded
//!     54     4  pin      i32
//!     58     8  balance  f64 (IEEE-754)
//! ```

use crate::model::account::{normalize_name, Account, AccountNumber, NAME_LEN};

const NUMBER_OFFSET: usize = 0;
const NAME_OFFSET: usize = NUMBER_OFFSET + 4;
const PIN_OFFSET: usize = NAME_OFFSET + NAME_LEN;
const BALANCE_OFFSET: usize = PIN_OFFSET + 4;

/// Encoded size of one account record.
pub const RECORD_LEN: usize = BALANCE_OFFSET + 8;

pub type RecordBytes = [u8; RECORD_LEN];

/// Encodes `account` into its on-disk form.
///
/// Names are re-normalized, so an over-long or NUL-bearing name is truncated
/// instead of spilling into the next field.
pub fn encode_record(account: &Account) -> RecordBytes {
    let mut buf = [0u8; RECORD_LEN];
    buf[NUMBER_OFFSET..NAME_OFFSET].copy_from_slice(&account.number.to_le_bytes());
    let name = normalize_name(&account.name);
    buf[NAME_OFFSET..NAME_OFFSET + name.len()].copy_from_slice(name.as_bytes());
    buf[PIN_OFFSET..BALANCE_OFFSET].copy_from_slice(&account.pin.to_le_bytes());
    buf[BALANCE_OFFSET..].copy_from_slice(&account.balance.to_le_bytes());
    buf
}

/// Decodes one record. Invalid UTF-8 in the name is replaced lossily.
pub fn decode_record(buf: &RecordBytes) -> Account {
    let name_field = &buf[NAME_OFFSET..PIN_OFFSET];
    let name_end = name_field
        .iter()
        .position(|byte| *byte == 0)
        .unwrap_or(NAME_LEN);

    Account {
        number: record_number(buf),
        name: String::from_utf8_lossy(&name_field[..name_end]).into_owned(),
        pin: i32::from_le_bytes(field(buf, PIN_OFFSET)),
        balance: f64::from_le_bytes(field(buf, BALANCE_OFFSET)),
    }
}

/// Reads only the key of an encoded record.
pub fn record_number(buf: &RecordBytes) -> AccountNumber {
    i32::from_le_bytes(field(buf, NUMBER_OFFSET))
}

fn field<const N: usize>(buf: &RecordBytes, offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[offset..offset + N]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_len_matches_documented_layout() {
        assert_eq!(RECORD_LEN, 66);
    }

    #[test]
    fn encode_places_fields_at_fixed_offsets() {
        let account = Account::new(1001, "Alice", 1234, 100.0);
        let buf = encode_record(&account);

        assert_eq!(&buf[0..4], &1001i32.to_le_bytes());
        assert_eq!(&buf[4..9], b"Alice");
        assert!(buf[9..54].iter().all(|byte| *byte == 0));
        assert_eq!(&buf[54..58], &1234i32.to_le_bytes());
        assert_eq!(&buf[58..66], &100.0f64.to_le_bytes());
    }

    #[test]
    fn decode_reads_back_encoded_account() {
        let account = Account::new(1002, "Zoë", 7, 12.25);
        assert_eq!(decode_record(&encode_record(&account)), account);
        assert_eq!(record_number(&encode_record(&account)), 1002);
    }

    #[test]
    fn full_width_name_has_no_terminator() {
        let name = "x".repeat(NAME_LEN);
        let account = Account::new(1003, &name, 1, 0.0);
        let decoded = decode_record(&encode_record(&account));
        assert_eq!(decoded.name, name);
        assert_eq!(decoded.pin, 1);
    }

    #[test]
    fn encode_truncates_unnormalized_name() {
        let account = Account {
            number: 1004,
            name: "y".repeat(NAME_LEN + 10),
            pin: 0,
            balance: 0.0,
        };
        let decoded = decode_record(&encode_record(&account));
        assert_eq!(decoded.name.len(), NAME_LEN);
    }

    #[test]
    fn decode_ignores_bytes_after_name_terminator() {
        let mut buf = encode_record(&Account::new(1005, "Ann", 1, 1.0));
        buf[NAME_OFFSET + 10] = b'!';
        assert_eq!(decode_record(&buf).name, "Ann");
    }
}
