use bankfile_core::store::record::{encode_record, RECORD_LEN};
use bankfile_core::store::{RecordStore, StoreConfig, StoreError, Substitution};
use bankfile_core::Account;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> RecordStore {
    RecordStore::new(StoreConfig::new(dir.path().join("accounts.dat")))
}

fn seed(store: &RecordStore) -> (Account, Account, Account) {
    let a = Account::new(1001, "Alice", 1111, 10.0);
    let b = Account::new(1002, "Bob", 2222, 20.0);
    let c = Account::new(1003, "Carol", 3333, 30.0);
    for account in [&a, &b, &c] {
        store.append(account).unwrap();
    }
    (a, b, c)
}

fn scan_all(store: &RecordStore) -> Vec<Account> {
    store
        .scan()
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn entries(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

#[test]
fn scan_of_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    assert_eq!(store.scan().unwrap().count(), 0);
    assert!(!store.path().exists());
}

#[test]
fn append_keeps_storage_order_and_scan_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let (a, b, c) = seed(&store);

    assert_eq!(scan_all(&store), vec![a.clone(), b.clone(), c.clone()]);
    assert_eq!(scan_all(&store), vec![a, b, c]);
    assert_eq!(
        fs::metadata(store.path()).unwrap().len(),
        3 * RECORD_LEN as u64
    );
}

#[test]
fn replacing_a_record_leaves_neighbours_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let (_, mut b, _) = seed(&store);
    let before = fs::read(store.path()).unwrap();

    b.balance = 99.5;
    assert!(store.rewrite_substituting(b.number, Some(&b)).unwrap());

    let after = fs::read(store.path()).unwrap();
    assert_eq!(after.len(), before.len());
    assert_eq!(after[..RECORD_LEN], before[..RECORD_LEN]);
    assert_eq!(after[2 * RECORD_LEN..], before[2 * RECORD_LEN..]);
    assert_eq!(after[RECORD_LEN..2 * RECORD_LEN], encode_record(&b));
    assert_eq!(entries(dir.path()), 1);
}

#[test]
fn deleting_a_record_keeps_the_others_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let (a, b, c) = seed(&store);
    let before = fs::read(store.path()).unwrap();

    assert!(store.rewrite_substituting(b.number, None).unwrap());

    let after = fs::read(store.path()).unwrap();
    assert_eq!(after.len(), 2 * RECORD_LEN);
    assert_eq!(after[..RECORD_LEN], before[..RECORD_LEN]);
    assert_eq!(after[RECORD_LEN..], before[2 * RECORD_LEN..]);
    assert_eq!(scan_all(&store), vec![a, c]);
}

#[test]
fn untargeted_records_are_copied_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let a = Account::new(1001, "Alice", 1, 1.0);
    let mut b_raw = encode_record(&Account::new(1002, "Bob", 2, 2.0));
    // Stale bytes after the name terminator must survive a rewrite.
    b_raw[30] = b'?';
    let mut raw = encode_record(&a).to_vec();
    raw.extend_from_slice(&b_raw);
    fs::write(store.path(), &raw).unwrap();

    let mut updated = a.clone();
    updated.balance = 5.0;
    assert!(store.rewrite_substituting(1001, Some(&updated)).unwrap());

    let after = fs::read(store.path()).unwrap();
    assert_eq!(after[RECORD_LEN..], b_raw);
}

#[test]
fn unknown_key_is_reported_and_file_is_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    seed(&store);
    let before = fs::read(store.path()).unwrap();

    assert!(!store.rewrite_substituting(4242, None).unwrap());
    assert_eq!(fs::read(store.path()).unwrap(), before);
    assert_eq!(entries(dir.path()), 1);
}

#[test]
fn rewrite_of_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let err = store.rewrite_substituting(1001, None).unwrap_err();
    assert!(matches!(err, StoreError::Missing(path) if path == store.path()));
    assert_eq!(entries(dir.path()), 0);
}

#[test]
fn truncated_tail_aborts_rewrite_without_touching_original() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let (a, _, _) = seed(&store);
    OpenOptions::new()
        .append(true)
        .open(store.path())
        .unwrap()
        .write_all(&[0xAB; 10])
        .unwrap();
    let before = fs::read(store.path()).unwrap();

    let items = store.scan().unwrap().collect::<Vec<_>>();
    assert_eq!(items.len(), 4);
    assert_eq!(items[0].as_ref().unwrap(), &a);
    assert!(matches!(
        items[3],
        Err(StoreError::TruncatedRecord { offset, len: 10 }) if offset == 3 * RECORD_LEN as u64
    ));

    let err = store.rewrite_substituting(a.number, None).unwrap_err();
    assert!(matches!(err, StoreError::TruncatedRecord { .. }));
    assert_eq!(fs::read(store.path()).unwrap(), before);
    assert_eq!(entries(dir.path()), 1);
}

#[test]
fn combined_rewrite_applies_all_substitutions_in_one_pass() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let (mut a, b, c) = seed(&store);

    a.balance = 0.0;
    let report = store
        .rewrite_with(&[Substitution::replace(a.clone()), Substitution::remove(c.number)])
        .unwrap();

    assert!(report.applied());
    assert_eq!(report.replaced, 1);
    assert_eq!(report.removed, 1);
    assert_eq!(scan_all(&store), vec![a, b]);
}

#[test]
fn combined_rewrite_with_missing_target_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let (mut a, _, _) = seed(&store);
    let before = fs::read(store.path()).unwrap();

    a.balance = 1_000.0;
    let report = store
        .rewrite_with(&[Substitution::replace(a), Substitution::remove(9999)])
        .unwrap();

    assert!(!report.applied());
    assert_eq!(report.missing, vec![9999]);
    assert_eq!(fs::read(store.path()).unwrap(), before);
    assert_eq!(entries(dir.path()), 1);
}
