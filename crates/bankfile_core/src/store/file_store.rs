//! Record store over a single data file.
//!
//! # Responsibility
//! - Stream records in storage order.
//! - Append new records without touching existing content.
//! - Cut a failed append back so no partial record stays at the tail.
//! - Rewrite the whole file through a synced temporary file and swap it in
//!   with one rename over the original path.
//!
//! # Invariants
//! - A failed rewrite never modifies the original file.
//! - Records not targeted by a rewrite are copied byte-for-byte.
//! - A rewrite whose targets are not all present is not swapped in.

use super::record::{decode_record, encode_record, record_number, RecordBytes, RECORD_LEN};
use super::{StoreConfig, StoreError, StoreResult};
use crate::model::account::{Account, AccountNumber};
use log::{debug, error, info, warn};
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

/// One target of a rewrite pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    /// Key of the record to replace or remove.
    pub number: AccountNumber,
    /// `Some` replaces the record, `None` removes it.
    pub replacement: Option<Account>,
}

impl Substitution {
    pub fn replace(account: Account) -> Self {
        Self {
            number: account.number,
            replacement: Some(account),
        }
    }

    pub fn remove(number: AccountNumber) -> Self {
        Self {
            number,
            replacement: None,
        }
    }
}

/// Outcome of a rewrite pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub replaced: usize,
    pub removed: usize,
    /// Targets with no matching record. Non-empty means nothing was swapped.
    pub missing: Vec<AccountNumber>,
}

impl RewriteReport {
    /// Whether the rewritten file replaced the original.
    pub fn applied(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Handle to the flat-file account store.
#[derive(Debug, Clone)]
pub struct RecordStore {
    config: StoreConfig,
}

impl RecordStore {
    /// Creates a handle. The data file is not touched until first use.
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn path(&self) -> &Path {
        &self.config.data_path
    }

    /// Opens a fresh pass over all records in storage order.
    ///
    /// A missing data file yields an empty sequence.
    pub fn scan(&self) -> StoreResult<Records> {
        match File::open(self.path()) {
            Ok(file) => Ok(Records::new(RawRecords::new(self.path(), file))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("event=store_scan module=store status=ok mode=empty");
                Ok(Records::new(RawRecords::empty(self.path())))
            }
            Err(err) => Err(StoreError::io("open", self.path(), err)),
        }
    }

    /// Appends one record, creating the data file when absent.
    pub fn append(&self, account: &Account) -> StoreResult<()> {
        let path = self.path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| StoreError::io("open", path, err))?;
        append_record(&mut file, &encode_record(account))
            .map_err(|(op, err)| StoreError::io(op, path, err))?;

        info!(
            "event=store_append module=store status=ok account={}",
            account.number
        );
        Ok(())
    }

    /// Replaces (`Some`) or removes (`None`) the record keyed by `number`.
    ///
    /// Returns `false` when no record matched; the original is left as-is.
    pub fn rewrite_substituting(
        &self,
        number: AccountNumber,
        replacement: Option<&Account>,
    ) -> StoreResult<bool> {
        let substitution = Substitution {
            number,
            replacement: replacement.cloned(),
        };
        let report = self.rewrite_with(std::slice::from_ref(&substitution))?;
        Ok(report.applied())
    }

    /// Applies every substitution in one pass over the data file.
    ///
    /// The new file is swapped in only if each target matched at least once.
    /// Any failure before the swap leaves the original file unchanged and
    /// discards the temporary file.
    pub fn rewrite_with(&self, substitutions: &[Substitution]) -> StoreResult<RewriteReport> {
        let started_at = Instant::now();
        let result = self.rewrite_inner(substitutions);
        match &result {
            Ok(report) if report.applied() => info!(
                "event=store_rewrite module=store status=ok replaced={} removed={} duration_ms={}",
                report.replaced,
                report.removed,
                started_at.elapsed().as_millis()
            ),
            Ok(report) => info!(
                "event=store_rewrite module=store status=skipped missing={:?} duration_ms={}",
                report.missing,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=store_rewrite module=store status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn rewrite_inner(&self, substitutions: &[Substitution]) -> StoreResult<RewriteReport> {
        let path = self.path();
        let source = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::Missing(path.to_path_buf()));
            }
            Err(err) => return Err(StoreError::io("open", path, err)),
        };

        let staging_dir = self.config.staging_dir();
        let temp = NamedTempFile::new_in(staging_dir)
            .map_err(|err| StoreError::io("create_temp", staging_dir, err))?;
        let temp_path = temp.path().to_path_buf();
        let mut writer = BufWriter::new(temp);

        let mut report = RewriteReport::default();
        let mut hits = vec![false; substitutions.len()];

        for raw in RawRecords::new(path, source) {
            let buf = raw?;
            let number = record_number(&buf);
            let target = substitutions.iter().position(|s| s.number == number);
            let bytes = match target {
                Some(index) => {
                    hits[index] = true;
                    match &substitutions[index].replacement {
                        Some(account) => {
                            report.replaced += 1;
                            Some(encode_record(account))
                        }
                        None => {
                            report.removed += 1;
                            None
                        }
                    }
                }
                None => Some(buf),
            };
            if let Some(bytes) = bytes {
                writer
                    .write_all(&bytes)
                    .map_err(|err| StoreError::io("write", &temp_path, err))?;
            }
        }

        report.missing = substitutions
            .iter()
            .zip(&hits)
            .filter(|(_, hit)| !**hit)
            .map(|(substitution, _)| substitution.number)
            .collect();
        if !report.applied() {
            return Ok(report);
        }

        let temp = writer
            .into_inner()
            .map_err(|err| StoreError::io("flush", &temp_path, err.into_error()))?;
        temp.as_file()
            .sync_all()
            .map_err(|err| StoreError::io("sync", &temp_path, err))?;
        temp.persist(path)
            .map_err(|err| StoreError::io("rename", path, err.error))?;

        Ok(report)
    }
}

/// Append destination that can be cut back to an earlier length.
trait AppendTarget: Write {
    fn current_len(&self) -> io::Result<u64>;
    fn truncate_to(&self, len: u64) -> io::Result<()>;
    fn sync(&self) -> io::Result<()>;
}

impl AppendTarget for File {
    fn current_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate_to(&self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&self) -> io::Result<()> {
        self.sync_data()
    }
}

/// Writes one record at the end of `target` and syncs it.
///
/// On a failed write or sync the target is truncated to its length before
/// the call, so the file stays a whole number of records.
fn append_record<T: AppendTarget>(
    target: &mut T,
    bytes: &RecordBytes,
) -> Result<(), (&'static str, io::Error)> {
    let original_len = target.current_len().map_err(|err| ("stat", err))?;
    let result = target
        .write_all(bytes)
        .map_err(|err| ("write", err))
        .and_then(|()| target.sync().map_err(|err| ("sync", err)));

    if result.is_err() {
        match target.truncate_to(original_len) {
            Ok(()) => warn!(
                "event=store_append module=store status=rolled_back len={original_len}"
            ),
            Err(err) => error!(
                "event=store_append module=store status=error error_code=rollback_failed error={err}"
            ),
        }
    }
    result
}

/// Lazy sequence of decoded records from one pass over the data file.
///
/// Yields at most one error, after which the sequence ends.
pub struct Records {
    raw: RawRecords,
}

impl Records {
    fn new(raw: RawRecords) -> Self {
        Self { raw }
    }
}

impl Iterator for Records {
    type Item = StoreResult<Account>;

    fn next(&mut self) -> Option<Self::Item> {
        self.raw
            .next()
            .map(|raw| raw.map(|buf| decode_record(&buf)))
    }
}

struct RawRecords {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    offset: u64,
}

impl RawRecords {
    fn new(path: &Path, file: File) -> Self {
        Self {
            path: path.to_path_buf(),
            reader: Some(BufReader::new(file)),
            offset: 0,
        }
    }

    fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            reader: None,
            offset: 0,
        }
    }
}

impl Iterator for RawRecords {
    type Item = StoreResult<RecordBytes>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        let mut buf = [0u8; RECORD_LEN];
        let item = match fill_record(reader, &mut buf) {
            Ok(RECORD_LEN) => {
                self.offset += RECORD_LEN as u64;
                return Some(Ok(buf));
            }
            Ok(0) => None,
            Ok(len) => Some(Err(StoreError::TruncatedRecord {
                offset: self.offset,
                len,
            })),
            Err(err) => Some(Err(StoreError::io("read", &self.path, err))),
        };
        // End of file or first error: release the handle and stop.
        self.reader = None;
        item
    }
}

/// Reads up to one record, returning how many bytes were filled.
fn fill_record(reader: &mut impl Read, buf: &mut RecordBytes) -> io::Result<usize> {
    let mut filled = 0;
    while filled < RECORD_LEN {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(read) => filled += read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
