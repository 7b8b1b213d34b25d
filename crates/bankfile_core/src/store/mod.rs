//! Flat-file record store for accounts.
//!
//! # Responsibility
//! - Persist accounts as back-to-back fixed-size records in one file.
//! - Provide full scan, append and whole-file rewrite-with-substitution.
//!
//! # Invariants
//! - The data file holds only whole records; there is no header or index.
//! - The original file stays intact until a rewrite has been fully written
//!   and synced, then it is replaced by a single rename.
//! - The store assumes one exclusive user of the data file.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

mod config;
mod file_store;
pub mod record;

pub use config::{StoreConfig, DEFAULT_DATA_FILE};
pub use file_store::{RecordStore, Records, RewriteReport, Substitution};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// Open/read/write/sync/rename failure on a store file.
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    /// A rewrite was requested but the data file does not exist.
    Missing(PathBuf),
    /// The file ends with a partial record.
    TruncatedRecord { offset: u64, len: usize },
}

impl StoreError {
    pub(crate) fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { op, path, source } => {
                write!(f, "store {op} failed for `{}`: {source}", path.display())
            }
            Self::Missing(path) => write!(f, "data file `{}` does not exist", path.display()),
            Self::TruncatedRecord { offset, len } => write!(
                f,
                "truncated record at byte {offset}: {len} of {} bytes present",
                record::RECORD_LEN
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Missing(_) | Self::TruncatedRecord { .. } => None,
        }
    }
}
