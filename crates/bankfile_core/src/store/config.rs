use std::path::{Path, PathBuf};

/// Data file used when no path is configured.
pub const DEFAULT_DATA_FILE: &str = "accounts.dat";

/// Location of the backing data file.
///
/// Rewrites stage their temporary file next to `data_path`, so the final
/// rename never crosses a filesystem boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_path: PathBuf,
}

impl StoreConfig {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
        }
    }

    /// Directory that receives temporary rewrite files.
    pub(crate) fn staging_dir(&self) -> &Path {
        match self.data_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_FILE)
    }
}
