use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::storage::StoreError;

/// Header of the history CSV file
pub const HISTORY_HEADER: [&str; 7] = ["id", "slot", "caretaker", "date", "timestamp", "created_at", "owner"];

/// FileConnection manages the data directory layout and ensures files exist
///
/// ```text
/// data/
/// ├── states/
/// │   ├── 2024-01-01.yaml
/// │   └── 2024-01-02.yaml
/// └── history.csv
/// ```
#[derive(Clone, Debug)]
pub struct FileConnection {
    base_directory: PathBuf,
}

impl FileConnection {
    /// Create a new file connection rooted at `base_directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory {}", base_path.display());
        }

        let connection = Self {
            base_directory: base_path,
        };
        fs::create_dir_all(connection.states_directory())?;
        Ok(connection)
    }

    pub fn states_directory(&self) -> PathBuf {
        self.base_directory.join("states")
    }

    pub fn state_file_path(&self, date: &str) -> PathBuf {
        self.states_directory().join(format!("{}.yaml", date))
    }

    pub fn history_file_path(&self) -> PathBuf {
        self.base_directory.join("history.csv")
    }

    /// Ensure the history CSV exists with its header row
    pub fn ensure_history_file_exists(&self) -> Result<()> {
        let path = self.history_file_path();
        if !path.exists() {
            fs::write(&path, format!("{}\n", HISTORY_HEADER.join(","))).map_err(StoreError::from)?;
        }
        Ok(())
    }

    /// Write `contents` to `path` through a temp file and rename
    pub fn write_atomically(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, contents).map_err(StoreError::from)?;
        fs::rename(&temp_path, path).map_err(StoreError::from)?;
        Ok(())
    }
}
