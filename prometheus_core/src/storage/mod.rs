//! File-backed JSON stores for leads and content overrides

pub mod leads;
pub mod overrides;
pub mod writer;

pub use leads::LeadsStore;
pub use overrides::ContentOverridesStore;
pub use writer::{JsonFileWriter, PendingWrite};

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize store contents: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("store writer is closed")]
    WriterClosed,
}

/// A mutation that was applied in memory, along with the outcome of writing it to disk.
///
/// Memory-only stores always report a successful write.
#[derive(Debug)]
#[must_use]
pub struct Persisted<T> {
    pub value: T,
    pub write: Result<(), StorageError>,
}

impl<T> Persisted<T> {
    pub fn is_persisted(&self) -> bool {
        self.write.is_ok()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Reads and parses a JSON file. A missing file is `Ok(None)`.
pub(crate) async fn read_json_file(path: &Path) -> Result<Option<Value>, StorageError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    Ok(Some(serde_json::from_slice(&bytes)?))
}
