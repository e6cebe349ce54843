//! Single-writer task that serialises full-file JSON rewrites.
//!
//! Every persisted store owns one `JsonFileWriter`. Jobs are processed strictly in the
//! order they were enqueued and at most one write is in flight, so a file never sees
//! interleaved writes. Each write lands in a sibling temp file that is then renamed over
//! the target.

use parking_lot::Mutex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::StorageError;

struct WriteJob {
    bytes: Vec<u8>,
    reply: oneshot::Sender<Result<(), StorageError>>,
}

/// Outcome of an enqueued write; await it with [`PendingWrite::settle`].
#[derive(Debug)]
pub enum PendingWrite {
    Ready(Result<(), StorageError>),
    Queued(oneshot::Receiver<Result<(), StorageError>>),
}

impl PendingWrite {
    pub async fn settle(self) -> Result<(), StorageError> {
        match self {
            PendingWrite::Ready(result) => result,
            PendingWrite::Queued(receiver) => {
                receiver.await.unwrap_or(Err(StorageError::WriterClosed))
            }
        }
    }
}

pub struct JsonFileWriter {
    path: PathBuf,
    sender: Mutex<Option<mpsc::UnboundedSender<WriteJob>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for JsonFileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileWriter")
            .field("path", &self.path)
            .field("open", &self.sender.lock().is_some())
            .finish()
    }
}

impl JsonFileWriter {
    /// Spawns the writer task. Must be called from within a Tokio runtime.
    pub fn spawn(path: PathBuf) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(process_queue(path.clone(), receiver));

        Self {
            path,
            sender: Mutex::new(Some(sender)),
            task: Mutex::new(Some(task)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queues a pretty-printed rewrite of the whole file.
    pub fn enqueue_json<T: Serialize + ?Sized>(&self, value: &T) -> PendingWrite {
        match serde_json::to_vec_pretty(value) {
            Ok(mut bytes) => {
                bytes.push(b'\n');
                self.enqueue(bytes)
            }
            Err(err) => PendingWrite::Ready(Err(StorageError::Serialize(err))),
        }
    }

    pub fn enqueue(&self, bytes: Vec<u8>) -> PendingWrite {
        let guard = self.sender.lock();
        let Some(sender) = guard.as_ref() else {
            return PendingWrite::Ready(Err(StorageError::WriterClosed));
        };

        let (reply, receiver) = oneshot::channel();
        match sender.send(WriteJob { bytes, reply }) {
            Ok(()) => PendingWrite::Queued(receiver),
            Err(_) => PendingWrite::Ready(Err(StorageError::WriterClosed)),
        }
    }

    /// Stops accepting writes and waits for the queued ones to settle.
    pub async fn close(&self) {
        drop(self.sender.lock().take());

        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                tracing::error!("Writer task for {} panicked: {}", self.path.display(), err);
            }
            info!("Closed JSON writer for {}", self.path.display());
        }
    }
}

async fn process_queue(path: PathBuf, mut receiver: mpsc::UnboundedReceiver<WriteJob>) {
    while let Some(job) = receiver.recv().await {
        let result = write_atomic(&path, &job.bytes).await;
        match &result {
            Ok(()) => debug!("Wrote {} bytes to {}", job.bytes.len(), path.display()),
            Err(err) => tracing::warn!("{}", err),
        }
        // The caller may have stopped waiting.
        let _ = job.reply.send(result);
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let io_error = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }

    let temp = temp_path(path);
    tokio::fs::write(&temp, bytes).await.map_err(io_error)?;
    if let Err(err) = tokio::fs::rename(&temp, path).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(io_error(err));
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data.json".to_string());
    path.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_writes_land_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("values.json");
        let writer = JsonFileWriter::spawn(path.clone());

        let pending: Vec<PendingWrite> = (0..25).map(|i| writer.enqueue_json(&vec![i])).collect();
        for write in pending {
            write.settle().await.unwrap();
        }

        let stored: Vec<i32> = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(stored, vec![24]);
        writer.close().await;
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("values.json");
        let writer = JsonFileWriter::spawn(path.clone());

        writer.enqueue_json(&serde_json::json!({"a": 1})).settle().await.unwrap();
        writer.close().await;

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["values.json".to_string()]);
    }

    #[tokio::test]
    async fn test_close_drains_then_rejects() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("values.json");
        let writer = JsonFileWriter::spawn(path.clone());

        let queued = writer.enqueue(b"[1]".to_vec());
        writer.close().await;
        queued.settle().await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"[1]");

        let late = writer.enqueue(b"[2]".to_vec());
        assert!(matches!(late.settle().await, Err(StorageError::WriterClosed)));
        assert_eq!(std::fs::read(&path).unwrap(), b"[1]");
    }

    #[tokio::test]
    async fn test_io_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let writer = JsonFileWriter::spawn(blocker.join("values.json"));
        let result = writer.enqueue(b"[]".to_vec()).settle().await;
        assert!(matches!(result, Err(StorageError::Io { .. })));

        // The queue keeps serving after a failure.
        let again = writer.enqueue(b"[]".to_vec()).settle().await;
        assert!(again.is_err());
        writer.close().await;
    }
}
