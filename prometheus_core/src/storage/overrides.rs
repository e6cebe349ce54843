//! Content overrides store, persisted as one JSON object

use parking_lot::RwLock;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::writer::{JsonFileWriter, PendingWrite};
use super::{read_json_file, Persisted};
use crate::models::ContentOverrides;

#[derive(Debug)]
struct Inner {
    path: Option<PathBuf>,
    overrides: RwLock<ContentOverrides>,
    loaded: OnceCell<()>,
    load_count: AtomicUsize,
    writer: Option<JsonFileWriter>,
}

#[derive(Debug, Clone)]
pub struct ContentOverridesStore {
    inner: Arc<Inner>,
}

impl ContentOverridesStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        let writer = path.clone().map(JsonFileWriter::spawn);

        Self {
            inner: Arc::new(Inner {
                path,
                overrides: RwLock::new(ContentOverrides::default()),
                loaded: OnceCell::new(),
                load_count: AtomicUsize::new(0),
                writer,
            }),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(None)
    }

    pub async fn open(path: Option<PathBuf>) -> Self {
        let store = Self::new(path);
        store.load_if_needed().await;
        store
    }

    pub async fn close(&self) {
        if let Some(writer) = &self.inner.writer {
            writer.close().await;
        }
    }

    pub async fn load_if_needed(&self) {
        self.inner
            .loaded
            .get_or_init(|| async {
                let overrides = self.read_from_disk().await;
                *self.inner.overrides.write() = overrides;
            })
            .await;
    }

    pub fn load_count(&self) -> usize {
        self.inner.load_count.load(Ordering::SeqCst)
    }

    pub async fn get(&self) -> ContentOverrides {
        self.load_if_needed().await;
        self.inner.overrides.read().clone()
    }

    /// Replaces every override with the sanitised `raw` document.
    pub async fn replace(&self, raw: &Value) -> Persisted<ContentOverrides> {
        self.load_if_needed().await;

        let next = ContentOverrides::sanitize(raw);
        let pending = {
            let mut current = self.inner.overrides.write();
            *current = next.clone();

            match &self.inner.writer {
                Some(writer) => writer.enqueue_json(&*current),
                None => PendingWrite::Ready(Ok(())),
            }
        };

        info!(
            "Content overrides replaced ({} module images)",
            next.module_images.len()
        );
        Persisted {
            value: next,
            write: pending.settle().await,
        }
    }

    async fn read_from_disk(&self) -> ContentOverrides {
        let Some(path) = &self.inner.path else {
            return ContentOverrides::default();
        };
        self.inner.load_count.fetch_add(1, Ordering::SeqCst);

        match read_json_file(path).await {
            Ok(Some(value)) => ContentOverrides::sanitize(&value),
            Ok(None) => ContentOverrides::default(),
            Err(err) => {
                warn!(
                    "Unable to load content overrides from {}: {}",
                    path.display(),
                    err
                );
                ContentOverrides::default()
            }
        }
    }
}
