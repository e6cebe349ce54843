//! Lead store: in-memory list persisted as a pretty-printed JSON array
//!
//! Records are kept as the JSON values read from disk, so entries edited or added by
//! hand survive every rewrite with all of their fields.

use parking_lot::Mutex;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::writer::{JsonFileWriter, PendingWrite};
use super::{read_json_file, Persisted, StorageError};
use crate::models::{Lead, LeadDraft};

#[derive(Debug, Default)]
struct LeadsState {
    records: Vec<Value>,
    next_id: u64,
}

#[derive(Debug)]
struct Inner {
    path: Option<PathBuf>,
    state: Mutex<LeadsState>,
    loaded: OnceCell<()>,
    load_count: AtomicUsize,
    writer: Option<JsonFileWriter>,
}

#[derive(Debug, Clone)]
pub struct LeadsStore {
    inner: Arc<Inner>,
}

impl LeadsStore {
    /// Creates an unloaded store. `None` keeps leads in memory only.
    pub fn new(path: Option<PathBuf>) -> Self {
        let writer = path.clone().map(JsonFileWriter::spawn);

        Self {
            inner: Arc::new(Inner {
                path,
                state: Mutex::new(LeadsState {
                    records: Vec::new(),
                    next_id: 1,
                }),
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

    pub fn path(&self) -> Option<&PathBuf> {
        self.inner.path.as_ref()
    }

    /// Loads the file once. Concurrent callers wait on the same read.
    pub async fn load_if_needed(&self) {
        self.inner
            .loaded
            .get_or_init(|| async {
                let records = self.read_from_disk().await;
                let mut state = self.inner.state.lock();
                state.next_id = next_id_after(&records);
                state.records = records;
            })
            .await;
    }

    /// Number of times the backing file has been read.
    pub fn load_count(&self) -> usize {
        self.inner.load_count.load(Ordering::SeqCst)
    }

    /// Every stored record in insertion order, exactly as persisted.
    pub async fn list(&self) -> Vec<Value> {
        self.load_if_needed().await;
        self.inner.state.lock().records.clone()
    }

    pub async fn len(&self) -> usize {
        self.load_if_needed().await;
        self.inner.state.lock().records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Assigns the next id, appends the lead and persists the whole list.
    ///
    /// The write is queued while the state lock is held, so writes reach the file in
    /// the same order as the in-memory mutations.
    pub async fn add(&self, draft: LeadDraft) -> Persisted<Lead> {
        self.load_if_needed().await;

        let (lead, pending) = {
            let mut state = self.inner.state.lock();
            let lead = draft.into_lead(state.next_id);
            state.next_id += 1;

            let pending = match serde_json::to_value(&lead) {
                Ok(record) => {
                    state.records.push(record);
                    match &self.inner.writer {
                        Some(writer) => writer.enqueue_json(&state.records),
                        None => PendingWrite::Ready(Ok(())),
                    }
                }
                Err(err) => PendingWrite::Ready(Err(StorageError::Serialize(err))),
            };
            (lead, pending)
        };

        info!("Stored lead {} ({})", lead.id, lead.request_type);
        Persisted {
            value: lead,
            write: pending.settle().await,
        }
    }

    async fn read_from_disk(&self) -> Vec<Value> {
        let Some(path) = &self.inner.path else {
            return Vec::new();
        };
        self.inner.load_count.fetch_add(1, Ordering::SeqCst);

        let value = match read_json_file(path).await {
            Ok(Some(value)) => value,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("Unable to load leads from {}: {}", path.display(), err);
                return Vec::new();
            }
        };

        let Value::Array(records) = value else {
            warn!("Leads file {} does not contain an array", path.display());
            return Vec::new();
        };

        let unrecognised = records
            .iter()
            .filter(|record| serde_json::from_value::<Lead>((*record).clone()).is_err())
            .count();
        if unrecognised > 0 {
            warn!(
                "{} lead records in {} are not in the current format; keeping them as is",
                unrecognised,
                path.display()
            );
        }

        info!("Loaded {} leads from {}", records.len(), path.display());
        records
    }
}

/// Numeric id of a stored record. Numeric strings count, as older files may hold them.
fn record_id(record: &Value) -> Option<u64> {
    let id = match record.get("id")? {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if id.is_finite() && id >= 1.0 {
        Some(id.floor() as u64)
    } else {
        None
    }
}

fn next_id_after(records: &[Value]) -> u64 {
    records.iter().filter_map(record_id).max().unwrap_or(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use futures_util::future::join_all;
    use serde_json::json;
    use tempfile::TempDir;

    fn draft(name: &str) -> LeadDraft {
        LeadDraft {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            request_type: "quote".to_string(),
            service: "office".to_string(),
            preferred_slot: "asap".to_string(),
            goal: "Apprendre les bases d'Excel".to_string(),
            created_at: Utc::now(),
        }
    }

    fn record(name: &str, id: u64) -> Value {
        serde_json::to_value(draft(name).into_lead(id)).unwrap()
    }

    fn read_file(path: &std::path::Path) -> Vec<Value> {
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_memory_store_assigns_sequential_ids() {
        let store = LeadsStore::in_memory();

        let first = store.add(draft("Ana")).await;
        let second = store.add(draft("Bob")).await;

        assert!(first.is_persisted());
        assert_eq!(first.value.id, 1);
        assert_eq!(second.value.id, 2);
        assert_eq!(store.len().await, 2);
        assert_eq!(store.load_count(), 0);
    }

    #[tokio::test]
    async fn test_add_persists_and_reopen_continues_ids() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("leads.json");

        let store = LeadsStore::open(Some(path.clone())).await;
        let lead = store.add(draft("Ana")).await;
        lead.write.unwrap();
        store.close().await;

        let on_disk = read_file(&path);
        assert_eq!(on_disk.len(), 1);
        assert_eq!(on_disk[0]["email"], "ana@example.com");

        let reopened = LeadsStore::open(Some(path.clone())).await;
        assert_eq!(reopened.list().await, on_disk);
        let next = reopened.add(draft("Bob")).await;
        assert_eq!(next.value.id, 2);
        reopened.close().await;
    }

    #[tokio::test]
    async fn test_concurrent_adds_get_contiguous_ids() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leads.json");

        let seed = vec![record("Old", 3), record("Older", 7)];
        std::fs::write(&path, serde_json::to_vec(&seed).unwrap()).unwrap();

        let store = LeadsStore::new(Some(path.clone()));
        let results = join_all((0..20).map(|i| {
            let store = store.clone();
            async move { store.add(draft(&format!("Lead{}", i))).await }
        }))
        .await;

        let mut ids: Vec<u64> = results
            .iter()
            .map(|result| {
                assert!(result.is_persisted());
                result.value.id
            })
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (8..28).collect::<Vec<u64>>());

        store.close().await;
        let on_disk = read_file(&path);
        assert_eq!(on_disk.len(), 22);
        let mut disk_ids: Vec<u64> = on_disk.iter().filter_map(record_id).collect();
        disk_ids.sort_unstable();
        let mut expected = vec![3, 7];
        expected.extend(8..28);
        assert_eq!(disk_ids, expected);
        assert_eq!(on_disk, store.list().await);
    }

    #[tokio::test]
    async fn test_load_happens_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leads.json");
        std::fs::write(&path, b"[]").unwrap();

        let store = LeadsStore::new(Some(path));
        join_all((0..5).map(|_| store.load_if_needed())).await;
        store.load_if_needed().await;

        assert_eq!(store.load_count(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leads.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = LeadsStore::open(Some(path)).await;
        assert!(store.is_empty().await);
        assert_eq!(store.add(draft("Ana")).await.value.id, 1);
        store.close().await;
    }

    #[tokio::test]
    async fn test_hand_edited_records_survive_rewrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leads.json");

        let mut annotated = record("Ana", 1);
        annotated["note"] = json!("called back");
        let manual = json!({ "id": 2, "name": "Manual", "email": "m@example.com", "goal": "Word" });
        let legacy = json!({ "id": "5", "name": "Legacy" });
        let seed = json!([annotated.clone(), manual.clone(), legacy.clone(), 12]);
        std::fs::write(&path, seed.to_string()).unwrap();

        let store = LeadsStore::open(Some(path.clone())).await;
        assert_eq!(store.len().await, 4);

        let added = store.add(draft("New")).await;
        assert!(added.is_persisted());
        assert_eq!(added.value.id, 6);
        store.close().await;

        let on_disk = read_file(&path);
        assert_eq!(on_disk.len(), 5);
        assert_eq!(on_disk[0]["note"], "called back");
        assert_eq!(on_disk[0]["createdAt"], annotated["createdAt"]);
        assert_eq!(on_disk[1], manual);
        assert_eq!(on_disk[2], legacy);
        assert_eq!(on_disk[3], json!(12));
        assert_eq!(on_disk[4]["id"], 6);
        assert_eq!(on_disk[4]["name"], "New");
    }

    #[test]
    fn test_record_id() {
        assert_eq!(record_id(&json!({ "id": 4 })), Some(4));
        assert_eq!(record_id(&json!({ "id": " 9 " })), Some(9));
        assert_eq!(record_id(&json!({ "id": 2.5 })), Some(2));
        assert_eq!(record_id(&json!({ "id": "abc" })), None);
        assert_eq!(record_id(&json!({ "id": -3 })), None);
        assert_eq!(record_id(&json!({ "name": "No id" })), None);
        assert_eq!(record_id(&json!(12)), None);
    }

    #[tokio::test]
    async fn test_write_failure_keeps_lead_in_memory() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();

        let store = LeadsStore::open(Some(blocker.join("leads.json"))).await;
        let result = store.add(draft("Ana")).await;

        assert!(result.write.is_err());
        assert_eq!(result.value.id, 1);
        assert_eq!(store.len().await, 1);
        store.close().await;
    }
}
