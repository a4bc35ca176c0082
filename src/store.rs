//! Local key-value persistence
//!
//! The dashboard keeps all state as JSON strings under a fixed set of keys, the
//! way a browser keeps it in local storage. [`KeyValueStore`] abstracts that
//! storage so views and the pipeline never touch a concrete backend.

use crate::error::DashboardError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Keys of the persisted state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    /// Current insight batch plus user notes
    DynamicInsights,
    /// Every successful upload
    UploadHistory,
    /// Report of the most recent upload
    CurrentReport,
    /// Copy of the most recent report kept for the dashboard view
    LatestReport,
    /// Connection state of paired devices
    Devices,
    /// Notification feed
    Notifications,
    /// Grouped user preferences
    Settings,
}

impl StorageKey {
    pub const ALL: [StorageKey; 7] = [
        StorageKey::DynamicInsights,
        StorageKey::UploadHistory,
        StorageKey::CurrentReport,
        StorageKey::LatestReport,
        StorageKey::Devices,
        StorageKey::Notifications,
        StorageKey::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::DynamicInsights => "dynamicInsights",
            StorageKey::UploadHistory => "uploadHistory",
            StorageKey::CurrentReport => "currentReport",
            StorageKey::LatestReport => "latestReport",
            StorageKey::Devices => "devices",
            StorageKey::Notifications => "notifications",
            StorageKey::Settings => "settings",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle returned by [`KeyValueStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Change listener; receives the key and the new value (`None` when removed)
pub type Listener = Box<dyn FnMut(StorageKey, Option<&str>)>;

/// Trait for key-value backends
pub trait KeyValueStore {
    /// Raw JSON stored under `key`
    fn get(&self, key: StorageKey) -> Option<String>;

    /// Replace the value under `key` and notify listeners
    fn set(&mut self, key: StorageKey, value: String) -> Result<(), DashboardError>;

    /// Remove `key` and notify listeners
    fn remove(&mut self, key: StorageKey) -> Result<(), DashboardError>;

    /// Register a listener called after every successful mutation
    fn subscribe(&mut self, listener: Listener) -> SubscriptionId;

    /// Drop a listener. Returns false when the id is unknown.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

/// Deserialize the value under `key`. A missing key yields `Ok(None)`.
pub fn read_json<T, S>(store: &S, key: StorageKey) -> Result<Option<T>, DashboardError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key) {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize `value` and store it under `key`
pub fn write_json<T, S>(store: &mut S, key: StorageKey, value: &T) -> Result<(), DashboardError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, raw)
}

/// Listener bookkeeping shared by the store implementations
#[derive(Default)]
struct Subscribers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Subscribers {
    fn add(&mut self, listener: Listener) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, listener));
        id
    }

    fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, key: StorageKey, value: Option<&str>) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(key, value);
        }
    }
}

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    entries: BTreeMap<StorageKey, String>,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: StorageKey) -> Option<String> {
        self.entries.get(&key).cloned()
    }

    fn set(&mut self, key: StorageKey, value: String) -> Result<(), DashboardError> {
        self.entries.insert(key, value);
        let stored = self.entries.get(&key).map(String::as_str);
        self.subscribers.notify(key, stored);
        Ok(())
    }

    fn remove(&mut self, key: StorageKey) -> Result<(), DashboardError> {
        self.entries.remove(&key);
        self.subscribers.notify(key, None);
        Ok(())
    }

    fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        self.subscribers.add(listener)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }
}

/// Store persisted as a single JSON object file, rewritten on every mutation
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    subscribers: Subscribers,
}

impl FileStore {
    /// Open the store at `path`. A missing file starts an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DashboardError> {
        let path = path.into();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "opened file store");

        Ok(Self {
            path,
            entries,
            subscribers: Subscribers::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keys present in the file that are not part of the storage schema
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.entries
            .keys()
            .filter(|k| StorageKey::from_name(k).is_none())
            .map(String::as_str)
            .collect()
    }

    fn flush(&self) -> Result<(), DashboardError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: StorageKey) -> Option<String> {
        self.entries.get(key.as_str()).cloned()
    }

    fn set(&mut self, key: StorageKey, value: String) -> Result<(), DashboardError> {
        let previous = self.entries.insert(key.as_str().to_string(), value);
        if let Err(e) = self.flush() {
            warn!(key = %key, error = %e, "failed to persist store, rolling back");
            match previous {
                Some(old) => self.entries.insert(key.as_str().to_string(), old),
                None => self.entries.remove(key.as_str()),
            };
            return Err(e);
        }
        let stored = self.entries.get(key.as_str()).map(String::as_str);
        self.subscribers.notify(key, stored);
        Ok(())
    }

    fn remove(&mut self, key: StorageKey) -> Result<(), DashboardError> {
        if self.entries.remove(key.as_str()).is_some() {
            self.flush()?;
        }
        self.subscribers.notify(key, None);
        Ok(())
    }

    fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        self.subscribers.add(listener)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_key_names() {
        assert_eq!(StorageKey::DynamicInsights.as_str(), "dynamicInsights");
        assert_eq!(StorageKey::UploadHistory.as_str(), "uploadHistory");
        assert_eq!(StorageKey::CurrentReport.as_str(), "currentReport");
        assert_eq!(StorageKey::LatestReport.as_str(), "latestReport");
        assert_eq!(StorageKey::Notifications.as_str(), "notifications");
        assert_eq!(StorageKey::Settings.as_str(), "settings");
        assert_eq!(
            StorageKey::from_name("latestReport"),
            Some(StorageKey::LatestReport)
        );
        assert_eq!(StorageKey::from_name("theme"), None);
    }

    #[test]
    fn test_memory_store_get_set_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get(StorageKey::CurrentReport), None);

        store
            .set(StorageKey::CurrentReport, "{}".to_string())
            .unwrap();
        assert_eq!(store.get(StorageKey::CurrentReport), Some("{}".to_string()));

        store.remove(StorageKey::CurrentReport).unwrap();
        assert_eq!(store.get(StorageKey::CurrentReport), None);
    }

    #[test]
    fn test_subscribers_see_mutations() {
        let mut store = MemoryStore::new();
        let seen: Rc<RefCell<Vec<(StorageKey, Option<String>)>>> = Rc::default();

        let sink = Rc::clone(&seen);
        let id = store.subscribe(Box::new(move |key: StorageKey, value: Option<&str>| {
            sink.borrow_mut().push((key, value.map(str::to_string)));
        }));

        store.set(StorageKey::Devices, "[]".to_string()).unwrap();
        store.remove(StorageKey::Devices).unwrap();
        assert!(store.unsubscribe(id));
        store.set(StorageKey::Devices, "[1]".to_string()).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                (StorageKey::Devices, Some("[]".to_string())),
                (StorageKey::Devices, None),
            ]
        );
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn test_typed_helpers() {
        let mut store = MemoryStore::new();
        write_json(&mut store, StorageKey::UploadHistory, &vec![1, 2, 3]).unwrap();

        let back: Option<Vec<i32>> = read_json(&store, StorageKey::UploadHistory).unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));

        let missing: Option<Vec<i32>> = read_json(&store, StorageKey::LatestReport).unwrap();
        assert_eq!(missing, None);

        store
            .set(StorageKey::LatestReport, "not json".to_string())
            .unwrap();
        let malformed: Result<Option<Vec<i32>>, _> = read_json(&store, StorageKey::LatestReport);
        assert!(malformed.is_err());
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("store.json");

        {
            let mut store = FileStore::open(&path).unwrap();
            store
                .set(StorageKey::DynamicInsights, "[]".to_string())
                .unwrap();
            store
                .set(StorageKey::CurrentReport, "{\"a\":1}".to_string())
                .unwrap();
            store.remove(StorageKey::CurrentReport).unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(StorageKey::DynamicInsights),
            Some("[]".to_string())
        );
        assert_eq!(reopened.get(StorageKey::CurrentReport), None);
    }

    #[test]
    fn test_file_store_reports_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{"dynamicInsights":"[]","theme":"\"dark\""}"#).unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.unknown_keys(), vec!["theme"]);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(DashboardError::JsonError(_))
        ));
    }
}
