//! Insight persistence
//!
//! Typed access to the `dynamicInsights` key. Reads never fail: a missing key
//! is an empty list and malformed content falls back to the default insights.

use crate::error::DashboardError;
use crate::store::{write_json, KeyValueStore, StorageKey};
use crate::types::{Insight, Severity, StoredInsight};
use chrono::Utc;
use tracing::{debug, error};

/// Time label attached to freshly written insights
pub const JUST_NOW: &str = "Just now";

/// Title given to user-entered notes
pub const NOTE_TITLE: &str = "Personal Note";

/// Insights shown when the stored list cannot be read
pub fn default_insights() -> Vec<StoredInsight> {
    vec![
        StoredInsight {
            id: 1,
            title: "Sleep quality improved".to_string(),
            description: "Your sleep duration and quality have improved by 15% this week."
                .to_string(),
            kind: Severity::Positive,
            time: "2h ago".to_string(),
        },
        StoredInsight {
            id: 2,
            title: "Increased stress detected".to_string(),
            description:
                "Your stress levels have increased during work hours. Consider short breaks."
                    .to_string(),
            kind: Severity::Warning,
            time: "5h ago".to_string(),
        },
        StoredInsight {
            id: 3,
            title: "Heart rate variability".to_string(),
            description: "Your HRV indicates good recovery from yesterday's workout.".to_string(),
            kind: Severity::Positive,
            time: "12h ago".to_string(),
        },
        StoredInsight {
            id: 4,
            title: "Hydration reminder".to_string(),
            description: "You've consumed only 60% of your daily water goal.".to_string(),
            kind: Severity::Negative,
            time: "1d ago".to_string(),
        },
    ]
}

/// Insight list stored under `dynamicInsights`
pub struct InsightStore<'s, S: KeyValueStore + ?Sized> {
    store: &'s mut S,
}

impl<'s, S: KeyValueStore + ?Sized> InsightStore<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    /// Load the stored insights
    pub fn load(&self) -> Vec<StoredInsight> {
        let Some(raw) = self.store.get(StorageKey::DynamicInsights) else {
            return Vec::new();
        };

        match serde_json::from_str(&raw) {
            Ok(insights) => insights,
            Err(e) => {
                error!(
                    key = %StorageKey::DynamicInsights,
                    error = %e,
                    "stored insights are malformed, using defaults"
                );
                default_insights()
            }
        }
    }

    /// Replace the stored insights
    pub fn save(&mut self, insights: &[StoredInsight]) -> Result<(), DashboardError> {
        write_json(&mut *self.store, StorageKey::DynamicInsights, insights)
    }

    /// Store a freshly derived batch, overwriting whatever was there
    pub fn save_batch(&mut self, batch: &[Insight]) -> Result<Vec<StoredInsight>, DashboardError> {
        let base = Utc::now().timestamp_millis();
        let records: Vec<StoredInsight> = batch
            .iter()
            .enumerate()
            .map(|(offset, insight)| insight.to_record(base + offset as i64, JUST_NOW))
            .collect();

        self.save(&records)?;
        debug!(count = records.len(), "stored insight batch");
        Ok(records)
    }

    /// Prepend a neutral note entered by the user
    pub fn append_user_note(&mut self, text: &str) -> Result<StoredInsight, DashboardError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DashboardError::EmptyNote);
        }

        let mut insights = self.load();
        let newest = insights.iter().map(|i| i.id).max().unwrap_or(0);
        let id = Utc::now().timestamp_millis().max(newest + 1);

        let note = StoredInsight {
            id,
            title: NOTE_TITLE.to_string(),
            description: text.to_string(),
            kind: Severity::Neutral,
            time: JUST_NOW.to_string(),
        };
        insights.insert(0, note.clone());

        self.save(&insights)?;
        Ok(note)
    }

    /// Forget every stored insight
    pub fn clear(&mut self) -> Result<(), DashboardError> {
        self.store.remove(StorageKey::DynamicInsights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Log sink for asserting on emitted events
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn sample_records() -> Vec<StoredInsight> {
        vec![
            StoredInsight {
                id: 10,
                title: "Sleep Pattern Analysis".to_string(),
                description: "Consistent schedule".to_string(),
                kind: Severity::Positive,
                time: JUST_NOW.to_string(),
            },
            StoredInsight {
                id: 11,
                title: "Blood Pressure Trends".to_string(),
                description: "Upper end of normal".to_string(),
                kind: Severity::Warning,
                time: "1d ago".to_string(),
            },
        ]
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut kv = MemoryStore::new();
        let mut store = InsightStore::new(&mut kv);

        let records = sample_records();
        store.save(&records).unwrap();
        assert_eq!(store.load(), records);
    }

    #[test]
    fn test_missing_key_is_empty() {
        let mut kv = MemoryStore::new();
        let store = InsightStore::new(&mut kv);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_malformed_content_falls_back_to_defaults() {
        let mut kv = MemoryStore::new();
        kv.set(StorageKey::DynamicInsights, "[{\"id\": ".to_string())
            .unwrap();

        let store = InsightStore::new(&mut kv);
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();

        let loaded = tracing::subscriber::with_default(subscriber, || store.load());

        assert_eq!(loaded, default_insights());
        let output = logs.contents();
        assert!(output.contains("ERROR"), "no error event in {output:?}");
        assert!(output.contains("stored insights are malformed"));
    }

    #[test]
    fn test_missing_key_logs_nothing() {
        let mut kv = MemoryStore::new();
        let store = InsightStore::new(&mut kv);
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || store.load());
        assert_eq!(logs.contents(), "");
    }

    #[test]
    fn test_append_user_note_prepends_neutral_record() {
        let mut kv = MemoryStore::new();
        let mut store = InsightStore::new(&mut kv);
        store.save(&sample_records()).unwrap();

        let note = store.append_user_note("  Felt great after the run  ").unwrap();
        assert_eq!(note.kind, Severity::Neutral);
        assert_eq!(note.time, JUST_NOW);
        assert_eq!(note.description, "Felt great after the run");

        let loaded = store.load();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0], note);
        assert!(loaded[0].id > 11);
    }

    #[test]
    fn test_note_ids_increase() {
        let mut kv = MemoryStore::new();
        let mut store = InsightStore::new(&mut kv);

        let first = store.append_user_note("one").unwrap();
        let second = store.append_user_note("two").unwrap();
        assert!(second.id > first.id);
        assert_eq!(store.load()[0].description, "two");
    }

    #[test]
    fn test_blank_note_is_rejected() {
        let mut kv = MemoryStore::new();
        let mut store = InsightStore::new(&mut kv);

        assert!(matches!(
            store.append_user_note("   "),
            Err(DashboardError::EmptyNote)
        ));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_batch_overwrites_previous_batch() {
        let mut kv = MemoryStore::new();
        let mut store = InsightStore::new(&mut kv);
        store.save(&sample_records()).unwrap();

        let batch = vec![
            Insight::new("Overall Health Score", "Fine", Severity::Positive, 0.9),
            Insight::new("Recovery Recommendation", "Rest", Severity::Neutral, 0.8),
        ];
        let records = store.save_batch(&batch).unwrap();

        let loaded = store.load();
        assert_eq!(loaded, records);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].id, loaded[0].id + 1);
        assert_eq!(loaded[0].kind, Severity::Positive);
    }
}
