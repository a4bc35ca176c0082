//! Upload history
//!
//! Every successful upload appends one item per file under `uploadHistory`.

use crate::error::DashboardError;
use crate::store::{read_json, write_json, KeyValueStore, StorageKey};
use crate::types::{FileMeta, FileType, UploadHistoryItem, UploadOutcome};
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

/// Upload history stored under `uploadHistory`
pub struct UploadHistory<'s, S: KeyValueStore + ?Sized> {
    store: &'s mut S,
}

impl<'s, S: KeyValueStore + ?Sized> UploadHistory<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    /// All recorded uploads, oldest first. Unreadable history is treated as empty.
    pub fn list(&self) -> Vec<UploadHistoryItem> {
        match read_json(&*self.store, StorageKey::UploadHistory) {
            Ok(items) => items.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "upload history is malformed, ignoring it");
                Vec::new()
            }
        }
    }

    /// Record one successful upload per file. Files without a supported
    /// extension are skipped; they never pass upload selection.
    pub fn record_success(
        &mut self,
        files: &[FileMeta],
        uploaded_at: DateTime<Utc>,
    ) -> Result<Vec<UploadHistoryItem>, DashboardError> {
        let added: Vec<UploadHistoryItem> = files
            .iter()
            .filter_map(|file| {
                let file_type: FileType = file.file_type()?;
                Some(UploadHistoryItem {
                    id: Uuid::new_v4().to_string(),
                    file_name: file.name.clone(),
                    file_size: file.size,
                    upload_date: uploaded_at,
                    status: UploadOutcome::Success,
                    file_type,
                })
            })
            .collect();

        let mut items = self.list();
        items.extend(added.iter().cloned());
        write_json(&mut *self.store, StorageKey::UploadHistory, &items)?;

        info!(added = added.len(), total = items.len(), "recorded uploads");
        Ok(added)
    }

    /// Delete one history entry. Returns false when the id is unknown.
    pub fn remove(&mut self, id: &str) -> Result<bool, DashboardError> {
        let mut items = self.list();
        let before = items.len();
        items.retain(|item| item.id != id);

        if items.len() == before {
            return Ok(false);
        }
        write_json(&mut *self.store, StorageKey::UploadHistory, &items)?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), DashboardError> {
        self.store.remove(StorageKey::UploadHistory)
    }
}
