//! Pipeline orchestration
//!
//! This module provides the public API for Flora Health. It runs uploaded files
//! through a provider and writes the results to the local store.

use crate::devices::DeviceRegistry;
use crate::error::DashboardError;
use crate::history::UploadHistory;
use crate::insight_store::InsightStore;
use crate::insights::InsightDeriver;
use crate::notifications::NotificationFeed;
use crate::providers::{HealthDataProvider, MockHealthDataProvider};
use crate::settings::SettingsStore;
use crate::store::{read_json, write_json, KeyValueStore, StorageKey};
use crate::types::{FileMeta, HealthReport, Insight};
use tracing::{info, warn};

/// Generate a mock report for the given files.
///
/// # Example
/// ```
/// use flora_health::{generate_report, FileMeta};
///
/// let report = generate_report(&[FileMeta::new("report.csv", 1024)]);
/// assert_eq!(report.heart_rate.measurements.len(), 96);
/// ```
pub fn generate_report(files: &[FileMeta]) -> HealthReport {
    MockHealthDataProvider::new().generate(files)
}

/// Derive a batch of 4 to 6 insights from the file names
pub fn derive_insights(files: &[FileMeta]) -> Vec<Insight> {
    InsightDeriver::derive(files, &mut rand::thread_rng())
}

/// Stateful pipeline owning a provider and the store it writes to.
///
/// Data flow: files → provider (report and insight batch) → `currentReport`,
/// `latestReport`, `dynamicInsights` and `uploadHistory`.
pub struct ReportPipeline<P, S> {
    provider: P,
    store: S,
}

impl<S: KeyValueStore> ReportPipeline<MockHealthDataProvider, S> {
    /// Pipeline backed by the mock provider
    pub fn mock(store: S) -> Self {
        Self::new(MockHealthDataProvider::new(), store)
    }
}

impl<P: HealthDataProvider, S: KeyValueStore> ReportPipeline<P, S> {
    pub fn new(provider: P, store: S) -> Self {
        Self { provider, store }
    }

    /// Analyze the files and persist the report, the insight batch and the history.
    ///
    /// Nothing is written when the provider fails.
    pub fn process(&mut self, files: &[FileMeta]) -> Result<HealthReport, DashboardError> {
        let report = self.provider.analyze(files)?;

        write_json(&mut self.store, StorageKey::CurrentReport, &report)?;
        write_json(&mut self.store, StorageKey::LatestReport, &report)?;
        self.insights().save_batch(&report.insights)?;
        self.history()
            .record_success(files, report.metadata.processing_date)?;

        info!(
            files = files.len(),
            insights = report.insights.len(),
            "stored processed report"
        );
        Ok(report)
    }

    /// Report of the most recent upload, if any
    pub fn current_report(&self) -> Option<HealthReport> {
        self.read_report(StorageKey::CurrentReport)
    }

    /// Report shown on the dashboard, if any
    pub fn latest_report(&self) -> Option<HealthReport> {
        self.read_report(StorageKey::LatestReport)
    }

    fn read_report(&self, key: StorageKey) -> Option<HealthReport> {
        match read_json(&self.store, key) {
            Ok(report) => report,
            Err(e) => {
                warn!(key = %key, error = %e, "stored report is malformed, ignoring it");
                None
            }
        }
    }

    pub fn insights(&mut self) -> InsightStore<'_, S> {
        InsightStore::new(&mut self.store)
    }

    pub fn history(&mut self) -> UploadHistory<'_, S> {
        UploadHistory::new(&mut self.store)
    }

    pub fn devices(&mut self) -> DeviceRegistry<'_, S> {
        DeviceRegistry::new(&mut self.store)
    }

    pub fn notifications(&mut self) -> NotificationFeed<'_, S> {
        NotificationFeed::new(&mut self.store)
    }

    pub fn settings(&mut self) -> SettingsStore<'_, S> {
        SettingsStore::new(&mut self.store)
    }

    /// Remove every persisted key
    pub fn clear(&mut self) -> Result<(), DashboardError> {
        for key in StorageKey::ALL {
            self.store.remove(key)?;
        }
        info!("cleared local store");
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
