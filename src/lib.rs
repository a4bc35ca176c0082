//! Flora Health - data core for a personal health dashboard
//!
//! Flora turns uploaded health export files into a dashboard report through a
//! simulated pipeline: file selection → upload progress → provider analysis
//! (mock report and insight batch) → local persistence.
//!
//! ## Modules
//!
//! - **Report generation**: randomized but bounded heart rate, sleep, activity
//!   and blood pressure data ([`providers`])
//! - **Insights**: keyword-driven insight batches and the persisted insight feed
//! - **Upload flow**: explicit-time state machine driving the pipeline ([`upload`])
//! - **Local store**: typed key-value persistence in memory or in a JSON file
//! - **Notification center**: notification feed, preference switches and a
//!   canned-response health assistant

pub mod assistant;
pub mod config;
pub mod devices;
pub mod error;
pub mod history;
pub mod insight_store;
pub mod insights;
pub mod notifications;
pub mod pipeline;
pub mod providers;
pub mod routes;
pub mod settings;
pub mod store;
pub mod types;
pub mod upload;

pub use config::DashboardConfig;
pub use error::DashboardError;
pub use pipeline::{derive_insights, generate_report, ReportPipeline};
pub use providers::{HealthDataProvider, MockHealthDataProvider};
pub use store::{FileStore, KeyValueStore, MemoryStore, StorageKey};
pub use upload::{UploadEvent, UploadFlow, UploadStatus};

// Data model exports
pub use types::{FileMeta, FileType, HealthReport, Insight, Severity, StoredInsight};

/// Flora version reported by the CLI
pub const FLORA_VERSION: &str = env!("CARGO_PKG_VERSION");
