//! Health data providers
//!
//! A provider turns a batch of uploaded files into a [`HealthReport`]. The only
//! shipped implementation generates mock data; a parsing provider can be
//! swapped in without touching the upload flow or the pipeline.

mod mock;

pub use mock::MockHealthDataProvider;

use crate::error::DashboardError;
use crate::types::{FileMeta, HealthReport};

/// Trait for health data providers
pub trait HealthDataProvider {
    /// Analyze the uploaded files and produce a report
    fn analyze(&mut self, files: &[FileMeta]) -> Result<HealthReport, DashboardError>;
}
