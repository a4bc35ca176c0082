//! Simulated upload flow
//!
//! State machine: idle → uploading → processing → success | error.
//!
//! Nothing runs on a timer. The caller advances time explicitly with
//! [`UploadFlow::advance`], or drives the whole flow with
//! [`UploadFlow::run_to_completion`]; every observable change comes back as an
//! [`UploadEvent`].

use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::pipeline::ReportPipeline;
use crate::providers::HealthDataProvider;
use crate::routes::Route;
use crate::store::KeyValueStore;
use crate::types::{FileMeta, HealthReport};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Idle,
    Uploading,
    Processing,
    Success,
    Error,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Idle => "idle",
            UploadStatus::Uploading => "uploading",
            UploadStatus::Processing => "processing",
            UploadStatus::Success => "success",
            UploadStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStatus::Success | UploadStatus::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Destructive,
}

/// Toast-style message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub level: NoticeLevel,
}

impl Notice {
    fn info(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            level: NoticeLevel::Info,
        }
    }

    fn destructive(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            level: NoticeLevel::Destructive,
        }
    }

    /// Shown when an upload is started with nothing selected
    pub fn no_files_selected() -> Self {
        Self::destructive(
            "No files selected",
            "Please select at least one file to upload.",
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum UploadEvent {
    Progress(u8),
    Status(UploadStatus),
    Notice(Notice),
    Navigate(String),
}

/// Result of a file selection
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub accepted: Vec<FileMeta>,
    pub rejected: Vec<FileMeta>,
    /// Warning shown when any file was dropped
    pub notice: Option<Notice>,
}

/// Upload flow over a report pipeline
pub struct UploadFlow<P, S> {
    pipeline: ReportPipeline<P, S>,
    config: DashboardConfig,
    files: Vec<FileMeta>,
    status: UploadStatus,
    progress: u8,
    /// Time spent in the current phase
    elapsed: Duration,
    navigated: bool,
    report: Option<HealthReport>,
    last_error: Option<String>,
}

impl<P: HealthDataProvider, S: KeyValueStore> UploadFlow<P, S> {
    /// Create an idle flow. Fails when the timing configuration is invalid.
    pub fn new(
        pipeline: ReportPipeline<P, S>,
        config: DashboardConfig,
    ) -> Result<Self, DashboardError> {
        config.validate()?;
        Ok(Self {
            pipeline,
            config,
            files: Vec::new(),
            status: UploadStatus::Idle,
            progress: 0,
            elapsed: Duration::ZERO,
            navigated: false,
            report: None,
            last_error: None,
        })
    }

    /// Replace the selection, keeping only csv and json files
    pub fn select(&mut self, files: Vec<FileMeta>) -> Result<Selection, DashboardError> {
        self.require(UploadStatus::Idle, "select files")?;

        let (accepted, rejected): (Vec<FileMeta>, Vec<FileMeta>) = files
            .into_iter()
            .partition(|file| file.file_type().is_some());

        let notice = if rejected.is_empty() {
            None
        } else {
            warn!(
                rejected = ?rejected.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
                "dropped unsupported files"
            );
            Some(Notice::destructive(
                "Invalid file format",
                "Only CSV and JSON files are supported.",
            ))
        };

        self.files = accepted.clone();
        Ok(Selection {
            accepted,
            rejected,
            notice,
        })
    }

    /// Drop one selected file before the upload starts
    pub fn remove_file(&mut self, index: usize) -> Option<FileMeta> {
        if self.status != UploadStatus::Idle || index >= self.files.len() {
            return None;
        }
        Some(self.files.remove(index))
    }

    /// Begin uploading the selected files
    pub fn start(&mut self) -> Result<Vec<UploadEvent>, DashboardError> {
        self.require(UploadStatus::Idle, "start an upload")?;
        if self.files.is_empty() {
            return Err(DashboardError::NoFilesSelected);
        }

        info!(files = self.files.len(), "upload started");
        self.progress = 0;
        self.elapsed = Duration::ZERO;
        Ok(vec![self.transition(UploadStatus::Uploading)])
    }

    /// Advance simulated time by `dt`
    pub fn advance(&mut self, dt: Duration) -> Vec<UploadEvent> {
        let mut events = Vec::new();
        let mut left = dt;

        loop {
            let phase = match self.status {
                UploadStatus::Uploading => self.config.tick_interval(),
                UploadStatus::Processing => self.config.processing_delay(),
                UploadStatus::Success if !self.navigated => self.config.redirect_delay(),
                _ => break,
            };

            let remaining = phase.saturating_sub(self.elapsed);
            if left < remaining {
                self.elapsed += left;
                break;
            }
            left -= remaining;
            self.elapsed = Duration::ZERO;

            match self.status {
                UploadStatus::Uploading => self.step_progress(&mut events),
                UploadStatus::Processing => self.finish_processing(&mut events),
                UploadStatus::Success => {
                    self.navigated = true;
                    events.push(UploadEvent::Navigate(Route::Dashboard.path().to_string()));
                }
                _ => break,
            }
        }

        events
    }

    /// Start if needed and advance until the flow settles
    pub fn run_to_completion(&mut self) -> Result<Vec<UploadEvent>, DashboardError> {
        let mut events = Vec::new();
        if self.status == UploadStatus::Idle {
            events.extend(self.start()?);
        }

        let tick = self.config.tick_interval();
        while !self.is_settled() {
            events.extend(self.advance(tick));
        }
        Ok(events)
    }

    /// Return to idle after a finished upload
    pub fn reset(&mut self) -> Result<(), DashboardError> {
        if !self.status.is_terminal() {
            return Err(self.invalid("reset"));
        }
        self.files.clear();
        self.progress = 0;
        self.elapsed = Duration::ZERO;
        self.navigated = false;
        self.last_error = None;
        self.status = UploadStatus::Idle;
        Ok(())
    }

    /// True once nothing further will happen without caller input
    pub fn is_settled(&self) -> bool {
        match self.status {
            UploadStatus::Idle | UploadStatus::Error => true,
            UploadStatus::Success => self.navigated,
            UploadStatus::Uploading | UploadStatus::Processing => false,
        }
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn files(&self) -> &[FileMeta] {
        &self.files
    }

    /// Report produced by the last successful upload
    pub fn report(&self) -> Option<&HealthReport> {
        self.report.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn pipeline(&self) -> &ReportPipeline<P, S> {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut ReportPipeline<P, S> {
        &mut self.pipeline
    }

    pub fn into_pipeline(self) -> ReportPipeline<P, S> {
        self.pipeline
    }

    fn step_progress(&mut self, events: &mut Vec<UploadEvent>) {
        self.progress = self
            .progress
            .saturating_add(self.config.progress_step)
            .min(100);
        events.push(UploadEvent::Progress(self.progress));

        if self.progress == 100 {
            events.push(self.transition(UploadStatus::Processing));
        }
    }

    fn finish_processing(&mut self, events: &mut Vec<UploadEvent>) {
        // TODO: record per-file failures as UploadOutcome::Error history entries
        // once a provider that parses file contents can reject individual files.
        match self.pipeline.process(&self.files) {
            Ok(report) => {
                let count = self.files.len();
                let plural = if count > 1 { "s" } else { "" };
                self.report = Some(report);
                events.push(self.transition(UploadStatus::Success));
                events.push(UploadEvent::Notice(Notice::info(
                    "Upload successful",
                    format!("{count} file{plural} processed successfully."),
                )));
            }
            Err(e) => {
                error!(error = %e, "processing uploaded files failed");
                self.last_error = Some(e.to_string());
                events.push(self.transition(UploadStatus::Error));
                events.push(UploadEvent::Notice(Notice::destructive(
                    "Processing error",
                    "An error occurred while processing your files.",
                )));
            }
        }
    }

    fn transition(&mut self, next: UploadStatus) -> UploadEvent {
        debug!(from = self.status.as_str(), to = next.as_str(), "upload status");
        self.status = next;
        UploadEvent::Status(next)
    }

    fn require(&self, expected: UploadStatus, action: &'static str) -> Result<(), DashboardError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> DashboardError {
        DashboardError::InvalidTransition {
            action,
            state: self.status.as_str(),
        }
    }
}
