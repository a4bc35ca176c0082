//! Core types for the Flora dashboard
//!
//! This module defines the data structures that flow between the upload flow,
//! the report provider, the insight deriver and the local store. Field names
//! serialize in camelCase so stored blobs keep the dashboard's JSON shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upload file types accepted by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Csv,
    Json,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Csv => "csv",
            FileType::Json => "json",
        }
    }

    /// Detect the file type from the lower-cased extension of `name`
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, extension) = name.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(FileType::Csv),
            "json" => Some(FileType::Json),
            _ => None,
        }
    }
}

/// Descriptor of an uploaded file. Contents are never read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    pub fn file_type(&self) -> Option<FileType> {
        FileType::from_file_name(&self.name)
    }
}

/// Severity tag attached to an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Positive,
    Negative,
    Neutral,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Positive => "positive",
            Severity::Negative => "negative",
            Severity::Neutral => "neutral",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A short user-facing observation about health metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    /// Confidence in the observation (0-1)
    pub confidence: f64,
}

impl Insight {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        confidence: f64,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
            confidence,
        }
    }

    /// Flatten into the record shape kept in the insight store
    pub fn to_record(&self, id: i64, time: impl Into<String>) -> StoredInsight {
        StoredInsight {
            id,
            title: self.title.clone(),
            description: self.description.clone(),
            kind: self.severity,
            time: time.into(),
        }
    }
}

/// Flattened insight as persisted under `dynamicInsights`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredInsight {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: Severity,
    /// Relative time label shown next to the insight ("Just now", "2h ago")
    pub time: String,
}

/// One heart rate reading in the daily series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    /// Wall-clock label, "HH:MM"
    pub time: String,
    /// Beats per minute
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateSummary {
    pub average: u32,
    pub min: u32,
    pub max: u32,
    pub resting: u32,
    pub measurements: Vec<HeartRateSample>,
}

/// Sleep stage durations for one night (hours)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepNight {
    pub date: String,
    pub deep: f64,
    pub light: f64,
    pub rem: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepSummary {
    /// Hours per night
    pub average_duration: f64,
    pub average_deep: f64,
    pub average_light: f64,
    #[serde(rename = "averageREM")]
    pub average_rem: f64,
    /// Percentage of time in bed spent asleep
    pub efficiency: u32,
    pub data: Vec<SleepNight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDay {
    pub date: String,
    pub steps: u32,
    /// Active minutes
    pub active: u32,
    pub calories: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub average_steps: u32,
    pub total_steps: u32,
    pub average_active_minutes: u32,
    pub calories_burned: u32,
    pub data: Vec<ActivityDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodPressureReading {
    pub date: String,
    pub systolic: u32,
    pub diastolic: u32,
    /// Reading time, "H:MM"
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodPressureSummary {
    pub average_systolic: u32,
    pub average_diastolic: u32,
    pub data: Vec<BloodPressureReading>,
}

/// File descriptor echoed into report metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub file_type: Option<FileType>,
}

impl From<&FileMeta> for FileInfo {
    fn from(file: &FileMeta) -> Self {
        Self {
            name: file.name.clone(),
            size: file.size,
            file_type: file.file_type(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub processing_date: DateTime<Utc>,
    pub file_info: Vec<FileInfo>,
    /// Number of points across all generated series
    pub data_points: usize,
    /// Overall confidence in the report (0-1)
    pub confidence_score: f64,
}

/// Complete health report as stored under `currentReport` / `latestReport`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub heart_rate: HeartRateSummary,
    pub sleep: SleepSummary,
    pub activity: ActivitySummary,
    pub blood_pressure: BloodPressureSummary,
    pub insights: Vec<Insight>,
    pub metadata: ReportMetadata,
}

/// Outcome recorded for an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadOutcome {
    Success,
    Error,
}

/// Entry in the upload history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadHistoryItem {
    pub id: String,
    pub file_name: String,
    pub file_size: u64,
    pub upload_date: DateTime<Utc>,
    pub status: UploadOutcome,
    pub file_type: FileType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_file_type_detection() {
        assert_eq!(FileType::from_file_name("report.csv"), Some(FileType::Csv));
        assert_eq!(FileType::from_file_name("Sleep.JSON"), Some(FileType::Json));
        assert_eq!(FileType::from_file_name("archive.tar.csv"), Some(FileType::Csv));
        assert_eq!(FileType::from_file_name("notes.txt"), None);
        assert_eq!(FileType::from_file_name("csv"), None);
    }

    #[test]
    fn test_stored_insight_uses_type_field() {
        let insight = Insight::new("Title", "Body", Severity::Warning, 0.9);
        let record = insight.to_record(7, "Just now");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "warning");
        assert_eq!(value["id"], 7);
        assert_eq!(value["time"], "Just now");
        assert!(value.get("confidence").is_none());
    }

    #[test]
    fn test_sleep_summary_field_names() {
        let sleep = SleepSummary {
            average_duration: 7.2,
            average_deep: 2.1,
            average_light: 4.3,
            average_rem: 1.4,
            efficiency: 87,
            data: vec![],
        };

        let value = serde_json::to_value(&sleep).unwrap();
        assert_eq!(value["averageDuration"], 7.2);
        assert_eq!(value["averageREM"], 1.4);
    }
}
