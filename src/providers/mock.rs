//! Mock health data provider
//!
//! Generates a report from bounded random values. File contents are never read;
//! only the file names influence the result, through the insight keywords.

use crate::error::DashboardError;
use crate::insights::InsightDeriver;
use crate::types::{
    ActivityDay, ActivitySummary, BloodPressureReading, BloodPressureSummary, FileInfo, FileMeta,
    HealthReport, HeartRateSample, HeartRateSummary, ReportMetadata, SleepNight, SleepSummary,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use super::HealthDataProvider;

/// Day labels for the weekly series
pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Minutes between heart rate samples
const HEART_RATE_INTERVAL_MIN: u32 = 15;

/// Mock provider backed by a seedable RNG
pub struct MockHealthDataProvider {
    rng: StdRng,
}

impl Default for MockHealthDataProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthDataProvider {
    /// Create a provider seeded from system entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a provider with a fixed seed for reproducible reports
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn heart_rate(&mut self) -> HeartRateSummary {
        let rng = &mut self.rng;
        let average = rng.gen_range(65..80);

        HeartRateSummary {
            average,
            min: average - rng.gen_range(8..15),
            max: average + rng.gen_range(30..50),
            resting: average - rng.gen_range(3..8),
            measurements: heart_rate_series(rng),
        }
    }

    fn sleep(&mut self) -> SleepSummary {
        let rng = &mut self.rng;

        SleepSummary {
            average_duration: floor1(rng.gen_range(6.5..8.0)),
            average_deep: floor1(rng.gen_range(1.5..2.5)),
            average_light: floor1(rng.gen_range(3.5..4.5)),
            average_rem: floor1(rng.gen_range(1.0..1.8)),
            efficiency: rng.gen_range(80..95),
            data: WEEKDAYS
                .iter()
                .map(|day| {
                    let deep = rng.gen_range(1.5..2.5);
                    let light = rng.gen_range(3.5..4.5);
                    let rem = rng.gen_range(1.0..1.8);
                    SleepNight {
                        date: day.to_string(),
                        deep: round1(deep),
                        light: round1(light),
                        rem: round1(rem),
                        total: round1(deep + light + rem),
                    }
                })
                .collect(),
        }
    }

    fn activity(&mut self) -> ActivitySummary {
        let rng = &mut self.rng;
        let average_steps = rng.gen_range(7000..11000);

        ActivitySummary {
            average_steps,
            total_steps: average_steps * WEEKDAYS.len() as u32,
            average_active_minutes: rng.gen_range(45..90),
            calories_burned: rng.gen_range(1800..2500),
            data: WEEKDAYS
                .iter()
                .map(|day| {
                    let steps = rng.gen_range(5000..13000);
                    let active = rng.gen_range(30..90);
                    ActivityDay {
                        date: day.to_string(),
                        steps,
                        active,
                        calories: steps * 4 / 100 + active * 5,
                    }
                })
                .collect(),
        }
    }

    fn blood_pressure(&mut self) -> BloodPressureSummary {
        let rng = &mut self.rng;

        BloodPressureSummary {
            average_systolic: rng.gen_range(115..125),
            average_diastolic: rng.gen_range(75..80),
            data: WEEKDAYS
                .iter()
                .map(|day| BloodPressureReading {
                    date: day.to_string(),
                    systolic: rng.gen_range(115..125),
                    diastolic: rng.gen_range(75..80),
                    time: format!(
                        "{}:{}{}",
                        rng.gen_range(8..20),
                        rng.gen_range(0..6),
                        rng.gen_range(0..10)
                    ),
                })
                .collect(),
        }
    }
}

impl HealthDataProvider for MockHealthDataProvider {
    fn analyze(&mut self, files: &[FileMeta]) -> Result<HealthReport, DashboardError> {
        Ok(self.generate(files))
    }
}

impl MockHealthDataProvider {
    /// Generate a report. Never fails, even for an empty file list.
    pub fn generate(&mut self, files: &[FileMeta]) -> HealthReport {
        let heart_rate = self.heart_rate();
        let sleep = self.sleep();
        let activity = self.activity();
        let blood_pressure = self.blood_pressure();
        let insights = InsightDeriver::derive(files, &mut self.rng);

        let data_points = heart_rate.measurements.len()
            + sleep.data.len()
            + activity.data.len()
            + blood_pressure.data.len();

        let metadata = ReportMetadata {
            processing_date: Utc::now(),
            file_info: files.iter().map(FileInfo::from).collect(),
            data_points,
            confidence_score: f64::from(self.rng.gen_range(85u32..98)) / 100.0,
        };

        info!(
            files = ?files.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            data_points,
            insights = insights.len(),
            "processed uploaded files"
        );

        HealthReport {
            heart_rate,
            sleep,
            activity,
            blood_pressure,
            insights,
            metadata,
        }
    }
}

/// One sample every 15 minutes over a full day, shaped by time of day
fn heart_rate_series(rng: &mut StdRng) -> Vec<HeartRateSample> {
    let mut samples = Vec::with_capacity((24 * 60 / HEART_RATE_INTERVAL_MIN) as usize);

    for hour in 0..24 {
        for minute in (0..60).step_by(HEART_RATE_INTERVAL_MIN as usize) {
            let mut base: i32 = rng.gen_range(60..75);

            // Early morning dip, daytime rise, evening exercise peak
            if hour < 6 {
                base -= 5;
            }
            if (8..20).contains(&hour) {
                base += 10;
            }
            if (17..19).contains(&hour) {
                base += 15;
            }

            samples.push(HeartRateSample {
                time: format!("{hour:02}:{minute:02}"),
                value: base + rng.gen_range(-5..5),
            });
        }
    }

    samples
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Truncate to one decimal so half-open bounds still hold
fn floor1(value: f64) -> f64 {
    (value * 10.0).floor() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileType;
    use pretty_assertions::assert_eq;

    fn sample_files() -> Vec<FileMeta> {
        vec![
            FileMeta::new("report.csv", 1024),
            FileMeta::new("heart_rate.json", 4096),
        ]
    }

    #[test]
    fn test_metric_bounds() {
        for seed in 0..100 {
            let mut provider = MockHealthDataProvider::with_seed(seed);
            let report = provider.analyze(&sample_files()).unwrap();

            let hr = &report.heart_rate;
            assert!((65..80).contains(&hr.average));
            assert!(hr.min < hr.resting && hr.resting < hr.average && hr.average < hr.max);

            let sleep = &report.sleep;
            assert!((6.5..8.0).contains(&sleep.average_duration));
            assert!((1.5..2.5).contains(&sleep.average_deep));
            assert!((3.5..4.5).contains(&sleep.average_light));
            assert!((1.0..1.8).contains(&sleep.average_rem));
            assert!((80..95).contains(&sleep.efficiency));

            let activity = &report.activity;
            assert!((7000..11000).contains(&activity.average_steps));
            assert_eq!(activity.total_steps, activity.average_steps * 7);
            assert!((45..90).contains(&activity.average_active_minutes));
            assert!((1800..2500).contains(&activity.calories_burned));

            let bp = &report.blood_pressure;
            assert!((115..125).contains(&bp.average_systolic));
            assert!((75..80).contains(&bp.average_diastolic));

            assert!((0.85..0.98).contains(&report.metadata.confidence_score));
        }
    }

    #[test]
    fn test_confidence_score_stays_below_upper_bound() {
        for seed in 0..2000 {
            let report = MockHealthDataProvider::with_seed(seed).generate(&[]);
            let score = report.metadata.confidence_score;
            assert!((0.85..0.98).contains(&score), "seed {seed} gave {score}");
            assert!(score <= 0.97);
        }
    }

    #[test]
    fn test_series_shapes() {
        let mut provider = MockHealthDataProvider::with_seed(42);
        let report = provider.analyze(&sample_files()).unwrap();

        let measurements = &report.heart_rate.measurements;
        assert_eq!(measurements.len(), 96);
        assert_eq!(measurements[0].time, "00:00");
        assert_eq!(measurements[1].time, "00:15");
        assert_eq!(measurements[95].time, "23:45");

        let days: Vec<&str> = report.sleep.data.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(days, WEEKDAYS.to_vec());
        assert_eq!(report.activity.data.len(), 7);
        assert_eq!(report.blood_pressure.data.len(), 7);
        assert_eq!(report.metadata.data_points, 96 + 7 + 7 + 7);
    }

    #[test]
    fn test_daily_series_values() {
        let mut provider = MockHealthDataProvider::with_seed(5);
        let report = provider.analyze(&sample_files()).unwrap();

        for day in &report.activity.data {
            assert!((5000..13000).contains(&day.steps));
            assert_eq!(day.calories, day.steps * 4 / 100 + day.active * 5);
        }

        for night in &report.sleep.data {
            let sum = night.deep + night.light + night.rem;
            assert!((night.total - sum).abs() <= 0.21);
        }

        for reading in &report.blood_pressure.data {
            let (hour, minutes) = reading.time.split_once(':').unwrap();
            let hour: u32 = hour.parse().unwrap();
            assert!((8..20).contains(&hour));
            assert_eq!(minutes.len(), 2);
        }

        for sample in &report.heart_rate.measurements {
            assert!((50..104).contains(&sample.value));
        }
    }

    #[test]
    fn test_metadata_echoes_files() {
        let mut provider = MockHealthDataProvider::with_seed(7);
        let report = provider.analyze(&sample_files()).unwrap();

        let info = &report.metadata.file_info;
        assert_eq!(info.len(), 2);
        assert_eq!(info[0].name, "report.csv");
        assert_eq!(info[0].size, 1024);
        assert_eq!(info[1].file_type, Some(FileType::Json));
    }

    #[test]
    fn test_empty_file_list_succeeds() {
        let mut provider = MockHealthDataProvider::with_seed(1);
        let report = provider.analyze(&[]).unwrap();

        assert!(report.metadata.file_info.is_empty());
        assert!(report.insights.len() >= 4);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let files = sample_files();
        let a = MockHealthDataProvider::with_seed(99).analyze(&files).unwrap();
        let b = MockHealthDataProvider::with_seed(99).analyze(&files).unwrap();

        assert_eq!(a.heart_rate, b.heart_rate);
        assert_eq!(a.sleep, b.sleep);
        assert_eq!(a.insights, b.insights);
    }

    #[test]
    fn test_report_json_shape() {
        let mut provider = MockHealthDataProvider::with_seed(3);
        let report = provider.analyze(&sample_files()).unwrap();

        let value = serde_json::to_value(&report).unwrap();
        assert!(value["heartRate"]["measurements"].is_array());
        assert!(value["sleep"]["averageREM"].is_number());
        assert!(value["bloodPressure"]["averageSystolic"].is_number());
        assert!(value["metadata"]["confidenceScore"].is_number());
        assert_eq!(value["metadata"]["fileInfo"][0]["type"], "csv");
    }
}
