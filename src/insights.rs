//! Insight derivation
//!
//! Two rule sets produce insights:
//! - [`InsightDeriver::derive`] matches keywords in uploaded file names and pads
//!   the batch with general and filler insights (4 to 6 entries per batch)
//! - [`metric_insights`] applies fixed thresholds to the values of a generated report

use crate::types::{FileMeta, HealthReport, Insight, Severity};
use rand::Rng;
use tracing::debug;

/// Fewest insights in a derived batch
pub const MIN_INSIGHTS: usize = 4;

/// Most insights in a derived batch
pub const MAX_INSIGHTS: usize = 6;

/// Confidence range for rule-based insights
const CONFIDENCE_RANGE: std::ops::Range<f64> = 0.70..0.98;

/// Confidence attached to insights computed from report values
const METRIC_CONFIDENCE: f64 = 0.95;

/// Keyword rule: fires when any keyword is a substring of the lower-cased file name
struct KeywordRule {
    keywords: &'static [&'static str],
    title: &'static str,
    /// Probability of the favourable reading
    favourable_odds: f64,
    favourable: (Severity, &'static str),
    unfavourable: (Severity, &'static str),
}

impl KeywordRule {
    fn matches(&self, lowered_name: &str) -> bool {
        self.keywords.iter().any(|k| lowered_name.contains(k))
    }

    fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Insight {
        let (severity, description) = if rng.gen::<f64>() < self.favourable_odds {
            self.favourable
        } else {
            self.unfavourable
        };
        Insight::new(
            self.title,
            description,
            severity,
            rng.gen_range(CONFIDENCE_RANGE),
        )
    }
}

/// Insight that does not depend on the uploaded files
struct FixedRule {
    title: &'static str,
    description: &'static str,
    severity: Severity,
}

impl FixedRule {
    fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Insight {
        Insight::new(
            self.title,
            self.description,
            self.severity,
            rng.gen_range(CONFIDENCE_RANGE),
        )
    }
}

const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &["sleep", "slp"],
        title: "Sleep Pattern Analysis",
        favourable_odds: 0.6,
        favourable: (
            Severity::Positive,
            "Your sleep schedule has been consistent, with most nights falling within the recommended 7-9 hours.",
        ),
        unfavourable: (
            Severity::Warning,
            "Your sleep timing varies considerably between nights. A regular bedtime can improve sleep quality.",
        ),
    },
    KeywordRule {
        keywords: &["heart", "hr", "ecg"],
        title: "Heart Rate Variability",
        favourable_odds: 0.7,
        favourable: (
            Severity::Positive,
            "Your heart rate variability indicates good recovery and a balanced autonomic response.",
        ),
        unfavourable: (
            Severity::Warning,
            "Your heart rate variability is lower than usual, which can signal stress or incomplete recovery.",
        ),
    },
    KeywordRule {
        keywords: &["step", "activity"],
        title: "Activity Level Assessment",
        favourable_odds: 0.5,
        favourable: (
            Severity::Positive,
            "You are meeting your daily movement goals on most days of the week.",
        ),
        unfavourable: (
            Severity::Negative,
            "Your daily activity has dropped compared with previous weeks. Short walks can help close the gap.",
        ),
    },
    KeywordRule {
        keywords: &["bp", "blood"],
        title: "Blood Pressure Trends",
        favourable_odds: 0.8,
        favourable: (
            Severity::Positive,
            "Your blood pressure readings are stable and within the normal range.",
        ),
        unfavourable: (
            Severity::Warning,
            "Some blood pressure readings are at the upper end of the normal range. Keep monitoring regularly.",
        ),
    },
];

const GENERAL_RULES: &[FixedRule] = &[
    FixedRule {
        title: "Overall Health Score",
        description: "Based on the uploaded data your overall health indicators are within a healthy range.",
        severity: Severity::Positive,
    },
    FixedRule {
        title: "Recovery Recommendation",
        description: "Schedule at least one low-intensity day this week to support recovery.",
        severity: Severity::Neutral,
    },
];

const FILLER_RULES: &[FixedRule] = &[
    FixedRule {
        title: "Hydration Reminder",
        description: "Aim for at least 2 liters of water daily to support energy and recovery.",
        severity: Severity::Neutral,
    },
    FixedRule {
        title: "Stress Management",
        description: "Short mindfulness breaks during work hours can lower daytime stress.",
        severity: Severity::Neutral,
    },
    FixedRule {
        title: "Consistency Streak",
        description: "You have been tracking your health data regularly. Keep it up.",
        severity: Severity::Positive,
    },
    FixedRule {
        title: "Data Coverage",
        description: "Uploading data from more sources will make future insights more precise.",
        severity: Severity::Neutral,
    },
];

/// Titles of the insights included in every derived batch
pub fn general_insight_titles() -> impl Iterator<Item = &'static str> {
    GENERAL_RULES.iter().map(|r| r.title)
}

/// Insight deriver for filename-keyword batches
pub struct InsightDeriver;

impl InsightDeriver {
    /// Derive a batch of 4 to 6 insights from the uploaded file names.
    ///
    /// Each keyword rule fires at most once per batch. Keyword insights come
    /// first, then the general insights, then filler insights up to the target.
    pub fn derive<R: Rng + ?Sized>(files: &[FileMeta], rng: &mut R) -> Vec<Insight> {
        let target = rng.gen_range(MIN_INSIGHTS..=MAX_INSIGHTS);

        let mut matched: Vec<usize> = Vec::new();
        for file in files {
            let lowered = file.name.to_lowercase();
            for (index, rule) in KEYWORD_RULES.iter().enumerate() {
                if rule.matches(&lowered) && !matched.contains(&index) {
                    matched.push(index);
                }
            }
        }

        debug!(
            files = files.len(),
            matched = matched.len(),
            target,
            "deriving insight batch"
        );

        let keyword_slots = target - GENERAL_RULES.len();
        let mut insights: Vec<Insight> = matched
            .into_iter()
            .take(keyword_slots)
            .map(|index| KEYWORD_RULES[index].build(rng))
            .collect();

        insights.extend(GENERAL_RULES.iter().map(|rule| rule.build(rng)));

        for rule in FILLER_RULES {
            if insights.len() >= target {
                break;
            }
            insights.push(rule.build(rng));
        }

        insights
    }
}

/// Derive insights from the values of a generated report
pub fn metric_insights(report: &HealthReport) -> Vec<Insight> {
    let mut insights = Vec::new();

    let average_hr = report.heart_rate.average;
    insights.push(if average_hr > 80 {
        Insight::new(
            "Elevated Heart Rate",
            format!("Your average heart rate of {average_hr} BPM is above the typical resting range. Consider regular cardiovascular exercise and stress management."),
            Severity::Warning,
            METRIC_CONFIDENCE,
        )
    } else if average_hr < 60 {
        Insight::new(
            "Low Heart Rate",
            format!("Your average heart rate of {average_hr} BPM is below typical. This could indicate good cardiovascular fitness or potentially require medical attention."),
            Severity::Neutral,
            METRIC_CONFIDENCE,
        )
    } else {
        Insight::new(
            "Healthy Heart Rate",
            format!("Your average heart rate of {average_hr} BPM is within the healthy range."),
            Severity::Positive,
            METRIC_CONFIDENCE,
        )
    });

    let duration = report.sleep.average_duration;
    insights.push(if duration < 7.0 {
        Insight::new(
            "Insufficient Sleep",
            format!("Your average sleep duration of {duration} hours is below the recommended 7-9 hours for adults. Consider adjusting your sleep schedule."),
            Severity::Warning,
            METRIC_CONFIDENCE,
        )
    } else {
        Insight::new(
            "Healthy Sleep Duration",
            format!("Your average sleep duration of {duration} hours meets the recommended guidelines for adults."),
            Severity::Positive,
            METRIC_CONFIDENCE,
        )
    });

    let efficiency = report.sleep.efficiency;
    if efficiency < 85 {
        insights.push(Insight::new(
            "Sleep Efficiency Concerns",
            format!("Your sleep efficiency of {efficiency}% is below optimal. Consider limiting screen time before bed and maintaining a consistent sleep schedule."),
            Severity::Warning,
            METRIC_CONFIDENCE,
        ));
    }

    let steps = report.activity.average_steps;
    insights.push(if steps < 7500 {
        Insight::new(
            "Increase Daily Steps",
            format!("Your average of {steps} steps per day is below the recommended 10,000 steps. Try to incorporate more walking into your daily routine."),
            Severity::Warning,
            METRIC_CONFIDENCE,
        )
    } else {
        Insight::new(
            "Good Activity Level",
            format!("Your average of {steps} steps per day shows you're maintaining an active lifestyle."),
            Severity::Positive,
            METRIC_CONFIDENCE,
        )
    });

    let active = report.activity.average_active_minutes;
    if active < 30 {
        insights.push(Insight::new(
            "Increase Active Minutes",
            format!("Your average of {active} active minutes per day is below the recommended 30 minutes of moderate activity."),
            Severity::Warning,
            METRIC_CONFIDENCE,
        ));
    }

    let systolic = report.blood_pressure.average_systolic;
    let diastolic = report.blood_pressure.average_diastolic;
    insights.push(if systolic > 130 || diastolic > 80 {
        Insight::new(
            "Elevated Blood Pressure",
            format!("Your average blood pressure of {systolic}/{diastolic} mmHg is above the normal range. Consider diet modifications and regular exercise."),
            Severity::Warning,
            METRIC_CONFIDENCE,
        )
    } else {
        Insight::new(
            "Healthy Blood Pressure",
            format!("Your average blood pressure of {systolic}/{diastolic} mmHg is within the normal range."),
            Severity::Positive,
            METRIC_CONFIDENCE,
        )
    });

    insights
}
