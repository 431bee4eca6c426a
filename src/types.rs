//! Core types for the Nocturne pipeline
//!
//! This module defines the data structures that flow through snapshot
//! construction: validated vendor records, the decoded stage timeline, and
//! the final immutable day snapshot.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single validated sleep episode as reported by the vendor.
///
/// Field presence and sign are checked once at parse time
/// (see [`crate::adapter`]); downstream components never re-validate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepEpisode {
    /// Vendor-assigned episode identifier
    pub id: String,
    /// Calendar day the vendor attributes this episode to
    pub day: NaiveDate,
    /// Vendor episode type label ("long_sleep", "sleep", "late_nap", ...)
    pub kind: Option<String>,
    /// When the user got into bed (offset-carrying local instant)
    pub bedtime_start: DateTime<FixedOffset>,
    /// When the user got out of bed
    pub bedtime_end: DateTime<FixedOffset>,
    /// Total time asleep (seconds)
    pub total_sleep_duration: i64,
    /// REM sleep (seconds)
    pub rem_sleep_duration: i64,
    /// Deep sleep (seconds)
    pub deep_sleep_duration: i64,
    /// Total time in bed (seconds)
    pub time_in_bed: i64,
    /// Sleep efficiency (percent)
    pub efficiency: i64,
    /// Time to fall asleep (seconds)
    pub latency: Option<i64>,
    /// Average heart rate during the episode (bpm)
    pub average_heart_rate: Option<f64>,
    /// Lowest heart rate during the episode (bpm)
    pub lowest_heart_rate: Option<i64>,
    /// Average heart rate variability (ms)
    pub average_hrv: Option<i64>,
    /// Stage-code string, one character per 5-minute bucket
    pub sleep_phase_5_min: Option<String>,
}

impl SleepEpisode {
    /// Local calendar date the episode started on, in the episode's own
    /// UTC offset. Drives midnight-crossing detection.
    pub fn start_date(&self) -> NaiveDate {
        self.bedtime_start.date_naive()
    }
}

/// Contributor subscores of the daily sleep score document.
///
/// The vendor may omit or null individual contributors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SleepScoreContributors {
    pub deep_sleep: Option<i64>,
    pub efficiency: Option<i64>,
    pub latency: Option<i64>,
    pub rem_sleep: Option<i64>,
    pub restfulness: Option<i64>,
    pub timing: Option<i64>,
    pub total_sleep: Option<i64>,
}

/// Daily sleep score summary document. Scores are 0-100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySleepScore {
    pub id: String,
    pub day: NaiveDate,
    pub score: Option<i64>,
    #[serde(default)]
    pub contributors: SleepScoreContributors,
    pub timestamp: Option<String>,
}

/// Contributor subscores of the daily readiness score document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadinessContributors {
    pub activity_balance: Option<i64>,
    pub body_temperature: Option<i64>,
    pub hrv_balance: Option<i64>,
    pub previous_day_activity: Option<i64>,
    pub previous_night: Option<i64>,
    pub recovery_index: Option<i64>,
    pub resting_heart_rate: Option<i64>,
    pub sleep_balance: Option<i64>,
    pub sleep_regularity: Option<i64>,
}

/// Daily readiness score document. Score-oriented summary, not raw
/// physiological data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReadinessScore {
    pub id: String,
    pub day: NaiveDate,
    pub score: Option<i64>,
    pub temperature_deviation: Option<f64>,
    pub temperature_trend_deviation: Option<f64>,
    #[serde(default)]
    pub contributors: ReadinessContributors,
    pub timestamp: Option<String>,
}

/// Sleep stage classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepStage {
    Awake,
    Light,
    Deep,
    Rem,
}

/// Signal the timeline was decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineSource {
    #[serde(rename = "sleep_phase_5_min")]
    SleepPhase5Min,
}

/// One contiguous run of a single sleep stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepStageSegment {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub stage: SleepStage,
}

impl SleepStageSegment {
    pub fn duration_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }
}

/// Decoded stage timeline: ordered, non-overlapping, contiguous segments
/// at a fixed 300-second resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepStageTimeline {
    pub source: TimelineSource,
    pub resolution_seconds: i64,
    pub segments: Vec<SleepStageSegment>,
}

/// A qualifying non-core sleep episode (typically a nap) reduced to its
/// window and duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplementalEpisode {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub duration_seconds: i64,
}

/// The finished immutable per-day aggregate: one coherent night's sleep
/// story plus supplemental sleep, stage timeline, and daily scores.
///
/// Consumers must not re-derive any of these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepDaySnapshot {
    pub day: NaiveDate,
    /// Core sleep window
    pub night_start: DateTime<FixedOffset>,
    pub night_end: DateTime<FixedOffset>,

    // --- Core sleep ---
    pub core_sleep_seconds: i64,
    pub time_in_bed_seconds: i64,
    pub efficiency_pct: i64,
    pub latency_seconds: Option<i64>,
    pub rem_seconds: i64,
    pub deep_seconds: i64,
    pub rem_pct: Option<i64>,
    pub deep_pct: Option<i64>,

    // --- Physiology ---
    pub avg_hr: Option<f64>,
    pub min_hr: Option<i64>,
    pub avg_hrv: Option<i64>,

    // --- Supplemental ---
    pub supplemental_sleep_seconds: i64,
    pub total_sleep_24h_seconds: i64,

    // --- Scores ---
    pub sleep_score: Option<i64>,
    pub readiness_score: Option<i64>,
    pub timing_score: Option<i64>,

    // --- Observational timeline ---
    pub timeline: Option<SleepStageTimeline>,
    pub supplemental_episodes: Vec<SupplementalEpisode>,
}
