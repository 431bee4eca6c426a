//! Vendor payload adapter
//!
//! Parses the vendor's v2 API payload pages and maps them to validated
//! domain records. Field presence and sign are checked exactly once here;
//! downstream components consume the concrete types without re-guessing.

use crate::error::SnapshotError;
use crate::types::{DailyReadinessScore, DailySleepScore, SleepEpisode};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;

/// A single response page: a data array plus an opaque pagination token.
/// Pagination itself is the fetch collaborator's concern; the adapter only
/// decodes one page at a time.
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[allow(dead_code)]
    next_token: Option<String>,
}

/// Parse a sleep episode page into validated episodes.
pub fn parse_sleep_page(raw_json: &str) -> Result<Vec<SleepEpisode>, SnapshotError> {
    let page: Page<RawSleepEpisode> = serde_json::from_str(raw_json)?;
    page.data.into_iter().map(validate_episode).collect()
}

/// Parse a daily sleep score page.
pub fn parse_daily_sleep_page(raw_json: &str) -> Result<Vec<DailySleepScore>, SnapshotError> {
    let page: Page<DailySleepScore> = serde_json::from_str(raw_json)?;
    Ok(page.data)
}

/// Parse a daily readiness score page.
pub fn parse_readiness_page(raw_json: &str) -> Result<Vec<DailyReadinessScore>, SnapshotError> {
    let page: Page<DailyReadinessScore> = serde_json::from_str(raw_json)?;
    Ok(page.data)
}

/// Wire shape of one sleep episode. Everything optional at this layer;
/// requiredness is enforced by [`validate_episode`] so that a missing
/// field names itself instead of surfacing as a serde position error.
#[derive(Debug, Deserialize)]
struct RawSleepEpisode {
    id: Option<String>,
    day: Option<NaiveDate>,
    #[serde(rename = "type")]
    kind: Option<String>,
    bedtime_start: Option<DateTime<FixedOffset>>,
    bedtime_end: Option<DateTime<FixedOffset>>,
    total_sleep_duration: Option<i64>,
    rem_sleep_duration: Option<i64>,
    deep_sleep_duration: Option<i64>,
    time_in_bed: Option<i64>,
    efficiency: Option<i64>,
    latency: Option<i64>,
    average_heart_rate: Option<f64>,
    lowest_heart_rate: Option<i64>,
    average_hrv: Option<i64>,
    sleep_phase_5_min: Option<String>,
}

fn validate_episode(raw: RawSleepEpisode) -> Result<SleepEpisode, SnapshotError> {
    let id = raw.id.ok_or(SnapshotError::MissingField("id"))?;
    let day = raw.day.ok_or(SnapshotError::MissingField("day"))?;
    let bedtime_start = raw
        .bedtime_start
        .ok_or(SnapshotError::MissingField("bedtime_start"))?;
    let bedtime_end = raw
        .bedtime_end
        .ok_or(SnapshotError::MissingField("bedtime_end"))?;

    if bedtime_end < bedtime_start {
        return Err(SnapshotError::Parse(format!(
            "episode {id}: bedtime_end {bedtime_end} precedes bedtime_start {bedtime_start}"
        )));
    }

    let total_sleep_duration = require_seconds(&id, "total_sleep_duration", raw.total_sleep_duration)?;
    let rem_sleep_duration = require_seconds(&id, "rem_sleep_duration", raw.rem_sleep_duration)?;
    let deep_sleep_duration = require_seconds(&id, "deep_sleep_duration", raw.deep_sleep_duration)?;
    let time_in_bed = require_seconds(&id, "time_in_bed", raw.time_in_bed)?;
    let efficiency = require_seconds(&id, "efficiency", raw.efficiency)?;

    let latency = match raw.latency {
        Some(l) if l < 0 => {
            return Err(SnapshotError::Parse(format!(
                "episode {id}: negative latency {l}"
            )))
        }
        other => other,
    };

    Ok(SleepEpisode {
        id,
        day,
        kind: raw.kind,
        bedtime_start,
        bedtime_end,
        total_sleep_duration,
        rem_sleep_duration,
        deep_sleep_duration,
        time_in_bed,
        efficiency,
        latency,
        average_heart_rate: raw.average_heart_rate,
        lowest_heart_rate: raw.lowest_heart_rate,
        average_hrv: raw.average_hrv,
        sleep_phase_5_min: raw.sleep_phase_5_min,
    })
}

/// Durations and percentages are required and must never be negative:
/// an implied negative duration is a data bug and must surface as a
/// failure, not be clamped to zero.
fn require_seconds(
    id: &str,
    field: &'static str,
    value: Option<i64>,
) -> Result<i64, SnapshotError> {
    match value {
        Some(v) if v < 0 => Err(SnapshotError::Parse(format!(
            "episode {id}: negative {field} {v}"
        ))),
        Some(v) => Ok(v),
        None => Err(SnapshotError::MissingField(field)),
    }
}
