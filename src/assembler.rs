//! Snapshot assembly
//!
//! Orchestrates core selection, supplemental selection, and timeline
//! decoding into one validated, immutable day snapshot. Assembly is
//! synchronous and pure: identical inputs always produce an identical
//! snapshot, and every fatal condition surfaces as an error instead of a
//! silently degraded result.

use crate::config::SnapshotConfig;
use crate::error::SnapshotError;
use crate::selector::select_core_sleep;
use crate::supplemental::select_supplemental;
use crate::timeline::{build_stage_timeline, STAGE_RESOLUTION_SECONDS};
use crate::types::{
    DailyReadinessScore, DailySleepScore, SleepDaySnapshot, SleepEpisode, SleepStageTimeline,
};
use chrono::NaiveDate;

/// Build the sleep day snapshot for `target_day`.
///
/// The caller guarantees score document cardinality: exactly one daily
/// sleep score and one readiness score for the target day (the provider
/// enforces this before delegating here).
pub fn assemble_sleep_day(
    config: &SnapshotConfig,
    target_day: NaiveDate,
    episodes: &[SleepEpisode],
    daily_sleep: &DailySleepScore,
    readiness: &DailyReadinessScore,
) -> Result<SleepDaySnapshot, SnapshotError> {
    // Stage 1: pick the one authoritative overnight episode.
    let core = select_core_sleep(episodes, target_day)?;

    // Stage 2: supplemental selection and timeline decoding, both pure
    // and independent of each other.
    let (supplemental_episodes, supplemental_seconds) =
        select_supplemental(episodes, core, config);
    let timeline = build_stage_timeline(core);

    // Stage 3: cross-check the decoded timeline against the episode's
    // authoritative end before trusting either.
    if let Some(tl) = &timeline {
        check_timeline_end(tl, core)?;
    }

    let rem_pct = percentage(core.rem_sleep_duration, core.total_sleep_duration);
    let deep_pct = percentage(core.deep_sleep_duration, core.total_sleep_duration);

    let total_sleep_24h_seconds = core.total_sleep_duration + supplemental_seconds;

    Ok(SleepDaySnapshot {
        day: target_day,
        night_start: core.bedtime_start,
        night_end: core.bedtime_end,
        core_sleep_seconds: core.total_sleep_duration,
        time_in_bed_seconds: core.time_in_bed,
        efficiency_pct: core.efficiency,
        latency_seconds: core.latency,
        rem_seconds: core.rem_sleep_duration,
        deep_seconds: core.deep_sleep_duration,
        rem_pct,
        deep_pct,
        avg_hr: core.average_heart_rate,
        min_hr: core.lowest_heart_rate,
        avg_hrv: core.average_hrv,
        supplemental_sleep_seconds: supplemental_seconds,
        total_sleep_24h_seconds,
        sleep_score: daily_sleep.score,
        readiness_score: readiness.score,
        timing_score: daily_sleep.contributors.timing,
        timeline,
        supplemental_episodes,
    })
}

/// Nearest-integer percentage of `part` in `total`, computed only when
/// the denominator is positive. Ties round away from zero, so 12.5%
/// becomes 13.
fn percentage(part: i64, total: i64) -> Option<i64> {
    if total > 0 {
        Some((100.0 * part as f64 / total as f64).round() as i64)
    } else {
        None
    }
}

/// The synthesized timeline end must land within one bucket at or after
/// the episode's authoritative bedtime_end. Anything else is an upstream
/// data or selection defect and is never clamped or corrected here.
fn check_timeline_end(
    timeline: &SleepStageTimeline,
    core: &SleepEpisode,
) -> Result<(), SnapshotError> {
    let Some(last) = timeline.segments.last() else {
        return Ok(());
    };

    let delta_seconds = (last.end - core.bedtime_end).num_seconds();
    if !(0..STAGE_RESOLUTION_SECONDS).contains(&delta_seconds) {
        return Err(SnapshotError::TimelineInconsistency { delta_seconds });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};
    use pretty_assertions::assert_eq;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn make_episode(
        id: &str,
        tagged_day: &str,
        start: &str,
        end: &str,
        total_sleep: i64,
    ) -> SleepEpisode {
        SleepEpisode {
            id: id.to_string(),
            day: day(tagged_day),
            kind: Some("long_sleep".to_string()),
            bedtime_start: at(start),
            bedtime_end: at(end),
            total_sleep_duration: total_sleep,
            rem_sleep_duration: 7200,
            deep_sleep_duration: 4900,
            time_in_bed: total_sleep + 1800,
            efficiency: 94,
            latency: Some(480),
            average_heart_rate: Some(55.2),
            lowest_heart_rate: Some(47),
            average_hrv: Some(61),
            sleep_phase_5_min: None,
        }
    }

    fn make_scores(target_day: &str) -> (DailySleepScore, DailyReadinessScore) {
        let daily_sleep = DailySleepScore {
            id: "ds-1".to_string(),
            day: day(target_day),
            score: Some(82),
            contributors: crate::types::SleepScoreContributors {
                timing: Some(94),
                ..Default::default()
            },
            timestamp: None,
        };
        let readiness = DailyReadinessScore {
            id: "dr-1".to_string(),
            day: day(target_day),
            score: Some(77),
            temperature_deviation: None,
            temperature_trend_deviation: None,
            contributors: Default::default(),
            timestamp: None,
        };
        (daily_sleep, readiness)
    }

    #[test]
    fn core_plus_nap_yields_24h_total() {
        let core = make_episode(
            "core",
            "2024-01-15",
            "2024-01-14T22:00:00+00:00",
            "2024-01-15T06:00:00+00:00",
            28800,
        );
        let mut nap = make_episode(
            "nap",
            "2024-01-15",
            "2024-01-15T13:00:00+00:00",
            "2024-01-15T13:30:00+00:00",
            1800,
        );
        nap.kind = Some("late_nap".to_string());

        let (daily_sleep, readiness) = make_scores("2024-01-15");
        let snapshot = assemble_sleep_day(
            &SnapshotConfig::default(),
            day("2024-01-15"),
            &[core, nap],
            &daily_sleep,
            &readiness,
        )
        .unwrap();

        assert_eq!(snapshot.core_sleep_seconds, 28800);
        assert_eq!(snapshot.supplemental_sleep_seconds, 1800);
        assert_eq!(snapshot.total_sleep_24h_seconds, 30600);
        assert_eq!(snapshot.supplemental_episodes.len(), 1);
        assert_eq!(
            snapshot.supplemental_episodes[0].start,
            at("2024-01-15T13:00:00+00:00")
        );
        assert_eq!(snapshot.night_start, at("2024-01-14T22:00:00+00:00"));
        assert_eq!(snapshot.sleep_score, Some(82));
        assert_eq!(snapshot.readiness_score, Some(77));
        assert_eq!(snapshot.timing_score, Some(94));
        // 7200 / 28800 = 25%, 4900 / 28800 = 17.01% -> 17
        assert_eq!(snapshot.rem_pct, Some(25));
        assert_eq!(snapshot.deep_pct, Some(17));
    }

    #[test]
    fn percentage_ties_round_away_from_zero() {
        assert_eq!(percentage(125, 1000), Some(13)); // 12.5 -> 13
        assert_eq!(percentage(120, 1000), Some(12));
        assert_eq!(percentage(0, 1000), Some(0));
        assert_eq!(percentage(125, 0), None);
    }

    #[test]
    fn zero_core_duration_yields_no_percentages() {
        let mut core = make_episode(
            "core",
            "2024-01-15",
            "2024-01-14T22:00:00+00:00",
            "2024-01-15T06:00:00+00:00",
            0,
        );
        core.rem_sleep_duration = 0;
        core.deep_sleep_duration = 0;

        let (daily_sleep, readiness) = make_scores("2024-01-15");
        let snapshot = assemble_sleep_day(
            &SnapshotConfig::default(),
            day("2024-01-15"),
            &[core],
            &daily_sleep,
            &readiness,
        )
        .unwrap();

        assert_eq!(snapshot.rem_pct, None);
        assert_eq!(snapshot.deep_pct, None);
    }

    #[test]
    fn timeline_within_one_bucket_of_bedtime_end_is_accepted() {
        // 96 buckets from 22:00 synthesize an end of 06:00:00; the episode
        // reports 05:55:30, so delta = 270s.
        let mut core = make_episode(
            "core",
            "2024-01-15",
            "2024-01-14T22:00:00+00:00",
            "2024-01-15T05:55:30+00:00",
            28800,
        );
        core.sleep_phase_5_min = Some("1".repeat(96));

        let (daily_sleep, readiness) = make_scores("2024-01-15");
        let snapshot = assemble_sleep_day(
            &SnapshotConfig::default(),
            day("2024-01-15"),
            &[core],
            &daily_sleep,
            &readiness,
        )
        .unwrap();

        let timeline = snapshot.timeline.unwrap();
        assert_eq!(
            timeline.segments.last().unwrap().end,
            at("2024-01-15T06:00:00+00:00")
        );
    }

    #[test]
    fn timeline_past_tolerance_is_an_inconsistency() {
        // Synthesized end 06:00:00 vs reported 05:54:59: delta = 301s.
        let mut core = make_episode(
            "core",
            "2024-01-15",
            "2024-01-14T22:00:00+00:00",
            "2024-01-15T05:54:59+00:00",
            28800,
        );
        core.sleep_phase_5_min = Some("1".repeat(96));

        let (daily_sleep, readiness) = make_scores("2024-01-15");
        let err = assemble_sleep_day(
            &SnapshotConfig::default(),
            day("2024-01-15"),
            &[core],
            &daily_sleep,
            &readiness,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            SnapshotError::TimelineInconsistency { delta_seconds: 301 }
        ));
    }

    #[test]
    fn timeline_ending_before_bedtime_end_is_an_inconsistency() {
        // Synthesized end 06:00:00 vs reported 06:00:01: delta = -1s.
        let mut core = make_episode(
            "core",
            "2024-01-15",
            "2024-01-14T22:00:00+00:00",
            "2024-01-15T06:00:01+00:00",
            28800,
        );
        core.sleep_phase_5_min = Some("1".repeat(96));

        let (daily_sleep, readiness) = make_scores("2024-01-15");
        let err = assemble_sleep_day(
            &SnapshotConfig::default(),
            day("2024-01-15"),
            &[core],
            &daily_sleep,
            &readiness,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            SnapshotError::TimelineInconsistency { delta_seconds: -1 }
        ));
    }

    #[test]
    fn selection_failure_propagates_unchanged() {
        let neighbor = make_episode(
            "neighbor",
            "2024-01-14",
            "2024-01-13T22:00:00+00:00",
            "2024-01-14T06:00:00+00:00",
            28800,
        );

        let (daily_sleep, readiness) = make_scores("2024-01-15");
        let err = assemble_sleep_day(
            &SnapshotConfig::default(),
            day("2024-01-15"),
            &[neighbor],
            &daily_sleep,
            &readiness,
        )
        .unwrap_err();

        assert!(matches!(err, SnapshotError::SelectionFailure { .. }));
    }

    #[test]
    fn absent_stage_string_builds_snapshot_without_timeline() {
        let core = make_episode(
            "core",
            "2024-01-15",
            "2024-01-14T22:00:00+00:00",
            "2024-01-15T06:00:00+00:00",
            28800,
        );

        let (daily_sleep, readiness) = make_scores("2024-01-15");
        let snapshot = assemble_sleep_day(
            &SnapshotConfig::default(),
            day("2024-01-15"),
            &[core],
            &daily_sleep,
            &readiness,
        )
        .unwrap();

        assert!(snapshot.timeline.is_none());
    }
}
