//! Core sleep selection
//!
//! Picks the one authoritative overnight episode for a target day out of a
//! window that may contain naps, fragmented nights, and the neighboring
//! days' main sleep. Selection is deterministic: candidates are ranked
//! under a total order, so identical inputs always pick the same episode.

use crate::error::SnapshotError;
use crate::types::SleepEpisode;
use chrono::{Days, NaiveDate};
use std::cmp::Ordering;

/// Select the core sleep episode for `target_day`.
///
/// Episodes that are tagged to the target day AND started on the previous
/// calendar day (i.e. crossed midnight into the target day) are preferred;
/// only when no episode crosses midnight does selection fall back to all
/// episodes tagged to the day. Within either set the longest sleep wins,
/// with ties broken by earliest bedtime_start, then lowest id.
pub fn select_core_sleep<'a>(
    episodes: &'a [SleepEpisode],
    target_day: NaiveDate,
) -> Result<&'a SleepEpisode, SnapshotError> {
    let previous_day = target_day - Days::new(1);

    let crossing: Vec<&SleepEpisode> = episodes
        .iter()
        .filter(|e| e.day == target_day && e.start_date() == previous_day)
        .collect();

    if let Some(core) = crossing.into_iter().max_by(|a, b| selection_order(a, b)) {
        return Ok(core);
    }

    episodes
        .iter()
        .filter(|e| e.day == target_day)
        .max_by(|a, b| selection_order(a, b))
        .ok_or(SnapshotError::SelectionFailure { day: target_day })
}

/// Total order over candidates; `Greater` means "preferred".
///
/// Longest total_sleep_duration first, then earliest bedtime_start, then
/// lowest id. Two distinct episodes can only compare `Equal` if they share
/// all three keys, i.e. the same identity.
fn selection_order(a: &SleepEpisode, b: &SleepEpisode) -> Ordering {
    a.total_sleep_duration
        .cmp(&b.total_sleep_duration)
        .then_with(|| b.bedtime_start.cmp(&a.bedtime_start))
        .then_with(|| b.id.cmp(&a.id))
}
