//! Supplemental sleep selection
//!
//! Supplemental sleep fills exactly the gap between two consecutive main
//! sleep windows: everything that ended before the current night began and
//! started after the previous night ended. Anything else (the core itself,
//! a neighboring night's main sleep, another day's nap) is excluded so the
//! 24h total never double-counts.

use crate::config::SnapshotConfig;
use crate::types::{SleepEpisode, SupplementalEpisode};
use chrono::{DateTime, FixedOffset};
use std::collections::HashSet;

/// Reduce the episode window to the qualifying supplemental episodes for
/// the chosen core sleep, sorted ascending by start, plus their total
/// duration in seconds.
pub fn select_supplemental(
    episodes: &[SleepEpisode],
    core: &SleepEpisode,
    config: &SnapshotConfig,
) -> (Vec<SupplementalEpisode>, i64) {
    let previous_window_end = previous_main_sleep_end(episodes, core, config);

    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut selected: Vec<SupplementalEpisode> = Vec::new();

    for episode in episodes {
        if episode.id == core.id {
            continue;
        }
        if episode.total_sleep_duration <= 0 {
            continue;
        }
        // Must end before (or exactly when) the current night begins.
        if episode.bedtime_end > core.bedtime_start {
            continue;
        }
        // Must start after the previous night ended, when one is known.
        if let Some(prev_end) = previous_window_end {
            if episode.bedtime_start < prev_end {
                continue;
            }
        }
        if !seen_ids.insert(episode.id.as_str()) {
            continue;
        }

        selected.push(SupplementalEpisode {
            start: episode.bedtime_start,
            end: episode.bedtime_end,
            duration_seconds: episode.total_sleep_duration,
        });
    }

    selected.sort_by_key(|e| e.start);
    let total_seconds = selected.iter().map(|e| e.duration_seconds).sum();

    (selected, total_seconds)
}

/// Latest bedtime_end among non-core main-sleep episodes that ended
/// strictly before the core sleep began; `None` when no previous main
/// sleep exists in the window.
fn previous_main_sleep_end(
    episodes: &[SleepEpisode],
    core: &SleepEpisode,
    config: &SnapshotConfig,
) -> Option<DateTime<FixedOffset>> {
    episodes
        .iter()
        .filter(|e| {
            e.id != core.id
                && config.is_main_sleep_kind(e.kind.as_deref())
                && e.bedtime_end < core.bedtime_start
        })
        .map(|e| e.bedtime_end)
        .max()
}
