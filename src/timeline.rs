//! Stage timeline decoding
//!
//! Decodes the vendor's dense stage-code string (one character per
//! 5-minute bucket) into time-stamped stage segments anchored at
//! bedtime_start. Adjacent identical stages merge into one segment; there
//! is no smoothing, no gap inference, and no other post-processing.

use crate::types::{SleepEpisode, SleepStage, SleepStageSegment, SleepStageTimeline, TimelineSource};
use chrono::{DateTime, Duration, FixedOffset};

/// Fixed width of one stage bucket in seconds.
pub const STAGE_RESOLUTION_SECONDS: i64 = 300;

fn stage_for_code(code: char) -> Option<SleepStage> {
    match code {
        '1' => Some(SleepStage::Deep),
        '2' => Some(SleepStage::Light),
        '3' => Some(SleepStage::Rem),
        '4' => Some(SleepStage::Awake),
        _ => None,
    }
}

/// Build the stage timeline for an episode, anchored at its bedtime_start.
///
/// Returns `None` when the stage string is absent or empty; a missing
/// signal is not an error. A string containing no recognized codes decodes
/// to a timeline with zero segments.
pub fn build_stage_timeline(episode: &SleepEpisode) -> Option<SleepStageTimeline> {
    let phases = episode.sleep_phase_5_min.as_deref()?;
    if phases.is_empty() {
        return None;
    }
    Some(decode_stage_string(phases, episode.bedtime_start))
}

/// Decode a stage-code string into a timeline.
///
/// The scan tracks the current run and closes it at each recognized stage
/// change. Unrecognized codes are skipped: they advance the positional
/// cursor one bucket (so later segment timestamps are never shifted) but
/// never introduce a stage of their own — a run in progress simply closes
/// at the next recognized transition. The final run closes at
/// `anchor + len × 300 s`.
pub fn decode_stage_string(
    phases: &str,
    anchor: DateTime<FixedOffset>,
) -> SleepStageTimeline {
    let mut segments: Vec<SleepStageSegment> = Vec::new();
    let mut current: Option<(SleepStage, DateTime<FixedOffset>)> = None;
    let mut skipped = 0usize;
    let mut length = 0i64;

    for (i, code) in phases.chars().enumerate() {
        length = i as i64 + 1;

        let Some(stage) = stage_for_code(code) else {
            skipped += 1;
            continue;
        };

        let t = anchor + Duration::seconds(i as i64 * STAGE_RESOLUTION_SECONDS);

        match current {
            Some((open_stage, run_start)) if open_stage != stage => {
                segments.push(SleepStageSegment {
                    start: run_start,
                    end: t,
                    stage: open_stage,
                });
                current = Some((stage, t));
            }
            Some(_) => {}
            None => current = Some((stage, t)),
        }
    }

    if let Some((open_stage, run_start)) = current {
        segments.push(SleepStageSegment {
            start: run_start,
            end: anchor + Duration::seconds(length * STAGE_RESOLUTION_SECONDS),
            stage: open_stage,
        });
    }

    if skipped > 0 {
        tracing::debug!(skipped, "ignored unrecognized stage codes");
    }

    SleepStageTimeline {
        source: TimelineSource::SleepPhase5Min,
        resolution_seconds: STAGE_RESOLUTION_SECONDS,
        segments,
    }
}
