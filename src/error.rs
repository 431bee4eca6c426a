//! Error types for Nocturne

use chrono::NaiveDate;
use thiserror::Error;

/// Which daily score document a cardinality failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKind {
    Sleep,
    Readiness,
}

impl std::fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreKind::Sleep => write!(f, "daily sleep score"),
            ScoreKind::Readiness => write!(f, "daily readiness score"),
        }
    }
}

/// Errors that can occur while building a sleep day snapshot.
///
/// Absence of data is not represented here: a fetch window with no
/// episodes at all is an expected outcome and surfaces as `Ok(None)`
/// from the provider, never as an error.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Episodes exist in the fetch window, but none are tagged to the
    /// requested day. Fatal for that day only.
    #[error("no sleep episode is tagged to {day}")]
    SelectionFailure { day: NaiveDate },

    /// A score sequence yielded something other than exactly one
    /// document for the requested day.
    #[error("expected exactly one {kind} document for {day}, got {count}")]
    MissingScoreDocument {
        kind: ScoreKind,
        day: NaiveDate,
        count: usize,
    },

    /// The decoded stage timeline disagrees with the episode's
    /// authoritative bedtime_end beyond the one-bucket tolerance.
    /// Signals an upstream data or selection defect; never corrected.
    #[error(
        "stage timeline ends {delta_seconds}s after the episode's bedtime_end \
         (allowed range is 0..300)"
    )]
    TimelineInconsistency { delta_seconds: i64 },

    #[error("failed to parse vendor payload: {0}")]
    Parse(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Opaque failure from the data-fetch collaborator (auth, network,
    /// pagination). Propagated, never interpreted.
    #[error("data source error: {0}")]
    Source(String),
}
