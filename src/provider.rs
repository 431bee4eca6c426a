//! Day provider boundary
//!
//! The provider is the only suspension point in the crate: it fetches a
//! three-day episode window and the target day's score documents from the
//! external data source, then hands everything to the pure assembler. An
//! empty episode window is the one recognized non-error empty outcome and
//! surfaces as `Ok(None)`.

use crate::assembler::assemble_sleep_day;
use crate::config::SnapshotConfig;
use crate::error::{ScoreKind, SnapshotError};
use crate::types::{DailyReadinessScore, DailySleepScore, SleepDaySnapshot, SleepEpisode};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};

/// Data-fetch collaborator interface.
///
/// Implementations own authentication, retries, and pagination, and
/// collect each of the vendor's record sequences into a `Vec` per call.
/// Fetch failures arrive as opaque [`SnapshotError::Source`] values; the
/// provider propagates them without interpretation.
#[async_trait]
pub trait SleepDataSource {
    /// Sleep episodes whose day tag falls in `[start, end]`, inclusive.
    async fn sleep_episodes(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SleepEpisode>, SnapshotError>;

    /// Daily sleep score documents for exactly `day`.
    async fn daily_sleep_scores(
        &self,
        day: NaiveDate,
    ) -> Result<Vec<DailySleepScore>, SnapshotError>;

    /// Daily readiness score documents for exactly `day`.
    async fn daily_readiness_scores(
        &self,
        day: NaiveDate,
    ) -> Result<Vec<DailyReadinessScore>, SnapshotError>;
}

/// Fetches one day's data and builds its snapshot.
///
/// Each call owns a freshly fetched, private dataset: nothing is cached
/// across calls and nothing is mutated after construction.
pub struct SleepDayProvider<S> {
    source: S,
    config: SnapshotConfig,
}

impl<S: SleepDataSource + Sync> SleepDayProvider<S> {
    /// Create a provider with the default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, SnapshotConfig::default())
    }

    /// Create a provider with an explicit configuration value.
    pub fn with_config(source: S, config: SnapshotConfig) -> Self {
        Self { source, config }
    }

    /// Build the snapshot for `target_day`.
    ///
    /// Returns `Ok(None)` when the fetch window holds no episodes at all;
    /// every other shortfall (no episode tagged to the day, score
    /// cardinality violations, timeline inconsistency) is a fatal error
    /// scoped to this day.
    pub async fn snapshot(
        &self,
        target_day: NaiveDate,
    ) -> Result<Option<SleepDaySnapshot>, SnapshotError> {
        let radius = Days::new(self.config.window_radius_days);
        let window_start = target_day - radius;
        let window_end = target_day + radius;

        let episodes = self.source.sleep_episodes(window_start, window_end).await?;
        tracing::debug!(
            %target_day,
            episodes = episodes.len(),
            "fetched sleep episode window"
        );

        if episodes.is_empty() {
            return Ok(None);
        }

        let daily_sleep = exactly_one(
            self.source.daily_sleep_scores(target_day).await?,
            ScoreKind::Sleep,
            target_day,
        )?;
        let readiness = exactly_one(
            self.source.daily_readiness_scores(target_day).await?,
            ScoreKind::Readiness,
            target_day,
        )?;

        let snapshot =
            assemble_sleep_day(&self.config, target_day, &episodes, &daily_sleep, &readiness)?;
        Ok(Some(snapshot))
    }
}

/// The score streams are expected to yield exactly one document for the
/// requested day; anything else is a per-day fatal cardinality failure.
fn exactly_one<T>(
    mut docs: Vec<T>,
    kind: ScoreKind,
    day: NaiveDate,
) -> Result<T, SnapshotError> {
    if docs.len() == 1 {
        Ok(docs.remove(0))
    } else {
        Err(SnapshotError::MissingScoreDocument {
            kind,
            day,
            count: docs.len(),
        })
    }
}
