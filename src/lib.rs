//! Nocturne - canonical per-day sleep snapshots from raw wearable sleep records
//!
//! Nocturne resolves a calendar day's possibly overlapping, fragmented sleep
//! episodes into one coherent night's story through a deterministic pipeline:
//! vendor adaptation -> core sleep selection -> supplemental selection ->
//! stage timeline decoding -> snapshot assembly.
//!
//! ## Modules
//!
//! - **Adapter**: Parse vendor payload pages into validated episode and score records
//! - **Selector**: Pick the one authoritative overnight episode for a day
//! - **Supplemental**: Qualify nap episodes between two consecutive nights
//! - **Timeline**: Decode the 5-minute stage-code string into stage segments
//! - **Assembler**: Cross-check and assemble the immutable day snapshot
//! - **Provider**: Fetch a day's data from the external source and build it

pub mod adapter;
pub mod assembler;
pub mod config;
pub mod error;
pub mod provider;
pub mod selector;
pub mod supplemental;
pub mod timeline;
pub mod types;

pub use assembler::assemble_sleep_day;
pub use config::SnapshotConfig;
pub use error::{ScoreKind, SnapshotError};
pub use provider::{SleepDataSource, SleepDayProvider};
pub use timeline::{build_stage_timeline, decode_stage_string, STAGE_RESOLUTION_SECONDS};
pub use types::{
    DailyReadinessScore, DailySleepScore, SleepDaySnapshot, SleepEpisode, SleepStage,
    SleepStageSegment, SleepStageTimeline, SupplementalEpisode,
};

/// Nocturne version embedded in the CLI
pub const NOCTURNE_VERSION: &str = env!("CARGO_PKG_VERSION");
