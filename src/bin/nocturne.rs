//! Nocturne CLI - offline snapshot construction from fetched vendor pages
//!
//! Commands:
//! - snapshot: Build sleep day snapshots from local vendor JSON pages
//! - timeline: Decode a stage-code string into a stage timeline
//! - validate: Validate a sleep episode page

use chrono::{DateTime, Days, FixedOffset, NaiveDate};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use async_trait::async_trait;
use nocturne::adapter;
use nocturne::{
    decode_stage_string, DailyReadinessScore, DailySleepScore, SleepDataSource, SleepDayProvider,
    SleepEpisode, SnapshotConfig, SnapshotError, NOCTURNE_VERSION,
};

/// Nocturne - canonical per-day sleep snapshots from raw wearable sleep records
#[derive(Parser)]
#[command(name = "nocturne")]
#[command(version = NOCTURNE_VERSION)]
#[command(about = "Build canonical sleep day snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build sleep day snapshots from local vendor JSON pages
    Snapshot {
        /// Sleep episode page (use - for stdin)
        #[arg(long)]
        episodes: PathBuf,

        /// Daily sleep score page
        #[arg(long)]
        sleep_score: PathBuf,

        /// Daily readiness score page
        #[arg(long)]
        readiness: PathBuf,

        /// Target day (YYYY-MM-DD)
        #[arg(long)]
        day: NaiveDate,

        /// Last day of the range; defaults to --day
        #[arg(long)]
        until: Option<NaiveDate>,

        /// Episode fetch window radius in days
        #[arg(long, default_value = "1")]
        radius: u64,

        /// Compact JSON output (one snapshot per line)
        #[arg(long)]
        compact: bool,
    },

    /// Decode a stage-code string into a stage timeline
    Timeline {
        /// Stage-code string, one character per 5-minute bucket
        #[arg(long)]
        stages: String,

        /// Anchor instant (RFC 3339, e.g. 2024-01-14T23:00:00-08:00)
        #[arg(long)]
        start: DateTime<FixedOffset>,

        /// Compact JSON output
        #[arg(long)]
        compact: bool,
    },

    /// Validate a sleep episode page
    Validate {
        /// Sleep episode page (use - for stdin)
        #[arg(long)]
        episodes: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("nocturne: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), NocturneCliError> {
    match cli.command {
        Commands::Snapshot {
            episodes,
            sleep_score,
            readiness,
            day,
            until,
            radius,
            compact,
        } => cmd_snapshot(
            &episodes,
            &sleep_score,
            &readiness,
            day,
            until.unwrap_or(day),
            radius,
            compact,
        ),

        Commands::Timeline {
            stages,
            start,
            compact,
        } => cmd_timeline(&stages, start, compact),

        Commands::Validate { episodes } => cmd_validate(&episodes),
    }
}

/// In-memory stand-in for the remote data source, backed by pages already
/// fetched to disk. Serves the provider the same day-filtered views the
/// real collaborator would.
struct FixtureSource {
    episodes: Vec<SleepEpisode>,
    sleep_scores: Vec<DailySleepScore>,
    readiness_scores: Vec<DailyReadinessScore>,
}

#[async_trait]
impl SleepDataSource for FixtureSource {
    async fn sleep_episodes(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SleepEpisode>, SnapshotError> {
        Ok(self
            .episodes
            .iter()
            .filter(|e| e.day >= start && e.day <= end)
            .cloned()
            .collect())
    }

    async fn daily_sleep_scores(
        &self,
        day: NaiveDate,
    ) -> Result<Vec<DailySleepScore>, SnapshotError> {
        Ok(self
            .sleep_scores
            .iter()
            .filter(|d| d.day == day)
            .cloned()
            .collect())
    }

    async fn daily_readiness_scores(
        &self,
        day: NaiveDate,
    ) -> Result<Vec<DailyReadinessScore>, SnapshotError> {
        Ok(self
            .readiness_scores
            .iter()
            .filter(|d| d.day == day)
            .cloned()
            .collect())
    }
}

fn cmd_snapshot(
    episodes: &Path,
    sleep_score: &Path,
    readiness: &Path,
    first_day: NaiveDate,
    last_day: NaiveDate,
    radius: u64,
    compact: bool,
) -> Result<(), NocturneCliError> {
    let source = FixtureSource {
        episodes: adapter::parse_sleep_page(&read_input(episodes)?)?,
        sleep_scores: adapter::parse_daily_sleep_page(&read_input(sleep_score)?)?,
        readiness_scores: adapter::parse_readiness_page(&read_input(readiness)?)?,
    };

    let config = SnapshotConfig {
        window_radius_days: radius,
        ..SnapshotConfig::default()
    };
    let provider = SleepDayProvider::with_config(source, config);

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;

    // Day by day, each day isolated: one bad day is reported and the
    // range keeps going.
    let mut failed_days = 0usize;
    let mut current = first_day;
    while current <= last_day {
        match runtime.block_on(provider.snapshot(current)) {
            Ok(Some(snapshot)) => {
                let json = if compact {
                    serde_json::to_string(&snapshot)?
                } else {
                    serde_json::to_string_pretty(&snapshot)?
                };
                println!("{json}");
            }
            Ok(None) => {
                println!(r#"{{"day":"{current}","note":"no sleep data"}}"#);
            }
            Err(e) => {
                eprintln!("nocturne: {current}: {e}");
                failed_days += 1;
            }
        }
        current = current + Days::new(1);
    }

    if failed_days > 0 {
        return Err(NocturneCliError::DaysFailed(failed_days));
    }
    Ok(())
}

fn cmd_timeline(
    stages: &str,
    start: DateTime<FixedOffset>,
    compact: bool,
) -> Result<(), NocturneCliError> {
    let timeline = decode_stage_string(stages, start);
    let json = if compact {
        serde_json::to_string(&timeline)?
    } else {
        serde_json::to_string_pretty(&timeline)?
    };
    println!("{json}");
    Ok(())
}

fn cmd_validate(episodes: &Path) -> Result<(), NocturneCliError> {
    match adapter::parse_sleep_page(&read_input(episodes)?) {
        Ok(parsed) => {
            println!(r#"{{"status":"ok","episodes":{}}}"#, parsed.len());
            Ok(())
        }
        Err(e) => {
            println!(r#"{{"status":"invalid","error":{}}}"#, serde_json::to_string(&e.to_string())?);
            Err(NocturneCliError::ValidationFailed)
        }
    }
}

fn read_input(path: &Path) -> Result<String, NocturneCliError> {
    if path.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("nocturne: reading page from terminal; pipe JSON or press Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

// Error types

#[derive(Debug)]
enum NocturneCliError {
    Io(io::Error),
    Snapshot(SnapshotError),
    Json(serde_json::Error),
    DaysFailed(usize),
    ValidationFailed,
}

impl std::fmt::Display for NocturneCliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NocturneCliError::Io(e) => write!(f, "{e}"),
            NocturneCliError::Snapshot(e) => write!(f, "{e}"),
            NocturneCliError::Json(e) => write!(f, "{e}"),
            NocturneCliError::DaysFailed(count) => {
                write!(f, "{count} day(s) failed to build")
            }
            NocturneCliError::ValidationFailed => write!(f, "episode page failed validation"),
        }
    }
}

impl From<io::Error> for NocturneCliError {
    fn from(e: io::Error) -> Self {
        NocturneCliError::Io(e)
    }
}

impl From<SnapshotError> for NocturneCliError {
    fn from(e: SnapshotError) -> Self {
        NocturneCliError::Snapshot(e)
    }
}

impl From<serde_json::Error> for NocturneCliError {
    fn from(e: serde_json::Error) -> Self {
        NocturneCliError::Json(e)
    }
}
