//! Snapshot configuration
//!
//! One explicit configuration value, constructed once at process start and
//! injected into the provider. Components never read ambient global state.

use serde::{Deserialize, Serialize};

/// Vendor episode type label that marks a main (overnight) sleep window.
pub const MAIN_SLEEP_KIND: &str = "long_sleep";

/// Configuration for snapshot construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Radius of the episode fetch window around the target day, in days.
    /// The default of 1 yields the canonical three-day window
    /// `[target_day - 1, target_day + 1]`.
    pub window_radius_days: u64,
    /// Episode type labels treated as main-sleep windows when locating the
    /// previous night's end for supplemental qualification.
    pub main_sleep_kinds: Vec<String>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            window_radius_days: 1,
            main_sleep_kinds: vec![MAIN_SLEEP_KIND.to_string()],
        }
    }
}

impl SnapshotConfig {
    /// Whether an episode type label marks a main-sleep window.
    pub fn is_main_sleep_kind(&self, kind: Option<&str>) -> bool {
        match kind {
            Some(k) => self.main_sleep_kinds.iter().any(|m| m == k),
            None => false,
        }
    }
}
