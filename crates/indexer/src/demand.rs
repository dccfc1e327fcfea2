//! Weekly demand index over the daily statistics.
//!
//! The index mixes three weekly signals: traded volume relative to the
//! circulating supply, holder growth against the same day one week earlier,
//! and the share of active wallets that sent tokens. It drives an adaptive
//! threshold (MSCT) that is persisted between runs.

use crate::{error::IndexError, store::MemoryStore, Store};
use alloy_primitives::{utils::format_ether, U256};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use tracing::{debug, info, warn};

/// Token amount (18 decimals) as a float.
pub fn token_units(amount: U256) -> f64 {
    format_ether(amount).parse().unwrap_or(f64::MAX)
}

/// Weights and limits of the demand computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandParams {
    /// Days summed per window, today included
    pub window_days: u64,
    /// Weekly volume (in tokens) at or below which no index is produced
    pub min_volume: f64,
    pub volume_weight: f64,
    pub holder_weight: f64,
    pub conversion_weight: f64,
    /// Gain of the adaptive threshold
    pub threshold_gain: f64,
    /// Scale of the percent rule
    pub percent_scale: f64,
}

impl Default for DemandParams {
    fn default() -> Self {
        Self {
            window_days: 7,
            min_volume: 125_000.0,
            volume_weight: 0.5,
            holder_weight: 0.3,
            conversion_weight: 0.2,
            threshold_gain: 0.2,
            percent_scale: 0.6,
        }
    }
}

/// Components of one demand index evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DemandIndex {
    /// Weekly volume as a percentage of the circulating supply
    pub volume_ratio: f64,
    /// Relative holder change against one window earlier
    pub holder_growth: f64,
    /// Unique senders over active wallets
    pub conversion: f64,
    pub demand: f64,
}

/// Demand index for the window ending at day bucket `today`.
///
/// Returns `None` when the window volume does not exceed
/// [`DemandParams::min_volume`] or there is no record for the day exactly one
/// window before `today`.
pub fn demand_index(
    store: &MemoryStore,
    today: u64,
    circulating_supply: U256,
    params: &DemandParams,
) -> Option<DemandIndex> {
    let first_day = today.saturating_sub(params.window_days.saturating_sub(1));

    let mut volume = U256::ZERO;
    let mut senders = 0u64;
    let mut wallets = 0u64;
    for day in first_day..=today {
        if let Some(stat) = store.daily_stat(day) {
            volume = volume.saturating_add(stat.volume);
            senders += stat.unique_senders();
            wallets += stat.active_wallets();
        }
    }
    let volume = token_units(volume);

    let holders_now = store
        .latest_daily_stat()
        .map(|stat| stat.holder_count)
        .unwrap_or_default();
    let holders_before = today
        .checked_sub(params.window_days)
        .and_then(|day| store.daily_stat(day))
        .map(|stat| stat.holder_count);

    let Some(holders_before) = holders_before else {
        debug!(today, "No holder record one window back");
        return None;
    };
    if volume <= params.min_volume {
        debug!(today, volume, "Window volume below minimum");
        return None;
    }

    let supply = token_units(circulating_supply);
    let volume_ratio = if supply > 0.0 {
        volume / supply * 100.0
    } else {
        0.0
    };
    let holder_growth = if holders_before == 0 {
        0.0
    } else {
        (holders_now as f64 - holders_before as f64) / holders_before as f64
    };
    let conversion = if wallets == 0 {
        0.0
    } else {
        senders as f64 / wallets as f64
    };

    let demand = params.volume_weight * volume_ratio
        + params.holder_weight * holder_growth
        + params.conversion_weight * conversion;

    Some(DemandIndex {
        volume_ratio,
        holder_growth,
        conversion,
        demand,
    })
}

/// Next threshold: `msct * (1 + gain * (demand - msct))`.
pub fn adaptive_threshold(demand: f64, msct: f64, gain: f64) -> f64 {
    msct * (1.0 + gain * (demand - msct))
}

/// Distance of the demand above the threshold.
pub fn heat_gap(demand: f64, threshold: f64) -> f64 {
    demand - threshold
}

/// Supply adjustment ratio `scale * gap / msct`, zero for a zero threshold.
pub fn percent_rule(gap: f64, msct: f64, scale: f64) -> f64 {
    if msct == 0.0 {
        0.0
    } else {
        scale * gap / msct
    }
}

/// Result of one threshold step, printed by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DemandReport {
    #[serde(flatten)]
    pub index: DemandIndex,
    pub threshold: f64,
    pub heat_gap: f64,
    pub percent: f64,
}

/// Persisted adaptive threshold, stored as `{"msct": <value>}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MsctState {
    pub msct: f64,
}

impl Default for MsctState {
    fn default() -> Self {
        Self { msct: 0.5 }
    }
}

impl MsctState {
    /// Load from `path`. A missing or unreadable document yields the default.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref();

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(IndexError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        match serde_json::from_str(&contents) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid threshold state, using default");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), IndexError> {
        let path = path.as_ref();
        let json = serde_json::to_string(self)?;

        let tmp = path.with_extension("json.tmp");
        let io_err = |source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        };
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }

    /// Move the threshold for `index` and derive the heat gap and percent rule
    /// from the new value.
    pub fn step(&mut self, index: DemandIndex, params: &DemandParams) -> DemandReport {
        let threshold = adaptive_threshold(index.demand, self.msct, params.threshold_gain);
        self.msct = threshold;

        let gap = heat_gap(index.demand, threshold);
        let percent = percent_rule(gap, threshold, params.percent_scale);

        info!(
            demand = index.demand,
            threshold, gap, percent, "Threshold updated"
        );

        DemandReport {
            index,
            threshold,
            heat_gap: gap,
            percent,
        }
    }
}
