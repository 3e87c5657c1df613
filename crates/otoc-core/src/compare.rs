//! Pointwise hardware-vs-exact comparison.
//!
//! A depth matches when the hardware mean lies within an absolute floor plus
//! three hardware standard deviations of the exact value:
//!
//! ```text
//! |mean[i] - exact[i]| < BASE_TOLERANCE + SIGMA_MULTIPLIER * std[i]
//! ```

use serde::Serialize;

use crate::aggregate::AggregateStats;
use crate::error::Result;
use crate::series::DepthSeries;

/// Absolute tolerance floor added to the statistical band.
pub const BASE_TOLERANCE: f64 = 0.03;

/// Width of the statistical band in hardware standard deviations.
pub const SIGMA_MULTIPLIER: f64 = 3.0;

/// Verdict for a single depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepthComparison {
    pub depth: u32,
    pub exact: f64,
    pub hardware_mean: f64,
    pub hardware_std: f64,
    /// `hardware_mean - exact`.
    pub delta: f64,
    pub tolerance: f64,
    pub matched: bool,
}

/// Tolerance for one depth given its hardware spread.
pub fn tolerance(hardware_std: f64) -> f64 {
    BASE_TOLERANCE + SIGMA_MULTIPLIER * hardware_std
}

/// Compare hardware statistics against the exact series, depth by depth.
///
/// `depths`, `exact`, and both series in `stats` must all have the same length.
pub fn compare(
    depths: &[u32],
    exact: &DepthSeries,
    stats: &AggregateStats,
) -> Result<Vec<DepthComparison>> {
    let n = depths.len();
    exact.ensure_len(n, "exact reference")?;
    stats.mean.ensure_len(n, "hardware mean")?;
    stats.std_dev.ensure_len(n, "hardware std")?;

    let rows = depths
        .iter()
        .zip(exact.values())
        .zip(stats.mean.values().iter().zip(stats.std_dev.values()))
        .map(|((&depth, &exact), (&mean, &std))| {
            let delta = mean - exact;
            let tolerance = tolerance(std);
            DepthComparison {
                depth,
                exact,
                hardware_mean: mean,
                hardware_std: std,
                delta,
                tolerance,
                matched: delta.abs() < tolerance,
            }
        })
        .collect();

    Ok(rows)
}

/// Count of matching depths in a comparison.
pub fn match_count(rows: &[DepthComparison]) -> usize {
    rows.iter().filter(|r| r.matched).count()
}
