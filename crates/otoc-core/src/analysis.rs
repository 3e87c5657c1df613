//! Findings derived from aggregated OTOC data.
//!
//! Beyond the per-depth comparison this module characterizes what the
//! hardware actually reproduces: the kicked Ising recurrence peak, the
//! deep-circuit noise floor against uniform noise, series correlation, and
//! the final Ω-sorted classification table.

use serde::Serialize;
use statrs::statistics::Statistics;

use crate::aggregate::AggregateStats;
use crate::dataset::Model;
use crate::error::{OtocError, Result};
use crate::index::ScramblingIndex;
use crate::regime::Regime;
use crate::series::DepthSeries;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Largest exact C(d) and what the hardware measured at that depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecurrencePeak {
    pub depth_index: usize,
    pub depth: u32,
    pub exact: f64,
    pub hardware_mean: f64,
    pub hardware_std: f64,
}

/// Deep-circuit hardware signal compared with fully depolarized output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoiseFloor {
    pub system_size: u32,
    /// Smallest depth included in the averages.
    pub min_depth: u32,
    /// Mean hardware C(d) over depths >= `min_depth`.
    pub hardware_deep_mean: f64,
    /// Same average over the exact series, when there is one.
    pub exact_deep_mean: Option<f64>,
    /// 1/2^N.
    pub uniform_floor: f64,
    /// `hardware_deep_mean / uniform_floor`.
    pub ratio: f64,
}

/// Signal (exact C) and noise (|hardware - exact|) at one depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalNoise {
    pub depth: u32,
    pub signal: f64,
    pub noise: f64,
}

/// One row of the final classification table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub label: String,
    pub omega_exact: Option<ScramblingIndex>,
    pub omega_hardware: ScramblingIndex,
    /// Regime of the hardware Ω; this is the regime the table reports.
    pub regime: Regime,
    pub regime_exact: Option<Regime>,
}

impl ModelSummary {
    /// Exact and hardware land in the same regime. `None` without a reference.
    pub fn regimes_agree(&self) -> Option<bool> {
        self.regime_exact.map(|r| r == self.regime)
    }
}

// ---------------------------------------------------------------------------
// Analysis functions
// ---------------------------------------------------------------------------

/// Every series a finding reads must cover the full depth grid.
fn ensure_aligned(
    depths: &[u32],
    exact: Option<&DepthSeries>,
    stats: &AggregateStats,
) -> Result<()> {
    if let Some(exact) = exact {
        exact.ensure_len(depths.len(), "exact vs depth grid")?;
    }
    stats.mean.ensure_len(depths.len(), "hardware mean vs depth grid")?;
    stats.std_dev.ensure_len(depths.len(), "hardware std vs depth grid")
}

/// Occupation of |0...0⟩ under uniform noise on N qubits.
pub fn uniform_floor(system_size: u32) -> f64 {
    0.5f64.powi(system_size as i32)
}

/// Locate the maximum of the exact series and read the hardware there.
///
/// Ties resolve to the shallowest depth.
pub fn recurrence_peak(depths: &[u32], model: &Model) -> Result<RecurrencePeak> {
    let exact = model.exact()?;
    let stats = model.stats()?;
    ensure_aligned(depths, Some(exact), &stats)?;

    let (depth_index, peak) = exact
        .values()
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .ok_or(OtocError::EmptySeries)?;

    Ok(RecurrencePeak {
        depth_index,
        depth: depths[depth_index],
        exact: peak,
        hardware_mean: stats.mean.values()[depth_index],
        hardware_std: stats.std_dev.values()[depth_index],
    })
}

/// Average hardware (and exact) C(d) over depths >= `min_depth`.
pub fn noise_floor(depths: &[u32], model: &Model, min_depth: u32) -> Result<NoiseFloor> {
    let stats = model.stats()?;
    ensure_aligned(depths, model.exact.as_ref(), &stats)?;
    let start = depths
        .iter()
        .position(|&d| d >= min_depth)
        .ok_or(OtocError::EmptySeries)?;

    let hardware_deep_mean = stats.mean.tail_mean(start)?;
    let exact_deep_mean = match &model.exact {
        Some(exact) => Some(exact.tail_mean(start)?),
        None => None,
    };
    let floor = uniform_floor(model.system_size);

    Ok(NoiseFloor {
        system_size: model.system_size,
        min_depth,
        hardware_deep_mean,
        exact_deep_mean,
        uniform_floor: floor,
        ratio: hardware_deep_mean / floor,
    })
}

/// Split the hardware mean into exact signal and residual noise per depth.
pub fn signal_noise(depths: &[u32], model: &Model) -> Result<Vec<SignalNoise>> {
    let exact = model.exact()?;
    let stats = model.stats()?;
    ensure_aligned(depths, Some(exact), &stats)?;

    Ok(depths
        .iter()
        .zip(exact.values().iter().zip(stats.mean.values()))
        .map(|(&depth, (&signal, &mean))| SignalNoise {
            depth,
            signal,
            noise: (mean - signal).abs(),
        })
        .collect())
}

/// Pearson correlation coefficient of two depth-aligned series.
pub fn pearson_correlation(a: &DepthSeries, b: &DepthSeries) -> Result<f64> {
    b.ensure_len(a.len(), "correlation")?;
    if a.len() < 2 {
        return Err(OtocError::ZeroVariance);
    }
    let cov = a.values().iter().covariance(b.values().iter());
    let denom = a.values().iter().std_dev() * b.values().iter().std_dev();
    if denom.is_nan() || denom < 1e-15 {
        return Err(OtocError::ZeroVariance);
    }
    Ok(cov / denom)
}

/// Summarize every model and sort by ascending hardware Ω.
///
/// The sort is stable, so models with equal Ω keep declaration order.
pub fn classification_table<'a, I>(models: I) -> Result<Vec<ModelSummary>>
where
    I: IntoIterator<Item = &'a Model>,
{
    let mut rows = Vec::new();
    for model in models {
        let omega_hardware = model.omega_hardware()?;
        let omega_exact = match &model.exact {
            Some(exact) => Some(ScramblingIndex::from_series(exact)?),
            None => None,
        };
        rows.push(ModelSummary {
            label: model.display_label(),
            regime: omega_hardware.regime(),
            regime_exact: omega_exact.map(|o| o.regime()),
            omega_exact,
            omega_hardware,
        });
    }
    rows.sort_by(|a, b| a.omega_hardware.omega.total_cmp(&b.omega_hardware.omega));
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ModelFamily;
    use crate::series::RunSet;

    fn model(label: &str, n: u32, exact: Option<Vec<f64>>, runs: Vec<Vec<f64>>) -> Model {
        Model {
            key: label.to_lowercase(),
            label: label.to_string(),
            family: ModelFamily::KickedIsing,
            system_size: n,
            runs: RunSet::from_series(label, runs).unwrap(),
            exact: exact.map(DepthSeries::new),
            planned_runs: None,
        }
    }

    #[test]
    fn uniform_floor_halves_per_qubit() {
        assert_eq!(uniform_floor(0), 1.0);
        assert_eq!(uniform_floor(4), 1.0 / 16.0);
        assert!((uniform_floor(20) - 9.5367431640625e-7).abs() < 1e-18);
    }

    #[test]
    fn peak_reads_hardware_at_exact_maximum() {
        let m = model(
            "P",
            4,
            Some(vec![0.1, 0.4, 0.2]),
            vec![vec![0.1, 0.30, 0.2], vec![0.1, 0.34, 0.2]],
        );
        let peak = recurrence_peak(&[1, 2, 3], &m).unwrap();
        assert_eq!(peak.depth_index, 1);
        assert_eq!(peak.depth, 2);
        assert!((peak.exact - 0.4).abs() < 1e-12);
        assert!((peak.hardware_mean - 0.32).abs() < 1e-12);
        assert!(peak.hardware_std > 0.0);
    }

    #[test]
    fn peak_tie_prefers_shallowest() {
        let m = model(
            "T",
            4,
            Some(vec![0.5, 0.5, 0.0]),
            vec![vec![0.0; 3], vec![0.0; 3]],
        );
        assert_eq!(recurrence_peak(&[1, 2, 3], &m).unwrap().depth_index, 0);
    }

    #[test]
    fn noise_floor_averages_deep_depths() {
        let m = model(
            "F",
            2,
            Some(vec![0.9, 0.0, 0.0]),
            vec![vec![0.9, 0.2, 0.3], vec![0.9, 0.2, 0.3]],
        );
        let floor = noise_floor(&[1, 4, 6], &m, 4).unwrap();
        assert!((floor.hardware_deep_mean - 0.25).abs() < 1e-12);
        assert_eq!(floor.exact_deep_mean, Some(0.0));
        assert_eq!(floor.uniform_floor, 0.25);
        assert!((floor.ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn noise_floor_past_grid_is_empty() {
        let m = model("F", 2, None, vec![vec![0.1, 0.2], vec![0.1, 0.2]]);
        assert!(matches!(
            noise_floor(&[1, 2], &m, 3),
            Err(OtocError::EmptySeries)
        ));
    }

    #[test]
    fn peak_rejects_runs_off_the_grid() {
        let m = model(
            "R",
            4,
            Some(vec![0.1, 0.2, 0.3]),
            vec![vec![0.1, 0.2], vec![0.1, 0.2]],
        );
        assert!(matches!(
            recurrence_peak(&[1, 2, 3], &m),
            Err(OtocError::DimensionMismatch { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn noise_floor_rejects_short_exact() {
        let m = model(
            "E",
            4,
            Some(vec![0.1, 0.2]),
            vec![vec![0.1, 0.2, 0.3], vec![0.1, 0.2, 0.3]],
        );
        assert!(matches!(
            noise_floor(&[1, 2, 3], &m, 2),
            Err(OtocError::DimensionMismatch { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn signal_noise_does_not_truncate() {
        let m = model(
            "S",
            4,
            Some(vec![0.1, 0.2, 0.3]),
            vec![vec![0.1, 0.2], vec![0.1, 0.2]],
        );
        assert!(matches!(
            signal_noise(&[1, 2, 3], &m),
            Err(OtocError::DimensionMismatch { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn signal_noise_is_absolute_residual() {
        let m = model(
            "S",
            4,
            Some(vec![0.2, 0.0]),
            vec![vec![0.1, 0.05], vec![0.1, 0.05]],
        );
        let rows = signal_noise(&[1, 2], &m).unwrap();
        assert!((rows[0].noise - 0.1).abs() < 1e-12);
        assert!((rows[1].noise - 0.05).abs() < 1e-12);
        assert_eq!(rows[1].signal, 0.0);
    }

    #[test]
    fn correlation_of_affine_copy_is_one() {
        let a = DepthSeries::new(vec![0.1, 0.4, 0.2, 0.8]);
        let b = a.scaled(3.0);
        assert!((pearson_correlation(&a, &b).unwrap() - 1.0).abs() < 1e-12);
        let c = a.scaled(-1.0);
        assert!((pearson_correlation(&a, &c).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn correlation_rejects_constant_and_ragged() {
        let a = DepthSeries::new(vec![0.1, 0.4, 0.2]);
        let flat = DepthSeries::new(vec![0.5, 0.5, 0.5]);
        assert!(matches!(
            pearson_correlation(&a, &flat),
            Err(OtocError::ZeroVariance)
        ));
        let short = DepthSeries::new(vec![0.1, 0.2]);
        assert!(matches!(
            pearson_correlation(&a, &short),
            Err(OtocError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn table_sorts_by_hardware_omega_and_is_stable() {
        let hi = model("Hi", 4, Some(vec![0.4, 0.4]), vec![vec![0.4; 2], vec![0.4; 2]]);
        let tie_a = model("TieA", 4, None, vec![vec![0.02; 2], vec![0.02; 2]]);
        let lo = model("Lo", 8, Some(vec![0.0, 0.0]), vec![vec![0.001; 2], vec![0.003; 2]]);
        let tie_b = model("TieB", 4, None, vec![vec![0.02; 2], vec![0.02; 2]]);

        let rows = classification_table([&hi, &tie_a, &lo, &tie_b]).unwrap();
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["Lo", "TieA", "TieB", "Hi"]);

        assert_eq!(rows[0].regime, Regime::CompleteScrambling);
        assert_eq!(rows[0].regimes_agree(), Some(true));
        assert_eq!(rows[1].regimes_agree(), None);
        assert_eq!(rows[3].regime, Regime::NoScrambling);
    }
}
