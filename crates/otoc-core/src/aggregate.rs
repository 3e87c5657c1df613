//! Collapse repeated runs into per-depth mean and sample standard deviation.

use serde::Serialize;
use statrs::statistics::Statistics;

use crate::error::{OtocError, Result};
use crate::series::{DepthSeries, RunSet};

/// Per-depth statistics across the runs of a [`RunSet`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStats {
    /// Arithmetic mean across runs.
    pub mean: DepthSeries,
    /// Sample standard deviation across runs (divisor n-1).
    pub std_dev: DepthSeries,
    /// Number of runs aggregated.
    pub runs: usize,
}

impl AggregateStats {
    pub fn depth_count(&self) -> usize {
        self.mean.len()
    }
}

/// Aggregate a run set column by column.
///
/// A single run has no sample standard deviation, so one-run sets are
/// rejected with [`OtocError::InsufficientRuns`].
pub fn aggregate(runs: &RunSet) -> Result<AggregateStats> {
    if runs.len() < 2 {
        return Err(OtocError::InsufficientRuns {
            context: runs.name().to_string(),
            runs: runs.len(),
        });
    }

    let depth_count = runs.depth_count();
    let mut mean = Vec::with_capacity(depth_count);
    let mut std_dev = Vec::with_capacity(depth_count);

    for i in 0..depth_count {
        let column = runs.column(i);
        mean.push(column.iter().mean());
        std_dev.push(column.iter().std_dev());
    }

    log::debug!(
        "aggregated {}: {} runs x {} depths",
        runs.name(),
        runs.len(),
        depth_count
    );

    Ok(AggregateStats {
        mean: DepthSeries::new(mean),
        std_dev: DepthSeries::new(std_dev),
        runs: runs.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Run;

    #[test]
    fn mean_and_sample_std_per_depth() {
        let set = RunSet::from_series("t", [vec![1.0, 0.0], vec![2.0, 0.0], vec![3.0, 0.3]])
            .unwrap();
        let stats = aggregate(&set).unwrap();
        assert_eq!(stats.runs, 3);
        assert!((stats.mean.values()[0] - 2.0).abs() < 1e-12);
        assert!((stats.mean.values()[1] - 0.1).abs() < 1e-12);
        // Bessel-corrected: var = ((1-2)^2 + 0 + (3-2)^2) / 2 = 1.
        assert!((stats.std_dev.values()[0] - 1.0).abs() < 1e-12);
        // var = (0.01 + 0.01 + 0.04) / 2 = 0.03.
        assert!((stats.std_dev.values()[1] - 0.03f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn identical_copies_have_zero_spread() {
        let series = vec![0.014, 0.2, 0.0, 0.5, 0.33];
        for n in 2..6 {
            let set = RunSet::from_series("copies", std::iter::repeat_n(series.clone(), n)).unwrap();
            let stats = aggregate(&set).unwrap();
            for (m, s) in stats.mean.values().iter().zip(&series) {
                assert!((m - s).abs() < 1e-12);
            }
            assert!(stats.std_dev.values().iter().all(|s| s.abs() < 1e-12));
        }
    }

    #[test]
    fn single_run_is_rejected() {
        let set = RunSet::new("lonely", vec![Run::new("only", vec![0.1, 0.2])]).unwrap();
        match aggregate(&set) {
            Err(OtocError::InsufficientRuns { context, runs }) => {
                assert_eq!(context, "lonely");
                assert_eq!(runs, 1);
            }
            other => panic!("expected InsufficientRuns, got {other:?}"),
        }
    }

    #[test]
    fn output_is_depth_aligned() {
        let set = RunSet::from_series("aligned", [vec![0.0; 11], vec![0.1; 11]]).unwrap();
        let stats = aggregate(&set).unwrap();
        assert_eq!(stats.depth_count(), 11);
        assert_eq!(stats.std_dev.len(), 11);
    }
}
