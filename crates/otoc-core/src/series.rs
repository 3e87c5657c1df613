//! Depth-indexed OTOC series and the run sets they come in.
//!
//! A [`DepthSeries`] holds one C(d) sample per circuit depth of the shared
//! grid ([`crate::DEPTHS`]). A [`RunSet`] groups repeated hardware runs (or
//! disorder-seed realizations) of the same circuit; every series in a run set
//! is depth-aligned with every other.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::{OtocError, Result};

/// One C(d) value per circuit depth, in grid order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepthSeries(Vec<f64>);

impl DepthSeries {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Arithmetic mean over all depths.
    pub fn mean(&self) -> Result<f64> {
        if self.0.is_empty() {
            return Err(OtocError::EmptySeries);
        }
        Ok(self.0.iter().mean())
    }

    /// Mean over the samples from `index` onwards.
    pub fn tail_mean(&self, index: usize) -> Result<f64> {
        let tail = self.0.get(index..).unwrap_or_default();
        if tail.is_empty() {
            return Err(OtocError::EmptySeries);
        }
        Ok(tail.iter().mean())
    }

    /// Every sample multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self(self.0.iter().map(|v| v * factor).collect())
    }

    /// Fail with [`OtocError::DimensionMismatch`] unless `len() == expected`.
    pub fn ensure_len(&self, expected: usize, context: &str) -> Result<()> {
        if self.0.len() != expected {
            return Err(OtocError::DimensionMismatch {
                context: context.to_string(),
                expected,
                actual: self.0.len(),
            });
        }
        Ok(())
    }
}

impl From<Vec<f64>> for DepthSeries {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl From<&[f64]> for DepthSeries {
    fn from(values: &[f64]) -> Self {
        Self(values.to_vec())
    }
}

/// A single hardware execution (or disorder realization) of a circuit family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Opaque identifier, unique within its run set (`run1`, `seed-1000`, ...).
    pub id: String,
    /// Backend job that produced the counts, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// Disorder seed for ensemble models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub values: DepthSeries,
}

impl Run {
    pub fn new(id: impl Into<String>, values: impl Into<DepthSeries>) -> Self {
        Self {
            id: id.into(),
            job_id: None,
            seed: None,
            values: values.into(),
        }
    }
}

/// Non-empty, depth-aligned collection of runs in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSet {
    name: String,
    runs: Vec<Run>,
}

impl RunSet {
    /// Validate and wrap `runs`.
    ///
    /// Rejects an empty set, duplicate run ids, and runs whose length differs
    /// from the first run's. `name` is only used in error messages.
    pub fn new(name: impl Into<String>, runs: Vec<Run>) -> Result<Self> {
        let name = name.into();
        let Some(first) = runs.first() else {
            return Err(OtocError::EmptyRunSet(name));
        };
        let expected = first.values.len();

        let mut seen = HashSet::with_capacity(runs.len());
        for run in &runs {
            if !seen.insert(run.id.as_str()) {
                return Err(OtocError::DuplicateRun {
                    model: name,
                    run: run.id.clone(),
                });
            }
            run.values.ensure_len(expected, &format!("{name}/{}", run.id))?;
        }

        Ok(Self { name, runs })
    }

    /// Build a run set from bare series, naming them `run1`, `run2`, ...
    pub fn from_series<I>(name: impl Into<String>, series: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<DepthSeries>,
    {
        let runs = series
            .into_iter()
            .enumerate()
            .map(|(i, s)| Run::new(format!("run{}", i + 1), s))
            .collect();
        Self::new(name, runs)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Run> {
        self.runs.iter()
    }

    /// Number of runs (always >= 1).
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Depths per run; identical for every run by construction.
    pub fn depth_count(&self) -> usize {
        self.runs[0].values.len()
    }

    /// Total number of measured points (runs x depths).
    pub fn point_count(&self) -> usize {
        self.len() * self.depth_count()
    }

    /// All runs' values at one depth index.
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.runs
            .iter()
            .filter_map(|r| r.values.get(index))
            .collect()
    }
}

impl<'a> IntoIterator for &'a RunSet {
    type Item = &'a Run;
    type IntoIter = std::slice::Iter<'a, Run>;

    fn into_iter(self) -> Self::IntoIter {
        self.runs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_series() {
        let s = DepthSeries::new(vec![0.1, 0.2, 0.3]);
        assert!((s.mean().unwrap() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn mean_of_empty_series_fails() {
        let s = DepthSeries::new(Vec::new());
        assert!(matches!(s.mean(), Err(OtocError::EmptySeries)));
    }

    #[test]
    fn tail_mean_skips_leading_depths() {
        let s = DepthSeries::new(vec![1.0, 1.0, 0.2, 0.4]);
        assert!((s.tail_mean(2).unwrap() - 0.3).abs() < 1e-12);
        assert!(matches!(s.tail_mean(4), Err(OtocError::EmptySeries)));
        assert!(matches!(s.tail_mean(9), Err(OtocError::EmptySeries)));
    }

    #[test]
    fn run_set_rejects_empty() {
        let err = RunSet::new("empty", Vec::new()).unwrap_err();
        assert!(matches!(err, OtocError::EmptyRunSet(name) if name == "empty"));
    }

    #[test]
    fn run_set_rejects_ragged_runs() {
        let err = RunSet::from_series("ragged", [vec![0.1, 0.2, 0.3], vec![0.1, 0.2]]).unwrap_err();
        match err {
            OtocError::DimensionMismatch {
                context,
                expected,
                actual,
            } => {
                assert_eq!(context, "ragged/run2");
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn run_set_rejects_duplicate_ids() {
        let runs = vec![Run::new("a", vec![0.1]), Run::new("a", vec![0.2])];
        assert!(matches!(
            RunSet::new("dup", runs),
            Err(OtocError::DuplicateRun { .. })
        ));
    }

    #[test]
    fn column_collects_across_runs() {
        let set = RunSet::from_series("cols", [vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]])
            .unwrap();
        assert_eq!(set.column(1), vec![2.0, 4.0, 6.0]);
        assert_eq!(set.point_count(), 6);
        assert_eq!(set.runs()[2].id, "run3");
    }
}
