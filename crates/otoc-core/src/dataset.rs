//! Models and the embedded hardware campaign.
//!
//! The ibm_marrakesh campaign (14 Feb 2026, 4096 shots per circuit) is compiled
//! into the crate as a JSON document and validated when loaded: every run and
//! every exact reference must cover the full depth grid.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregateStats, aggregate};
use crate::error::{OtocError, Result};
use crate::index::ScramblingIndex;
use crate::series::{DepthSeries, Run, RunSet};

const IBM_MARRAKESH_JSON: &str = include_str!("../data/ibm_marrakesh_2026-02-14.json");

/// Circuit family a model belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    KickedIsing,
    Integrable,
    Floquet,
    Syk,
}

impl ModelFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::KickedIsing => "Kicked Ising",
            ModelFamily::Integrable => "Integrable",
            ModelFamily::Floquet => "Floquet",
            ModelFamily::Syk => "SYK",
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A physical system: repeated hardware runs plus its exact baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    pub key: String,
    pub label: String,
    pub family: ModelFamily,
    /// Number of qubits N.
    pub system_size: u32,
    pub runs: RunSet,
    /// Statevector simulation; `None` for ensembles simulated seed by seed.
    pub exact: Option<DepthSeries>,
    /// Runs that were submitted, when more than were retrieved.
    pub planned_runs: Option<usize>,
}

impl Model {
    pub fn stats(&self) -> Result<AggregateStats> {
        aggregate(&self.runs)
    }

    pub fn exact(&self) -> Result<&DepthSeries> {
        self.exact
            .as_ref()
            .ok_or_else(|| OtocError::MissingReference(self.label.clone()))
    }

    pub fn omega_exact(&self) -> Result<ScramblingIndex> {
        ScramblingIndex::from_series(self.exact()?)
    }

    pub fn omega_hardware(&self) -> Result<ScramblingIndex> {
        ScramblingIndex::from_series(&self.stats()?.mean)
    }

    /// Label with the run count appended for seed ensembles, e.g. `SYK N=4 (9s)`.
    pub fn display_label(&self) -> String {
        if self.family == ModelFamily::Syk {
            format!("{} ({}s)", self.label, self.runs.len())
        } else {
            self.label.clone()
        }
    }

    /// True when fewer runs were retrieved than planned.
    pub fn is_partial(&self) -> bool {
        self.planned_runs.is_some_and(|p| self.runs.len() < p)
    }
}

/// Hardware campaign: backend metadata, depth grid, and models in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Experiment {
    pub backend: String,
    pub qubits: u32,
    pub date: String,
    pub shots: u32,
    /// Exact-simulation points behind the campaign, when recorded.
    pub simulation_points: Option<usize>,
    pub depths: Vec<u32>,
    pub models: Vec<Model>,
}

#[derive(Deserialize)]
struct ExperimentDoc {
    backend: String,
    qubits: u32,
    date: String,
    shots: u32,
    #[serde(default)]
    simulation_points: Option<usize>,
    depths: Vec<u32>,
    models: Vec<ModelDoc>,
}

#[derive(Deserialize)]
struct ModelDoc {
    key: String,
    label: String,
    family: ModelFamily,
    system_size: u32,
    #[serde(default)]
    planned_runs: Option<usize>,
    exact: Option<Vec<f64>>,
    runs: Vec<Run>,
}

impl Experiment {
    /// The embedded ibm_marrakesh campaign.
    pub fn ibm_marrakesh() -> Result<Self> {
        Self::from_json(IBM_MARRAKESH_JSON)
    }

    /// Parse and validate a campaign document.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: ExperimentDoc = serde_json::from_str(json)?;
        let depth_count = doc.depths.len();

        let mut models = Vec::with_capacity(doc.models.len());
        for m in doc.models {
            let runs = RunSet::new(m.label.clone(), m.runs)?;
            if runs.depth_count() != depth_count {
                return Err(OtocError::DimensionMismatch {
                    context: format!("{} runs", m.label),
                    expected: depth_count,
                    actual: runs.depth_count(),
                });
            }
            let exact = match m.exact {
                Some(values) => {
                    let series = DepthSeries::new(values);
                    series.ensure_len(depth_count, &format!("{} exact", m.label))?;
                    Some(series)
                }
                None => None,
            };

            let model = Model {
                key: m.key,
                label: m.label,
                family: m.family,
                system_size: m.system_size,
                runs,
                exact,
                planned_runs: m.planned_runs,
            };
            if model.is_partial() {
                log::warn!(
                    "{}: only {}/{} runs available",
                    model.label,
                    model.runs.len(),
                    model.planned_runs.unwrap_or_default()
                );
            }
            models.push(model);
        }

        log::debug!(
            "loaded {} models from {} ({} depths)",
            models.len(),
            doc.backend,
            depth_count
        );

        Ok(Self {
            backend: doc.backend,
            qubits: doc.qubits,
            date: doc.date,
            shots: doc.shots,
            simulation_points: doc.simulation_points,
            depths: doc.depths,
            models,
        })
    }

    pub fn model(&self, key: &str) -> Result<&Model> {
        self.models
            .iter()
            .find(|m| m.key == key)
            .ok_or_else(|| OtocError::UnknownModel(key.to_string()))
    }

    /// Kicked Ising models ordered by system size.
    pub fn kicked_ising(&self) -> Vec<&Model> {
        let mut models: Vec<&Model> = self
            .models
            .iter()
            .filter(|m| m.family == ModelFamily::KickedIsing)
            .collect();
        models.sort_by_key(|m| m.system_size);
        models
    }

    /// Models that carry an exact reference, in declaration order.
    pub fn with_reference(&self) -> impl Iterator<Item = &Model> {
        self.models.iter().filter(|m| m.exact.is_some())
    }

    /// Hardware points across every model.
    pub fn hardware_points(&self) -> usize {
        self.models.iter().map(|m| m.runs.point_count()).sum()
    }

    /// Exact-simulation points for the inventory: the recorded campaign
    /// total, or the embedded exact series when none is recorded.
    pub fn simulation_point_total(&self) -> usize {
        self.simulation_points.unwrap_or_else(|| self.exact_points())
    }

    /// Exact-simulation points available in this dataset.
    pub fn exact_points(&self) -> usize {
        self.models
            .iter()
            .filter_map(|m| m.exact.as_ref())
            .map(|s| s.len())
            .sum()
    }
}
