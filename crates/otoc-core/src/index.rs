//! Scrambling index Ω = ⟨C(d)⟩ / C0 and its complement λ = 1 − Ω.

use serde::Serialize;
use statrs::statistics::Statistics;

use crate::error::{OtocError, Result};
use crate::regime::Regime;
use crate::series::DepthSeries;

/// Saturation value of C(d) at full decorrelation for the measured observable.
pub const C0: f64 = 0.5;

/// Scalar scrambling indicator for one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScramblingIndex {
    pub omega: f64,
}

impl ScramblingIndex {
    /// Ω of a series: its mean divided by [`C0`].
    pub fn from_series(series: &DepthSeries) -> Result<Self> {
        Ok(Self {
            omega: series.mean()? / C0,
        })
    }

    /// Chaos measure λ = 1 − Ω.
    pub fn lambda(&self) -> f64 {
        1.0 - self.omega
    }

    pub fn regime(&self) -> Regime {
        Regime::classify(self.omega)
    }
}

/// Error bar for a hardware Ω: mean per-depth std / C0 / sqrt(depths).
pub fn omega_uncertainty(std_dev: &DepthSeries) -> Result<f64> {
    if std_dev.is_empty() {
        return Err(OtocError::EmptySeries);
    }
    let n = std_dev.len() as f64;
    Ok(std_dev.values().iter().mean() / C0 / n.sqrt())
}
