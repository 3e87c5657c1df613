//! # otoc-core
//!
//! **Does the hardware scramble the way the statevector says it should?**
//!
//! `otoc-core` compares out-of-time-order correlator (OTOC) measurements taken
//! on quantum hardware against exact classical simulation, for kicked Ising
//! (N = 4, 8, 12, 20), integrable, Floquet and SYK circuits.
//!
//! ## Quick Start
//!
//! ```no_run
//! use otoc_core::{Experiment, Regime};
//!
//! let experiment = Experiment::ibm_marrakesh().unwrap();
//! let ki4 = experiment.model("ki_n4").unwrap();
//!
//! let omega = ki4.omega_hardware().unwrap();
//! println!("Ω = {:.4} ({})", omega.omega, omega.regime());
//! assert_eq!(omega.regime(), Regime::StrongScrambling);
//! ```
//!
//! ## Pipeline
//!
//! Embedded campaign → [`aggregate()`] (per-depth mean, sample std) →
//! [`compare`](compare::compare) against the exact series →
//! [`ScramblingIndex`] Ω = ⟨C(d)⟩ / [`C0`] → [`Regime`].
//!
//! Everything is a pure function of the embedded tables; nothing is cached
//! or mutated after [`Experiment::ibm_marrakesh`] returns.

pub mod aggregate;
pub mod analysis;
pub mod compare;
pub mod dataset;
pub mod error;
pub mod index;
pub mod regime;
pub mod series;

pub use aggregate::{AggregateStats, aggregate};
pub use analysis::{
    ModelSummary, NoiseFloor, RecurrencePeak, SignalNoise, classification_table, noise_floor,
    pearson_correlation, recurrence_peak, signal_noise, uniform_floor,
};
pub use compare::{BASE_TOLERANCE, DepthComparison, SIGMA_MULTIPLIER, compare, match_count};
pub use dataset::{Experiment, Model, ModelFamily};
pub use error::{OtocError, Result};
pub use index::{C0, ScramblingIndex, omega_uncertainty};
pub use regime::Regime;
pub use series::{DepthSeries, Run, RunSet};

/// Circuit depths every series is sampled at.
pub const DEPTHS: [u32; 11] = [1, 2, 3, 4, 5, 6, 7, 8, 10, 12, 14];

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
