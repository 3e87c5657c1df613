//! Five-band scrambling regime classification.

use std::fmt;

use serde::Serialize;

/// Ordinal scrambling regime, most scrambled first.
///
/// Bands are half-open `[lower, upper)`; an Ω sitting exactly on an edge
/// belongs to the band that starts there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    CompleteScrambling,
    StrongScrambling,
    Intermediate,
    WeakScrambling,
    NoScrambling,
}

impl Regime {
    /// All regimes in band order.
    pub const ALL: [Regime; 5] = [
        Regime::CompleteScrambling,
        Regime::StrongScrambling,
        Regime::Intermediate,
        Regime::WeakScrambling,
        Regime::NoScrambling,
    ];

    /// Map Ω to its regime. Total: anything below 0.05 is complete scrambling,
    /// anything not below 0.60 (NaN included) is no scrambling.
    pub fn classify(omega: f64) -> Regime {
        if omega < 0.05 {
            Regime::CompleteScrambling
        } else if omega < 0.15 {
            Regime::StrongScrambling
        } else if omega < 0.35 {
            Regime::Intermediate
        } else if omega < 0.60 {
            Regime::WeakScrambling
        } else {
            Regime::NoScrambling
        }
    }

    /// `(lower, upper)` Ω bounds; the last band is unbounded above.
    pub fn band(&self) -> (f64, f64) {
        match self {
            Regime::CompleteScrambling => (0.0, 0.05),
            Regime::StrongScrambling => (0.05, 0.15),
            Regime::Intermediate => (0.15, 0.35),
            Regime::WeakScrambling => (0.35, 0.60),
            Regime::NoScrambling => (0.60, f64::INFINITY),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Regime::CompleteScrambling => "Complete scrambling",
            Regime::StrongScrambling => "Strong scrambling",
            Regime::Intermediate => "Intermediate",
            Regime::WeakScrambling => "Weak scrambling",
            Regime::NoScrambling => "No scrambling",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}
