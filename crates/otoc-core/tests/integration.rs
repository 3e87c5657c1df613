//! Integration tests for otoc-core.
//!
//! These run the full pipeline on the embedded ibm_marrakesh campaign:
//! dataset load → aggregation → comparison → Ω → regime.

use otoc_core::{
    DEPTHS, Experiment, OtocError, Regime, aggregate, classification_table, compare, match_count,
    noise_floor, pearson_correlation, recurrence_peak,
};

fn experiment() -> Experiment {
    Experiment::ibm_marrakesh().expect("embedded dataset must load")
}

/// Column means of a run table, computed independently of the library.
fn column_mean_omega(rows: &[&[f64]]) -> f64 {
    let depths = rows[0].len();
    let total: f64 = (0..depths)
        .map(|i| rows.iter().map(|r| r[i]).sum::<f64>() / rows.len() as f64)
        .sum();
    total / depths as f64 / 0.5
}

#[test]
fn embedded_dataset_shape() {
    let exp = experiment();
    assert_eq!(exp.backend, "ibm_marrakesh");
    assert_eq!(exp.shots, 4096);
    assert_eq!(exp.depths, DEPTHS);
    assert_eq!(exp.models.len(), 7);
    // 6 models x 5 runs x 11 depths + 9 SYK seeds x 11 depths.
    assert_eq!(exp.hardware_points(), 429);
    assert_eq!(exp.exact_points(), 66);
    assert_eq!(exp.simulation_point_total(), 616);

    let syk = exp.model("syk_n4").unwrap();
    assert_eq!(syk.runs.len(), 9);
    assert!(syk.is_partial());
    assert!(syk.exact.is_none());
    assert_eq!(syk.runs.runs()[0].seed, Some(1000));
}

#[test]
fn kicked_ising_n4_omega_matches_column_means() {
    let exp = experiment();
    let ki4 = exp.model("ki_n4").unwrap();

    let exact: &[f64] = ki4.exact.as_ref().unwrap().values();
    let omega_exact = ki4.omega_exact().unwrap().omega;
    assert!((omega_exact - column_mean_omega(&[exact])).abs() < 1e-3);
    assert!((omega_exact - 0.135859).abs() < 1e-5);

    let runs: Vec<&[f64]> = ki4.runs.iter().map(|r| r.values.values()).collect();
    let omega_hw = ki4.omega_hardware().unwrap().omega;
    assert!((omega_hw - column_mean_omega(&runs)).abs() < 1e-3);
    assert!((omega_hw - 0.133141).abs() < 1e-5);

    assert_eq!(Regime::classify(omega_exact), Regime::StrongScrambling);
    assert_eq!(Regime::classify(omega_hw), Regime::StrongScrambling);
}

#[test]
fn kicked_ising_n4_depth_four_matches() {
    let exp = experiment();
    let ki4 = exp.model("ki_n4").unwrap();
    let stats = aggregate(&ki4.runs).unwrap();
    let rows = compare(&exp.depths, ki4.exact().unwrap(), &stats).unwrap();

    let d4 = rows[3];
    assert_eq!(d4.depth, 4);
    assert!((d4.delta + 0.051093).abs() < 1e-5);
    assert!((d4.hardware_std - 0.009146).abs() < 1e-5);
    assert!(d4.delta.abs() < d4.tolerance);
    assert!(d4.matched);

    // Depths 12 and 14 miss: exact recurrence the hardware washes out.
    assert!(!rows[9].matched);
    assert!(!rows[10].matched);
    assert_eq!(match_count(&rows), 9);
}

#[test]
fn match_tallies_per_model() {
    let exp = experiment();
    let tallies: Vec<(String, usize)> = exp
        .with_reference()
        .map(|m| {
            let stats = m.stats().unwrap();
            let rows = compare(&exp.depths, m.exact().unwrap(), &stats).unwrap();
            (m.key.clone(), match_count(&rows))
        })
        .collect();

    let expected = [
        ("ki_n4", 9),
        ("ki_n8", 11),
        ("ki_n12", 11),
        ("ki_n20", 11),
        ("integrable_n4", 11),
        ("floquet_n4", 8),
    ];
    assert_eq!(tallies.len(), expected.len());
    for ((key, count), (want_key, want_count)) in tallies.iter().zip(expected) {
        assert_eq!(key, want_key);
        assert_eq!(*count, want_count, "{key}");
    }
}

#[test]
fn integrable_reference_has_no_scrambling() {
    let exp = experiment();
    let omega = exp.model("integrable_n4").unwrap().omega_exact().unwrap();
    assert!((omega.omega - 0.727).abs() < 1e-3);
    assert_eq!(omega.regime(), Regime::NoScrambling);
}

#[test]
fn syk_has_hardware_omega_only() {
    let exp = experiment();
    let syk = exp.model("syk_n4").unwrap();
    assert!((syk.omega_hardware().unwrap().omega - 0.179860).abs() < 1e-5);
    assert!(matches!(
        syk.omega_exact(),
        Err(OtocError::MissingReference(_))
    ));
}

#[test]
fn kicked_ising_n4_recurrence_peak_at_depth_four() {
    let exp = experiment();
    let peak = recurrence_peak(&exp.depths, exp.model("ki_n4").unwrap()).unwrap();
    assert_eq!(peak.depth, 4);
    assert!((peak.exact - 0.242499).abs() < 1e-9);
    assert!((peak.hardware_mean - 0.191406).abs() < 1e-5);
}

#[test]
fn noise_floor_tracks_uniform_noise() {
    let exp = experiment();
    let ratios: Vec<f64> = exp
        .kicked_ising()
        .into_iter()
        .map(|m| noise_floor(&exp.depths, m, 4).unwrap().ratio)
        .collect();
    assert_eq!(ratios.len(), 4);
    assert!((ratios[0] - 1.2347).abs() < 1e-3);
    assert!((ratios[1] - 1.2500).abs() < 1e-3);
    assert!((ratios[2] - 1.8743).abs() < 1e-3);
    assert_eq!(ratios[3], 0.0);
}

#[test]
fn floquet_hardware_correlates_with_exact() {
    let exp = experiment();
    let floquet = exp.model("floquet_n4").unwrap();
    let stats = floquet.stats().unwrap();
    let r = pearson_correlation(floquet.exact().unwrap(), &stats.mean).unwrap();
    assert!((r - 0.9622).abs() < 1e-3);
}

#[test]
fn classification_table_order() {
    let exp = experiment();
    let rows = classification_table(&exp.models).unwrap();
    let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(
        labels,
        [
            "KI N=20",
            "KI N=12",
            "KI N=8",
            "KI N=4",
            "SYK N=4 (9s)",
            "Floquet N=4",
            "Integrable N=4",
        ]
    );
    assert!(
        rows.windows(2)
            .all(|w| w[0].omega_hardware.omega <= w[1].omega_hardware.omega)
    );

    let regimes: Vec<Regime> = rows.iter().map(|r| r.regime).collect();
    assert_eq!(
        regimes,
        [
            Regime::CompleteScrambling,
            Regime::CompleteScrambling,
            Regime::CompleteScrambling,
            Regime::StrongScrambling,
            Regime::Intermediate,
            Regime::Intermediate,
            Regime::NoScrambling,
        ]
    );
    // Floquet exact Ω sits just above 0.35; hardware lands one band lower.
    assert_eq!(rows[5].regime_exact, Some(Regime::WeakScrambling));
    assert_eq!(rows[5].regimes_agree(), Some(false));
}
