pub mod figures;
pub mod report;

use std::error::Error;

use otoc_core::Experiment;

/// Outcome of a subcommand; errors bubble up to `main` and exit 1.
pub type CommandResult = Result<(), Box<dyn Error>>;

/// Load the embedded campaign, failing fast on malformed tables.
pub fn load_experiment() -> Result<Experiment, Box<dyn Error>> {
    let experiment = Experiment::ibm_marrakesh()?;
    log::debug!(
        "{} on {}: {} models, {} hardware points",
        experiment.date,
        experiment.backend,
        experiment.models.len(),
        experiment.hardware_points()
    );
    Ok(experiment)
}

/// Format an optional value right-aligned, with `—` when absent.
pub fn fmt_opt(value: Option<f64>, width: usize, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:>width$.precision$}"),
        None => format!("{:>width$}", "—"),
    }
}

/// Format an optional value with an explicit sign, `—` when absent.
pub fn fmt_opt_signed(value: Option<f64>, width: usize, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:>+width$.precision$}"),
        None => format!("{:>width$}", "—"),
    }
}
