//! CLI for otoc: hardware OTOC runs against exact simulation.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "otoc")]
#[command(about = "otoc: does the hardware scramble the way the statevector says it should?")]
#[command(version = otoc_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full analysis: inventory, pointwise comparison, Ω table,
    /// key findings and the final scrambling classification.
    Report {
        /// Also write the report text to this file
        #[arg(long)]
        output: Option<String>,
    },

    /// Render the four publication figures as PNG and SVG.
    Figures {
        /// Directory the figures are written into (created if missing)
        #[arg(long, default_value = ".")]
        out_dir: String,

        /// Raster resolution for the PNG files
        #[arg(long, default_value = "300")]
        dpi: u32,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Report { output } => commands::report::run(output.as_deref()),
        Commands::Figures { out_dir, dpi } => {
            commands::figures::run(commands::figures::FiguresCommandConfig {
                out_dir: &out_dir,
                dpi,
            })
        }
    };

    let code = exit_code(&result);
    if code != 0 {
        std::process::exit(code);
    }
}

/// Log and print a failed command; nonzero means the process should exit with it.
fn exit_code(result: &commands::CommandResult) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_figures_defaults() {
        let cli = Cli::try_parse_from(["otoc", "figures"]).unwrap();
        match cli.command {
            Commands::Figures { out_dir, dpi } => {
                assert_eq!(out_dir, ".");
                assert_eq!(dpi, 300);
            }
            Commands::Report { .. } => panic!("expected figures"),
        }
    }

    #[test]
    fn test_report_output_flag() {
        let cli = Cli::try_parse_from(["otoc", "report", "--output", "out.txt"]).unwrap();
        match cli.command {
            Commands::Report { output } => assert_eq!(output.as_deref(), Some("out.txt")),
            Commands::Figures { .. } => panic!("expected report"),
        }
    }

    #[test]
    fn test_failed_command_exits_one() {
        assert_eq!(exit_code(&Ok(())), 0);
        assert_eq!(exit_code(&Err("failed to write out.txt".into())), 1);
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["otoc", "bench"]).is_err());
    }
}
