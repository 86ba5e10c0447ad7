//! Optiloss command-line interface.
//!
//! Run optical-loss analyses from TOML job files:
//! ```sh
//! optiloss run job.toml
//! optiloss validate job.toml
//! optiloss materials [job.toml]
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use optiloss_materials::MaterialSource;

#[derive(Parser)]
#[command(name = "optiloss")]
#[command(about = "Optiloss: thin-film optical loss and photocurrent analysis")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an analysis from a TOML job file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Load and check a job file without running the solver.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// List built-in materials and those declared in a job file.
    Materials {
        /// Optional job file whose `[[material]]` entries are listed too.
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("Optiloss");
            println!("========");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let analysis = runner::run_analysis(&job)?;

            println!();
            print!("{}", runner::format_report(&analysis.report));
            println!(
                "Reference ({}, all photons collected): {:.2} mA/cm²",
                analysis.report.spectrum, analysis.report.reference_current
            );
            println!();

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_spectra {
                runner::write_spectra_csv(&analysis, &out_dir.join("spectra.csv"), &job)?;
            }
            runner::write_report_csv(&analysis.report, &out_dir.join("photocurrent.csv"))?;
            if job.output.save_json {
                runner::write_json(&analysis, &out_dir.join("results.json"))?;
            }

            println!("Analysis complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let prepared = runner::prepare(&job)?;
            println!(
                "Configuration is valid: {} ({} layers, {} wavelengths, spectrum '{}')",
                config.display(),
                prepared.layers.len(),
                prepared.wavelengths.len(),
                prepared.spectrum.name()
            );
            Ok(())
        }
        Commands::Materials { config } => {
            let library = match &config {
                Some(path) => runner::build_library(&config::load_config(path)?)?,
                None => optiloss_materials::MaterialLibrary::default(),
            };
            println!("Available materials:");
            println!();
            for (id, source) in library.entries() {
                match source {
                    MaterialSource::Builtin => match library.load(id) {
                        Ok(material) => {
                            let (lo, hi) = material.wavelength_range();
                            println!("  {:<12} {}, {:.0}–{:.0} nm", id, material.name(), lo, hi);
                        }
                        Err(e) => println!("  {:<12} unavailable: {}", id, e),
                    },
                    other => println!("  {:<12} {}", id, other),
                }
            }
            Ok(())
        }
    }
}
