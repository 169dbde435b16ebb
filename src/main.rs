use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dcekit::aif::model::PARAM_NAMES;
use dcekit::cli::{Cli, Commands};
use dcekit::config::{load_config, Config};
use dcekit::entry::{run_aif_pipeline, run_roc_pipeline};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Aif(args) => {
            let mut config = match &args.config {
                Some(path) => load_config(path)?,
                None => Config::default(),
            };
            if let Some(root) = args.data_root {
                config.aif.data_root = root;
            }
            if args.output.is_some() {
                config.aif.output = args.output;
            }

            let fit = run_aif_pipeline(&config.aif)?;
            tracing::info!(
                cost = fit.fit.cost,
                evaluations = fit.fit.evaluations,
                termination = %fit.fit.termination,
                "population AIF fitted"
            );
            for (name, value) in PARAM_NAMES.iter().zip(fit.fit.params.to_array()) {
                println!("{:>7} = {}", name, value);
            }
        }
        Commands::Roc(args) => {
            let mut config = match &args.config {
                Some(path) => load_config(path)?,
                None => Config::default(),
            };
            if args.no_plot {
                config.roc.plot = false;
            }

            for comparison in run_roc_pipeline(&config.roc)? {
                println!("{}", comparison.configuration);
                for (label, summary) in &comparison.methods {
                    println!(
                        "  {:<20} AUC = {:.3} ± {:.3}",
                        label.trim(),
                        summary.auc,
                        summary.auc_std
                    );
                }
            }
        }
    }

    Ok(())
}
