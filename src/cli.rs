use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dcekit", version, about = "Population AIF fitting and ROC comparison for DCE-MRI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract, aggregate and fit the population AIF.
    Aif(AifArgs),
    /// Average LOPO ROC curves and compare experiments.
    Roc(RocArgs),
}

#[derive(Debug, Args)]
pub struct AifArgs {
    #[arg(long, help = "TOML config (built-in defaults when omitted)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Write the fit here (.json or .csv)")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Override the patient data root")]
    pub data_root: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RocArgs {
    #[arg(long, help = "TOML config (built-in defaults when omitted)")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = false, help = "Skip the SVG plots")]
    pub no_plot: bool,
}
