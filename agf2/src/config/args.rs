//! Command-line argument parsing for AGF2 calculations

use clap::Parser;

/// Unrestricted AGF2 calculation with YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override the integral file named in the configuration
    #[arg(short, long)]
    pub integrals: Option<String>,

    /// Override maximum AGF2 iterations
    #[arg(long)]
    pub max_cycle: Option<usize>,

    /// Override energy convergence threshold
    #[arg(long)]
    pub conv_tol: Option<f64>,

    /// Override memory budget for the quasi-particle integrals (MB)
    #[arg(long)]
    pub max_memory: Option<f64>,

    /// Number of ionization energies and electron affinities to print
    #[arg(long)]
    pub nroots: Option<usize>,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,
}
