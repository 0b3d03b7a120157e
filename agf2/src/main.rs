//! AGF2 Calculation Command-Line Interface
//!
//! This is the main entry point for running unrestricted AGF2 calculations
//! from a YAML configuration and a YAML integral file.

use agf2::{load_integrals, Uagf2};
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use std::io::stdout;
use std::path::{Path, PathBuf};
use tracing::info;

mod config;
mod io;

use config::{Args, Config};
use io::{print_results, setup_output};

/// Integral paths in the configuration are relative to the configuration file.
fn resolve_integrals(config_file: &str, integrals: &str) -> PathBuf {
    let path = Path::new(integrals);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    Path::new(config_file)
        .parent()
        .map(|dir| dir.join(path))
        .unwrap_or_else(|| path.to_path_buf())
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_output(args.output.as_deref());

    info!("Reading configuration from: {}", args.config_file);
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    let mut config: Config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();

    if let Some(max_cycle) = args.max_cycle {
        config.agf2_params.max_cycle = Some(max_cycle);
        info!("Overriding max_cycle with: {}", max_cycle);
    }
    if let Some(conv_tol) = args.conv_tol {
        config.agf2_params.conv_tol = Some(conv_tol);
        info!("Overriding conv_tol with: {}", conv_tol);
    }
    if let Some(max_memory) = args.max_memory {
        config.agf2_params.max_memory = Some(max_memory);
        info!("Overriding max_memory with: {} MB", max_memory);
    }
    if let Some(nroots) = args.nroots {
        config.nroots = Some(nroots);
    }

    info!("Configuration loaded:\n{:?}", config);

    let integrals = match &args.integrals {
        Some(path) => PathBuf::from(path),
        None => resolve_integrals(&args.config_file, &config.integrals),
    };
    let eris = load_integrals(&integrals)
        .wrap_err_with(|| format!("Unable to load integrals from {}", integrals.display()))?;
    info!(
        "Orbitals: {} alpha, {} beta; electrons: {} alpha, {} beta",
        eris.nmo[0], eris.nmo[1], eris.nocc[0], eris.nocc[1]
    );

    let mut agf2 = Uagf2::new(eris, config.agf2_params.to_options())
        .wrap_err("Unable to set up the AGF2 calculation")?;
    let results = agf2.kernel().wrap_err("AGF2 calculation failed")?;

    let nroots = config.nroots();
    let ip = agf2.get_ip(&results.gf, nroots);
    let ea = agf2.get_ea(&results.gf, nroots);
    print_results(&mut stdout(), &results, &ip, &ea)?;

    Ok(())
}
