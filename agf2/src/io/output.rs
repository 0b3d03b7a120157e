//! Output formatting and logging utilities

use agf2::{Agf2Results, Excitation};
use color_eyre::eyre::Result;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Registry,
};

/// Time formatter printing the wall time since logging was set up
#[derive(Clone, Copy)]
struct ElapsedTimer(Instant);

impl FormatTime for ElapsedTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let elapsed = self.0.elapsed().as_secs();
        write!(w, "{:02}:{:02}:{:02}", elapsed / 3600, (elapsed / 60) % 60, elapsed % 60)
    }
}

fn stdout_layer<S>(timer: ElapsedTimer) -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    layer()
        .with_writer(std::io::stdout)
        .with_timer(timer)
        .with_ansi(true)
}

/// Setup output logging to file or stdout.
///
/// Falls back to stdout when the log file cannot be created.
pub fn setup_output(output_path: Option<&str>) {
    let timer = ElapsedTimer(Instant::now());
    let Some(path) = output_path else {
        Registry::default().with(stdout_layer(timer)).init();
        info!("Output will be printed to stdout");
        return;
    };
    match File::create(path) {
        Ok(log) => {
            let file_layer = layer()
                .with_writer(log)
                .with_timer(timer)
                .with_ansi(false);
            Registry::default().with(file_layer).init();
            info!("Output will be written to: {}", path);
        }
        Err(err) => {
            Registry::default().with(stdout_layer(timer)).init();
            warn!("Could not create output file {}: {}", path, err);
        }
    }
}

fn print_excitations<W: Write>(writer: &mut W, title: &str, states: &[Excitation]) -> Result<()> {
    writeln!(writer, "{}:", title)?;
    for (k, state) in states.iter().enumerate() {
        writeln!(
            writer,
            "  {:>3}  {:>5}  {:>14.8}  weight {:.6}",
            k + 1,
            state.spin.label(),
            state.energy,
            state.coupling.norm_squared()
        )?;
    }
    Ok(())
}

/// Print the final energies and the leading quasi-particle states
pub fn print_results<W: Write>(
    writer: &mut W,
    results: &Agf2Results,
    ip: &[Excitation],
    ea: &[Excitation],
) -> Result<()> {
    let status = if results.converged {
        "converged"
    } else {
        "not converged"
    };
    writeln!(writer, "AGF2 {} after {} iterations", status, results.cycles)?;
    writeln!(writer, "  E(HF)        = {:>18.10} au", results.e_hf)?;
    writeln!(writer, "  E(MP2)       = {:>18.10} au", results.e_hf + results.e_mp2)?;
    writeln!(writer, "  E(1b)        = {:>18.10} au", results.e_1b)?;
    writeln!(writer, "  E(2b)        = {:>18.10} au", results.e_2b)?;
    writeln!(writer, "  E(AGF2)      = {:>18.10} au", results.e_tot)?;
    writeln!(writer, "  E_corr(AGF2) = {:>18.10} au", results.e_corr)?;
    print_excitations(writer, "Ionization energies", ip)?;
    print_excitations(writer, "Electron affinities", ea)?;
    Ok(())
}
