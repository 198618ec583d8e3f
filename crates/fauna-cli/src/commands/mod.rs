pub mod check;
pub mod run;
pub mod species;

use std::path::Path;

use colored::Colorize;
use fauna_sim::{SimConfig, Simulation};

/// Build a simulation from an optional definitions file.
///
/// Parse warnings and catalog fallback go to stderr so stdout stays
/// machine-comparable across runs.
fn load_simulation(config: SimConfig, defs: Option<&Path>) -> Result<Simulation, String> {
    let sim = match defs {
        Some(path) => Simulation::from_definitions(config, path),
        None => Simulation::new(config),
    }
    .map_err(|e| format!("cannot start simulation: {e}"))?;

    for warning in sim.parse_warnings() {
        eprintln!("  {} {warning}", "warning:".yellow().bold());
    }
    if sim.used_fallback() && defs.is_some() {
        eprintln!(
            "  {}",
            "definitions unusable, using the built-in catalog".yellow()
        );
    }
    Ok(sim)
}
