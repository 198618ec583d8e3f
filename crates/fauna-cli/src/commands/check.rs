use std::path::Path;

use colored::Colorize;
use fauna_core::load_definitions;

pub fn run(defs: &Path) -> Result<(), String> {
    let (file, warnings) = load_definitions(defs).map_err(|e| e.to_string())?;

    for warning in &warnings {
        println!("  {} {warning}", "warning:".yellow().bold());
    }
    if warnings.is_empty() {
        println!("  All checks passed for '{}'.", defs.display());
    }
    println!(
        "  {} species, {} spawn rules, {} warning{}",
        file.species.len(),
        file.rules.len(),
        warnings.len(),
        if warnings.len() == 1 { "" } else { "s" },
    );

    Ok(())
}
