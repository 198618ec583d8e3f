use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use fauna_sim::SimConfig;

pub fn run(defs: Option<&Path>) -> Result<(), String> {
    let sim = super::load_simulation(SimConfig::default(), defs)?;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Id", "Species", "Category", "Traits", "HP", "Speed", "AI",
    ]);

    for def in sim.registry().iter() {
        let traits = if def.traits.is_empty() {
            "—".to_string()
        } else {
            def.traits.join(", ")
        };

        let mut ai = Vec::new();
        if def.can_hunt {
            ai.push("hunt");
        }
        if def.can_gather {
            ai.push("gather");
        }
        if def.can_reproduce {
            ai.push("breed");
        }
        let ai = if ai.is_empty() {
            "—".to_string()
        } else {
            ai.join(", ")
        };

        table.add_row(vec![
            def.id.0.to_string(),
            def.display_name.clone(),
            def.category.clone(),
            traits,
            format!("{:.0}", def.max_hp),
            format!("{:.1}", def.max_speed),
            ai,
        ]);
    }

    println!("{table}");
    println!();
    println!(
        "  {} species, {} spawn rules",
        sim.registry().len(),
        sim.registry().rules().len()
    );

    Ok(())
}
