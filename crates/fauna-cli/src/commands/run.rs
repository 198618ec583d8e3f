use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use fauna_core::{FoodKind, Pantry, SimulationFocus, StructureRegistry, Vec2, WorldClock};
use fauna_sim::{DemoWorld, SimConfig, SimEventKind};

/// How many of the newest events the non-quiet report shows.
const EVENT_TAIL: usize = 15;

pub fn run(
    defs: Option<&Path>,
    seed: u64,
    ticks: u64,
    capacity: usize,
    quiet: bool,
) -> Result<(), String> {
    let config = SimConfig::default()
        .with_seed(seed)
        .with_pool_capacity(capacity)
        .with_max_events(500);
    let mut sim = super::load_simulation(config, defs)?;

    let mut world = DemoWorld::standard();
    world.seed_occupants(sim.registry(), 2);
    let seeded = sim.populate(&world.terrain, &world.structures);
    let focus = SimulationFocus::new(Vec2::new(24.0, 24.0), 24.0);

    let mut deaths = 0;
    let mut births = 0;
    for _ in 0..ticks {
        let summary = sim.tick(
            &mut world.terrain,
            &mut world.structures,
            &mut world.pantry,
            focus,
        );
        deaths += summary.deaths;
        births += summary.births;
    }

    // Header
    println!(
        "  {} {}",
        "Fauna demo world".bold(),
        format!("({ticks} ticks, seed={seed})").dimmed()
    );
    println!(
        "  {} reservations seeded, {} actors active, {} events logged",
        seeded.scheduled,
        sim.pool().len(),
        sim.events().len()
    );
    println!(
        "  day {}, {}; {births} born, {deaths} died",
        sim.clock().day_count(),
        if sim.clock().is_night() {
            "night"
        } else {
            "daylight"
        },
    );
    println!();

    // Event tail
    if !quiet {
        println!("  {}", "Latest Events".bold().underline());
        println!();
        for event in sim.events().recent(EVENT_TAIL) {
            let tick_label = format!("[tick {:>4}]", event.tick).dimmed();
            let desc = colorize_event(&event.kind, &event.description);
            println!("  {tick_label} {desc}");
        }
        if sim.events().is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    }

    // Population table
    println!("  {}", "Population".bold().underline());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Species", "Category", "Active", "Dormant", "Hunger"]);

    for def in sim.registry().iter() {
        let active: Vec<_> = sim
            .pool()
            .iter()
            .filter(|(_, a)| a.species == def.id)
            .map(|(_, a)| a.hunger_fraction(def))
            .collect();
        let dormant = sim
            .reservations()
            .iter()
            .filter(|(_, r)| r.species == def.id && !r.is_active())
            .count();
        if active.is_empty() && dormant == 0 {
            continue;
        }

        let hunger = if active.is_empty() {
            "--".to_string()
        } else {
            let mean = active.iter().sum::<f32>() / active.len() as f32;
            format_hunger_bar(mean)
        };
        table.add_row(vec![
            def.display_name.clone(),
            def.category.clone(),
            active.len().to_string(),
            dormant.to_string(),
            hunger,
        ]);
    }

    println!("{table}");
    println!();

    // Pantry stocks across all structures
    let mut produce = 0.0_f32;
    let mut meat = 0.0_f32;
    for info in world.structures.structures() {
        produce += world.pantry.stored(info.id, FoodKind::Produce);
        meat += world.pantry.stored(info.id, FoodKind::Meat);
    }
    if produce > 0.0 || meat > 0.0 {
        println!("  Pantry stocks: {produce:.0} produce, {meat:.0} meat");
        println!();
    }

    Ok(())
}

fn colorize_event(kind: &SimEventKind, description: &str) -> colored::ColoredString {
    match kind {
        SimEventKind::Died { .. } => description.red().bold(),
        SimEventKind::Hunted { .. } | SimEventKind::Enraged { .. } => description.red(),
        SimEventKind::Starving { .. } | SimEventKind::SpeciesRejected { .. } => {
            description.yellow()
        }
        SimEventKind::Born { .. } => description.green().bold(),
        SimEventKind::Gathered { .. } => description.green(),
        SimEventKind::Activated { .. } | SimEventKind::Hibernated { .. } => description.blue(),
        SimEventKind::PopulationSeeded { .. } => description.cyan(),
    }
}

fn format_hunger_bar(frac: f32) -> String {
    let pct = (frac * 100.0) as u32;
    let filled = (frac * 10.0).round() as usize;
    let empty = 10_usize.saturating_sub(filled);
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(empty));

    if frac <= 0.15 {
        format!("[{}] {:>3}%", bar.red(), pct)
    } else if frac <= 0.4 {
        format!("[{}] {:>3}%", bar.yellow(), pct)
    } else {
        format!("[{}] {:>3}%", bar.green(), pct)
    }
}
