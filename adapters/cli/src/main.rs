#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs an interactive Lawn Defence battle.
//!
//! Each prompt covers one second of battle: pick a plant and a cell, or let
//! time pass, then watch the events and the rendered field. The battle ends
//! on defeat or when the session length runs out.

use std::{
    collections::BTreeMap,
    io::{self, BufRead, Lines, StdinLock, Write},
    path::PathBuf,
};

use anyhow::{ensure, Context, Result};
use clap::Parser;

use lawn_defence_core::{
    Catalog, CellCoord, Defeat, Event, PlantId, PlantKindId, SpawnDrop, Sun, ZombieId,
    ZombieKindId, FIRST_PLANT_COLUMN,
};
use lawn_defence_engine::{roster, Action, Simulation, SimulationConfig};
use lawn_defence_world::query;

mod roster_file;

/// Command-line options for a Lawn Defence session.
#[derive(Debug, Parser)]
#[command(name = "lawn-defence", about = "Interactive lane defence battle")]
struct Args {
    /// Number of parallel lanes.
    #[arg(long, default_value_t = 5)]
    lanes: u32,

    /// Number of columns per lane, including the home and mower columns.
    #[arg(long, default_value_t = 11)]
    columns: u32,

    /// Sun balance the battle starts with.
    #[arg(long, default_value_t = 150)]
    sun: u32,

    /// Maximum number of zombies a single lane may hold.
    #[arg(long, default_value_t = 4)]
    lane_capacity: u32,

    /// Per-second spawn probability once the opening window has passed.
    #[arg(long, default_value_t = 0.2)]
    spawn_chance: f64,

    /// Disable the periodic falling sun.
    #[arg(long)]
    no_sky_drops: bool,

    /// Seed for every random stream of the battle.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Seconds the session runs unless the battle ends first.
    #[arg(long, default_value_t = 60)]
    session_length: u32,

    /// Path to a JSON roster replacing the built-in one.
    #[arg(long)]
    roster: Option<PathBuf>,
}

/// Entry point for the Lawn Defence command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    ensure!(
        args.lanes >= 1 && args.columns >= 3,
        "the field needs at least one lane and three columns"
    );

    let catalog = match &args.roster {
        Some(path) => roster_file::load(path)
            .with_context(|| format!("loading roster from {}", path.display()))?,
        None => roster::standard(),
    };

    let config = SimulationConfig {
        lanes: args.lanes,
        columns: args.columns,
        starting_sun: Sun::new(args.sun),
        lane_capacity: args.lane_capacity,
        spawn_chance: args.spawn_chance,
        sky_drops: !args.no_sky_drops,
        seed: args.seed,
    };
    let mut simulation = Simulation::new(config, catalog);

    run_session(&mut simulation, args.session_length)
}

fn run_session(simulation: &mut Simulation, session_length: u32) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock().lines();
    let mut narrator = Narrator::default();

    println!("{}", query::welcome_banner(simulation.world()));
    print!("{}", simulation.render());

    for _ in 0..session_length {
        let Some(action) = prompt_action(&mut input, simulation)? else {
            break;
        };

        let mut events = Vec::new();
        let outcome = simulation.step(action, &mut events);
        narrator.narrate(&events, simulation.catalog());
        print!("{}", simulation.render());
        if outcome.done {
            break;
        }
    }

    println!(
        "final sun: {}",
        query::sun_balance(simulation.world()).get()
    );
    Ok(())
}

fn prompt_action(
    input: &mut Lines<StdinLock<'_>>,
    simulation: &Simulation,
) -> Result<Option<Action>> {
    let catalog = simulation.catalog();
    let plant_count = catalog.plants().len() as u32;

    println!("available plants:");
    for (index, kind) in catalog.plants().iter().enumerate() {
        println!("  {}. {} ({} sun)", index + 1, kind.name, kind.cost.get());
    }
    println!("  {}. skip and let time pass", plant_count + 1);

    let Some(choice) = read_number(input, "select: ")? else {
        return Ok(None);
    };
    if choice == plant_count + 1 {
        return Ok(Some(Action::Wait));
    }
    if choice == 0 || choice > plant_count {
        println!("that choice is not on the list");
        return Ok(Some(Action::Wait));
    }

    let layout = query::layout(simulation.world());
    let Some(lane) = read_number(input, &format!("lane (1-{}): ", layout.lanes()))? else {
        return Ok(None);
    };
    let column_prompt = format!(
        "column ({}-{}): ",
        FIRST_PLANT_COLUMN + 1,
        layout.columns()
    );
    let Some(column) = read_number(input, &column_prompt)? else {
        return Ok(None);
    };
    let (Some(lane), Some(column)) = (lane.checked_sub(1), column.checked_sub(1)) else {
        println!("lanes and columns are numbered from 1");
        return Ok(Some(Action::Wait));
    };

    Ok(Some(Action::Place {
        kind: PlantKindId::new(choice - 1),
        cell: CellCoord::new(lane, column),
    }))
}

/// Prompts for one number; `None` means the input stream ended. Lines that
/// do not parse read as 0, which every caller treats as an invalid pick.
fn read_number(input: &mut Lines<StdinLock<'_>>, prompt: &str) -> Result<Option<u32>> {
    print!("{prompt}");
    io::stdout().flush().context("flushing the prompt")?;

    let Some(line) = input.next() else {
        return Ok(None);
    };
    let line = line.context("reading from standard input")?;
    Ok(Some(line.trim().parse::<u32>().unwrap_or(0)))
}

/// Projects engine events into battle narration, remembering unit names so
/// later events can mention them.
#[derive(Default)]
struct Narrator {
    plants: BTreeMap<PlantId, String>,
    zombies: BTreeMap<ZombieId, String>,
}

impl Narrator {
    fn narrate(&mut self, events: &[Event], catalog: &Catalog) {
        for event in events {
            if let Some(line) = self.line(event, catalog) {
                println!("{line}");
            }
        }
    }

    fn line(&mut self, event: &Event, catalog: &Catalog) -> Option<String> {
        match event {
            Event::PlantPlaced {
                plant,
                kind,
                cell,
                balance,
            } => {
                let name = plant_name(catalog, *kind);
                let line = format!(
                    "placed {name} at lane {}, column {} ({} sun left)",
                    cell.lane() + 1,
                    cell.column() + 1,
                    balance.get()
                );
                let _ = self.plants.insert(*plant, name);
                Some(line)
            }
            Event::PlacementRejected { kind, cell, reason } => Some(format!(
                "could not place {} at lane {}, column {}: {reason}",
                plant_name(catalog, *kind),
                cell.lane() + 1,
                cell.column() + 1
            )),
            Event::SunProduced { plant, amount, .. } => {
                let name = self
                    .plants
                    .get(plant)
                    .map(String::as_str)
                    .unwrap_or("a plant");
                Some(format!("{name} produced {} sun", amount.get()))
            }
            Event::SunCollected { amount, balance } => Some(format!(
                "collected {} falling sun, balance {}",
                amount.get(),
                balance.get()
            )),
            Event::ZombieSpawned { zombie, kind, cell } => {
                let name = zombie_name(catalog, *kind);
                let line = format!(
                    "{name} shambles into lane {} at column {}",
                    cell.lane() + 1,
                    cell.column() + 1
                );
                let _ = self.zombies.insert(*zombie, name);
                Some(line)
            }
            Event::SpawnDropped { kind, lane, reason } => match reason {
                SpawnDrop::LaneFull => Some(format!(
                    "lane {} is full and cannot spawn more zombies",
                    lane + 1
                )),
                SpawnDrop::EntryBlocked => Some(format!(
                    "{} was blocked at the entry of lane {}",
                    zombie_name(catalog, *kind),
                    lane + 1
                )),
            },
            Event::ZombieStepped { zombie, to, .. } => {
                let name = self
                    .zombies
                    .get(zombie)
                    .map(String::as_str)
                    .unwrap_or("a zombie");
                Some(format!(
                    "{name} advanced to column {} in lane {}",
                    to.column() + 1,
                    to.lane() + 1
                ))
            }
            Event::ZombieFelled { zombie, cell } => {
                let name = self
                    .zombies
                    .get(zombie)
                    .map(String::as_str)
                    .unwrap_or("a zombie");
                Some(format!(
                    "{name} fell in lane {}; its corpse still blocks the cell",
                    cell.lane() + 1
                ))
            }
            Event::ZombieDestroyed { zombie, cell } => {
                let name = self
                    .zombies
                    .remove(zombie)
                    .unwrap_or_else(|| "a zombie".to_owned());
                Some(format!("{name} was destroyed in lane {}", cell.lane() + 1))
            }
            Event::MowerFired { lane, cleared } => Some(format!(
                "the mower in lane {} ran down {cleared} zombies",
                lane + 1
            )),
            Event::BattleEnded { defeat } => match defeat {
                Defeat::HomeBreached { lane } => Some(format!(
                    "defeat: a zombie breached the home in lane {}",
                    lane + 1
                )),
                Defeat::LaneOverrun { lane } => Some(format!(
                    "defeat: lane {} was overrun with no mower left",
                    lane + 1
                )),
            },
            Event::TimeAdvanced { .. } | Event::ZombieStruck { .. } => None,
        }
    }
}

fn plant_name(catalog: &Catalog, kind: PlantKindId) -> String {
    catalog
        .plant(kind)
        .map(|kind| kind.name.clone())
        .unwrap_or_else(|| "unknown plant".to_owned())
}

fn zombie_name(catalog: &Catalog, kind: ZombieKindId) -> String {
    catalog
        .zombie(kind)
        .map(|kind| kind.name.clone())
        .unwrap_or_else(|| "unknown zombie".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    use lawn_defence_core::GameTime;

    #[test]
    fn dropped_spawns_reach_the_narration() {
        let catalog = roster::standard();
        let mut narrator = Narrator::default();

        let full = narrator.line(
            &Event::SpawnDropped {
                kind: ZombieKindId::new(0),
                lane: 2,
                reason: SpawnDrop::LaneFull,
            },
            &catalog,
        );
        assert_eq!(
            full.as_deref(),
            Some("lane 3 is full and cannot spawn more zombies")
        );

        let blocked = narrator.line(
            &Event::SpawnDropped {
                kind: ZombieKindId::new(0),
                lane: 0,
                reason: SpawnDrop::EntryBlocked,
            },
            &catalog,
        );
        assert_eq!(
            blocked.as_deref(),
            Some("Walker was blocked at the entry of lane 1")
        );
    }

    #[test]
    fn narration_recalls_names_and_skips_clock_ticks() {
        let catalog = roster::standard();
        let mut narrator = Narrator::default();

        let silent = narrator.line(
            &Event::TimeAdvanced {
                now: GameTime::new(3),
            },
            &catalog,
        );
        assert_eq!(silent, None);

        let zombie = ZombieId::new(9);
        let _ = narrator.line(
            &Event::ZombieSpawned {
                zombie,
                kind: ZombieKindId::new(1),
                cell: CellCoord::new(0, 10),
            },
            &catalog,
        );
        let farewell = narrator.line(
            &Event::ZombieDestroyed {
                zombie,
                cell: CellCoord::new(0, 4),
            },
            &catalog,
        );
        assert_eq!(
            farewell.as_deref(),
            Some("Conehead was destroyed in lane 1")
        );
    }
}
