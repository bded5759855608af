#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Battle driver for Lawn Defence.
//!
//! The [`Simulation`] wires the battlefield, the spawning system, and the sky
//! drop scheduler into the fixed per-second loop drivers interact with: one
//! [`Action`] in, one tick of battle out, plus a flattened [`Observation`]
//! and a terminal flag. Integer-indexed drivers translate through
//! [`ActionSpace`].

use std::{collections::BTreeMap, fmt::Write as _, ops::RangeInclusive};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use lawn_defence_core::{
    Catalog, CellContent, CellCoord, Command, Defeat, Event, GameTime, PlantId, PlantKindId,
    SpawnRequest, Sun, ZombieId, ZombieKindId, FIRST_PLANT_COLUMN, OPENING_WINDOW,
};
use lawn_defence_system_spawning::{Config as SpawnConfig, Spawning};
use lawn_defence_world::{self as world, query, BattleConfig, FieldLayout, World};

pub mod roster;

/// Sun credited by every sky drop.
const SKY_DROP_AMOUNT: Sun = Sun::new(25);

/// Seconds between consecutive sky drops, drawn anew after each drop.
const SKY_DROP_DELAY_SECS: RangeInclusive<u32> = 8..=12;

const SPAWNING_SEED_OFFSET: u64 = 0x9e37_79b9_97f4_a7c1;
const SKY_DROP_SEED_OFFSET: u64 = 0x6a09_e667_f3bc_c909;

/// Cell code observations use for a plant.
const PLANT_CODE: f32 = 1.0;

/// Cell code observations use for a zombie, walking or felled.
const ZOMBIE_CODE: f32 = 2.0;

/// Configuration for a full simulation, covering the battlefield and every
/// scheduler layered on top of it.
#[derive(Clone, Copy, Debug)]
pub struct SimulationConfig {
    /// Number of parallel lanes.
    pub lanes: u32,
    /// Number of columns per lane, including the home and mower columns.
    pub columns: u32,
    /// Sun balance a fresh battle starts with.
    pub starting_sun: Sun,
    /// Maximum number of zombies a single lane may hold.
    pub lane_capacity: u32,
    /// Per-tick spawn probability once the opening window has passed.
    pub spawn_chance: f64,
    /// Whether ambient sky drops periodically credit the sun pool.
    pub sky_drops: bool,
    /// Seed every random stream of the simulation derives from.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            lanes: 5,
            columns: 11,
            starting_sun: Sun::new(150),
            lane_capacity: 4,
            spawn_chance: 0.2,
            sky_drops: true,
            seed: 0,
        }
    }
}

/// One driver decision for a single tick of battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Attempt to place a plant before time advances.
    Place {
        /// Catalog kind to place.
        kind: PlantKindId,
        /// Cell to place it on.
        cell: CellCoord,
    },
    /// Let time advance without placing anything.
    Wait,
}

/// Bijection between integer action indices and [`Action`] values.
///
/// Placements occupy indices `0..size - 1` in kind-major, then lane-major
/// order over the plantable columns; the final index waits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionSpace {
    lanes: u32,
    plantable: u32,
    kinds: u32,
}

impl ActionSpace {
    /// Creates the action space for the provided field layout and kind count.
    #[must_use]
    pub const fn new(layout: FieldLayout, kinds: u32) -> Self {
        Self {
            lanes: layout.lanes(),
            plantable: layout.plantable_columns(),
            kinds,
        }
    }

    /// Total number of valid action indices.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.kinds
            .saturating_mul(self.lanes)
            .saturating_mul(self.plantable)
            .saturating_add(1)
    }

    /// Decodes an action index, or `None` when the index is out of range.
    #[must_use]
    pub fn decode(&self, index: u32) -> Option<Action> {
        let per_kind = self.lanes.saturating_mul(self.plantable);
        let placements = self.kinds.saturating_mul(per_kind);
        if index == placements {
            return Some(Action::Wait);
        }
        if index > placements {
            return None;
        }
        let kind = index / per_kind;
        let remainder = index % per_kind;
        let lane = remainder / self.plantable;
        let column = remainder % self.plantable + FIRST_PLANT_COLUMN;
        Some(Action::Place {
            kind: PlantKindId::new(kind),
            cell: CellCoord::new(lane, column),
        })
    }

    /// Encodes an action back into its index, or `None` when the action does
    /// not fit this space.
    #[must_use]
    pub fn encode(&self, action: Action) -> Option<u32> {
        let per_kind = self.lanes.saturating_mul(self.plantable);
        match action {
            Action::Wait => Some(self.kinds.saturating_mul(per_kind)),
            Action::Place { kind, cell } => {
                if kind.get() >= self.kinds || cell.lane() >= self.lanes {
                    return None;
                }
                let column = cell.column().checked_sub(FIRST_PLANT_COLUMN)?;
                if column >= self.plantable {
                    return None;
                }
                Some(kind.get() * per_kind + cell.lane() * self.plantable + column)
            }
        }
    }
}

/// Flattened battlefield snapshot handed to drivers after every step.
///
/// Cells appear in lane-major order coded as `0.0` empty, `1.0` plant, and
/// `2.0` zombie, with the sun balance appended as the final element.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    values: Vec<f32>,
}

impl Observation {
    /// Raw observation values.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Consumes the observation, yielding the raw vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }
}

/// Result of advancing the simulation by one action.
#[derive(Clone, Debug)]
pub struct StepOutcome {
    /// Observation captured after the tick resolved.
    pub observation: Observation,
    /// Whether the battle has reached a terminal state.
    pub done: bool,
}

/// Schedules the ambient sun that periodically falls from the sky.
#[derive(Clone, Debug)]
struct SkyDrops {
    enabled: bool,
    rng: ChaCha8Rng,
    next_at: GameTime,
}

impl SkyDrops {
    fn new(enabled: bool, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let first = rng.gen_range(SKY_DROP_DELAY_SECS);
        Self {
            enabled,
            rng,
            next_at: GameTime::new(first),
        }
    }

    fn poll(&mut self, now: GameTime) -> Option<Sun> {
        if !self.enabled || now < self.next_at {
            return None;
        }
        let delay = self.rng.gen_range(SKY_DROP_DELAY_SECS);
        self.next_at = GameTime::new(self.next_at.get().saturating_add(delay));
        Some(SKY_DROP_AMOUNT)
    }
}

/// A complete battle plus the schedulers that drive it, stepped one second
/// at a time.
#[derive(Clone, Debug)]
pub struct Simulation {
    config: SimulationConfig,
    catalog: Catalog,
    world: World,
    spawning: Spawning,
    sky: SkyDrops,
    action_space: ActionSpace,
}

impl Simulation {
    /// Creates a simulation from the provided configuration and catalog.
    #[must_use]
    pub fn new(config: SimulationConfig, catalog: Catalog) -> Self {
        let world = World::new(battle_config(&config), catalog.clone());
        let spawning = Spawning::new(spawning_config(&config));
        let sky = SkyDrops::new(
            config.sky_drops,
            config.seed.wrapping_add(SKY_DROP_SEED_OFFSET),
        );
        let kinds = catalog.plants().len() as u32;
        let action_space = ActionSpace::new(FieldLayout::new(config.lanes, config.columns), kinds);
        Self {
            config,
            catalog,
            world,
            spawning,
            sky,
            action_space,
        }
    }

    /// Discards the running battle and starts a fresh one from the same
    /// configuration, returning the initial observation.
    pub fn reset(&mut self) -> Observation {
        self.world = World::new(battle_config(&self.config), self.catalog.clone());
        self.spawning = Spawning::new(spawning_config(&self.config));
        self.sky = SkyDrops::new(
            self.config.sky_drops,
            self.config.seed.wrapping_add(SKY_DROP_SEED_OFFSET),
        );
        self.observation()
    }

    /// Advances the battle by one second.
    ///
    /// The action resolves first; the battlefield then ticks, carrying the
    /// spawning system's proposal for the new second so it resolves ahead
    /// of the boundary sweep; the sky drop scheduler runs last. Every event
    /// raised along the way lands in `out_events`. Stepping a finished
    /// battle is a no-op that reports `done`.
    pub fn step(&mut self, action: Action, out_events: &mut Vec<Event>) -> StepOutcome {
        if query::outcome(&self.world).is_some() {
            return StepOutcome {
                observation: self.observation(),
                done: true,
            };
        }

        match action {
            Action::Place { kind, cell } => {
                world::apply(
                    &mut self.world,
                    Command::PlacePlant { kind, cell },
                    out_events,
                );
            }
            Action::Wait => {}
        }

        // the proposal is drawn for the second the tick is about to reach
        let upcoming = query::clock(&self.world).advanced();
        let mut proposals = Vec::new();
        self.spawning.handle(
            upcoming,
            query::catalog(&self.world),
            query::layout(&self.world).lanes(),
            &mut proposals,
        );
        let spawn = proposals.into_iter().find_map(|command| match command {
            Command::SpawnZombie { kind, lane } => Some(SpawnRequest { kind, lane }),
            _ => None,
        });
        world::apply(&mut self.world, Command::Tick { spawn }, out_events);

        if let Some(amount) = self.sky.poll(query::clock(&self.world)) {
            world::apply(&mut self.world, Command::CollectSun { amount }, out_events);
        }

        StepOutcome {
            observation: self.observation(),
            done: query::outcome(&self.world).is_some(),
        }
    }

    /// Captures the current flattened observation.
    #[must_use]
    pub fn observation(&self) -> Observation {
        let field = query::field_view(&self.world);
        let layout = query::layout(&self.world);
        let mut values = Vec::with_capacity(layout.cell_count() as usize + 1);
        for content in field.iter() {
            values.push(match content {
                CellContent::Empty => 0.0,
                CellContent::Plant(_) => PLANT_CODE,
                CellContent::Zombie(_) => ZOMBIE_CODE,
            });
        }
        values.push(query::sun_balance(&self.world).get() as f32);
        Observation { values }
    }

    /// Renders the battle as a printable text grid.
    #[must_use]
    pub fn render(&self) -> String {
        let plants: BTreeMap<PlantId, PlantKindId> = query::plant_view(&self.world)
            .iter()
            .map(|snapshot| (snapshot.id, snapshot.kind))
            .collect();
        let zombies: BTreeMap<ZombieId, (ZombieKindId, bool)> = query::zombie_view(&self.world)
            .iter()
            .map(|snapshot| (snapshot.id, (snapshot.kind, snapshot.walking)))
            .collect();

        let mut out = String::new();
        let _ = writeln!(
            out,
            "time {}s, sun {}",
            query::clock(&self.world).get(),
            query::sun_balance(&self.world).get()
        );

        let layout = query::layout(&self.world);
        let field = query::field_view(&self.world);
        for lane in 0..layout.lanes() {
            for column in 0..layout.columns() {
                match field.content(CellCoord::new(lane, column)) {
                    CellContent::Empty => out.push_str("[    ]"),
                    CellContent::Plant(plant) => {
                        let tag = plants
                            .get(&plant)
                            .and_then(|kind| self.catalog.plant(*kind))
                            .map(|kind| cell_tag(&kind.name))
                            .unwrap_or_default();
                        let _ = write!(out, "[{tag:<4}]");
                    }
                    CellContent::Zombie(zombie) => {
                        let (tag, walking) = zombies
                            .get(&zombie)
                            .and_then(|(kind, walking)| {
                                self.catalog
                                    .zombie(*kind)
                                    .map(|kind| (cell_tag(&kind.name), *walking))
                            })
                            .unwrap_or_default();
                        // felled corpses render lowercase so blocked lanes
                        // read differently from advancing ones
                        if walking {
                            let _ = write!(out, "[{tag:<4}]");
                        } else {
                            let lowered = tag.to_lowercase();
                            let _ = write!(out, "[{lowered:<4}]");
                        }
                    }
                }
            }
            out.push('\n');
        }

        if let Some(defeat) = query::outcome(&self.world) {
            let message = match defeat {
                Defeat::HomeBreached { lane } => format!("home breached in lane {lane}"),
                Defeat::LaneOverrun { lane } => format!("lane {lane} overrun"),
            };
            let _ = writeln!(out, "{message}");
        }
        out
    }

    /// Action space matching this simulation's field shape and catalog.
    #[must_use]
    pub fn action_space(&self) -> ActionSpace {
        self.action_space
    }

    /// Read-only access to the running battle for [`query`] calls.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Catalog the simulation was created with.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

fn battle_config(config: &SimulationConfig) -> BattleConfig {
    BattleConfig::new(
        config.lanes,
        config.columns,
        config.starting_sun,
        config.lane_capacity,
        config.seed,
    )
}

fn spawning_config(config: &SimulationConfig) -> SpawnConfig {
    SpawnConfig::new(
        OPENING_WINDOW,
        config.spawn_chance,
        config.seed.wrapping_add(SPAWNING_SEED_OFFSET),
    )
}

fn cell_tag(name: &str) -> String {
    name.chars().take(4).collect()
}
