#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battlefield state management for Lawn Defence.
//!
//! The [`World`] owns the field grid, the sun pool, the battle clock, every
//! live unit instance, and the per-lane mowers. Drivers and systems mutate it
//! exclusively through [`apply`], which executes one [`Command`] and pushes
//! the resulting [`Event`]s, and read it back through the [`query`] module.

use std::{collections::BTreeMap, ops::RangeInclusive, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use lawn_defence_core::{
    Catalog, CellContent, CellCoord, Command, Defeat, Event, FieldError, GameTime, PlacementError,
    PlantId, PlantKindId, SpawnDrop, SpawnRequest, Sun, ZombieId, ZombieKindId,
    FIRST_PLANT_COLUMN, HOME_COLUMN, MOWER_COLUMN, WELCOME_BANNER,
};

use crate::{
    field::FieldGrid,
    units::{DamagePhase, PlantState, ZombieState},
};

mod field;
mod units;

/// Seconds a fresh producer waits before its first production, drawn once
/// per instance at placement.
const FIRST_PRODUCTION_DELAY_SECS: RangeInclusive<u64> = 20..=24;

/// Describes the lane and column layout of the battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldLayout {
    lanes: u32,
    columns: u32,
}

impl FieldLayout {
    /// Creates a new layout description.
    #[must_use]
    pub const fn new(lanes: u32, columns: u32) -> Self {
        Self { lanes, columns }
    }

    /// Number of parallel lanes.
    #[must_use]
    pub const fn lanes(&self) -> u32 {
        self.lanes
    }

    /// Number of columns per lane, including both boundary columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Total number of cells in the field.
    #[must_use]
    pub const fn cell_count(&self) -> u32 {
        self.lanes.saturating_mul(self.columns)
    }

    /// Number of columns plants may be placed on.
    #[must_use]
    pub const fn plantable_columns(&self) -> u32 {
        self.columns.saturating_sub(FIRST_PLANT_COLUMN)
    }
}

/// Configuration parameters required to construct a battlefield.
#[derive(Clone, Copy, Debug)]
pub struct BattleConfig {
    lanes: u32,
    columns: u32,
    starting_sun: Sun,
    lane_capacity: u32,
    rng_seed: u64,
}

impl BattleConfig {
    /// Creates a new configuration.
    ///
    /// Callers provide `lanes >= 1` and `columns >= 3` so that both boundary
    /// columns and at least one plantable column exist.
    #[must_use]
    pub const fn new(
        lanes: u32,
        columns: u32,
        starting_sun: Sun,
        lane_capacity: u32,
        rng_seed: u64,
    ) -> Self {
        Self {
            lanes,
            columns,
            starting_sun,
            lane_capacity,
            rng_seed,
        }
    }

    /// Number of parallel lanes.
    #[must_use]
    pub const fn lanes(&self) -> u32 {
        self.lanes
    }

    /// Number of columns per lane.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Sun balance a fresh battle starts with.
    #[must_use]
    pub const fn starting_sun(&self) -> Sun {
        self.starting_sun
    }

    /// Maximum number of zombies a single lane may hold.
    #[must_use]
    pub const fn lane_capacity(&self) -> u32 {
        self.lane_capacity
    }

    /// Seed for the battlefield's random stream.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

/// Authoritative state of a single battle.
#[derive(Clone, Debug)]
pub struct World {
    banner: &'static str,
    layout: FieldLayout,
    clock: GameTime,
    sun: Sun,
    field: FieldGrid,
    plants: BTreeMap<PlantId, PlantState>,
    zombies: BTreeMap<ZombieId, ZombieState>,
    next_plant_id: PlantId,
    next_zombie_id: ZombieId,
    recharge: BTreeMap<PlantKindId, GameTime>,
    mowers: Vec<bool>,
    lane_capacity: u32,
    outcome: Option<Defeat>,
    catalog: Catalog,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a new battle from the provided configuration and catalog.
    #[must_use]
    pub fn new(config: BattleConfig, catalog: Catalog) -> Self {
        debug_assert!(
            config.lanes >= 1 && config.columns >= 3,
            "battlefield needs at least one lane and three columns"
        );
        let layout = FieldLayout::new(config.lanes, config.columns);
        Self {
            banner: WELCOME_BANNER,
            layout,
            clock: GameTime::default(),
            sun: config.starting_sun,
            field: FieldGrid::new(config.lanes, config.columns),
            plants: BTreeMap::new(),
            zombies: BTreeMap::new(),
            next_plant_id: PlantId::new(0),
            next_zombie_id: ZombieId::new(0),
            recharge: BTreeMap::new(),
            mowers: vec![true; config.lanes as usize],
            lane_capacity: config.lane_capacity,
            outcome: None,
            catalog,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    fn place_plant(&mut self, kind_id: PlantKindId, cell: CellCoord, out_events: &mut Vec<Event>) {
        match self.try_place_plant(kind_id, cell, out_events) {
            Ok(()) => {}
            Err(reason) => out_events.push(Event::PlacementRejected {
                kind: kind_id,
                cell,
                reason,
            }),
        }
    }

    /// Single canonical placement path; every check happens before the first
    /// mutation so a rejection leaves no trace.
    fn try_place_plant(
        &mut self,
        kind_id: PlantKindId,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), PlacementError> {
        let Some(kind) = self.catalog.plant(kind_id) else {
            return Err(PlacementError::UnknownKind);
        };
        if !self.field.contains(cell) {
            return Err(PlacementError::OutOfBounds);
        }
        if cell.column() < FIRST_PLANT_COLUMN {
            return Err(PlacementError::ReservedColumn);
        }
        let Some(balance) = self.sun.debited(kind.cost) else {
            return Err(PlacementError::InsufficientSun);
        };
        if let Some(&last_placed) = self.recharge.get(&kind_id) {
            if self.clock.elapsed_since(last_placed) < kind.cooldown.effective(self.clock) {
                return Err(PlacementError::OnCooldown);
            }
        }

        let plant = self.next_plant_id;
        if let Err(error) = self.field.claim_plant(plant, cell) {
            return Err(match error {
                FieldError::Occupied => PlacementError::Occupied,
                FieldError::OutOfBounds | FieldError::SourceEmpty => PlacementError::OutOfBounds,
            });
        }

        // the cell claim succeeded, so the placement is committed
        self.sun = balance;
        self.next_plant_id = plant.next();
        let _ = self.recharge.insert(kind_id, self.clock);
        let first_delay = Duration::from_secs(self.rng.gen_range(FIRST_PRODUCTION_DELAY_SECS));
        let _ = self.plants.insert(
            plant,
            PlantState {
                kind: kind_id,
                cell,
                health: kind.health,
                planted_at: self.clock,
                last_production: None,
                first_delay,
            },
        );
        out_events.push(Event::PlantPlaced {
            plant,
            kind: kind_id,
            cell,
            balance,
        });
        Ok(())
    }

    fn tick(&mut self, spawn: Option<SpawnRequest>, out_events: &mut Vec<Event>) {
        self.clock = self.clock.advanced();
        out_events.push(Event::TimeAdvanced { now: self.clock });
        self.advance_zombies(out_events);
        self.run_production(out_events);
        // the boundary sweep sees the fresh spawn
        if let Some(request) = spawn {
            self.spawn_zombie(request.kind, request.lane, out_events);
        }
        self.resolve_boundaries(out_events);
    }

    fn advance_zombies(&mut self, out_events: &mut Vec<Event>) {
        // nearest-home first, so a cell vacated this tick frees up for the
        // zombie behind it without double-processing anyone
        let mut order: Vec<(CellCoord, ZombieId)> = self
            .zombies
            .iter()
            .map(|(id, state)| (state.cell, *id))
            .collect();
        order.sort_unstable();

        for (from, zombie_id) in order {
            let Some(state) = self.zombies.get(&zombie_id) else {
                continue;
            };
            let Some(kind) = self.catalog.zombie(state.kind) else {
                continue;
            };
            let stride = kind.stride;
            if !state.is_walking() || !state.ready_to_step(self.clock, stride) {
                continue;
            }
            let Some(to) = from.toward_home() else {
                continue;
            };

            match self.field.relocate(from, to) {
                Ok(()) => {
                    if let Some(state) = self.zombies.get_mut(&zombie_id) {
                        state.cell = to;
                        state.last_step = self.clock;
                    }
                    out_events.push(Event::ZombieStepped {
                        zombie: zombie_id,
                        from,
                        to,
                    });
                }
                Err(FieldError::Occupied) => {
                    // blocked zombies hold position and keep their elapsed
                    // stride, retrying as soon as the cell frees up
                }
                Err(error) => {
                    debug_assert!(false, "zombie relocate failed: {error}");
                }
            }
        }
    }

    fn run_production(&mut self, out_events: &mut Vec<Event>) {
        let (lanes, columns) = self.field.dimensions();
        let mut total = Sun::default();
        for lane in 0..lanes {
            for column in 0..columns {
                let cell = CellCoord::new(lane, column);
                let Some(CellContent::Plant(plant_id)) = self.field.content(cell) else {
                    continue;
                };
                let Some(state) = self.plants.get_mut(&plant_id) else {
                    continue;
                };
                let Some(kind) = self.catalog.plant(state.kind) else {
                    continue;
                };
                if !kind.is_producer() {
                    continue;
                }
                if state.try_produce(self.clock, kind.sun_interval) {
                    let amount = kind.sun_yield;
                    total = total.credited(amount);
                    out_events.push(Event::SunProduced {
                        plant: plant_id,
                        cell,
                        amount,
                    });
                }
            }
        }
        // all of a tick's production credits the pool as one deposit
        if total.get() > 0 {
            self.sun = self.sun.credited(total);
        }
    }

    fn resolve_boundaries(&mut self, out_events: &mut Vec<Event>) {
        for lane in 0..self.layout.lanes() {
            let guard_cell = CellCoord::new(lane, MOWER_COLUMN);
            if let Some(CellContent::Zombie(intruder)) = self.field.content(guard_cell) {
                if self.mower_available(lane) {
                    self.fire_mower(lane, intruder, out_events);
                } else {
                    self.end_battle(Defeat::LaneOverrun { lane }, out_events);
                    return;
                }
            } else if let Some(CellContent::Zombie(_)) =
                self.field.content(CellCoord::new(lane, HOME_COLUMN))
            {
                self.end_battle(Defeat::HomeBreached { lane }, out_events);
                return;
            }
        }
    }

    fn fire_mower(&mut self, lane: u32, intruder: ZombieId, out_events: &mut Vec<Event>) {
        let mut cleared: u32 = 0;
        for column in FIRST_PLANT_COLUMN..self.layout.columns() {
            let cell = CellCoord::new(lane, column);
            if let Some(CellContent::Zombie(zombie)) = self.field.content(cell) {
                self.remove_zombie(zombie, cell, out_events);
                cleared += 1;
            }
        }
        // the intruder that tripped the mower goes with the sweep
        self.remove_zombie(intruder, CellCoord::new(lane, MOWER_COLUMN), out_events);
        cleared += 1;
        if let Some(slot) = self.mowers.get_mut(lane as usize) {
            *slot = false;
        }
        out_events.push(Event::MowerFired { lane, cleared });
    }

    fn end_battle(&mut self, defeat: Defeat, out_events: &mut Vec<Event>) {
        self.outcome = Some(defeat);
        out_events.push(Event::BattleEnded { defeat });
    }

    fn spawn_zombie(&mut self, kind_id: ZombieKindId, lane: u32, out_events: &mut Vec<Event>) {
        let Some(kind) = self.catalog.zombie(kind_id) else {
            return;
        };
        if lane >= self.layout.lanes() {
            return;
        }
        if self.zombies_in_lane(lane) >= self.lane_capacity {
            out_events.push(Event::SpawnDropped {
                kind: kind_id,
                lane,
                reason: SpawnDrop::LaneFull,
            });
            return;
        }

        let entry = CellCoord::new(lane, self.layout.columns() - 1);
        let zombie = self.next_zombie_id;
        if self.field.claim_zombie(zombie, entry).is_err() {
            out_events.push(Event::SpawnDropped {
                kind: kind_id,
                lane,
                reason: SpawnDrop::EntryBlocked,
            });
            return;
        }

        self.next_zombie_id = zombie.next();
        let _ = self.zombies.insert(
            zombie,
            ZombieState {
                kind: kind_id,
                cell: entry,
                health: kind.health,
                corpse_health: kind.corpse_health,
                // fresh spawns measure their first stride from entry
                last_step: self.clock,
            },
        );
        out_events.push(Event::ZombieSpawned {
            zombie,
            kind: kind_id,
            cell: entry,
        });
    }

    fn strike_zombie(&mut self, zombie_id: ZombieId, damage: u32, out_events: &mut Vec<Event>) {
        let Some(state) = self.zombies.get_mut(&zombie_id) else {
            return;
        };
        let phase = state.absorb(damage);
        let cell = state.cell;
        out_events.push(Event::ZombieStruck {
            zombie: zombie_id,
            damage,
        });
        match phase {
            DamagePhase::Felled => out_events.push(Event::ZombieFelled {
                zombie: zombie_id,
                cell,
            }),
            DamagePhase::Destroyed => self.remove_zombie(zombie_id, cell, out_events),
            DamagePhase::Wounded | DamagePhase::Soaked => {}
        }
    }

    fn remove_zombie(&mut self, zombie: ZombieId, cell: CellCoord, out_events: &mut Vec<Event>) {
        let _ = self.zombies.remove(&zombie);
        let _ = self.field.release(cell);
        out_events.push(Event::ZombieDestroyed { zombie, cell });
    }

    fn collect_sun(&mut self, amount: Sun, out_events: &mut Vec<Event>) {
        self.sun = self.sun.credited(amount);
        out_events.push(Event::SunCollected {
            amount,
            balance: self.sun,
        });
    }

    fn mower_available(&self, lane: u32) -> bool {
        self.mowers.get(lane as usize).copied().unwrap_or(false)
    }

    fn zombies_in_lane(&self, lane: u32) -> u32 {
        self.zombies
            .values()
            .filter(|zombie| zombie.cell.lane() == lane)
            .count() as u32
    }
}

/// Applies the provided command to the battlefield, mutating state
/// deterministically and pushing the resulting events.
///
/// Once the battle has ended every further command is ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.outcome.is_some() {
        return;
    }
    match command {
        Command::Tick { spawn } => world.tick(spawn, out_events),
        Command::PlacePlant { kind, cell } => world.place_plant(kind, cell, out_events),
        Command::SpawnZombie { kind, lane } => world.spawn_zombie(kind, lane, out_events),
        Command::StrikeZombie { zombie, damage } => {
            world.strike_zombie(zombie, damage, out_events)
        }
        Command::CollectSun { amount } => world.collect_sun(amount, out_events),
    }
}

/// Query functions that provide read-only access to the battlefield state.
pub mod query {
    use std::time::Duration;

    use super::{FieldGrid, FieldLayout, World};
    use lawn_defence_core::{
        Catalog, CellContent, CellCoord, Defeat, GameTime, Health, PlantId, PlantKindId, Sun,
        ZombieId, ZombieKindId,
    };

    /// Retrieves the welcome banner that drivers may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Lane and column layout of the battlefield.
    #[must_use]
    pub fn layout(world: &World) -> FieldLayout {
        world.layout
    }

    /// Current battle clock.
    #[must_use]
    pub fn clock(world: &World) -> GameTime {
        world.clock
    }

    /// Current sun balance.
    #[must_use]
    pub fn sun_balance(world: &World) -> Sun {
        world.sun
    }

    /// Terminal outcome, or `None` while the battle is still running.
    #[must_use]
    pub fn outcome(world: &World) -> Option<Defeat> {
        world.outcome
    }

    /// Read-only access to the catalog the battle was loaded with.
    #[must_use]
    pub fn catalog(world: &World) -> &Catalog {
        &world.catalog
    }

    /// Reports whether the provided lane still holds its mower.
    #[must_use]
    pub fn mower_available(world: &World, lane: u32) -> bool {
        world.mower_available(lane)
    }

    /// Number of zombies currently in the provided lane, corpses included.
    #[must_use]
    pub fn zombies_in_lane(world: &World, lane: u32) -> u32 {
        world.zombies_in_lane(lane)
    }

    /// Exposes a read-only view of the field grid.
    #[must_use]
    pub fn field_view(world: &World) -> FieldView<'_> {
        FieldView { grid: &world.field }
    }

    /// Captures a read-only view of every plant on the field.
    #[must_use]
    pub fn plant_view(world: &World) -> PlantView {
        let snapshots: Vec<PlantSnapshot> = world
            .plants
            .iter()
            .map(|(id, state)| PlantSnapshot {
                id: *id,
                kind: state.kind,
                cell: state.cell,
                health: state.health,
                planted_at: state.planted_at,
                last_production: state.last_production,
                first_delay: state.first_delay,
            })
            .collect();
        PlantView { snapshots }
    }

    /// Captures a read-only view of every zombie on the field.
    #[must_use]
    pub fn zombie_view(world: &World) -> ZombieView {
        let snapshots: Vec<ZombieSnapshot> = world
            .zombies
            .iter()
            .map(|(id, state)| ZombieSnapshot {
                id: *id,
                kind: state.kind,
                cell: state.cell,
                health: state.health,
                corpse_health: state.corpse_health,
                walking: state.is_walking(),
                last_step: state.last_step,
            })
            .collect();
        ZombieView { snapshots }
    }

    /// Read-only view into the dense field grid.
    #[derive(Clone, Copy, Debug)]
    pub struct FieldView<'a> {
        grid: &'a FieldGrid,
    }

    impl<'a> FieldView<'a> {
        /// Content of the provided cell; out-of-bounds cells read as empty.
        #[must_use]
        pub fn content(&self, cell: CellCoord) -> CellContent {
            self.grid.content(cell).unwrap_or_default()
        }

        /// Returns an iterator over all cells in lane-major order.
        pub fn iter(&self) -> impl Iterator<Item = CellContent> + 'a {
            self.grid.cells().iter().copied()
        }
    }

    /// Read-only snapshot describing all plants on the field.
    #[derive(Clone, Debug, Default)]
    pub struct PlantView {
        snapshots: Vec<PlantSnapshot>,
    }

    impl PlantView {
        /// Iterator over the captured plant snapshots in identifier order.
        pub fn iter(&self) -> impl Iterator<Item = &PlantSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<PlantSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single plant's state used for queries.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct PlantSnapshot {
        /// Identifier allocated to the plant by the battlefield.
        pub id: PlantId,
        /// Catalog kind the plant was created from.
        pub kind: PlantKindId,
        /// Cell the plant occupies.
        pub cell: CellCoord,
        /// Remaining hit points.
        pub health: Health,
        /// Time the plant was placed.
        pub planted_at: GameTime,
        /// Time of the most recent production, `None` before the first.
        pub last_production: Option<GameTime>,
        /// Randomized delay before the first production.
        pub first_delay: Duration,
    }

    /// Read-only snapshot describing all zombies on the field.
    #[derive(Clone, Debug, Default)]
    pub struct ZombieView {
        snapshots: Vec<ZombieSnapshot>,
    }

    impl ZombieView {
        /// Iterator over the captured zombie snapshots in identifier order.
        pub fn iter(&self) -> impl Iterator<Item = &ZombieSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<ZombieSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single zombie's state used for queries.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct ZombieSnapshot {
        /// Identifier allocated to the zombie by the battlefield.
        pub id: ZombieId,
        /// Catalog kind the zombie was created from.
        pub kind: ZombieKindId,
        /// Cell the zombie currently occupies.
        pub cell: CellCoord,
        /// Remaining primary hit points.
        pub health: Health,
        /// Remaining residual pool.
        pub corpse_health: Health,
        /// Whether the zombie still advances; felled corpses only block.
        pub walking: bool,
        /// Time of the most recent step.
        pub last_step: GameTime,
    }
}
