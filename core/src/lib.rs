#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lawn Defence engine.
//!
//! This crate defines the message surface that connects drivers, the
//! authoritative battlefield, and pure systems. Drivers and systems submit
//! [`Command`] values describing desired mutations, the battlefield executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values describing what actually happened. Catalog kinds are immutable
//! templates loaded once and shared read-only for the lifetime of a battle.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Lawn Defence.";

/// Index of the home column that zombies must never reach.
pub const HOME_COLUMN: u32 = 0;

/// Index of the column guarded by the per-lane mowers.
pub const MOWER_COLUMN: u32 = 1;

/// First column on which plants may be placed.
pub const FIRST_PLANT_COLUMN: u32 = 2;

/// Length of the opening phase of a battle, in game time.
///
/// While the clock is at or below this mark, plant recharge uses the
/// shortened per-class values and no zombies spawn. Both behaviours flip in
/// the same second.
pub const OPENING_WINDOW: GameTime = GameTime::new(18);

/// Location of a single field cell expressed as lane and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    lane: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new field cell coordinate.
    #[must_use]
    pub const fn new(lane: u32, column: u32) -> Self {
        Self { lane, column }
    }

    /// Zero-based lane index of the cell.
    #[must_use]
    pub const fn lane(&self) -> u32 {
        self.lane
    }

    /// Zero-based column index of the cell; column 0 borders the home.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Returns the neighbouring cell one column closer to home, if any.
    #[must_use]
    pub const fn toward_home(&self) -> Option<CellCoord> {
        if self.column == 0 {
            None
        } else {
            Some(CellCoord::new(self.lane, self.column - 1))
        }
    }
}

/// Unique identifier assigned to a placed plant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlantId(u32);

impl PlantId {
    /// Creates a new plant identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the identifier that follows this one.
    #[must_use]
    pub const fn next(&self) -> PlantId {
        PlantId(self.0.wrapping_add(1))
    }
}

/// Unique identifier assigned to a spawned zombie.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZombieId(u32);

impl ZombieId {
    /// Creates a new zombie identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the identifier that follows this one.
    #[must_use]
    pub const fn next(&self) -> ZombieId {
        ZombieId(self.0.wrapping_add(1))
    }
}

/// Positional identifier of a plant kind within the loaded catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlantKindId(u32);

impl PlantKindId {
    /// Creates a new plant kind identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the catalog index backing the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Positional identifier of a zombie kind within the loaded catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZombieKindId(u32);

impl ZombieKindId {
    /// Creates a new zombie kind identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the catalog index backing the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Hit points carried by a unit; may run negative while soaking damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(i32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Retrieves the raw hit point count.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }

    /// Returns the health remaining after absorbing the provided damage.
    #[must_use]
    pub const fn damaged(&self, amount: u32) -> Health {
        Health(self.0.saturating_sub_unsigned(amount))
    }

    /// Reports whether the pool has been exhausted.
    #[must_use]
    pub const fn depleted(&self) -> bool {
        self.0 <= 0
    }
}

/// Quantity of sun, the spendable resource that gates placement.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Sun(u32);

impl Sun {
    /// Creates a new sun quantity.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the raw sun count.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the balance after crediting the provided amount.
    #[must_use]
    pub const fn credited(&self, amount: Sun) -> Sun {
        Sun(self.0.saturating_add(amount.0))
    }

    /// Returns the balance after paying the cost, or `None` when the balance
    /// cannot cover it. A placement that cannot pay must not be applied.
    #[must_use]
    pub const fn debited(&self, cost: Sun) -> Option<Sun> {
        match self.0.checked_sub(cost.0) {
            Some(rest) => Some(Sun(rest)),
            None => None,
        }
    }

    /// Reports whether the balance covers the provided cost.
    #[must_use]
    pub const fn covers(&self, cost: Sun) -> bool {
        self.0 >= cost.0
    }
}

/// Whole elapsed seconds of battle time, advanced only by [`Command::Tick`].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GameTime(u32);

impl GameTime {
    /// Creates a game time stamp from a raw second count.
    #[must_use]
    pub const fn new(seconds: u32) -> Self {
        Self(seconds)
    }

    /// Retrieves the raw second count.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the time stamp one second later.
    #[must_use]
    pub const fn advanced(&self) -> GameTime {
        GameTime(self.0.saturating_add(1))
    }

    /// Duration elapsed since the provided earlier stamp.
    ///
    /// Saturates to zero when `earlier` lies in the future, which only
    /// happens on a caller programming error.
    #[must_use]
    pub const fn elapsed_since(&self, earlier: GameTime) -> Duration {
        Duration::from_secs(self.0.saturating_sub(earlier.0) as u64)
    }
}

/// Recharge tier governing how quickly a plant kind can be replanted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CooldownClass {
    /// Cheap utility plants that recharge in a few seconds.
    Fast,
    /// Standard plants with a half-minute recharge.
    Slow,
    /// Heavy ordnance with the longest recharge.
    VerySlow,
}

impl CooldownClass {
    /// Steady-state recharge period applied after the opening window.
    #[must_use]
    pub const fn steady(self) -> Duration {
        match self {
            Self::Fast => Duration::from_millis(7_500),
            Self::Slow => Duration::from_secs(30),
            Self::VerySlow => Duration::from_secs(50),
        }
    }

    /// Shortened recharge period applied during the opening window.
    #[must_use]
    pub const fn ramp(self) -> Duration {
        match self {
            Self::Fast => Duration::from_secs(2),
            Self::Slow => Duration::from_secs(10),
            Self::VerySlow => Duration::from_secs(20),
        }
    }

    /// Recharge period in force at the provided game time.
    #[must_use]
    pub fn effective(self, now: GameTime) -> Duration {
        if now <= OPENING_WINDOW {
            self.ramp()
        } else {
            self.steady()
        }
    }
}

/// Immutable template describing a plant kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlantKind {
    /// Display name; the first four characters double as the field tag.
    pub name: String,
    /// Hit points a fresh instance starts with.
    pub health: Health,
    /// Damage dealt per attack by fighting kinds.
    pub damage: u32,
    /// Sustained damage per second for fighting kinds.
    pub dps: f32,
    /// Steady interval between sun productions for producer kinds.
    pub sun_interval: Duration,
    /// Sun debited from the pool when the kind is placed.
    pub cost: Sun,
    /// Recharge tier gating how soon the kind can be placed again.
    pub cooldown: CooldownClass,
    /// Sun credited per production event; zero marks a non-producer.
    pub sun_yield: Sun,
}

impl PlantKind {
    /// Reports whether instances of this kind generate sun over time.
    #[must_use]
    pub fn is_producer(&self) -> bool {
        self.sun_yield.get() > 0
    }
}

/// Immutable template describing a zombie kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZombieKind {
    /// Display name; the first four characters double as the field tag.
    pub name: String,
    /// Primary hit points a fresh instance starts with.
    pub health: Health,
    /// Damage dealt per attack.
    pub damage: u32,
    /// Time the zombie needs to cross one column.
    pub stride: Duration,
    /// Residual pool the corpse soaks up after primary health is gone.
    pub corpse_health: Health,
}

/// Read-only roster of every plant and zombie kind available to a battle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    plants: Vec<PlantKind>,
    zombies: Vec<ZombieKind>,
}

impl Catalog {
    /// Builds a catalog from the provided kind lists.
    ///
    /// Kind identifiers are positional: the entry at index `n` answers to
    /// the identifier wrapping `n`.
    #[must_use]
    pub fn new(plants: Vec<PlantKind>, zombies: Vec<ZombieKind>) -> Self {
        Self { plants, zombies }
    }

    /// Looks up a plant kind by identifier.
    #[must_use]
    pub fn plant(&self, kind: PlantKindId) -> Option<&PlantKind> {
        self.plants.get(kind.get() as usize)
    }

    /// Looks up a zombie kind by identifier.
    #[must_use]
    pub fn zombie(&self, kind: ZombieKindId) -> Option<&ZombieKind> {
        self.zombies.get(kind.get() as usize)
    }

    /// All plant kinds in identifier order.
    #[must_use]
    pub fn plants(&self) -> &[PlantKind] {
        &self.plants
    }

    /// All zombie kinds in identifier order.
    #[must_use]
    pub fn zombies(&self) -> &[ZombieKind] {
        &self.zombies
    }
}

/// Contents of a single field cell.
///
/// Cells are a tagged sum rather than a nullable reference so occupancy
/// checks and unit dispatch stay exhaustive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellContent {
    /// No unit occupies the cell.
    #[default]
    Empty,
    /// A stationary plant occupies the cell.
    Plant(PlantId),
    /// A zombie, walking or felled, occupies the cell.
    Zombie(ZombieId),
}

impl CellContent {
    /// Reports whether the cell is free.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, CellContent::Empty)
    }

    /// Reports whether the cell holds a zombie.
    #[must_use]
    pub const fn is_zombie(&self) -> bool {
        matches!(self, CellContent::Zombie(_))
    }
}

/// Spawn proposal a tick resolves after production and before the boundary
/// sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnRequest {
    /// Catalog kind to instantiate.
    pub kind: ZombieKindId,
    /// Lane whose entry column receives the zombie.
    pub lane: u32,
}

/// Commands that express all permissible battlefield mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the clock by one second and runs the unit lifecycle:
    /// zombie movement, sun production, the optional spawn, then boundary
    /// resolution.
    Tick {
        /// Spawn proposal for the new second; the battlefield still
        /// enforces the lane cap and entry vacancy when it lands.
        spawn: Option<SpawnRequest>,
    },
    /// Requests placement of a plant of the given kind at the given cell.
    PlacePlant {
        /// Catalog kind to instantiate.
        kind: PlantKindId,
        /// Target cell; columns 0 and 1 are reserved.
        cell: CellCoord,
    },
    /// Requests that a zombie of the given kind enter at the far end of a
    /// lane.
    SpawnZombie {
        /// Catalog kind to instantiate.
        kind: ZombieKindId,
        /// Lane the zombie should enter.
        lane: u32,
    },
    /// Applies damage to a zombie through the two-phase health model.
    StrikeZombie {
        /// Zombie absorbing the damage.
        zombie: ZombieId,
        /// Damage to apply.
        damage: u32,
    },
    /// Credits the sun pool from outside production, e.g. a sky drop.
    CollectSun {
        /// Amount added to the balance.
        amount: Sun,
    },
}

/// Events broadcast by the battlefield after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The battle clock advanced by one second.
    TimeAdvanced {
        /// Clock value after the advance.
        now: GameTime,
    },
    /// A plant was placed and paid for.
    PlantPlaced {
        /// Identifier allocated to the new instance.
        plant: PlantId,
        /// Catalog kind that was placed.
        kind: PlantKindId,
        /// Cell the plant occupies.
        cell: CellCoord,
        /// Sun balance remaining after the debit.
        balance: Sun,
    },
    /// A placement request was rejected; no state changed.
    PlacementRejected {
        /// Catalog kind requested.
        kind: PlantKindId,
        /// Cell requested.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// A producer plant generated sun this tick.
    SunProduced {
        /// Producing plant instance.
        plant: PlantId,
        /// Cell of the producer.
        cell: CellCoord,
        /// Amount credited to the pool.
        amount: Sun,
    },
    /// Sun was credited from outside production.
    SunCollected {
        /// Amount credited.
        amount: Sun,
        /// Balance after the credit.
        balance: Sun,
    },
    /// A zombie entered the field.
    ZombieSpawned {
        /// Identifier allocated to the new instance.
        zombie: ZombieId,
        /// Catalog kind that spawned.
        kind: ZombieKindId,
        /// Entry cell at the far end of the lane.
        cell: CellCoord,
    },
    /// A spawn attempt was dropped without side effects.
    SpawnDropped {
        /// Catalog kind that failed to spawn.
        kind: ZombieKindId,
        /// Lane that refused the spawn.
        lane: u32,
        /// Why the attempt was dropped.
        reason: SpawnDrop,
    },
    /// A zombie advanced one column toward home.
    ZombieStepped {
        /// Zombie that moved.
        zombie: ZombieId,
        /// Cell vacated by the move.
        from: CellCoord,
        /// Cell now occupied.
        to: CellCoord,
    },
    /// A zombie absorbed damage.
    ZombieStruck {
        /// Zombie that was hit.
        zombie: ZombieId,
        /// Damage applied.
        damage: u32,
    },
    /// A zombie's primary health ran out; its corpse remains an obstacle.
    ZombieFelled {
        /// Zombie that fell.
        zombie: ZombieId,
        /// Cell where the corpse lies.
        cell: CellCoord,
    },
    /// A zombie's residual pool ran out; the unit left the field.
    ZombieDestroyed {
        /// Zombie that was removed.
        zombie: ZombieId,
        /// Cell that was cleared.
        cell: CellCoord,
    },
    /// A lane's mower fired and swept the lane clear of zombies.
    MowerFired {
        /// Lane that was swept.
        lane: u32,
        /// Number of zombies destroyed by the sweep.
        cleared: u32,
    },
    /// The battle ended in defeat; further commands are ignored.
    BattleEnded {
        /// How the defence failed.
        defeat: Defeat,
    },
}

/// Reasons a plant placement request may be rejected by the battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested kind identifier is not in the catalog.
    #[error("unknown plant kind")]
    UnknownKind,
    /// The requested cell lies outside the field.
    #[error("cell is outside the field")]
    OutOfBounds,
    /// The requested column is reserved for the home or mower boundary.
    #[error("columns 0 and 1 are reserved")]
    ReservedColumn,
    /// The sun balance does not cover the kind's cost.
    #[error("not enough sun")]
    InsufficientSun,
    /// The kind's recharge period has not elapsed since its last placement.
    #[error("kind is still recharging")]
    OnCooldown,
    /// The requested cell already holds a unit.
    #[error("cell is already occupied")]
    Occupied,
}

/// Field-level failures; reaching a driver marks an orchestration bug.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum FieldError {
    /// A coordinate lay outside the grid.
    #[error("coordinate outside the field")]
    OutOfBounds,
    /// The destination cell already holds a unit.
    #[error("destination cell occupied")]
    Occupied,
    /// The origin cell holds nothing to move.
    #[error("origin cell empty")]
    SourceEmpty,
}

/// Reasons a spawn attempt is dropped rather than rejected loudly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnDrop {
    /// The lane already holds the maximum number of zombies.
    LaneFull,
    /// The entry cell at the far end of the lane is occupied.
    EntryBlocked,
}

/// Terminal outcomes of a battle.
///
/// Defeat is the only way a battle ends on its own; stopping after a fixed
/// session length is a driver concern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Defeat {
    /// A zombie stepped onto the home column.
    HomeBreached {
        /// Lane that was breached.
        lane: u32,
    },
    /// A zombie reached the mower column after the lane's mower was spent.
    LaneOverrun {
        /// Lane that was overrun.
        lane: u32,
    },
}

impl Defeat {
    /// Lane in which the defence failed.
    #[must_use]
    pub const fn lane(&self) -> u32 {
        match self {
            Self::HomeBreached { lane } | Self::LaneOverrun { lane } => *lane,
        }
    }
}
