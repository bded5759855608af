#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting zombie spawn
//! commands.
//!
//! The system is pure: handed the second the battle is about to reach plus
//! the catalog, it emits [`Command::SpawnZombie`] values without touching
//! world state. Kinds are drawn with weights that favour fragile zombies, so
//! a catalog's heavy hitters stay rare.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use lawn_defence_core::{Catalog, Command, GameTime, ZombieKindId};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    activation: GameTime,
    chance: f64,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration.
    ///
    /// Spawning stays silent until the clock moves strictly past
    /// `activation`; each tick after that rolls `chance` once.
    #[must_use]
    pub const fn new(activation: GameTime, chance: f64, rng_seed: u64) -> Self {
        Self {
            activation,
            chance,
            rng_seed,
        }
    }
}

/// Pure system that deterministically emits spawn commands after the opening
/// window has passed.
#[derive(Clone, Debug)]
pub struct Spawning {
    activation: GameTime,
    chance: f64,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            activation: config.activation,
            chance: config.chance,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Rolls the spawn proposal for the given second.
    ///
    /// One roll happens per call, keeping the random stream a pure function
    /// of the seed and the seconds handled. The orchestrator asks before it
    /// ticks the battlefield, so the proposal resolves inside the tick ahead
    /// of the boundary sweep; the battlefield still enforces the lane cap
    /// and entry vacancy when it lands.
    pub fn handle(&mut self, now: GameTime, catalog: &Catalog, lanes: u32, out: &mut Vec<Command>) {
        if lanes == 0 {
            return;
        }
        if now <= self.activation {
            return;
        }
        if self.rng.gen::<f64>() >= self.chance {
            return;
        }
        let Some(kind) = self.select_kind(catalog) else {
            return;
        };
        let lane = self.rng.gen_range(0..lanes);
        out.push(Command::SpawnZombie { kind, lane });
    }

    /// Draws a kind with weight `total_health - kind_health`, falling back to
    /// a uniform draw when every weight is zero.
    fn select_kind(&mut self, catalog: &Catalog) -> Option<ZombieKindId> {
        let kinds = catalog.zombies();
        if kinds.is_empty() {
            return None;
        }

        let total: i64 = kinds
            .iter()
            .map(|kind| i64::from(kind.health.get()))
            .sum();
        let weights: Vec<i64> = kinds
            .iter()
            .map(|kind| total - i64::from(kind.health.get()))
            .collect();
        let weight_sum: i64 = weights.iter().sum();

        let index = if weight_sum <= 0 {
            self.rng.gen_range(0..kinds.len())
        } else {
            let roll = self.rng.gen::<f64>() * weight_sum as f64;
            let mut cumulative = 0.0;
            let mut chosen = kinds.len() - 1;
            for (position, weight) in weights.iter().enumerate() {
                cumulative += *weight as f64;
                if roll < cumulative {
                    chosen = position;
                    break;
                }
            }
            chosen
        };
        u32::try_from(index).ok().map(ZombieKindId::new)
    }
}
