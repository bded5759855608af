//! Per-instance unit state tracked by the battlefield.

use std::time::Duration;

use lawn_defence_core::{CellCoord, GameTime, Health, PlantKindId, ZombieKindId};

/// Mutable state of a single placed plant.
#[derive(Clone, Debug)]
pub(crate) struct PlantState {
    /// Catalog kind the instance was created from.
    pub(crate) kind: PlantKindId,
    /// Cell the plant permanently occupies.
    pub(crate) cell: CellCoord,
    /// Remaining hit points; damage to plants is an extension point.
    pub(crate) health: Health,
    /// Time the plant was placed.
    pub(crate) planted_at: GameTime,
    /// Time of the most recent production, `None` until the first one.
    pub(crate) last_production: Option<GameTime>,
    /// Randomized delay before the first production, fixed at placement.
    pub(crate) first_delay: Duration,
}

impl PlantState {
    /// Decides whether the plant produces at `now` and advances its timer.
    ///
    /// The first production waits out the per-instance delay measured from
    /// placement; every later one waits out `interval` measured from the
    /// previous production. At most one production fires per call, with no
    /// back-pay for skipped ticks.
    pub(crate) fn try_produce(&mut self, now: GameTime, interval: Duration) -> bool {
        let due = match self.last_production {
            None => now.elapsed_since(self.planted_at) >= self.first_delay,
            Some(last) => now.elapsed_since(last) >= interval,
        };
        if due {
            self.last_production = Some(now);
        }
        due
    }
}

/// Mutable state of a single zombie on the field.
#[derive(Clone, Debug)]
pub(crate) struct ZombieState {
    /// Catalog kind the instance was created from.
    pub(crate) kind: ZombieKindId,
    /// Cell the zombie currently occupies.
    pub(crate) cell: CellCoord,
    /// Primary hit points; depletion fells the zombie without removing it.
    pub(crate) health: Health,
    /// Residual pool the corpse soaks up before full removal.
    pub(crate) corpse_health: Health,
    /// Time of the most recent step, initialised to the spawn time.
    pub(crate) last_step: GameTime,
}

impl ZombieState {
    /// Reports whether the zombie still walks; felled corpses only block.
    pub(crate) fn is_walking(&self) -> bool {
        !self.health.depleted()
    }

    /// Reports whether a full stride has elapsed since the last step.
    pub(crate) fn ready_to_step(&self, now: GameTime, stride: Duration) -> bool {
        now.elapsed_since(self.last_step) >= stride
    }

    /// Applies one hit through the two-phase health model.
    pub(crate) fn absorb(&mut self, damage: u32) -> DamagePhase {
        if !self.health.depleted() {
            self.health = self.health.damaged(damage);
            if self.health.depleted() {
                DamagePhase::Felled
            } else {
                DamagePhase::Wounded
            }
        } else {
            self.corpse_health = self.corpse_health.damaged(damage);
            if self.corpse_health.depleted() {
                DamagePhase::Destroyed
            } else {
                DamagePhase::Soaked
            }
        }
    }
}

/// Outcome of applying one hit to a zombie.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DamagePhase {
    /// Primary health absorbed the hit and remains positive.
    Wounded,
    /// Primary health ran out on this hit; the corpse stays on the field.
    Felled,
    /// The corpse absorbed the hit and still blocks its cell.
    Soaked,
    /// The residual pool ran out; the unit must leave the field.
    Destroyed,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_zombie() -> ZombieState {
        ZombieState {
            kind: ZombieKindId::new(0),
            cell: CellCoord::new(0, 10),
            health: Health::new(10),
            corpse_health: Health::new(5),
            last_step: GameTime::new(0),
        }
    }

    #[test]
    fn damage_fells_then_destroys_across_both_pools() {
        let mut zombie = fresh_zombie();

        assert_eq!(zombie.absorb(12), DamagePhase::Felled);
        assert!(zombie.health.depleted());
        assert!(!zombie.is_walking());
        assert_eq!(zombie.corpse_health, Health::new(5));

        assert_eq!(zombie.absorb(5), DamagePhase::Destroyed);
        assert!(zombie.corpse_health.depleted());
    }

    #[test]
    fn light_damage_leaves_the_zombie_walking() {
        let mut zombie = fresh_zombie();

        assert_eq!(zombie.absorb(3), DamagePhase::Wounded);
        assert!(zombie.is_walking());
        assert_eq!(zombie.health, Health::new(7));
        assert_eq!(zombie.corpse_health, Health::new(5));
    }

    #[test]
    fn corpse_soaks_partial_damage_before_destruction() {
        let mut zombie = fresh_zombie();

        assert_eq!(zombie.absorb(10), DamagePhase::Felled);
        assert_eq!(zombie.absorb(2), DamagePhase::Soaked);
        assert_eq!(zombie.corpse_health, Health::new(3));
        assert_eq!(zombie.absorb(3), DamagePhase::Destroyed);
    }

    #[test]
    fn first_production_waits_for_the_instance_delay() {
        let mut plant = PlantState {
            kind: PlantKindId::new(0),
            cell: CellCoord::new(0, 3),
            health: Health::new(60),
            planted_at: GameTime::new(0),
            last_production: None,
            first_delay: Duration::from_secs(21),
        };
        let interval = Duration::from_secs(24);

        assert!(!plant.try_produce(GameTime::new(20), interval));
        assert!(plant.try_produce(GameTime::new(21), interval));
        assert_eq!(plant.last_production, Some(GameTime::new(21)));

        assert!(!plant.try_produce(GameTime::new(44), interval));
        assert!(plant.try_produce(GameTime::new(45), interval));
        assert_eq!(plant.last_production, Some(GameTime::new(45)));
    }

    #[test]
    fn production_never_pays_back_skipped_ticks() {
        let mut plant = PlantState {
            kind: PlantKindId::new(0),
            cell: CellCoord::new(2, 5),
            health: Health::new(60),
            planted_at: GameTime::new(0),
            last_production: Some(GameTime::new(10)),
            first_delay: Duration::from_secs(20),
        };
        let interval = Duration::from_secs(4);

        // a long gap still yields exactly one production
        assert!(plant.try_produce(GameTime::new(30), interval));
        assert_eq!(plant.last_production, Some(GameTime::new(30)));
        assert!(!plant.try_produce(GameTime::new(31), interval));
    }
}
