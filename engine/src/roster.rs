//! Built-in plant and zombie roster for standard battles.

use std::time::Duration;

use lawn_defence_core::{Catalog, CooldownClass, Health, PlantKind, Sun, ZombieKind};

/// Builds the roster drivers fall back to when no custom catalog is loaded.
///
/// The sunflower is the only producer; the other plants carry combat stats
/// as catalog data for drivers that track them.
#[must_use]
pub fn standard() -> Catalog {
    Catalog::new(
        vec![
            PlantKind {
                name: "Sunflower".to_owned(),
                health: Health::new(60),
                damage: 0,
                dps: 0.0,
                sun_interval: Duration::from_secs(24),
                cost: Sun::new(50),
                cooldown: CooldownClass::Fast,
                sun_yield: Sun::new(25),
            },
            PlantKind {
                name: "Peashooter".to_owned(),
                health: Health::new(60),
                damage: 20,
                dps: 13.3,
                sun_interval: Duration::ZERO,
                cost: Sun::new(100),
                cooldown: CooldownClass::Fast,
                sun_yield: Sun::new(0),
            },
            PlantKind {
                name: "Wall-nut".to_owned(),
                health: Health::new(300),
                damage: 0,
                dps: 0.0,
                sun_interval: Duration::ZERO,
                cost: Sun::new(50),
                cooldown: CooldownClass::Slow,
                sun_yield: Sun::new(0),
            },
            PlantKind {
                name: "Cherry Bomb".to_owned(),
                health: Health::new(60),
                damage: 1800,
                dps: 0.0,
                sun_interval: Duration::ZERO,
                cost: Sun::new(150),
                cooldown: CooldownClass::VerySlow,
                sun_yield: Sun::new(0),
            },
        ],
        vec![
            ZombieKind {
                name: "Walker".to_owned(),
                health: Health::new(10),
                damage: 1,
                stride: Duration::from_secs(2),
                corpse_health: Health::new(5),
            },
            ZombieKind {
                name: "Conehead".to_owned(),
                health: Health::new(28),
                damage: 1,
                stride: Duration::from_secs(2),
                corpse_health: Health::new(8),
            },
            ZombieKind {
                name: "Buckethead".to_owned(),
                health: Health::new(65),
                damage: 1,
                stride: Duration::from_secs(3),
                corpse_health: Health::new(10),
            },
        ],
    )
}
