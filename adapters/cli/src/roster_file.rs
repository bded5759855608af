use std::{error::Error, fmt, fs, path::Path, time::Duration};

use serde::Deserialize;

use lawn_defence_core::{Catalog, CooldownClass, Health, PlantKind, Sun, ZombieKind};

/// On-disk roster document with durations spelled out in whole seconds.
#[derive(Clone, Debug, Deserialize)]
struct RosterDocument {
    plants: Vec<PlantRecord>,
    zombies: Vec<ZombieRecord>,
}

#[derive(Clone, Debug, Deserialize)]
struct PlantRecord {
    name: String,
    health: i32,
    #[serde(default)]
    damage: u32,
    #[serde(default)]
    dps: f32,
    #[serde(default)]
    sun_interval_secs: u64,
    cost: u32,
    cooldown: String,
    #[serde(default)]
    sun_yield: u32,
}

#[derive(Clone, Debug, Deserialize)]
struct ZombieRecord {
    name: String,
    health: i32,
    #[serde(default)]
    damage: u32,
    stride_secs: u64,
    corpse_health: i32,
}

/// Loads a catalog from a JSON roster file.
pub(crate) fn load(path: &Path) -> Result<Catalog, RosterFileError> {
    let text = fs::read_to_string(path).map_err(RosterFileError::Unreadable)?;
    parse(&text)
}

/// Parses a catalog from roster JSON.
pub(crate) fn parse(text: &str) -> Result<Catalog, RosterFileError> {
    let document: RosterDocument =
        serde_json::from_str(text).map_err(RosterFileError::InvalidDocument)?;

    let plants = document
        .plants
        .into_iter()
        .map(|record| {
            let cooldown = parse_cooldown(&record.cooldown)?;
            Ok(PlantKind {
                name: record.name,
                health: Health::new(record.health),
                damage: record.damage,
                dps: record.dps,
                sun_interval: Duration::from_secs(record.sun_interval_secs),
                cost: Sun::new(record.cost),
                cooldown,
                sun_yield: Sun::new(record.sun_yield),
            })
        })
        .collect::<Result<Vec<PlantKind>, RosterFileError>>()?;

    let zombies = document
        .zombies
        .into_iter()
        .map(|record| ZombieKind {
            name: record.name,
            health: Health::new(record.health),
            damage: record.damage,
            stride: Duration::from_secs(record.stride_secs),
            corpse_health: Health::new(record.corpse_health),
        })
        .collect();

    Ok(Catalog::new(plants, zombies))
}

fn parse_cooldown(value: &str) -> Result<CooldownClass, RosterFileError> {
    match value {
        "fast" => Ok(CooldownClass::Fast),
        "slow" => Ok(CooldownClass::Slow),
        "very_slow" => Ok(CooldownClass::VerySlow),
        other => Err(RosterFileError::UnknownCooldown(other.to_owned())),
    }
}

/// Errors that can occur while loading a roster file.
#[derive(Debug)]
pub(crate) enum RosterFileError {
    /// The roster file could not be read from disk.
    Unreadable(std::io::Error),
    /// The roster file did not contain a valid roster document.
    InvalidDocument(serde_json::Error),
    /// A plant named a cooldown class the engine does not know.
    UnknownCooldown(String),
}

impl fmt::Display for RosterFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable(error) => write!(f, "could not read roster file: {error}"),
            Self::InvalidDocument(error) => write!(f, "could not parse roster file: {error}"),
            Self::UnknownCooldown(value) => {
                write!(f, "unknown cooldown class '{value}', expected fast, slow or very_slow")
            }
        }
    }
}

impl Error for RosterFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unreadable(error) => Some(error),
            Self::InvalidDocument(error) => Some(error),
            Self::UnknownCooldown(_) => None,
        }
    }
}
