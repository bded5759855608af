use std::time::Duration;

use lawn_defence_core::{
    Catalog, CellCoord, Event, Health, PlacementError, PlantKindId, Sun, ZombieKind,
};
use lawn_defence_engine::{roster, Action, Simulation, SimulationConfig};
use lawn_defence_world::query;

const SUNFLOWER: PlantKindId = PlantKindId::new(0);

fn quiet_config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        spawn_chance: 0.0,
        sky_drops: false,
        seed,
        ..SimulationConfig::default()
    }
}

fn field_part(values: &[f32]) -> &[f32] {
    &values[..values.len() - 1]
}

fn sun_part(values: &[f32]) -> f32 {
    values[values.len() - 1]
}

#[test]
fn reset_returns_the_flattened_initial_observation() {
    let mut simulation = Simulation::new(quiet_config(1), roster::standard());
    let observation = simulation.reset();

    let values = observation.values();
    assert_eq!(values.len(), 5 * 11 + 1);
    assert!(field_part(values).iter().all(|value| *value == 0.0));
    assert_eq!(sun_part(values), 150.0);
}

#[test]
fn placements_update_the_observation_and_balance() {
    let mut simulation = Simulation::new(quiet_config(1), roster::standard());
    let mut events = Vec::new();

    let outcome = simulation.step(
        Action::Place {
            kind: SUNFLOWER,
            cell: CellCoord::new(0, 3),
        },
        &mut events,
    );

    assert!(!outcome.done);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::PlantPlaced { .. })));
    let values = outcome.observation.values();
    assert_eq!(values[3], 1.0, "the planted cell reads as a plant");
    assert_eq!(sun_part(values), 100.0);
}

#[test]
fn rejected_placements_leave_the_observation_unchanged() {
    let mut simulation = Simulation::new(quiet_config(1), roster::standard());
    let mut events = Vec::new();

    let outcome = simulation.step(
        Action::Place {
            kind: SUNFLOWER,
            cell: CellCoord::new(0, 1),
        },
        &mut events,
    );

    assert!(events.iter().any(|event| matches!(
        event,
        Event::PlacementRejected {
            reason: PlacementError::ReservedColumn,
            ..
        }
    )));
    let values = outcome.observation.values();
    assert!(field_part(values).iter().all(|value| *value == 0.0));
    assert_eq!(sun_part(values), 150.0);
}

#[test]
fn wait_actions_only_advance_time() {
    let mut simulation = Simulation::new(quiet_config(9), roster::standard());

    for second in 1..=3_u32 {
        let mut events = Vec::new();
        let outcome = simulation.step(Action::Wait, &mut events);

        assert_eq!(query::clock(simulation.world()).get(), second);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. })));
        let values = outcome.observation.values();
        assert!(field_part(values).iter().all(|value| *value == 0.0));
        assert_eq!(sun_part(values), 150.0);
    }
}

#[test]
fn zombies_appear_in_the_observation_after_the_opening_window() {
    let config = SimulationConfig {
        spawn_chance: 1.0,
        sky_drops: false,
        seed: 5,
        ..SimulationConfig::default()
    };
    let mut simulation = Simulation::new(config, roster::standard());

    for _ in 0..18 {
        let mut events = Vec::new();
        let _ = simulation.step(Action::Wait, &mut events);
        assert!(
            !events
                .iter()
                .any(|event| matches!(event, Event::ZombieSpawned { .. })),
            "no spawn inside the opening window"
        );
    }

    let mut events = Vec::new();
    let outcome = simulation.step(Action::Wait, &mut events);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ZombieSpawned { .. })));

    let values = outcome.observation.values();
    let zombie_cells: Vec<usize> = field_part(values)
        .iter()
        .enumerate()
        .filter(|(_, value)| **value == 2.0)
        .map(|(index, _)| index)
        .collect();
    assert_eq!(zombie_cells.len(), 1, "exactly one zombie on the field");
    assert_eq!(
        zombie_cells[0] % 11,
        10,
        "fresh spawns enter at the far column"
    );
}

#[test]
fn sky_drops_credit_the_pool_on_schedule() {
    let config = SimulationConfig {
        spawn_chance: 0.0,
        sky_drops: true,
        seed: 3,
        ..SimulationConfig::default()
    };
    let mut simulation = Simulation::new(config, roster::standard());

    let mut drops = Vec::new();
    let mut last_values = Vec::new();
    for second in 1..=30_u32 {
        let mut events = Vec::new();
        let outcome = simulation.step(Action::Wait, &mut events);
        for event in &events {
            if let Event::SunCollected { amount, balance } = event {
                drops.push((second, *amount, *balance));
            }
        }
        last_values = outcome.observation.into_vec();
    }

    assert!(!drops.is_empty(), "thirty seconds should rain sun");
    let (first, _, _) = drops[0];
    assert!((8..=12).contains(&first), "first drop at {first}s");
    for pair in drops.windows(2) {
        let gap = pair[1].0 - pair[0].0;
        assert!((8..=12).contains(&gap), "drop gap of {gap}s");
    }
    for (_, amount, _) in &drops {
        assert_eq!(*amount, Sun::new(25));
    }

    let expected = 150 + 25 * drops.len() as u32;
    assert_eq!(query::sun_balance(simulation.world()), Sun::new(expected));
    assert_eq!(sun_part(&last_values), expected as f32);
}

#[test]
fn relentless_pressure_eventually_ends_the_battle() {
    let config = SimulationConfig {
        spawn_chance: 1.0,
        sky_drops: false,
        seed: 0xbad,
        ..SimulationConfig::default()
    };
    let mut simulation = Simulation::new(config, roster::standard());

    let mut ended_at = None;
    let mut final_values = Vec::new();
    for second in 1..=300 {
        let mut events = Vec::new();
        let outcome = simulation.step(Action::Wait, &mut events);
        if outcome.done {
            ended_at = Some(second);
            final_values = outcome.observation.into_vec();
            break;
        }
    }

    assert!(
        ended_at.is_some(),
        "an undefended field must fall within the bound"
    );
    assert!(query::outcome(simulation.world()).is_some());

    // stepping a finished battle stays inert
    let mut events = Vec::new();
    let outcome = simulation.step(Action::Wait, &mut events);
    assert!(outcome.done);
    assert!(events.is_empty());
    assert_eq!(outcome.observation.values(), final_values.as_slice());
}

#[test]
fn mower_ticks_catch_the_same_second_spawn() {
    let config = SimulationConfig {
        lanes: 1,
        columns: 4,
        spawn_chance: 1.0,
        sky_drops: false,
        seed: 2,
        ..SimulationConfig::default()
    };
    let catalog = Catalog::new(
        Vec::new(),
        vec![ZombieKind {
            name: "Walker".to_owned(),
            health: Health::new(10),
            damage: 1,
            stride: Duration::from_secs(1),
            corpse_health: Health::new(5),
        }],
    );
    let mut simulation = Simulation::new(config, catalog);

    let mut sweep = Vec::new();
    let mut swept = None;
    for second in 1..=60_u32 {
        let mut events = Vec::new();
        let outcome = simulation.step(Action::Wait, &mut events);
        if events.iter().any(|event| matches!(event, Event::MowerFired { .. })) {
            swept = Some((second, outcome));
            sweep = events;
            break;
        }
    }

    // two stride-1 walkers march from the entry while a third lands on the
    // sweep second itself
    let (second, outcome) = swept.expect("constant pressure must trip the mower");
    assert_eq!(second, 21);
    let spawned = sweep
        .iter()
        .position(|event| matches!(event, Event::ZombieSpawned { .. }))
        .expect("the pressed lane still spawns on the sweep second");
    let fired = sweep
        .iter()
        .position(|event| matches!(event, Event::MowerFired { .. }))
        .expect("the scan stopped on the mower second");
    assert!(spawned < fired, "the spawn lands ahead of the sweep: {sweep:?}");
    assert!(sweep.contains(&Event::MowerFired { lane: 0, cleared: 3 }));
    assert!(!outcome.done);
    assert!(
        field_part(outcome.observation.values())
            .iter()
            .all(|value| *value != 2.0),
        "the sweep leaves no zombie standing"
    );
}

#[test]
fn identical_configurations_replay_identically() {
    let config = SimulationConfig {
        seed: 42,
        ..SimulationConfig::default()
    };

    let run = || {
        let mut simulation = Simulation::new(config, roster::standard());
        let mut log = Vec::new();
        let mut observations = Vec::new();
        for second in 0..40_u32 {
            let action = match second {
                0 => Action::Place {
                    kind: SUNFLOWER,
                    cell: CellCoord::new(0, 2),
                },
                5 => Action::Place {
                    kind: SUNFLOWER,
                    cell: CellCoord::new(1, 2),
                },
                _ => Action::Wait,
            };
            let mut events = Vec::new();
            let outcome = simulation.step(action, &mut events);
            log.extend(events);
            observations.push(outcome.observation.into_vec());
        }
        (log, observations)
    };

    assert_eq!(run(), run());
}

#[test]
fn renders_show_the_clock_the_tags_and_the_balance() {
    let mut simulation = Simulation::new(quiet_config(1), roster::standard());
    assert!(simulation.render().starts_with("time 0s, sun 150"));

    let mut events = Vec::new();
    let _ = simulation.step(
        Action::Place {
            kind: SUNFLOWER,
            cell: CellCoord::new(0, 2),
        },
        &mut events,
    );

    let rendered = simulation.render();
    assert!(rendered.starts_with("time 1s, sun 100"));
    assert!(rendered.contains("[Sunf]"));
    assert!(rendered.contains("[    ]"));
}
