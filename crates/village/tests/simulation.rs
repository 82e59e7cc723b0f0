use std::fs;

use engine::{run_app, LoopConfig, StopReason};
use village::config::{BirthIntervals, InitialPopulation, InvasionConfig};
use village::sim::{InvaderPhase, SelectionOutcome};
use village::{Direction, Role, RunConfig, SimConfig, Simulation, SimulationStatus, VillageScene};

fn quiet_config() -> SimConfig {
    SimConfig {
        invasion: InvasionConfig {
            initial_delay: 10_000.0,
            ..InvasionConfig::default()
        },
        ..SimConfig::default()
    }
}

/// A single invader crossing unit-length phases in two ticks each.
fn raid_config(farmers: i32, guards: i32) -> SimConfig {
    SimConfig {
        initial_population: InitialPopulation {
            farmers,
            guards,
            miners: 2,
        },
        birth_intervals: BirthIntervals {
            farmer: 1_000.0,
            ..BirthIntervals::default()
        },
        invasion: InvasionConfig {
            initial_delay: 1.0,
            min_interval: 1_000.0,
            max_interval: 1_000.0,
            speed: 0.5,
            approach_distance: 1.0,
            corridor_distance: 1.0,
            inner_distance: 1.0,
            ..InvasionConfig::default()
        },
        ..SimConfig::default()
    }
}

#[test]
fn first_farmer_is_born_at_the_farmer_interval() {
    let mut sim = Simulation::new(SimConfig::default());
    for _ in 0..19 {
        sim.advance(0.25);
    }
    assert_eq!(sim.raw_count(Role::Farmer), 1);
    sim.advance(0.25);
    assert_eq!(sim.now(), 5.0);
    assert_eq!(sim.raw_count(Role::Farmer), 2);
    assert_eq!(sim.raw_count(Role::Guard), 1);
    assert_eq!(sim.raw_count(Role::Miner), 2);
}

#[test]
fn one_long_frame_catches_up_every_birth() {
    let mut sim = Simulation::new(SimConfig::default());
    sim.advance(12.0);
    assert_eq!(sim.raw_count(Role::Farmer), 3);
    assert_eq!(sim.next_birth_due(), 15.0);
}

#[test]
fn depleted_miners_pause_decay() {
    let mut sim = Simulation::new(quiet_config());
    sim.advance(8.0);
    assert_eq!(sim.raw_count(Role::Miner), 1);
    sim.advance(8.0);
    assert_eq!(sim.raw_count(Role::Miner), 0);
    assert_eq!(sim.next_decay_due(), 24.0);
    assert_eq!(sim.miner_decay_progress(), 0.0);

    sim.advance(100.0);
    assert_eq!(sim.raw_count(Role::Miner), 0);
    assert_eq!(sim.next_decay_due(), 124.0);
}

#[test]
fn decay_deadline_tracks_the_clock_while_no_miners() {
    let mut sim = Simulation::new(quiet_config());
    sim.advance(16.0);
    assert_eq!(sim.raw_count(Role::Miner), 0);

    sim.select_role(Role::Miner);
    for _ in 0..20 {
        sim.advance(0.5);
    }
    assert_eq!(sim.raw_count(Role::Miner), 1);
    assert_eq!(sim.next_decay_due(), 33.5);
    sim.advance(7.5);
    assert_eq!(sim.raw_count(Role::Miner), 0);
}

#[test]
fn sparkles_accumulate_only_while_mining() {
    let mut sim = Simulation::new(quiet_config());
    sim.advance(1.0);
    assert_eq!(sim.sparkle_count(), 1);
    sim.advance(15.0);
    let at_depletion = sim.sparkle_count();
    sim.advance(50.0);
    assert_eq!(sim.sparkle_count(), at_depletion);
}

#[test]
fn undefended_wall_lets_invader_through() {
    let mut sim = Simulation::new(raid_config(10, 0));
    for _ in 0..3 {
        sim.advance(1.0);
    }
    assert_eq!(sim.invaders().len(), 1);
    assert_eq!(sim.invaders()[0].phase(), InvaderPhase::Breaching);
    assert_eq!(sim.defense_count(), 0);
}

#[test]
fn guard_repels_invader() {
    let mut sim = Simulation::new(raid_config(10, 3));
    for _ in 0..3 {
        sim.advance(1.0);
    }
    assert!(sim.invaders().is_empty());
    assert_eq!(sim.raw_count(Role::Guard), 2);
    assert_eq!(sim.defense_count(), 1);
    assert_eq!(sim.invasion_stats().repelled, 1);
}

#[test]
fn breach_that_empties_the_farms_ends_the_run() {
    let mut sim = Simulation::new(raid_config(4, 0));
    for _ in 0..7 {
        sim.advance(1.0);
    }
    assert_eq!(sim.status(), SimulationStatus::Dead);
    assert_eq!(sim.raw_count(Role::Farmer), -1);
    assert_eq!(sim.display_count(Role::Farmer), 0);
    assert_eq!(sim.active_role(), None);

    let frozen = sim.summary();
    for _ in 0..50 {
        sim.advance(1.0);
        sim.select_direction(Direction::Left);
    }
    assert_eq!(sim.summary(), frozen);
}

#[test]
fn selection_commands_inside_debounce_are_dropped() {
    let mut sim = Simulation::new(quiet_config());
    sim.advance(0.2);
    assert_eq!(
        sim.select_direction(Direction::Left),
        SelectionOutcome::Debounced
    );
    assert_eq!(sim.active_role(), Some(Role::Farmer));
    sim.advance(0.3);
    assert!(matches!(
        sim.select_direction(Direction::Right),
        SelectionOutcome::Changed { to: Role::Miner, .. }
    ));
    sim.advance(0.25);
    assert_eq!(
        sim.select_direction(Direction::Right),
        SelectionOutcome::Debounced
    );
    assert_eq!(sim.active_role(), Some(Role::Miner));
    sim.advance(0.25);
    assert!(matches!(
        sim.select_direction(Direction::Right),
        SelectionOutcome::Changed { to: Role::Guard, .. }
    ));
}

#[test]
fn every_direction_follows_the_role_triangle() {
    let cases = [
        (Role::Farmer, Direction::Left, Role::Guard),
        (Role::Farmer, Direction::Down, Role::Miner),
        (Role::Guard, Direction::Up, Role::Miner),
        (Role::Guard, Direction::Right, Role::Farmer),
        (Role::Miner, Direction::Left, Role::Farmer),
        (Role::Miner, Direction::Down, Role::Guard),
    ];
    for (start, direction, expected) in cases {
        let mut sim = Simulation::new(quiet_config());
        sim.advance(1.0);
        sim.select_role(start);
        sim.select_direction(direction);
        assert_eq!(sim.active_role(), Some(expected), "{start:?} {direction:?}");
    }
}

#[test]
fn one_huge_frame_late_in_a_run_still_returns() {
    let config = SimConfig {
        invasion: InvasionConfig {
            initial_delay: 2.2e6,
            ..InvasionConfig::default()
        },
        ..SimConfig::default()
    };
    let mut sim = Simulation::new(config);
    sim.advance(2_200_000.0);
    assert_eq!(sim.now(), 2.2e6);
    assert_eq!(sim.invasion_stats().spawned, 1);
    assert!(sim.next_invasion_due() > sim.now());

    sim.advance(1.05);
    assert_eq!(sim.invasion_stats().spawned, 11);
    assert!(sim.next_invasion_due() > sim.now());
}

#[test]
fn headless_run_replays_input_script() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("input.txt");
    fs::write(&script, "# switch to miners early\n0.5 tap right\n").expect("write script");

    let mut scene = VillageScene::new(quiet_config(), RunConfig::default());
    let config = LoopConfig {
        target_tps: 4,
        max_sim_seconds: Some(5.0),
        input_script: Some(script),
        ..LoopConfig::default()
    };
    let report = run_app(config, &mut scene).expect("run");

    assert_eq!(report.ticks, 20);
    assert_eq!(report.stop_reason, StopReason::TimeLimit);
    let sim = scene.simulation();
    assert_eq!(sim.active_role(), Some(Role::Miner));
    assert_eq!(sim.raw_count(Role::Farmer), 1);
    assert_eq!(sim.next_birth_due(), 10.75);
}

#[test]
fn headless_run_stops_when_the_village_falls() {
    let mut scene = VillageScene::new(raid_config(4, 0), RunConfig::default());
    let config = LoopConfig {
        target_tps: 1,
        max_sim_seconds: Some(60.0),
        ..LoopConfig::default()
    };
    let report = run_app(config, &mut scene).expect("run");

    assert_eq!(report.stop_reason, StopReason::SceneQuit);
    assert_eq!(report.ticks, 7);
    assert_eq!(scene.summary().status, SimulationStatus::Dead);
    assert_eq!(scene.summary().invaders.breached, 1);
}
