use std::time::Duration;

use canvas_td_core::{
    CellCoord, Command, EnemySpec, Event, IdAllocator, MapDefinition, SpawnScript,
};
use canvas_td_system_spawning::Spawning;
use canvas_td_world::{
    self as world,
    map::{GridMap, MapViewport},
    player::Player,
    query, World,
};

const FRAME: Duration = Duration::from_millis(16);

fn drain(spawning: &mut Spawning, frames: usize) -> Vec<Command> {
    let mut commands = Vec::new();
    for _ in 0..frames {
        spawning.handle(FRAME, &mut commands);
    }
    commands
}

#[test]
fn activating_frame_does_not_count_towards_the_schedule() {
    let mut spawning = Spawning::new(&SpawnScript::default());
    let mut commands = Vec::new();

    spawning.handle(Duration::from_secs(60), &mut commands);

    assert!(spawning.is_active());
    assert!(commands.is_empty());
    assert_eq!(spawning.elapsed(), Duration::ZERO);
}

#[test]
fn default_script_spawns_one_enemy_per_second() {
    let mut spawning = Spawning::new(&SpawnScript::default());
    let mut commands = Vec::new();
    spawning.handle(Duration::ZERO, &mut commands);

    let mut spawned_per_second = Vec::new();
    for _ in 0..10 {
        let before = commands.len();
        spawning.handle(Duration::from_secs(1), &mut commands);
        spawned_per_second.push(commands.len() - before);
    }

    assert_eq!(spawned_per_second, vec![1; 10]);
    assert!(commands.iter().all(|command| matches!(
        command,
        Command::SpawnEnemy { spec } if *spec == EnemySpec::default()
    )));
    assert_eq!(spawning.remaining(), 0);
}

#[test]
fn large_steps_release_every_due_spawn_at_once() {
    let mut spawning = Spawning::new(&SpawnScript::evenly_spaced(4, 500, EnemySpec::default()));
    let mut commands = Vec::new();
    spawning.handle(Duration::ZERO, &mut commands);
    spawning.handle(Duration::from_millis(1_600), &mut commands);

    assert_eq!(commands.len(), 3);
    assert_eq!(spawning.remaining(), 1);
}

#[test]
fn cancelled_schedule_never_spawns() {
    let mut spawning = Spawning::new(&SpawnScript::default());
    let _ = drain(&mut spawning, 1);
    spawning.cancel();

    assert!(drain(&mut spawning, 1_000).is_empty());
    assert_eq!(spawning.remaining(), 0);
}

#[test]
fn spawn_commands_place_enemies_on_the_start_cell() {
    let definition = MapDefinition {
        cells_x: 3,
        cells_y: 1,
        terrain: "SPE".to_owned(),
        waypoints: vec![CellCoord::new(0, 0), CellCoord::new(2, 0)],
        ..MapDefinition::default()
    };
    let map = GridMap::new(&definition, MapViewport::new(0.0, 0.0, 90.0, 30.0))
        .expect("valid map");
    let mut world = World::new(map, Player::default(), IdAllocator::new());

    let mut spawning = Spawning::new(&SpawnScript::evenly_spaced(2, 16, EnemySpec::default()));
    let commands = drain(&mut spawning, 3);
    assert_eq!(commands.len(), 2);

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    assert_eq!(query::enemy_count(&world), 2);
    assert!(events
        .iter()
        .all(|event| matches!(event, Event::EnemySpawned { cell, .. } if *cell == CellCoord::new(0, 0))));
}
