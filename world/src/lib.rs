#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Canvas TD.
//!
//! The world owns the active [`GridMap`](map::GridMap), the
//! [`EntityContainer`](container::EntityContainer) and the
//! [`Player`](player::Player). It only changes through [`apply`], which
//! executes a [`Command`] and reports what happened as [`Event`] values.
//! Read access goes through the [`query`] module.

pub mod container;
pub mod enemy;
pub mod entity;
pub mod map;
pub mod player;
pub mod tower;

use canvas_td_core::{
    Command, EnemySpec, Event, IdAllocator, PlacementError, Terrain, TowerTemplate, Vector2D,
};

use crate::{
    container::EntityContainer,
    enemy::Enemy,
    entity::{Entity, EntityKind},
    map::GridMap,
    player::Player,
    tower::Tower,
};

/// Towers are inserted above every enemy so they act before enemies within a frame.
const TOWER_Z_INDEX_BASE: i32 = 1_000_000;

/// Represents the authoritative simulation state.
#[derive(Debug)]
pub struct World {
    map: GridMap,
    container: EntityContainer,
    player: Player,
    ids: IdAllocator,
}

impl World {
    /// Creates a world on `map` with an empty container.
    ///
    /// `ids` is the session's identifier source; every entity spawned into the
    /// world draws its identifier from it.
    #[must_use]
    pub fn new(map: GridMap, player: Player, ids: IdAllocator) -> Self {
        Self {
            map,
            container: EntityContainer::new(),
            player,
            ids,
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnEnemy { spec } => spawn_enemy(world, &spec, out_events),
        Command::PlaceTower { template, position } => {
            match place_tower(world, template, position, out_events) {
                Ok(()) => {}
                Err(reason) => {
                    tracing::warn!(%reason, "tower placement rejected");
                    out_events.push(Event::TowerPlacementRejected { reason });
                }
            }
        }
        Command::Tick { timestamp_ms } => {
            let World {
                map,
                container,
                player,
                ..
            } = world;
            container.update(timestamp_ms, map, player, out_events);
        }
    }
}

fn spawn_enemy(world: &mut World, spec: &EnemySpec, out_events: &mut Vec<Event>) {
    if let Err(error) = spec.validate() {
        tracing::warn!(%error, "enemy spawn ignored");
        return;
    }
    let id = world.ids.allocate();
    let enemy = Enemy::spawn(spec, &world.map);
    world
        .container
        .add_entity(Entity::new(id, EntityKind::Enemy(enemy)), None);

    let cell = world.map.start_cell();
    tracing::debug!(enemy = id.get(), ?cell, "enemy spawned");
    out_events.push(Event::EnemySpawned { enemy: id, cell });
}

fn place_tower(
    world: &mut World,
    template: TowerTemplate,
    position: Vector2D,
    out_events: &mut Vec<Event>,
) -> Result<(), PlacementError> {
    template.validate().map_err(|_| PlacementError::InvalidTower)?;
    let cell = world
        .map
        .find_grid_cell(position.x(), position.y())
        .ok_or(PlacementError::OutsideMap)?;
    if world.map.terrain_of(cell) != Some(Terrain::Ground) {
        return Err(PlacementError::NotGround);
    }
    if query::tower_at(world, cell).is_some() {
        return Err(PlacementError::Occupied);
    }

    let origin = world
        .map
        .cell_origin(cell)
        .ok_or(PlacementError::OutsideMap)?;
    let cost = template.cost;
    let tower = Tower::new(template, origin, world.map.cell_size())
        .map_err(|_| PlacementError::InvalidTower)?;

    let available = world.player.money();
    if !world.player.try_spend(cost) {
        return Err(PlacementError::InsufficientFunds { cost, available });
    }

    let id = world.ids.allocate();
    let z_index = TOWER_Z_INDEX_BASE.saturating_add(query::tower_count(world) as i32);
    world
        .container
        .add_entity(Entity::new(id, EntityKind::Tower(tower)), Some(z_index));

    tracing::info!(tower = id.get(), ?cell, cost, "tower placed");
    out_events.push(Event::TowerPlaced {
        tower: id,
        cell,
        cost,
    });
    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use canvas_td_core::{CellCoord, EntityId};

    use super::World;
    use crate::{container::EntityContainer, map::GridMap, player::Player};

    /// Active map.
    #[must_use]
    pub fn map(world: &World) -> &GridMap {
        &world.map
    }

    /// Player counters.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Every entity in traversal order.
    #[must_use]
    pub fn entities(world: &World) -> &EntityContainer {
        &world.container
    }

    /// Number of enemies currently on the map.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world
            .container
            .iter()
            .filter(|entity| entity.as_enemy().is_some())
            .count()
    }

    /// Number of towers built so far.
    #[must_use]
    pub fn tower_count(world: &World) -> usize {
        world
            .container
            .iter()
            .filter(|entity| entity.as_tower().is_some())
            .count()
    }

    /// Tower occupying `cell`, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<EntityId> {
        world.container.iter().find_map(|entity| {
            let tower = entity.as_tower()?;
            let center = tower.center();
            (world.map.find_grid_cell(center.x(), center.y()) == Some(cell)).then(|| entity.id())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapViewport;
    use canvas_td_core::{CellCoord, EntityId, MapDefinition};

    fn small_world(money: u32) -> World {
        let definition = MapDefinition {
            cells_x: 3,
            cells_y: 2,
            terrain: "SPE...".to_owned(),
            waypoints: vec![CellCoord::new(0, 0), CellCoord::new(2, 0)],
            ..MapDefinition::default()
        };
        let map = GridMap::new(&definition, MapViewport::new(0.0, 0.0, 90.0, 60.0))
            .expect("valid map");
        World::new(map, Player::new(money, 20), IdAllocator::new())
    }

    fn place(world: &mut World, x: f64, y: f64) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::PlaceTower {
                template: TowerTemplate::default(),
                position: Vector2D::new(x, y).expect("finite"),
            },
            &mut events,
        );
        events
    }

    #[test]
    fn placing_a_tower_charges_its_cost_and_fills_the_cell() {
        let mut world = small_world(500);
        let events = place(&mut world, 45.0, 45.0);

        assert_eq!(
            events,
            vec![Event::TowerPlaced {
                tower: EntityId::new(0),
                cell: CellCoord::new(1, 1),
                cost: 100,
            }]
        );
        assert_eq!(query::player(&world).money(), 400);

        let entity = query::entities(&world)
            .iter()
            .next()
            .expect("tower stored");
        let tower = entity.as_tower().expect("entity is a tower");
        assert_eq!(tower.position(), Vector2D::new(30.0, 30.0).expect("finite"));
        assert_eq!(tower.size(), 30.0);
        assert_eq!(tower.radius(), 60.0);
    }

    #[test]
    fn placement_rejections_leave_state_untouched() {
        let mut world = small_world(150);

        assert_eq!(
            place(&mut world, 15.0, 15.0),
            vec![Event::TowerPlacementRejected {
                reason: PlacementError::NotGround
            }]
        );
        assert_eq!(
            place(&mut world, 500.0, 15.0),
            vec![Event::TowerPlacementRejected {
                reason: PlacementError::OutsideMap
            }]
        );

        let _ = place(&mut world, 45.0, 45.0);
        assert_eq!(
            place(&mut world, 40.0, 40.0),
            vec![Event::TowerPlacementRejected {
                reason: PlacementError::Occupied
            }]
        );
        assert_eq!(
            place(&mut world, 75.0, 45.0),
            vec![Event::TowerPlacementRejected {
                reason: PlacementError::InsufficientFunds {
                    cost: 100,
                    available: 50
                }
            }]
        );
        assert_eq!(query::tower_count(&world), 1);
        assert_eq!(query::player(&world).money(), 50);
    }

    #[test]
    fn unusable_templates_and_specs_are_refused() {
        let mut world = small_world(500);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                template: TowerTemplate {
                    range: f64::NAN,
                    ..TowerTemplate::default()
                },
                position: Vector2D::new(45.0, 45.0).expect("finite"),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnEnemy {
                spec: EnemySpec {
                    width: -10.0,
                    ..EnemySpec::default()
                },
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::TowerPlacementRejected {
                reason: PlacementError::InvalidTower
            }]
        );
        assert!(query::entities(&world).is_empty());
        assert_eq!(query::player(&world).money(), 500);
    }

    #[test]
    fn towers_are_traversed_before_enemies() {
        let mut world = small_world(500);
        let _ = place(&mut world, 45.0, 45.0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                spec: EnemySpec::default(),
            },
            &mut events,
        );

        let order: Vec<bool> = query::entities(&world)
            .iter()
            .map(|entity| entity.as_tower().is_some())
            .collect();
        assert_eq!(order, vec![true, false]);
        assert_eq!(query::enemy_count(&world), 1);
    }
}
