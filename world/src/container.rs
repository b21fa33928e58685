//! Z-ordered entity storage and the per-frame update pass.

use canvas_td_core::{EntityId, Event};

use crate::{
    enemy::EnemyOutcome,
    entity::{Bounds, Entity},
    map::GridMap,
    player::Player,
};

/// Entities ordered by z-index.
///
/// Entities are stored in ascending z-index order and traversed from the back,
/// so higher z-indices are processed first and an entity removing itself never
/// disturbs the entities still waiting for their turn.
#[derive(Clone, Debug, Default)]
pub struct EntityContainer {
    entities: Vec<Entity>,
}

impl EntityContainer {
    /// Creates an empty container.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    /// Inserts `entity`, using the current entity count when no z-index is given.
    ///
    /// Entities sharing a z-index are traversed newest first.
    pub fn add_entity(&mut self, mut entity: Entity, z_index: Option<i32>) {
        let z_index =
            z_index.unwrap_or_else(|| i32::try_from(self.entities.len()).unwrap_or(i32::MAX));
        entity.set_z_index(z_index);
        self.entities.push(entity);
        self.entities.sort_by_key(Entity::z_index);
    }

    /// Removes the entity with `id`. Unknown identifiers are ignored.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|entity| entity.id() == id)?;
        Some(self.entities.remove(index))
    }

    /// Whether an entity with `id` is stored.
    #[must_use]
    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.entities.iter().any(|entity| entity.id() == id)
    }

    /// Looks up an entity by identifier.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id() == id)
    }

    /// Iterates in traversal order, highest z-index first.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter().rev()
    }

    /// Number of stored entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the container is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Updates every entity once in traversal order.
    pub(crate) fn update(
        &mut self,
        timestamp_ms: f64,
        map: &GridMap,
        player: &mut Player,
        out_events: &mut Vec<Event>,
    ) {
        let mut index = self.entities.len();
        while index > 0 {
            index -= 1;
            if index >= self.entities.len() {
                continue;
            }
            if self.entities[index].as_tower().is_some() {
                self.update_tower(index, timestamp_ms, out_events);
            } else {
                self.update_enemy(index, map, player, out_events);
            }
        }
    }

    fn update_tower(&mut self, index: usize, timestamp_ms: f64, out_events: &mut Vec<Event>) {
        let candidates: Vec<(EntityId, Bounds)> = self
            .iter()
            .filter_map(|entity| entity.targetable_bounds().map(|bounds| (entity.id(), bounds)))
            .collect();

        let tower_id = self.entities[index].id();
        let Some(tower) = self.entities[index].as_tower_mut() else {
            return;
        };
        let _ = tower.acquire_target(candidates);
        let Some((target, damage)) = tower.attack(timestamp_ms) else {
            return;
        };

        let enemy = self
            .entities
            .iter_mut()
            .find(|entity| entity.id() == target)
            .and_then(Entity::as_enemy_mut);
        if let Some(enemy) = enemy {
            enemy.apply_damage(damage);
            out_events.push(Event::TowerFired {
                tower: tower_id,
                target,
                damage,
            });
        }
    }

    fn update_enemy(
        &mut self,
        index: usize,
        map: &GridMap,
        player: &mut Player,
        out_events: &mut Vec<Event>,
    ) {
        let id = self.entities[index].id();
        let Some(enemy) = self.entities[index].as_enemy_mut() else {
            return;
        };

        match enemy.update(map) {
            EnemyOutcome::Killed => {
                let (value, score) = (enemy.value(), enemy.score());
                player.add_money(value);
                player.add_score(score);
                let _ = self.entities.remove(index);
                tracing::debug!(enemy = id.get(), value, score, "enemy killed");
                out_events.push(Event::EnemyKilled {
                    enemy: id,
                    value,
                    score,
                });
            }
            EnemyOutcome::Escaped => {
                let already_defeated = player.is_defeated();
                player.lose_life();
                let _ = self.entities.remove(index);
                tracing::debug!(enemy = id.get(), lives = player.lives(), "enemy escaped");
                out_events.push(Event::EnemyEscaped { enemy: id });
                if !already_defeated && player.is_defeated() {
                    tracing::info!("player lost the final life");
                    out_events.push(Event::PlayerDefeated);
                }
            }
            EnemyOutcome::ReachedWaypoint { index, waypoint } => {
                out_events.push(Event::EnemyReachedWaypoint {
                    enemy: id,
                    index,
                    waypoint,
                });
            }
            EnemyOutcome::Moved | EnemyOutcome::Idle => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entity::EntityKind, tower::Tower};
    use canvas_td_core::{TowerTemplate, Vector2D};

    fn tower(id: u32) -> Entity {
        let tower = Tower::new(TowerTemplate::default(), Vector2D::ZERO, 30.0).expect("finite");
        Entity::new(EntityId::new(id), EntityKind::Tower(tower))
    }

    fn traversal(container: &EntityContainer) -> Vec<i32> {
        container.iter().map(Entity::z_index).collect()
    }

    #[test]
    fn traverses_highest_z_index_first() {
        let mut container = EntityContainer::new();
        container.add_entity(tower(0), Some(3));
        container.add_entity(tower(1), Some(1));
        container.add_entity(tower(2), Some(2));

        assert_eq!(traversal(&container), vec![3, 2, 1]);
    }

    #[test]
    fn missing_z_index_defaults_to_entity_count_and_zero_is_honoured() {
        let mut container = EntityContainer::new();
        container.add_entity(tower(0), None);
        container.add_entity(tower(1), None);
        container.add_entity(tower(2), Some(0));

        let ids: Vec<u32> = container.iter().map(|entity| entity.id().get()).collect();
        assert_eq!(traversal(&container), vec![1, 0, 0]);
        assert_eq!(ids, vec![1, 2, 0]);
    }

    #[test]
    fn removing_unknown_entities_is_a_no_op() {
        let mut container = EntityContainer::new();
        container.add_entity(tower(0), None);

        assert!(container.remove_entity(EntityId::new(9)).is_none());
        assert_eq!(container.len(), 1);
        assert!(container.contains_entity(EntityId::new(0)));

        assert!(container.remove_entity(EntityId::new(0)).is_some());
        assert!(container.is_empty());
        assert!(container.get(EntityId::new(0)).is_none());
    }
}
