//! Waypoint-following enemies.
//!
//! Movement is deliberately discrete: an enemy moves one pixel per axis per
//! update towards the cell of its next waypoint. An axis that already matches
//! the target holds still until the enemy is inside the target cell. From there
//! it keeps moving in its current direction until its top-left corner lands on
//! the waypoint's alignment pixel, then turns towards the following waypoint.

use std::cmp::Ordering;

use canvas_td_core::{CellCoord, Direction, EnemySpec, Vector2D};

use crate::{entity::Bounds, map::GridMap};

/// Result of a single enemy update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyOutcome {
    /// The enemy is off the grid or already dead and did nothing.
    Idle,
    /// The enemy moved towards its next waypoint.
    Moved,
    /// The enemy aligned with a waypoint and turned towards the next one.
    ReachedWaypoint {
        /// Index of the waypoint that was reached.
        index: usize,
        /// Cell of the waypoint that was reached.
        waypoint: CellCoord,
    },
    /// The enemy's health was exhausted.
    Killed,
    /// The enemy stood on the end cell.
    Escaped,
}

/// Enemy walking the map's waypoint route.
#[derive(Clone, Debug)]
pub struct Enemy {
    position: Vector2D,
    width: f64,
    height: f64,
    max_health: f64,
    health: f64,
    value: u32,
    score: u64,
    waypoint_counter: usize,
    next_waypoint: CellCoord,
    grid_position: Option<CellCoord>,
    direction: Option<Direction>,
    alive: bool,
}

impl Enemy {
    /// Places a new enemy on the map's start cell, heading for the second waypoint.
    #[must_use]
    pub fn spawn(spec: &EnemySpec, map: &GridMap) -> Self {
        let mut enemy = Self {
            position: map.spawn_position(),
            width: spec.width,
            height: spec.height,
            max_health: spec.health,
            health: spec.health,
            value: spec.value,
            score: spec.score,
            waypoint_counter: 1,
            next_waypoint: map.waypoints().get(1).copied().unwrap_or(map.end_cell()),
            grid_position: Some(map.start_cell()),
            direction: None,
            alive: true,
        };
        enemy.direction = enemy.direction_towards(map.waypoint_pixel(1));
        enemy
    }

    /// Top-left corner in pixels.
    #[must_use]
    pub const fn position(&self) -> Vector2D {
        self.position
    }

    /// Bounding box used for targeting and drawing.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.position.x(), self.position.y(), self.width, self.height)
    }

    /// Remaining health. May be negative once the enemy has been overkilled.
    #[must_use]
    pub const fn health(&self) -> f64 {
        self.health
    }

    /// Health the enemy spawned with.
    #[must_use]
    pub const fn max_health(&self) -> f64 {
        self.max_health
    }

    /// Remaining health as a fraction of the maximum, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn health_fraction(&self) -> f64 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    /// Money paid out on death.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Score paid out on death.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Index of the waypoint currently being approached.
    #[must_use]
    pub const fn waypoint_counter(&self) -> usize {
        self.waypoint_counter
    }

    /// Cell of the waypoint currently being approached.
    #[must_use]
    pub const fn next_waypoint(&self) -> CellCoord {
        self.next_waypoint
    }

    /// Cell the enemy occupied at the start of its last update.
    #[must_use]
    pub const fn grid_position(&self) -> Option<CellCoord> {
        self.grid_position
    }

    /// Direction the enemy keeps moving in while aligning with a waypoint.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Whether the enemy is still part of the simulation.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Subtracts `damage` from the remaining health without clamping.
    pub fn apply_damage(&mut self, damage: f64) {
        self.health -= damage;
    }

    /// Advances the enemy by one step.
    pub fn update(&mut self, map: &GridMap) -> EnemyOutcome {
        if !self.alive {
            return EnemyOutcome::Idle;
        }
        if self.health <= 0.0 {
            self.alive = false;
            return EnemyOutcome::Killed;
        }

        self.grid_position = map.find_grid_cell(self.position.x(), self.position.y());
        let Some(grid) = self.grid_position else {
            return EnemyOutcome::Idle;
        };

        let target = self.next_waypoint;
        self.step_vertically(grid, target);
        self.step_horizontally(grid, target);

        if grid == map.end_cell() {
            self.alive = false;
            return EnemyOutcome::Escaped;
        }

        if grid == target && self.is_aligned_with(map.waypoint_pixel(self.waypoint_counter)) {
            let index = self.waypoint_counter;
            self.waypoint_counter += 1;
            if let Some(&next) = map.waypoints().get(self.waypoint_counter) {
                self.next_waypoint = next;
            }
            self.direction = self.direction_towards(map.waypoint_pixel(self.waypoint_counter));
            return EnemyOutcome::ReachedWaypoint {
                index,
                waypoint: target,
            };
        }

        EnemyOutcome::Moved
    }

    fn step_vertically(&mut self, grid: CellCoord, target: CellCoord) {
        let _ = match target.row().cmp(&grid.row()) {
            Ordering::Greater => self.position.add_to(Vector2D::UNIT_Y),
            Ordering::Less => self.position.subtract_from(Vector2D::UNIT_Y),
            Ordering::Equal if grid != target => return,
            Ordering::Equal => match self.direction {
                Some(Direction::South) => self.position.add_to(Vector2D::UNIT_Y),
                Some(Direction::North) => self.position.subtract_from(Vector2D::UNIT_Y),
                _ => return,
            },
        };
    }

    fn step_horizontally(&mut self, grid: CellCoord, target: CellCoord) {
        let _ = match target.column().cmp(&grid.column()) {
            Ordering::Greater => self.position.add_to(Vector2D::UNIT_X),
            Ordering::Less => self.position.subtract_from(Vector2D::UNIT_X),
            Ordering::Equal if grid != target => return,
            Ordering::Equal => match self.direction {
                Some(Direction::East) => self.position.add_to(Vector2D::UNIT_X),
                Some(Direction::West) => self.position.subtract_from(Vector2D::UNIT_X),
                _ => return,
            },
        };
    }

    fn is_aligned_with(&self, pixel: Option<Vector2D>) -> bool {
        pixel.is_some_and(|pixel| {
            pixel.x().floor() == self.position.x().floor()
                && pixel.y().floor() == self.position.y().floor()
        })
    }

    /// Vertical differences win over horizontal ones.
    fn direction_towards(&self, pixel: Option<Vector2D>) -> Option<Direction> {
        let pixel = pixel?;
        let (target_x, target_y) = (pixel.x().floor(), pixel.y().floor());
        let (x, y) = (self.position.x().floor(), self.position.y().floor());

        if target_y < y {
            Some(Direction::North)
        } else if target_y > y {
            Some(Direction::South)
        } else if target_x < x {
            Some(Direction::West)
        } else if target_x > x {
            Some(Direction::East)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapViewport;
    use canvas_td_core::MapDefinition;

    fn corner_map() -> GridMap {
        let definition = MapDefinition {
            cells_x: 3,
            cells_y: 3,
            terrain: ["S..", "P..", "PPE"].join(""),
            waypoints: vec![
                CellCoord::new(0, 0),
                CellCoord::new(0, 2),
                CellCoord::new(2, 2),
            ],
            ..MapDefinition::default()
        };
        GridMap::new(&definition, MapViewport::new(0.0, 0.0, 90.0, 90.0)).expect("valid map")
    }

    #[test]
    fn spawns_on_start_pixel_facing_the_second_waypoint() {
        let map = corner_map();
        let enemy = Enemy::spawn(&EnemySpec::default(), &map);

        assert_eq!(enemy.position(), map.spawn_position());
        assert_eq!(enemy.waypoint_counter(), 1);
        assert_eq!(enemy.next_waypoint(), CellCoord::new(0, 2));
        assert_eq!(enemy.direction(), Some(Direction::South));
        assert_eq!(enemy.health(), 50.0);
    }

    #[test]
    fn moves_one_pixel_per_update() {
        let map = corner_map();
        let mut enemy = Enemy::spawn(&EnemySpec::default(), &map);
        let before = enemy.position();

        assert_eq!(enemy.update(&map), EnemyOutcome::Moved);
        assert_eq!(enemy.position().x(), before.x());
        assert_eq!(enemy.position().y(), before.y() + 1.0);
    }

    #[test]
    fn turns_after_aligning_with_the_corner_waypoint() {
        let map = corner_map();
        let mut enemy = Enemy::spawn(&EnemySpec::default(), &map);

        let mut outcome = EnemyOutcome::Moved;
        for _ in 0..200 {
            outcome = enemy.update(&map);
            if outcome != EnemyOutcome::Moved {
                break;
            }
        }

        assert_eq!(
            outcome,
            EnemyOutcome::ReachedWaypoint {
                index: 1,
                waypoint: CellCoord::new(0, 2)
            }
        );
        assert_eq!(Some(enemy.position()), map.waypoint_pixel(1));
        assert_eq!(enemy.direction(), Some(Direction::East));
        assert_eq!(enemy.next_waypoint(), CellCoord::new(2, 2));
    }

    #[test]
    fn exhausted_health_wins_over_movement() {
        let map = corner_map();
        let mut enemy = Enemy::spawn(&EnemySpec::default(), &map);
        let before = enemy.position();

        enemy.apply_damage(60.0);
        assert_eq!(enemy.health(), -10.0);
        assert_eq!(enemy.health_fraction(), 0.0);
        assert_eq!(enemy.update(&map), EnemyOutcome::Killed);
        assert_eq!(enemy.position(), before);
        assert!(!enemy.is_alive());
        assert_eq!(enemy.update(&map), EnemyOutcome::Idle);
    }
}
