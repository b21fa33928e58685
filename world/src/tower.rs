//! Stationary towers that lock onto the nearest enemy in range and fire on a cooldown.

use canvas_td_core::{EntityId, TowerTemplate, Vector2D, VectorError};

use crate::entity::Bounds;

/// Tower built from a copied [`TowerTemplate`].
#[derive(Clone, Debug)]
pub struct Tower {
    template: TowerTemplate,
    position: Vector2D,
    size: f64,
    center: Vector2D,
    radius: f64,
    locked_target: Option<EntityId>,
    last_attack_time: f64,
}

impl Tower {
    /// Creates a square tower of side `cell_size` whose top-left corner sits at `position`.
    ///
    /// The targeting radius is the template's range multiplied by the cell size.
    pub fn new(
        template: TowerTemplate,
        position: Vector2D,
        cell_size: f64,
    ) -> Result<Self, VectorError> {
        let center = position + Vector2D::new(cell_size / 2.0, cell_size / 2.0)?;
        let radius = cell_size * template.range;
        Ok(Self {
            template,
            position,
            size: cell_size,
            center,
            radius,
            locked_target: None,
            last_attack_time: 0.0,
        })
    }

    /// Template the tower was built from.
    #[must_use]
    pub const fn template(&self) -> &TowerTemplate {
        &self.template
    }

    /// Top-left corner in pixels.
    #[must_use]
    pub const fn position(&self) -> Vector2D {
        self.position
    }

    /// Side length in pixels.
    #[must_use]
    pub const fn size(&self) -> f64 {
        self.size
    }

    /// Centre of the tower and of its range circle.
    #[must_use]
    pub const fn center(&self) -> Vector2D {
        self.center
    }

    /// Targeting radius in pixels.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Enemy the tower is currently aiming at.
    #[must_use]
    pub const fn locked_target(&self) -> Option<EntityId> {
        self.locked_target
    }

    /// Timestamp of the last attack in milliseconds.
    #[must_use]
    pub const fn last_attack_time(&self) -> f64 {
        self.last_attack_time
    }

    /// Distance from the tower centre to the closest point of `bounds`.
    #[must_use]
    pub fn distance_to(&self, bounds: &Bounds) -> f64 {
        self.distance_squared_to(bounds).sqrt()
    }

    /// Whether the range circle touches or overlaps `bounds`.
    #[must_use]
    pub fn is_in_range(&self, bounds: &Bounds) -> bool {
        self.distance_squared_to(bounds) <= self.radius * self.radius
    }

    /// Locks onto the nearest candidate in range, or clears the lock when none is.
    ///
    /// Candidates at equal distance keep the one encountered first.
    pub fn acquire_target<I>(&mut self, candidates: I) -> Option<EntityId>
    where
        I: IntoIterator<Item = (EntityId, Bounds)>,
    {
        let mut nearest: Option<(EntityId, f64)> = None;
        for (id, bounds) in candidates {
            if !self.is_in_range(&bounds) {
                continue;
            }
            let distance = self.distance_to(&bounds);
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((id, distance));
            }
        }
        self.locked_target = nearest.map(|(id, _)| id);
        self.locked_target
    }

    /// Fires at the locked target once the cooldown has elapsed.
    ///
    /// Returns the target and the damage to subtract from its health.
    pub fn attack(&mut self, time_ms: f64) -> Option<(EntityId, f64)> {
        let target = self.locked_target?;
        let cooldown_seconds = 1.0 / self.template.attacks_per_second;
        if (time_ms - self.last_attack_time) / 1000.0 > cooldown_seconds {
            self.last_attack_time = time_ms;
            Some((target, self.template.damage))
        } else {
            None
        }
    }

    fn distance_squared_to(&self, bounds: &Bounds) -> f64 {
        let (x, y) = bounds.closest_point(self.center.x(), self.center.y());
        let dx = self.center.x() - x;
        let dy = self.center.y() - y;
        dx * dx + dy * dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tower_centred_at_origin(range: f64, attacks_per_second: f64) -> Tower {
        let template = TowerTemplate {
            range,
            attacks_per_second,
            ..TowerTemplate::default()
        };
        let position = Vector2D::new(-5.0, -5.0).expect("finite");
        Tower::new(template, position, 10.0).expect("finite geometry")
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let tower = tower_centred_at_origin(1.0, 1.0);
        assert_eq!(tower.center(), Vector2D::ZERO);
        assert_eq!(tower.radius(), 10.0);

        let touching = Bounds::new(10.0, -5.0, 10.0, 10.0);
        let beyond = Bounds::new(10.01, -5.0, 10.0, 10.0);
        assert!(tower.is_in_range(&touching));
        assert!(!tower.is_in_range(&beyond));
    }

    #[test]
    fn locks_onto_the_nearest_enemy_not_the_first() {
        let mut tower = tower_centred_at_origin(3.0, 1.0);
        let far = (EntityId::new(1), Bounds::new(20.0, 0.0, 10.0, 10.0));
        let near = (EntityId::new(2), Bounds::new(5.0, 0.0, 10.0, 10.0));
        let out_of_range = (EntityId::new(3), Bounds::new(100.0, 0.0, 10.0, 10.0));

        assert_eq!(
            tower.acquire_target([far, near, out_of_range]),
            Some(EntityId::new(2))
        );
    }

    #[test]
    fn equal_distances_keep_the_first_candidate() {
        let mut tower = tower_centred_at_origin(3.0, 1.0);
        let left = (EntityId::new(7), Bounds::new(-20.0, -5.0, 10.0, 10.0));
        let right = (EntityId::new(8), Bounds::new(10.0, -5.0, 10.0, 10.0));

        assert_eq!(tower.acquire_target([left, right]), Some(EntityId::new(7)));
    }

    #[test]
    fn lock_clears_when_nothing_is_in_range() {
        let mut tower = tower_centred_at_origin(1.0, 1.0);
        let near = (EntityId::new(1), Bounds::new(0.0, 0.0, 10.0, 10.0));
        let _ = tower.acquire_target([near]);
        assert_eq!(tower.locked_target(), Some(EntityId::new(1)));

        assert_eq!(tower.acquire_target(std::iter::empty::<(EntityId, Bounds)>()), None);
        assert_eq!(tower.attack(10_000.0), None);
    }

    #[test]
    fn attack_respects_cooldown() {
        let mut tower = tower_centred_at_origin(1.0, 2.0);
        let _ = tower.acquire_target([(EntityId::new(4), Bounds::new(0.0, 0.0, 10.0, 10.0))]);

        assert_eq!(tower.attack(1_000.0), Some((EntityId::new(4), 2.0)));
        assert_eq!(tower.last_attack_time(), 1_000.0);
        assert_eq!(tower.attack(1_400.0), None);
        assert_eq!(tower.attack(1_600.0), Some((EntityId::new(4), 2.0)));
        assert_eq!(tower.last_attack_time(), 1_600.0);
    }
}
