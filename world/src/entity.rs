//! Closed set of simulation entities stored in the container.

use canvas_td_core::EntityId;

use crate::{enemy::Enemy, tower::Tower};

/// Axis-aligned rectangle in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Bounds {
    /// Creates a rectangle from its top-left corner and extent.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Left edge.
    #[must_use]
    pub const fn left(&self) -> f64 {
        self.left
    }

    /// Top edge.
    #[must_use]
    pub const fn top(&self) -> f64 {
        self.top
    }

    /// Horizontal extent.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Vertical extent.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Point of the rectangle closest to `(x, y)`.
    ///
    /// A rectangle with a negative extent collapses onto its far edge.
    #[must_use]
    pub fn closest_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x.max(self.left).min(self.left + self.width),
            y.max(self.top).min(self.top + self.height),
        )
    }
}

/// Behaviour attached to an entity.
#[derive(Clone, Debug)]
pub enum EntityKind {
    /// Stationary attacker.
    Tower(Tower),
    /// Waypoint follower.
    Enemy(Enemy),
}

/// Entity stored in the container together with its traversal key.
#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    z_index: i32,
    kind: EntityKind,
}

impl Entity {
    /// Wraps `kind` under `id`. The container assigns the z-index on insertion.
    #[must_use]
    pub const fn new(id: EntityId, kind: EntityKind) -> Self {
        Self {
            id,
            z_index: 0,
            kind,
        }
    }

    /// Identifier of the entity.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Traversal key. Higher values are processed first.
    #[must_use]
    pub const fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Behaviour of the entity.
    #[must_use]
    pub const fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Tower view, if the entity is a tower.
    #[must_use]
    pub const fn as_tower(&self) -> Option<&Tower> {
        match &self.kind {
            EntityKind::Tower(tower) => Some(tower),
            EntityKind::Enemy(_) => None,
        }
    }

    /// Enemy view, if the entity is an enemy.
    #[must_use]
    pub const fn as_enemy(&self) -> Option<&Enemy> {
        match &self.kind {
            EntityKind::Enemy(enemy) => Some(enemy),
            EntityKind::Tower(_) => None,
        }
    }

    /// Bounding box of a living enemy. Towers are never targetable.
    #[must_use]
    pub fn targetable_bounds(&self) -> Option<Bounds> {
        self.as_enemy()
            .filter(|enemy| enemy.is_alive())
            .map(Enemy::bounds)
    }

    pub(crate) fn set_z_index(&mut self, z_index: i32) {
        self.z_index = z_index;
    }

    pub(crate) fn as_tower_mut(&mut self) -> Option<&mut Tower> {
        match &mut self.kind {
            EntityKind::Tower(tower) => Some(tower),
            EntityKind::Enemy(_) => None,
        }
    }

    pub(crate) fn as_enemy_mut(&mut self) -> Option<&mut Enemy> {
        match &mut self.kind {
            EntityKind::Enemy(enemy) => Some(enemy),
            EntityKind::Tower(_) => None,
        }
    }
}
