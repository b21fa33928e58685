#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Canvas TD engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the per-frame systems. Adapters and the game loop
//! submit [`Command`] values describing desired mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values describing what happened. Configuration structures live in
//! [`config`] and are re-exported at the crate root.

pub mod config;
mod vector;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{
    ConfigError, EnemySpec, GameSettings, GameSettingsOverrides, MapDefinition, MapNotation,
    MapPalette, Rgb, RgbParseError, SpawnEntry, SpawnScript, TowerTemplate,
};
pub use vector::{Vector2D, VectorError};

/// Canonical title shown by adapters when the experience boots.
pub const GAME_TITLE: &str = "Canvas TD";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Spawns an enemy on the map's start cell.
    SpawnEnemy {
        /// Attributes of the new enemy.
        spec: EnemySpec,
    },
    /// Builds a tower on the ground cell that contains `position`.
    PlaceTower {
        /// Template copied into the new tower.
        template: TowerTemplate,
        /// Screen-space point selecting the target cell.
        position: Vector2D,
    },
    /// Runs one update pass over every entity.
    Tick {
        /// Frame timestamp in milliseconds, used for attack cooldowns.
        timestamp_ms: f64,
    },
}

/// Events broadcast by the world after executing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// An enemy appeared on the start cell.
    EnemySpawned {
        /// Identifier allocated to the enemy.
        enemy: EntityId,
        /// Cell the enemy spawned on.
        cell: CellCoord,
    },
    /// An enemy aligned with a waypoint and turned towards the next one.
    EnemyReachedWaypoint {
        /// Enemy that progressed.
        enemy: EntityId,
        /// Index of the waypoint that was reached.
        index: usize,
        /// Cell of the waypoint that was reached.
        waypoint: CellCoord,
    },
    /// An enemy ran out of health and paid out its reward.
    EnemyKilled {
        /// Enemy that was destroyed.
        enemy: EntityId,
        /// Money credited to the player.
        value: u32,
        /// Score credited to the player.
        score: u64,
    },
    /// An enemy reached the end cell and cost the player a life.
    EnemyEscaped {
        /// Enemy that escaped.
        enemy: EntityId,
    },
    /// The player lost the final life.
    PlayerDefeated,
    /// A tower was built.
    TowerPlaced {
        /// Identifier allocated to the tower.
        tower: EntityId,
        /// Cell the tower occupies.
        cell: CellCoord,
        /// Money deducted for the tower.
        cost: u32,
    },
    /// A tower placement request was refused.
    TowerPlacementRejected {
        /// Reason the placement failed.
        reason: PlacementError,
    },
    /// A tower attacked its locked target.
    TowerFired {
        /// Tower that attacked.
        tower: EntityId,
        /// Enemy that was hit.
        target: EntityId,
        /// Health removed from the target.
        damage: f64,
    },
}

/// Unique identifier assigned to every entity in a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Session-scoped source of monotonically increasing entity identifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    /// Creates an allocator whose first identifier is zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Hands out the next identifier.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId::new(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }

    /// Identifier the next call to [`IdAllocator::allocate`] will return.
    #[must_use]
    pub const fn peek(&self) -> EntityId {
        EntityId::new(self.next)
    }

    /// Restarts allocation from zero.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}

/// Location of a single cell within the map grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Cardinal movement direction in screen space, where north is up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards smaller rows.
    North,
    /// Towards larger columns.
    East,
    /// Towards larger rows.
    South,
    /// Towards smaller columns.
    West,
}

/// Kind of terrain stored in a map cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Buildable ground that enemies never cross.
    Ground,
    /// Walkable path.
    Path,
    /// The single cell where enemies spawn.
    Start,
    /// The single cell enemies try to reach.
    End,
}

impl Terrain {
    /// Whether enemies walk on this terrain.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::Ground)
    }
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum PlacementError {
    /// The requested point lies outside every map cell.
    #[error("position lies outside the map")]
    OutsideMap,
    /// The requested cell is part of the enemy path.
    #[error("towers can only be built on ground")]
    NotGround,
    /// The requested cell already holds a tower.
    #[error("cell already holds a tower")]
    Occupied,
    /// The template or the tower geometry built from it is unusable.
    #[error("tower template is invalid")]
    InvalidTower,
    /// The player cannot afford the tower.
    #[error("tower costs {cost} but the bank only holds {available}")]
    InsufficientFunds {
        /// Price of the requested tower.
        cost: u32,
        /// Money available at the time of the request.
        available: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, EntityId, IdAllocator, PlacementError, Terrain};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn allocator_hands_out_increasing_identifiers() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), EntityId::new(0));
        assert_eq!(ids.allocate(), EntityId::new(1));
        assert_eq!(ids.peek(), EntityId::new(2));

        ids.reset();
        assert_eq!(ids.allocate(), EntityId::new(0));
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(16, 17));
    }

    #[test]
    fn only_ground_blocks_enemies() {
        assert!(!Terrain::Ground.is_walkable());
        assert!(Terrain::Path.is_walkable());
        assert!(Terrain::Start.is_walkable());
        assert!(Terrain::End.is_walkable());
    }

    #[test]
    fn insufficient_funds_reports_amounts() {
        let error = PlacementError::InsufficientFunds {
            cost: 100,
            available: 40,
        };
        assert_eq!(
            error.to_string(),
            "tower costs 100 but the bank only holds 40"
        );
    }
}
