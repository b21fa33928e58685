//! Static cell grid describing terrain, cell geometry and the enemy route.

use canvas_td_core::{
    CellCoord, Direction, MapDefinition, MapNotation, MapPalette, Terrain, Vector2D, VectorError,
};
use thiserror::Error;

/// Distance in pixels between an enemy's top-left corner and the centre of
/// the cell it is aligned with.
pub const SPAWN_OFFSET: f64 = 5.0;

/// Smallest cell length that still leaves room for an enemy to align with a
/// waypoint after entering its cell.
pub const MIN_CELL_SIZE: f64 = 14.0;

/// Screen-space rectangle the map is fitted into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapViewport {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl MapViewport {
    /// Creates a viewport from its top-left corner and extent.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Left edge in pixels.
    #[must_use]
    pub const fn left(&self) -> f64 {
        self.left
    }

    /// Top edge in pixels.
    #[must_use]
    pub const fn top(&self) -> f64 {
        self.top
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }
}

/// Reasons a map definition cannot be turned into a [`GridMap`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum MapError {
    /// The grid has no columns or no rows.
    #[error("map must contain at least one column and one row")]
    EmptyGrid,
    /// The number of terrain codes does not match the declared dimensions.
    #[error("map declares {expected} cells but its terrain lists {actual}")]
    TerrainSizeMismatch {
        /// Number of cells implied by the dimensions.
        expected: usize,
        /// Number of terrain codes supplied.
        actual: usize,
    },
    /// A terrain code is not part of the map's notation.
    #[error("unknown terrain code {code:?} at cell index {index}")]
    UnknownTerrain {
        /// Offending character.
        code: char,
        /// Row-major index of the offending cell.
        index: usize,
    },
    /// No start cell exists.
    #[error("map has no start cell")]
    MissingStartCell,
    /// More than one start cell exists.
    #[error("more than one start cell found ({first:?} and {second:?})")]
    DuplicateStartCell {
        /// First start cell encountered.
        first: CellCoord,
        /// Second start cell encountered.
        second: CellCoord,
    },
    /// No end cell exists.
    #[error("map has no end cell")]
    MissingEndCell,
    /// More than one end cell exists.
    #[error("more than one end cell found ({first:?} and {second:?})")]
    DuplicateEndCell {
        /// First end cell encountered.
        first: CellCoord,
        /// Second end cell encountered.
        second: CellCoord,
    },
    /// Enemies need a start and at least one further waypoint.
    #[error("map needs at least two waypoints, found {count}")]
    TooFewWaypoints {
        /// Number of waypoints supplied.
        count: usize,
    },
    /// A waypoint lies outside the grid.
    #[error("waypoint {waypoint:?} lies outside the grid")]
    WaypointOutOfBounds {
        /// Offending waypoint.
        waypoint: CellCoord,
    },
    /// The route does not begin on the start cell.
    #[error("first waypoint {first:?} is not the start cell {start:?}")]
    RouteMustBeginAtStart {
        /// First waypoint supplied.
        first: CellCoord,
        /// Start cell found in the terrain.
        start: CellCoord,
    },
    /// The route does not finish on the end cell.
    #[error("last waypoint {last:?} is not the end cell {end:?}")]
    RouteMustFinishAtEnd {
        /// Last waypoint supplied.
        last: CellCoord,
        /// End cell found in the terrain.
        end: CellCoord,
    },
    /// The viewport has no usable area.
    #[error("map viewport must have a finite, positive size")]
    InvalidViewport,
    /// Cells would be too small for enemies to align with waypoints.
    #[error("cell size {cell_size:.2}px is below the minimum of 14px")]
    CellTooSmall {
        /// Cell length derived from the viewport.
        cell_size: f64,
    },
    /// Derived geometry was not finite.
    #[error(transparent)]
    Geometry(#[from] VectorError),
}

/// Terrain grid with its screen-space geometry and ordered waypoints.
#[derive(Clone, Debug)]
pub struct GridMap {
    name: String,
    cells_x: u32,
    cells_y: u32,
    terrain: Vec<Terrain>,
    notation: MapNotation,
    palette: MapPalette,
    levels: u32,
    start: CellCoord,
    end: CellCoord,
    waypoints: Vec<CellCoord>,
    waypoint_pixels: Vec<Vector2D>,
    cell_size: f64,
    left: f64,
    top: f64,
}

impl GridMap {
    /// Validates `definition` and fits it into `viewport`.
    ///
    /// The cell size is derived from the viewport height and the map is
    /// centred horizontally inside the viewport.
    pub fn new(definition: &MapDefinition, viewport: MapViewport) -> Result<Self, MapError> {
        let cells_x = definition.cells_x;
        let cells_y = definition.cells_y;
        if cells_x == 0 || cells_y == 0 {
            return Err(MapError::EmptyGrid);
        }

        let terrain = parse_terrain(definition)?;
        let start = find_unique(&terrain, cells_x, Terrain::Start)
            .map_err(|(first, second)| MapError::DuplicateStartCell { first, second })?
            .ok_or(MapError::MissingStartCell)?;
        let end = find_unique(&terrain, cells_x, Terrain::End)
            .map_err(|(first, second)| MapError::DuplicateEndCell { first, second })?
            .ok_or(MapError::MissingEndCell)?;

        let waypoints = definition.waypoints.clone();
        validate_route(&waypoints, cells_x, cells_y, start, end)?;

        let finite = [viewport.left, viewport.top, viewport.width, viewport.height]
            .iter()
            .all(|value| value.is_finite());
        if !finite || viewport.width <= 0.0 || viewport.height <= 0.0 {
            return Err(MapError::InvalidViewport);
        }

        let cell_size = viewport.height / f64::from(cells_y);
        if cell_size < MIN_CELL_SIZE {
            return Err(MapError::CellTooSmall { cell_size });
        }

        let spare_width = (viewport.width - cell_size * f64::from(cells_x)).max(0.0);
        let left = viewport.left + spare_width / 2.0;
        let top = viewport.top;

        let waypoint_pixels = waypoints
            .iter()
            .map(|&cell| alignment_point(left, top, cell_size, cell))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: definition.name.clone(),
            cells_x,
            cells_y,
            terrain,
            notation: definition.notation,
            palette: definition.palette,
            levels: definition.levels,
            start,
            end,
            waypoints,
            waypoint_pixels,
            cell_size,
            left,
            top,
        })
    }

    /// Human readable map name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of columns.
    #[must_use]
    pub const fn cells_x(&self) -> u32 {
        self.cells_x
    }

    /// Number of rows.
    #[must_use]
    pub const fn cells_y(&self) -> u32 {
        self.cells_y
    }

    /// Side length of a cell in pixels.
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Left edge of the first column in pixels.
    #[must_use]
    pub const fn left(&self) -> f64 {
        self.left
    }

    /// Top edge of the first row in pixels.
    #[must_use]
    pub const fn top(&self) -> f64 {
        self.top
    }

    /// Notation the terrain was written in.
    #[must_use]
    pub const fn notation(&self) -> &MapNotation {
        &self.notation
    }

    /// Presentation colors.
    #[must_use]
    pub const fn palette(&self) -> &MapPalette {
        &self.palette
    }

    /// Number of levels the map offers.
    #[must_use]
    pub const fn levels(&self) -> u32 {
        self.levels
    }

    /// The unique start cell.
    #[must_use]
    pub const fn start_cell(&self) -> CellCoord {
        self.start
    }

    /// The unique end cell.
    #[must_use]
    pub const fn end_cell(&self) -> CellCoord {
        self.end
    }

    /// Ordered route from the start cell to the end cell.
    #[must_use]
    pub fn waypoints(&self) -> &[CellCoord] {
        &self.waypoints
    }

    /// Pixel an enemy's top-left corner occupies when aligned with waypoint `index`.
    #[must_use]
    pub fn waypoint_pixel(&self, index: usize) -> Option<Vector2D> {
        self.waypoint_pixels.get(index).copied()
    }

    /// Top-left corner of a freshly spawned enemy.
    #[must_use]
    pub fn spawn_position(&self) -> Vector2D {
        self.waypoint_pixels[0]
    }

    /// Finds the cell whose rectangle contains the point.
    ///
    /// Cells are scanned column by column with inclusive edges, so a point on
    /// a shared edge belongs to the cell scanned first.
    #[must_use]
    pub fn find_grid_cell(&self, x: f64, y: f64) -> Option<CellCoord> {
        for column in 0..self.cells_x {
            let cell_left = self.left + self.cell_size * f64::from(column);
            if x < cell_left || x > cell_left + self.cell_size {
                continue;
            }
            for row in 0..self.cells_y {
                let cell_top = self.top + self.cell_size * f64::from(row);
                if y >= cell_top && y <= cell_top + self.cell_size {
                    return Some(CellCoord::new(column, row));
                }
            }
        }
        None
    }

    /// Terrain at a possibly out-of-range coordinate.
    #[must_use]
    pub fn terrain_at(&self, column: i64, row: i64) -> Option<Terrain> {
        if column < 0 || row < 0 || column >= i64::from(self.cells_x) || row >= i64::from(self.cells_y)
        {
            return None;
        }
        let index = i64::from(self.cells_x) * row + column;
        self.terrain.get(usize::try_from(index).ok()?).copied()
    }

    /// Terrain stored in `cell`.
    #[must_use]
    pub fn terrain_of(&self, cell: CellCoord) -> Option<Terrain> {
        self.terrain_at(i64::from(cell.column()), i64::from(cell.row()))
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, Terrain)> + '_ {
        self.terrain.iter().enumerate().map(move |(index, &terrain)| {
            (cell_from_index(index, self.cells_x), terrain)
        })
    }

    /// Top-left corner of `cell` in pixels.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Option<Vector2D> {
        let _ = self.terrain_of(cell)?;
        Vector2D::new(
            self.left + self.cell_size * f64::from(cell.column()),
            self.top + self.cell_size * f64::from(cell.row()),
        )
        .ok()
    }

    /// Centre of `cell` in pixels.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Option<Vector2D> {
        let origin = self.cell_origin(cell)?;
        Vector2D::new(
            origin.x() + self.cell_size / 2.0,
            origin.y() + self.cell_size / 2.0,
        )
        .ok()
    }

    /// Sides of a walkable cell that border ground and therefore get an edge line.
    ///
    /// Neighbours outside the grid never produce an edge.
    pub fn border_edges(&self, cell: CellCoord) -> impl Iterator<Item = Direction> + '_ {
        let walkable = self
            .terrain_of(cell)
            .is_some_and(|terrain| terrain.is_walkable());
        let column = i64::from(cell.column());
        let row = i64::from(cell.row());
        [
            (Direction::North, column, row - 1),
            (Direction::South, column, row + 1),
            (Direction::West, column - 1, row),
            (Direction::East, column + 1, row),
        ]
        .into_iter()
        .filter(move |&(_, neighbour_column, neighbour_row)| {
            walkable && self.terrain_at(neighbour_column, neighbour_row) == Some(Terrain::Ground)
        })
        .map(|(side, _, _)| side)
    }
}

fn parse_terrain(definition: &MapDefinition) -> Result<Vec<Terrain>, MapError> {
    let expected = definition.cells_x as usize * definition.cells_y as usize;
    let terrain = definition
        .terrain_codes()
        .enumerate()
        .map(|(index, code)| {
            definition
                .notation
                .classify(code)
                .ok_or(MapError::UnknownTerrain { code, index })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if terrain.len() != expected {
        return Err(MapError::TerrainSizeMismatch {
            expected,
            actual: terrain.len(),
        });
    }
    Ok(terrain)
}

fn find_unique(
    terrain: &[Terrain],
    cells_x: u32,
    wanted: Terrain,
) -> Result<Option<CellCoord>, (CellCoord, CellCoord)> {
    let mut found = None;
    for (index, &kind) in terrain.iter().enumerate() {
        if kind != wanted {
            continue;
        }
        let cell = cell_from_index(index, cells_x);
        if let Some(first) = found {
            return Err((first, cell));
        }
        found = Some(cell);
    }
    Ok(found)
}

fn validate_route(
    waypoints: &[CellCoord],
    cells_x: u32,
    cells_y: u32,
    start: CellCoord,
    end: CellCoord,
) -> Result<(), MapError> {
    let (first, last) = match waypoints {
        [first, .., last] => (*first, *last),
        _ => {
            return Err(MapError::TooFewWaypoints {
                count: waypoints.len(),
            })
        }
    };

    if let Some(&waypoint) = waypoints
        .iter()
        .find(|cell| cell.column() >= cells_x || cell.row() >= cells_y)
    {
        return Err(MapError::WaypointOutOfBounds { waypoint });
    }
    if first != start {
        return Err(MapError::RouteMustBeginAtStart { first, start });
    }
    if last != end {
        return Err(MapError::RouteMustFinishAtEnd { last, end });
    }
    Ok(())
}

fn alignment_point(
    left: f64,
    top: f64,
    cell_size: f64,
    cell: CellCoord,
) -> Result<Vector2D, VectorError> {
    let inset = cell_size / 2.0 - SPAWN_OFFSET;
    Vector2D::new(
        left + cell_size * f64::from(cell.column()) + inset,
        top + cell_size * f64::from(cell.row()) + inset,
    )
}

fn cell_from_index(index: usize, cells_x: u32) -> CellCoord {
    let width = cells_x as usize;
    CellCoord::new((index % width) as u32, (index / width) as u32)
}
