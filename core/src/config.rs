//! Plain configuration structures with documented defaults.
//!
//! Every structure deserialises with `#[serde(default)]`, so partial documents
//! only need to mention the values they change. Session-wide overrides are
//! layered on top of [`GameSettings`] through [`GameSettings::merged`], which
//! returns a new value instead of mutating shared state.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, Terrain};

/// Opaque 24-bit color serialised as a `#rrggbb` string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    /// Pure green.
    pub const GREEN: Self = Self::new(0x00, 0x80, 0x00);
    /// Pure red.
    pub const RED: Self = Self::new(0xff, 0x00, 0x00);

    /// Creates a color from byte channels.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red channel.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green channel.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue channel.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Failure to parse a `#rrggbb` color string.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("expected a color of the form #rrggbb, received {input:?}")]
pub struct RgbParseError {
    input: String,
}

impl FromStr for Rgb {
    type Err = RgbParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let error = || RgbParseError {
            input: input.to_owned(),
        };
        let digits = input.strip_prefix('#').ok_or_else(error)?;
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(error());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| error())
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = RgbParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// A numeric setting outside the range the simulation accepts.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The value was NaN or infinite.
    #[error("{field} must be a finite number, received {value}")]
    NotFinite {
        /// Offending field.
        field: &'static str,
        /// Value that was supplied.
        value: f64,
    },
    /// The value was zero or negative.
    #[error("{field} must be greater than zero, received {value}")]
    NotPositive {
        /// Offending field.
        field: &'static str,
        /// Value that was supplied.
        value: f64,
    },
    /// The value was negative.
    #[error("{field} must not be negative, received {value}")]
    Negative {
        /// Offending field.
        field: &'static str,
        /// Value that was supplied.
        value: f64,
    },
}

fn finite(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if finite(field, value)? > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if finite(field, value)? >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

/// Characters used to encode terrain inside a map definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapNotation {
    /// Buildable ground.
    pub ground: char,
    /// Walkable path.
    pub path: char,
    /// Cell where enemies spawn.
    pub start: char,
    /// Cell enemies try to reach.
    pub end: char,
}

impl MapNotation {
    /// Resolves a terrain code, returning `None` for unknown characters.
    #[must_use]
    pub fn classify(&self, code: char) -> Option<Terrain> {
        if code == self.ground {
            Some(Terrain::Ground)
        } else if code == self.path {
            Some(Terrain::Path)
        } else if code == self.start {
            Some(Terrain::Start)
        } else if code == self.end {
            Some(Terrain::End)
        } else {
            None
        }
    }

    /// Character that encodes the provided terrain.
    #[must_use]
    pub const fn code(&self, terrain: Terrain) -> char {
        match terrain {
            Terrain::Ground => self.ground,
            Terrain::Path => self.path,
            Terrain::Start => self.start,
            Terrain::End => self.end,
        }
    }
}

impl Default for MapNotation {
    fn default() -> Self {
        Self {
            ground: '.',
            path: 'P',
            start: 'S',
            end: 'E',
        }
    }
}

/// Colors used when drawing a map. Purely presentational.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapPalette {
    /// Grid line color drawn around ground cells.
    pub ground_line: Rgb,
    /// Fill color for ground cells.
    pub ground: Rgb,
    /// Fill color for path cells.
    pub path: Rgb,
    /// Border color drawn where a path meets ground.
    pub path_line: Rgb,
    /// Fill color for the start cell.
    pub start: Rgb,
    /// Fill color for the end cell.
    pub end: Rgb,
}

impl Default for MapPalette {
    fn default() -> Self {
        Self {
            ground_line: Rgb::new(0x0c, 0x82, 0x80),
            ground: Rgb::new(0x1a, 0x48, 0x43),
            path: Rgb::new(0x00, 0x23, 0x23),
            path_line: Rgb::new(0x79, 0xd0, 0xe7),
            start: Rgb::GREEN,
            end: Rgb::RED,
        }
    }
}

const DEFAULT_MAP_TERRAIN: [&str; 18] = [
    ".S....................",
    ".P....................",
    ".P....................",
    ".PPPP.......PPPPPPP...",
    "....P.......P.....P...",
    "....P..PPPP.PPP...P...",
    "....P..P..P...P.PPP...",
    "....PPPP..P...P.P.....",
    "..........P...P.P.....",
    "..........PPP.P.P.....",
    "............P.P.P.....",
    "............P.P.P.....",
    "............PPP.P.....",
    "................P.....",
    "................P.....",
    "................P.....",
    "................P.....",
    "................E.....",
];

const DEFAULT_MAP_WAYPOINTS: [(u32, u32); 18] = [
    (1, 0),
    (1, 3),
    (4, 3),
    (4, 7),
    (7, 7),
    (7, 5),
    (10, 5),
    (10, 9),
    (12, 9),
    (12, 12),
    (14, 12),
    (14, 5),
    (12, 5),
    (12, 3),
    (18, 3),
    (18, 6),
    (16, 6),
    (16, 17),
];

/// Static description of a playable map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapDefinition {
    /// Human readable map name.
    pub name: String,
    /// Number of columns.
    pub cells_x: u32,
    /// Number of rows.
    pub cells_y: u32,
    /// Row-major terrain codes. Whitespace is ignored so rows may be split over lines.
    pub terrain: String,
    /// Ordered cells enemies visit, from the start cell to the end cell.
    pub waypoints: Vec<CellCoord>,
    /// Characters used by `terrain`.
    pub notation: MapNotation,
    /// Presentation colors.
    pub palette: MapPalette,
    /// Number of levels the map offers, shown on the HUD.
    pub levels: u32,
}

impl MapDefinition {
    /// Iterates over the terrain codes with whitespace removed.
    pub fn terrain_codes(&self) -> impl Iterator<Item = char> + '_ {
        self.terrain.chars().filter(|code| !code.is_whitespace())
    }
}

impl Default for MapDefinition {
    fn default() -> Self {
        Self {
            name: "Default".to_owned(),
            cells_x: 22,
            cells_y: 18,
            terrain: DEFAULT_MAP_TERRAIN.join("\n"),
            waypoints: DEFAULT_MAP_WAYPOINTS
                .iter()
                .map(|&(column, row)| CellCoord::new(column, row))
                .collect(),
            notation: MapNotation::default(),
            palette: MapPalette::default(),
            levels: 1,
        }
    }
}

/// Blueprint copied into every tower built from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerTemplate {
    /// Upgrade level of the tower.
    pub level: u32,
    /// Targeting radius measured in cell lengths.
    pub range: f64,
    /// Maximum number of attacks per second.
    pub attacks_per_second: f64,
    /// Health removed from the target per attack.
    pub damage: f64,
    /// Money deducted when the tower is placed.
    pub cost: u32,
    /// Display name.
    pub name: String,
    /// Outline color.
    pub color: Rgb,
    /// First player level that offers the tower.
    pub level_available: u32,
}

impl Default for TowerTemplate {
    fn default() -> Self {
        Self {
            level: 1,
            range: 2.0,
            attacks_per_second: 20.0,
            damage: 2.0,
            cost: 100,
            name: "Laser Tower".to_owned(),
            color: Rgb::GREEN,
            level_available: 1,
        }
    }
}

impl TowerTemplate {
    /// Checks that range, fire rate and damage describe a usable tower.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("range", self.range)?;
        positive("attacks_per_second", self.attacks_per_second)?;
        non_negative("damage", self.damage)
    }
}

/// Attributes of a spawned enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySpec {
    /// Starting and maximum health.
    pub health: f64,
    /// Money credited when the enemy is destroyed.
    pub value: u32,
    /// Score credited when the enemy is destroyed.
    pub score: u64,
    /// Width of the enemy's bounding box in pixels.
    pub width: f64,
    /// Height of the enemy's bounding box in pixels.
    pub height: f64,
}

impl Default for EnemySpec {
    fn default() -> Self {
        Self {
            health: 50.0,
            value: 25,
            score: 100,
            width: 10.0,
            height: 10.0,
        }
    }
}

impl EnemySpec {
    /// Checks that health and the bounding box are finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("health", self.health)?;
        positive("width", self.width)?;
        positive("height", self.height)
    }
}

/// One scheduled spawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    /// Simulation time after map activation at which the enemy appears.
    pub delay_ms: u64,
    /// Enemy to spawn.
    #[serde(default)]
    pub enemy: EnemySpec,
}

/// Ordered list of spawns played once per map activation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnScript {
    /// Scheduled spawns. Entries need not be sorted.
    pub entries: Vec<SpawnEntry>,
}

impl SpawnScript {
    /// Builds a script spawning `count` identical enemies every `interval_ms`,
    /// starting one interval after activation.
    #[must_use]
    pub fn evenly_spaced(count: u64, interval_ms: u64, enemy: EnemySpec) -> Self {
        Self {
            entries: (1..=count)
                .map(|step| SpawnEntry {
                    delay_ms: step * interval_ms,
                    enemy,
                })
                .collect(),
        }
    }
}

impl Default for SpawnScript {
    fn default() -> Self {
        Self::evenly_spaced(10, 1_000, EnemySpec::default())
    }
}

/// Fully resolved session settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Logical screen width in pixels.
    pub screen_width: u32,
    /// Logical screen height in pixels.
    pub screen_height: u32,
    /// Whether the clock samples frames per second.
    pub count_fps: bool,
    /// Money the player starts with.
    pub starting_money: u32,
    /// Lives the player starts with, also the maximum.
    pub starting_lives: u32,
    /// Active map.
    pub map: MapDefinition,
    /// Tower templates offered in the palette.
    pub towers: Vec<TowerTemplate>,
    /// Enemy spawn script for the active map.
    pub spawns: SpawnScript,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            screen_width: 1024,
            screen_height: 600,
            count_fps: false,
            starting_money: 500,
            starting_lives: 20,
            map: MapDefinition::default(),
            towers: vec![TowerTemplate::default()],
            spawns: SpawnScript::default(),
        }
    }
}

/// Optional overrides layered on top of [`GameSettings`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameSettingsOverrides {
    /// Replaces [`GameSettings::screen_width`].
    pub screen_width: Option<u32>,
    /// Replaces [`GameSettings::screen_height`].
    pub screen_height: Option<u32>,
    /// Replaces [`GameSettings::count_fps`].
    pub count_fps: Option<bool>,
    /// Replaces [`GameSettings::starting_money`].
    pub starting_money: Option<u32>,
    /// Replaces [`GameSettings::starting_lives`].
    pub starting_lives: Option<u32>,
    /// Replaces [`GameSettings::map`].
    pub map: Option<MapDefinition>,
    /// Replaces [`GameSettings::towers`].
    pub towers: Option<Vec<TowerTemplate>>,
    /// Replaces [`GameSettings::spawns`].
    pub spawns: Option<SpawnScript>,
}

impl GameSettings {
    /// Returns new settings where every populated override replaces the base value.
    #[must_use]
    pub fn merged(self, overrides: GameSettingsOverrides) -> Self {
        Self {
            screen_width: overrides.screen_width.unwrap_or(self.screen_width),
            screen_height: overrides.screen_height.unwrap_or(self.screen_height),
            count_fps: overrides.count_fps.unwrap_or(self.count_fps),
            starting_money: overrides.starting_money.unwrap_or(self.starting_money),
            starting_lives: overrides.starting_lives.unwrap_or(self.starting_lives),
            map: overrides.map.unwrap_or(self.map),
            towers: overrides.towers.unwrap_or(self.towers),
            spawns: overrides.spawns.unwrap_or(self.spawns),
        }
    }
}
