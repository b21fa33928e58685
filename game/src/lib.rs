#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game loop that ties the clock, spawning, input and world together.
//!
//! A [`Game`] owns every piece of session state. Each delivered frame runs a
//! fixed update order (clock, optional FPS sampling, spawn schedule, UI
//! actions, entity container) followed by a fixed render order (clear, HUD,
//! map, entities, one-shot overlays, present). Frames come from a
//! [`FrameHost`](host::FrameHost), which keeps the loop independent of any
//! windowing toolkit.

pub mod host;
pub mod layout;
pub mod ui;

use std::{fmt, time::Duration};

use canvas_td_core::{
    Command, ConfigError, Event, GameSettings, IdAllocator, TowerTemplate, GAME_TITLE,
};
use canvas_td_rendering::{
    draw::{draw_entities, draw_hud, draw_map, draw_selection_preview, HudView},
    Color, RenderingError, Surface, SurfaceSize,
};
use canvas_td_system_clock::SimulationClock;
use canvas_td_system_input::{Input, InputError, PointerEvent};
use canvas_td_system_spawning::Spawning;
use canvas_td_world::{
    apply,
    map::{GridMap, MapError},
    player::Player,
    query, World,
};
use thiserror::Error;

use crate::{
    host::{Frame, FrameHost, FrameRequest},
    layout::Layout,
    ui::{Ui, UiAction},
};

/// Errors raised while assembling a game session.
#[derive(Debug, Error)]
pub enum GameError {
    /// Screen dimensions cover no pixels.
    #[error("invalid screen size: {0}")]
    Surface(#[from] RenderingError),
    /// The map definition could not be fitted or validated.
    #[error("invalid map: {0}")]
    Map(#[from] MapError),
    /// Input wiring failed.
    #[error("input setup failed: {0}")]
    Input(#[from] InputError),
    /// A tower template carries unusable numbers.
    #[error("invalid tower template {name:?}: {source}")]
    InvalidTower {
        /// Display name of the template.
        name: String,
        /// Field that failed validation.
        source: ConfigError,
    },
    /// A scheduled enemy carries unusable numbers.
    #[error("invalid enemy in spawn entry {index}: {source}")]
    InvalidSpawn {
        /// Position of the entry in the spawn script.
        index: usize,
        /// Field that failed validation.
        source: ConfigError,
    },
    /// No tower template is registered in the palette slot.
    #[error("no tower template in palette slot {slot}")]
    UnknownTowerSlot {
        /// Requested slot.
        slot: usize,
    },
}

/// Scheduling state of the game loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// No frame is requested.
    Stopped,
    /// A frame is pending with the host.
    Running {
        /// Request the loop is waiting on.
        pending: FrameRequest,
    },
}

/// Running totals of the events a session produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameStats {
    /// Frames simulated.
    pub frames: u64,
    /// Enemies spawned.
    pub enemies_spawned: u64,
    /// Enemies destroyed by towers.
    pub enemies_killed: u64,
    /// Enemies that reached the end cell.
    pub enemies_escaped: u64,
    /// Towers built.
    pub towers_placed: u64,
    /// Placement attempts the world refused.
    pub placements_rejected: u64,
    /// Shots fired by towers.
    pub shots_fired: u64,
}

impl GameStats {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemySpawned { .. } => self.enemies_spawned += 1,
                Event::EnemyKilled { .. } => self.enemies_killed += 1,
                Event::EnemyEscaped { .. } => self.enemies_escaped += 1,
                Event::TowerPlaced { .. } => self.towers_placed += 1,
                Event::TowerPlacementRejected { .. } => self.placements_rejected += 1,
                Event::TowerFired { .. } => self.shots_fired += 1,
                Event::EnemyReachedWaypoint { .. } | Event::PlayerDefeated => {}
            }
        }
    }
}

type Overlay = Box<dyn FnOnce(&mut dyn Surface)>;

/// One game session.
pub struct Game {
    size: SurfaceSize,
    layout: Layout,
    count_fps: bool,
    world: World,
    clock: SimulationClock,
    spawning: Spawning,
    input: Input<UiAction>,
    ui: Ui,
    overlays: Vec<Overlay>,
    loop_state: LoopState,
    rebase_pending: bool,
    last_events: Vec<Event>,
    stats: GameStats,
}

impl Game {
    /// Builds a session from `settings`, drawing entity ids from `ids`.
    pub fn new(settings: GameSettings, ids: IdAllocator) -> Result<Self, GameError> {
        for (index, entry) in settings.spawns.entries.iter().enumerate() {
            entry
                .enemy
                .validate()
                .map_err(|source| GameError::InvalidSpawn { index, source })?;
        }
        let size = SurfaceSize::new(settings.screen_width, settings.screen_height)?;
        let layout = Layout::new(size);
        let map = GridMap::new(&settings.map, layout.map_viewport())?;
        tracing::info!(
            map = map.name(),
            cells_x = map.cells_x(),
            cells_y = map.cells_y(),
            cell_size = map.cell_size(),
            "map activated"
        );

        let player = Player::new(settings.starting_money, settings.starting_lives);
        let world = World::new(map, player, ids);

        let mut input = Input::new(1.0)?;
        input.add_event("mousedown", |event: &PointerEvent| {
            Some(UiAction::Press(event.position()))
        })?;

        let mut ui = Ui::new();
        for template in settings.towers {
            let _ = register_template(&mut ui, template)?;
        }

        Ok(Self {
            size,
            layout,
            count_fps: settings.count_fps,
            world,
            clock: SimulationClock::new(),
            spawning: Spawning::new(&settings.spawns),
            input,
            ui,
            overlays: Vec::new(),
            loop_state: LoopState::Stopped,
            rebase_pending: true,
            last_events: Vec::new(),
            stats: GameStats::default(),
        })
    }

    /// Logical screen size.
    #[must_use]
    pub const fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Screen partition.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Simulation state.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Frame clock.
    #[must_use]
    pub const fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Tower palette and selection.
    #[must_use]
    pub const fn ui(&self) -> &Ui {
        &self.ui
    }

    /// Input channel, for hosts that forward pointer events.
    pub fn input_mut(&mut self) -> &mut Input<UiAction> {
        &mut self.input
    }

    /// Events produced by the most recent update.
    #[must_use]
    pub fn last_events(&self) -> &[Event] {
        &self.last_events
    }

    /// Totals accumulated since the session started.
    #[must_use]
    pub const fn stats(&self) -> GameStats {
        self.stats
    }

    /// Scheduling state of the loop.
    #[must_use]
    pub const fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    /// Whether a frame is pending.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.loop_state, LoopState::Running { .. })
    }

    /// Spawns still waiting in the schedule.
    #[must_use]
    pub fn pending_spawns(&self) -> usize {
        self.spawning.remaining()
    }

    /// Enables or disables FPS sampling.
    pub fn set_count_fps(&mut self, enabled: bool) {
        self.count_fps = enabled;
    }

    /// Registers a tower template in the palette and returns its slot.
    pub fn add_tower(&mut self, template: TowerTemplate) -> Result<usize, GameError> {
        register_template(&mut self.ui, template)
    }

    /// Picks up the template in `slot` at the current pointer position.
    pub fn select_tower(&mut self, slot: usize) -> Result<(), GameError> {
        if self.ui.select(slot, self.input.mouse_position()) {
            Ok(())
        } else {
            Err(GameError::UnknownTowerSlot { slot })
        }
    }

    /// Drops every spawn that has not fired yet.
    pub fn cancel_spawns(&mut self) {
        self.spawning.cancel();
    }

    /// Queues `overlay` to be drawn once on top of the next rendered frame.
    pub fn add_top_level_render_object<F>(&mut self, overlay: F)
    where
        F: FnOnce(&mut dyn Surface) + 'static,
    {
        self.overlays.push(Box::new(overlay));
    }

    /// Requests the first frame. Does nothing if the loop already runs.
    pub fn start_game_loop(&mut self, host: &mut dyn FrameHost) {
        if self.is_running() {
            return;
        }
        let pending = host.request_frame();
        self.loop_state = LoopState::Running { pending };
        self.rebase_pending = true;
        tracing::info!(request = pending.get(), "game loop started");
    }

    /// Cancels the pending frame.
    ///
    /// Simulation time stands still while stopped, so the spawn schedule
    /// pauses with the loop.
    pub fn stop_game_loop(&mut self, host: &mut dyn FrameHost) {
        if let LoopState::Running { pending } = self.loop_state {
            host.cancel_frame(pending);
            self.loop_state = LoopState::Stopped;
            tracing::info!(
                pending_spawns = self.spawning.remaining(),
                "game loop stopped"
            );
        }
    }

    /// Runs one frame if `frame` answers the pending request.
    ///
    /// Returns whether the frame was simulated. A running loop requests its
    /// next frame before returning.
    pub fn on_frame(
        &mut self,
        frame: Frame,
        host: &mut dyn FrameHost,
        surface: &mut dyn Surface,
    ) -> bool {
        let LoopState::Running { pending } = self.loop_state else {
            tracing::debug!(request = frame.request.get(), "ignoring frame while stopped");
            return false;
        };
        if frame.request != pending {
            tracing::debug!(request = frame.request.get(), "ignoring stale frame");
            return false;
        }

        self.update(frame.timestamp_ms);
        self.render(surface);

        self.loop_state = LoopState::Running {
            pending: host.request_frame(),
        };
        true
    }

    /// Drives the loop until the host stops delivering frames or the loop stops.
    ///
    /// Returns the number of frames simulated.
    pub fn run(&mut self, host: &mut dyn FrameHost, surface: &mut dyn Surface) -> u64 {
        let mut frames = 0;
        while self.is_running() {
            let Some(frame) = host.next_frame() else {
                break;
            };
            if self.on_frame(frame, host, surface) {
                frames += 1;
            }
        }
        frames
    }

    /// Advances the simulation to `timestamp_ms`.
    pub fn update(&mut self, timestamp_ms: f64) {
        if self.rebase_pending {
            self.clock.rebase(timestamp_ms);
            self.rebase_pending = false;
        }
        let _ = self.clock.update(timestamp_ms);
        if self.count_fps {
            self.clock.count_fps();
        }

        let mut commands = Vec::new();
        let dt = Duration::try_from_secs_f64(self.clock.tick()).unwrap_or_default();
        self.spawning.handle(dt, &mut commands);

        let cell_size = query::map(&self.world).cell_size();
        for action in self.input.drain_actions() {
            match action {
                UiAction::Press(position) => {
                    if let Some(command) = self.ui.press(position, &self.layout, cell_size) {
                        commands.push(command);
                    }
                }
            }
        }
        self.ui.follow(self.input.mouse_position());

        commands.push(Command::Tick {
            timestamp_ms: self.clock.current_frame_time(),
        });

        self.last_events.clear();
        for command in commands {
            apply(&mut self.world, command, &mut self.last_events);
        }
        self.stats.frames += 1;
        self.stats.record(&self.last_events);
    }

    /// Draws the current state onto `surface` and presents it.
    pub fn render(&mut self, surface: &mut dyn Surface) {
        surface.clear(Color::BACKGROUND);
        draw_hud(surface, &self.hud_view());
        draw_map(surface, query::map(&self.world));
        draw_entities(surface, query::entities(&self.world));

        if let Some(preview) = self.ui.preview(&self.world) {
            self.add_top_level_render_object(move |surface: &mut dyn Surface| {
                draw_selection_preview(surface, &preview);
            });
        }
        for overlay in self.overlays.drain(..) {
            overlay(surface);
        }

        surface.present();
    }

    fn hud_view(&self) -> HudView {
        let player = query::player(&self.world);
        let map = query::map(&self.world);
        HudView {
            top_bar: self.layout.top_bar(),
            side_bar: self.layout.side_bar(),
            title: GAME_TITLE.to_owned(),
            money: player.money(),
            score: player.score(),
            lives: player.lives(),
            max_lives: player.max_lives(),
            level: player.level(),
            levels: map.levels(),
            fps: self.count_fps.then(|| self.clock.fps()),
            palette: self.ui.palette_icons(&self.layout, map.cell_size()),
        }
    }
}

fn register_template(ui: &mut Ui, template: TowerTemplate) -> Result<usize, GameError> {
    match template.validate() {
        Ok(()) => Ok(ui.add_template(template)),
        Err(source) => Err(GameError::InvalidTower {
            name: template.name,
            source,
        }),
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("size", &self.size)
            .field("loop_state", &self.loop_state)
            .field("clock", &self.clock)
            .field("spawning", &self.spawning)
            .field("input", &self.input)
            .field("ui", &self.ui)
            .field("queued_overlays", &self.overlays.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_screens_are_rejected() {
        let settings = GameSettings {
            screen_width: 0,
            ..GameSettings::default()
        };
        assert!(matches!(
            Game::new(settings, IdAllocator::new()),
            Err(GameError::Surface(_))
        ));
    }

    #[test]
    fn default_settings_build_a_stopped_session() {
        let game = Game::new(GameSettings::default(), IdAllocator::new()).expect("valid settings");
        assert_eq!(game.loop_state(), LoopState::Stopped);
        assert_eq!(game.ui().templates().len(), 1);
        assert_eq!(game.pending_spawns(), 10);
    }

    #[test]
    fn unusable_spawn_entries_are_rejected() {
        let mut settings = GameSettings::default();
        settings.spawns.entries[2].enemy.width = -10.0;
        assert!(matches!(
            Game::new(settings, IdAllocator::new()),
            Err(GameError::InvalidSpawn {
                index: 2,
                source: ConfigError::NotPositive { field: "width", .. }
            })
        ));

        let mut settings = GameSettings::default();
        settings.spawns.entries[0].enemy.health = f64::NAN;
        assert!(matches!(
            Game::new(settings, IdAllocator::new()),
            Err(GameError::InvalidSpawn {
                index: 0,
                source: ConfigError::NotFinite { field: "health", .. }
            })
        ));
    }

    #[test]
    fn unusable_tower_templates_are_rejected() {
        let settings = GameSettings {
            towers: vec![TowerTemplate {
                attacks_per_second: -1.0,
                ..TowerTemplate::default()
            }],
            ..GameSettings::default()
        };
        assert!(matches!(
            Game::new(settings, IdAllocator::new()),
            Err(GameError::InvalidTower { .. })
        ));

        let mut game =
            Game::new(GameSettings::default(), IdAllocator::new()).expect("valid settings");
        let broken = TowerTemplate {
            range: f64::NAN,
            ..TowerTemplate::default()
        };
        assert!(matches!(
            game.add_tower(broken),
            Err(GameError::InvalidTower { .. })
        ));
        assert_eq!(game.ui().templates().len(), 1);
        assert_eq!(game.add_tower(TowerTemplate::default()).ok(), Some(1));
    }

    #[test]
    fn selecting_an_empty_slot_fails() {
        let mut game =
            Game::new(GameSettings::default(), IdAllocator::new()).expect("valid settings");
        assert!(matches!(
            game.select_tower(3),
            Err(GameError::UnknownTowerSlot { slot: 3 })
        ));
        assert!(game.select_tower(0).is_ok());
    }
}
