#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Canvas TD headless or in a window.

mod settings;

use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use canvas_td_core::{IdAllocator, Vector2D, GAME_TITLE};
use canvas_td_game::{
    host::{DisplayHost, FixedRateHost, FrameHost},
    Game,
};
use canvas_td_rendering::{FrameControl, FrameInput, RecordingSurface, RenderingBackend, Surface};
use canvas_td_rendering_macroquad::MacroquadBackend;
use canvas_td_system_input::InputEventKind;
use canvas_td_world::query;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Runs the Canvas TD simulation.
#[derive(Debug, Parser)]
#[command(name = "canvas-td", version)]
struct CliArgs {
    /// TOML file whose keys override the default game settings.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Frames to simulate in a headless run.
    #[arg(long, default_value_t = 3_600)]
    frames: u64,
    /// Milliseconds between headless frames.
    #[arg(long, default_value_t = 16.0)]
    frame_interval_ms: f64,
    /// Opens a window instead of running headless.
    #[arg(long)]
    windowed: bool,
    /// Samples the frame rate and shows it in the HUD.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the Canvas TD command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = CliArgs::parse();
    let settings = settings::load_settings(args.config.as_deref())?;

    let mut game = Game::new(settings, IdAllocator::new()).context("failed to set up the game")?;
    if args.show_fps {
        game.set_count_fps(true);
    }
    if args.windowed {
        run_windowed(game)
    } else {
        run_headless(game, args.frames, args.frame_interval_ms)
    }
}

fn run_headless(mut game: Game, frames: u64, frame_interval_ms: f64) -> Result<()> {
    ensure!(
        frame_interval_ms.is_finite() && frame_interval_ms > 0.0,
        "frame interval must be a positive number of milliseconds (received {frame_interval_ms})"
    );

    let mut host = FixedRateHost::new(0.0, frame_interval_ms).with_frame_budget(frames);
    let mut surface = RecordingSurface::new(game.size());
    game.start_game_loop(&mut host);
    let simulated = game.run(&mut host, &mut surface);
    game.stop_game_loop(&mut host);

    let stats = game.stats();
    let player = player_summary(&game);
    println!("{GAME_TITLE}: simulated {simulated} frames");
    println!(
        "enemies spawned {}, killed {}, escaped {}",
        stats.enemies_spawned, stats.enemies_killed, stats.enemies_escaped
    );
    println!(
        "towers placed {}, shots fired {}",
        stats.towers_placed, stats.shots_fired
    );
    println!("{player}");
    Ok(())
}

fn player_summary(game: &Game) -> String {
    let player = query::player(game.world());
    format!(
        "bank £{}, score {}, lives {}/{}",
        player.money(),
        player.score(),
        player.lives(),
        player.max_lives()
    )
}

fn run_windowed(mut game: Game) -> Result<()> {
    let size = game.size();
    let mut host = DisplayHost::new();
    game.start_game_loop(&mut host);

    MacroquadBackend::new()
        .with_vsync(true)
        .run(GAME_TITLE, size, move |input, surface| {
            drive_frame(&mut game, &mut host, input, surface)
        })
}

fn drive_frame(
    game: &mut Game,
    host: &mut DisplayHost,
    input: FrameInput,
    surface: &mut dyn Surface,
) -> FrameControl {
    forward_pointer(game, &input);
    host.stage(input.timestamp_ms);
    if let Some(frame) = host.next_frame() {
        let _ = game.on_frame(frame, host, surface);
    }

    if game.is_running() {
        FrameControl::Continue
    } else {
        FrameControl::Exit
    }
}

fn forward_pointer(game: &mut Game, input: &FrameInput) {
    let channel = game.input_mut();
    if let Err(error) = channel.set_scale_ratio(f64::from(input.scale_ratio)) {
        tracing::warn!(%error, "keeping previous input scale");
    }
    if let Some(pointer) = input.pointer {
        match Vector2D::new(f64::from(pointer.x), f64::from(pointer.y)) {
            Ok(raw) => channel.pointer_moved(raw, Vector2D::ZERO),
            Err(error) => tracing::warn!(%error, "ignoring pointer position"),
        }
    }
    if input.pointer_pressed {
        channel.dispatch(InputEventKind::MouseDown);
    }
    if input.pointer_released {
        channel.dispatch(InputEventKind::MouseUp);
    }
}
