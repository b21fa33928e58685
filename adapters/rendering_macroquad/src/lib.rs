#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Canvas TD.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The game draws in logical pixels. The adapter letterboxes the logical
//! surface into the window with a uniform scale, so the frame callback never
//! sees window pixels except for the raw pointer position it reports.

use anyhow::{Context, Result};
use canvas_td_rendering::{
    Color, FrameControl, FrameInput, Rect, RenderingBackend, Surface, SurfaceSize,
};
use glam::Vec2;
use macroquad::input::{
    is_key_pressed, is_mouse_button_pressed, is_mouse_button_released, mouse_position, KeyCode,
    MouseButton,
};

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, title: &str, size: SurfaceSize, mut frame: F) -> Result<()>
    where
        F: FnMut(FrameInput, &mut dyn Surface) -> FrameControl + 'static,
    {
        let Self { swap_interval } = self;

        let mut config = macroquad::window::Conf {
            window_title: title.to_owned(),
            window_width: i32::try_from(size.width()).context("window width exceeds i32")?,
            window_height: i32::try_from(size.height()).context("window height exceeds i32")?,
            window_resizable: true,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        tracing::info!(
            width = size.width(),
            height = size.height(),
            "opening macroquad window"
        );

        macroquad::Window::from_config(config, async move {
            loop {
                if is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q) {
                    tracing::info!("quit requested");
                    break;
                }

                let transform = SurfaceTransform::fit(
                    size,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let input = gather_frame_input(&transform);
                let mut surface = MacroquadSurface { size, transform };
                let control = frame(input, &mut surface);
                if control == FrameControl::Exit {
                    break;
                }
                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn gather_frame_input(transform: &SurfaceTransform) -> FrameInput {
    let (cursor_x, cursor_y) = mouse_position();
    FrameInput {
        timestamp_ms: macroquad::time::get_time() * 1_000.0,
        pointer: Some(transform.relative_to_surface(Vec2::new(cursor_x, cursor_y))),
        scale_ratio: transform.scale_ratio(),
        pointer_pressed: is_mouse_button_pressed(MouseButton::Left),
        pointer_released: is_mouse_button_released(MouseButton::Left),
    }
}

/// Uniform scale and offset that letterbox the logical surface into the window.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SurfaceTransform {
    scale: f32,
    offset: Vec2,
}

impl SurfaceTransform {
    fn fit(size: SurfaceSize, window_width: f32, window_height: f32) -> Self {
        let logical = Vec2::new(size.width() as f32, size.height() as f32);
        let scale = (window_width / logical.x).min(window_height / logical.y);
        if !scale.is_finite() || scale <= f32::EPSILON {
            return Self {
                scale: 1.0,
                offset: Vec2::ZERO,
            };
        }
        let offset = (Vec2::new(window_width, window_height) - logical * scale) / 2.0;
        Self { scale, offset }
    }

    fn to_window(self, point: Vec2) -> Vec2 {
        self.offset + point * self.scale
    }

    fn relative_to_surface(self, raw: Vec2) -> Vec2 {
        raw - self.offset
    }

    fn scale_ratio(self) -> f32 {
        1.0 / self.scale
    }
}

/// Surface that issues macroquad draw calls for the current frame.
struct MacroquadSurface {
    size: SurfaceSize,
    transform: SurfaceTransform,
}

impl MacroquadSurface {
    fn window_rect(&self, rect: Rect) -> (Vec2, Vec2) {
        (
            self.transform.to_window(rect.origin),
            rect.size * self.transform.scale,
        )
    }
}

impl Surface for MacroquadSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self, color: Color) {
        macroquad::window::clear_background(macroquad::color::BLACK);
        let (origin, size) = self.window_rect(Rect::new(
            0.0,
            0.0,
            self.size.width() as f32,
            self.size.height() as f32,
        ));
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            size.x,
            size.y,
            to_macroquad_color(color),
        );
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        let (origin, size) = self.window_rect(rect);
        macroquad::shapes::draw_rectangle_lines(
            origin.x,
            origin.y,
            size.x,
            size.y,
            line_width * self.transform.scale,
            to_macroquad_color(color),
        );
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let (origin, size) = self.window_rect(rect);
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            size.x,
            size.y,
            to_macroquad_color(color),
        );
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, line_width: f32) {
        let center = self.transform.to_window(center);
        macroquad::shapes::draw_circle_lines(
            center.x,
            center.y,
            radius * self.transform.scale,
            line_width * self.transform.scale,
            to_macroquad_color(color),
        );
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Color, line_width: f32) {
        let from = self.transform.to_window(from);
        let to = self.transform.to_window(to);
        macroquad::shapes::draw_line(
            from.x,
            from.y,
            to.x,
            to.y,
            line_width * self.transform.scale,
            to_macroquad_color(color),
        );
    }

    fn text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color) {
        let position = self.transform.to_window(position);
        let _ = macroquad::text::draw_text(
            text,
            position.x,
            position.y,
            font_size * self.transform.scale,
            to_macroquad_color(color),
        );
    }

    fn present(&mut self) {}
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
