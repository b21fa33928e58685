#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Canvas TD adapters.
//!
//! The simulation draws through the [`Surface`] trait, which only exposes the
//! primitives the game needs: rectangle stroke and fill, circle arcs, line
//! segments and text. Backends implement the trait for a concrete canvas,
//! while [`RecordingSurface`] captures draw calls for headless runs and tests.

pub mod draw;
mod recording;

use std::{error::Error, fmt};

use anyhow::Result as AnyResult;
use canvas_td_core::{Rgb, Vector2D};
use glam::Vec2;

pub use recording::{DrawCommand, RecordingSurface};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Backdrop cleared at the start of every frame.
    pub const BACKGROUND: Self = Self::from_rgb_u8(0x16, 0x41, 0x3c);
    /// Plain white.
    pub const WHITE: Self = Self::from_rgb_u8(0xff, 0xff, 0xff);
    /// Plain yellow.
    pub const YELLOW: Self = Self::from_rgb_u8(0xff, 0xff, 0x00);
    /// Enemy body color.
    pub const ORANGE: Self = Self::from_rgb_u8(0xff, 0xa5, 0x00);
    /// Health bars and valid placement tint.
    pub const LIGHT_GREEN: Self = Self::from_rgb_u8(0x90, 0xee, 0x90);
    /// Invalid placement tint.
    pub const RED: Self = Self::from_rgb_u8(0xff, 0x00, 0x00);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with the provided alpha.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

impl From<Rgb> for Color {
    fn from(value: Rgb) -> Self {
        Self::from_rgb_u8(value.red(), value.green(), value.blue())
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Converts a simulation vector into drawing coordinates.
#[must_use]
pub fn to_vec2(value: Vector2D) -> Vec2 {
    value.as_dvec().as_vec2()
}

/// Axis-aligned rectangle in drawing coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    /// Top-left corner.
    pub origin: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and extent.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Centre of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size / 2.0
    }

    /// Whether `point` lies inside the rectangle or on its edges.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let end = self.origin + self.size;
        point.x >= self.origin.x && point.x <= end.x && point.y >= self.origin.y && point.y <= end.y
    }
}

/// Logical size of a drawing surface. Always non-zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    width: u32,
    height: u32,
}

impl SurfaceSize {
    /// Creates a surface size, rejecting zero-area surfaces.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderingError> {
        if width == 0 || height == 0 {
            return Err(RenderingError::ZeroArea { width, height });
        }
        Ok(Self { width, height })
    }

    /// Width in logical pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in logical pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Abstract 2D canvas the simulation draws onto, in logical pixels.
pub trait Surface {
    /// Logical size of the surface.
    fn size(&self) -> SurfaceSize;

    /// Fills the whole surface.
    fn clear(&mut self, color: Color);

    /// Draws a rectangle outline.
    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32);

    /// Draws a filled rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draws a full circle arc.
    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, line_width: f32);

    /// Draws a line segment.
    fn line(&mut self, from: Vec2, to: Vec2, color: Color, line_width: f32);

    /// Draws text whose baseline starts at `position`.
    fn text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color);

    /// Marks the end of a frame.
    fn present(&mut self);
}

/// Input snapshot gathered by adapters before the frame is simulated.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Host timestamp of the frame in milliseconds.
    pub timestamp_ms: f64,
    /// Pointer position in raw window pixels relative to the surface's top-left
    /// corner, if the pointer is over the window.
    pub pointer: Option<Vec2>,
    /// Ratio between logical surface pixels and raw window pixels.
    pub scale_ratio: f32,
    /// Whether the primary button was pressed this frame.
    pub pointer_pressed: bool,
    /// Whether the primary button was released this frame.
    pub pointer_released: bool,
}

/// Decision returned by the per-frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Keep requesting frames.
    Continue,
    /// Close the window.
    Exit,
}

/// Rendering backend capable of presenting Canvas TD frames.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `frame` closure is invoked once per display refresh with
    /// the captured input and a surface sized to `size`.
    fn run<F>(self, title: &str, size: SurfaceSize, frame: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut dyn Surface) -> FrameControl + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Surfaces must cover at least one pixel.
    ZeroArea {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroArea { width, height } => {
                write!(
                    f,
                    "surface must have a non-zero area (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_area_surfaces_are_rejected() {
        assert_eq!(
            SurfaceSize::new(0, 600),
            Err(RenderingError::ZeroArea {
                width: 0,
                height: 600
            })
        );
        assert!(SurfaceSize::new(1024, 0).is_err());
        assert!(SurfaceSize::new(1024, 600).is_ok());
    }

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::from_rgb_u8(0, 0, 0).lighten(0.5);
        assert!((color.red - 0.5).abs() < f32::EPSILON);
        assert!((color.alpha - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn rect_containment_includes_edges() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(rect.contains(Vec2::new(10.0, 30.0)));
        assert!(rect.contains(rect.center()));
        assert!(!rect.contains(Vec2::new(30.5, 15.0)));
    }

    #[test]
    fn template_colors_convert_from_rgb() {
        assert_eq!(Color::from(Rgb::new(0xff, 0xff, 0x00)), Color::YELLOW);
    }
}
