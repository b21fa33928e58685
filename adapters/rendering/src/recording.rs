//! Surface that records draw calls instead of rasterising them.

use glam::Vec2;

use crate::{Color, Rect, Surface, SurfaceSize};

/// Draw call captured by [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Whole-surface fill.
    Clear {
        /// Fill color.
        color: Color,
    },
    /// Rectangle outline.
    StrokeRect {
        /// Outlined rectangle.
        rect: Rect,
        /// Outline color.
        color: Color,
        /// Outline thickness.
        line_width: f32,
    },
    /// Filled rectangle.
    FillRect {
        /// Filled rectangle.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// Circle outline.
    StrokeCircle {
        /// Circle centre.
        center: Vec2,
        /// Circle radius.
        radius: f32,
        /// Outline color.
        color: Color,
        /// Outline thickness.
        line_width: f32,
    },
    /// Line segment.
    Line {
        /// Start point.
        from: Vec2,
        /// End point.
        to: Vec2,
        /// Stroke color.
        color: Color,
        /// Stroke thickness.
        line_width: f32,
    },
    /// Text run.
    Text {
        /// Rendered text.
        text: String,
        /// Baseline start.
        position: Vec2,
        /// Font size in logical pixels.
        font_size: f32,
        /// Text color.
        color: Color,
    },
    /// End of frame marker.
    Present,
}

/// Headless surface keeping the draw calls of the most recent frame.
///
/// Every [`Surface::clear`] starts a new frame and discards older commands.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    size: SurfaceSize,
    commands: Vec<DrawCommand>,
    frames_presented: u64,
}

impl RecordingSurface {
    /// Creates an empty recording surface.
    #[must_use]
    pub const fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            commands: Vec::new(),
            frames_presented: 0,
        }
    }

    /// Commands recorded since the last clear.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Takes the recorded commands, leaving the surface empty.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of frames presented so far.
    #[must_use]
    pub const fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            color,
            line_width,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Color, line_width: f32) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            color,
            line_width,
        });
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Color, line_width: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            line_width,
        });
    }

    fn text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            position,
            font_size,
            color,
        });
    }

    fn present(&mut self) {
        self.commands.push(DrawCommand::Present);
        self.frames_presented += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_starts_a_new_frame() {
        let mut surface = RecordingSurface::new(SurfaceSize::new(10, 10).expect("non-zero"));
        surface.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::RED);
        surface.present();
        surface.clear(Color::BACKGROUND);

        assert_eq!(
            surface.commands(),
            &[DrawCommand::Clear {
                color: Color::BACKGROUND
            }]
        );
        assert_eq!(surface.frames_presented(), 1);
        assert_eq!(surface.take_commands().len(), 1);
        assert!(surface.commands().is_empty());
    }
}
