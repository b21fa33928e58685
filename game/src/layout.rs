//! Screen regions shared by the HUD, the map and pointer hit testing.

use canvas_td_rendering::{Rect, SurfaceSize};
use canvas_td_world::map::MapViewport;

const SIDE_BAR_FRACTION: f32 = 0.2;
const TOP_BAR_FRACTION: f32 = 0.1;
const MAP_INSET: f32 = 10.0;
const PALETTE_LEFT_PADDING: f32 = 25.0;
const PALETTE_TOP_PADDING: f32 = 20.0;

/// Fixed partition of the surface into top bar, side bar and map container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    top_bar: Rect,
    side_bar: Rect,
    map_container: Rect,
}

impl Layout {
    /// Partitions a surface of `size` logical pixels.
    #[must_use]
    pub fn new(size: SurfaceSize) -> Self {
        let width = size.width() as f32;
        let height = size.height() as f32;
        let side_width = width * SIDE_BAR_FRACTION;
        let top_height = height * TOP_BAR_FRACTION;

        Self {
            top_bar: Rect::new(0.0, 0.0, width - side_width, top_height),
            side_bar: Rect::new(width - side_width, 0.0, side_width, height),
            map_container: Rect::new(
                MAP_INSET,
                top_height + MAP_INSET,
                width - side_width - 2.0 * MAP_INSET,
                height - top_height - 2.0 * MAP_INSET,
            ),
        }
    }

    /// Bar across the top holding the title and player counters.
    #[must_use]
    pub const fn top_bar(&self) -> Rect {
        self.top_bar
    }

    /// Bar on the right holding the tower palette.
    #[must_use]
    pub const fn side_bar(&self) -> Rect {
        self.side_bar
    }

    /// Region the map is fitted into.
    #[must_use]
    pub const fn map_container(&self) -> Rect {
        self.map_container
    }

    /// Map container expressed as a map viewport.
    #[must_use]
    pub fn map_viewport(&self) -> MapViewport {
        let Rect { origin, size } = self.map_container;
        MapViewport::new(
            f64::from(origin.x),
            f64::from(origin.y),
            f64::from(size.x),
            f64::from(size.y),
        )
    }

    /// Clickable square of the `index`th palette icon for a map with `cell_size` cells.
    #[must_use]
    pub fn palette_slot(&self, index: usize, cell_size: f32) -> Rect {
        Rect::new(
            self.side_bar.origin.x + PALETTE_LEFT_PADDING + index as f32 * cell_size,
            self.top_bar.size.y + PALETTE_TOP_PADDING + cell_size,
            cell_size,
            cell_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_screen_is_partitioned_like_the_hud() {
        let layout = Layout::new(SurfaceSize::new(1000, 600).expect("non-zero"));

        assert_eq!(layout.top_bar(), Rect::new(0.0, 0.0, 800.0, 60.0));
        assert_eq!(layout.side_bar(), Rect::new(800.0, 0.0, 200.0, 600.0));
        assert_eq!(layout.map_container(), Rect::new(10.0, 70.0, 780.0, 520.0));
        assert_eq!(layout.palette_slot(1, 30.0), Rect::new(855.0, 110.0, 30.0, 30.0));
    }
}
