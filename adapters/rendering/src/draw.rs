//! Drawing routines that turn world state and HUD views into surface calls.

use canvas_td_core::{Direction, Terrain};
use canvas_td_world::{container::EntityContainer, entity::EntityKind, map::GridMap};
use glam::Vec2;

use crate::{to_vec2, Color, Rect, Surface};

const GRID_LINE_WIDTH: f32 = 1.0;
const PATH_BORDER_WIDTH: f32 = 2.0;
const TOWER_OUTLINE_WIDTH: f32 = 5.0;
const RANGE_LINE_WIDTH: f32 = 2.0;
const TARGET_LINE_WIDTH: f32 = 1.0;
const HEALTH_BAR_GAP: f32 = 5.0;
const HEALTH_BAR_HEIGHT: f32 = 2.0;
const TITLE_FONT_SIZE: f32 = 28.0;
const HUD_FONT_SIZE: f32 = 18.0;
const PALETTE_FONT_SIZE: f32 = 14.0;
const PREVIEW_TINT_ALPHA: f32 = 0.45;

/// Draws terrain cells and the borders where the path meets ground.
pub fn draw_map(surface: &mut dyn Surface, map: &GridMap) {
    let palette = map.palette();
    let cell_size = map.cell_size() as f32;

    for (cell, terrain) in map.cells() {
        let Some(origin) = map.cell_origin(cell) else {
            continue;
        };
        let origin = to_vec2(origin);
        let rect = Rect::new(origin.x, origin.y, cell_size, cell_size);
        match terrain {
            Terrain::Ground => {
                surface.fill_rect(rect, palette.ground.into());
                surface.stroke_rect(rect, palette.ground_line.into(), GRID_LINE_WIDTH);
            }
            Terrain::Path => surface.fill_rect(rect, palette.path.into()),
            Terrain::Start => surface.fill_rect(rect, palette.start.into()),
            Terrain::End => surface.fill_rect(rect, palette.end.into()),
        }
    }

    let border_color: Color = palette.path_line.into();
    for (cell, _) in map.cells().filter(|(_, terrain)| terrain.is_walkable()) {
        let Some(origin) = map.cell_origin(cell) else {
            continue;
        };
        let top_left = to_vec2(origin);
        let top_right = top_left + Vec2::new(cell_size, 0.0);
        let bottom_left = top_left + Vec2::new(0.0, cell_size);
        let bottom_right = top_left + Vec2::splat(cell_size);
        for side in map.border_edges(cell) {
            let (from, to) = match side {
                Direction::North => (top_left, top_right),
                Direction::South => (bottom_left, bottom_right),
                Direction::West => (top_left, bottom_left),
                Direction::East => (top_right, bottom_right),
            };
            surface.line(from, to, border_color, PATH_BORDER_WIDTH);
        }
    }
}

/// Draws every entity in traversal order.
///
/// Towers draw their outline, range circle and a line to their locked target.
/// Enemies draw their body and a health bar above it.
pub fn draw_entities(surface: &mut dyn Surface, entities: &EntityContainer) {
    for entity in entities.iter() {
        match entity.kind() {
            EntityKind::Tower(tower) => {
                let origin = to_vec2(tower.position());
                let size = tower.size() as f32;
                let center = to_vec2(tower.center());
                surface.stroke_rect(
                    Rect::new(origin.x, origin.y, size, size),
                    tower.template().color.into(),
                    TOWER_OUTLINE_WIDTH,
                );
                surface.stroke_circle(center, tower.radius() as f32, Color::WHITE, RANGE_LINE_WIDTH);

                let target = tower
                    .locked_target()
                    .and_then(|id| entities.get(id))
                    .and_then(|entity| entity.as_enemy());
                if let Some(enemy) = target {
                    let bounds = enemy.bounds();
                    let aim = Vec2::new(
                        (bounds.left() + bounds.width() / 2.0) as f32,
                        (bounds.top() + bounds.height() / 2.0) as f32,
                    );
                    surface.line(center, aim, Color::YELLOW, TARGET_LINE_WIDTH);
                }
            }
            EntityKind::Enemy(enemy) => {
                let bounds = enemy.bounds();
                let (x, y) = (bounds.left() as f32, bounds.top() as f32);
                let (width, height) = (bounds.width() as f32, bounds.height() as f32);
                surface.fill_rect(Rect::new(x, y, width, height), Color::ORANGE);
                surface.fill_rect(
                    Rect::new(
                        x,
                        y - HEALTH_BAR_GAP,
                        width * enemy.health_fraction() as f32,
                        HEALTH_BAR_HEIGHT,
                    ),
                    Color::LIGHT_GREEN,
                );
            }
        }
    }
}

/// Tower template offered in the side bar.
#[derive(Clone, Debug, PartialEq)]
pub struct PaletteIcon {
    /// Clickable area of the icon.
    pub rect: Rect,
    /// Template color.
    pub color: Color,
    /// Template name.
    pub name: String,
    /// Template cost.
    pub cost: u32,
    /// Whether the template is currently selected.
    pub selected: bool,
}

/// Everything the HUD shows for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct HudView {
    /// Bar across the top of the screen.
    pub top_bar: Rect,
    /// Bar down the right of the screen.
    pub side_bar: Rect,
    /// Game title.
    pub title: String,
    /// Bank balance.
    pub money: u32,
    /// Score.
    pub score: u64,
    /// Remaining lives.
    pub lives: u32,
    /// Starting lives.
    pub max_lives: u32,
    /// Current level.
    pub level: u32,
    /// Levels offered by the map.
    pub levels: u32,
    /// Latest FPS sample, when sampling is enabled.
    pub fps: Option<u32>,
    /// Tower palette.
    pub palette: Vec<PaletteIcon>,
}

/// Draws the top bar counters and the side bar tower palette.
pub fn draw_hud(surface: &mut dyn Surface, view: &HudView) {
    let panel = Color::BACKGROUND.lighten(0.08);
    surface.fill_rect(view.top_bar, panel);
    surface.fill_rect(view.side_bar, panel);

    let baseline = view.top_bar.origin.y + view.top_bar.size.y * 0.65;
    let column = view.top_bar.size.x / 5.0;
    let left = view.top_bar.origin.x + 10.0;
    surface.text(&view.title, Vec2::new(left, baseline), TITLE_FONT_SIZE, Color::WHITE);

    let counters = [
        format!("Bank: £{}", view.money),
        format!("Score: {}", view.score),
        format!("Lives: {}/{}", view.lives, view.max_lives),
        format!("Level: {}/{}", view.level, view.levels),
    ];
    for (index, counter) in counters.iter().enumerate() {
        let x = left + column * (index as f32 + 1.0);
        surface.text(counter, Vec2::new(x, baseline), HUD_FONT_SIZE, Color::WHITE);
    }

    let side_left = view.side_bar.origin.x + 25.0;
    surface.text(
        "Towers",
        Vec2::new(side_left, view.top_bar.size.y + HUD_FONT_SIZE),
        HUD_FONT_SIZE,
        Color::WHITE,
    );
    for icon in &view.palette {
        let color = if icon.selected {
            icon.color.lighten(0.5)
        } else {
            icon.color
        };
        surface.stroke_rect(icon.rect, color, TOWER_OUTLINE_WIDTH);
        let caption = icon.rect.origin + Vec2::new(0.0, icon.rect.size.y + PALETTE_FONT_SIZE);
        surface.text(
            &format!("{} £{}", icon.name, icon.cost),
            caption,
            PALETTE_FONT_SIZE,
            Color::WHITE,
        );
    }

    if let Some(fps) = view.fps {
        let position = Vec2::new(
            side_left,
            view.side_bar.origin.y + view.side_bar.size.y - HUD_FONT_SIZE,
        );
        surface.text(&format!("FPS: {fps}"), position, HUD_FONT_SIZE, Color::WHITE);
    }
}

/// Footprint of the tower being placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionPreview {
    /// Area the tower would occupy.
    pub rect: Rect,
    /// Whether the pointer is over buildable ground.
    pub placeable: bool,
    /// Template color.
    pub outline: Color,
    /// Centre of the range circle.
    pub range_center: Vec2,
    /// Radius of the range circle.
    pub range_radius: f32,
}

/// Draws the selected tower under the pointer, tinted by placement validity.
pub fn draw_selection_preview(surface: &mut dyn Surface, preview: &SelectionPreview) {
    let tint = if preview.placeable {
        Color::LIGHT_GREEN
    } else {
        Color::RED
    };
    surface.fill_rect(preview.rect, tint.with_alpha(PREVIEW_TINT_ALPHA));
    surface.stroke_rect(preview.rect, preview.outline, TOWER_OUTLINE_WIDTH);
    surface.stroke_circle(
        preview.range_center,
        preview.range_radius,
        Color::WHITE,
        RANGE_LINE_WIDTH,
    );
}
