//! Tower palette, selection and placement driven by pointer presses.

use canvas_td_core::{Command, Terrain, TowerTemplate, Vector2D};
use canvas_td_rendering::{
    draw::{PaletteIcon, SelectionPreview},
    to_vec2, Rect,
};
use canvas_td_world::{query, World};

use crate::layout::Layout;

/// Action queued by the input channel for the next update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UiAction {
    /// Primary pointer press at a position in simulation coordinates.
    Press(Vector2D),
}

#[derive(Clone, Debug, PartialEq)]
struct SelectedTower {
    template: TowerTemplate,
    position: Vector2D,
}

/// Palette of placeable towers and the tower currently held by the pointer.
#[derive(Clone, Debug, Default)]
pub struct Ui {
    templates: Vec<TowerTemplate>,
    selected: Option<SelectedTower>,
}

impl Ui {
    /// Creates an empty palette.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            templates: Vec::new(),
            selected: None,
        }
    }

    /// Appends `template` to the palette and returns its slot.
    pub fn add_template(&mut self, template: TowerTemplate) -> usize {
        self.templates.push(template);
        self.templates.len() - 1
    }

    /// Registered templates in palette order.
    #[must_use]
    pub fn templates(&self) -> &[TowerTemplate] {
        &self.templates
    }

    /// Picks up a copy of the template in `slot` at `position`.
    ///
    /// Returns `false` when the slot is empty.
    pub fn select(&mut self, slot: usize, position: Vector2D) -> bool {
        let Some(template) = self.templates.get(slot) else {
            return false;
        };
        tracing::debug!(slot, tower = %template.name, "tower selected");
        self.selected = Some(SelectedTower {
            template: template.clone(),
            position,
        });
        true
    }

    /// Template held by the pointer and its current position.
    #[must_use]
    pub fn selected(&self) -> Option<(&TowerTemplate, Vector2D)> {
        self.selected
            .as_ref()
            .map(|selected| (&selected.template, selected.position))
    }

    /// Drops the held tower and returns its template.
    pub fn clear_selection(&mut self) -> Option<TowerTemplate> {
        self.selected.take().map(|selected| selected.template)
    }

    /// Moves the held tower to `pointer`.
    pub fn follow(&mut self, pointer: Vector2D) {
        if let Some(selected) = self.selected.as_mut() {
            selected.position = pointer;
        }
    }

    /// Handles a press at `position`.
    ///
    /// With a tower held, the press releases it and asks the world to place
    /// it. Otherwise a press on a palette icon picks that template up.
    pub fn press(&mut self, position: Vector2D, layout: &Layout, cell_size: f64) -> Option<Command> {
        if let Some(template) = self.clear_selection() {
            return Some(Command::PlaceTower { template, position });
        }

        let point = to_vec2(position);
        let slot = (0..self.templates.len())
            .find(|&slot| layout.palette_slot(slot, cell_size as f32).contains(point))?;
        let _ = self.select(slot, position);
        None
    }

    /// Palette icons for the HUD.
    #[must_use]
    pub fn palette_icons(&self, layout: &Layout, cell_size: f64) -> Vec<PaletteIcon> {
        let held = self.selected.as_ref().map(|selected| &selected.template);
        self.templates
            .iter()
            .enumerate()
            .map(|(slot, template)| PaletteIcon {
                rect: layout.palette_slot(slot, cell_size as f32),
                color: template.color.into(),
                name: template.name.clone(),
                cost: template.cost,
                selected: held == Some(template),
            })
            .collect()
    }

    /// Footprint of the held tower centred on the pointer.
    ///
    /// The footprint is placeable when the cell under the pointer is free
    /// ground and the bank covers the tower's cost.
    #[must_use]
    pub fn preview(&self, world: &World) -> Option<SelectionPreview> {
        let selected = self.selected.as_ref()?;
        let map = query::map(world);
        let cell_size = map.cell_size() as f32;
        let center = to_vec2(selected.position);

        let placeable = map
            .find_grid_cell(selected.position.x(), selected.position.y())
            .is_some_and(|cell| {
                map.terrain_of(cell) == Some(Terrain::Ground)
                    && query::tower_at(world, cell).is_none()
            })
            && query::player(world).money() >= selected.template.cost;

        Some(SelectionPreview {
            rect: Rect::new(
                center.x - cell_size / 2.0,
                center.y - cell_size / 2.0,
                cell_size,
                cell_size,
            ),
            placeable,
            outline: selected.template.color.into(),
            range_center: center,
            range_radius: cell_size * selected.template.range as f32,
        })
    }
}
