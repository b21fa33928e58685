use canvas_td_core::{
    CellCoord, Command, EnemySpec, IdAllocator, MapDefinition, TowerTemplate, Vector2D,
};
use canvas_td_rendering::{
    draw::{
        draw_entities, draw_hud, draw_map, draw_selection_preview, HudView, PaletteIcon,
        SelectionPreview,
    },
    Color, DrawCommand, RecordingSurface, Rect, Surface, SurfaceSize,
};
use canvas_td_world::{
    apply,
    map::{GridMap, MapViewport},
    player::Player,
    query, World,
};
use glam::Vec2;

fn strip_map() -> GridMap {
    let definition = MapDefinition {
        cells_x: 3,
        cells_y: 2,
        terrain: "SPE...".to_owned(),
        waypoints: vec![CellCoord::new(0, 0), CellCoord::new(2, 0)],
        ..MapDefinition::default()
    };
    GridMap::new(&definition, MapViewport::new(0.0, 0.0, 90.0, 60.0)).expect("valid map")
}

fn surface() -> RecordingSurface {
    RecordingSurface::new(SurfaceSize::new(90, 60).expect("non-zero size"))
}

#[test]
fn map_fills_every_cell_and_outlines_path_borders() {
    let map = strip_map();
    let mut surface = surface();
    draw_map(&mut surface, &map);

    let commands = surface.commands();
    let fills = commands
        .iter()
        .filter(|command| matches!(command, DrawCommand::FillRect { .. }))
        .count();
    let outlines = commands
        .iter()
        .filter(|command| matches!(command, DrawCommand::StrokeRect { .. }))
        .count();
    let borders: Vec<(Vec2, Vec2)> = commands
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Line { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect();

    assert_eq!(fills, 6);
    assert_eq!(outlines, 3);
    assert_eq!(borders.len(), 3);
    assert_eq!(borders[0], (Vec2::new(0.0, 30.0), Vec2::new(30.0, 30.0)));
}

#[test]
fn towers_draw_range_and_aim_before_enemies_draw_health() {
    let mut world = World::new(strip_map(), Player::new(500, 20), IdAllocator::new());
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::PlaceTower {
            template: TowerTemplate::default(),
            position: Vector2D::new(45.0, 45.0).expect("finite"),
        },
        &mut events,
    );
    apply(
        &mut world,
        Command::SpawnEnemy {
            spec: EnemySpec::default(),
        },
        &mut events,
    );
    apply(
        &mut world,
        Command::Tick {
            timestamp_ms: 1_000.0,
        },
        &mut events,
    );

    let mut surface = surface();
    draw_entities(&mut surface, query::entities(&world));
    let commands = surface.commands();
    assert_eq!(commands.len(), 5);

    match &commands[0] {
        DrawCommand::StrokeRect { rect, line_width, .. } => {
            assert_eq!(*rect, Rect::new(30.0, 30.0, 30.0, 30.0));
            assert_eq!(*line_width, 5.0);
        }
        other => panic!("expected tower outline, got {other:?}"),
    }
    match &commands[1] {
        DrawCommand::StrokeCircle { center, radius, color, .. } => {
            assert_eq!(*center, Vec2::new(45.0, 45.0));
            assert_eq!(*radius, 60.0);
            assert_eq!(*color, Color::WHITE);
        }
        other => panic!("expected range circle, got {other:?}"),
    }
    assert!(matches!(
        commands[2],
        DrawCommand::Line { color, .. } if color == Color::YELLOW
    ));
    assert!(matches!(
        commands[3],
        DrawCommand::FillRect { color, .. } if color == Color::ORANGE
    ));
    match &commands[4] {
        DrawCommand::FillRect { rect, color } => {
            assert_eq!(*color, Color::LIGHT_GREEN);
            assert!((rect.size.x - 9.6).abs() < 1e-4);
            assert_eq!(rect.size.y, 2.0);
        }
        other => panic!("expected health bar, got {other:?}"),
    }
}

#[test]
fn hud_reports_player_counters_and_fps() {
    let view = HudView {
        top_bar: Rect::new(0.0, 0.0, 800.0, 60.0),
        side_bar: Rect::new(800.0, 0.0, 200.0, 600.0),
        title: "Canvas TD".to_owned(),
        money: 500,
        score: 1200,
        lives: 18,
        max_lives: 20,
        level: 1,
        levels: 3,
        fps: Some(60),
        palette: vec![PaletteIcon {
            rect: Rect::new(825.0, 90.0, 30.0, 30.0),
            color: Color::LIGHT_GREEN,
            name: "Laser Tower".to_owned(),
            cost: 100,
            selected: false,
        }],
    };
    let mut surface = surface();
    draw_hud(&mut surface, &view);

    let texts: Vec<&str> = surface
        .commands()
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    for expected in [
        "Canvas TD",
        "Bank: £500",
        "Score: 1200",
        "Lives: 18/20",
        "Level: 1/3",
        "Laser Tower £100",
        "FPS: 60",
    ] {
        assert!(texts.contains(&expected), "missing {expected:?} in {texts:?}");
    }
}

#[test]
fn invalid_placement_is_tinted_red() {
    let preview = SelectionPreview {
        rect: Rect::new(0.0, 0.0, 30.0, 30.0),
        placeable: false,
        outline: Color::LIGHT_GREEN,
        range_center: Vec2::new(15.0, 15.0),
        range_radius: 60.0,
    };
    let mut surface = surface();
    surface.clear(Color::BACKGROUND);
    draw_selection_preview(&mut surface, &preview);

    assert_eq!(
        surface.commands()[1],
        DrawCommand::FillRect {
            rect: preview.rect,
            color: Color::RED.with_alpha(0.45),
        }
    );
}
