use anyhow::Result;
use clusterviz_core::{DebugState, Snapshot};
use clusterviz_render::{
    Color, ColorRegistry, Layout, MatrixKind, RasterSurface, Theme, render_matrix_overlay,
    render_scene, render_scene_png,
};

const K_MEANS_SNAPSHOT: &str = r#"{
    "points": [
        {"x": 1.0, "y": 1.0}, {"x": 2.0, "y": 1.5}, {"x": 1.5, "y": 2.5},
        {"x": 40.0, "y": 40.0}, {"x": 41.0, "y": 42.0}, {"x": 39.0, "y": 41.0}
    ],
    "clusters": [[0, 1, 2], [3, 4, 5]],
    "debug": {
        "type": "k_means",
        "means": [{"x": 5.0, "y": 5.0}, {"x": 45.0, "y": 45.0}]
    }
}"#;

const AP_SNAPSHOT: &str = r#"{
    "points": [{"x": 0, "y": 0}, {"x": 10, "y": 0}, {"x": 20, "y": 0}],
    "clusters": [[0, 1, 2]],
    "debug": {
        "type": "ap",
        "availability": [0, 0, 0, 5, 0, -5, 0, 0, 0],
        "responsibility": [1, 2, 3, -4, 8, 2, 0, 0, 0]
    }
}"#;

fn pixel_at(surface: &RasterSurface, layout: &Layout, snapshot: &Snapshot, id: usize) -> Color {
    let (x, y) = layout.to_canvas(snapshot.points[id]);
    surface
        .pixel(x.round() as u32, y.round() as u32)
        .expect("point lies on canvas")
}

#[test]
fn k_means_snapshot_renders_to_png() -> Result<()> {
    let snapshot = Snapshot::from_json(K_MEANS_SNAPSHOT.as_bytes())?;
    let mut registry = ColorRegistry::with_seed(5);
    let colors = registry.reconcile(snapshot.cluster_count()).to_vec();

    let png = render_scene_png(
        &snapshot,
        &colors,
        &Layout::default(),
        &Theme::default(),
        400,
        400,
    )?;
    assert_eq!(&png[0..8], b"\x89PNG\r\n\x1a\n", "invalid PNG header");
    Ok(())
}

#[test]
fn cluster_members_take_their_cluster_color() -> Result<()> {
    let snapshot = Snapshot::from_json(K_MEANS_SNAPSHOT.as_bytes())?;
    let layout = Layout::default();
    let theme = Theme::default();
    let mut registry = ColorRegistry::with_seed(5);
    let colors = registry.reconcile(snapshot.cluster_count()).to_vec();

    let mut surface = RasterSurface::new(400, 400);
    render_scene(&mut surface, &snapshot, &colors, &layout, &theme)?;

    assert_eq!(pixel_at(&surface, &layout, &snapshot, 1), colors[0]);
    assert_eq!(pixel_at(&surface, &layout, &snapshot, 4), colors[1]);
    Ok(())
}

#[test]
fn colors_survive_refresh_with_same_cluster_count() -> Result<()> {
    let first = Snapshot::from_json(K_MEANS_SNAPSHOT.as_bytes())?;
    let mut registry = ColorRegistry::new();
    let before = registry.reconcile(first.cluster_count()).to_vec();

    // Same cluster count after the simulation advanced.
    let mut second = first.clone();
    second.points[0].x += 0.25;
    let after = registry.reconcile(second.cluster_count()).to_vec();
    assert_eq!(before, after);
    Ok(())
}

#[test]
fn ap_overlays_share_main_scene_geometry() -> Result<()> {
    let snapshot = Snapshot::from_json(AP_SNAPSHOT.as_bytes())?;
    let layout = Layout::default();
    let theme = Theme::default();
    let focal = 1;

    let mut availability = RasterSurface::new(300, 100);
    let matrix = MatrixKind::Availability
        .select(&snapshot.debug)
        .expect("ap payload");
    render_matrix_overlay(&mut availability, &snapshot.points, matrix, focal, &layout, &theme)?;

    assert_eq!(pixel_at(&availability, &layout, &snapshot, 0), Color::rgb(0, 255, 0));
    assert_eq!(pixel_at(&availability, &layout, &snapshot, 1), theme.focal);
    assert_eq!(pixel_at(&availability, &layout, &snapshot, 2), Color::rgb(255, 0, 0));

    let mut responsibility = RasterSurface::new(300, 100);
    let matrix = MatrixKind::Responsibility
        .select(&snapshot.debug)
        .expect("ap payload");
    render_matrix_overlay(&mut responsibility, &snapshot.points, matrix, focal, &layout, &theme)?;

    // Row [-4, 8, 2]: scale 8.
    assert_eq!(pixel_at(&responsibility, &layout, &snapshot, 0), Color::rgb(127, 0, 0));
    assert_eq!(pixel_at(&responsibility, &layout, &snapshot, 2), Color::rgb(0, 63, 0));
    assert!(matches!(snapshot.debug, DebugState::Ap { .. }));
    Ok(())
}
