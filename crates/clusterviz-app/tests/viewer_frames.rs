mod common;

use std::num::NonZeroU32;

use anyhow::Result;
use clusterviz_app::{ClientError, RenderPipeline, Viewer, ViewerConfig, ViewerError};
use clusterviz_core::{AlgorithmId, AlgorithmParams, Point};
use clusterviz_render::{Color, Layout, MatrixKind, RasterSurface, Theme};
use common::{AP_SNAPSHOT, KMEANS_SNAPSHOT, MockServer, ok};
use tempfile::tempdir;

fn viewer_for(server: &MockServer) -> Viewer {
    let config = ViewerConfig {
        base_url: server.base_url.clone(),
        canvas_width: 200,
        canvas_height: 80,
        palette_seed: Some(42),
        ..ViewerConfig::default()
    };
    Viewer::from_parts(server.client(), RenderPipeline::new(&config))
}

fn pixel_at(surface: &RasterSurface, point: Point) -> Option<Color> {
    let (x, y) = Layout::default().to_canvas(point);
    surface.pixel(x.round() as u32, y.round() as u32)
}

#[tokio::test]
async fn refresh_renders_and_saves_all_frames() -> Result<()> {
    let server = MockServer::start(vec![ok(AP_SNAPSHOT)]).await;
    let mut viewer = viewer_for(&server);

    let frames = viewer.refresh().await?;
    let responsibility = frames
        .overlay(MatrixKind::Responsibility)
        .expect("ap snapshot has overlays");
    assert_eq!(
        pixel_at(responsibility, Point::new(0.0, 0.0)),
        Some(Theme::default().focal)
    );
    assert_eq!(
        pixel_at(responsibility, Point::new(10.0, 0.0)),
        Some(Color::rgb(0, 255, 0))
    );
    assert_eq!(
        pixel_at(responsibility, Point::new(20.0, 0.0)),
        Some(Color::rgb(0, 63, 0))
    );

    let dir = tempdir()?;
    let written = viewer.save_frames(dir.path())?;
    assert_eq!(written.len(), 3);
    for path in &written {
        assert!(path.exists(), "{} missing", path.display());
    }
    Ok(())
}

#[tokio::test]
async fn failed_refresh_keeps_previous_frames() -> Result<()> {
    let server = MockServer::start(vec![ok(KMEANS_SNAPSHOT), (500, "down".to_string())]).await;
    let mut viewer = viewer_for(&server);

    let before = viewer.refresh().await?.clone();
    let colors = viewer.pipeline().colors().to_vec();

    let err = viewer.refresh().await.expect_err("server error");
    assert!(matches!(
        err,
        ViewerError::Client(ClientError::Status { .. })
    ));
    assert_eq!(viewer.pipeline().frames(), Some(&before));
    assert_eq!(viewer.pipeline().colors(), colors.as_slice());
    Ok(())
}

#[tokio::test]
async fn advance_fetches_state_after_last_step() -> Result<()> {
    let server = MockServer::start(vec![ok(""), ok(""), ok(KMEANS_SNAPSHOT)]).await;
    let mut viewer = viewer_for(&server);

    let frames = viewer
        .advance(NonZeroU32::new(2).expect("non-zero"))
        .await?;
    assert!(frames.availability.is_none());
    assert_eq!(
        server.requests(),
        ["GET /next", "GET /next", "GET /data"]
    );
    Ok(())
}

#[tokio::test]
async fn select_algorithm_refreshes_view() -> Result<()> {
    let server = MockServer::start(vec![ok(""), ok(AP_SNAPSHOT)]).await;
    let mut viewer = viewer_for(&server);

    viewer
        .select_algorithm(&AlgorithmId::new("ap"), &AlgorithmParams::new())
        .await?;
    assert_eq!(
        server.requests(),
        ["GET /set_clusterer?id=ap", "GET /data"]
    );
    assert_eq!(viewer.set_focal_index(9)?, 2);
    Ok(())
}

#[tokio::test]
async fn saving_before_first_render_fails() {
    let server = MockServer::start(Vec::new()).await;
    let viewer = viewer_for(&server);
    let dir = tempdir().expect("temp dir");
    assert!(matches!(
        viewer.save_frames(dir.path()),
        Err(ViewerError::NothingRendered)
    ));
}
