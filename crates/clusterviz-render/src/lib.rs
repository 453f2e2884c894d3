//! Raster rendering layer for ClusterViz.
//!
//! Everything here is synchronous and free of network concerns: given a
//! validated [`Snapshot`] it paints the main scene and the affinity-propagation
//! overlays onto any [`Surface`].

use clusterviz_core::{Snapshot, SnapshotError};
use thiserror::Error;

pub mod color;
pub mod layout;
pub mod overlay;
pub mod palette;
pub mod point;
pub mod scene;
pub mod surface;

pub use color::Color;
pub use layout::{Layout, Theme};
pub use overlay::{MatrixKind, NormalizedRow, diverging_color, normalize_row, render_matrix_overlay};
pub use palette::{ColorRegistry, palette};
pub use point::{render_centroid, render_point};
pub use scene::render_scene;
pub use surface::{CanvasPoint, DrawLog, DrawOp, RasterSurface, Surface};

/// Errors raised before or while drawing.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("snapshot has {clusters} clusters but only {colors} colors were supplied")]
    MissingColors { clusters: usize, colors: usize },
    #[error("focal index {index} is out of range for {point_count} points")]
    InvalidFocalIndex { index: usize, point_count: usize },
    #[error("matrix holds {actual} entries, expected the square of {point_count}")]
    MatrixShape { actual: usize, point_count: usize },
    #[error("invalid layout: {0}")]
    InvalidLayout(&'static str),
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Render the main scene offscreen and return PNG bytes.
pub fn render_scene_png(
    snapshot: &Snapshot,
    colors: &[Color],
    layout: &Layout,
    theme: &Theme,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, RenderError> {
    let mut surface = RasterSurface::new(width, height);
    render_scene(&mut surface, snapshot, colors, layout, theme)?;
    surface.encode_png()
}
