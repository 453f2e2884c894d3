use clusterviz_core::{DebugState, Snapshot};

use crate::point::{render_centroid, render_point};
use crate::{Color, Layout, RenderError, Surface, Theme};

/// Draw the main scene for `snapshot`.
///
/// Layers, back to front: background, a neutral dot under every point, each
/// cluster's members in `colors[cluster]`, and k-means centroid markers. The
/// snapshot is validated first; on error nothing is drawn.
pub fn render_scene<S: Surface + ?Sized>(
    surface: &mut S,
    snapshot: &Snapshot,
    colors: &[Color],
    layout: &Layout,
    theme: &Theme,
) -> Result<(), RenderError> {
    layout.validate()?;
    snapshot.validate()?;
    if colors.len() < snapshot.clusters.len() {
        return Err(RenderError::MissingColors {
            clusters: snapshot.clusters.len(),
            colors: colors.len(),
        });
    }

    surface.clear(theme.background);

    for point in &snapshot.points {
        render_point(surface, *point, theme.neutral, layout);
    }

    for (members, color) in snapshot.clusters.iter().zip(colors) {
        for &point_id in members {
            render_point(surface, snapshot.points[point_id], *color, layout);
        }
    }

    match &snapshot.debug {
        DebugState::KMeans { means } => {
            for (mean, color) in means.iter().zip(colors) {
                render_centroid(surface, *mean, *color, theme.centroid_outline, layout);
            }
        }
        // Matrix debug data goes to the auxiliary overlays, not the main scene.
        DebugState::Ap { .. } | DebugState::None | DebugState::Unsupported => {}
    }

    Ok(())
}
