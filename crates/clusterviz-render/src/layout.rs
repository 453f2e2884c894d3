use clusterviz_core::Point;
use serde::{Deserialize, Serialize};

use crate::{CanvasPoint, Color, RenderError};

/// Smallest gap, in pixels, between the centroid marker side and the point
/// diameter for the two to be told apart.
pub const MIN_MARKER_CONTRAST: f32 = 2.0;

/// Geometry shared by the main scene and every debug overlay, so that a point
/// lands on the same pixel in all of them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Canvas pixels per simulation unit.
    pub scale: f32,
    /// Pixel offset added to both axes after scaling.
    pub offset: f32,
    pub point_radius: f32,
    /// Side length of the k-means centroid marker.
    pub centroid_size: f32,
    pub centroid_outline: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            scale: 7.0,
            offset: 25.0,
            point_radius: 10.0,
            centroid_size: 16.0,
            centroid_outline: 2.0,
        }
    }
}

impl Layout {
    #[inline]
    pub fn to_canvas(&self, point: Point) -> CanvasPoint {
        (
            point.x as f32 * self.scale + self.offset,
            point.y as f32 * self.scale + self.offset,
        )
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(RenderError::InvalidLayout("scale must be positive and finite"));
        }
        if !self.offset.is_finite() {
            return Err(RenderError::InvalidLayout("offset must be finite"));
        }
        if !self.point_radius.is_finite() || self.point_radius <= 0.0 {
            return Err(RenderError::InvalidLayout("point_radius must be positive"));
        }
        if !self.centroid_size.is_finite() || self.centroid_size <= 0.0 {
            return Err(RenderError::InvalidLayout("centroid_size must be positive"));
        }
        if (self.centroid_size - self.point_radius * 2.0).abs() < MIN_MARKER_CONTRAST {
            return Err(RenderError::InvalidLayout(
                "centroid_size must differ from the point diameter by at least 2px",
            ));
        }
        if !self.centroid_outline.is_finite() || self.centroid_outline <= 0.0 {
            return Err(RenderError::InvalidLayout("centroid_outline must be positive"));
        }
        Ok(())
    }
}

/// Fixed colors that are not derived from cluster assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: Color,
    /// Baseline dot drawn under every point before cluster colors.
    pub neutral: Color,
    /// Highlight for the focal point on matrix overlays.
    pub focal: Color,
    pub centroid_outline: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            neutral: Color::rgb(160, 160, 160),
            focal: Color::rgb(30, 144, 255),
            centroid_outline: Color::BLACK,
        }
    }
}
