//! Diverging-color overlays for pairwise affinity-propagation matrices.
//!
//! A matrix is a flat row-major `N * N` slice where entry `i * N + j` scores
//! point `j` relative to focal point `i`. Only the focal row is drawn: its
//! values are divided by the row's largest magnitude, positive values map to
//! green intensity and non-positive values to red intensity.

use clusterviz_core::{DebugState, Point};

use crate::point::render_point;
use crate::{Color, Layout, RenderError, Surface, Theme};

/// The two matrices carried by the affinity-propagation debug payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixKind {
    Availability,
    Responsibility,
}

impl MatrixKind {
    pub const ALL: [MatrixKind; 2] = [MatrixKind::Availability, MatrixKind::Responsibility];

    pub fn label(self) -> &'static str {
        match self {
            MatrixKind::Availability => "availability",
            MatrixKind::Responsibility => "responsibility",
        }
    }

    /// The matrix of this kind carried by `debug`, if any.
    pub fn select(self, debug: &DebugState) -> Option<&[f64]> {
        match (self, debug) {
            (
                MatrixKind::Availability,
                DebugState::Ap {
                    availability: matrix,
                    ..
                },
            )
            | (
                MatrixKind::Responsibility,
                DebugState::Ap {
                    responsibility: matrix,
                    ..
                },
            ) => Some(matrix.as_slice()),
            (_, DebugState::None | DebugState::KMeans { .. } | DebugState::Unsupported) => None,
        }
    }
}

/// Focal row scaled into `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    /// `max(|min|, |max|)` of the raw row; zero for an all-zero row.
    pub scale: f64,
    pub values: Vec<f64>,
}

/// Slice row `focal` out of a flat `point_count * point_count` matrix.
pub fn matrix_row(matrix: &[f64], point_count: usize, focal: usize) -> Result<&[f64], RenderError> {
    let expected = point_count.checked_mul(point_count);
    if expected != Some(matrix.len()) {
        return Err(RenderError::MatrixShape {
            actual: matrix.len(),
            point_count,
        });
    }
    if focal >= point_count {
        return Err(RenderError::InvalidFocalIndex {
            index: focal,
            point_count,
        });
    }
    let start = focal * point_count;
    Ok(&matrix[start..start + point_count])
}

pub fn normalize_row(row: &[f64]) -> NormalizedRow {
    let (min, max) = row
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &value| {
            (lo.min(value), hi.max(value))
        });
    let scale = if row.is_empty() {
        0.0
    } else {
        min.abs().max(max.abs())
    };

    let values = if scale > 0.0 && scale.is_finite() {
        row.iter().map(|value| value / scale).collect()
    } else {
        vec![0.0; row.len()]
    };
    NormalizedRow { scale, values }
}

/// Green for positive values, red for zero and negative ones; the channel
/// intensity is `floor(|norm| * 255)`.
pub fn diverging_color(norm: f64) -> Color {
    let intensity = |value: f64| (value * 255.0).floor().clamp(0.0, 255.0) as u8;
    if norm > 0.0 {
        Color::rgb(0, intensity(norm), 0)
    } else {
        Color::rgb(intensity(-norm), 0, 0)
    }
}

/// Draw one matrix overlay: every non-focal point in its diverging color, then
/// the focal point in `theme.focal`.
pub fn render_matrix_overlay<S: Surface + ?Sized>(
    surface: &mut S,
    points: &[Point],
    matrix: &[f64],
    focal: usize,
    layout: &Layout,
    theme: &Theme,
) -> Result<(), RenderError> {
    layout.validate()?;
    let row = matrix_row(matrix, points.len(), focal)?;
    let normalized = normalize_row(row);

    surface.clear(theme.background);
    for (index, (point, norm)) in points.iter().zip(&normalized.values).enumerate() {
        if index == focal {
            continue;
        }
        render_point(surface, *point, diverging_color(*norm), layout);
    }
    render_point(surface, points[focal], theme.focal, layout);
    Ok(())
}
