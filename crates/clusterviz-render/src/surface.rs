//! Drawing surfaces the compositor and overlays paint onto.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, RgbaImage};

use crate::{Color, RenderError};

/// Canvas-coordinate position in pixels.
pub type CanvasPoint = (f32, f32);

/// Minimal 2D drawing API shared by the raster and recording surfaces.
pub trait Surface {
    /// Fill the whole surface with `color`, discarding previous content.
    fn clear(&mut self, color: Color);

    fn fill_disc(&mut self, center: CanvasPoint, radius: f32, color: Color);

    /// Fill an axis-aligned square of side `size` centered on `center`.
    fn fill_square(&mut self, center: CanvasPoint, size: f32, color: Color);

    /// Outline an axis-aligned square; the stroke lies inside the square.
    fn stroke_square(&mut self, center: CanvasPoint, size: f32, width: f32, color: Color);
}

/// In-memory RGBA canvas backed by an [`RgbaImage`].
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    /// Zero dimensions are bumped to one pixel so encoders never see an
    /// empty image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.image.width() || y >= self.image.height() {
            return None;
        }
        let [r, g, b, a] = self.image.get_pixel(x, y).0;
        Some(Color { r, g, b, a })
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        self.image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }

    fn fill_span(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color) {
        let width = i64::from(self.image.width());
        let height = i64::from(self.image.height());
        let pixel = image::Rgba::from(color);
        for y in y0.max(0)..y1.min(height) {
            for x in x0.max(0)..x1.min(width) {
                self.image.put_pixel(x as u32, y as u32, pixel);
            }
        }
    }
}

/// Pixel bounds `[x0, x1) x [y0, y1)` covered by a square.
fn square_bounds(center: CanvasPoint, size: f32) -> (i64, i64, i64, i64) {
    let half = size.max(0.0) * 0.5;
    (
        (center.0 - half).round() as i64,
        (center.1 - half).round() as i64,
        (center.0 + half).round() as i64,
        (center.1 + half).round() as i64,
    )
}

impl Surface for RasterSurface {
    fn clear(&mut self, color: Color) {
        let pixel = image::Rgba::from(color);
        for px in self.image.pixels_mut() {
            *px = pixel;
        }
    }

    fn fill_disc(&mut self, center: CanvasPoint, radius: f32, color: Color) {
        if !center.0.is_finite() || !center.1.is_finite() || radius <= 0.0 {
            return;
        }
        let width = i64::from(self.image.width());
        let height = i64::from(self.image.height());
        let center_x = center.0.round() as i64;
        let center_y = center.1.round() as i64;
        let reach = radius.ceil() as i64;
        // Offsets are limited to the canvas so huge radii cost no more than a
        // full-canvas fill.
        let dy_range = (-reach).max(0_i64.saturating_sub(center_y))
            ..=reach.min((height - 1).saturating_sub(center_y));
        let dx_range = (-reach).max(0_i64.saturating_sub(center_x))
            ..=reach.min((width - 1).saturating_sub(center_x));
        let pixel = image::Rgba::from(color);
        for dy in dy_range {
            for dx in dx_range.clone() {
                let dist = ((dx as f32).powi(2) + (dy as f32).powi(2)).sqrt();
                if dist <= radius {
                    self.image
                        .put_pixel((center_x + dx) as u32, (center_y + dy) as u32, pixel);
                }
            }
        }
    }

    fn fill_square(&mut self, center: CanvasPoint, size: f32, color: Color) {
        if !center.0.is_finite() || !center.1.is_finite() {
            return;
        }
        let (x0, y0, x1, y1) = square_bounds(center, size);
        self.fill_span(x0, y0, x1, y1, color);
    }

    fn stroke_square(&mut self, center: CanvasPoint, size: f32, width: f32, color: Color) {
        if !center.0.is_finite() || !center.1.is_finite() || width <= 0.0 {
            return;
        }
        let (x0, y0, x1, y1) = square_bounds(center, size);
        let w = (width.round() as i64).max(1);
        self.fill_span(x0, y0, x1, (y0 + w).min(y1), color);
        self.fill_span(x0, (y1 - w).max(y0), x1, y1, color);
        self.fill_span(x0, y0, (x0 + w).min(x1), y1, color);
        self.fill_span((x1 - w).max(x0), y0, x1, y1, color);
    }
}

/// A single call recorded by [`DrawLog`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Color),
    Disc {
        center: CanvasPoint,
        radius: f32,
        color: Color,
    },
    FillSquare {
        center: CanvasPoint,
        size: f32,
        color: Color,
    },
    StrokeSquare {
        center: CanvasPoint,
        size: f32,
        width: f32,
        color: Color,
    },
}

/// Surface that records draw calls instead of rasterizing them. Used to assert
/// layering order without comparing pixels.
#[derive(Debug, Clone, Default)]
pub struct DrawLog {
    ops: Vec<DrawOp>,
}

impl DrawLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Fill colors of every recorded disc, in draw order.
    pub fn disc_colors(&self) -> Vec<Color> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Disc { color, .. } => Some(*color),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Surface for DrawLog {
    fn clear(&mut self, color: Color) {
        self.ops.push(DrawOp::Clear(color));
    }

    fn fill_disc(&mut self, center: CanvasPoint, radius: f32, color: Color) {
        self.ops.push(DrawOp::Disc {
            center,
            radius,
            color,
        });
    }

    fn fill_square(&mut self, center: CanvasPoint, size: f32, color: Color) {
        self.ops.push(DrawOp::FillSquare {
            center,
            size,
            color,
        });
    }

    fn stroke_square(&mut self, center: CanvasPoint, size: f32, width: f32, color: Color) {
        self.ops.push(DrawOp::StrokeSquare {
            center,
            size,
            width,
            color,
        });
    }
}
