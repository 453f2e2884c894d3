use clusterviz_core::Point;

use crate::{Color, Layout, Surface};

/// Draw one point as a filled disc at its projected canvas position.
pub fn render_point<S: Surface + ?Sized>(surface: &mut S, point: Point, color: Color, layout: &Layout) {
    surface.fill_disc(layout.to_canvas(point), layout.point_radius, color);
}

/// Draw a k-means centroid: a filled square with an outline so it stays
/// visible on top of same-colored cluster members.
pub fn render_centroid<S: Surface + ?Sized>(
    surface: &mut S,
    centroid: Point,
    color: Color,
    outline: Color,
    layout: &Layout,
) {
    let center = layout.to_canvas(centroid);
    surface.fill_square(center, layout.centroid_size, color);
    surface.stroke_square(center, layout.centroid_size, layout.centroid_outline, outline);
}
