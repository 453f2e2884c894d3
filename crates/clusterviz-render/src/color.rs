use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Convert from HSL. `hue` is in degrees and wraps; the other components
    /// are fractions in `[0, 1]`.
    pub fn from_hsla(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Self {
        let hue = hue.rem_euclid(360.0);
        let saturation = saturation.clamp(0.0, 1.0);
        let lightness = lightness.clamp(0.0, 1.0);

        let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let sector = hue / 60.0;
        let secondary = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
        let (r1, g1, b1) = match sector as u32 {
            0 => (chroma, secondary, 0.0),
            1 => (secondary, chroma, 0.0),
            2 => (0.0, chroma, secondary),
            3 => (0.0, secondary, chroma),
            4 => (secondary, 0.0, chroma),
            _ => (chroma, 0.0, secondary),
        };
        let m = lightness - chroma * 0.5;
        Self {
            r: unit_to_byte(r1 + m),
            g: unit_to_byte(g1 + m),
            b: unit_to_byte(b1 + m),
            a: unit_to_byte(alpha),
        }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Color> for image::Rgba<u8> {
    fn from(color: Color) -> Self {
        image::Rgba(color.to_array())
    }
}

fn unit_to_byte(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_hues_convert_exactly() {
        assert_eq!(Color::from_hsla(0.0, 1.0, 0.5, 1.0), Color::rgb(255, 0, 0));
        assert_eq!(Color::from_hsla(120.0, 1.0, 0.5, 1.0), Color::rgb(0, 255, 0));
        assert_eq!(Color::from_hsla(240.0, 1.0, 0.5, 1.0), Color::rgb(0, 0, 255));
        assert_eq!(Color::from_hsla(360.0, 1.0, 0.5, 1.0), Color::rgb(255, 0, 0));
    }

    #[test]
    fn secondary_hue_and_alpha() {
        let cyan = Color::from_hsla(180.0, 1.0, 0.5, 0.5);
        assert_eq!((cyan.r, cyan.g, cyan.b), (0, 255, 255));
        assert_eq!(cyan.a, 128);
    }
}
