/**
 * Lightness Images
 *
 * The dithering input: a row-major grid of CIE L* values scaled to [0, 1].
 * Conversion from sRGB goes through linear RGB and the Y component of
 * CIE XYZ (sRGB primaries, D65 white).
 */

use image::RgbImage;

// Second row of the sRGB -> XYZ matrix (D65)
const RGB_TO_Y: [f64; 3] = [0.212671, 0.715160, 0.072169];

// Lab threshold: (6/29)^3
const EPSILON: f64 = 0.008856;

// Lab linear segment slope
const KAPPA_INV: f64 = 7.787;

/// Grayscale image of lightness values in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct LightnessImage {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
    /// Row-major lightness values
    pub data: Vec<f64>,
}

impl LightnessImage {
    /// Wrap row-major `data` of the given dimensions
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Self {
        Self { width, height, data }
    }

    /// Build an image by evaluating `f(x, y)` for every pixel
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    /// Lightness of an 8-bit sRGB image
    pub fn from_rgb8(img: &RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let data = img
            .pixels()
            .map(|p| srgb8_to_lightness(p.0[0], p.0[1], p.0[2]))
            .collect();

        Self {
            width: width as usize,
            height: height as usize,
            data,
        }
    }

    /// Lightness at (`x`, `y`)
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }
}

/// Convert sRGB value (0-1) to linear RGB
#[inline]
fn srgb_to_linear(srgb: f64) -> f64 {
    if srgb <= 0.04045 {
        srgb / 12.92
    } else {
        ((srgb + 0.055) / 1.055).powf(2.4)
    }
}

/// Lab f(t) function
#[inline]
fn lab_f(t: f64) -> f64 {
    if t > EPSILON {
        t.cbrt()
    } else {
        KAPPA_INV * t + 16.0 / 116.0
    }
}

/**
 * CIE L* of an 8-bit sRGB pixel, scaled from 0-100 to 0-1
 *
 * Clamped to [0, 1], so a rounding excess above 1.0 is not carried into the
 * dithering input.
 */
pub fn srgb8_to_lightness(r: u8, g: u8, b: u8) -> f64 {
    let r = srgb_to_linear(r as f64 / 255.0);
    let g = srgb_to_linear(g as f64 / 255.0);
    let b = srgb_to_linear(b as f64 / 255.0);

    let y = RGB_TO_Y[0] * r + RGB_TO_Y[1] * g + RGB_TO_Y[2] * b;
    let l = 116.0 * lab_f(y) - 16.0;

    (l / 100.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_black_and_white_extremes() {
        assert!(srgb8_to_lightness(0, 0, 0).abs() < 1e-12);
        assert!((srgb8_to_lightness(255, 255, 255) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_lightness_never_leaves_unit_range() {
        for v in 0..=255u8 {
            for (r, g, b) in [(v, v, v), (v, 255, 255), (255, v, 255), (255, 255, v)] {
                let l = srgb8_to_lightness(r, g, b);
                assert!((0.0..=1.0).contains(&l), "({}, {}, {}) -> {}", r, g, b, l);
            }
        }
    }

    #[test]
    fn test_mid_gray() {
        // sRGB 119 is close to L* = 50
        let l = srgb8_to_lightness(119, 119, 119);
        assert!((l - 0.5).abs() < 0.01, "got {}", l);
    }

    #[test]
    fn test_green_is_lighter_than_blue() {
        assert!(srgb8_to_lightness(0, 255, 0) > srgb8_to_lightness(255, 0, 0));
        assert!(srgb8_to_lightness(255, 0, 0) > srgb8_to_lightness(0, 0, 255));
    }

    #[test]
    fn test_from_rgb8_layout() {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(2, 1, Rgb([255, 255, 255]));

        let lightness = LightnessImage::from_rgb8(&img);
        assert_eq!(lightness.width, 3);
        assert_eq!(lightness.height, 2);
        assert_eq!(lightness.data.len(), 6);
        assert!(lightness.get(2, 1) > 0.99);
        assert!(lightness.get(0, 0) < 1e-12);
    }

    #[test]
    fn test_from_fn_row_major() {
        let img = LightnessImage::from_fn(4, 3, |x, y| (y * 4 + x) as f64 / 12.0);
        assert_eq!(img.data[5], 5.0 / 12.0);
        assert_eq!(img.get(1, 1), 5.0 / 12.0);
    }
}
