//! Shared helpers for integration tests

#![allow(dead_code)]

use greedy_dither::LightnessImage;

/**
 * Mulberry32 seeded random number generator
 * Deterministic lightness fields without pulling in an RNG crate
 */
pub struct SeededRandom {
    seed: u32,
}

impl SeededRandom {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Next value in [0, 1)
    pub fn next(&mut self) -> f64 {
        self.seed = self.seed.wrapping_add(0x6D2B79F5);
        let mut t = self.seed ^ (self.seed >> 15);
        t = t.wrapping_mul(1 | self.seed);
        t ^= t.wrapping_add(t.wrapping_mul(t ^ (t >> 7)).wrapping_mul(61 | t));
        (t ^ (t >> 14)) as f64 / 4294967296.0
    }
}

/// Random lightness image
pub fn random_image(width: usize, height: usize, seed: u32) -> LightnessImage {
    let mut rng = SeededRandom::new(seed);
    LightnessImage::from_fn(width, height, |_, _| rng.next())
}

/// Radial gradient, bright in the middle
pub fn radial_image(width: usize, height: usize) -> LightnessImage {
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt().max(1.0);
    LightnessImage::from_fn(width, height, |x, y| {
        let dx = x as f64 - cx;
        let dy = y as f64 - cy;
        1.0 - (dx * dx + dy * dy).sqrt() / max_dist
    })
}

/// Render `data` as rows of '#' (white) and '.' (black)
pub fn render(data: &[u8], width: usize) -> Vec<String> {
    data.chunks(width)
        .map(|row| row.iter().map(|&b| if b == 255 { '#' } else { '.' }).collect())
        .collect()
}
