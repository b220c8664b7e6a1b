/**
 * Diffusion Kernel
 *
 * The 5×5 weighting matrix used to spread a resolved pixel's quantization
 * error over its neighbourhood. It is the discrete Gaussian response to a
 * unit impulse, with the center tap removed so a pixel never diffuses into
 * itself, rescaled so the remaining weights sum to one.
 *
 * The kernel takes no runtime input: every run builds the same weights, bit
 * for bit.
 */

/// Side length of the diffusion kernel
pub const KERNEL_SIZE: usize = 5;

/// Distance from the kernel center to its edge
pub const KERNEL_RADIUS: usize = KERNEL_SIZE / 2;

/// Standard deviation of the smoothing Gaussian
const SIGMA: f64 = 1.0;

/// Gaussian taps are truncated at this many standard deviations
const TRUNCATE: f64 = 4.0;

/// Normalized error-diffusion weights
#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionKernel {
    weights: [[f64; KERNEL_SIZE]; KERNEL_SIZE],
}

impl DiffusionKernel {
    /// Build the kernel
    pub fn new() -> Self {
        let mut impulse = [[0.0; KERNEL_SIZE]; KERNEL_SIZE];
        impulse[KERNEL_RADIUS][KERNEL_RADIUS] = 1.0;

        let mut weights = gaussian_blur_nearest(&impulse, SIGMA);
        weights[KERNEL_RADIUS][KERNEL_RADIUS] = 0.0;

        let sum: f64 = weights.iter().flatten().sum();
        for weight in weights.iter_mut().flatten() {
            *weight /= sum;
        }

        Self { weights }
    }

    /// Weight at kernel position (`row`, `col`), both in `0..KERNEL_SIZE`
    #[inline]
    pub fn weight(&self, row: usize, col: usize) -> f64 {
        self.weights[row][col]
    }

    /// All weights, row-major
    pub fn weights(&self) -> &[[f64; KERNEL_SIZE]; KERNEL_SIZE] {
        &self.weights
    }
}

impl Default for DiffusionKernel {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * Gaussian blur of a kernel-sized grid
 *
 * Out-of-range samples take the value of the nearest edge cell. Each output
 * cell is the weighted sum of its neighbours divided by the sum of the
 * weights used.
 */
fn gaussian_blur_nearest(
    data: &[[f64; KERNEL_SIZE]; KERNEL_SIZE],
    sigma: f64,
) -> [[f64; KERNEL_SIZE]; KERNEL_SIZE] {
    let mut blurred = [[0.0; KERNEL_SIZE]; KERNEL_SIZE];
    let radius = (TRUNCATE * sigma + 0.5) as i32;
    let divisor = 2.0 * sigma * sigma;
    let last = KERNEL_SIZE as i32 - 1;

    for (y, out_row) in blurred.iter_mut().enumerate() {
        for (x, out) in out_row.iter_mut().enumerate() {
            let mut sum = 0.0;
            let mut weight_sum = 0.0;

            for ky in -radius..=radius {
                for kx in -radius..=radius {
                    // Clamp coordinates (nearest edge)
                    let py = (y as i32 + ky).clamp(0, last) as usize;
                    let px = (x as i32 + kx).clamp(0, last) as usize;

                    let dist_sq = (kx * kx + ky * ky) as f64;
                    let weight = (-dist_sq / divisor).exp();

                    sum += data[py][px] * weight;
                    weight_sum += weight;
                }
            }

            *out = sum / weight_sum;
        }
    }

    blurred
}
