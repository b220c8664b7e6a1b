/**
 * Image Files
 *
 * Decoding a raster file into a lightness image, proportional resizing, and
 * encoding the dithered result. Every failure names the file involved. The
 * dithering core only ever sees a fully decoded, validated image.
 */

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{GrayImage, ImageBuffer, Luma};
use log::debug;
use thiserror::Error;

use crate::engine::{dither_with_config, BinaryImage, DitherConfig, DitherError};
use crate::lightness::LightnessImage;

/// Error types for image file handling
#[derive(Error, Debug)]
pub enum ImageIoError {
    /// Failed to open or decode an input image
    #[error("Failed to load image {path}: {source}")]
    Load {
        /// Input path
        path: PathBuf,
        /// Underlying decoder error
        #[source]
        source: image::ImageError,
    },

    /// Failed to encode or write an output image
    #[error("Failed to save image {path}: {source}")]
    Save {
        /// Output path
        path: PathBuf,
        /// Underlying encoder error
        #[source]
        source: image::ImageError,
    },

    /// Requested resize target is zero
    #[error("Resize target must be positive")]
    InvalidSize,

    /// Dimensions do not fit the image encoder
    #[error("Image dimensions {width}×{height} are too large")]
    TooLarge {
        /// Width in pixels
        width: usize,
        /// Height in pixels
        height: usize,
    },

    /// Dithering failed
    #[error(transparent)]
    Dither(#[from] DitherError),
}

/// Result type for image file operations
pub type Result<T> = std::result::Result<T, ImageIoError>;

/// Options for dithering an image file
#[derive(Debug, Clone)]
pub struct DitherOptions {
    /// Resize so the largest dimension has this many pixels
    pub size: Option<u32>,
    /// Resampling filter used when resizing
    pub filter: FilterType,
    /// Dithering configuration
    pub config: DitherConfig,
}

impl Default for DitherOptions {
    fn default() -> Self {
        Self {
            size: None,
            filter: FilterType::Triangle,
            config: DitherConfig::default(),
        }
    }
}

/// Load an image file as lightness values in [0, 1]
pub fn load_lightness<P: AsRef<Path>>(path: P) -> Result<LightnessImage> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| ImageIoError::Load {
        path: path.to_path_buf(),
        source,
    })?;

    let rgb = img.to_rgb8();
    debug!(
        "loaded {} ({}×{})",
        path.display(),
        rgb.width(),
        rgb.height()
    );

    Ok(LightnessImage::from_rgb8(&rgb))
}

/**
 * Dimensions after scaling the largest side to `size`, preserving aspect ratio
 *
 * Exact halves round to even, so 50.5 becomes 50.
 */
pub fn target_dimensions(width: usize, height: usize, size: u32) -> (u32, u32) {
    let largest = width.max(height).max(1) as f64;
    let scale = |dim: usize| {
        ((size as f64 * dim as f64 / largest).round_ties_even() as u32).max(1)
    };
    (scale(width), scale(height))
}

/**
 * Resize proportionally so the largest dimension is `size`
 *
 * The `image` resampler works in single precision, so samples pass through
 * `f32` on the way and come back with about seven significant digits.
 * Resampled values are clamped back into [0, 1].
 */
pub fn resize_lightness(
    input: &LightnessImage,
    size: u32,
    filter: FilterType,
) -> Result<LightnessImage> {
    if size == 0 {
        return Err(ImageIoError::InvalidSize);
    }

    let too_large = || ImageIoError::TooLarge {
        width: input.width,
        height: input.height,
    };
    let width = u32::try_from(input.width).map_err(|_| too_large())?;
    let height = u32::try_from(input.height).map_err(|_| too_large())?;

    let samples: Vec<f32> = input.data.iter().map(|&v| v as f32).collect();
    let buffer: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_raw(width, height, samples).ok_or_else(too_large)?;

    let (new_width, new_height) = target_dimensions(input.width, input.height, size);
    let resized = image::imageops::resize(&buffer, new_width, new_height, filter);

    debug!(
        "resized {}×{} to {}×{}",
        width, height, new_width, new_height
    );

    Ok(LightnessImage {
        width: new_width as usize,
        height: new_height as usize,
        data: resized
            .into_raw()
            .into_iter()
            .map(|v| (v as f64).clamp(0.0, 1.0))
            .collect(),
    })
}

/// Encode a dithered image as 8-bit grayscale
pub fn save_binary<P: AsRef<Path>>(output: &BinaryImage, path: P) -> Result<()> {
    let path = path.as_ref();
    let too_large = || ImageIoError::TooLarge {
        width: output.width,
        height: output.height,
    };
    let width = u32::try_from(output.width).map_err(|_| too_large())?;
    let height = u32::try_from(output.height).map_err(|_| too_large())?;

    let img: GrayImage =
        ImageBuffer::from_raw(width, height, output.data.clone()).ok_or_else(too_large)?;

    img.save(path).map_err(|source| ImageIoError::Save {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("saved {}", path.display());

    Ok(())
}

/**
 * Load, optionally resize, dither and save an image file
 *
 * Returns the dithered image that was written.
 */
pub fn dither_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    output_path: Q,
    options: &DitherOptions,
) -> Result<BinaryImage> {
    let mut lightness = load_lightness(input_path)?;

    if let Some(size) = options.size {
        lightness = resize_lightness(&lightness, size, options.filter)?;
    }

    let dithered = dither_with_config(&lightness, options.config)?;
    save_binary(&dithered, output_path)?;

    Ok(dithered)
}
