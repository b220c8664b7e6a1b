//! Greedy Dither
//!
//! Error-diffusion dithering of grayscale images to pure black and white,
//! resolving pixels in order of decreasing error rather than in raster order.
//!
//! # Features
//!
//! - Greedy selection: the pixel with the largest remaining quantization
//!   error is always resolved next
//! - Symmetric 5×5 Gaussian diffusion kernel, so error spreads in every
//!   direction instead of only forward
//! - Priority queue with lazy invalidation, avoiding a full rescan per pixel
//! - Fully deterministic output, including on inputs with tied errors
//! - Perceptual input: images are converted to CIE L* before dithering
//!
//! # Quick Start
//!
//! ## Dithering a File
//!
//! ```no_run
//! use greedy_dither::{dither_file, DitherOptions};
//!
//! let options = DitherOptions {
//!     size: Some(200),
//!     ..Default::default()
//! };
//!
//! dither_file("input.jpg", "output.png", &options).unwrap();
//! ```
//!
//! ## Dithering in Memory
//!
//! ```
//! use greedy_dither::{dither, LightnessImage};
//!
//! let input = LightnessImage::new(2, 2, vec![0.9, 0.1, 0.1, 0.9]);
//! let output = dither(&input).unwrap();
//!
//! assert_eq!(output.data, vec![255, 0, 0, 255]);
//! ```
//!
//! # Algorithm
//!
//! Every pixel starts with a residual of `lightness - 0.5`. Until no pixel is
//! left:
//!
//! 1. Take the unresolved pixel whose residual has the largest magnitude
//! 2. Make it white if the residual is positive, black otherwise
//! 3. Spread the quantization error over the unresolved pixels of its 5×5
//!    neighbourhood, weighted by the diffusion kernel
//!
//! The image is surrounded by a two-pixel padding ring; error diffused onto
//! it is lost. Ties between equal residuals are broken by sign (negative
//! first) and then by row-major position.
//!
//! # Performance
//!
//! Each pixel resolution touches a constant-size window, and the selection
//! queue grows by at most 25 entries per pixel, so a run is
//! O(n log n) in the pixel count.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Greedy dithering engine
pub mod engine;
/// Residual and output fields
pub mod field;
/// Image file loading, resizing and saving
pub mod image_io;
/// Error diffusion kernel
pub mod kernel;
/// Lightness images and color conversion
pub mod lightness;
/// Candidate selection strategies
pub mod queue;

// Re-export main types for convenience
pub use engine::{
    dither, dither_with_config, validate_input, BinaryImage, DitherConfig, DitherEngine,
    DitherError, EngineState, FailureKind,
};
pub use field::{Candidate, Cell, Level, OutputField, ResidualField, Sign, Window};
pub use image_io::{
    dither_file, load_lightness, resize_lightness, save_binary, target_dimensions,
    DitherOptions, ImageIoError,
};
pub use kernel::DiffusionKernel;
pub use lightness::LightnessImage;
pub use queue::{FullScan, SelectionQueue, Selector};

/// Resampling filters accepted by [`DitherOptions`]
pub use image::imageops::FilterType;
