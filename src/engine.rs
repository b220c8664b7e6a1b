/**
 * Greedy Error-Diffusion Engine
 *
 * Repeatedly resolves the unresolved pixel with the largest residual:
 *
 * 1. Pop the best candidate from the selector
 * 2. Quantize it to black or white according to the sign of its residual
 * 3. Invalidate the 5×5 window around it
 * 4. Diffuse the quantization error over the window with the kernel
 * 5. Refresh the window in the selector
 *
 * until every pixel has been resolved. Each iteration depends on all the
 * previous ones, so a run is strictly sequential; independent images can be
 * dithered on separate engines in parallel.
 */

use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use thiserror::Error;

use crate::field::{Level, OutputField, ResidualField, Sign, Window, BORDER};
use crate::kernel::DiffusionKernel;
use crate::lightness::LightnessImage;
use crate::queue::{SelectionQueue, Selector};

/// Configuration for a dithering run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DitherConfig {
    /// Output byte for black pixels
    pub black: u8,
    /// Output byte for white pixels
    pub white: u8,
    /// Show a progress bar
    pub verbose: bool,
}

impl Default for DitherConfig {
    fn default() -> Self {
        Self {
            black: 0,
            white: 255,
            verbose: false,
        }
    }
}

/// Fatal bookkeeping failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The selector ran dry before every pixel was resolved
    QueueExhausted,
    /// The selector returned a pixel that was not unresolved
    StaleSelection,
    /// The loop finished with unassigned output pixels
    IncompleteOutput,
}

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Pixels remain to be resolved
    Running,
    /// Every pixel has been resolved and assigned
    Done,
    /// The run hit an internal inconsistency
    Failed(FailureKind),
}

/// Error types for dithering
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DitherError {
    /// The lightness image cannot be dithered
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Selection ran dry before every pixel was resolved
    #[error("Selection queue exhausted after resolving {resolved} of {total} pixels")]
    QueueExhausted {
        /// Pixels resolved before the queue emptied
        resolved: usize,
        /// Pixels in the image
        total: usize,
    },

    /// Selection produced a pixel that was already resolved
    #[error("Selection returned already-resolved pixel at row {row}, column {col}")]
    StaleSelection {
        /// Interior row
        row: usize,
        /// Interior column
        col: usize,
    },

    /// The loop finished but some output pixels were never assigned
    #[error("Dithering finished with {unset} unassigned pixels")]
    IncompleteOutput {
        /// Number of unassigned pixels
        unset: usize,
    },
}

/// Result type for dithering operations
pub type Result<T> = std::result::Result<T, DitherError>;

/// A dithered image: one of two byte values per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage {
    /// Row-major pixel bytes
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
}

impl BinaryImage {
    /// Byte at (`x`, `y`)
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }
}

/**
 * Check that an image can be dithered
 *
 * Rejects empty dimensions, a buffer that does not match them, and values
 * that are not finite or fall outside [0, 1].
 */
pub fn validate_input(input: &LightnessImage) -> Result<()> {
    if input.width == 0 || input.height == 0 {
        return Err(DitherError::InvalidInput(format!(
            "image is empty ({}×{})",
            input.width, input.height
        )));
    }

    let expected = input.width.checked_mul(input.height).ok_or_else(|| {
        DitherError::InvalidInput(format!(
            "dimensions {}×{} overflow",
            input.width, input.height
        ))
    })?;
    if input.data.len() != expected {
        return Err(DitherError::InvalidInput(format!(
            "expected {} values for {}×{}, got {}",
            expected,
            input.width,
            input.height,
            input.data.len()
        )));
    }

    if let Some((idx, value)) = input
        .data
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0 || **v > 1.0)
    {
        return Err(DitherError::InvalidInput(format!(
            "value {} at row {}, column {} is not in [0, 1]",
            value,
            idx / input.width,
            idx % input.width
        )));
    }

    Ok(())
}

/**
 * One dithering run
 *
 * The engine owns its fields and selector; it is consumed by `run` and
 * cannot be reused for another image.
 */
pub struct DitherEngine<S: Selector = SelectionQueue> {
    config: DitherConfig,
    width: usize,
    height: usize,
    field: ResidualField,
    output: OutputField,
    kernel: DiffusionKernel,
    selector: S,
    state: EngineState,
    failure: Option<DitherError>,
    resolved: usize,
    progress: Option<ProgressBar>,
}

impl DitherEngine<SelectionQueue> {
    /// Set up a run using the lazy-invalidation queue
    pub fn new(input: &LightnessImage, config: DitherConfig) -> Result<Self> {
        Self::with_selector(input, config, SelectionQueue::new())
    }
}

impl<S: Selector> DitherEngine<S> {
    /// Set up a run using `selector` to pick pixels
    pub fn with_selector(input: &LightnessImage, config: DitherConfig, mut selector: S) -> Result<Self> {
        if config.black == config.white {
            return Err(DitherError::InvalidConfig(format!(
                "black and white levels are both {}",
                config.black
            )));
        }
        validate_input(input)?;

        let field = ResidualField::from_lightness(&input.data, input.width, input.height);
        let output = OutputField::new(field.width(), field.height());
        let kernel = DiffusionKernel::new();
        selector.seed(&field);

        let total = input.width * input.height;
        let progress = if config.verbose {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-"),
            );
            pb.set_message("Resolving pixels");
            Some(pb)
        } else {
            None
        };

        debug!(
            "dithering {}×{} image ({} pixels)",
            input.width, input.height, total
        );

        Ok(Self {
            config,
            width: input.width,
            height: input.height,
            field,
            output,
            kernel,
            selector,
            state: EngineState::Running,
            failure: None,
            resolved: 0,
            progress,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Pixels resolved so far
    pub fn resolved(&self) -> usize {
        self.resolved
    }

    /// Pixels in the image
    pub fn total(&self) -> usize {
        self.width * self.height
    }

    /// Residual field as it currently stands
    pub fn field(&self) -> &ResidualField {
        &self.field
    }

    /// Selector driving the run
    pub fn selector(&self) -> &S {
        &self.selector
    }

    /**
     * Resolve one pixel
     *
     * Returns `Ok(true)` if a pixel was resolved and `Ok(false)` once the run
     * is done. Failures move the engine to `Failed` and are returned again by
     * every later call.
     */
    pub fn step(&mut self) -> Result<bool> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        if self.state == EngineState::Done {
            return Ok(false);
        }

        let Some(candidate) = self.selector.pop(&self.field) else {
            return self.finish();
        };
        let (row, col) = (candidate.row, candidate.col);

        let Some(value) = self.field.resolve(row, col) else {
            return Err(self.stale(row, col));
        };

        let sign = Sign::of(value);
        if !self.output.assign(row, col, Level::from_sign(sign)) {
            return Err(self.stale(row, col));
        }
        let error = value - sign.as_f64() * 0.5;

        let window = Window::centered(row, col);
        self.selector.invalidate(&self.field, window);
        self.field.diffuse(row, col, error, &self.kernel);
        self.selector.refresh(&self.field, window);

        self.resolved += 1;
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }

        Ok(true)
    }

    /// Resolve every pixel and return the dithered image
    pub fn run(mut self) -> Result<BinaryImage> {
        while self.step()? {}

        let data = self
            .output
            .to_bytes(self.config.black, self.config.white)
            .ok_or_else(|| DitherError::IncompleteOutput {
                unset: self.output.unset_count(),
            })?;

        Ok(BinaryImage {
            data,
            width: self.width,
            height: self.height,
        })
    }

    fn finish(&mut self) -> Result<bool> {
        if self.resolved < self.total() {
            let error = DitherError::QueueExhausted {
                resolved: self.resolved,
                total: self.total(),
            };
            return Err(self.fail(FailureKind::QueueExhausted, error));
        }

        let unset = self.output.unset_count();
        if unset > 0 {
            let error = DitherError::IncompleteOutput { unset };
            return Err(self.fail(FailureKind::IncompleteOutput, error));
        }

        self.state = EngineState::Done;
        if let Some(pb) = &self.progress {
            pb.finish_with_message("Dithering complete");
        }
        debug!(
            "resolved {} pixels, {:.4} error lost at the border",
            self.resolved,
            self.field.discarded()
        );

        Ok(false)
    }

    fn stale(&mut self, row: usize, col: usize) -> DitherError {
        let error = DitherError::StaleSelection {
            row: row.saturating_sub(BORDER),
            col: col.saturating_sub(BORDER),
        };
        self.fail(FailureKind::StaleSelection, error)
    }

    fn fail(&mut self, kind: FailureKind, error: DitherError) -> DitherError {
        self.state = EngineState::Failed(kind);
        self.failure = Some(error.clone());

        if let Some(pb) = &self.progress {
            pb.abandon_with_message("Dithering failed");
        }
        error
    }
}

/// Dither `input` with the default configuration
pub fn dither(input: &LightnessImage) -> Result<BinaryImage> {
    dither_with_config(input, DitherConfig::default())
}

/// Dither `input` with `config`
pub fn dither_with_config(input: &LightnessImage, config: DitherConfig) -> Result<BinaryImage> {
    DitherEngine::new(input, config)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::FullScan;

    /// Selector that forgets everything after the first pop
    struct Forgetful {
        inner: SelectionQueue,
        popped: bool,
    }

    impl Selector for Forgetful {
        fn seed(&mut self, field: &ResidualField) {
            self.inner.seed(field);
        }

        fn pop(&mut self, field: &ResidualField) -> Option<crate::field::Candidate> {
            if self.popped {
                return None;
            }
            self.popped = true;
            self.inner.pop(field)
        }

        fn invalidate(&mut self, field: &ResidualField, window: Window) {
            self.inner.invalidate(field, window);
        }

        fn refresh(&mut self, field: &ResidualField, window: Window) {
            self.inner.refresh(field, window);
        }
    }

    /// Selector that keeps returning the same stale candidate
    struct Stuck {
        first: Option<crate::field::Candidate>,
    }

    impl Selector for Stuck {
        fn seed(&mut self, field: &ResidualField) {
            self.first = field.enumerate(field.whole()).min();
        }

        fn pop(&mut self, _field: &ResidualField) -> Option<crate::field::Candidate> {
            self.first
        }

        fn invalidate(&mut self, _field: &ResidualField, _window: Window) {}

        fn refresh(&mut self, _field: &ResidualField, _window: Window) {}
    }

    fn gradient(width: usize, height: usize) -> LightnessImage {
        LightnessImage::from_fn(width, height, |x, y| {
            (x + y) as f64 / (width + height - 2).max(1) as f64
        })
    }

    #[test]
    fn test_config_default() {
        let config = DitherConfig::default();
        assert_eq!(config.black, 0);
        assert_eq!(config.white, 255);
        assert!(!config.verbose);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DitherConfig {
            black: 7,
            white: 7,
            ..Default::default()
        };
        let result = DitherEngine::new(&gradient(4, 4), config);
        assert!(matches!(result, Err(DitherError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_input() {
        assert!(validate_input(&gradient(3, 3)).is_ok());

        // Empty
        let empty = LightnessImage::new(0, 5, vec![]);
        assert!(matches!(validate_input(&empty), Err(DitherError::InvalidInput(_))));

        // Buffer length mismatch
        let short = LightnessImage::new(3, 3, vec![0.5; 8]);
        assert!(matches!(validate_input(&short), Err(DitherError::InvalidInput(_))));

        // NaN in the active region
        let mut nan = gradient(3, 3);
        nan.data[4] = f64::NAN;
        assert!(matches!(validate_input(&nan), Err(DitherError::InvalidInput(_))));

        // Out of range
        let mut bright = gradient(3, 3);
        bright.data[0] = 1.5;
        assert!(matches!(validate_input(&bright), Err(DitherError::InvalidInput(_))));
    }

    #[test]
    fn test_step_state_machine() {
        let mut engine = DitherEngine::new(&gradient(3, 2), DitherConfig::default()).unwrap();
        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(engine.total(), 6);

        let mut steps = 0;
        while engine.step().unwrap() {
            steps += 1;
            assert_eq!(engine.resolved(), steps);
        }

        assert_eq!(steps, 6);
        assert_eq!(engine.state(), EngineState::Done);
        assert_eq!(engine.field().unresolved_count(), 0);
        assert!(!engine.step().unwrap());
    }

    #[test]
    fn test_queue_exhausted() {
        let selector = Forgetful {
            inner: SelectionQueue::new(),
            popped: false,
        };
        let mut engine =
            DitherEngine::with_selector(&gradient(3, 3), DitherConfig::default(), selector)
                .unwrap();

        assert!(engine.step().unwrap());
        let err = engine.step().unwrap_err();
        assert_eq!(err, DitherError::QueueExhausted { resolved: 1, total: 9 });
        assert_eq!(
            engine.state(),
            EngineState::Failed(FailureKind::QueueExhausted)
        );

        // Failure is sticky
        assert!(engine.step().is_err());
    }

    #[test]
    fn test_stale_selection() {
        let mut engine =
            DitherEngine::with_selector(&gradient(2, 2), DitherConfig::default(), Stuck { first: None })
                .unwrap();

        assert!(engine.step().unwrap());
        let err = engine.step().unwrap_err();
        assert!(matches!(err, DitherError::StaleSelection { .. }));
        assert_eq!(
            engine.state(),
            EngineState::Failed(FailureKind::StaleSelection)
        );
    }

    #[test]
    fn test_run_with_full_scan_matches_queue() {
        let input = gradient(9, 7);
        let queued = DitherEngine::new(&input, DitherConfig::default())
            .unwrap()
            .run()
            .unwrap();
        let scanned = DitherEngine::with_selector(&input, DitherConfig::default(), FullScan::new())
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(queued, scanned);
    }

    #[test]
    fn test_custom_levels() {
        let config = DitherConfig {
            black: 10,
            white: 200,
            verbose: false,
        };
        let result = dither_with_config(&gradient(6, 6), config).unwrap();
        assert!(result.data.iter().all(|&b| b == 10 || b == 200));
        assert!(result.data.contains(&10));
        assert!(result.data.contains(&200));
    }

    #[test]
    fn test_zero_residual_quantizes_to_black() {
        let input = LightnessImage::new(1, 1, vec![0.5]);
        let result = dither(&input).unwrap();
        assert_eq!(result.data, vec![0]);
    }

    #[test]
    fn test_flat_field_keeps_mean() {
        let input = LightnessImage::new(20, 20, vec![0.25; 400]);
        let result = dither(&input).unwrap();
        let white = result.data.iter().filter(|&&b| b == 255).count();
        // Error lost into the padding pulls this somewhat below a quarter
        assert!((40..=110).contains(&white), "white pixels: {}", white);
    }
}
