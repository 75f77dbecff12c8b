//! The fractal field: view/recurrence state, dirty gating, and the
//! RGBA framebuffer it renders into.

pub mod params;
pub mod recurrence;

use std::error::Error;
use std::fmt;
use std::time::Instant;

use log::debug;
use num::Complex;
use rayon::prelude::*;

use crate::core::data::viewport::{ViewBounds, ViewportState};
use crate::core::field::params::RecurrenceParams;
use crate::core::field::recurrence::escape_iterations;
use crate::core::palette::PaletteMode;

const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldError {
    ZeroDimensions { width: u32, height: u32 },
    ZeroMaxIterations,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDimensions { width, height } => {
                write!(f, "field dimensions must be non-zero: {}x{}", width, height)
            }
            Self::ZeroMaxIterations => {
                write!(f, "maximum iterations must be greater than zero")
            }
        }
    }
}

impl Error for FieldError {}

/// Owns everything that determines a rendered frame and the frame itself.
///
/// Callers drive the field from a single place: mutate parameters between
/// frames, then call [`update`](Self::update) once per frame and read the
/// framebuffer. Every mutator and `update` take `&mut self`, so parameter
/// changes can never race an in-flight recomputation.
///
/// Mutators skip the dirty flag when handed the value already held; UIs
/// re-issue their whole parameter set every frame, and an unchanged frame
/// must not trigger a full recomputation.
#[derive(Debug)]
pub struct FractalField {
    width: u32,
    height: u32,
    framebuffer: Vec<u8>,
    viewport: ViewportState,
    params: RecurrenceParams,
    palette: PaletteMode,
    needs_update: bool,
    completed_generation: u64,
}

impl FractalField {
    pub fn new(width: u32, height: u32) -> Result<Self, FieldError> {
        if width == 0 || height == 0 {
            return Err(FieldError::ZeroDimensions { width, height });
        }

        Ok(Self {
            width,
            height,
            framebuffer: vec![0; buffer_len(width, height)],
            viewport: ViewportState::default(),
            params: RecurrenceParams::default(),
            palette: PaletteMode::default(),
            needs_update: true,
            completed_generation: 0,
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The last fully rendered frame, row-major RGBA.
    #[must_use]
    pub fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.viewport.scale
    }

    #[must_use]
    pub fn center(&self) -> Complex<f64> {
        self.viewport.center
    }

    #[must_use]
    pub fn exponent(&self) -> Complex<f64> {
        self.params.exponent
    }

    #[must_use]
    pub fn starting_z(&self) -> Complex<f64> {
        self.params.starting_z
    }

    #[must_use]
    pub fn starting_c(&self) -> Complex<f64> {
        self.params.starting_c
    }

    #[must_use]
    pub fn is_julia(&self) -> bool {
        self.params.julia
    }

    #[must_use]
    pub fn max_iterations(&self) -> u64 {
        self.params.max_iterations
    }

    #[must_use]
    pub fn palette(&self) -> PaletteMode {
        self.palette
    }

    /// Whether the next [`update`](Self::update) will recompute.
    #[must_use]
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Counts completed recomputations; unchanged by no-op updates.
    #[must_use]
    pub fn completed_generation(&self) -> u64 {
        self.completed_generation
    }

    pub fn set_center(&mut self, center: Complex<f64>) {
        if center == self.viewport.center {
            return;
        }
        self.viewport.center = center;
        self.needs_update = true;
    }

    pub fn set_scale(&mut self, scale: f64) {
        if scale == self.viewport.scale {
            return;
        }
        self.viewport.scale = scale;
        self.needs_update = true;
    }

    /// Multiplies the zoom factor, clamped so the view never zooms out
    /// past the base bounds. Zooming in is unbounded (and degrades past
    /// f64 precision rather than erroring).
    pub fn zoom_by(&mut self, factor: f64) {
        let scaled = self.viewport.zoomed(factor);
        if scaled == self.viewport.scale {
            return;
        }
        self.viewport.scale = scaled;
        self.needs_update = true;
    }

    pub fn set_exponent(&mut self, exponent: Complex<f64>) {
        if exponent == self.params.exponent {
            return;
        }
        self.params.exponent = exponent;
        self.needs_update = true;
    }

    pub fn set_starting_z(&mut self, z: Complex<f64>) {
        if z == self.params.starting_z {
            return;
        }
        self.params.starting_z = z;
        self.needs_update = true;
    }

    pub fn set_starting_c(&mut self, c: Complex<f64>) {
        if c == self.params.starting_c {
            return;
        }
        self.params.starting_c = c;
        self.needs_update = true;
    }

    pub fn set_julia(&mut self, julia: bool) {
        if julia == self.params.julia {
            return;
        }
        self.params.julia = julia;
        self.needs_update = true;
    }

    pub fn set_max_iterations(&mut self, max_iterations: u64) -> Result<(), FieldError> {
        if max_iterations == 0 {
            return Err(FieldError::ZeroMaxIterations);
        }
        if max_iterations == self.params.max_iterations {
            return Ok(());
        }
        self.params.max_iterations = max_iterations;
        self.needs_update = true;
        Ok(())
    }

    pub fn set_palette(&mut self, palette: PaletteMode) {
        if palette == self.palette {
            return;
        }
        self.palette = palette;
        self.needs_update = true;
    }

    /// Restores view and recurrence parameters to construction-time
    /// defaults in one step.
    pub fn reset(&mut self) {
        let viewport = ViewportState::default();
        let params = RecurrenceParams::default();
        if viewport == self.viewport && params == self.params {
            return;
        }
        self.viewport = viewport;
        self.params = params;
        self.needs_update = true;
    }

    /// Reallocates the framebuffer for a new window size. A no-op when
    /// the dimensions are unchanged.
    pub fn relayout(&mut self, width: u32, height: u32) -> Result<(), FieldError> {
        if width == 0 || height == 0 {
            return Err(FieldError::ZeroDimensions { width, height });
        }
        if width == self.width && height == self.height {
            return Ok(());
        }
        self.width = width;
        self.height = height;
        self.framebuffer = vec![0; buffer_len(width, height)];
        self.needs_update = true;
        Ok(())
    }

    #[must_use]
    pub fn viewport_bounds(&self) -> ViewBounds {
        self.viewport.bounds()
    }

    /// Maps a pixel coordinate in `[0, width) x [0, height)` onto the
    /// visible rectangle of the complex plane.
    #[must_use]
    pub fn screen_to_complex(&self, x: f64, y: f64) -> Complex<f64> {
        complex_at(self.viewport.bounds(), self.width, self.height, x, y)
    }

    /// Inverse of [`screen_to_complex`](Self::screen_to_complex); lets
    /// callers keep the complex point under the cursor stationary while
    /// zooming.
    #[must_use]
    pub fn complex_to_screen(&self, point: Complex<f64>) -> (f64, f64) {
        let bounds = self.viewport.bounds();
        let x = (point.re - bounds.min_re) / bounds.width() * f64::from(self.width);
        let y = (point.im - bounds.min_im) / bounds.height() * f64::from(self.height);

        (x, y)
    }

    /// Recomputes every pixel if any colour-affecting parameter changed
    /// since the last completed pass, otherwise returns immediately.
    ///
    /// Rows are rendered in parallel into disjoint framebuffer slices;
    /// the join before returning guarantees the buffer always holds one
    /// consistent parameter generation.
    pub fn update(&mut self) {
        if !self.needs_update {
            return;
        }
        self.needs_update = false;

        let started = Instant::now();
        let bounds = self.viewport.bounds();
        let width = self.width;
        let height = self.height;
        let params = self.params;
        let palette = self.palette;

        let row_bytes = width as usize * BYTES_PER_PIXEL;
        self.framebuffer
            .par_chunks_exact_mut(row_bytes)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, slot) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                    let point = complex_at(bounds, width, height, x as f64, y as f64);
                    let (z0, c) = params.seed(point);
                    let n = escape_iterations(z0, c, params.exponent, params.max_iterations);
                    slot.copy_from_slice(&palette.colour(n, params.max_iterations).to_bytes());
                }
            });

        self.completed_generation += 1;
        debug!(
            "recomputed {}x{} field, generation {} in {:?}",
            width,
            height,
            self.completed_generation,
            started.elapsed()
        );
    }
}

fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * BYTES_PER_PIXEL
}

fn complex_at(bounds: ViewBounds, width: u32, height: u32, x: f64, y: f64) -> Complex<f64> {
    let fx = x / f64::from(width);
    let fy = y / f64::from(height);
    let re = fx * bounds.max_re + (1.0 - fx) * bounds.min_re;
    let im = fy * bounds.max_im + (1.0 - fy) * bounds.min_im;

    Complex::new(re, im)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(field: &FractalField, x: u32, y: u32) -> [u8; 4] {
        let i = (y * field.width() + x) as usize * BYTES_PER_PIXEL;
        field.framebuffer()[i..i + 4].try_into().unwrap()
    }

    #[test]
    fn test_new_rejects_zero_dimensions() {
        let err = FractalField::new(0, 10).unwrap_err();

        assert_eq!(
            err,
            FieldError::ZeroDimensions {
                width: 0,
                height: 10
            }
        );
    }

    #[test]
    fn test_framebuffer_length_matches_dimensions() {
        let field = FractalField::new(7, 5).unwrap();

        assert_eq!(field.framebuffer().len(), 7 * 5 * 4);
    }

    #[test]
    fn test_update_is_idempotent_until_mutated() {
        let mut field = FractalField::new(8, 8).unwrap();
        assert!(field.needs_update());

        field.update();
        assert!(!field.needs_update());
        assert_eq!(field.completed_generation(), 1);

        field.update();
        assert!(!field.needs_update());
        assert_eq!(field.completed_generation(), 1);
    }

    #[test]
    fn test_mutators_with_held_values_do_not_dirty() {
        let mut field = FractalField::new(8, 8).unwrap();
        field.update();

        field.set_center(field.center());
        field.set_scale(field.scale());
        field.set_exponent(field.exponent());
        field.set_starting_z(field.starting_z());
        field.set_starting_c(field.starting_c());
        field.set_julia(field.is_julia());
        field.set_max_iterations(field.max_iterations()).unwrap();
        field.set_palette(field.palette());
        field.relayout(field.width(), field.height()).unwrap();
        field.reset();

        assert!(!field.needs_update());
        field.update();
        assert_eq!(field.completed_generation(), 1);
    }

    #[test]
    fn test_each_mutation_dirties() {
        let mut field = FractalField::new(8, 8).unwrap();
        field.update();

        field.set_julia(true);
        assert!(field.needs_update());
        field.update();

        field.set_exponent(Complex::new(3.0, 0.0));
        assert!(field.needs_update());
        field.update();

        field.set_palette(PaletteMode::Rainbow);
        assert!(field.needs_update());
        field.update();

        assert_eq!(field.completed_generation(), 4);
    }

    #[test]
    fn test_zoom_out_past_base_bounds_is_a_noop() {
        let mut field = FractalField::new(8, 8).unwrap();
        field.update();

        field.zoom_by(2.0);

        assert_eq!(field.scale(), 1.0);
        assert!(!field.needs_update());
    }

    #[test]
    fn test_zoom_in_is_unclamped() {
        let mut field = FractalField::new(8, 8).unwrap();

        field.zoom_by(0.5);
        field.zoom_by(0.5);

        assert_eq!(field.scale(), 0.25);
    }

    #[test]
    fn test_set_max_iterations_rejects_zero() {
        let mut field = FractalField::new(8, 8).unwrap();
        field.update();

        assert_eq!(
            field.set_max_iterations(0),
            Err(FieldError::ZeroMaxIterations)
        );
        assert_eq!(field.max_iterations(), 1000);
        assert!(!field.needs_update());
    }

    #[test]
    fn test_relayout_reallocates_and_dirties() {
        let mut field = FractalField::new(8, 8).unwrap();
        field.update();

        field.relayout(16, 4).unwrap();

        assert_eq!(field.framebuffer().len(), 16 * 4 * 4);
        assert!(field.needs_update());
    }

    #[test]
    fn test_relayout_rejects_zero_dimensions() {
        let mut field = FractalField::new(8, 8).unwrap();

        assert!(field.relayout(8, 0).is_err());
        assert_eq!(field.height(), 8);
    }

    #[test]
    fn test_reset_restores_defaults_and_dirties() {
        let mut field = FractalField::new(8, 8).unwrap();
        field.zoom_by(0.25);
        field.set_center(Complex::new(0.5, 0.5));
        field.set_julia(true);
        field.update();

        field.reset();

        assert!(field.needs_update());
        assert_eq!(field.scale(), 1.0);
        assert_eq!(field.center(), Complex::new(0.0, 0.0));
        assert!(!field.is_julia());
    }

    #[test]
    fn test_screen_to_complex_corners_at_defaults() {
        let field = FractalField::new(4, 4).unwrap();

        assert_eq!(field.screen_to_complex(0.0, 0.0), Complex::new(-2.0, -1.0));
        assert_eq!(field.screen_to_complex(4.0, 4.0), Complex::new(1.0, 1.0));
    }

    #[test]
    fn test_transform_round_trip() {
        let mut field = FractalField::new(160, 120).unwrap();
        field.zoom_by(0.37);
        field.set_center(Complex::new(-0.74, 0.18));

        for y in 0..120 {
            for x in 0..160 {
                let point = field.screen_to_complex(f64::from(x), f64::from(y));
                let (sx, sy) = field.complex_to_screen(point);

                assert!((sx - f64::from(x)).abs() < 1.0, "x drifted: {} -> {}", x, sx);
                assert!((sy - f64::from(y)).abs() < 1.0, "y drifted: {} -> {}", y, sy);
            }
        }
    }

    #[test]
    fn test_zoom_to_cursor_keeps_point_stationary() {
        let mut field = FractalField::new(160, 120).unwrap();
        let (cx, cy) = (37.0, 23.0);
        let anchor = field.screen_to_complex(cx, cy);

        for _ in 0..20 {
            let desired = field.screen_to_complex(cx, cy);
            field.zoom_by(0.9);
            let after = field.screen_to_complex(cx, cy);
            field.set_center(field.center() + (desired - after));
        }

        let recovered = field.screen_to_complex(cx, cy);
        assert!((recovered - anchor).norm() < 1e-9);
    }

    #[test]
    fn test_default_four_by_four_scenario() {
        let mut field = FractalField::new(4, 4).unwrap();
        field.update();

        // (0,0) maps to -2-i, which escapes immediately: non-black gray.
        let corner = pixel(&field, 0, 0);
        assert_ne!(&corner[..3], &[0, 0, 0]);
        assert_eq!(corner[3], 255);

        // (2,2) maps to -0.5+0i, inside the main cardioid: black.
        assert_eq!(pixel(&field, 2, 2), [0, 0, 0, 255]);
    }

    #[test]
    fn test_pixel_on_origin_renders_black() {
        // Recenter so pixel (0,0) lands exactly on c = 0, which never
        // escapes under the default exponent.
        let mut field = FractalField::new(4, 4).unwrap();
        field.set_center(Complex::new(2.0, 1.0));
        field.update();

        assert_eq!(field.screen_to_complex(0.0, 0.0), Complex::new(0.0, 0.0));
        assert_eq!(pixel(&field, 0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn test_mode_switch_changes_the_frame() {
        let mut field = FractalField::new(16, 16).unwrap();
        field.update();
        let mandelbrot_frame = field.framebuffer().to_vec();

        field.set_julia(true);
        field.update();

        assert_ne!(field.framebuffer(), &mandelbrot_frame[..]);
    }

    #[test]
    fn test_update_survives_degenerate_exponent() {
        let mut field = FractalField::new(8, 8).unwrap();
        field.set_exponent(Complex::new(f64::NAN, f64::INFINITY));
        field.set_max_iterations(16).unwrap();

        field.update();

        assert_eq!(field.framebuffer().len(), 8 * 8 * 4);
    }
}
