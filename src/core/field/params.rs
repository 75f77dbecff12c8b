use num::Complex;

pub const DEFAULT_MAX_ITERATIONS: u64 = 1000;

/// Parameters of the `z = z^exponent + c` recurrence.
///
/// Exactly one of `starting_z` / `starting_c` is held fixed per pixel:
/// in Mandelbrot mode the pixel supplies `c` and iteration starts from
/// `starting_z`; in Julia mode the pixel supplies the starting `z` and
/// `c` stays at `starting_c`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RecurrenceParams {
    pub exponent: Complex<f64>,
    pub starting_z: Complex<f64>,
    pub starting_c: Complex<f64>,
    pub julia: bool,
    pub max_iterations: u64,
}

impl Default for RecurrenceParams {
    fn default() -> Self {
        Self {
            exponent: Complex::new(2.0, 0.0),
            starting_z: Complex::new(0.0, 0.0),
            starting_c: Complex::new(-0.63, 0.34),
            julia: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl RecurrenceParams {
    /// Splits a pixel's complex coordinate into the `(z0, c)` pair for
    /// the current mode.
    #[must_use]
    pub fn seed(&self, point: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
        if self.julia {
            (point, self.starting_c)
        } else {
            (self.starting_z, point)
        }
    }
}
