use num::Complex;

// Base bounds of the fully zoomed-out view. The visible rectangle is
// always these bounds scaled by `scale` and translated by `center`.
pub const BOUND_MIN_RE: f64 = -2.0;
pub const BOUND_MAX_RE: f64 = 1.0;
pub const BOUND_MIN_IM: f64 = -1.0;
pub const BOUND_MAX_IM: f64 = 1.0;

/// The axis-aligned rectangle of the complex plane currently visible.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewBounds {
    pub min_re: f64,
    pub min_im: f64,
    pub max_re: f64,
    pub max_im: f64,
}

impl ViewBounds {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_re - self.min_re
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_im - self.min_im
    }
}

/// Zoom factor and pan offset of the view.
///
/// `scale` lives in `(0, 1]`: 1.0 shows the full base bounds, smaller
/// values shrink the visible rectangle around `center`. There is no lower
/// clamp; zooming in is only limited by f64 precision.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportState {
    pub scale: f64,
    pub center: Complex<f64>,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            center: Complex::new(0.0, 0.0),
        }
    }
}

impl ViewportState {
    #[must_use]
    pub fn bounds(&self) -> ViewBounds {
        ViewBounds {
            min_re: BOUND_MIN_RE * self.scale + self.center.re,
            min_im: BOUND_MIN_IM * self.scale + self.center.im,
            max_re: BOUND_MAX_RE * self.scale + self.center.re,
            max_im: BOUND_MAX_IM * self.scale + self.center.im,
        }
    }

    /// The scale after zooming by `factor`, clamped so the view never
    /// zooms out past the base bounds.
    #[must_use]
    pub fn zoomed(&self, factor: f64) -> f64 {
        let scaled = self.scale * factor;
        if scaled > 1.0 { 1.0 } else { scaled }
    }
}
