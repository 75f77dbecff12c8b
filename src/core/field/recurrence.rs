use num::Complex;

// Escape radius of the classical exponent-2 map. For other exponents it
// is a heuristic rather than a proven bound; kept at 2 regardless so
// rendered output matches across exponents.
const ESCAPE_RADIUS_SQUARED: f64 = 4.0;

const CLASSIC_EXPONENT: Complex<f64> = Complex::new(2.0, 0.0);

/// Counts recurrence steps of `z = z^exponent + c` from `z0` until
/// `|z| >= 2` or the cap is hit. A result equal to `max_iterations`
/// means the point never escaped.
///
/// The loop always terminates; degenerate exponents that drive `z` to
/// NaN fail the escape test on the next check and report an early
/// escape count instead of faulting.
#[must_use]
pub fn escape_iterations(
    z0: Complex<f64>,
    c: Complex<f64>,
    exponent: Complex<f64>,
    max_iterations: u64,
) -> u64 {
    let mut z = z0;
    let mut n = 0;

    while n < max_iterations && z.norm_sqr() < ESCAPE_RADIUS_SQUARED {
        z = raise(z, exponent) + c;
        n += 1;
    }

    n
}

fn raise(z: Complex<f64>, exponent: Complex<f64>) -> Complex<f64> {
    if exponent == CLASSIC_EXPONENT {
        return z * z;
    }

    // powc takes a zero base through ln(0) and yields NaN; 0^e is 0 for
    // Re(e) > 0, which keeps the origin fixed under every multibrot map.
    if z.re == 0.0 && z.im == 0.0 && exponent.re > 0.0 {
        return Complex::new(0.0, 0.0);
    }

    z.powc(exponent)
}
