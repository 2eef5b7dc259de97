//! Bisection (half-interval) root finding
//!
//! Used to invert the drawdown recurrence, which has no closed form once the
//! drawdown escalates with inflation.

use crate::error::ConvergenceError;
use log::{debug, warn};

/// Default residual tolerance, in currency units
pub const DEFAULT_TOLERANCE: f64 = 1.0;

/// Default iteration cap
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Bisection solver settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bisection {
    /// Maximum accepted |f(x) - target|
    pub tolerance: f64,

    /// Iterations before giving up with `ConvergenceError::MaxIterations`
    pub max_iterations: u32,
}

impl Default for Bisection {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl Bisection {
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Find `x` in `[lower, upper]` with `|f(x) - target| <= tolerance`.
    ///
    /// `f` must be monotonic over the bracket. Whether it is increasing or
    /// decreasing is inferred from the residual signs at the two bounds, so a
    /// bracket that does not straddle the target is rejected before any
    /// iteration is spent on it.
    pub fn solve<F>(&self, f: F, target: f64, lower: f64, upper: f64) -> Result<f64, ConvergenceError>
    where
        F: Fn(f64) -> f64,
    {
        let (mut low, mut high) = validate_bracket(lower, upper)?;

        let residual = |x: f64| -> Result<f64, ConvergenceError> {
            let r = f(x) - target;
            if r.is_finite() {
                Ok(r)
            } else {
                Err(ConvergenceError::NonFiniteResidual { x })
            }
        };

        let mut low_residual = residual(low)?;
        if low_residual.abs() <= self.tolerance {
            return Ok(low);
        }
        let high_residual = residual(high)?;
        if high_residual.abs() <= self.tolerance {
            return Ok(high);
        }

        if low_residual.signum() == high_residual.signum() {
            warn!(
                "bisection bracket [{low}, {high}] does not contain target {target} \
                 (residuals {low_residual}, {high_residual})"
            );
            return Err(ConvergenceError::NotBracketed {
                lower: low,
                upper: high,
                lower_residual: low_residual,
                upper_residual: high_residual,
            });
        }

        let (mut best, mut best_residual) = if low_residual.abs() <= high_residual.abs() {
            (low, low_residual)
        } else {
            (high, high_residual)
        };

        for iteration in 1..=self.max_iterations {
            let mid = 0.5 * (low + high);
            let mid_residual = residual(mid)?;

            if mid_residual.abs() <= self.tolerance {
                debug!("bisection converged to {mid} after {iteration} iterations");
                return Ok(mid);
            }

            if mid_residual.abs() < best_residual.abs() {
                best = mid;
                best_residual = mid_residual;
            }

            if mid_residual.signum() == low_residual.signum() {
                low = mid;
                low_residual = mid_residual;
            } else {
                high = mid;
            }
        }

        warn!(
            "bisection gave up after {} iterations (best {best}, residual {best_residual})",
            self.max_iterations
        );
        Err(ConvergenceError::MaxIterations {
            iterations: self.max_iterations,
            best,
            residual: best_residual,
        })
    }
}

/// Solve with the default tolerance and iteration cap
pub fn solve<F>(f: F, target: f64, lower: f64, upper: f64) -> Result<f64, ConvergenceError>
where
    F: Fn(f64) -> f64,
{
    Bisection::default().solve(f, target, lower, upper)
}

fn validate_bracket(lower: f64, upper: f64) -> Result<(f64, f64), ConvergenceError> {
    if !lower.is_finite() {
        return Err(ConvergenceError::NonFiniteBracket { value: lower });
    }
    if !upper.is_finite() {
        return Err(ConvergenceError::NonFiniteBracket { value: upper });
    }
    if lower >= upper {
        return Err(ConvergenceError::InvalidBracket { lower, upper });
    }
    Ok((lower, upper))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::cell::Cell;

    #[test]
    fn test_increasing_function() {
        let solver = Bisection::new(1e-9, 200);
        let x = solver.solve(|x| x * x, 2.0, 0.0, 2.0).unwrap();
        assert_abs_diff_eq!(x, 2.0_f64.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_decreasing_function() {
        // 1000 - 3x = 400  =>  x = 200
        let x = solve(|x| 1000.0 - 3.0 * x, 400.0, 0.0, 1000.0).unwrap();
        assert!((1000.0 - 3.0 * x - 400.0).abs() <= DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_root_at_bound() {
        let x = solve(|x| x, 0.0, 0.0, 10.0).unwrap();
        assert_eq!(x, 0.0);
    }

    #[test]
    fn test_unbracketed_fails_fast() {
        let calls = Cell::new(0);
        let result = solve(
            |x| {
                calls.set(calls.get() + 1);
                x
            },
            500.0,
            0.0,
            100.0,
        );

        assert!(matches!(result, Err(ConvergenceError::NotBracketed { .. })));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_max_iterations_is_an_error() {
        // Tolerance below f64 resolution can never be met
        let solver = Bisection::new(1e-300, 10);
        let result = solver.solve(|x| x * x, 2.0, 0.0, 2.0);

        match result {
            Err(ConvergenceError::MaxIterations { iterations, best, .. }) => {
                assert_eq!(iterations, 10);
                assert!((best - 2.0_f64.sqrt()).abs() < 0.01);
            }
            other => panic!("expected MaxIterations, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_brackets() {
        assert!(matches!(
            solve(|x| x, 0.0, 5.0, 5.0),
            Err(ConvergenceError::InvalidBracket { .. })
        ));
        assert!(matches!(
            solve(|x| x, 0.0, f64::NEG_INFINITY, 5.0),
            Err(ConvergenceError::NonFiniteBracket { .. })
        ));
    }

    #[test]
    fn test_non_finite_residual() {
        let result = solve(|x| 1.0 / x, 0.5, 0.0, 10.0);
        assert!(matches!(result, Err(ConvergenceError::NonFiniteResidual { .. })));
    }
}
