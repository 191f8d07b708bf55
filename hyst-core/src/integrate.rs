//! Numerical integration schemes for the hysteresis ODE.
//!
//! Every scheme exposes the same capability: advance the magnetization over
//! one field increment given a slope function `f(H, M) -> dM/dH`. The scheme
//! is selected by name when a model is configured, so the schemes are
//! variants of a single [`Method`] enum rather than separate types.
//!
//! The 15-point Gauss-Kronrod quadrature used by the anisotropic
//! anhysteretic average lives here as well, alongside the ODE steppers.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::StatePoint;

/// Hard cap on slope evaluations within a single adaptive increment.
const MAX_SLOPE_EVALS: usize = 10_000;

/// Smallest sub-step the adaptive controller may take, as a fraction of the
/// requested increment.
const MIN_STEP_FRACTION: f64 = 1e-6;

/// An error raised while integrating the magnetization ODE.
///
/// Every variant that can occur mid-trace carries the last valid state, so a
/// caller can resume or retry with a smaller step instead of losing the
/// excursion traced so far.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum IntegrationError {
    #[error("adaptive step size underflowed at H = {}, M = {}", last.h, last.m)]
    StepUnderflow { last: StatePoint },

    #[error("no convergence after {evals} slope evaluations at H = {}", last.h)]
    IterationLimit { last: StatePoint, evals: usize },

    #[error("non-finite magnetization stepping from H = {}, M = {}", last.h, last.m)]
    NonFinite { last: StatePoint },

    #[error("field checkpoint {value} is not finite")]
    BadCheckpoint { value: f64 },
}

impl IntegrationError {
    /// The last valid state before the failure, when one exists.
    #[must_use]
    pub fn last_state(&self) -> Option<StatePoint> {
        match self {
            IntegrationError::StepUnderflow { last }
            | IntegrationError::IterationLimit { last, .. }
            | IntegrationError::NonFinite { last } => Some(*last),
            IntegrationError::BadCheckpoint { .. } => None,
        }
    }
}

/// An unrecognized integrator name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown integrator {0:?}; expected one of \"Euler\", \"RK4\", \"RK45\"")]
pub struct UnknownIntegratorError(pub String);

/// The numerical scheme used to advance the magnetization ODE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Method {
    /// First-order explicit Euler. Takes the field increment as one literal
    /// step. Cheap and diffusive; mostly useful as a cross-check.
    Euler,

    /// Classic fixed-step fourth-order Runge-Kutta. Takes the field
    /// increment as one literal step. The default scheme.
    #[default]
    Rk4,

    /// Adaptive embedded Dormand-Prince 5(4). Sub-steps within each field
    /// increment, keeping the local error estimate under the model's
    /// saturation tolerance (used as both absolute and relative target).
    Rk45,
}

impl Method {
    /// Advances the magnetization by one field increment `dh`.
    ///
    /// `slope` evaluates `dM/dH` at a trial `(H, M)`; the branch sign is
    /// already bound into it. `tol` is the error-control target for the
    /// adaptive scheme and is ignored by the fixed-step schemes.
    ///
    /// # Errors
    ///
    /// Returns an [`IntegrationError`] if the adaptive controller cannot
    /// reach `h + dh` within its step and evaluation budgets. The fixed-step
    /// schemes cannot fail here; non-finite results are caught by the caller,
    /// which knows the full state point.
    pub fn step<F>(self, slope: F, h: f64, m: f64, dh: f64, tol: f64) -> Result<f64, IntegrationError>
    where
        F: Fn(f64, f64) -> f64,
    {
        match self {
            Method::Euler => Ok(m + slope(h, m) * dh),
            Method::Rk4 => Ok(rk4_step(&slope, h, m, dh)),
            Method::Rk45 => rk45_adaptive(&slope, h, m, dh, tol),
        }
    }
}

impl FromStr for Method {
    type Err = UnknownIntegratorError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_uppercase().as_str() {
            "EULER" => Ok(Method::Euler),
            "RK4" => Ok(Method::Rk4),
            "RK45" => Ok(Method::Rk45),
            _ => Err(UnknownIntegratorError(name.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Euler => write!(f, "Euler"),
            Method::Rk4 => write!(f, "RK4"),
            Method::Rk45 => write!(f, "RK45"),
        }
    }
}

/// One classic fourth-order Runge-Kutta step.
fn rk4_step<F>(slope: &F, h: f64, m: f64, dh: f64) -> f64
where
    F: Fn(f64, f64) -> f64,
{
    let k1 = slope(h, m);
    let k2 = slope(h + 0.5 * dh, m + 0.5 * dh * k1);
    let k3 = slope(h + 0.5 * dh, m + 0.5 * dh * k2);
    let k4 = slope(h + dh, m + dh * k3);
    m + dh * (k1 + 2.0 * k2 + 2.0 * k3 + k4) / 6.0
}

/// Dormand-Prince 5(4) with proportional step control over one increment.
///
/// The fifth-order solution advances the state; the embedded fourth-order
/// solution provides the local error estimate. The accepted-step error is
/// held under `tol * (1 + |M|)`.
fn rk45_adaptive<F>(slope: &F, h0: f64, m0: f64, dh: f64, tol: f64) -> Result<f64, IntegrationError>
where
    F: Fn(f64, f64) -> f64,
{
    // Dormand-Prince tableau.
    const C: [f64; 6] = [1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];
    const A: [[f64; 6]; 6] = [
        [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
        [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
        [
            19372.0 / 6561.0,
            -25360.0 / 2187.0,
            64448.0 / 6561.0,
            -212.0 / 729.0,
            0.0,
            0.0,
        ],
        [
            9017.0 / 3168.0,
            -355.0 / 33.0,
            46732.0 / 5247.0,
            49.0 / 176.0,
            -5103.0 / 18656.0,
            0.0,
        ],
        [
            35.0 / 384.0,
            0.0,
            500.0 / 1113.0,
            125.0 / 192.0,
            -2187.0 / 6784.0,
            11.0 / 84.0,
        ],
    ];
    const B5: [f64; 7] = [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
        0.0,
    ];
    const B4: [f64; 7] = [
        5179.0 / 57600.0,
        0.0,
        7571.0 / 16695.0,
        393.0 / 640.0,
        -92097.0 / 339200.0,
        187.0 / 2100.0,
        1.0 / 40.0,
    ];

    let direction = dh.signum();
    let h_end = h0 + dh;
    let min_step = dh.abs() * MIN_STEP_FRACTION;

    let mut h = h0;
    let mut m = m0;
    let mut step = dh;
    let mut evals = 0usize;

    let last = |h: f64, m: f64| StatePoint {
        h,
        m,
        branch: if direction < 0.0 {
            crate::model::Branch::Upper
        } else {
            crate::model::Branch::Lower
        },
    };

    while (h_end - h) * direction > 0.0 {
        // Never step past the end of the increment.
        if (h + step - h_end) * direction > 0.0 {
            step = h_end - h;
        }

        let mut k = [0.0f64; 7];
        k[0] = slope(h, m);
        for i in 0..6 {
            let mut dm = 0.0;
            for (j, kj) in k.iter().enumerate().take(i + 1) {
                dm += A[i][j] * kj;
            }
            k[i + 1] = slope(h + C[i] * step, m + step * dm);
        }
        evals += 7;

        let m5: f64 = m + step * B5.iter().zip(&k).map(|(b, kj)| b * kj).sum::<f64>();
        let m4: f64 = m + step * B4.iter().zip(&k).map(|(b, kj)| b * kj).sum::<f64>();

        let err = (m5 - m4).abs();
        let target = tol * (1.0 + m.abs());

        if err <= target {
            h += step;
            m = m5;
        }

        // Proportional controller with the usual safety factor and bounds.
        let scale = if err > 0.0 {
            0.9 * (target / err).powf(0.2)
        } else {
            5.0
        };
        step *= scale.clamp(0.2, 5.0);

        if step.abs() < min_step && (h_end - h) * direction > 0.0 {
            return Err(IntegrationError::StepUnderflow { last: last(h, m) });
        }
        if evals > MAX_SLOPE_EVALS {
            return Err(IntegrationError::IterationLimit {
                last: last(h, m),
                evals,
            });
        }
    }

    Ok(m)
}

/// 15-point Gauss-Kronrod quadrature of `f` over `bounds`, optionally split
/// into `nsplit` equal panels.
pub(crate) fn kron15<F>(f: F, bounds: (f64, f64), nsplit: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    // Kronrod nodes and weights on [-1, 1]; the positive half, mirrored.
    const XS: [f64; 8] = [
        0.0,
        0.207_784_955_007_898,
        0.405_845_151_377_397,
        0.586_087_235_467_691,
        0.741_531_185_599_394,
        0.864_864_423_359_769,
        0.949_107_912_342_759,
        0.991_455_371_120_813,
    ];
    const WS: [f64; 8] = [
        0.209_482_141_084_728,
        0.204_432_940_075_298,
        0.190_350_578_064_785,
        0.169_004_726_639_267,
        0.140_653_259_715_525,
        0.104_790_010_322_250,
        0.063_092_092_629_979,
        0.022_935_322_010_529,
    ];

    let nsplit = nsplit.max(1);
    let (lo, hi) = bounds;
    let panel = (hi - lo) / nsplit as f64;

    let mut total = 0.0;
    for n in 0..nsplit {
        let a = lo + panel * n as f64;
        let b = a + panel;
        let mid = 0.5 * (a + b);
        let half = 0.5 * (b - a);

        total += half * WS[0] * f(mid);
        for i in 1..8 {
            total += half * WS[i] * (f(mid - half * XS[i]) + f(mid + half * XS[i]));
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn method_parses_by_name_case_insensitively() {
        assert_eq!("euler".parse::<Method>().unwrap(), Method::Euler);
        assert_eq!("RK4".parse::<Method>().unwrap(), Method::Rk4);
        assert_eq!("rk45".parse::<Method>().unwrap(), Method::Rk45);
    }

    #[test]
    fn unknown_integrator_name_is_rejected() {
        let err = "leapfrog".parse::<Method>().unwrap_err();
        assert_eq!(err, UnknownIntegratorError("leapfrog".to_string()));
    }

    #[test]
    fn default_method_is_rk4() {
        assert_eq!(Method::default(), Method::Rk4);
        assert_eq!(Method::Rk4.to_string(), "RK4");
    }

    /// dM/dH = M integrated over [0, 1] from 1 must approach e.
    #[test]
    fn schemes_integrate_exponential_growth() {
        let slope = |_h: f64, m: f64| m;
        let exact = std::f64::consts::E;

        let mut m = 1.0;
        let mut h = 0.0;
        for _ in 0..1000 {
            m = Method::Euler.step(slope, h, m, 1e-3, 1e-9).unwrap();
            h += 1e-3;
        }
        assert_relative_eq!(m, exact, max_relative = 1e-2);

        let mut m = 1.0;
        let mut h = 0.0;
        for _ in 0..100 {
            m = Method::Rk4.step(slope, h, m, 1e-2, 1e-9).unwrap();
            h += 1e-2;
        }
        assert_relative_eq!(m, exact, max_relative = 1e-9);

        let m = Method::Rk45.step(slope, 0.0, 1.0, 1.0, 1e-10).unwrap();
        assert_relative_eq!(m, exact, max_relative = 1e-7);
    }

    #[test]
    fn rk45_integrates_backward_increments() {
        // dM/dH = -M from 1 over [1, 0] ends at e.
        let slope = |_h: f64, m: f64| -m;
        let m = Method::Rk45.step(slope, 1.0, 1.0, -1.0, 1e-10).unwrap();
        assert_relative_eq!(m, std::f64::consts::E, max_relative = 1e-7);
    }

    #[test]
    fn kron15_is_exact_for_polynomials() {
        let integral = kron15(|x| x * x, (0.0, 3.0), 1);
        assert_relative_eq!(integral, 9.0, max_relative = 1e-12);
    }

    #[test]
    fn kron15_handles_split_panels() {
        let integral = kron15(f64::sin, (0.0, std::f64::consts::PI), 10);
        assert_relative_eq!(integral, 2.0, max_relative = 1e-10);
    }
}
