//! The Jiles-Atherton magnetization ODE.
//!
//! The total susceptibility blends the irreversible domain-wall term with
//! the reversible domain-bending term:
//!
//! ```text
//!   dMirr/dH = (Man - M) / (k*delta - alpha*(Man - M))
//!   dM/dH    = (1-c)*dMirr/dH + c*dMan/dH
//! ```
//!
//! `delta` is the sign of the field change and is what makes the equation
//! path-dependent. `dMan/dH` is chain-ruled through `He = H + alpha*M`,
//! which leaves `dM/dH` on both sides; solving algebraically gives the
//! closed form evaluated here.

use super::{anhysteretic::anhysteretic, config::Params};

/// Denominator magnitude below which the pinning term is treated as
/// singular.
const PINNING_EPS: f64 = 1e-12;

/// Magnitude the susceptibility is clamped to at a singular denominator.
///
/// The clamp keeps the integrator stable where the raw expression would
/// diverge; it is a numerical approximation, not derived from the physics.
const CHI_CLAMP: f64 = 1e12;

/// Evaluates `dM/dH` at `(h, m)` with the field moving in direction
/// `delta` (`+1` increasing, `-1` decreasing).
pub(crate) fn susceptibility(params: &Params, h: f64, m: f64, delta: f64) -> f64 {
    let he = h + params.alpha * m;
    let (man, man_slope) = anhysteretic(params, he);

    let num = man - m;
    let den = delta * params.k - params.alpha * num;
    let chi_irr = if den.abs() < PINNING_EPS {
        let sign = if den == 0.0 { delta } else { den.signum() };
        num.signum() * sign * CHI_CLAMP
    } else {
        num / den
    };

    // dM/dH = ((1-c)*chi_irr + c*Man') / (1 - alpha*c*Man'), the closed form
    // of the blend after chain-ruling Man through the effective field.
    let raw = (1.0 - params.c) * chi_irr + params.c * man_slope;
    let blend_den = 1.0 - params.alpha * params.c * man_slope;
    if blend_den.abs() < PINNING_EPS {
        raw.signum() * CHI_CLAMP
    } else {
        (raw / blend_den).clamp(-CHI_CLAMP, CHI_CLAMP)
    }
}
