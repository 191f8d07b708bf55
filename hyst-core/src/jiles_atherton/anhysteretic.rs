//! The anhysteretic magnetization curve.
//!
//! Pure functions of the effective field `He = H + alpha * M`. The isotropic
//! form is the Langevin relation `Man = Ms * (coth(He/a) - a/He)`; the
//! anisotropic extension averages over domain orientations, weighted by the
//! anisotropy energy. Both are evaluated many times per integration step and
//! must stay finite at `He = 0` and for large `|He|`.

use crate::integrate::kron15;

use super::config::Params;

/// Argument below which the Langevin function uses its series expansion.
const SERIES_THRESHOLD: f64 = 1e-4;

/// Argument beyond which `sinh`/`coth` are replaced by their asymptotes.
const ASYMPTOTE_THRESHOLD: f64 = 30.0;

/// Panels used for the anisotropic angular average.
const QUAD_PANELS: usize = 10;

/// The anhysteretic magnetization and its derivative with respect to the
/// effective field, `(Man, dMan/dHe)`.
pub(crate) fn anhysteretic(params: &Params, he: f64) -> (f64, f64) {
    let x = he / params.a;
    let iso = params.ms * langevin(x);
    let iso_slope = params.ms / params.a * langevin_slope(x);

    if !params.anisotropic() {
        return (iso, iso_slope);
    }

    let aniso = angular_average(params, he);
    // The angular average has no closed-form derivative; a central
    // difference at the model's field resolution matches how the loop is
    // sampled.
    let aniso_slope =
        (angular_average(params, he + params.dh) - angular_average(params, he - params.dh))
            / (2.0 * params.dh);

    (
        (1.0 - params.wa) * iso + params.wa * aniso,
        (1.0 - params.wa) * iso_slope + params.wa * aniso_slope,
    )
}

/// The Langevin function `L(x) = coth(x) - 1/x`.
///
/// The removable singularity at `x = 0` is evaluated by series expansion,
/// and large arguments use the asymptote so `sinh` never overflows. `L`
/// saturates to `±1`, which caps the anhysteretic curve at `±Ms`.
fn langevin(x: f64) -> f64 {
    if x.abs() < SERIES_THRESHOLD {
        x / 3.0 - x * x * x / 45.0
    } else if x.abs() > ASYMPTOTE_THRESHOLD {
        x.signum() - 1.0 / x
    } else {
        1.0 / x.tanh() - 1.0 / x
    }
}

/// The Langevin slope `L'(x) = 1/x^2 - csch(x)^2`, with the limit `1/3` at
/// `x = 0`.
fn langevin_slope(x: f64) -> f64 {
    if x.abs() < SERIES_THRESHOLD {
        1.0 / 3.0 - x * x / 15.0
    } else if x.abs() > ASYMPTOTE_THRESHOLD {
        1.0 / (x * x)
    } else {
        let csch = 1.0 / x.sinh();
        1.0 / (x * x) - csch * csch
    }
}

/// The anisotropic anhysteretic magnetization: a Boltzmann-weighted average
/// of `cos` over domain orientations, relative to the easy axis.
///
/// The orientation energy combines the field term `He cos(t) / a` with the
/// uniaxial anisotropy term `ka sin^2(psi -+ t) / (Ms a)`, averaged over the
/// three easy-axis angles `psi`.
fn angular_average(params: &Params, he: f64) -> f64 {
    let energy_scale = params.ka / (params.ms * params.a);

    let exponent = |t: f64| -> f64 {
        let field_term = he * t.cos() / params.a;
        let aniso_term: f64 = params
            .psi
            .iter()
            .map(|&psi| ((psi - t).sin().powi(2) + (psi + t).sin().powi(2)) / 2.0)
            .sum::<f64>()
            / 3.0;
        field_term - energy_scale * aniso_term
    };

    // Shift by a coarse-grid maximum so the Boltzmann weight never
    // overflows; the shift cancels in the ratio below.
    let shift = (0..=64)
        .map(|i| exponent(std::f64::consts::PI * f64::from(i) / 64.0))
        .fold(f64::NEG_INFINITY, f64::max);
    let weight = move |t: f64| (exponent(t) - shift).exp() * t.sin();

    let bounds = (0.0, std::f64::consts::PI);
    let num = kron15(|t| weight(t) * t.cos(), bounds, QUAD_PANELS);
    let den = kron15(weight, bounds, QUAD_PANELS);

    if den == 0.0 {
        0.0
    } else {
        params.ms * num / den
    }
}
