use serde::{Deserialize, Serialize};

use crate::{
    constraint::{ConstraintError, NonNegative, StrictlyPositive, UnitIntervalRightOpen},
    integrate::Method,
    model::ConfigError,
    units::MU0,
};

fn default_sat_tol() -> f64 {
    1e-3
}

fn default_integrator() -> String {
    Method::default().to_string()
}

/// Configuration of a Jiles-Atherton model.
///
/// Required physical constants are set through
/// [`JilesAthertonConfig::new`]; the anisotropy extension, saturation
/// tolerance, and integrator have defaults and are adjusted with the `with_*`
/// builders. Validation happens once, when the config is handed to
/// [`JilesAtherton::new`](crate::JilesAtherton::new).
///
/// # Example
///
/// ```
/// use hyst_core::JilesAthertonConfig;
///
/// let config = JilesAthertonConfig::new(4.93e-4, 399.0, 1.35e6, 300.0, 0.12, 1.0)
///     .with_sat_tol(2.5e-4)
///     .with_integrator("RK45");
/// assert_eq!(config.integrator, "RK45");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JilesAthertonConfig {
    /// Domain coupling strength (unitless mean-field parameter).
    pub alpha: f64,
    /// Domain wall density (A/m).
    pub a: f64,
    /// Saturation magnetization (A/m).
    pub ms: f64,
    /// Pinning site breaking energy (A/m).
    pub k: f64,
    /// Magnetization reversibility, in `[0, 1)`.
    pub c: f64,
    /// Magnetizing field step size (A/m).
    pub dh: f64,
    /// Relative weight of anisotropic effects.
    #[serde(default)]
    pub wa: f64,
    /// Average anisotropy energy density (J/m^3).
    #[serde(default)]
    pub ka: f64,
    /// Easy axis polar angle (radians).
    #[serde(default)]
    pub theta: f64,
    /// Easy axis azimuthal angle (radians).
    #[serde(default)]
    pub phi: f64,
    /// Largest relative magnetization change at saturation.
    #[serde(default = "default_sat_tol")]
    pub sat_tol: f64,
    /// Integrator name: `"Euler"`, `"RK4"`, or `"RK45"`.
    #[serde(default = "default_integrator")]
    pub integrator: String,
}

impl JilesAthertonConfig {
    /// Builds a config from the required isotropic constants, with the
    /// anisotropy extension off, `sat_tol = 1e-3`, and the RK4 integrator.
    #[must_use]
    pub fn new(alpha: f64, a: f64, ms: f64, k: f64, c: f64, dh: f64) -> Self {
        Self {
            alpha,
            a,
            ms,
            k,
            c,
            dh,
            wa: 0.0,
            ka: 0.0,
            theta: 0.0,
            phi: 0.0,
            sat_tol: default_sat_tol(),
            integrator: default_integrator(),
        }
    }

    /// Enables the anisotropic anhysteretic extension.
    #[must_use]
    pub fn with_anisotropy(mut self, wa: f64, ka: f64, theta: f64, phi: f64) -> Self {
        self.wa = wa;
        self.ka = ka;
        self.theta = theta;
        self.phi = phi;
        self
    }

    /// Overrides the saturation-detection tolerance.
    #[must_use]
    pub fn with_sat_tol(mut self, sat_tol: f64) -> Self {
        self.sat_tol = sat_tol;
        self
    }

    /// Selects the integration scheme by name.
    #[must_use]
    pub fn with_integrator(mut self, name: impl Into<String>) -> Self {
        self.integrator = name.into();
        self
    }
}

/// The validated, internal parameter set.
///
/// Constructed once from a [`JilesAthertonConfig`] and immutable afterwards.
/// `ka` is pre-divided by `MU0` and the easy-axis angles `psi` are
/// precomputed, so the ODE never repeats that work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Params {
    pub alpha: f64,
    pub a: f64,
    pub ms: f64,
    pub k: f64,
    pub c: f64,
    pub dh: f64,
    pub sat_tol: f64,
    pub wa: f64,
    pub ka: f64,
    /// Angles between the easy axis and each cartesian axis.
    pub psi: [f64; 3],
    pub method: Method,
}

impl Params {
    pub(crate) fn from_config(config: &JilesAthertonConfig) -> Result<Self, ConfigError> {
        let alpha = finite("alpha", config.alpha)?;
        let a = StrictlyPositive::new(config.a)
            .map_err(|source| invalid("a", source))?
            .get();
        let ms = StrictlyPositive::new(config.ms)
            .map_err(|source| invalid("ms", source))?
            .get();
        let k = StrictlyPositive::new(config.k)
            .map_err(|source| invalid("k", source))?
            .get();
        let c = UnitIntervalRightOpen::new(config.c)
            .map_err(|source| invalid("c", source))?
            .get();
        let dh = StrictlyPositive::new(config.dh)
            .map_err(|source| invalid("dh", source))?
            .get();
        let sat_tol = StrictlyPositive::new(config.sat_tol)
            .map_err(|source| invalid("sat_tol", source))?
            .get();
        let wa = NonNegative::new(config.wa)
            .map_err(|source| invalid("wa", source))?
            .get();
        let ka = NonNegative::new(config.ka)
            .map_err(|source| invalid("ka", source))?
            .get();
        let theta = finite("theta", config.theta)?;
        let phi = finite("phi", config.phi)?;

        let method: Method = config.integrator.parse()?;

        let anisotropic = wa > 0.0 && ka > 0.0;
        let (ka, psi) = if anisotropic {
            let easy = [
                theta.sin() * phi.cos(),
                theta.sin() * phi.sin(),
                theta.cos(),
            ];
            (ka / MU0, [easy[0].acos(), easy[1].acos(), easy[2].acos()])
        } else {
            (0.0, [0.0; 3])
        };
        let wa = if anisotropic { wa } else { 0.0 };

        Ok(Self {
            alpha,
            a,
            ms,
            k,
            c,
            dh,
            sat_tol,
            wa,
            ka,
            psi,
            method,
        })
    }

    /// Whether the anisotropic anhysteretic extension is active.
    pub(crate) fn anisotropic(&self) -> bool {
        self.wa > 0.0 && self.ka > 0.0
    }
}

fn invalid(name: &'static str, source: ConstraintError) -> ConfigError {
    ConfigError::InvalidParameter { name, source }
}

fn finite(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_nan() {
        Err(invalid(name, ConstraintError::NotANumber))
    } else if value.is_infinite() {
        Err(invalid(name, ConstraintError::NotFinite))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> JilesAthertonConfig {
        JilesAthertonConfig::new(4.93e-4, 399.0, 1.35e6, 300.0, 0.12, 1.0)
    }

    #[test]
    fn valid_config_produces_params() {
        let params = Params::from_config(&base_config()).unwrap();
        assert_eq!(params.method, Method::Rk4);
        assert_eq!(params.sat_tol, 1e-3);
        assert!(!params.anisotropic());
    }

    #[test]
    fn non_positive_required_constants_fail() {
        for (name, config) in [
            ("ms", JilesAthertonConfig { ms: 0.0, ..base_config() }),
            ("k", JilesAthertonConfig { k: -1.0, ..base_config() }),
            ("dh", JilesAthertonConfig { dh: 0.0, ..base_config() }),
            ("a", JilesAthertonConfig { a: f64::NAN, ..base_config() }),
        ] {
            let err = Params::from_config(&config).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidParameter { name: n, .. } if n == name),
                "expected InvalidParameter for {name}, got {err:?}"
            );
        }
    }

    #[test]
    fn reversibility_of_one_fails() {
        let err = Params::from_config(&JilesAthertonConfig {
            c: 1.0,
            ..base_config()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "c",
                source: ConstraintError::AboveMaximum,
            }
        ));
    }

    #[test]
    fn unknown_integrator_name_fails() {
        let err =
            Params::from_config(&base_config().with_integrator("simpson")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownIntegrator(_)));
    }

    #[test]
    fn anisotropy_requires_both_weight_and_energy() {
        let params =
            Params::from_config(&base_config().with_anisotropy(0.3, 0.0, 0.1, 0.2)).unwrap();
        assert!(!params.anisotropic());
        assert_eq!(params.wa, 0.0);

        let params =
            Params::from_config(&base_config().with_anisotropy(0.3, 630.0, 0.1, 0.2)).unwrap();
        assert!(params.anisotropic());
        assert!(params.ka > 630.0, "ka is stored divided by MU0");
    }

    #[test]
    fn easy_axis_along_z_gives_axis_angles() {
        let params =
            Params::from_config(&base_config().with_anisotropy(0.3, 630.0, 0.0, 0.0)).unwrap();
        let half_pi = std::f64::consts::FRAC_PI_2;
        assert!((params.psi[0] - half_pi).abs() < 1e-12);
        assert!((params.psi[1] - half_pi).abs() < 1e-12);
        assert!(params.psi[2].abs() < 1e-12);
    }
}
