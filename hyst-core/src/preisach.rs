//! The scalar Preisach hysteresis model.
//!
//! Magnetization is the weighted sum of a grid of two-state relays
//! (hysterons), each defined by its switch-off/switch-on field pair
//! `(alpha, beta)`. A rising field latches relays on at `H >= beta`; a
//! falling field drops them at `H < alpha`. Weights come from a [`Density`]
//! evaluated on the normalized grid, zeroed on the non-physical
//! `alpha >= beta` half, and rescaled so full alignment gives `Ms`.

mod density;

use std::io::{Read, Write};

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::{
    constraint::StrictlyPositive,
    integrate::IntegrationError,
    model::{ConfigError, HysteresisModel, MajorLoop, ModelError, Trace},
    persist::{self, PersistError, SavedModel},
};

pub use density::{Density, DensityError};

/// Seed magnetization for the virgin curve, matching the demagnetized
/// relay split below.
const SEED_M: f64 = 1e-6;

fn default_sat_tol() -> f64 {
    1e-3
}

/// Configuration of a Preisach model.
///
/// # Example
///
/// ```
/// use hyst_core::{Density, PreisachConfig};
///
/// let config = PreisachConfig::new(1.35e6, 500.0, 10.0, 1.0)
///     .with_density(Density::Uniform);
/// assert_eq!(config.density, Density::Uniform);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreisachConfig {
    /// Saturation magnetization (A/m).
    pub ms: f64,
    /// Largest hysteron switching-field magnitude (A/m).
    pub ab_max: f64,
    /// Spacing of the alpha/beta grid (A/m).
    pub ab_res: f64,
    /// Magnetizing field step size (A/m).
    pub dh: f64,
    /// Largest relative magnetization change at saturation.
    #[serde(default = "default_sat_tol")]
    pub sat_tol: f64,
    /// Hysteron weight distribution.
    #[serde(default)]
    pub density: Density,
}

impl PreisachConfig {
    /// Builds a config with the default Gaussian density and
    /// `sat_tol = 1e-3`.
    #[must_use]
    pub fn new(ms: f64, ab_max: f64, ab_res: f64, dh: f64) -> Self {
        Self {
            ms,
            ab_max,
            ab_res,
            dh,
            sat_tol: default_sat_tol(),
            density: Density::default(),
        }
    }

    /// Replaces the hysteron weight distribution.
    #[must_use]
    pub fn with_density(mut self, density: Density) -> Self {
        self.density = density;
        self
    }

    /// Overrides the saturation-detection tolerance.
    #[must_use]
    pub fn with_sat_tol(mut self, sat_tol: f64) -> Self {
        self.sat_tol = sat_tol;
        self
    }
}

/// A Preisach hysteresis model.
///
/// Construction evaluates the hysteron grid and integrates the major loop;
/// the constructed model is immutable. Relay state is never stored on the
/// model: each [`path`](HysteresisModel::path) call carries its own relay
/// vector, seeded from the starting magnetization.
#[derive(Debug, Clone, PartialEq)]
pub struct Preisach {
    config: PreisachConfig,
    /// Alpha/beta pairs, scaled to `[-ab_max, ab_max]^2`.
    grid: Vec<[f64; 2]>,
    /// Hysteron weights, summing to `Ms` over the `alpha < beta` half.
    weights: Array1<f64>,
    major: MajorLoop,
}

impl Preisach {
    /// Validates the configuration, evaluates the hysteron weights, and
    /// builds the major loop.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if a parameter is out of its domain, the
    /// density cannot be evaluated, or the loop construction fails.
    pub fn new(config: PreisachConfig) -> Result<Self, ModelError> {
        let (grid, weights) = build_hysterons(&config)?;
        let major = build_major(&config, &grid, &weights)?;
        Ok(Self {
            config,
            grid,
            weights,
            major,
        })
    }

    /// The configuration this model was built from.
    #[must_use]
    pub fn config(&self) -> &PreisachConfig {
        &self.config
    }

    /// The field at which the virgin curve reached saturation.
    #[must_use]
    pub fn saturation_field(&self) -> f64 {
        self.major.saturation_field()
    }

    /// Serializes the parameters and cached major loop to `writer`.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] on I/O or encoding failure.
    pub fn save<W: Write>(&self, writer: W) -> Result<(), PersistError> {
        persist::write(
            writer,
            SavedModel::Preisach {
                config: self.config.clone(),
                major: self.major.clone(),
            },
        )
    }

    /// Restores a model previously written by [`Preisach::save`]. The
    /// hysteron grid is re-evaluated (it is cheap); the cached major loop is
    /// reused as saved.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if the blob is unreadable, malformed, of an
    /// unsupported version, holds a different model kind, or carries a
    /// configuration that no longer validates.
    pub fn load<R: Read>(reader: R) -> Result<Self, PersistError> {
        match persist::read(reader)? {
            SavedModel::Preisach { config, major } => {
                let (grid, weights) = build_hysterons(&config)?;
                Ok(Self {
                    config,
                    grid,
                    weights,
                    major,
                })
            }
            other => Err(PersistError::ModelMismatch {
                expected: "Preisach",
                found: other.kind(),
            }),
        }
    }

    /// The relay configuration of a demagnetized-then-magnetized sample at
    /// magnetization `m`: relays are on where the diagonal staircase at
    /// `ab0 = ab_max * m / Ms` lies above them.
    fn seed_relays(&self, m: f64) -> Array1<f64> {
        let ab0 = self.config.ab_max * m / self.config.ms;
        initial_relays(&self.grid, ab0)
    }
}

impl HysteresisModel for Preisach {
    fn major_loop(&self) -> &MajorLoop {
        &self.major
    }

    fn path(&self, checkpoints: &[f64], m0: f64) -> Result<Trace, IntegrationError> {
        if let Some(&value) = checkpoints.iter().find(|c| !c.is_finite()) {
            return Err(IntegrationError::BadCheckpoint { value });
        }

        let mut trace = Trace::default();
        let Some((&start, legs)) = checkpoints.split_first() else {
            return Ok(trace);
        };
        trace.push(start, m0);

        let mut relays = self.seed_relays(m0);
        let mut h = start;
        for &target in legs {
            let dh = self.config.dh.copysign(target - h);
            while h != target {
                let remaining = target - h;
                h = if remaining.abs() <= dh.abs() {
                    target
                } else {
                    h + dh
                };
                sweep(&self.grid, &mut relays, h, dh > 0.0);
                trace.push(h, self.weights.dot(&relays));
            }
        }
        Ok(trace)
    }
}

/// An error raised while evaluating the hysteron grid; split out so both
/// construction and restore can report it in their own taxonomy.
#[derive(Debug)]
enum HysteronError {
    Config(ConfigError),
    Density(DensityError),
}

impl From<ConfigError> for HysteronError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<DensityError> for HysteronError {
    fn from(err: DensityError) -> Self {
        Self::Density(err)
    }
}

impl From<HysteronError> for ModelError {
    fn from(err: HysteronError) -> Self {
        match err {
            HysteronError::Config(err) => Self::Config(err),
            HysteronError::Density(err) => Self::Density(err),
        }
    }
}

impl From<HysteronError> for PersistError {
    fn from(err: HysteronError) -> Self {
        match err {
            HysteronError::Config(err) => Self::Config(err),
            HysteronError::Density(err) => Self::Density(err),
        }
    }
}

/// Builds the scaled alpha/beta grid and its masked, `Ms`-normalized
/// weights.
fn build_hysterons(config: &PreisachConfig) -> Result<(Vec<[f64; 2]>, Array1<f64>), HysteronError> {
    let ms = positive("ms", config.ms)?;
    let ab_max = positive("ab_max", config.ab_max)?;
    let ab_res = positive("ab_res", config.ab_res)?;
    positive("dh", config.dh)?;
    positive("sat_tol", config.sat_tol)?;

    // Normalized grid: (n+1)^2 alpha/beta pairs on [-1, 1]^2. The density is
    // evaluated in these units, so its parameters are resolution-independent.
    let n = (2.0 * ab_max / ab_res).ceil() as usize;
    let scale = 2.0 / n as f64;
    let mut grid = Vec::with_capacity((n + 1) * (n + 1));
    for a in 0..=n {
        for b in 0..=n {
            grid.push([-1.0 + scale * a as f64, -1.0 + scale * b as f64]);
        }
    }

    let mut weights = config.density.evaluate(&grid)?;

    // Only alpha < beta is physical; zero the rest and rescale so that full
    // relay alignment reproduces Ms.
    for (weight, point) in weights.iter_mut().zip(&grid) {
        if point[0] >= point[1] {
            *weight = 0.0;
        }
    }
    let total = weights.sum();
    weights *= ms / total;

    for point in &mut grid {
        point[0] *= ab_max;
        point[1] *= ab_max;
    }
    Ok((grid, weights))
}

fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    StrictlyPositive::new(value)
        .map(|value| value.get())
        .map_err(|source| ConfigError::InvalidParameter { name, source })
}

/// Relay states for the staircase interface at height `ab0`.
fn initial_relays(grid: &[[f64; 2]], ab0: f64) -> Array1<f64> {
    grid.iter()
        .map(|point| if -point[0] >= point[1] - ab0 { 1.0 } else { -1.0 })
        .collect()
}

/// Latches relays for one field step: a rising field switches hysterons on
/// at `H >= beta`, a falling field switches them off at `H < alpha`.
fn sweep(grid: &[[f64; 2]], relays: &mut Array1<f64>, h: f64, rising: bool) {
    for (relay, point) in relays.iter_mut().zip(grid) {
        if rising {
            if h >= point[1] {
                *relay = 1.0;
            }
        } else if h < point[0] {
            *relay = -1.0;
        }
    }
}

/// Builds the major loop: virgin curve until every relay has latched, then
/// the descending and ascending branches between `+H_sat` and `-H_sat`.
fn build_major(
    config: &PreisachConfig,
    grid: &[[f64; 2]],
    weights: &Array1<f64>,
) -> Result<MajorLoop, ModelError> {
    let dh = config.dh;

    let mut init = Trace::default();
    let mut h = 0.0;
    let mut m = SEED_M;
    init.push(h, m);

    let mut relays = initial_relays(grid, SEED_M);
    let mut settled = 0u32;
    // Past ab_max every relay is on and the magnetization is constant, so
    // the settle counter is guaranteed to run out.
    while h <= config.ab_max || settled < 2 {
        h += dh;
        sweep(grid, &mut relays, h, true);
        let next = weights.dot(&relays);
        let rel_change = if m == 0.0 {
            f64::INFINITY
        } else {
            ((next - m) / m).abs()
        };
        settled = if rel_change < config.sat_tol {
            settled + 1
        } else {
            0
        };
        m = next;
        init.push(h, m);
    }

    let branch_steps = 2 * (init.len() - 1);

    let mut upper = Trace::default();
    upper.push(h, m);
    for _ in 0..branch_steps {
        h -= dh;
        sweep(grid, &mut relays, h, false);
        m = weights.dot(&relays);
        upper.push(h, m);
    }

    let mut lower = Trace::default();
    lower.push(h, m);
    for _ in 0..branch_steps {
        h += dh;
        sweep(grid, &mut relays, h, true);
        m = weights.dot(&relays);
        lower.push(h, m);
    }

    Ok(MajorLoop::new(init, upper, lower)?)
}
