//! The Jiles-Atherton magnetic hysteresis model.

mod anhysteretic;
mod config;
mod ode;

use std::io::{Read, Write};

use crate::{
    integrate::IntegrationError,
    model::{Branch, HysteresisModel, MajorLoop, ModelError, StatePoint, Trace},
    persist::{self, PersistError, SavedModel},
};

pub use config::JilesAthertonConfig;

use config::Params;
use ode::susceptibility;

/// Seed magnetization for the virgin curve; a tiny nonzero value so the
/// relative saturation criterion is defined from the first step.
const SEED_M: f64 = 1e-6;

/// Hard cap on initial-curve steps before declaring saturation unreachable.
const MAX_SATURATION_STEPS: usize = 2_000_000;

/// A Jiles-Atherton hysteresis model.
///
/// Construction validates the configuration and integrates the full major
/// loop, which is the expensive part; the constructed model is immutable and
/// every query borrows it, so one model can serve concurrent callers.
///
/// # Example
///
/// ```no_run
/// use hyst_core::{Branch, HysteresisModel, JilesAtherton, JilesAthertonConfig};
///
/// let config = JilesAthertonConfig::new(4.93e-4, 399.0, 1.35e6, 300.0, 0.12, 1.0);
/// let model = JilesAtherton::new(config)?;
///
/// let m_upper = model.point(0.0, Branch::Upper)?;
/// assert_eq!(m_upper, model.remanence()[0]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct JilesAtherton {
    config: JilesAthertonConfig,
    params: Params,
    major: MajorLoop,
}

impl JilesAtherton {
    /// Validates the configuration and builds the major loop.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if a parameter is out of its domain, the
    /// integrator name is unrecognized, or the major-loop integration fails.
    /// A model whose loop cannot be built is unusable, so there is no
    /// partially-constructed state.
    pub fn new(config: JilesAthertonConfig) -> Result<Self, ModelError> {
        let params = Params::from_config(&config)?;
        let major = build_major(&params)?;
        Ok(Self {
            config,
            params,
            major,
        })
    }

    /// The configuration this model was built from.
    #[must_use]
    pub fn config(&self) -> &JilesAthertonConfig {
        &self.config
    }

    /// The field at which the virgin curve reached saturation.
    #[must_use]
    pub fn saturation_field(&self) -> f64 {
        self.major.saturation_field()
    }

    /// Serializes the parameters and cached major loop to `writer`.
    ///
    /// The whole state is encoded before anything is written, so a failed
    /// save cannot leave a partially-written blob that parses.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] on I/O or encoding failure.
    pub fn save<W: Write>(&self, writer: W) -> Result<(), PersistError> {
        persist::write(
            writer,
            SavedModel::JilesAtherton {
                config: self.config.clone(),
                major: self.major.clone(),
            },
        )
    }

    /// Restores a model previously written by [`JilesAtherton::save`],
    /// without re-running the major-loop integration.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if the blob is unreadable, malformed, of an
    /// unsupported version, holds a different model kind, or carries a
    /// configuration that no longer validates.
    pub fn load<R: Read>(reader: R) -> Result<Self, PersistError> {
        match persist::read(reader)? {
            SavedModel::JilesAtherton { config, major } => {
                let params = Params::from_config(&config)?;
                Ok(Self {
                    config,
                    params,
                    major,
                })
            }
            other => Err(PersistError::ModelMismatch {
                expected: "JilesAtherton",
                found: other.kind(),
            }),
        }
    }
}

impl HysteresisModel for JilesAtherton {
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

        let mut h = start;
        let mut m = m0;
        for &target in legs {
            trace_leg(&self.params, &mut trace, &mut h, &mut m, target)?;
        }
        Ok(trace)
    }
}

/// Advances one integrator step, verifying the result is finite.
fn step(params: &Params, h: f64, m: f64, dh: f64) -> Result<f64, IntegrationError> {
    let delta = dh.signum();
    let slope = |h: f64, m: f64| susceptibility(params, h, m, delta);
    let next = params.method.step(slope, h, m, dh, params.sat_tol)?;
    if next.is_finite() {
        Ok(next)
    } else {
        Err(IntegrationError::NonFinite {
            last: StatePoint {
                h,
                m,
                branch: Branch::Initial.for_step(dh),
            },
        })
    }
}

/// Integrates from the current `(h, m)` to `target` in `dh`-sized steps,
/// shortening the final step to land exactly on the checkpoint. Appends
/// every visited sample to `trace`, excluding the starting point.
fn trace_leg(
    params: &Params,
    trace: &mut Trace,
    h: &mut f64,
    m: &mut f64,
    target: f64,
) -> Result<(), IntegrationError> {
    let dh = params.dh.copysign(target - *h);
    while *h != target {
        let remaining = target - *h;
        if remaining.abs() <= dh.abs() {
            *m = step(params, *h, *m, remaining)?;
            *h = target;
        } else {
            *m = step(params, *h, *m, dh)?;
            *h += dh;
        }
        trace.push(*h, *m);
    }
    Ok(())
}

/// Builds the major loop: virgin curve to positive saturation, then the
/// descending and ascending branches between `+H_sat` and `-H_sat`.
fn build_major(params: &Params) -> Result<MajorLoop, ModelError> {
    let dh = params.dh;

    // Virgin curve: step upward until the relative magnetization change
    // stays below the saturation tolerance for two consecutive steps.
    let mut init = Trace::default();
    let mut h = 0.0;
    let mut m = SEED_M;
    init.push(h, m);

    let mut settled = 0u32;
    while settled < 2 {
        if init.len() > MAX_SATURATION_STEPS {
            return Err(ModelError::SaturationNotReached {
                steps: init.len() - 1,
            });
        }
        let next = step(params, h, m, dh)?;
        let rel_change = if m == 0.0 {
            f64::INFINITY
        } else {
            ((next - m) / m).abs()
        };
        settled = if rel_change < params.sat_tol {
            settled + 1
        } else {
            0
        };
        h += dh;
        m = next;
        init.push(h, m);
    }

    let h_sat = h;
    let branch_steps = 2 * (init.len() - 1);

    // Descending branch: +H_sat down to -H_sat.
    let mut upper = Trace::default();
    upper.push(h, m);
    for _ in 0..branch_steps {
        m = step(params, h, m, -dh)?;
        h -= dh;
        upper.push(h, m);
    }

    // Ascending branch: back up to +H_sat.
    let mut lower = Trace::default();
    lower.push(h, m);
    for _ in 0..branch_steps {
        m = step(params, h, m, dh)?;
        h += dh;
        lower.push(h, m);
    }

    debug_assert!((h - h_sat).abs() < dh * 1e-6);
    Ok(MajorLoop::new(init, upper, lower)?)
}
