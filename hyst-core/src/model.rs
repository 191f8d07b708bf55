//! The shared surface of a constructed hysteresis model.
//!
//! Every model in this crate (Jiles-Atherton, Preisach) builds its major loop
//! once during construction and is immutable afterwards. The
//! [`HysteresisModel`] trait captures what the two have in common: access to
//! the cached [`MajorLoop`], path tracing, and the derived operations built
//! on those.

mod major_loop;
mod state;

use thiserror::Error;

use crate::{
    constraint::ConstraintError,
    integrate::{IntegrationError, UnknownIntegratorError},
    preisach::DensityError,
};

pub use major_loop::{LoopError, MajorLoop, QueryError};
pub use state::{Branch, StatePoint, Trace};

/// An error raised while validating a model configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid parameter {name:?}: {source}")]
    InvalidParameter {
        name: &'static str,
        source: ConstraintError,
    },
    #[error(transparent)]
    UnknownIntegrator(#[from] UnknownIntegratorError),
}

/// A fatal error raised while constructing a model.
///
/// A model whose major loop cannot be built is unusable, so every failure
/// during construction surfaces here.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("major-loop integration failed")]
    Integration(#[from] IntegrationError),
    #[error(transparent)]
    Loop(#[from] LoopError),
    #[error(transparent)]
    Density(#[from] DensityError),
    #[error("saturation not detected within {steps} steps; check dH and sat_tol")]
    SaturationNotReached { steps: usize },
}

/// Common operations of a constructed (Ready) hysteresis model.
///
/// `point`, `remanence`, and `coercivity` read the cached major loop;
/// `path` and `apply_step` trace new, independent excursions. Nothing here
/// mutates the model, so a shared reference can serve concurrent callers.
pub trait HysteresisModel {
    /// The cached major loop.
    fn major_loop(&self) -> &MajorLoop;

    /// Traces the magnetization along an ordered sequence of target-field
    /// checkpoints, starting from magnetization `m0` at `checkpoints[0]`.
    ///
    /// The branch (and with it the sign of the irreversible term) flips
    /// whenever consecutive checkpoints reverse direction; zero-length legs
    /// contribute no samples and keep the previous branch. The returned
    /// [`Trace`] holds the full `(H, M)` sequence, with the last step of each
    /// leg shortened to land exactly on its checkpoint.
    ///
    /// # Errors
    ///
    /// Returns an [`IntegrationError`] if a checkpoint is non-finite or the
    /// underlying integration fails; the error carries the last valid state.
    fn path(&self, checkpoints: &[f64], m0: f64) -> Result<Trace, IntegrationError>;

    /// Interpolates the major loop at field `h` on the given branch.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::OutOfRange`] if `h` lies outside the branch
    /// support.
    fn point(&self, h: f64, branch: Branch) -> Result<f64, QueryError> {
        self.major_loop().point(h, branch)
    }

    /// Magnetization remaining at zero applied field, `[upper, lower]`.
    fn remanence(&self) -> [f64; 2] {
        self.major_loop().remanence()
    }

    /// Applied field at which each branch crosses zero magnetization,
    /// `[lower, upper]`.
    fn coercivity(&self) -> [f64; 2] {
        self.major_loop().coercivity()
    }

    /// Advances a state point to a new target field, for callers driving the
    /// model one increment at a time inside a larger simulation step.
    ///
    /// A zero-length step returns the state unchanged, branch included.
    ///
    /// # Errors
    ///
    /// Returns an [`IntegrationError`] if the target is non-finite or the
    /// trace to it fails.
    fn apply_step(&self, state: StatePoint, h_target: f64) -> Result<StatePoint, IntegrationError> {
        if !h_target.is_finite() {
            return Err(IntegrationError::BadCheckpoint { value: h_target });
        }
        if h_target == state.h {
            return Ok(state);
        }

        let trace = self.path(&[state.h, h_target], state.m)?;
        let m = trace.last().map_or(state.m, |(_, m)| m);
        Ok(StatePoint {
            h: h_target,
            m,
            branch: state.branch.for_step(h_target - state.h),
        })
    }
}
