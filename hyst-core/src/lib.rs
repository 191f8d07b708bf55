//! Scalar models of magnetic hysteresis.
//!
//! Two models are provided, sharing the [`HysteresisModel`] trait:
//!
//! - [`JilesAtherton`]: integrates the Jiles-Atherton magnetization ODE,
//!   with an optional anisotropic anhysteretic extension.
//! - [`Preisach`]: a weighted grid of two-state relays.
//!
//! A model is constructed once from its config, building and caching its
//! major hysteresis loop; afterwards it is immutable and can be queried
//! ([`point`](HysteresisModel::point), remanence, coercivity), traced along
//! arbitrary field histories ([`path`](HysteresisModel::path)), or saved and
//! restored without re-running the construction-time integration.

pub mod constraint;
pub mod units;

mod integrate;
mod jiles_atherton;
mod model;
mod persist;
mod preisach;

pub use integrate::{IntegrationError, Method, UnknownIntegratorError};
pub use jiles_atherton::{JilesAtherton, JilesAthertonConfig};
pub use model::{
    Branch, ConfigError, HysteresisModel, LoopError, MajorLoop, ModelError, QueryError,
    StatePoint, Trace,
};
pub use persist::PersistError;
pub use preisach::{Density, DensityError, Preisach, PreisachConfig};
