//! Numeric constraints enforced at construction time.
//!
//! Physical constants in a hysteresis model carry invariants: a field step
//! must be strictly positive, a reversibility fraction must lie in `[0, 1)`,
//! an anisotropy energy must not be negative. This module expresses those
//! invariants as marker types used with the generic [`Constrained<T, C>`]
//! wrapper, so a validated parameter set can be trusted for the lifetime of a
//! model without re-checking.
//!
//! Provided markers:
//!
//! - [`StrictlyPositive`]: finite and greater than zero
//! - [`NonNegative`]: finite and zero or greater
//! - [`UnitIntervalRightOpen`]: finite and in `[0, 1)`
//!
//! Custom invariants can be added by implementing [`Constraint<T>`] for a new
//! zero-sized marker type.

mod non_negative;
mod strictly_positive;
mod unit_interval;

use std::marker::PhantomData;

use thiserror::Error;

pub use non_negative::NonNegative;
pub use strictly_positive::StrictlyPositive;
pub use unit_interval::UnitIntervalRightOpen;

/// A trait for enforcing numeric invariants at construction time.
///
/// Implement this trait for a marker type representing a numeric constraint,
/// such as [`StrictlyPositive`] or [`UnitIntervalRightOpen`].
pub trait Constraint<T> {
    /// Checks that the given value satisfies this constraint.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstraintError`] if the value does not satisfy the
    /// constraint.
    fn check(value: &T) -> Result<(), ConstraintError>;
}

/// An error returned when a [`Constraint`] is violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConstraintError {
    #[error("value must not be negative")]
    Negative,
    #[error("value must be greater than zero")]
    NotPositive,
    #[error("value is not finite")]
    NotFinite,
    #[error("value is not a number")]
    NotANumber,
    #[error("value is below the minimum allowed")]
    BelowMinimum,
    #[error("value is above the maximum allowed")]
    AboveMaximum,
}

/// A wrapper enforcing a numeric constraint at construction time.
///
/// Combine this with one of the provided marker types (such as
/// [`StrictlyPositive`]) or your own [`Constraint<T>`] implementation.
///
/// # Example
///
/// ```
/// use hyst_core::constraint::{Constrained, StrictlyPositive};
///
/// let dh = Constrained::<_, StrictlyPositive>::new(0.5).unwrap();
/// assert_eq!(dh.get(), 0.5);
///
/// assert!(Constrained::<f64, StrictlyPositive>::new(-0.5).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Constrained<T, C: Constraint<T>> {
    value: T,
    _marker: PhantomData<C>,
}

impl<T, C: Constraint<T>> Constrained<T, C> {
    /// Constructs a new constrained value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not satisfy the constraint.
    pub fn new(value: T) -> Result<Self, ConstraintError> {
        C::check(&value)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    /// Returns a copy of the inner value.
    pub fn get(&self) -> T
    where
        T: Copy,
    {
        self.value
    }

    /// Consumes the wrapper and returns the inner value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Returns a reference to the inner unconstrained value.
impl<T, C: Constraint<T>> AsRef<T> for Constrained<T, C> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}
