use num_traits::Float;

use super::{Constrained, Constraint, ConstraintError};

/// Marker type enforcing that a value is finite and zero or greater.
///
/// Used for optional physical constants whose absence is expressed as zero,
/// such as the anisotropy energy density `Ka` or the anisotropy weight `wa`.
///
/// # Examples
///
/// ```
/// use hyst_core::constraint::{Constrained, ConstraintError, NonNegative};
///
/// assert!(Constrained::<f64, NonNegative>::new(0.0).is_ok());
/// assert!(Constrained::<f64, NonNegative>::new(630.0).is_ok());
///
/// assert_eq!(
///     Constrained::<f64, NonNegative>::new(-1.0).unwrap_err(),
///     ConstraintError::Negative,
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NonNegative;

impl NonNegative {
    /// Constructs `Constrained<T, NonNegative>` if the value is finite and
    /// not negative.
    ///
    /// # Errors
    ///
    /// - [`ConstraintError::NotANumber`] if the value is NaN.
    /// - [`ConstraintError::NotFinite`] if the value is infinite.
    /// - [`ConstraintError::Negative`] if the value is less than zero.
    pub fn new<T: Float>(value: T) -> Result<Constrained<T, NonNegative>, ConstraintError> {
        Constrained::new(value)
    }

    /// Returns the lower bound (zero) as a constrained value.
    #[must_use]
    pub fn zero<T: Float>() -> Constrained<T, NonNegative> {
        Constrained::new(T::zero()).unwrap_or_else(|_| unreachable!("zero is non-negative"))
    }
}

impl<T: Float> Constraint<T> for NonNegative {
    fn check(value: &T) -> Result<(), ConstraintError> {
        if value.is_nan() {
            Err(ConstraintError::NotANumber)
        } else if value.is_infinite() {
            Err(ConstraintError::NotFinite)
        } else if *value < T::zero() {
            Err(ConstraintError::Negative)
        } else {
            Ok(())
        }
    }
}
