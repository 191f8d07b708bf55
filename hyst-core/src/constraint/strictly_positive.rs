use num_traits::Float;

use super::{Constrained, Constraint, ConstraintError};

/// Marker type enforcing that a value is finite and strictly positive.
///
/// Used for physical constants that must carry a magnitude, such as the field
/// step `dH`, the saturation magnetization `Ms`, or the pinning coefficient
/// `k`. Infinities are rejected along with zero and negative values, since a
/// non-finite constant poisons every downstream computation.
///
/// # Examples
///
/// ```
/// use hyst_core::constraint::{Constrained, ConstraintError, StrictlyPositive};
///
/// assert!(Constrained::<f64, StrictlyPositive>::new(1.35e6).is_ok());
///
/// assert_eq!(
///     Constrained::<f64, StrictlyPositive>::new(0.0).unwrap_err(),
///     ConstraintError::NotPositive,
/// );
/// assert_eq!(
///     Constrained::<f64, StrictlyPositive>::new(f64::INFINITY).unwrap_err(),
///     ConstraintError::NotFinite,
/// );
/// assert_eq!(
///     Constrained::<f64, StrictlyPositive>::new(f64::NAN).unwrap_err(),
///     ConstraintError::NotANumber,
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StrictlyPositive;

impl StrictlyPositive {
    /// Constructs `Constrained<T, StrictlyPositive>` if the value is finite
    /// and greater than zero.
    ///
    /// # Errors
    ///
    /// - [`ConstraintError::NotANumber`] if the value is NaN.
    /// - [`ConstraintError::NotFinite`] if the value is infinite.
    /// - [`ConstraintError::NotPositive`] if the value is zero or less.
    pub fn new<T: Float>(value: T) -> Result<Constrained<T, StrictlyPositive>, ConstraintError> {
        Constrained::new(value)
    }
}

impl<T: Float> Constraint<T> for StrictlyPositive {
    fn check(value: &T) -> Result<(), ConstraintError> {
        if value.is_nan() {
            Err(ConstraintError::NotANumber)
        } else if value.is_infinite() {
            Err(ConstraintError::NotFinite)
        } else if *value <= T::zero() {
            Err(ConstraintError::NotPositive)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_values_pass() {
        assert!(StrictlyPositive::new(1e-300).is_ok());
        assert!(StrictlyPositive::new(300.0).is_ok());
    }

    #[test]
    fn zero_and_negative_fail() {
        assert_eq!(
            StrictlyPositive::new(0.0).unwrap_err(),
            ConstraintError::NotPositive
        );
        assert_eq!(
            StrictlyPositive::new(-300.0).unwrap_err(),
            ConstraintError::NotPositive
        );
    }

    #[test]
    fn non_finite_fails() {
        assert_eq!(
            StrictlyPositive::new(f64::INFINITY).unwrap_err(),
            ConstraintError::NotFinite
        );
        assert_eq!(
            StrictlyPositive::new(f64::NAN).unwrap_err(),
            ConstraintError::NotANumber
        );
    }
}
