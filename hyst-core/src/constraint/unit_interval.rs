use num_traits::Float;

use super::{Constrained, Constraint, ConstraintError};

/// Marker type enforcing that a value lies in the right-open unit interval:
/// `0 <= x < 1`.
///
/// Used for the reversibility coefficient `c`, which must leave a nonzero
/// irreversible component: `c == 1` would describe a material with no
/// hysteresis at all, so the upper endpoint is excluded.
///
/// # Examples
///
/// ```
/// use hyst_core::constraint::{Constrained, ConstraintError, UnitIntervalRightOpen};
///
/// let c = Constrained::<f64, UnitIntervalRightOpen>::new(0.12).unwrap();
/// assert_eq!(c.get(), 0.12);
///
/// assert!(Constrained::<f64, UnitIntervalRightOpen>::new(0.0).is_ok());
/// assert_eq!(
///     Constrained::<f64, UnitIntervalRightOpen>::new(1.0).unwrap_err(),
///     ConstraintError::AboveMaximum,
/// );
/// assert_eq!(
///     Constrained::<f64, UnitIntervalRightOpen>::new(-0.1).unwrap_err(),
///     ConstraintError::BelowMinimum,
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnitIntervalRightOpen;

impl UnitIntervalRightOpen {
    /// Constructs `Constrained<T, UnitIntervalRightOpen>` if `0 <= value < 1`.
    ///
    /// # Errors
    ///
    /// - [`ConstraintError::NotANumber`] if the value is NaN.
    /// - [`ConstraintError::BelowMinimum`] if the value is less than zero.
    /// - [`ConstraintError::AboveMaximum`] if the value is one or greater.
    pub fn new<T: Float>(
        value: T,
    ) -> Result<Constrained<T, UnitIntervalRightOpen>, ConstraintError> {
        Constrained::new(value)
    }
}

impl<T: Float> Constraint<T> for UnitIntervalRightOpen {
    fn check(value: &T) -> Result<(), ConstraintError> {
        if value.is_nan() {
            Err(ConstraintError::NotANumber)
        } else if *value < T::zero() {
            Err(ConstraintError::BelowMinimum)
        } else if *value >= T::one() {
            Err(ConstraintError::AboveMaximum)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_values_pass() {
        assert!(UnitIntervalRightOpen::new(0.0).is_ok());
        assert!(UnitIntervalRightOpen::new(0.5).is_ok());
        assert!(UnitIntervalRightOpen::new(0.999).is_ok());
    }

    #[test]
    fn out_of_range_values_fail() {
        assert_eq!(
            UnitIntervalRightOpen::new(-0.01).unwrap_err(),
            ConstraintError::BelowMinimum
        );
        assert_eq!(
            UnitIntervalRightOpen::new(1.0).unwrap_err(),
            ConstraintError::AboveMaximum
        );
        assert_eq!(
            UnitIntervalRightOpen::new(1.5).unwrap_err(),
            ConstraintError::AboveMaximum
        );
    }

    #[test]
    fn nan_is_not_a_number() {
        assert_eq!(
            UnitIntervalRightOpen::new(f64::NAN).unwrap_err(),
            ConstraintError::NotANumber
        );
    }
}
