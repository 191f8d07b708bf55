//! Unit conversion for magnetic field quantities.
//!
//! The models work in SI field units (A/m) throughout. Callers holding data
//! in flux-density units (tesla, gauss) or millimeter-scaled geometry can
//! convert with [`convert`] at the boundary.

use serde::{Deserialize, Serialize};

/// Vacuum permeability (T·m/A).
pub const MU0: f64 = 1.256_637_062_12e-6;

/// Recognized unit systems for magnetic field quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    /// Amperes per meter.
    Si,
    /// Amperes per millimeter.
    Mm,
    /// Tesla (flux density; scaled by `MU0`).
    Tesla,
    /// Gauss (flux density; scaled by `MU0 * 1e4`).
    Gauss,
}

impl Units {
    /// Scale factor relating this unit system to SI.
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            Units::Si => 1.0,
            Units::Mm => 1e-3,
            Units::Tesla => MU0,
            Units::Gauss => MU0 * 1e4,
        }
    }
}

/// Converts a magnetic quantity between unit systems.
///
/// # Example
///
/// ```
/// use hyst_core::units::{convert, Units, MU0};
///
/// let h = convert(1.0, Units::Tesla, Units::Si);
/// assert!((h - MU0).abs() < 1e-20);
/// ```
#[must_use]
pub fn convert(value: f64, from: Units, to: Units) -> f64 {
    value * from.factor() / to.factor()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn si_conversion_is_identity() {
        assert_relative_eq!(convert(123.4, Units::Si, Units::Si), 123.4);
    }

    #[test]
    fn tesla_gauss_round_trip() {
        let b = 0.35;
        let gauss = convert(b, Units::Tesla, Units::Gauss);
        assert_relative_eq!(gauss, b * 1e-4, max_relative = 1e-12);
        assert_relative_eq!(
            convert(gauss, Units::Gauss, Units::Tesla),
            b,
            max_relative = 1e-12
        );
    }

    #[test]
    fn mm_scales_by_a_thousand() {
        assert_relative_eq!(convert(1.0, Units::Mm, Units::Si), 1e-3);
    }
}
