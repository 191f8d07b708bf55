use ndarray::Array1;
use ninterp::{
    prelude::{Interp1DOwned, Interpolator},
    strategy::enums::Strategy1DEnum,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::{Branch, Trace};

/// An error raised when querying the major loop at a field value.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("field H = {h} is outside the {branch:?} branch support [{min}, {max}]")]
    OutOfRange {
        h: f64,
        branch: Branch,
        min: f64,
        max: f64,
    },
    #[error(transparent)]
    Validation(#[from] ninterp::error::ValidateError),
    #[error(transparent)]
    Interpolation(#[from] ninterp::error::InterpolateError),
}

/// An error raised while assembling a major loop from traced segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoopError {
    #[error("major-loop segments are too short or mismatched")]
    MalformedSegments,
    #[error("the {0:?} branch does not span H = 0")]
    NoZeroFieldSample(Branch),
    #[error("the {0:?} branch never crosses M = 0")]
    NoAxisCrossing(Branch),
}

/// The cached saturation-to-saturation hysteresis loop.
///
/// Holds the matched `H`/`M` sample sequences for the initial magnetization
/// curve and the two loop branches, plus the scalar critical points derived
/// from them. Built once at model construction and immutable afterwards;
/// queries never mutate it, so a constructed loop can be shared freely across
/// threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MajorLoop {
    h: Vec<f64>,
    m: Vec<f64>,
    /// Samples in the initial curve (prefix of `h`/`m`).
    init_len: usize,
    /// Samples in each of the upper and lower branches.
    branch_len: usize,
    remanence: [f64; 2],
    coercivity: [f64; 2],
}

impl MajorLoop {
    /// Assembles a major loop from the three traced segments and derives its
    /// critical points.
    ///
    /// The upper branch must be traced with descending field, the lower with
    /// ascending field, and both must cover the same span.
    ///
    /// # Errors
    ///
    /// Returns a [`LoopError`] if the segments are too short or mismatched,
    /// or if a branch fails to span `H = 0` or cross `M = 0` (a degenerate
    /// loop that cannot yield remanence or coercivity).
    pub fn new(init: Trace, upper: Trace, lower: Trace) -> Result<Self, LoopError> {
        if init.len() < 2 || upper.len() < 2 || upper.len() != lower.len() {
            return Err(LoopError::MalformedSegments);
        }

        let remanence = [
            interpolate_at(&upper.h, &upper.m, 0.0)
                .ok_or(LoopError::NoZeroFieldSample(Branch::Upper))?,
            interpolate_at(&lower.h, &lower.m, 0.0)
                .ok_or(LoopError::NoZeroFieldSample(Branch::Lower))?,
        ];
        let coercivity = [
            axis_crossing(&lower.h, &lower.m).ok_or(LoopError::NoAxisCrossing(Branch::Lower))?,
            axis_crossing(&upper.h, &upper.m).ok_or(LoopError::NoAxisCrossing(Branch::Upper))?,
        ];

        let init_len = init.len();
        let branch_len = upper.len();

        let mut h = init.h;
        let mut m = init.m;
        h.extend(upper.h);
        m.extend(upper.m);
        h.extend(lower.h);
        m.extend(lower.m);

        Ok(Self {
            h,
            m,
            init_len,
            branch_len,
            remanence,
            coercivity,
        })
    }

    /// All field samples: initial curve, then upper branch, then lower.
    #[must_use]
    pub fn h_major(&self) -> &[f64] {
        &self.h
    }

    /// All magnetization samples, matched to [`MajorLoop::h_major`].
    #[must_use]
    pub fn m_major(&self) -> &[f64] {
        &self.m
    }

    /// The field at which the initial curve reached saturation.
    #[must_use]
    pub fn saturation_field(&self) -> f64 {
        self.h[self.init_len - 1]
    }

    /// Magnetization remaining at zero applied field, `[upper, lower]`.
    #[must_use]
    pub fn remanence(&self) -> [f64; 2] {
        self.remanence
    }

    /// Applied field at which the magnetization crosses zero,
    /// `[lower, upper]`.
    #[must_use]
    pub fn coercivity(&self) -> [f64; 2] {
        self.coercivity
    }

    /// The `(H, M)` samples of one branch.
    #[must_use]
    pub fn branch(&self, branch: Branch) -> (&[f64], &[f64]) {
        let range = match branch {
            Branch::Initial => 0..self.init_len,
            Branch::Upper => self.init_len..self.init_len + self.branch_len,
            Branch::Lower => self.init_len + self.branch_len..self.h.len(),
        };
        (&self.h[range.clone()], &self.m[range])
    }

    /// The inclusive field support of one branch.
    #[must_use]
    pub fn support(&self, branch: Branch) -> (f64, f64) {
        let (h, _) = self.branch(branch);
        let (first, last) = (h[0], h[h.len() - 1]);
        (first.min(last), first.max(last))
    }

    /// Interpolates the loop at field `h` on the given branch.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::OutOfRange`] if `h` lies outside the branch
    /// support; the support edges themselves are valid query points.
    pub fn point(&self, h: f64, branch: Branch) -> Result<f64, QueryError> {
        let (min, max) = self.support(branch);
        if !(min..=max).contains(&h) {
            return Err(QueryError::OutOfRange {
                h,
                branch,
                min,
                max,
            });
        }

        let (h_seg, m_seg) = self.branch(branch);
        // ninterp wants a strictly ascending grid; the upper branch is
        // traced with descending field.
        let (x, f_x): (Array1<f64>, Array1<f64>) = if h_seg[0] > h_seg[h_seg.len() - 1] {
            (
                h_seg.iter().rev().copied().collect(),
                m_seg.iter().rev().copied().collect(),
            )
        } else {
            (h_seg.iter().copied().collect(), m_seg.iter().copied().collect())
        };

        let interp: Interp1DOwned<f64, Strategy1DEnum> = Interp1DOwned::new(
            x.into(),
            f_x.into(),
            ninterp::strategy::Linear.into(),
            ninterp::interpolator::Extrapolate::Error,
        )?;
        Ok(interp.interpolate(&[h])?)
    }
}

/// Linearly interpolates `m` at `target` along a monotone `h` sequence.
fn interpolate_at(h: &[f64], m: &[f64], target: f64) -> Option<f64> {
    h.windows(2).zip(m.windows(2)).find_map(|(hw, mw)| {
        if (target - hw[0]) * (target - hw[1]) <= 0.0 && hw[0] != hw[1] {
            let t = (target - hw[0]) / (hw[1] - hw[0]);
            Some(mw[0] + t * (mw[1] - mw[0]))
        } else {
            None
        }
    })
}

/// Linearly interpolates the field at which `m` crosses zero.
fn axis_crossing(h: &[f64], m: &[f64]) -> Option<f64> {
    h.windows(2).zip(m.windows(2)).find_map(|(hw, mw)| {
        if mw[0] == 0.0 {
            Some(hw[0])
        } else if mw[0] * mw[1] < 0.0 || mw[1] == 0.0 {
            let t = mw[0] / (mw[0] - mw[1]);
            Some(hw[0] + t * (hw[1] - hw[0]))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    /// A synthetic parallelogram loop: initial curve from the origin, then
    /// two straight branches offset by a constant field.
    fn synthetic_loop() -> MajorLoop {
        let init = Trace {
            h: vec![0.0, 1.0, 2.0],
            m: vec![0.0, 0.5, 1.0],
        };
        // M = (H + 1) / 3 clamped to the traced span, descending.
        let upper = Trace {
            h: vec![2.0, 1.0, 0.0, -1.0, -2.0],
            m: vec![1.0, 2.0 / 3.0, 1.0 / 3.0, 0.0, -1.0],
        };
        // M = (H - 1) / 3, ascending.
        let lower = Trace {
            h: vec![-2.0, -1.0, 0.0, 1.0, 2.0],
            m: vec![-1.0, -2.0 / 3.0, -1.0 / 3.0, 0.0, 1.0],
        };
        MajorLoop::new(init, upper, lower).unwrap()
    }

    #[test]
    fn critical_points_are_interpolated() {
        let major = synthetic_loop();
        assert_relative_eq!(major.remanence()[0], 1.0 / 3.0);
        assert_relative_eq!(major.remanence()[1], -1.0 / 3.0);
        assert_relative_eq!(major.coercivity()[0], 1.0);
        assert_relative_eq!(major.coercivity()[1], -1.0);
    }

    #[test]
    fn point_interpolates_between_samples() {
        let major = synthetic_loop();
        let m = major.point(0.5, Branch::Lower).unwrap();
        assert_relative_eq!(m, -1.0 / 6.0, epsilon = 1e-12);

        let m = major.point(0.5, Branch::Upper).unwrap();
        assert_relative_eq!(m, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn point_succeeds_at_the_support_edge() {
        let major = synthetic_loop();
        assert_relative_eq!(major.point(2.0, Branch::Upper).unwrap(), 1.0);
        assert_relative_eq!(major.point(-2.0, Branch::Lower).unwrap(), -1.0);
    }

    #[test]
    fn point_beyond_support_is_out_of_range() {
        let major = synthetic_loop();
        let err = major.point(2.5, Branch::Lower).unwrap_err();
        assert!(matches!(
            err,
            QueryError::OutOfRange {
                branch: Branch::Lower,
                ..
            }
        ));
    }

    #[test]
    fn initial_curve_has_its_own_support() {
        let major = synthetic_loop();
        assert_eq!(major.support(Branch::Initial), (0.0, 2.0));
        assert!(major.point(-1.0, Branch::Initial).is_err());
        assert_relative_eq!(major.point(1.5, Branch::Initial).unwrap(), 0.75);
    }

    #[test]
    fn loop_that_never_demagnetizes_is_rejected() {
        let flat = Trace {
            h: vec![0.0, 1.0, 2.0],
            m: vec![1.0, 1.0, 1.0],
        };
        let err = MajorLoop::new(flat.clone(), flat.clone(), flat).unwrap_err();
        assert_eq!(err, LoopError::NoAxisCrossing(Branch::Lower));
    }

    #[test]
    fn mismatched_segments_are_rejected() {
        let init = Trace {
            h: vec![0.0, 1.0],
            m: vec![0.0, 1.0],
        };
        let upper = Trace {
            h: vec![1.0, 0.0, -1.0],
            m: vec![1.0, 0.5, -1.0],
        };
        let lower = Trace {
            h: vec![-1.0, 1.0],
            m: vec![-1.0, 1.0],
        };
        let err = MajorLoop::new(init, upper, lower).unwrap_err();
        assert_eq!(err, LoopError::MalformedSegments);
    }
}
