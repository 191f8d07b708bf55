use serde::{Deserialize, Serialize};

/// The curve of the hysteresis surface a trace is currently following.
///
/// The magnetization ODE is branch-dependent: the sign of the irreversible
/// term flips with the direction of the applied field, so the branch is
/// discrete hidden state. It is carried explicitly in [`StatePoint`] rather
/// than inferred from the last field delta, so a zero-length step cannot
/// silently change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Branch {
    /// The virgin magnetization curve, traced upward from the demagnetized
    /// state.
    Initial,
    /// The descending branch of the loop (field decreasing).
    Upper,
    /// The ascending branch of the loop (field increasing).
    Lower,
}

impl Branch {
    /// Sign of the field increment on this branch: `-1` on [`Branch::Upper`],
    /// `+1` otherwise.
    #[must_use]
    pub fn delta(self) -> f64 {
        match self {
            Branch::Upper => -1.0,
            Branch::Initial | Branch::Lower => 1.0,
        }
    }

    /// The branch implied by a field step, keeping `self` for a zero-length
    /// step.
    #[must_use]
    pub fn for_step(self, dh: f64) -> Self {
        if dh > 0.0 {
            Branch::Lower
        } else if dh < 0.0 {
            Branch::Upper
        } else {
            self
        }
    }
}

/// A point on the hysteresis surface: applied field, magnetization, and the
/// branch the last move was on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatePoint {
    /// Applied magnetizing field (A/m).
    pub h: f64,
    /// Bulk magnetization (A/m).
    pub m: f64,
    /// Branch of the last move.
    pub branch: Branch,
}

impl StatePoint {
    /// A demagnetized starting state on the initial curve.
    #[must_use]
    pub fn demagnetized() -> Self {
        Self {
            h: 0.0,
            m: 0.0,
            branch: Branch::Initial,
        }
    }
}

/// A traced excursion: matched sequences of applied field and magnetization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trace {
    /// Applied field samples (A/m).
    pub h: Vec<f64>,
    /// Magnetization samples (A/m).
    pub m: Vec<f64>,
}

impl Trace {
    /// Number of samples in the trace.
    #[must_use]
    pub fn len(&self) -> usize {
        self.h.len()
    }

    /// Whether the trace holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.h.is_empty()
    }

    /// The last sample, if any.
    #[must_use]
    pub fn last(&self) -> Option<(f64, f64)> {
        Some((*self.h.last()?, *self.m.last()?))
    }

    pub(crate) fn push(&mut self, h: f64, m: f64) {
        self.h.push(h);
        self.m.push(m);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_delta_signs() {
        assert_eq!(Branch::Upper.delta(), -1.0);
        assert_eq!(Branch::Lower.delta(), 1.0);
        assert_eq!(Branch::Initial.delta(), 1.0);
    }

    #[test]
    fn zero_length_step_keeps_branch() {
        assert_eq!(Branch::Upper.for_step(0.0), Branch::Upper);
        assert_eq!(Branch::Upper.for_step(2.0), Branch::Lower);
        assert_eq!(Branch::Lower.for_step(-2.0), Branch::Upper);
        assert_eq!(Branch::Initial.for_step(0.0), Branch::Initial);
    }

    #[test]
    fn trace_push_and_last() {
        let mut trace = Trace::default();
        assert!(trace.is_empty());
        trace.push(0.0, 1.0);
        trace.push(1.0, 2.0);
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.last(), Some((1.0, 2.0)));
    }
}
