use hyst_core::{Branch, HysteresisModel, IntegrationError, StatePoint};

/// A cylindrical ferromagnetic core wrapped in a solenoid.
///
/// The solenoid maps a drive current to an applied field, `H = turns * I`,
/// and the core's magnetization follows the wrapped hysteresis model. The
/// electromagnet owns the magnetic state between calls, so successive
/// currents trace a single continuous field history, minor loops included.
///
/// # Example
///
/// ```no_run
/// use hyst_components::Electromagnet;
/// use hyst_core::{JilesAtherton, JilesAthertonConfig};
///
/// let config = JilesAthertonConfig::new(4.93e-4, 399.0, 1.35e6, 300.0, 0.12, 1.0);
/// let model = JilesAtherton::new(config)?;
///
/// let mut magnet = Electromagnet::new(200.0, model, 0.0, 0.0);
/// let m = magnet.apply_current(2.5)?;
/// assert_eq!(magnet.field(), 500.0);
/// assert_eq!(magnet.magnetization(), m);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Electromagnet<M> {
    turns: f64,
    model: M,
    state: StatePoint,
}

impl<M: HysteresisModel> Electromagnet<M> {
    /// Wraps `model` in a solenoid with the given number of turns, starting
    /// from magnetization `m0` under drive current `i0`.
    pub fn new(turns: f64, model: M, m0: f64, i0: f64) -> Self {
        Self {
            turns,
            model,
            state: StatePoint {
                h: turns * i0,
                m: m0,
                branch: Branch::Initial,
            },
        }
    }

    /// Applies a drive current, advancing the core's magnetization to the
    /// new field `turns * i`. Returns the resulting magnetization.
    ///
    /// # Errors
    ///
    /// Returns an [`IntegrationError`] if the target field is non-finite or
    /// the model's trace to it fails; the stored state is left unchanged.
    pub fn apply_current(&mut self, i: f64) -> Result<f64, IntegrationError> {
        self.state = self.model.apply_step(self.state, self.turns * i)?;
        Ok(self.state.m)
    }

    /// The applied field (A/m) from the last drive current.
    #[must_use]
    pub fn field(&self) -> f64 {
        self.state.h
    }

    /// The core's magnetization (A/m).
    #[must_use]
    pub fn magnetization(&self) -> f64 {
        self.state.m
    }

    /// The full magnetic state of the core.
    #[must_use]
    pub fn state(&self) -> StatePoint {
        self.state
    }

    /// The wrapped hysteresis model.
    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use hyst_core::{Density, Preisach, PreisachConfig};

    use super::*;

    fn magnet() -> Electromagnet<Preisach> {
        let config = PreisachConfig::new(1.0e6, 100.0, 10.0, 5.0).with_density(Density::Uniform);
        Electromagnet::new(10.0, Preisach::new(config).unwrap(), 0.0, 0.0)
    }

    #[test]
    fn current_sets_the_field_through_the_turns_ratio() {
        let mut magnet = magnet();
        magnet.apply_current(4.0).unwrap();
        assert_eq!(magnet.field(), 40.0);
        assert!(magnet.magnetization() > 0.0);
    }

    #[test]
    fn repeated_current_is_idempotent() {
        let mut magnet = magnet();
        let m = magnet.apply_current(4.0).unwrap();
        let again = magnet.apply_current(4.0).unwrap();
        assert_eq!(m, again);
        assert_eq!(magnet.state().branch, Branch::Lower);
    }

    #[test]
    fn alternating_decay_degausses_the_core() {
        let mut magnet = magnet();

        // Saturate, then ring the current down with alternating sign.
        magnet.apply_current(12.0).unwrap();
        let saturated = magnet.magnetization();

        let mut i: f64 = -9.0;
        while i.abs() > 0.1 {
            magnet.apply_current(i).unwrap();
            i *= -0.75;
        }
        magnet.apply_current(0.0).unwrap();

        assert!(magnet.magnetization().abs() < 0.2 * saturated);
        assert_relative_eq!(magnet.field(), 0.0);
    }

    #[test]
    fn non_finite_current_is_rejected_and_state_kept() {
        let mut magnet = magnet();
        magnet.apply_current(4.0).unwrap();
        let before = magnet.state();

        assert!(magnet.apply_current(f64::NAN).is_err());
        assert_eq!(magnet.state(), before);
    }
}
