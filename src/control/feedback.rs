use serde::{Deserialize, Serialize};

use crate::dynamics::state::State;
use crate::error::ConfigError;
use super::controller::Controller;

// ---------------------------------------------------------------------------
// Linear state-feedback stabilizer
// ---------------------------------------------------------------------------

const fn default_kp1() -> f64 {
    12_000.0
}
const fn default_kd1() -> f64 {
    2_500.0
}
const fn default_kp2() -> f64 {
    300.0
}
const fn default_kd2() -> f64 {
    2_000.0
}

/// Feedback gains. `kd1` and `kp2` both act on `theta_dot`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gains {
    #[serde(default = "default_kp1")]
    pub kp1: f64,
    #[serde(default = "default_kd1")]
    pub kd1: f64,
    #[serde(default = "default_kp2")]
    pub kp2: f64,
    #[serde(default = "default_kd2")]
    pub kd2: f64,
}

impl Default for Gains {
    fn default() -> Self {
        Self {
            kp1: default_kp1(),
            kd1: default_kd1(),
            kp2: default_kp2(),
            kd2: default_kd2(),
        }
    }
}

impl Gains {
    /// Gains may take any sign but must be finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("kp1", self.kp1), ("kd1", self.kd1), ("kp2", self.kp2), ("kd2", self.kd2)] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field: field.into(), value });
            }
        }
        Ok(())
    }
}

/// `torque = kp1·θ + kd1·θ̇ + kp2·θ̇ + kd2·φ̇`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateFeedback {
    pub gains: Gains,
}

impl StateFeedback {
    pub fn new(gains: Gains) -> Self {
        Self { gains }
    }
}

impl Controller for StateFeedback {
    fn torque(&self, state: &State) -> f64 {
        let k = &self.gains;
        k.kp1 * state.theta + k.kd1 * state.theta_dot + k.kp2 * state.theta_dot + k.kd2 * state.phi_dot
    }

    fn name(&self) -> &str {
        "StateFeedback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upright_rest_gives_zero_torque() {
        let c = StateFeedback::default();
        assert_eq!(c.torque(&State::default()), 0.0);
    }

    #[test]
    fn tilt_only_is_proportional() {
        let c = StateFeedback::default();
        assert_eq!(c.torque(&State::tilted(0.1)), 1200.0);
    }

    #[test]
    fn tilt_rate_hits_both_gains() {
        let gains = Gains { kp1: 0.0, kd1: 2.0, kp2: 3.0, kd2: 0.0 };
        let c = StateFeedback::new(gains);
        let s = State { theta_dot: 1.5, ..State::default() };
        assert_eq!(c.torque(&s), 7.5);
    }

    #[test]
    fn wheel_angle_is_ignored() {
        let c = StateFeedback::default();
        let s = State { phi: 42.0, phi_dot: 0.5, ..State::default() };
        assert_eq!(c.torque(&s), 1000.0);
    }
}
