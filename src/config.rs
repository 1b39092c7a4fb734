use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::control::Gains;
use crate::dynamics::{Coupling, Plant};
use crate::error::ConfigError;
use crate::vehicle::Segway;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_dt() -> f64 {
    0.01
}
const fn default_max_time() -> f64 {
    20.0
}
const fn default_initial_tilt_deg() -> f64 {
    70.0
}

// ---------------------------------------------------------------------------
// SimConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Simulated time per step (and per rendered frame), s.
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Headless run length, s.
    #[serde(default = "default_max_time")]
    pub max_time: f64,
    #[serde(default = "default_initial_tilt_deg")]
    pub initial_tilt_deg: f64,
    #[serde(default)]
    pub coupling: Coupling,
    /// Stop with an error on the first non-finite state instead of
    /// carrying it forward.
    #[serde(default)]
    pub halt_on_divergence: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: default_dt(),
            max_time: default_max_time(),
            initial_tilt_deg: default_initial_tilt_deg(),
            coupling: Coupling::default(),
            halt_on_divergence: false,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::InvalidDt(self.dt));
        }
        if !(self.max_time.is_finite() && self.max_time > 0.0) {
            return Err(ConfigError::InvalidMaxTime(self.max_time));
        }
        if !self.initial_tilt_deg.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "initial_tilt_deg".into(),
                value: self.initial_tilt_deg,
            });
        }
        Ok(())
    }

    /// Number of fixed steps covering `max_time`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn steps(&self) -> u64 {
        (self.max_time / self.dt).round() as u64
    }
}

// ---------------------------------------------------------------------------
// Scenario: everything needed for one run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub segway: Segway,
    #[serde(default)]
    pub gains: Gains,
    #[serde(default)]
    pub sim: SimConfig,
}

impl Scenario {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.segway.validate()?;
        self.gains.validate()?;
        self.sim.validate()?;

        let theta = self.sim.initial_tilt_deg.to_radians();
        let plant = Plant::new(&self.segway);
        if plant.mass_matrix_det(theta).abs() <= f64::EPSILON * plant.coefficients().d {
            return Err(ConfigError::SingularMassMatrix { theta });
        }
        Ok(())
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let scenario: Self = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_builtin_run() {
        let s = Scenario::from_toml("").unwrap();
        assert_eq!(s, Scenario::default());
        assert_eq!(s.sim.dt, 0.01);
        assert_eq!(s.sim.steps(), 2000);
        assert_eq!(s.gains.kd2, 2000.0);
        assert_eq!(s.segway.pendulum_mass, 500.0);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let toml_str = r#"
            [segway]
            wheel_mass = 40.0

            [gains]
            kp1 = 9000.0

            [sim]
            initial_tilt_deg = 10.0
            coupling = "tilt_rate"
            halt_on_divergence = true
        "#;
        let s = Scenario::from_toml(toml_str).unwrap();
        assert_eq!(s.segway.wheel_mass, 40.0);
        assert_eq!(s.segway.wheel_radius, 0.5);
        assert_eq!(s.gains.kp1, 9000.0);
        assert_eq!(s.gains.kd1, 2500.0);
        assert_eq!(s.sim.coupling, Coupling::TiltRate);
        assert!(s.sim.halt_on_divergence);
        assert_eq!(s.sim.max_time, 20.0);
    }

    #[test]
    fn rejects_bad_dt() {
        let err = Scenario::from_toml("[sim]\ndt = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDt(_)));
    }

    #[test]
    fn rejects_non_finite_tilt() {
        let mut s = Scenario::default();
        s.sim.initial_tilt_deg = f64::NAN;
        let err = s.validate().unwrap_err();
        assert!(matches!(err, ConfigError::NonFinite { ref field, .. } if field == "initial_tilt_deg"));

        s.sim.initial_tilt_deg = f64::INFINITY;
        assert!(s.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_gain() {
        let err = Scenario::from_toml("[gains]\nkd2 = inf\n").unwrap_err();
        assert!(matches!(err, ConfigError::NonFinite { ref field, .. } if field == "kd2"));

        let mut s = Scenario::default();
        s.gains.kp1 = f64::NAN;
        assert!(s.validate().is_err());
        // Sign is free: zero and negative gains are valid.
        s.gains.kp1 = -1.0;
        s.gains.kd1 = 0.0;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn rejects_negative_mass() {
        let err = Scenario::from_toml("[segway]\npendulum_mass = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { ref field, .. } if field == "pendulum_mass"));
    }

    #[test]
    fn rejects_unknown_coupling() {
        let err = Scenario::from_toml("[sim]\ncoupling = \"sideways\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn bundled_scenario_matches_builtin() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/seagway.toml");
        assert_eq!(Scenario::from_file(path).unwrap(), Scenario::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Scenario::from_file("/nonexistent/segway.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
