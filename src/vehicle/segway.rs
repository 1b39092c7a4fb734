use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Segway definition (wheel + rigid pendulum body)
// ---------------------------------------------------------------------------

const fn default_wheel_radius() -> f64 {
    0.5
}
const fn default_pendulum_length() -> f64 {
    2.5
}
const fn default_pendulum_offset() -> f64 {
    1.0
}
const fn default_pendulum_mass() -> f64 {
    500.0
}
const fn default_wheel_mass() -> f64 {
    80.0
}
const fn default_gravity() -> f64 {
    9.81
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segway {
    #[serde(default = "default_wheel_radius")]
    pub wheel_radius: f64,     // r, m
    #[serde(default = "default_pendulum_length")]
    pub pendulum_length: f64,  // l, m
    #[serde(default = "default_pendulum_offset")]
    pub pendulum_offset: f64,  // a, m (axle to pendulum CG)
    #[serde(default = "default_pendulum_mass")]
    pub pendulum_mass: f64,    // m, kg
    #[serde(default = "default_wheel_mass")]
    pub wheel_mass: f64,       // M, kg
    #[serde(default = "default_gravity")]
    pub gravity: f64,          // g, m/s^2
}

impl Default for Segway {
    fn default() -> Self {
        presets::seagway()
    }
}

impl Segway {
    /// Pendulum moment of inertia about the axle: m·(a² + l²/12).
    pub fn pendulum_inertia(&self) -> f64 {
        self.pendulum_mass
            * (self.pendulum_offset.powi(2) + self.pendulum_length.powi(2) / 12.0)
    }

    /// Reject non-physical dimensions and masses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("wheel_radius", self.wheel_radius),
            ("pendulum_length", self.pendulum_length),
            ("pendulum_offset", self.pendulum_offset),
            ("pendulum_mass", self.pendulum_mass),
            ("wheel_mass", self.wheel_mass),
            ("gravity", self.gravity),
        ];
        for (field, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field: field.into(), value });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Derived coefficients of the closed-form equations of motion
// ---------------------------------------------------------------------------

/// Constant coefficients of the coupled wheel/pendulum equations.
///
/// `D - E·cos²θ` is the determinant of the mass matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub a: f64, // m·(a² + l²/12)
    pub b: f64, // m·a·r
    pub c: f64, // (m + 1.5·M)·r²
    pub d: f64, // A·C
    pub e: f64, // B²
    pub f: f64, // m·g·a
}

impl Coefficients {
    pub fn from_segway(s: &Segway) -> Self {
        let a = s.pendulum_inertia();
        let b = s.pendulum_mass * s.pendulum_offset * s.wheel_radius;
        let c = (s.pendulum_mass + 1.5 * s.wheel_mass) * s.wheel_radius.powi(2);
        Self {
            a,
            b,
            c,
            d: a * c,
            e: b * b,
            f: s.pendulum_mass * s.gravity * s.pendulum_offset,
        }
    }
}

// ---------------------------------------------------------------------------
// Segway builder
// ---------------------------------------------------------------------------

pub struct SegwayBuilder {
    segway: Segway,
}

impl SegwayBuilder {
    pub fn new() -> Self {
        Self { segway: presets::seagway() }
    }

    pub fn wheel_radius(mut self, v: f64) -> Self { self.segway.wheel_radius = v; self }
    pub fn pendulum_length(mut self, v: f64) -> Self { self.segway.pendulum_length = v; self }
    pub fn pendulum_offset(mut self, v: f64) -> Self { self.segway.pendulum_offset = v; self }
    pub fn pendulum_mass(mut self, v: f64) -> Self { self.segway.pendulum_mass = v; self }
    pub fn wheel_mass(mut self, v: f64) -> Self { self.segway.wheel_mass = v; self }
    pub fn gravity(mut self, v: f64) -> Self { self.segway.gravity = v; self }

    pub fn build(self) -> Segway {
        self.segway
    }
}

impl Default for SegwayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Preset vehicles
// ---------------------------------------------------------------------------

pub mod presets {
    use super::Segway;

    /// Heavy demonstrator: 500 kg body on a 1 m wheel.
    pub fn seagway() -> Segway {
        Segway {
            wheel_radius: 0.5,
            pendulum_length: 2.5,
            pendulum_offset: 1.0,
            pendulum_mass: 500.0,
            wheel_mass: 80.0,
            gravity: 9.81,
        }
    }
}
