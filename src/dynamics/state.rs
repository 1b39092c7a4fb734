use nalgebra::Vector4;

// ---------------------------------------------------------------------------
// Segway state: pendulum tilt and wheel rotation
// ---------------------------------------------------------------------------

/// Full state vector at a single point in time.
/// Tilt is measured from the upright vertical, positive to screen-right.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct State {
    pub theta: f64,     // rad, pendulum tilt
    pub theta_dot: f64, // rad/s
    pub phi: f64,       // rad, wheel rotation
    pub phi_dot: f64,   // rad/s
}

impl State {
    /// Motionless state tilted by `theta` radians.
    pub fn tilted(theta: f64) -> Self {
        Self { theta, ..Self::default() }
    }

    /// Motionless state tilted by `degrees`.
    pub fn tilted_deg(degrees: f64) -> Self {
        Self::tilted(degrees.to_radians())
    }

    pub fn to_vector(&self) -> Vector4<f64> {
        Vector4::new(self.theta, self.theta_dot, self.phi, self.phi_dot)
    }

    pub fn from_vector(x: &Vector4<f64>) -> Self {
        Self { theta: x[0], theta_dot: x[1], phi: x[2], phi_dot: x[3] }
    }

    pub fn is_finite(&self) -> bool {
        self.theta.is_finite()
            && self.theta_dot.is_finite()
            && self.phi.is_finite()
            && self.phi_dot.is_finite()
    }
}

// ---------------------------------------------------------------------------
// State derivative
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Deriv {
    pub dtheta: f64,
    pub dtheta_dot: f64, // pendulum angular acceleration
    pub dphi: f64,
    pub dphi_dot: f64,   // wheel angular acceleration
}

impl Deriv {
    pub fn to_vector(&self) -> Vector4<f64> {
        Vector4::new(self.dtheta, self.dtheta_dot, self.dphi, self.dphi_dot)
    }
}
