pub mod state;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::control::Controller;
use crate::vehicle::{Coefficients, Segway};
use state::{Deriv, State};

// ---------------------------------------------------------------------------
// Plant: coefficients fixed for the lifetime of a run
// ---------------------------------------------------------------------------

/// How the state components feed the equations of motion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coupling {
    /// `dθ/dt = φ̇`, the mapping of the published equations.
    #[default]
    AsPublished,
    /// `dθ/dt = θ̇`, everything else as published.
    TiltRate,
    /// State read positionally as `(θ, φ, θ̇, φ̇)`: tilt rate and wheel angle
    /// trade places in every term. Gives `dθ/dt = θ̇`, a `B·θ̇²·sinθ`
    /// centripetal term, and a controller that sees `φ` where it reads `θ̇`.
    AsExecuted,
}

impl Coupling {
    /// State as seen by the equations and the controller.
    pub fn view(self, state: &State) -> State {
        match self {
            Coupling::AsPublished | Coupling::TiltRate => *state,
            Coupling::AsExecuted => State {
                theta_dot: state.phi,
                phi: state.theta_dot,
                ..*state
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Plant {
    coeffs: Coefficients,
    coupling: Coupling,
}

impl Plant {
    pub fn new(segway: &Segway) -> Self {
        Self::with_coupling(segway, Coupling::default())
    }

    pub fn with_coupling(segway: &Segway, coupling: Coupling) -> Self {
        let coeffs = Coefficients::from_segway(segway);
        debug!(?coeffs, ?coupling, "plant coefficients");
        Self { coeffs, coupling }
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coeffs
    }

    pub fn coupling(&self) -> Coupling {
        self.coupling
    }

    /// Motor torque commanded by `controller` at `state` under this coupling.
    pub fn torque<C: Controller + ?Sized>(&self, state: &State, controller: &C) -> f64 {
        controller.torque(&self.coupling.view(state))
    }

    /// Mass-matrix determinant `D - E·cos²θ`. Zero is a kinematic singularity.
    pub fn mass_matrix_det(&self, theta: f64) -> f64 {
        let cos = theta.cos();
        self.coeffs.d - self.coeffs.e * cos * cos
    }
}

// ---------------------------------------------------------------------------
// Equations of motion (wheel + pendulum, Euler-Lagrange closed form)
// ---------------------------------------------------------------------------

/// Compute state derivatives with the controller evaluated at `state`.
///
/// No guard on the determinant: near a singular tilt the accelerations
/// become huge or non-finite and are returned as-is.
pub fn derivatives<C: Controller + ?Sized>(state: &State, plant: &Plant, controller: &C) -> Deriv {
    let k = &plant.coeffs;
    let torque = plant.torque(state, controller);

    let (dtheta, spin) = match plant.coupling {
        Coupling::AsPublished => (state.phi_dot, state.phi_dot),
        Coupling::TiltRate => (state.theta_dot, state.phi_dot),
        Coupling::AsExecuted => (state.theta_dot, state.theta_dot),
    };

    let (sin, cos) = state.theta.sin_cos();
    let gravity = k.f * sin - torque;
    let coupling = k.b * cos * (torque + k.b * spin * spin * sin);
    let det = k.d - k.e * cos * cos;

    Deriv {
        dtheta,
        dtheta_dot: (k.c * gravity - coupling) / det,
        dphi: state.phi_dot,
        dphi_dot: (k.a * gravity - coupling) / det,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
