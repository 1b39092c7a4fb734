use nalgebra::SVector;

use crate::control::Controller;
use crate::dynamics::{self, state::State, Plant};

// ---------------------------------------------------------------------------
// Classical 4th-order Runge-Kutta integrator
// ---------------------------------------------------------------------------

/// Single fixed-size RK4 step of `dx/dt = f(x)`.
pub fn rk4<const N: usize, F>(x: &SVector<f64, N>, dt: f64, f: F) -> SVector<f64, N>
where
    F: Fn(&SVector<f64, N>) -> SVector<f64, N>,
{
    let k1 = f(x);
    let k2 = f(&(x + k1 * (dt / 2.0)));
    let k3 = f(&(x + k2 * (dt / 2.0)));
    let k4 = f(&(x + k3 * dt));

    x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
}

/// Single RK4 step of the closed-loop segway: the controller is
/// re-evaluated at each of the four stage points.
pub fn rk4_step<C: Controller + ?Sized>(state: &State, plant: &Plant, controller: &C, dt: f64) -> State {
    let next = rk4(&state.to_vector(), dt, |x| {
        dynamics::derivatives(&State::from_vector(x), plant, controller).to_vector()
    });
    State::from_vector(&next)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
