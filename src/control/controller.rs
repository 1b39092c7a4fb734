use crate::dynamics::state::State;

/// Trait for wheel-torque controllers.
///
/// The integrator evaluates the controller at every RK4 stage, so
/// implementations must be pure functions of the state they are given.
/// The state passed in is the plant's coupling view (see `Coupling::view`).
pub trait Controller {
    /// Motor torque applied between wheel and pendulum, N·m.
    fn torque(&self, state: &State) -> f64;

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

impl<C: Controller + ?Sized> Controller for &C {
    fn torque(&self, state: &State) -> f64 {
        (**self).torque(state)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Open loop: zero torque everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passive;

impl Controller for Passive {
    fn torque(&self, _state: &State) -> f64 {
        0.0
    }

    fn name(&self) -> &str {
        "Passive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::StateFeedback;

    fn through_ref<C: Controller>(c: C, s: &State) -> (f64, String) {
        (c.torque(s), c.name().to_string())
    }

    #[test]
    fn borrowed_controller_delegates() {
        let c = StateFeedback::default();
        let s = State::tilted(0.1);
        assert_eq!(through_ref(&c, &s), (1200.0, "StateFeedback".to_string()));
        assert_eq!(through_ref(&Passive as &dyn Controller, &s), (0.0, "Passive".to_string()));
    }
}
