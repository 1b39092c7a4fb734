use segway_sim::config::SimConfig;
use segway_sim::control::Controller;
use segway_sim::dynamics::{state::State, Coupling};
use segway_sim::io::RunSummary;
use segway_sim::sim;
use segway_sim::vehicle::SegwayBuilder;

/// Saturated PD on tilt only: the motor cannot exceed `max_torque`.
struct SaturatedPd {
    kp: f64,
    kd: f64,
    max_torque: f64,
}

impl Controller for SaturatedPd {
    fn torque(&self, state: &State) -> f64 {
        (self.kp * state.theta + self.kd * state.theta_dot).clamp(-self.max_torque, self.max_torque)
    }

    fn name(&self) -> &str {
        "SaturatedPd"
    }
}

fn main() {
    let segway = SegwayBuilder::new()
        .pendulum_mass(120.0)
        .wheel_mass(30.0)
        .pendulum_length(1.8)
        .pendulum_offset(0.9)
        .wheel_radius(0.3)
        .build();

    let config = SimConfig {
        dt: 0.005,
        max_time: 15.0,
        initial_tilt_deg: 15.0,
        coupling: Coupling::TiltRate,
        halt_on_divergence: true,
    };

    let controller = SaturatedPd { kp: 3000.0, kd: 600.0, max_torque: 2500.0 };

    println!("Simulating with {} controller...", controller.name());
    let trajectory = match sim::simulate_with(&segway, controller, &config) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("run aborted: {e}");
            return;
        }
    };

    let summary = match RunSummary::from_trajectory(&trajectory) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };

    println!("Max tilt: {:.2} deg", summary.max_abs_theta.to_degrees());
    println!("Final tilt: {:.4} deg", summary.final_theta.to_degrees());
    println!("Peak torque: {:.0} N·m", summary.max_abs_torque);
    match summary.settle_time {
        Some(t) => println!("Settled after {:.2} s", t),
        None => println!("Did not settle"),
    }
    println!("Trajectory points: {}", trajectory.len());
}
