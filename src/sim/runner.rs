use tracing::{info, trace, warn};

use crate::config::{Scenario, SimConfig};
use crate::control::{Controller, StateFeedback};
use crate::dynamics::state::State;
use crate::dynamics::Plant;
use crate::error::SimError;
use crate::render::{draw_segway, Layout, Renderer};
use crate::vehicle::Segway;
use super::integrator::rk4_step;

// ---------------------------------------------------------------------------
// Recorded trajectory point
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub state: State,
    pub torque: f64, // controller output at `state`
}

// ---------------------------------------------------------------------------
// Simulation loop: one RK4 step per iteration, RUNNING -> STOPPED only
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped,
}

/// Owns the state vector; the only writer of it.
pub struct Simulation<C: Controller> {
    plant: Plant,
    controller: C,
    dt: f64,
    state: State,
    steps: u64,
    run_state: RunState,
    halt_on_divergence: bool,
    diverged: bool,
}

impl<C: Controller> Simulation<C> {
    pub fn new(segway: &Segway, controller: C, config: &SimConfig) -> Self {
        Self {
            plant: Plant::with_coupling(segway, config.coupling),
            controller,
            dt: config.dt,
            state: State::tilted_deg(config.initial_tilt_deg),
            steps: 0,
            run_state: RunState::Running,
            halt_on_divergence: config.halt_on_divergence,
            diverged: false,
        }
    }

    /// Replace the initial state. Only meaningful before the first step.
    pub fn with_state(mut self, state: State) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn plant(&self) -> &Plant {
        &self.plant
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Simulated time: one `dt` per step, independent of wall-clock time.
    pub fn time(&self) -> f64 {
        self.steps as f64 * self.dt
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn sample(&self) -> Sample {
        Sample {
            time: self.time(),
            state: self.state,
            torque: self.plant.torque(&self.state, &self.controller),
        }
    }

    /// One-way transition to STOPPED.
    pub fn stop(&mut self) {
        if self.run_state == RunState::Running {
            info!(steps = self.steps, time = self.time(), "simulation stopped");
            self.run_state = RunState::Stopped;
        }
    }

    /// Advance the state by one fixed RK4 step.
    pub fn step(&mut self) -> Result<&State, SimError> {
        if !self.is_running() {
            return Err(SimError::Stopped);
        }

        self.state = rk4_step(&self.state, &self.plant, &self.controller, self.dt);
        self.steps += 1;
        trace!(step = self.steps, theta = self.state.theta, phi = self.state.phi, "step");

        if !self.diverged && !self.state.is_finite() {
            self.diverged = true;
            if self.halt_on_divergence {
                let err = SimError::Diverged { step: self.steps, time: self.time() };
                self.stop();
                return Err(err);
            }
            warn!(step = self.steps, "state became non-finite; continuing");
        }

        Ok(&self.state)
    }

    /// One loop iteration: poll close, integrate, draw, present.
    pub fn frame<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        layout: &Layout,
    ) -> Result<RunState, SimError> {
        if !self.is_running() {
            return Ok(RunState::Stopped);
        }
        if renderer.should_close() {
            self.stop();
            return Ok(RunState::Stopped);
        }

        self.step()?;

        renderer.begin_frame();
        draw_segway(renderer, &self.state, layout);
        renderer.end_frame_and_present();

        Ok(self.run_state)
    }

    /// Drive frames until the renderer asks to close or the loop is stopped.
    pub fn run<R: Renderer + ?Sized>(&mut self, renderer: &mut R, layout: &Layout) -> Result<u64, SimError> {
        while self.frame(renderer, layout)? == RunState::Running {}
        Ok(self.steps)
    }
}

// ---------------------------------------------------------------------------
// Headless runs
// ---------------------------------------------------------------------------

/// Simulate for `config.max_time` with a custom controller.
/// Returns the trajectory including the initial state.
pub fn simulate_with<C: Controller>(
    segway: &Segway,
    controller: C,
    config: &SimConfig,
) -> Result<Vec<Sample>, SimError> {
    let mut sim = Simulation::new(segway, controller, config);
    let steps = config.steps();

    let mut trajectory = Vec::with_capacity((steps as usize + 1).min(1_000_000));
    trajectory.push(sim.sample());

    while sim.steps() < steps {
        sim.step()?;
        trajectory.push(sim.sample());
    }
    sim.stop();

    Ok(trajectory)
}

/// Simulate a scenario with its state-feedback gains.
pub fn simulate(scenario: &Scenario) -> Result<Vec<Sample>, SimError> {
    simulate_with(&scenario.segway, StateFeedback::new(scenario.gains), &scenario.sim)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::Coupling;
    use crate::render::tests::{Cmd, Recorder};
    use crate::vehicle::presets;
    use std::f64::consts::PI;

    fn config(steps: u64) -> SimConfig {
        SimConfig { max_time: steps as f64 * 0.01, ..SimConfig::default() }
    }

    #[test]
    fn tilt_stays_bounded_from_70_degrees() {
        let traj = simulate_with(&presets::seagway(), StateFeedback::default(), &config(2000)).unwrap();
        assert_eq!(traj.len(), 2001);
        for s in &traj {
            assert!(s.state.is_finite());
            assert!(s.state.theta.abs() < PI, "theta = {} at t={:.2}", s.state.theta, s.time);
        }
    }

    #[test]
    fn tilt_rate_coupling_balances() {
        let cfg = SimConfig { coupling: Coupling::TiltRate, ..config(2000) };
        let traj = simulate_with(&presets::seagway(), StateFeedback::default(), &cfg).unwrap();
        let last = traj.last().unwrap();
        assert!(last.state.theta.abs() < 1e-2, "final theta = {}", last.state.theta);
    }

    #[test]
    fn as_executed_coupling_settles_upright_at_origin() {
        let cfg = SimConfig { coupling: Coupling::AsExecuted, ..config(2000) };
        let traj = simulate_with(&presets::seagway(), StateFeedback::default(), &cfg).unwrap();

        let max_tilt = traj.iter().map(|s| s.state.theta.abs()).fold(0.0_f64, f64::max);
        assert!(max_tilt < 1.25, "max theta = {}", max_tilt);

        let last = traj.last().unwrap();
        assert!(last.state.theta.abs() < 1e-4, "final theta = {}", last.state.theta);
        assert!(last.state.phi.abs() < 1e-4, "final phi = {}", last.state.phi);
        assert!(last.torque.abs() < 1.0, "final torque = {}", last.torque);
    }

    #[test]
    fn runs_are_bit_identical() {
        let a = simulate(&Scenario::default()).unwrap();
        let b = simulate(&Scenario::default()).unwrap();
        assert_eq!(a.last(), b.last());
    }

    #[test]
    fn upright_rest_never_moves() {
        let cfg = SimConfig { initial_tilt_deg: 0.0, ..config(100) };
        let traj = simulate_with(&presets::seagway(), StateFeedback::default(), &cfg).unwrap();
        assert!(traj.iter().all(|s| s.state == State::default() && s.torque == 0.0));
    }

    #[test]
    fn time_advances_one_dt_per_step() {
        let mut sim = Simulation::new(&presets::seagway(), StateFeedback::default(), &SimConfig::default());
        for _ in 0..250 {
            sim.step().unwrap();
        }
        assert_eq!(sim.steps(), 250);
        assert!((sim.time() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn stop_is_one_way() {
        let mut sim = Simulation::new(&presets::seagway(), StateFeedback::default(), &SimConfig::default());
        sim.step().unwrap();
        sim.stop();
        assert_eq!(sim.run_state(), RunState::Stopped);
        assert_eq!(sim.step().unwrap_err(), SimError::Stopped);
        sim.stop();
        assert!(!sim.is_running());
        assert_eq!(sim.steps(), 1);
    }

    #[test]
    fn frame_steps_then_draws() {
        let mut sim = Simulation::new(&presets::seagway(), StateFeedback::default(), &SimConfig::default());
        let mut r = Recorder::default();
        let rs = sim.frame(&mut r, &Layout::default()).unwrap();
        assert_eq!(rs, RunState::Running);
        assert_eq!(sim.steps(), 1);
        assert_eq!(r.cmds.first(), Some(&Cmd::Begin));
        assert_eq!(r.cmds.last(), Some(&Cmd::Present));
        assert_eq!(r.cmds.len(), 6);
    }

    #[test]
    fn window_close_stops_loop() {
        let mut sim = Simulation::new(&presets::seagway(), StateFeedback::default(), &SimConfig::default());
        let mut r = Recorder { close_after: Some(25), ..Recorder::default() };
        let steps = sim.run(&mut r, &Layout::default()).unwrap();
        assert_eq!(steps, 25);
        assert_eq!(r.frames, 25);
        assert_eq!(sim.run_state(), RunState::Stopped);
        // No further frames once stopped
        assert_eq!(sim.frame(&mut r, &Layout::default()).unwrap(), RunState::Stopped);
        assert_eq!(r.frames, 25);
    }

    /// Torque that blows up as soon as the wheel moves.
    struct Runaway;

    impl Controller for Runaway {
        fn torque(&self, state: &State) -> f64 {
            if state.phi_dot != 0.0 { f64::INFINITY } else { 0.0 }
        }
    }

    #[test]
    fn divergence_is_carried_forward_by_default() {
        let mut sim = Simulation::new(&presets::seagway(), Runaway, &config(10)).with_state(State::tilted(0.7));
        for _ in 0..10 {
            sim.step().unwrap();
        }
        assert!(!sim.state().is_finite());
        assert!(sim.is_running());
    }

    #[test]
    fn divergence_halts_when_requested() {
        let cfg = SimConfig { halt_on_divergence: true, ..config(10) };
        let mut sim = Simulation::new(&presets::seagway(), Runaway, &cfg).with_state(State::tilted(0.7));
        let err = sim.step().unwrap_err();
        assert_eq!(err, SimError::Diverged { step: 1, time: 0.01 });
        assert_eq!(sim.run_state(), RunState::Stopped);
    }
}
