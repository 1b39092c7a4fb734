pub mod integrator;
pub mod runner;
pub mod event;

pub use runner::{simulate, simulate_with, RunState, Sample, Simulation};
pub use integrator::{rk4, rk4_step};
pub use event::{detect_events, EventDetector, EventKind, SimEvent};
