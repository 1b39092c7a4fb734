pub mod config;
pub mod control;
pub mod dynamics;
pub mod error;
pub mod io;
pub mod render;
pub mod sim;
pub mod vehicle;

pub use config::{Scenario, SimConfig};
pub use control::{Controller, Gains, StateFeedback};
pub use dynamics::{derivatives, state::State, Coupling, Plant};
pub use error::{Error, Result};
pub use sim::{simulate, simulate_with, RunState, Sample, Simulation};
pub use vehicle::{presets, Segway};
