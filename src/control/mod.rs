pub mod controller;
pub mod feedback;

pub use controller::{Controller, Passive};
pub use feedback::{Gains, StateFeedback};
