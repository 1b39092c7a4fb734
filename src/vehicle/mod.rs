pub mod segway;

pub use segway::{presets, Coefficients, Segway, SegwayBuilder};
