use thiserror::Error;

/// Top-level error type for segway-sim.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid dt: {0} (must be > 0)")]
    InvalidDt(f64),

    #[error("Invalid max_time: {0} (must be > 0)")]
    InvalidMaxTime(f64),

    #[error("Invalid value for {field}: {value} (must be finite and > 0)")]
    NonPositive { field: String, value: f64 },

    #[error("Invalid value for {field}: {value} (must be finite)")]
    NonFinite { field: String, value: f64 },

    #[error("Mass matrix is singular at initial tilt {theta} rad")]
    SingularMassMatrix { theta: f64 },
}

/// Simulation runtime errors.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SimError {
    #[error("State diverged at step {step} (t={time:.3}s): non-finite value")]
    Diverged { step: u64, time: f64 },

    #[error("Simulation is stopped")]
    Stopped,
}

/// Trajectory/summary export errors.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Trajectory is empty")]
    EmptyTrajectory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_from_config_error() {
        let err: Error = ConfigError::InvalidDt(-1.0).into();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("-1"));
    }

    #[test]
    fn error_from_sim_error() {
        let err: Error = SimError::Diverged { step: 12, time: 0.12 }.into();
        assert!(matches!(err, Error::Simulation(_)));
        assert!(err.to_string().contains("step 12"));
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let config_err: ConfigError = io_err.into();
        assert!(matches!(config_err, ConfigError::Io(_)));
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            ConfigError::InvalidDt(0.0).to_string(),
            "Invalid dt: 0 (must be > 0)"
        );
        assert_eq!(
            ConfigError::NonPositive { field: "gravity".into(), value: -9.81 }.to_string(),
            "Invalid value for gravity: -9.81 (must be finite and > 0)"
        );
        assert_eq!(SimError::Stopped.to_string(), "Simulation is stopped");
        assert_eq!(
            OutputError::EmptyTrajectory.to_string(),
            "Trajectory is empty"
        );
    }
}
