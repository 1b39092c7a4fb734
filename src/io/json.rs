use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::config::Scenario;
use crate::error::OutputError;
use crate::sim::Sample;

/// Summary statistics computed from a balancing run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub steps: usize,
    pub sim_time: f64,
    pub initial_theta: f64,
    pub final_theta: f64,
    pub final_phi: f64,
    pub max_abs_theta: f64,
    pub max_abs_torque: f64,
    /// First time after which |theta| and |theta_dot| stay within tolerance.
    pub settle_time: Option<f64>,
    pub fell: bool,
    pub diverged: bool,
}

impl RunSummary {
    pub const SETTLE_TOLERANCE: f64 = 1e-2;

    /// Compute summary from trajectory data.
    pub fn from_trajectory(trajectory: &[Sample]) -> Result<Self, OutputError> {
        let (first, last) = match (trajectory.first(), trajectory.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Err(OutputError::EmptyTrajectory),
        };

        let max_abs_theta = trajectory
            .iter()
            .map(|s| s.state.theta.abs())
            .fold(0.0_f64, f64::max);

        let max_abs_torque = trajectory
            .iter()
            .map(|s| s.torque.abs())
            .fold(0.0_f64, f64::max);

        let settled = |s: &Sample| {
            s.state.theta.abs() < Self::SETTLE_TOLERANCE
                && s.state.theta_dot.abs() < Self::SETTLE_TOLERANCE
        };
        let settle_time = match trajectory.iter().rposition(|s| !settled(s)) {
            None => Some(first.time),
            Some(i) if i + 1 < trajectory.len() => Some(trajectory[i + 1].time),
            Some(_) => None,
        };

        Ok(RunSummary {
            steps: trajectory.len() - 1,
            sim_time: last.time,
            initial_theta: first.state.theta,
            final_theta: last.state.theta,
            final_phi: last.state.phi,
            max_abs_theta,
            max_abs_torque,
            settle_time,
            fell: max_abs_theta >= std::f64::consts::FRAC_PI_2,
            diverged: trajectory.iter().any(|s| !s.state.is_finite()),
        })
    }
}

#[derive(Serialize)]
struct Report<'a> {
    scenario: &'a Scenario,
    performance: &'a RunSummary,
}

/// Write scenario and run summary as JSON to a writer.
pub fn write_summary<W: Write>(
    writer: &mut W,
    scenario: &Scenario,
    summary: &RunSummary,
) -> Result<(), OutputError> {
    let report = Report { scenario, performance: summary };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

/// Write summary JSON to a file.
pub fn write_summary_file(
    path: impl AsRef<Path>,
    scenario: &Scenario,
    summary: &RunSummary,
) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, scenario, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::State;

    fn sample(time: f64, theta: f64, theta_dot: f64) -> Sample {
        Sample {
            time,
            state: State { theta, theta_dot, ..State::default() },
            torque: 12_000.0 * theta,
        }
    }

    fn simple_trajectory() -> Vec<Sample> {
        vec![
            sample(0.0, 0.5, 0.0),
            sample(1.0, -0.2, 1.0),
            sample(2.0, 0.005, 0.001),
            sample(3.0, 0.001, 0.0),
        ]
    }

    #[test]
    fn summary_computes_extremes() {
        let s = RunSummary::from_trajectory(&simple_trajectory()).unwrap();
        assert_eq!(s.steps, 3);
        assert!((s.max_abs_theta - 0.5).abs() < 1e-12);
        assert!((s.max_abs_torque - 6000.0).abs() < 1e-9);
        assert_eq!(s.settle_time, Some(2.0));
        assert!(!s.fell);
        assert!(!s.diverged);
    }

    #[test]
    fn unsettled_run_has_no_settle_time() {
        let mut traj = simple_trajectory();
        traj.push(sample(4.0, 1.7, 0.0));
        let s = RunSummary::from_trajectory(&traj).unwrap();
        assert_eq!(s.settle_time, None);
        assert!(s.fell);
    }

    #[test]
    fn empty_trajectory_is_an_error() {
        assert!(matches!(
            RunSummary::from_trajectory(&[]),
            Err(OutputError::EmptyTrajectory)
        ));
    }

    #[test]
    fn json_output_is_valid() {
        let summary = RunSummary::from_trajectory(&simple_trajectory()).unwrap();
        let mut buf = Vec::new();
        write_summary(&mut buf, &Scenario::default(), &summary).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["performance"]["steps"], 3);
        assert_eq!(value["performance"]["settle_time"], 2.0);
        assert_eq!(value["scenario"]["sim"]["coupling"], "as_published");
        assert_eq!(value["scenario"]["gains"]["kp1"], 12000.0);
    }
}
