use std::io::{self, Write};
use std::path::Path;

use crate::sim::Sample;

/// Write trajectory data to CSV format.
///
/// Columns: time, theta, theta_dot, phi, phi_dot, torque, theta_deg
pub fn write_trajectory<W: Write>(writer: &mut W, trajectory: &[Sample]) -> io::Result<()> {
    writeln!(writer, "time,theta,theta_dot,phi,phi_dot,torque,theta_deg")?;

    for s in trajectory {
        let x = &s.state;
        writeln!(
            writer,
            "{:.4},{:.6},{:.6},{:.6},{:.6},{:.3},{:.3}",
            s.time,
            x.theta, x.theta_dot,
            x.phi, x.phi_dot,
            s.torque,
            x.theta.to_degrees(),
        )?;
    }

    Ok(())
}

/// Write trajectory to a CSV file at the given path.
pub fn write_trajectory_file(path: impl AsRef<Path>, trajectory: &[Sample]) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_trajectory(&mut file, trajectory)?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::State;

    #[test]
    fn csv_output_has_header_and_rows() {
        let traj = vec![
            Sample { time: 0.0, state: State::tilted(0.1), torque: 1200.0 },
            Sample {
                time: 0.01,
                state: State { theta: 0.09, theta_dot: -1.0, phi: 0.01, phi_dot: 0.5 },
                torque: 42.0,
            },
        ];

        let mut buf = Vec::new();
        write_trajectory(&mut buf, &traj).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("time,"));
        assert_eq!(lines.len(), 3); // header + 2 data rows
        assert_eq!(lines[1], "0.0000,0.100000,0.000000,0.000000,0.000000,1200.000,5.730");
        assert!(lines[2].starts_with("0.0100,0.090000,-1.000000,"));
    }
}
