use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::level_filters::LevelFilter;
use tracing::error;
use tracing_subscriber::FmtSubscriber;

use segway_sim::control::StateFeedback;
use segway_sim::io::{self, RunSummary};
use segway_sim::sim::{self, event::{DivergenceDetector, TiltDetector, UprightDetector}, EventDetector, EventKind};
use segway_sim::vehicle::Coefficients;
use segway_sim::{Coupling, Sample, Scenario};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Headless two-wheeled balancing robot simulation.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Scenario file (TOML). Built-in parameters when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of steps (overrides max_time).
    #[arg(short = 'n', long)]
    steps: Option<u64>,

    /// Initial tilt in degrees.
    #[arg(short, long)]
    tilt: Option<f64>,

    /// How state components feed the equations of motion.
    #[arg(long, value_enum)]
    coupling: Option<CouplingArg>,

    /// Stop on the first non-finite state.
    #[arg(long)]
    halt_on_divergence: bool,

    /// Write the trajectory as CSV.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the run summary as JSON.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum CouplingArg {
    AsPublished,
    TiltRate,
    AsExecuted,
}

impl From<CouplingArg> for Coupling {
    fn from(c: CouplingArg) -> Self {
        match c {
            CouplingArg::AsPublished => Coupling::AsPublished,
            CouplingArg::TiltRate => Coupling::TiltRate,
            CouplingArg::AsExecuted => Coupling::AsExecuted,
        }
    }
}

impl Cli {
    fn scenario(&self) -> segway_sim::Result<Scenario> {
        let mut scenario = match &self.config {
            Some(path) => Scenario::from_file(path)?,
            None => Scenario::default(),
        };
        if let Some(n) = self.steps {
            scenario.sim.max_time = n as f64 * scenario.sim.dt;
        }
        if let Some(deg) = self.tilt {
            scenario.sim.initial_tilt_deg = deg;
        }
        if let Some(c) = self.coupling {
            scenario.sim.coupling = c.into();
        }
        scenario.sim.halt_on_divergence |= self.halt_on_divergence;
        scenario.validate()?;
        Ok(scenario)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    if let Err(e) = tracing::subscriber::set_global_default(
        FmtSubscriber::builder().with_max_level(level).finish(),
    ) {
        eprintln!("failed to install log subscriber: {e}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> segway_sim::Result<()> {
    let scenario = cli.scenario()?;

    // -----------------------------------------------------------------------
    // Run simulation
    // -----------------------------------------------------------------------
    let controller = StateFeedback::new(scenario.gains);
    let trajectory = sim::simulate_with(&scenario.segway, controller, &scenario.sim)?;
    let summary = RunSummary::from_trajectory(&trajectory)?;

    let mut detectors: Vec<Box<dyn EventDetector>> = vec![
        Box::new(TiltDetector::fallen()),
        Box::new(UprightDetector),
        Box::new(DivergenceDetector::default()),
    ];
    let events = sim::detect_events(&trajectory, &mut detectors);

    // -----------------------------------------------------------------------
    // Print results
    // -----------------------------------------------------------------------
    print_report(&scenario, &trajectory, &events, &summary);

    if let Some(path) = &cli.csv {
        io::write_trajectory_file(path, &trajectory).map_err(segway_sim::error::OutputError::from)?;
        println!("  Trajectory written to {}", path.display());
    }
    if let Some(path) = &cli.json {
        io::write_summary_file(path, &scenario, &summary)?;
        println!("  Summary written to {}", path.display());
    }

    Ok(())
}

fn print_report(scenario: &Scenario, trajectory: &[Sample], events: &[sim::SimEvent], summary: &RunSummary) {
    let s = &scenario.segway;
    let g = &scenario.gains;
    let k = Coefficients::from_segway(s);

    println!();
    println!("====================================================================");
    println!("  SEGWAY BALANCE SIMULATION");
    println!("====================================================================");
    println!();
    println!("  Vehicle Parameters");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Wheel radius:  {:>8.3} m     Wheel mass:   {:>8.1} kg",
        s.wheel_radius, s.wheel_mass
    );
    println!(
        "  Body length:   {:>8.3} m     Body mass:    {:>8.1} kg",
        s.pendulum_length, s.pendulum_mass
    );
    println!(
        "  CG offset:     {:>8.3} m     Gravity:      {:>8.2} m/s^2",
        s.pendulum_offset, s.gravity
    );
    println!(
        "  A={:.4}  B={:.4}  C={:.4}  D={:.2}  E={:.1}  F={:.2}",
        k.a, k.b, k.c, k.d, k.e, k.f
    );
    println!(
        "  Gains:         kp1={}  kd1={}  kp2={}  kd2={}",
        g.kp1, g.kd1, g.kp2, g.kd2
    );
    println!();

    println!("  Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    let upright = events.iter().filter(|e| e.kind == EventKind::UprightCrossing).count();
    for e in events {
        let label = match e.kind {
            EventKind::TiltExceeded { .. } => "FELL",
            EventKind::Diverged => "DIVERGED",
            EventKind::UprightCrossing => continue,
        };
        println!(
            "  {:<9} t={:>6.2}s   theta={:>8.2}deg   phi={:>8.2}rad",
            label,
            e.time,
            e.sample.state.theta.to_degrees(),
            e.sample.state.phi
        );
    }
    println!("  Upright crossings: {}", upright);
    println!();

    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>10}  {:>10}  {:>9}  {:>10}  {:>11}",
        "t (s)", "theta(deg)", "dtheta", "phi(rad)", "dphi", "torque(Nm)"
    );
    println!("  {}", "─".repeat(66));

    let sample_interval = (trajectory.len() / 30).max(1);
    for (i, smp) in trajectory.iter().enumerate() {
        if i % sample_interval != 0 && i != trajectory.len() - 1 {
            continue;
        }
        let x = &smp.state;
        println!(
            "  {:>7.2}  {:>10.3}  {:>10.4}  {:>9.4}  {:>10.4}  {:>11.1}",
            smp.time,
            x.theta.to_degrees(),
            x.theta_dot,
            x.phi,
            x.phi_dot,
            smp.torque
        );
    }
    println!();

    println!("  Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Initial tilt:  {:>8.2} deg   Final tilt:  {:>8.3} deg",
        summary.initial_theta.to_degrees(),
        summary.final_theta.to_degrees()
    );
    println!(
        "  Max |tilt|:    {:>8.2} deg   Max |torque|: {:>9.1} N·m",
        summary.max_abs_theta.to_degrees(),
        summary.max_abs_torque
    );
    match summary.settle_time {
        Some(t) => println!("  Settled at:    {:>8.2} s", t),
        None => println!("  Settled at:         --"),
    }
    println!("  Fell: {}   Diverged: {}", summary.fell, summary.diverged);
    println!();
    println!(
        "  Simulation: {} steps, dt={} s, coupling={:?}",
        summary.steps, scenario.sim.dt, scenario.sim.coupling
    );
    println!("====================================================================");
    println!();
}
