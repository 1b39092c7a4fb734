use super::runner::Sample;

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

/// Kinds of simulation events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// |theta| reached the threshold (rad).
    TiltExceeded { threshold: f64 },
    /// Pendulum swung through vertical.
    UprightCrossing,
    /// First non-finite state.
    Diverged,
}

/// A discrete event that occurred during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    pub time: f64,
    pub kind: EventKind,
    pub sample: Sample,
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive samples and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &Sample, current: &Sample) -> Option<EventKind>;
}

/// Fires once when |theta| first reaches `threshold`.
pub struct TiltDetector {
    pub threshold: f64,
    fired: bool,
}

impl TiltDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold, fired: false }
    }

    /// Lying flat: 90 degrees.
    pub fn fallen() -> Self {
        Self::new(std::f64::consts::FRAC_PI_2)
    }
}

impl EventDetector for TiltDetector {
    fn check(&mut self, prev: &Sample, current: &Sample) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        if prev.state.theta.abs() < self.threshold && current.state.theta.abs() >= self.threshold {
            self.fired = true;
            Some(EventKind::TiltExceeded { threshold: self.threshold })
        } else {
            None
        }
    }
}

/// Fires every time theta changes sign.
pub struct UprightDetector;

impl EventDetector for UprightDetector {
    fn check(&mut self, prev: &Sample, current: &Sample) -> Option<EventKind> {
        let (a, b) = (prev.state.theta, current.state.theta);
        if (a > 0.0 && b <= 0.0) || (a < 0.0 && b >= 0.0) {
            Some(EventKind::UprightCrossing)
        } else {
            None
        }
    }
}

#[derive(Default)]
pub struct DivergenceDetector {
    fired: bool,
}

impl EventDetector for DivergenceDetector {
    fn check(&mut self, _prev: &Sample, current: &Sample) -> Option<EventKind> {
        if !self.fired && !current.state.is_finite() {
            self.fired = true;
            Some(EventKind::Diverged)
        } else {
            None
        }
    }
}

/// Scan a recorded trajectory with a set of detectors, in time order.
pub fn detect_events(trajectory: &[Sample], detectors: &mut [Box<dyn EventDetector>]) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for pair in trajectory.windows(2) {
        for det in detectors.iter_mut() {
            if let Some(kind) = det.check(&pair[0], &pair[1]) {
                events.push(SimEvent { time: pair[1].time, kind, sample: pair[1] });
            }
        }
    }
    events
}
