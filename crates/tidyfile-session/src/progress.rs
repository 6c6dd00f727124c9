//! Simulated progress for in-flight backend operations.
//!
//! The backend exposes no streaming progress channel, so long operations
//! advance a local percentage on wall-clock time, capped below 100, and
//! snap to 100 when the call resolves.

use std::time::{Duration, Instant};

/// Which operation the simulation is pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Analyze,
    Move,
    Search,
}

impl Phase {
    /// Percent added per tick.
    fn step(self) -> u64 {
        match self {
            Self::Analyze | Self::Move => 2,
            Self::Search => 5,
        }
    }

    /// Wall-clock length of one tick.
    fn tick(self) -> Duration {
        match self {
            Self::Analyze => Duration::from_millis(200),
            Self::Move => Duration::from_millis(100),
            Self::Search => Duration::from_millis(300),
        }
    }

    /// Ceiling until the backend call resolves.
    fn cap(self) -> u64 {
        match self {
            Self::Analyze => 90,
            Self::Move | Self::Search => 95,
        }
    }
}

/// Monotonic local progress for one operation.
#[derive(Debug, Clone)]
pub struct ProgressSim {
    phase: Phase,
    started: Instant,
    done: bool,
}

impl ProgressSim {
    /// Start pacing a freshly dispatched operation.
    pub fn start(phase: Phase) -> Self {
        Self {
            phase,
            started: Instant::now(),
            done: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current simulated percentage.
    pub fn percent(&self) -> u8 {
        self.percent_at(self.started.elapsed())
    }

    /// Percentage after `elapsed` time; 100 once finished.
    pub fn percent_at(&self, elapsed: Duration) -> u8 {
        if self.done {
            return 100;
        }
        let ticks = (elapsed.as_millis() / self.phase.tick().as_millis()) as u64;
        (ticks * self.phase.step()).min(self.phase.cap()) as u8
    }

    /// The operation resolved; snap to 100.
    pub fn finish(&mut self) {
        self.done = true;
    }
}
