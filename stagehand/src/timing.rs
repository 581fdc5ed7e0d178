//! Per-phase wall-clock timing for one orchestrator run.

use std::fmt;
use std::time::{Duration, Instant};

/// A timed phase of the deployment pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Format checks and digest comparison.
    Validate,
    /// Archive extraction into the staging directory.
    Extract,
    /// The directory swap.
    Deploy,
}

impl Phase {
    /// Label used in the outcome messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Validate => "Validate elapsed time",
            Self::Extract => "Extract archive time",
            Self::Deploy => "Deploy time",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Durations recorded during a single run.
///
/// Each phase records only its own duration. The total is measured from
/// construction, so it also covers the work between phases.
///
/// # Examples
///
/// ```
/// use stagehand::timing::{Phase, PhaseTimings};
///
/// let mut timings = PhaseTimings::start();
/// let answer = timings.time(Phase::Validate, || 42);
/// assert_eq!(answer, 42);
/// assert_eq!(timings.phases().len(), 1);
/// assert!(timings.total() >= timings.phases()[0].1);
/// ```
#[derive(Debug, Clone)]
pub struct PhaseTimings {
    started: Instant,
    phases: Vec<(Phase, Duration)>,
}

impl PhaseTimings {
    /// Begin timing a run.
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            phases: Vec::new(),
        }
    }

    /// Run `work` and record its duration under `phase`.
    pub fn time<T>(&mut self, phase: Phase, work: impl FnOnce() -> T) -> T {
        let begun = Instant::now();
        let output = work();
        self.record(phase, begun.elapsed());
        output
    }

    /// Record an externally measured duration.
    pub fn record(&mut self, phase: Phase, elapsed: Duration) {
        log::debug!("{phase}: {elapsed:?}");
        self.phases.push((phase, elapsed));
    }

    /// Recorded phases in execution order.
    #[must_use]
    pub fn phases(&self) -> &[(Phase, Duration)] {
        &self.phases
    }

    /// Elapsed time since [`PhaseTimings::start`].
    #[must_use]
    pub fn total(&self) -> Duration {
        self.started.elapsed()
    }

    /// Outcome lines: one per phase, then the total.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.phases
            .iter()
            .map(|(phase, elapsed)| format_line(phase.label(), *elapsed))
            .chain(std::iter::once(format_line(
                "Total elapsed time",
                self.total(),
            )))
            .collect()
    }
}

fn format_line(label: &str, elapsed: Duration) -> String {
    format!("{label}: {:.6} seconds", elapsed.as_secs_f64())
}
