//! Runtime Metrics & Instrumentation
//!
//! Lightweight counters and a frame-budget monitor for the stability rule
//! system. All evaluation paths also emit `tracing` events; these counters
//! are for dashboards and budget checks.
//!
//! Design: lock-free `AtomicU64` counters on the hot path. The frame
//! window sits behind a `parking_lot::Mutex`, touched once per frame.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

use crate::behavior::TickReport;
use crate::resolver::ResolutionOutcome;
use crate::rules::{Evaluation, FiredRule};

// ---------------------------------------------------------------------------
// Global Counters (lock-free)
// ---------------------------------------------------------------------------

/// Atomic counters for high-frequency events.
pub struct StabilityCounters {
    /// Rule chain evaluations run.
    pub evaluations: AtomicU64,
    /// ShelteredByStone firings.
    pub sheltered_fired: AtomicU64,
    /// Agoraphobia firings.
    pub agoraphobia_fired: AtomicU64,
    /// Claustrophobia firings.
    pub claustrophobia_fired: AtomicU64,
    /// Resolution attempts made while pending, including attempts with no
    /// class assigned yet.
    pub resolution_attempts: AtomicU64,
    /// Entities resolved with at least one trait.
    pub resolved_with_traits: AtomicU64,
    /// Entities resolved with no stability trait.
    pub resolved_empty: AtomicU64,
    /// Entity ticks aborted by a collaborator failure.
    pub collaborator_failures: AtomicU64,
}

impl StabilityCounters {
    /// Create a new set of zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            evaluations: AtomicU64::new(0),
            sheltered_fired: AtomicU64::new(0),
            agoraphobia_fired: AtomicU64::new(0),
            claustrophobia_fired: AtomicU64::new(0),
            resolution_attempts: AtomicU64::new(0),
            resolved_with_traits: AtomicU64::new(0),
            resolved_empty: AtomicU64::new(0),
            collaborator_failures: AtomicU64::new(0),
        }
    }

    /// Count one evaluation and the rule it fired, if any.
    pub fn record_evaluation(&self, evaluation: &Evaluation) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        let counter = match evaluation.fired {
            Some(FiredRule::ShelteredByStone { .. }) => &self.sheltered_fired,
            Some(FiredRule::Agoraphobia { .. }) => &self.agoraphobia_fired,
            Some(FiredRule::Claustrophobia { .. }) => &self.claustrophobia_fired,
            None => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a completed resolution.
    pub fn record_resolution(&self, outcome: ResolutionOutcome) {
        if let ResolutionOutcome::Resolved(traits) = outcome {
            let counter = if traits.is_empty() {
                &self.resolved_empty
            } else {
                &self.resolved_with_traits
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Count everything one entity tick reported.
    pub fn record_tick(&self, report: &TickReport) {
        if report.resolution_attempted {
            self.resolution_attempts.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(traits) = report.newly_resolved {
            self.record_resolution(ResolutionOutcome::Resolved(traits));
        }
        if let Some(evaluation) = report.evaluation.as_ref() {
            self.record_evaluation(evaluation);
        }
    }

    /// Count an entity tick skipped because a collaborator failed.
    pub fn record_failure(&self) {
        self.collaborator_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot all counters for export.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            evaluations: self.evaluations.load(Ordering::Relaxed),
            fired: [
                self.sheltered_fired.load(Ordering::Relaxed),
                self.agoraphobia_fired.load(Ordering::Relaxed),
                self.claustrophobia_fired.load(Ordering::Relaxed),
            ],
            resolution_attempts: self.resolution_attempts.load(Ordering::Relaxed),
            resolved_with_traits: self.resolved_with_traits.load(Ordering::Relaxed),
            resolved_empty: self.resolved_empty.load(Ordering::Relaxed),
            collaborator_failures: self.collaborator_failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for StabilityCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// A snapshot of counter values at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Rule chain evaluations run.
    pub evaluations: u64,
    /// Firings by rule [sheltered, agoraphobia, claustrophobia].
    pub fired: [u64; 3],
    /// Resolution attempts.
    pub resolution_attempts: u64,
    /// Entities resolved with traits.
    pub resolved_with_traits: u64,
    /// Entities resolved with no stability trait.
    pub resolved_empty: u64,
    /// Entity ticks aborted by collaborator failures.
    pub collaborator_failures: u64,
}

impl CounterSnapshot {
    /// Format as Prometheus-compatible text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP tstab_evaluations_total Rule chain evaluations\n\
             # TYPE tstab_evaluations_total counter\n\
             tstab_evaluations_total {}\n\
             # HELP tstab_rule_fired_total Rule firings by trait\n\
             # TYPE tstab_rule_fired_total counter\n\
             tstab_rule_fired_total{{rule=\"sheltered_by_stone\"}} {}\n\
             tstab_rule_fired_total{{rule=\"agoraphobia\"}} {}\n\
             tstab_rule_fired_total{{rule=\"claustrophobia\"}} {}\n\
             # HELP tstab_resolution_attempts_total Trait resolution attempts\n\
             # TYPE tstab_resolution_attempts_total counter\n\
             tstab_resolution_attempts_total {}\n\
             # HELP tstab_resolved_total Completed trait resolutions\n\
             # TYPE tstab_resolved_total counter\n\
             tstab_resolved_total{{traits=\"some\"}} {}\n\
             tstab_resolved_total{{traits=\"none\"}} {}\n\
             # HELP tstab_collaborator_failures_total Entity ticks skipped on collaborator failure\n\
             # TYPE tstab_collaborator_failures_total counter\n\
             tstab_collaborator_failures_total {}\n",
            self.evaluations,
            self.fired[0],
            self.fired[1],
            self.fired[2],
            self.resolution_attempts,
            self.resolved_with_traits,
            self.resolved_empty,
            self.collaborator_failures,
        )
    }
}

// ---------------------------------------------------------------------------
// Frame Budget Monitor
// ---------------------------------------------------------------------------

/// Tracks per-frame time spent ticking stability behaviors.
///
/// Keeps a rolling window of the most recent [`FrameBudgetMonitor::WINDOW`]
/// frames. Usage:
/// ```rust,no_run
/// # use tstab_core::metrics::FrameBudgetMonitor;
/// let monitor = FrameBudgetMonitor::new(0.5); // 0.5ms budget
/// let guard = monitor.begin_frame();
/// // ... tick every entity ...
/// drop(guard);
/// assert!(monitor.stats().last_ms < 0.5);
/// ```
pub struct FrameBudgetMonitor {
    budget_ms: f64,
    window: Mutex<FrameWindow>,
}

#[derive(Default)]
struct FrameWindow {
    recent: VecDeque<f64>,
    frames: u64,
    over_budget: u64,
}

/// Timing summary over the rolling window (milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    /// Most recent frame.
    pub last_ms: f64,
    /// Median of the window.
    pub median_ms: f64,
    /// Slowest frame in the window.
    pub max_ms: f64,
    /// Frames over budget since the monitor was created.
    pub over_budget_frames: u64,
}

impl FrameBudgetMonitor {
    /// Frames kept for the median and max.
    pub const WINDOW: usize = 256;

    /// Create a new monitor with the given budget (milliseconds).
    #[must_use]
    pub fn new(budget_ms: f64) -> Self {
        Self {
            budget_ms,
            window: Mutex::new(FrameWindow {
                recent: VecDeque::with_capacity(Self::WINDOW),
                ..FrameWindow::default()
            }),
        }
    }

    /// Begin timing a frame. The guard records elapsed time on drop.
    pub fn begin_frame(&self) -> FrameGuard<'_> {
        FrameGuard {
            monitor: self,
            start: Instant::now(),
        }
    }

    /// Record a frame timing (milliseconds).
    pub fn record(&self, ms: f64) {
        let mut w = self.window.lock();
        if w.recent.len() == Self::WINDOW {
            w.recent.pop_front();
        }
        w.recent.push_back(ms);
        w.frames += 1;
        if ms > self.budget_ms {
            w.over_budget += 1;
        }
    }

    /// Whether the most recent frame exceeded the budget.
    #[must_use]
    pub fn is_over_budget(&self) -> bool {
        self.window
            .lock()
            .recent
            .back()
            .is_some_and(|&ms| ms > self.budget_ms)
    }

    /// Summarize the rolling window.
    #[must_use]
    pub fn stats(&self) -> FrameStats {
        let w = self.window.lock();
        let Some(&last_ms) = w.recent.back() else {
            return FrameStats::default();
        };
        let mut sorted: Vec<f64> = w.recent.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);
        FrameStats {
            last_ms,
            median_ms: sorted[sorted.len() / 2],
            max_ms: sorted[sorted.len() - 1],
            over_budget_frames: w.over_budget,
        }
    }

    /// Total number of frames recorded.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.window.lock().frames
    }

    /// The configured budget in milliseconds.
    #[must_use]
    pub fn budget_ms(&self) -> f64 {
        self.budget_ms
    }
}

/// Records the elapsed frame time into its monitor when dropped.
pub struct FrameGuard<'a> {
    monitor: &'a FrameBudgetMonitor,
    start: Instant,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.monitor
            .record(self.start.elapsed().as_secs_f64() * 1000.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::EvaluationTrace;
    use crate::traits::{StabilityTrait, TraitSet};

    fn evaluation(fired: Option<FiredRule>) -> Evaluation {
        Evaluation {
            before: 0.0,
            after: 0.0,
            fired,
            trace: EvaluationTrace::default(),
        }
    }

    #[test]
    fn counters_default_zero() {
        let snap = StabilityCounters::new().snapshot();
        assert_eq!(snap.evaluations, 0);
        assert_eq!(snap.fired, [0, 0, 0]);
    }

    #[test]
    fn evaluations_are_bucketed_by_rule() {
        let c = StabilityCounters::new();
        c.record_evaluation(&evaluation(None));
        c.record_evaluation(&evaluation(Some(FiredRule::Claustrophobia { cave_loss: 1.5 })));
        c.record_evaluation(&evaluation(Some(FiredRule::ShelteredByStone {
            kept_existing_gain: false,
        })));

        let snap = c.snapshot();
        assert_eq!(snap.evaluations, 3);
        assert_eq!(snap.fired, [1, 0, 1]);
    }

    #[test]
    fn resolutions_split_by_emptiness() {
        let c = StabilityCounters::new();
        c.record_resolution(ResolutionOutcome::Pending);
        c.record_resolution(ResolutionOutcome::Resolved(TraitSet::EMPTY));
        c.record_resolution(ResolutionOutcome::Resolved(
            [StabilityTrait::Agoraphobia].into_iter().collect(),
        ));

        let snap = c.snapshot();
        assert_eq!(snap.resolved_empty, 1);
        assert_eq!(snap.resolved_with_traits, 1);
    }

    #[test]
    fn classless_attempt_counts_without_resolving() {
        let c = StabilityCounters::new();
        c.record_tick(&TickReport {
            resolution_attempted: true,
            ..TickReport::default()
        });
        let snap = c.snapshot();
        assert_eq!(snap.resolution_attempts, 1);
        assert_eq!(snap.resolved_with_traits + snap.resolved_empty, 0);
        assert_eq!(snap.evaluations, 0);
    }

    #[test]
    fn prometheus_format_valid() {
        let c = StabilityCounters::new();
        c.evaluations.fetch_add(42, Ordering::Relaxed);
        let prom = c.snapshot().to_prometheus();
        assert!(prom.contains("tstab_evaluations_total 42"));
        assert!(prom.contains("rule=\"agoraphobia\""));
        assert!(prom.contains("# TYPE"));
    }

    #[test]
    fn frame_budget_monitor_records() {
        let monitor = FrameBudgetMonitor::new(2.0);
        assert_eq!(monitor.stats(), FrameStats::default());
        monitor.record(0.5);
        monitor.record(1.5);

        assert_eq!(monitor.frame_count(), 2);
        assert!((monitor.stats().last_ms - 1.5).abs() < 0.001);
        assert!(!monitor.is_over_budget());

        monitor.record(3.0);
        assert!(monitor.is_over_budget());
        let stats = monitor.stats();
        assert!((stats.median_ms - 1.5).abs() < 0.001);
        assert!((stats.max_ms - 3.0).abs() < 0.001);
        assert_eq!(stats.over_budget_frames, 1);
    }

    #[test]
    fn window_drops_oldest_frames() {
        let monitor = FrameBudgetMonitor::new(1.0);
        monitor.record(50.0);
        for _ in 0..FrameBudgetMonitor::WINDOW {
            monitor.record(0.25);
        }
        let stats = monitor.stats();
        assert!((stats.max_ms - 0.25).abs() < 0.001);
        assert_eq!(stats.over_budget_frames, 1);
        assert_eq!(monitor.frame_count(), FrameBudgetMonitor::WINDOW as u64 + 1);
    }

    #[test]
    fn frame_guard_records_timing() {
        let monitor = FrameBudgetMonitor::new(100.0);
        {
            let _guard = monitor.begin_frame();
        }
        assert_eq!(monitor.frame_count(), 1);
        assert!(monitor.stats().last_ms < 100.0);
    }
}
