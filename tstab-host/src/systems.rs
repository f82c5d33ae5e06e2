//! Per-frame systems for the temporal stability layer.
//!
//! In a full host integration these would be registered with the ECS
//! scheduler. Here they are plain functions over component slices.
//!
//! ## System Budget (per frame):
//!
//! | System            | Budget  | Frequency   |
//! |-------------------|---------|-------------|
//! | Stability tick    | 0.5ms   | Every frame |

use tracing::{debug_span, warn};

use tstab_core::behavior::TickContext;
use tstab_core::collaborators::{ClassRegistry, EnvironmentSampler};
use tstab_core::metrics::{FrameBudgetMonitor, StabilityCounters};

use crate::components::StabilityComponent;
use crate::config::HostConfig;

/// What one frame of ticking did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameSummary {
    /// Components whose behavior ran.
    pub ticked: usize,
    /// Components filtered out by a host gate.
    pub gated: usize,
    /// Components skipped after a collaborator failure.
    pub failed: usize,
    /// Components that finished trait resolution this frame.
    pub resolved: usize,
    /// Components whose velocity a rule overwrote.
    pub rules_fired: usize,
}

/// Shared state for the stability system: config, counters and frame timing.
pub struct StabilitySystem {
    config: HostConfig,
    counters: StabilityCounters,
    monitor: FrameBudgetMonitor,
}

impl StabilitySystem {
    /// Create the system from host configuration.
    #[must_use]
    pub fn new(config: HostConfig) -> Self {
        let monitor = FrameBudgetMonitor::new(config.frame_budget_ms);
        Self {
            config,
            counters: StabilityCounters::new(),
            monitor,
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Lifetime counters.
    #[must_use]
    pub fn counters(&self) -> &StabilityCounters {
        &self.counters
    }

    /// Frame timing history.
    #[must_use]
    pub fn monitor(&self) -> &FrameBudgetMonitor {
        &self.monitor
    }

    /// Whether a component passes the host gates.
    #[must_use]
    pub fn should_tick(&self, component: &StabilityComponent) -> bool {
        if component.exempt {
            return false;
        }
        if self.config.players_only && !component.is_player {
            return false;
        }
        !(self.config.require_connected && component.is_player && !component.connected)
    }

    /// Tick every component once.
    ///
    /// A collaborator failure on one entity is logged and counted; the rest
    /// of the frame still runs and that entity's velocity is left as the
    /// host computed it.
    pub fn tick_all(
        &self,
        components: &mut [StabilityComponent],
        delta_seconds: f32,
        classes: &dyn ClassRegistry,
        world: &dyn EnvironmentSampler,
    ) -> FrameSummary {
        let mut summary = FrameSummary::default();
        if !self.config.core.general.enabled {
            return summary;
        }

        let _span = debug_span!("tstab::frame", entities = components.len()).entered();
        let frame = self.monitor.begin_frame();

        for component in components.iter_mut() {
            if !self.should_tick(component) {
                summary.gated += 1;
                continue;
            }

            let mut ctx = TickContext {
                class_code: component.class_code.as_deref(),
                position: component.position,
                velocity: &mut component.velocity,
                classes,
                environment: world,
                stats: &component.stats,
            };

            match component.behavior.on_tick(delta_seconds, &mut ctx) {
                Ok(report) => {
                    self.counters.record_tick(&report);
                    summary.ticked += 1;
                    if report.newly_resolved.is_some() {
                        summary.resolved += 1;
                    }
                    if report.evaluation.is_some_and(|e| e.fired.is_some()) {
                        summary.rules_fired += 1;
                    }
                }
                Err(error) => {
                    self.counters.record_failure();
                    summary.failed += 1;
                    warn!(
                        entity = %component.entity,
                        position = %component.position,
                        %error,
                        "Skipping stability tick for entity"
                    );
                }
            }
        }

        drop(frame);
        if self.monitor.is_over_budget() {
            let stats = self.monitor.stats();
            warn!(
                elapsed_ms = stats.last_ms,
                median_ms = stats.median_ms,
                max_ms = stats.max_ms,
                over_budget_frames = stats.over_budget_frames,
                budget_ms = self.monitor.budget_ms(),
                entities = components.len(),
                "Stability frame over budget"
            );
        }

        summary
    }
}
