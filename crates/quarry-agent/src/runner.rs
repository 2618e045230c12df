//! Tick loop runner with run controls.
//!
//! [`run_agent`] drives [`Agent::tick`] at a fixed rate and stops when:
//!
//! - **Tick limit**: `max_ticks` ticks have run (0 = unlimited)
//! - **Stop request**: [`RunControl::request_stop`] was called, e.g. from a
//!   Ctrl-C handler
//! - **Idle**: `stop_when_idle` is set and no lane holds work the user is
//!   waiting on
//!
//! [`RunControl`] is shared through an [`Arc`] so a signal task can stop
//! the loop without locks.
//!
//! [`Arc`]: std::sync::Arc

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use quarry_goals::TickSummary;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::agent::Agent;
use crate::config::AgentSettings;

/// Why the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// A stop was requested.
    StopRequested,
    /// No work was left and the run was set to stop when idle.
    Idle,
}

/// Shared run controls.
#[derive(Debug)]
pub struct RunControl {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Current tick interval in milliseconds (runtime-adjustable).
    tick_interval_ms: AtomicU64,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,

    /// Stop once the agent has no work left.
    stop_when_idle: bool,
}

impl RunControl {
    /// Controls from the `agent` config section.
    pub fn new(settings: &AgentSettings) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(settings.tick_interval_ms),
            max_ticks: settings.max_ticks,
            stop_when_idle: settings.stop_when_idle,
        }
    }

    /// Request a clean stop before the next tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Change the tick interval. Returns the previous value.
    pub fn set_tick_interval_ms(&self, ms: u64) -> u64 {
        self.tick_interval_ms.swap(ms, Ordering::AcqRel)
    }

    /// Configured tick limit (0 = unlimited).
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Whether `ticks` completed ticks reach the limit.
    pub const fn tick_limit_reached(&self, ticks: u64) -> bool {
        self.max_ticks > 0 && ticks >= self.max_ticks
    }

    /// Whether the run ends once no work is left.
    pub const fn stop_when_idle(&self) -> bool {
        self.stop_when_idle
    }
}

/// Result of a run.
#[derive(Debug)]
pub struct RunResult {
    /// The reason the run ended.
    pub end_reason: EndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
pub trait TickCallback: Send {
    /// Called after a tick with its summary and the agent.
    fn on_tick(&mut self, summary: &TickSummary, agent: &Agent);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _agent: &Agent) {}
}

/// Run the tick loop until a termination condition is met.
pub async fn run_agent(
    agent: &mut Agent,
    control: &RunControl,
    callback: &mut dyn TickCallback,
) -> RunResult {
    info!(
        max_ticks = control.max_ticks(),
        tick_interval_ms = control.tick_interval_ms(),
        stop_when_idle = control.stop_when_idle(),
        "Agent starting"
    );

    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    loop {
        // --- Check stop before tick ---
        if control.is_stop_requested() {
            info!(total_ticks, "Stop requested");
            return RunResult {
                end_reason: EndReason::StopRequested,
                final_summary: last_summary,
                total_ticks,
            };
        }

        let summary = agent.tick();
        total_ticks = total_ticks.saturating_add(1);

        callback.on_tick(&summary, agent);

        if control.tick_limit_reached(total_ticks) {
            info!(
                tick = summary.tick,
                max_ticks = control.max_ticks(),
                "Tick limit reached"
            );
            return RunResult {
                end_reason: EndReason::MaxTicksReached,
                final_summary: Some(summary),
                total_ticks,
            };
        }

        if control.stop_when_idle() && !agent.has_work() {
            info!(tick = summary.tick, "No work left");
            return RunResult {
                end_reason: EndReason::Idle,
                final_summary: Some(summary),
                total_ticks,
            };
        }

        last_summary = Some(summary);

        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    }
}

/// Log how the run ended.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Run ended"
    );

    if let Some(summary) = &result.final_summary {
        info!(
            tick = summary.tick,
            lane = ?summary.lane,
            resolved = summary.resolved.len(),
            "Final tick summary"
        );
    } else {
        warn!("Run ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use quarry_world::{AgentMemory, SimWorld};

    use super::*;
    use crate::command::Command;
    use crate::config::QuarryConfig;

    fn settings(max_ticks: u64, stop_when_idle: bool) -> AgentSettings {
        AgentSettings {
            tick_interval_ms: 0,
            max_ticks,
            stop_when_idle,
            ..AgentSettings::default()
        }
    }

    fn agent(world: &SimWorld) -> Agent {
        Agent::new(&QuarryConfig::default(), world.handles(), AgentMemory::default())
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let world = SimWorld::vanilla();
        let mut agent = agent(&world);
        let control = RunControl::new(&settings(5, false));

        let result = run_agent(&mut agent, &control, &mut NoOpCallback).await;

        assert_eq!(result.end_reason, EndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_summary.map(|s| s.tick), Some(5));
    }

    #[tokio::test]
    async fn stop_request() {
        let world = SimWorld::vanilla();
        let mut agent = agent(&world);
        let control = RunControl::new(&settings(0, false));
        control.request_stop();

        let result = run_agent(&mut agent, &control, &mut NoOpCallback).await;

        assert_eq!(result.end_reason, EndReason::StopRequested);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
    }

    #[tokio::test]
    async fn stops_when_work_is_done() {
        let world = SimWorld::vanilla();
        world.give("stick", 2);
        let mut agent = agent(&world);
        agent.execute(Command::Gather {
            item: String::from("stick"),
            count: 2,
            force: false,
        });
        let control = RunControl::new(&settings(50, true));

        let result = run_agent(&mut agent, &control, &mut NoOpCallback).await;

        assert_eq!(result.end_reason, EndReason::Idle);
        assert_eq!(result.total_ticks, 1);
    }

    #[tokio::test]
    async fn tick_callback_is_called() {
        struct CountCallback {
            count: u64,
        }
        impl TickCallback for CountCallback {
            fn on_tick(&mut self, _summary: &TickSummary, _agent: &Agent) {
                self.count = self.count.saturating_add(1);
            }
        }

        let world = SimWorld::vanilla();
        let mut agent = agent(&world);
        let control = RunControl::new(&settings(3, false));
        let mut cb = CountCallback { count: 0 };

        let _ = run_agent(&mut agent, &control, &mut cb).await;

        assert_eq!(cb.count, 3);
    }

    #[test]
    fn tick_interval_is_adjustable() {
        let control = RunControl::new(&AgentSettings::default());
        assert_eq!(control.tick_interval_ms(), 50);
        assert_eq!(control.set_tick_interval_ms(10), 50);
        assert_eq!(control.tick_interval_ms(), 10);
        assert!(!control.tick_limit_reached(1_000));
    }
}
