//! Tick callback that logs the progress of user-visible work.

use quarry_agent::{Agent, TickCallback};
use quarry_goals::TickSummary;
use tracing::{debug, info};

/// Logs finished commands and each switch between busy and idle.
#[derive(Debug, Default)]
pub struct ProgressCallback {
    busy: bool,
    finished: u64,
}

impl ProgressCallback {
    /// A callback that has seen no work yet.
    pub const fn new() -> Self {
        Self {
            busy: false,
            finished: 0,
        }
    }

    /// Number of non-quiet root goals that have resolved.
    pub const fn finished(&self) -> u64 {
        self.finished
    }
}

impl TickCallback for ProgressCallback {
    fn on_tick(&mut self, summary: &TickSummary, agent: &Agent) {
        let tick = summary.tick;

        if let Some(stepped) = &summary.stepped {
            debug!(
                tick,
                lane = ?summary.lane,
                goal = %stepped.label,
                depth = stepped.depth,
                spawned = summary.spawned.len(),
                "Tick advanced"
            );
        }

        for resolution in summary.resolved.iter().filter(|r| r.depth == 0 && !r.quiet) {
            self.finished = self.finished.saturating_add(1);
            info!(
                tick,
                goal = %resolution.label,
                succeeded = resolution.result.is_ok(),
                "Command finished"
            );
        }

        let busy = agent.has_work();
        if busy != self.busy {
            self.busy = busy;
            if busy {
                info!(tick, "Agent busy");
            } else {
                info!(tick, finished = self.finished, "Agent idle");
            }
        }
    }
}
