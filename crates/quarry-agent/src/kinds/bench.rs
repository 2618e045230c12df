//! Drives single goals against a [`SimWorld`] for the kinds' unit tests.

#![allow(clippy::panic, clippy::missing_const_for_fn)]

use std::sync::Arc;

use chrono::Utc;
use quarry_goals::{
    Goal, GoalContext, GoalError, GoalResult, GoalScheduler, LaneSet, Step, Submission,
    TickSummary, WorldContext,
};
use quarry_planner::PlannerConfig;
use quarry_types::{GoalId, Lane};
use quarry_world::{AgentMemory, SimWorld, WorldHandles};

use super::Planning;

/// A scheduler, a memory and a simulated world, without triggers.
pub(crate) struct Bench {
    pub world: SimWorld,
    pub planning: Planning,
    handles: WorldHandles,
    memory: AgentMemory,
    scheduler: GoalScheduler,
}

impl Bench {
    pub fn new(world: SimWorld) -> Self {
        Self::with_config(world, PlannerConfig::default())
    }

    pub fn with_config(world: SimWorld, config: PlannerConfig) -> Self {
        Self {
            handles: world.handles(),
            world,
            planning: Planning::root(Arc::new(config)),
            memory: AgentMemory::default(),
            scheduler: GoalScheduler::new(),
        }
    }

    pub fn push(&mut self, goal: impl Goal + 'static) -> GoalId {
        self.scheduler.push(Lane::Normal, Submission::new(goal))
    }

    pub fn tick(&mut self) -> TickSummary {
        let mut world = WorldContext::new(&self.handles, &mut self.memory, Utc::now());
        self.scheduler.tick(&mut world)
    }

    /// Tick until `id` resolves, returning its result and the labels of
    /// every goal spawned on the way.
    pub fn run(&mut self, id: GoalId, limit: usize) -> (GoalResult, Vec<String>) {
        let mut spawned = Vec::new();
        for _ in 0..limit {
            let summary = self.tick();
            spawned.extend(summary.spawned.iter().map(|g| g.label.clone()));
            if let Some(resolution) = summary.resolution(id) {
                return (resolution.result.clone(), spawned);
            }
        }
        panic!("goal {id} did not resolve within {limit} ticks");
    }

    /// Tick until a goal labelled `label` resolves.
    pub fn run_until_resolved(&mut self, label: &str, limit: usize) {
        for _ in 0..limit {
            let summary = self.tick();
            if summary.resolved.iter().any(|r| r.label == label) {
                return;
            }
        }
        panic!("{label} did not resolve within {limit} ticks");
    }

    /// Cancel every normal-lane goal.
    pub fn stop(&mut self) {
        self.scheduler.cancel(LaneSet::NORMAL, || {});
    }
}

/// Runs `inner` at tree depth `levels` (at least one) and passes its result
/// up to the root.
pub(crate) struct Nest {
    levels: usize,
    inner: Option<Box<dyn Goal>>,
    result: Option<GoalResult>,
}

impl Nest {
    pub fn new(levels: usize, inner: impl Goal + 'static) -> Self {
        Self::boxed(levels, Box::new(inner))
    }

    fn boxed(levels: usize, inner: Box<dyn Goal>) -> Self {
        Self {
            levels,
            inner: Some(inner),
            result: None,
        }
    }
}

impl Goal for Nest {
    fn label(&self) -> String {
        format!("nest {}", self.levels)
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        if let Some(result) = self.result.take() {
            return Step::Done(result);
        }
        let Some(inner) = self.inner.take() else {
            return Step::fail(GoalError::failed("nothing nested"));
        };
        match self.levels {
            0 | 1 => ctx.spawn_boxed(inner),
            levels => ctx.spawn(Self::boxed(levels.saturating_sub(1), inner)),
        };
        Step::Pending
    }

    fn child_finished(&mut self, _child: GoalId, result: &GoalResult) {
        self.result = Some(result.clone());
    }
}
