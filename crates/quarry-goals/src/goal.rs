//! The goal execution contract.
//!
//! A goal is an explicit resumable state machine. The scheduler calls
//! [`Goal::step`] once per tick while the goal is the front-most runnable
//! node of the active lane; the returned [`Step`] says whether it is still
//! working, finished, or finished asynchronously.
//!
//! Decomposition happens through [`GoalContext::spawn`]: children spawned
//! during a step run to completion (front child first) before the parent
//! is stepped again, and each child's result is handed to
//! [`Goal::child_finished`] first.
//!
//! [`GoalContext::spawn`]: crate::context::GoalContext::spawn

use futures::future::BoxFuture;
use quarry_types::GoalId;

use crate::context::GoalContext;
use crate::outcome::GoalResult;

/// Future an async goal suspends on.
pub type GoalFuture = BoxFuture<'static, GoalResult>;

/// What one step of a goal produced.
pub enum Step {
    /// Not finished; step again on a later tick.
    Pending,
    /// Finished with this result.
    Done(GoalResult),
    /// Finished asynchronously: the scheduler parks the future and polls it
    /// once per tick, resolving the goal with its output.
    Suspended(GoalFuture),
}

impl Step {
    /// Finish successfully.
    pub const fn ok(outcome: crate::outcome::Outcome) -> Self {
        Self::Done(Ok(outcome))
    }

    /// Finish with an error.
    pub fn fail(error: impl Into<crate::error::GoalError>) -> Self {
        Self::Done(Err(error.into()))
    }
}

impl core::fmt::Debug for Step {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Pending => f.write_str("Pending"),
            Self::Done(result) => f.debug_tuple("Done").field(result).finish(),
            Self::Suspended(_) => f.write_str("Suspended(..)"),
        }
    }
}

/// A unit of decision and execution.
pub trait Goal: Send {
    /// Human-readable description, used in logs, status and reports.
    fn label(&self) -> String;

    /// Advance the goal by one step.
    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step;

    /// Release external resources held by the goal (movement, an open
    /// container, a bed, a dig in progress). Called before the goal is
    /// resolved as cancelled.
    fn cancel(&mut self, _ctx: &mut GoalContext<'_>) {}

    /// Receive the result of a child spawned by this goal.
    fn child_finished(&mut self, _child: GoalId, _result: &GoalResult) {}
}
