//! Hierarchical goals and the three-lane goal scheduler.
//!
//! A [`Goal`] is a resumable state machine advanced one [`Step`] per tick.
//! Goals decompose by spawning children through their [`GoalContext`];
//! children run depth-first before their parent is stepped again. Async
//! goals suspend on a [`GoalFuture`] that the scheduler polls without
//! blocking until it settles.
//!
//! [`GoalScheduler`] owns every live goal in an arena and three priority
//! lanes of root goals. Each tick it advances exactly one lane (critical
//! before survival before normal), and it implements cooperative
//! cancellation that lets goals release external resources before they
//! resolve.
//!
//! # Modules
//!
//! - [`callbacks`] -- `then` / `catch` / `finally` callbacks and
//!   [`Submission`], the builder for root goals.
//! - [`cancel`] -- [`LaneSet`] and pending cancellation requests.
//! - [`context`] -- [`WorldContext`] and the per-step [`GoalContext`].
//! - [`error`] -- [`GoalError`], the uniform failure shape.
//! - [`goal`] -- The [`Goal`] trait and [`Step`].
//! - [`outcome`] -- [`Outcome`] and [`GoalResult`].
//! - [`scheduler`] -- [`GoalScheduler`], tick summaries and status.

mod arena;
pub mod callbacks;
pub mod cancel;
pub mod context;
pub mod error;
pub mod goal;
pub mod outcome;
pub mod scheduler;

pub use callbacks::{Callbacks, Submission};
pub use cancel::{CancelCallback, LaneSet};
pub use context::{GoalContext, WorldContext};
pub use error::GoalError;
pub use goal::{Goal, GoalFuture, Step};
pub use outcome::{GoalResult, Outcome};
pub use scheduler::{
    GoalRecord, GoalScheduler, GoalStatus, LaneStatus, MAX_TREE_DEPTH, Resolution,
    SchedulerStatus, TickSummary,
};
