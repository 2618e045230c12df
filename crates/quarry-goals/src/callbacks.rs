//! Completion callbacks and goal submissions.
//!
//! Callbacks fire once, in registration order, when their goal resolves.
//! Each runs inside its own `catch_unwind`, so a panicking callback cannot
//! prevent the ones after it from running.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::GoalError;
use crate::goal::Goal;
use crate::outcome::{GoalResult, Outcome};

/// Callback run when the goal succeeds.
pub type ThenFn = Box<dyn FnOnce(&Outcome) + Send>;
/// Callback run when the goal fails.
pub type CatchFn = Box<dyn FnOnce(&GoalError) + Send>;
/// Callback run whichever way the goal resolves.
pub type FinallyFn = Box<dyn FnOnce(&GoalResult) + Send>;

enum Callback {
    Then(ThenFn),
    Catch(CatchFn),
    Finally(FinallyFn),
}

/// Ordered completion callbacks of one goal.
#[derive(Default)]
pub struct Callbacks {
    entries: Vec<Callback>,
}

impl Callbacks {
    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every callback that applies to `result`, in registration order.
    /// Returns how many of them panicked.
    pub(crate) fn fire(self, result: &GoalResult) -> usize {
        let mut panicked = 0_usize;
        for callback in self.entries {
            let run = catch_unwind(AssertUnwindSafe(|| match (callback, result) {
                (Callback::Then(f), Ok(outcome)) => f(outcome),
                (Callback::Catch(f), Err(error)) => f(error),
                (Callback::Finally(f), _) => f(result),
                _ => {}
            }));
            if run.is_err() {
                panicked = panicked.saturating_add(1);
            }
        }
        panicked
    }
}

impl core::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Callbacks")
            .field("len", &self.entries.len())
            .finish()
    }
}

/// A root goal ready to be pushed onto a lane.
///
/// ```ignore
/// scheduler.push(
///     Lane::Normal,
///     Submission::new(goal).then(|outcome| println!("{outcome}")),
/// );
/// ```
pub struct Submission {
    pub(crate) goal: Box<dyn Goal>,
    pub(crate) quiet: bool,
    pub(crate) callbacks: Callbacks,
}

impl Submission {
    /// Submit `goal` with no callbacks.
    pub fn new<G: Goal + 'static>(goal: G) -> Self {
        Self::boxed(Box::new(goal))
    }

    /// Submit an already boxed goal.
    pub fn boxed(goal: Box<dyn Goal>) -> Self {
        Self {
            goal,
            quiet: false,
            callbacks: Callbacks::default(),
        }
    }

    /// Suppress the goal's user-visible side effects. Its children inherit
    /// the flag, and cancellation requests do not target it.
    #[must_use]
    pub const fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Run `f` with the outcome if the goal succeeds.
    #[must_use]
    pub fn then(mut self, f: impl FnOnce(&Outcome) + Send + 'static) -> Self {
        self.callbacks.entries.push(Callback::Then(Box::new(f)));
        self
    }

    /// Run `f` with the error if the goal fails.
    #[must_use]
    pub fn catch(mut self, f: impl FnOnce(&GoalError) + Send + 'static) -> Self {
        self.callbacks.entries.push(Callback::Catch(Box::new(f)));
        self
    }

    /// Run `f` with the result however the goal resolves.
    #[must_use]
    pub fn finally(mut self, f: impl FnOnce(&GoalResult) + Send + 'static) -> Self {
        self.callbacks.entries.push(Callback::Finally(Box::new(f)));
        self
    }

    /// Label of the submitted goal.
    pub fn label(&self) -> String {
        self.goal.label()
    }
}

impl core::fmt::Debug for Submission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Submission")
            .field("goal", &self.goal.label())
            .field("quiet", &self.quiet)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}
