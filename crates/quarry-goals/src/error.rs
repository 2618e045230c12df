//! The uniform failure shape of a goal.

use quarry_world::{ActionError, NavError};

/// Why a goal failed.
///
/// The `Display` form is the human-readable message reported to the user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GoalError {
    /// The goal was cancelled before it could finish.
    #[error("cancelled")]
    Cancelled,

    /// The goal tree grew deeper than the scheduler allows.
    #[error("goal tree deeper than {limit} levels")]
    TooDeep {
        /// The depth limit that was exceeded.
        limit: usize,
    },

    /// The goal's step function panicked.
    #[error("goal panicked: {message}")]
    Panicked {
        /// The panic payload, if it was a string.
        message: String,
    },

    /// Navigation failed.
    #[error(transparent)]
    Navigation(#[from] NavError),

    /// An in-game action failed.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// Every way of obtaining an item was exhausted.
    #[error("no way to obtain {item}")]
    Unobtainable {
        /// The item that could not be obtained.
        item: String,
    },

    /// No recipe produces the item.
    #[error("no usable recipe for {item}")]
    NoRecipe {
        /// The item.
        item: String,
    },

    /// Every recipe for the item needs the item itself.
    #[error("{item} can only be made from itself")]
    Circular {
        /// The item.
        item: String,
    },

    /// A goal's own iteration guard tripped.
    #[error("{label} made no progress after {iterations} attempts")]
    EndlessLoop {
        /// Label of the goal that looped.
        label: String,
        /// Iterations performed before giving up.
        iterations: u32,
    },

    /// Any other failure, with a message.
    #[error("{reason}")]
    Failed {
        /// What went wrong.
        reason: String,
    },
}

impl GoalError {
    /// Build a [`GoalError::Failed`] from a message.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Whether this error is a cancellation.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether the failure came from the goal tree rather than the world:
    /// a cancellation or the depth guard. Trying another alternative
    /// cannot get past it.
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::Cancelled | Self::TooDeep { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_tree_failures_are_structural() {
        assert!(GoalError::Cancelled.is_structural());
        assert!(GoalError::TooDeep { limit: 10 }.is_structural());
        assert!(
            !GoalError::Unobtainable {
                item: String::from("oak_log")
            }
            .is_structural()
        );
        assert!(!GoalError::failed("no known chest").is_structural());
    }
}
