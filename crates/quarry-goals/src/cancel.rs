//! Cancellation requests.
//!
//! A request names the lanes to cancel and remembers the id counter at the
//! moment it was made: roots with an id below that cutoff are targeted,
//! roots pushed afterwards are not. The request stays pending until no
//! targeted non-quiet root remains, then its callbacks fire and it clears.

use chrono::{DateTime, Utc};
use quarry_types::{GoalId, Lane};
use serde::{Deserialize, Serialize};

/// Callback fired once a cancellation request is acknowledged.
pub type CancelCallback = Box<dyn FnOnce() + Send>;

/// A set of lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LaneSet {
    /// Includes the critical lane.
    #[serde(default)]
    pub critical: bool,
    /// Includes the survival lane.
    #[serde(default)]
    pub survival: bool,
    /// Includes the normal lane.
    #[serde(default)]
    pub normal: bool,
}

impl LaneSet {
    /// No lanes.
    pub const NONE: Self = Self {
        critical: false,
        survival: false,
        normal: false,
    };

    /// Every lane.
    pub const ALL: Self = Self {
        critical: true,
        survival: true,
        normal: true,
    };

    /// Only the normal lane.
    pub const NORMAL: Self = Self::only(Lane::Normal);

    /// A set holding exactly one lane.
    pub const fn only(lane: Lane) -> Self {
        Self {
            critical: matches!(lane, Lane::Critical),
            survival: matches!(lane, Lane::Survival),
            normal: matches!(lane, Lane::Normal),
        }
    }

    /// Whether `lane` is in the set.
    pub const fn contains(self, lane: Lane) -> bool {
        match lane {
            Lane::Critical => self.critical,
            Lane::Survival => self.survival,
            Lane::Normal => self.normal,
        }
    }

    /// Lanes in either set.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            critical: self.critical || other.critical,
            survival: self.survival || other.survival,
            normal: self.normal || other.normal,
        }
    }

    /// Whether the set is empty.
    pub const fn is_empty(self) -> bool {
        !(self.critical || self.survival || self.normal)
    }
}

/// A pending cancellation.
pub(crate) struct CancelRequest {
    pub(crate) lanes: LaneSet,
    pub(crate) cutoff: GoalId,
    pub(crate) callbacks: Vec<CancelCallback>,
    pub(crate) requested_at: DateTime<Utc>,
}

impl CancelRequest {
    pub(crate) fn new(
        lanes: LaneSet,
        cutoff: GoalId,
        callback: CancelCallback,
        requested_at: DateTime<Utc>,
    ) -> Self {
        Self {
            lanes,
            cutoff,
            callbacks: vec![callback],
            requested_at,
        }
    }

    /// Fold a later request into this one.
    pub(crate) fn merge(&mut self, lanes: LaneSet, cutoff: GoalId, callback: CancelCallback) {
        self.lanes = self.lanes.union(lanes);
        self.cutoff = self.cutoff.max(cutoff);
        self.callbacks.push(callback);
    }

    /// Whether the root `id` in `lane` is targeted.
    pub(crate) fn targets(&self, lane: Lane, id: GoalId, quiet: bool) -> bool {
        !quiet && self.lanes.contains(lane) && id < self.cutoff
    }
}
