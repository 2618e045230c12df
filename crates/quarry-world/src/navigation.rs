//! Navigation service contract.
//!
//! Pathfinding itself lives outside the agent core; goals only ask for a
//! destination and await arrival. [`Navigator::stop`] is the release
//! primitive cancel hooks use to halt movement.

use futures::future::BoxFuture;
use quarry_types::{BlockPos, EntityId, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::NavError;

/// Future resolving when navigation arrives or fails.
pub type NavFuture = BoxFuture<'static, Result<(), NavError>>;

/// Where to go.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavTarget {
    /// Exactly this point.
    Point(Vec3),
    /// Anywhere within `range` of a point.
    Near {
        /// The point to approach.
        point: Vec3,
        /// Acceptable distance from it.
        range: f64,
    },
    /// Standing next to a block, close enough to interact with it.
    Block(BlockPos),
    /// Within `range` of an entity's current position.
    Entity {
        /// The entity to approach.
        id: EntityId,
        /// Acceptable distance from it.
        range: f64,
    },
    /// At least `distance` away from a point.
    AwayFrom {
        /// The point to move away from.
        point: Vec3,
        /// Distance to put between the agent and the point.
        distance: f64,
    },
}

impl core::fmt::Display for NavTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Point(point) => write!(f, "{point}"),
            Self::Near { point, range } => write!(f, "within {range:.1} of {point}"),
            Self::Block(pos) => write!(f, "block {pos}"),
            Self::Entity { id, .. } => write!(f, "entity {id}"),
            Self::AwayFrom { point, distance } => write!(f, "{distance:.1} away from {point}"),
        }
    }
}

/// Movement capabilities granted to the pathfinder for one trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementProfile {
    /// May break blocks in the way.
    pub can_dig: bool,
    /// May place blocks to bridge or pillar.
    pub can_place: bool,
    /// May sprint.
    pub sprint: bool,
}

impl MovementProfile {
    /// Walk only; never alters terrain.
    pub const CAUTIOUS: Self = Self {
        can_dig: false,
        can_place: false,
        sprint: false,
    };

    /// Sprint without stopping to alter terrain.
    pub const FLEEING: Self = Self {
        can_dig: false,
        can_place: false,
        sprint: true,
    };
}

impl Default for MovementProfile {
    fn default() -> Self {
        Self {
            can_dig: true,
            can_place: true,
            sprint: false,
        }
    }
}

/// The pathfinding service.
pub trait Navigator: Send + Sync {
    /// Start moving towards `target`.
    ///
    /// The returned future settles on arrival or failure. Starting a new
    /// trip replaces any trip in progress.
    fn goto(&self, target: NavTarget, profile: MovementProfile) -> NavFuture;

    /// Halt movement. Pending trips reject with [`NavError::Interrupted`].
    fn stop(&self);
}
