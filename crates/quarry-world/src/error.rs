//! Error types for the `quarry-world` crate.
//!
//! [`NavError`] and [`ActionError`] are the failure shapes of the external
//! navigation and action services; goal kinds convert them into goal
//! errors. [`WorldError`] and [`MemoryError`] cover loading game data and
//! persisting agent memory.

use quarry_types::{BlockPos, EntityId};

/// Errors that can occur while loading game data.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Failed to read a game-data file from disk.
    #[error("failed to read game data: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse game-data JSON.
    #[error("failed to parse game data: {source}")]
    Parse {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

/// Failure reported by the navigation service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    /// No path exists to the requested target.
    #[error("no path to target: {reason}")]
    NoPath {
        /// Why the path search failed.
        reason: String,
    },

    /// Movement stopped making progress.
    #[error("stuck while moving")]
    Stuck,

    /// The navigation service gave up after its own deadline.
    #[error("navigation timed out")]
    Timeout,

    /// Navigation was stopped before arrival.
    #[error("navigation interrupted")]
    Interrupted,
}

/// Failure reported by the action executor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// The inventory lacks a required item.
    #[error("missing {item}: need {needed}, have {have}")]
    MissingItem {
        /// The missing item.
        item: String,
        /// Quantity required.
        needed: u32,
        /// Quantity held.
        have: u32,
    },

    /// There is no block at the position.
    #[error("no block at {pos}")]
    NoBlock {
        /// The empty position.
        pos: BlockPos,
    },

    /// The position is already occupied by a block.
    #[error("{pos} is occupied")]
    Occupied {
        /// The occupied position.
        pos: BlockPos,
    },

    /// The entity no longer exists.
    #[error("entity {id} is gone")]
    NoEntity {
        /// The missing entity.
        id: EntityId,
    },

    /// The target is farther than the agent can reach.
    #[error("{target} is out of reach")]
    OutOfReach {
        /// Description of the target.
        target: String,
    },

    /// The held item cannot harvest the block.
    #[error("cannot harvest {block} with the held item")]
    WrongTool {
        /// The block being dug.
        block: String,
    },

    /// The item cannot be placed as a block.
    #[error("{item} cannot be placed")]
    NotPlaceable {
        /// The item.
        item: String,
    },

    /// A required workstation block is missing at the position.
    #[error("no {station} at {pos}")]
    NoStation {
        /// Kind of workstation (`crafting_table`, `furnace`, `bed`, `chest`).
        station: String,
        /// Where it was expected.
        pos: BlockPos,
    },

    /// The recipe needs a crafting table but none was given.
    #[error("recipe for {item} needs a crafting table")]
    NeedsTable {
        /// The recipe result.
        item: String,
    },

    /// The held item is not edible.
    #[error("{item} is not food")]
    NotFood {
        /// The held item, or `nothing`.
        item: String,
    },

    /// Sleeping is only possible at night.
    #[error("can only sleep at night")]
    NotNight,

    /// No container is open.
    #[error("no container is open")]
    NoContainer,
}

/// Errors that can occur while loading or saving agent memory.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// Failed to read or write the memory file.
    #[error("memory file I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to encode or decode memory JSON.
    #[error("memory file is not valid JSON: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
