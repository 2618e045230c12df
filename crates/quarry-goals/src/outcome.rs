//! Successful goal results.

use quarry_types::BlockPos;

use crate::error::GoalError;

/// What a goal achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Finished with nothing in particular to report.
    Done,
    /// The requested items were already held (count held).
    Have(u32),
    /// Items were dug or looted (count now held).
    Gathered(u32),
    /// Items were crafted (count produced).
    Crafted(u32),
    /// Items were smelted (count produced).
    Smelted(u32),
    /// A block was broken.
    Dug(BlockPos),
    /// A block was placed.
    Placed(BlockPos),
    /// The destination was reached.
    Arrived,
    /// The threat was left behind.
    Fled,
    /// The target entity is gone.
    Killed,
    /// Dropped items were picked up (count).
    Collected(u32),
    /// Food was eaten.
    Ate(String),
    /// The agent slept through the night.
    Slept,
    /// Items were handed to a player (count).
    Given(u32),
    /// A sapling was planted.
    Planted(BlockPos),
    /// Crops were harvested (count).
    Harvested(u32),
    /// Items were stored in a chest (count).
    Deposited(u32),
    /// A wait elapsed.
    Waited,
}

impl core::fmt::Display for Outcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Done => f.write_str("done"),
            Self::Have(n) => write!(f, "already have {n}"),
            Self::Gathered(n) => write!(f, "gathered, now holding {n}"),
            Self::Crafted(n) => write!(f, "crafted {n}"),
            Self::Smelted(n) => write!(f, "smelted {n}"),
            Self::Dug(pos) => write!(f, "dug {pos}"),
            Self::Placed(pos) => write!(f, "placed at {pos}"),
            Self::Arrived => f.write_str("arrived"),
            Self::Fled => f.write_str("got away"),
            Self::Killed => f.write_str("target down"),
            Self::Collected(n) => write!(f, "picked up {n}"),
            Self::Ate(food) => write!(f, "ate {food}"),
            Self::Slept => f.write_str("slept"),
            Self::Given(n) => write!(f, "handed over {n}"),
            Self::Planted(pos) => write!(f, "planted at {pos}"),
            Self::Harvested(n) => write!(f, "harvested {n}"),
            Self::Deposited(n) => write!(f, "stored {n}"),
            Self::Waited => f.write_str("waited"),
        }
    }
}

/// The single resolution of a goal.
pub type GoalResult = Result<Outcome, GoalError>;
