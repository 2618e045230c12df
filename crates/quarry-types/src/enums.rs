//! Enumeration types shared across the workspace.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Priority lanes
// ---------------------------------------------------------------------------

/// One of the three fixed priority lanes of the goal scheduler.
///
/// Declaration order is priority order: `Critical` pre-empts `Survival`,
/// which pre-empts `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    /// Immediate danger: fleeing, fighting back.
    Critical,
    /// Self-preservation: eating, sleeping.
    Survival,
    /// User commands and idle chores.
    Normal,
}

impl Lane {
    /// All lanes, highest priority first.
    pub const ALL: [Self; 3] = [Self::Critical, Self::Survival, Self::Normal];

    /// Stable lowercase name used in logs and status reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Survival => "survival",
            Self::Normal => "normal",
        }
    }
}

impl core::fmt::Display for Lane {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Broad category of a world entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Another player.
    Player,
    /// A creature that attacks on sight.
    Hostile,
    /// A creature that never attacks.
    Passive,
    /// A dropped item lying on the ground.
    Drop,
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

/// Slot an item can be equipped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    /// Main hand.
    Hand,
    /// Off hand.
    OffHand,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lanes_are_in_priority_order() {
        assert!(Lane::Critical < Lane::Survival);
        assert!(Lane::Survival < Lane::Normal);
        assert_eq!(Lane::ALL.first().copied(), Some(Lane::Critical));
    }

    #[test]
    fn lane_serializes_snake_case() {
        let json = serde_json::to_string(&Lane::Survival).unwrap_or_default();
        assert_eq!(json, "\"survival\"");
    }
}
