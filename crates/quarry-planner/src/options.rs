//! Which acquisition methods a gather may use.

use serde::{Deserialize, Serialize};

/// Acquisition capabilities. A branch needing a disabled capability costs
/// infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct AcquireOptions {
    /// Break blocks that drop the item.
    pub dig: bool,
    /// Kill creatures that drop the item.
    pub attack: bool,
    /// Craft the item.
    pub craft: bool,
    /// Smelt the item.
    pub smelt: bool,
    /// Obtain a missing harvest tool before digging.
    pub gather_tool: bool,
}

impl AcquireOptions {
    /// Every method allowed.
    pub const ALL: Self = Self {
        dig: true,
        attack: true,
        craft: true,
        smelt: true,
        gather_tool: true,
    };

    /// Only methods that need no tool gathering.
    pub const HELD_TOOLS_ONLY: Self = Self {
        gather_tool: false,
        ..Self::ALL
    };

    /// Same options without looting creatures.
    #[must_use]
    pub const fn without_attack(self) -> Self {
        Self {
            attack: false,
            ..self
        }
    }

    /// Same options without tool gathering.
    #[must_use]
    pub const fn without_tool_gathering(self) -> Self {
        Self {
            gather_tool: false,
            ..self
        }
    }
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self::ALL
    }
}
