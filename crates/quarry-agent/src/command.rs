//! Typed user commands.
//!
//! Parsing chat text into commands happens outside the agent; what arrives
//! here is already structured. Commands deserialize from the tagged form
//! used in `startup_commands`:
//!
//! ```yaml
//! - command: gather
//!   item: oak_log
//!   count: 4
//! - command: stop
//! ```

use serde::{Deserialize, Serialize};

/// One instruction from the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Obtain `count` of `item`.
    Gather {
        /// Item to obtain.
        item: String,
        /// How many to end up with.
        #[serde(default = "default_count")]
        count: u32,
        /// Ignore what is already held.
        #[serde(default)]
        force: bool,
    },
    /// Craft `count` of `item`.
    Craft {
        /// Item to craft.
        item: String,
        /// How many to make.
        #[serde(default = "default_count")]
        count: u32,
    },
    /// Smelt `count` of `item`.
    Smelt {
        /// Smelting output.
        item: String,
        /// How many to make.
        #[serde(default = "default_count")]
        count: u32,
    },
    /// Walk to a point.
    Goto {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
        /// Z coordinate.
        z: f64,
    },
    /// Hand items to a player.
    Give {
        /// Player name.
        player: String,
        /// Item to hand over.
        item: String,
        /// How many.
        #[serde(default = "default_count")]
        count: u32,
    },
    /// Eat the best food held.
    Eat,
    /// Sleep in a bed (night only).
    Sleep,
    /// Plant a held sapling.
    Plant,
    /// Harvest mature crops nearby.
    Harvest,
    /// Store items in a known chest.
    Deposit {
        /// Only store this item.
        #[serde(default)]
        item: Option<String>,
    },
    /// Cancel all normal-lane work.
    Stop,
    /// Report what the agent is doing.
    Status,
}

const fn default_count() -> u32 {
    1
}

impl Command {
    /// Whether the command becomes a goal (as opposed to `stop`/`status`).
    pub const fn is_work(&self) -> bool {
        !matches!(self, Self::Stop | Self::Status)
    }

    /// Stable lowercase name used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Gather { .. } => "gather",
            Self::Craft { .. } => "craft",
            Self::Smelt { .. } => "smelt",
            Self::Goto { .. } => "goto",
            Self::Give { .. } => "give",
            Self::Eat => "eat",
            Self::Sleep => "sleep",
            Self::Plant => "plant",
            Self::Harvest => "harvest",
            Self::Deposit { .. } => "deposit",
            Self::Stop => "stop",
            Self::Status => "status",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn count_defaults_to_one() {
        let cmd: Command = serde_json::from_str(r#"{"command":"craft","item":"stick"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Craft {
                item: String::from("stick"),
                count: 1
            }
        );
    }

    #[test]
    fn unit_and_optional_variants() {
        let stop: Command = serde_json::from_str(r#"{"command":"stop"}"#).unwrap();
        assert_eq!(stop, Command::Stop);
        assert!(!stop.is_work());

        let deposit: Command = serde_json::from_str(r#"{"command":"deposit"}"#).unwrap();
        assert_eq!(deposit, Command::Deposit { item: None });
        assert!(deposit.is_work());
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(serde_json::from_str::<Command>(r#"{"command":"dance"}"#).is_err());
    }
}
