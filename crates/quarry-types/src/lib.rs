//! Shared type definitions for the Quarry agent core.
//!
//! This crate is the single source of truth for the plain data types used
//! across the workspace: identifiers, geometry, lane and entity enums, and
//! the static game-data records (blocks, creatures, recipes) that the
//! planner reasons about.
//!
//! # Modules
//!
//! - [`ids`] -- Strongly-typed integer identifiers for goals and entities
//! - [`geometry`] -- World-space vectors and integer block positions
//! - [`enums`] -- Priority lanes, entity kinds, equipment slots
//! - [`structs`] -- Game-data records and entity snapshots

pub mod enums;
pub mod geometry;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{EntityKind, EquipSlot, Lane};
pub use geometry::{BlockPos, Vec3};
pub use ids::{EntityId, GoalId};
pub use structs::{BlockInfo, CreatureInfo, EntitySnapshot, ItemStack, Recipe, SmeltingRecipe};
