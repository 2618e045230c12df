//! The world the agent acts in, seen through the collaborator contracts.
//!
//! The agent core never talks to a game client directly. It reads the
//! world through [`WorldView`], moves through [`Navigator`], acts through
//! [`ActionExecutor`] and answers the user through [`Reporter`]. This crate
//! defines those contracts, the static [`GameData`] rules they refer to,
//! the persisted [`AgentMemory`], and [`SimWorld`], an in-memory world
//! implementing all four.
//!
//! # Modules
//!
//! - [`actions`] -- Action executor contract and its future type.
//! - [`data`] -- Game rules: block drops, recipes, smelting, fuels, foods.
//! - [`demo`] -- Seeded demo world used by the engine binary.
//! - [`error`] -- Navigation, action, data-loading and memory errors.
//! - [`handles`] -- [`WorldHandles`], the collaborator bundle.
//! - [`memory`] -- Remembered landmarks and planted saplings, JSON-backed.
//! - [`navigation`] -- Navigation targets, movement profiles, navigator.
//! - [`reporter`] -- User-facing message channel.
//! - [`sim`] -- In-memory world implementing every contract.
//! - [`view`] -- Synchronous read-only world queries.

pub mod actions;
pub mod data;
pub mod demo;
pub mod error;
pub mod handles;
pub mod memory;
pub mod navigation;
pub mod reporter;
pub mod sim;
pub mod view;

// Re-export primary types at crate root.
pub use actions::{ActionExecutor, ActionFuture};
pub use data::GameData;
pub use demo::create_demo_world;
pub use error::{ActionError, MemoryError, NavError, WorldError};
pub use handles::WorldHandles;
pub use memory::{AgentMemory, Landmark, PlantedSapling};
pub use navigation::{MovementProfile, NavFuture, NavTarget, Navigator};
pub use reporter::Reporter;
pub use sim::{PICKUP_RANGE, REACH, SimWorld};
pub use view::WorldView;
