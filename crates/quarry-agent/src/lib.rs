//! The Quarry agent: concrete goals, triggers, commands and the tick runner.
//!
//! This crate turns the generic scheduler of `quarry-goals` into a working
//! agent. It provides the concrete goal kinds (navigate, dig, gather,
//! craft, smelt, fight, flee, eat, sleep and the idle chores), the
//! triggers that push quiet goals when danger, hunger, night or boredom
//! arise, typed user commands, and the [`Agent`] that owns it all.
//!
//! # Modules
//!
//! - [`agent`] -- [`Agent`]: scheduler, memory, triggers, command handling.
//! - [`command`] -- [`Command`], the typed user instructions.
//! - [`config`] -- `quarry-config.yaml` loading and typed sections.
//! - [`error`] -- [`AgentError`].
//! - [`kinds`] -- Every concrete goal kind.
//! - [`runner`] -- [`run_agent`], the bounded tick loop.
//! - [`triggers`] -- Threat, hunger, night and idle triggers.

pub mod agent;
pub mod command;
pub mod config;
pub mod error;
pub mod kinds;
pub mod runner;
pub mod triggers;

pub use agent::Agent;
pub use command::Command;
pub use config::{ConfigError, QuarryConfig};
pub use error::AgentError;
pub use runner::{EndReason, RunControl, RunResult, TickCallback, log_run_end, run_agent};
