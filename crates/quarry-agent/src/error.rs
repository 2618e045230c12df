//! Error types for the agent crate.

use quarry_world::MemoryError;

use crate::config::ConfigError;

/// Errors that can occur while starting or stopping the agent.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The configuration could not be loaded.
    #[error("config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// Memory could not be loaded or saved.
    #[error("memory error: {source}")]
    Memory {
        /// The underlying memory error.
        #[from]
        source: MemoryError,
    },
}
