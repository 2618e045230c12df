//! Bundle of collaborator handles passed to the agent.

use std::sync::Arc;

use crate::actions::ActionExecutor;
use crate::navigation::Navigator;
use crate::reporter::Reporter;
use crate::view::WorldView;

/// Shared handles to the four external collaborators.
#[derive(Clone)]
pub struct WorldHandles {
    /// Read-only world queries.
    pub view: Arc<dyn WorldView>,
    /// Pathfinding service.
    pub navigator: Arc<dyn Navigator>,
    /// In-game action primitives.
    pub actions: Arc<dyn ActionExecutor>,
    /// User-facing response channel.
    pub reporter: Arc<dyn Reporter>,
}

impl core::fmt::Debug for WorldHandles {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WorldHandles").finish_non_exhaustive()
    }
}
