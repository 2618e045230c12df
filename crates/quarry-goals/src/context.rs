//! What a goal sees while it runs.
//!
//! [`WorldContext`] is what the owner of the scheduler passes into each
//! tick: collaborator handles, the agent's memory, and the tick's
//! timestamp. The scheduler narrows it into a [`GoalContext`] for the one
//! goal it steps, adding that goal's identity and the ability to spawn
//! children.

use chrono::{DateTime, Utc};
use quarry_types::{GoalId, Lane};
use quarry_world::{ActionExecutor, AgentMemory, Navigator, Reporter, WorldHandles, WorldView};

use crate::goal::Goal;

/// Per-tick access to the world.
pub struct WorldContext<'a> {
    /// Collaborator handles.
    pub handles: &'a WorldHandles,
    /// The agent's persistent memory.
    pub memory: &'a mut AgentMemory,
    /// Timestamp of this tick.
    pub now: DateTime<Utc>,
}

impl<'a> WorldContext<'a> {
    /// Bundle the per-tick inputs.
    pub const fn new(
        handles: &'a WorldHandles,
        memory: &'a mut AgentMemory,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            handles,
            memory,
            now,
        }
    }
}

/// Context handed to one goal for one step (or cancel hook).
pub struct GoalContext<'a> {
    handles: &'a WorldHandles,
    memory: &'a mut AgentMemory,
    now: DateTime<Utc>,
    next_id: &'a mut GoalId,
    id: GoalId,
    depth: usize,
    quiet: bool,
    lane: Lane,
    spawned: Vec<(GoalId, Box<dyn Goal>)>,
}

impl<'a> GoalContext<'a> {
    /// Context for the goal `id` at `depth` in `lane`.
    pub(crate) fn new(
        world: &'a mut WorldContext<'_>,
        next_id: &'a mut GoalId,
        id: GoalId,
        depth: usize,
        quiet: bool,
        lane: Lane,
    ) -> Self {
        Self {
            handles: world.handles,
            memory: &mut *world.memory,
            now: world.now,
            next_id,
            id,
            depth,
            quiet,
            lane,
            spawned: Vec::new(),
        }
    }

    /// Read-only world queries.
    pub fn view(&self) -> &dyn WorldView {
        self.handles.view.as_ref()
    }

    /// The navigation service.
    pub fn navigator(&self) -> &dyn Navigator {
        self.handles.navigator.as_ref()
    }

    /// The action executor.
    pub fn actions(&self) -> &dyn ActionExecutor {
        self.handles.actions.as_ref()
    }

    /// The agent's memory.
    pub fn memory(&self) -> &AgentMemory {
        &*self.memory
    }

    /// The agent's memory, mutably.
    pub fn memory_mut(&mut self) -> &mut AgentMemory {
        &mut *self.memory
    }

    /// Timestamp of the current tick.
    pub const fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Id of the goal being stepped.
    pub const fn id(&self) -> GoalId {
        self.id
    }

    /// Depth of the goal being stepped (roots are 0).
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Whether the goal's user-visible side effects are suppressed.
    pub const fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Lane the goal runs in.
    pub const fn lane(&self) -> Lane {
        self.lane
    }

    /// Spawn a child goal. Children run in spawn order before this goal is
    /// stepped again. Returns the child's id.
    pub fn spawn<G: Goal + 'static>(&mut self, goal: G) -> GoalId {
        self.spawn_boxed(Box::new(goal))
    }

    /// Spawn an already boxed child goal.
    pub fn spawn_boxed(&mut self, goal: Box<dyn Goal>) -> GoalId {
        let id = *self.next_id;
        *self.next_id = id.next();
        self.spawned.push((id, goal));
        id
    }

    /// Send a message to the user, unless this goal is quiet.
    pub fn say(&self, message: &str) {
        if self.quiet {
            tracing::debug!(goal = %self.id, message, "quiet goal suppressed message");
            return;
        }
        self.handles.reporter.say(message);
    }

    /// The reporter itself, for messages that must go out even from quiet
    /// goals (direct answers to a command).
    pub fn reporter(&self) -> &dyn Reporter {
        self.handles.reporter.as_ref()
    }

    pub(crate) fn into_spawned(self) -> Vec<(GoalId, Box<dyn Goal>)> {
        self.spawned
    }
}
