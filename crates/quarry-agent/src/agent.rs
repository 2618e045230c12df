//! The agent: scheduler, memory, triggers and collaborators in one place.
//!
//! [`Agent`] holds all process state. It is created once with
//! [`Agent::new`] or [`Agent::load`], driven by [`Agent::tick`], fed user
//! instructions through [`Agent::execute`], and torn down with
//! [`Agent::shutdown`], which writes memory back to disk.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use quarry_goals::{Goal, GoalScheduler, LaneSet, Submission, TickSummary, WorldContext};
use quarry_types::{GoalId, Lane, Vec3};
use quarry_world::{AgentMemory, NavTarget, WorldHandles};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::command::Command;
use crate::config::QuarryConfig;
use crate::error::AgentError;
use crate::kinds::{
    CraftItem, DepositItems, Eat, GatherItem, GiveItem, HarvestCrops, NavigateTo, PlantSapling,
    Planning, Sleep, SmeltItem,
};
use crate::triggers::{TriggerInputs, Triggers};

/// An autonomous agent.
pub struct Agent {
    handles: WorldHandles,
    memory: AgentMemory,
    memory_path: Option<PathBuf>,
    scheduler: GoalScheduler,
    triggers: Triggers,
    planning: Planning,
    rng: StdRng,
}

impl core::fmt::Debug for Agent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Agent")
            .field("scheduler", &self.scheduler)
            .field("memory_path", &self.memory_path)
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// An agent with the given memory that does not persist it.
    pub fn new(config: &QuarryConfig, handles: WorldHandles, memory: AgentMemory) -> Self {
        Self {
            handles,
            memory,
            memory_path: None,
            scheduler: GoalScheduler::new(),
            triggers: Triggers::new(config.triggers.clone()),
            planning: Planning::root(Arc::new(config.planner.clone())),
            rng: StdRng::seed_from_u64(config.agent.seed),
        }
    }

    /// An agent whose memory is loaded from, and saved back to,
    /// `agent.memory_path`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Memory`] if an existing memory file cannot be
    /// read or parsed.
    pub fn load(config: &QuarryConfig, handles: WorldHandles) -> Result<Self, AgentError> {
        let path = config.agent.memory_path.clone();
        let memory = AgentMemory::load(&path)?;
        info!(
            path = %path.display(),
            beds = memory.beds.len(),
            chests = memory.chests.len(),
            crafting_tables = memory.crafting_tables.len(),
            furnaces = memory.furnaces.len(),
            saplings = memory.saplings.len(),
            "Agent memory loaded"
        );
        let mut agent = Self::new(config, handles, memory);
        agent.memory_path = Some(path);
        Ok(agent)
    }

    /// Carry out a user command. Work commands become a non-quiet root in
    /// the normal lane and their id is returned; `stop` and `status` answer
    /// directly.
    pub fn execute(&mut self, command: Command) -> Option<GoalId> {
        info!(command = command.name(), "command received");
        match command {
            Command::Stop => {
                let reporter = Arc::clone(&self.handles.reporter);
                self.scheduler
                    .cancel(LaneSet::NORMAL, move || reporter.say("stopped"));
                None
            }
            Command::Status => {
                let status = self.scheduler.status().render();
                self.handles.reporter.say(&status);
                None
            }
            work => {
                let goal = self.goal_for(work)?;
                let label = goal.label();
                let reporter = Arc::clone(&self.handles.reporter);
                let submission = Submission::boxed(goal)
                    .then(move |outcome| reporter.say(&format!("{label}: {outcome}")));
                Some(self.scheduler.push(Lane::Normal, submission))
            }
        }
    }

    fn goal_for(&self, command: Command) -> Option<Box<dyn Goal>> {
        let planning = self.planning.clone();
        let goal: Box<dyn Goal> = match command {
            Command::Gather { item, count, force } => {
                let gather = GatherItem::new(item, count, planning);
                if force {
                    Box::new(gather.forced())
                } else {
                    Box::new(gather)
                }
            }
            Command::Craft { item, count } => Box::new(CraftItem::new(item, count, planning)),
            Command::Smelt { item, count } => Box::new(SmeltItem::new(item, count, planning)),
            Command::Goto { x, y, z } => {
                Box::new(NavigateTo::new(NavTarget::Point(Vec3::new(x, y, z))))
            }
            Command::Give {
                player,
                item,
                count,
            } => Box::new(GiveItem::new(player, item, count, planning)),
            Command::Eat => Box::new(Eat::new()),
            Command::Sleep => Box::new(Sleep::new(planning)),
            Command::Plant => Box::new(PlantSapling::new()),
            Command::Harvest => Box::new(HarvestCrops::new(planning)),
            Command::Deposit { item } => match item {
                Some(item) => Box::new(DepositItems::new(planning).only(item)),
                None => Box::new(DepositItems::new(planning)),
            },
            Command::Stop | Command::Status => return None,
        };
        Some(goal)
    }

    /// Push a root goal directly.
    pub fn push(&mut self, lane: Lane, submission: Submission) -> GoalId {
        self.scheduler.push(lane, submission)
    }

    /// Evaluate triggers and run one scheduler tick now.
    pub fn tick(&mut self) -> TickSummary {
        self.tick_at(Utc::now())
    }

    /// Evaluate triggers and run one scheduler tick stamped `now`.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> TickSummary {
        let inputs = TriggerInputs {
            view: self.handles.view.as_ref(),
            memory: &self.memory,
            scheduler: &self.scheduler,
            planning: &self.planning,
            now,
        };
        let fired = self.triggers.evaluate(inputs, &mut self.rng);
        for firing in fired {
            self.scheduler
                .push(firing.lane, Submission::boxed(firing.goal).quiet());
        }

        let mut world = WorldContext::new(&self.handles, &mut self.memory, now);
        let summary = self.scheduler.tick(&mut world);
        if summary.cancellation_completed {
            debug!(tick = summary.tick, "stop acknowledged");
        }
        summary
    }

    /// Whether any lane holds work the user is waiting on.
    pub fn has_work(&self) -> bool {
        Lane::ALL
            .iter()
            .any(|lane| self.scheduler.has_non_quiet(*lane))
            || self.scheduler.is_cancelling()
    }

    /// The scheduler.
    pub const fn scheduler(&self) -> &GoalScheduler {
        &self.scheduler
    }

    /// The agent's memory.
    pub const fn memory(&self) -> &AgentMemory {
        &self.memory
    }

    /// Collaborator handles.
    pub const fn handles(&self) -> &WorldHandles {
        &self.handles
    }

    /// Save memory (when loaded from a file) and hand it back.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Memory`] if memory cannot be written.
    pub fn shutdown(mut self) -> Result<AgentMemory, AgentError> {
        if let Some(path) = &self.memory_path {
            self.memory.save(path)?;
            info!(path = %path.display(), "Agent memory saved");
        }
        info!(
            ticks = self.scheduler.tick_count(),
            goals_left = self.scheduler.goal_count(),
            "Agent shut down"
        );
        Ok(self.memory)
    }
}
