//! The goals registry: three priority lanes of goal trees.
//!
//! Each call to [`GoalScheduler::tick`] runs these phases:
//!
//! 1. **Cancellation sweep** -- roots targeted by a pending cancellation
//!    that never started are retired as cancelled; if no targeted root
//!    remains the request is acknowledged.
//!
//! 2. **Lane selection** -- `critical` if non-empty, else `survival`, else
//!    `normal`. Only the head root of the selected lane progresses.
//!
//! 3. **Descent** -- walk from the head root through front children to the
//!    leaf. A node deeper than [`MAX_TREE_DEPTH`] is failed with
//!    [`GoalError::TooDeep`] and its subtree discarded.
//!
//! 4. **Leaf** -- poll a parked future, or run the cancel hook and resolve
//!    as cancelled under a targeting request, or call [`Goal::step`].
//!    Panics are caught and become [`GoalError::Panicked`].
//!
//! 5. **Resolution** -- retire the node and its subtree, log by lane
//!    severity, fire callbacks in order, hand the result to the parent.
//!
//! 6. **Idle tracking** -- remember when the agent last ran out of
//!    non-quiet work.
//!
//! [`Goal::step`]: crate::goal::Goal::step

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use quarry_types::{GoalId, Lane};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::arena::{GoalArena, GoalNode};
use crate::callbacks::{Callbacks, Submission};
use crate::cancel::{CancelCallback, CancelRequest, LaneSet};
use crate::context::{GoalContext, WorldContext};
use crate::error::GoalError;
use crate::goal::{Goal, Step};
use crate::outcome::GoalResult;

/// Deepest tree level a goal may run at; roots are level 0.
pub const MAX_TREE_DEPTH: usize = 10;

/// Identity of a goal as it appears in a tick summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalRecord {
    /// Goal id.
    pub id: GoalId,
    /// Goal label at the time of the record.
    pub label: String,
    /// Tree depth.
    pub depth: usize,
}

/// A goal resolved during a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Goal id.
    pub id: GoalId,
    /// Goal label.
    pub label: String,
    /// Lane the goal ran in.
    pub lane: Lane,
    /// Tree depth.
    pub depth: usize,
    /// Whether the goal was quiet.
    pub quiet: bool,
    /// The goal's single result.
    pub result: GoalResult,
}

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Lane advanced, if any lane had work.
    pub lane: Option<Lane>,
    /// The leaf that was stepped or polled.
    pub stepped: Option<GoalRecord>,
    /// Children spawned this tick, in spawn order.
    pub spawned: Vec<GoalRecord>,
    /// Goals resolved this tick, in resolution order.
    pub resolved: Vec<Resolution>,
    /// Whether a pending cancellation was acknowledged this tick.
    pub cancellation_completed: bool,
}

impl TickSummary {
    /// The resolution of `id`, if it resolved this tick.
    pub fn resolution(&self, id: GoalId) -> Option<&Resolution> {
        self.resolved.iter().find(|r| r.id == id)
    }
}

/// One live goal in a status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalStatus {
    /// Goal id.
    pub id: GoalId,
    /// Goal label.
    pub label: String,
    /// Tree depth.
    pub depth: usize,
    /// Whether the goal is quiet.
    pub quiet: bool,
    /// Whether the goal is parked on a pending future.
    pub suspended: bool,
}

/// Live goals of one lane, depth-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaneStatus {
    /// The lane.
    pub lane: Lane,
    /// Its goals, roots in submission order, children before siblings.
    pub goals: Vec<GoalStatus>,
}

/// Snapshot of the whole scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerStatus {
    /// Ticks run so far.
    pub tick: u64,
    /// Per-lane goals, highest priority first.
    pub lanes: Vec<LaneStatus>,
    /// Whether a cancellation is pending.
    pub cancelling: bool,
    /// When the agent last ran out of non-quiet work.
    pub idle_since: Option<DateTime<Utc>>,
}

impl SchedulerStatus {
    /// Multi-line human-readable rendering, or `idle` when nothing runs.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        for lane in &self.lanes {
            if lane.goals.is_empty() {
                continue;
            }
            lines.push(format!("{}:", lane.lane));
            for goal in &lane.goals {
                let indent = "  ".repeat(goal.depth.saturating_add(1));
                let marker = if goal.suspended { " (waiting)" } else { "" };
                lines.push(format!("{indent}{}{marker}", goal.label));
            }
        }
        if lines.is_empty() {
            return String::from("idle");
        }
        lines.join("\n")
    }
}

#[derive(Default)]
struct Lanes {
    critical: VecDeque<GoalId>,
    survival: VecDeque<GoalId>,
    normal: VecDeque<GoalId>,
}

impl Lanes {
    const fn get(&self, lane: Lane) -> &VecDeque<GoalId> {
        match lane {
            Lane::Critical => &self.critical,
            Lane::Survival => &self.survival,
            Lane::Normal => &self.normal,
        }
    }

    fn get_mut(&mut self, lane: Lane) -> &mut VecDeque<GoalId> {
        match lane {
            Lane::Critical => &mut self.critical,
            Lane::Survival => &mut self.survival,
            Lane::Normal => &mut self.normal,
        }
    }
}

/// Three-lane cooperative scheduler of hierarchical goals.
pub struct GoalScheduler {
    arena: GoalArena,
    lanes: Lanes,
    next_id: GoalId,
    tick: u64,
    cancel: Option<CancelRequest>,
    idle_since: Option<DateTime<Utc>>,
}

impl Default for GoalScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for GoalScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GoalScheduler")
            .field("tick", &self.tick)
            .field("goals", &self.arena.len())
            .field("cancelling", &self.cancel.is_some())
            .finish_non_exhaustive()
    }
}

impl GoalScheduler {
    /// An empty scheduler.
    pub fn new() -> Self {
        Self {
            arena: GoalArena::default(),
            lanes: Lanes::default(),
            next_id: GoalId::new(1),
            tick: 0,
            cancel: None,
            idle_since: None,
        }
    }

    // -----------------------------------------------------------------------
    // Submission and cancellation
    // -----------------------------------------------------------------------

    /// Append a root goal to the end of `lane`. Returns its id.
    pub fn push(&mut self, lane: Lane, submission: Submission) -> GoalId {
        let id = self.next_id;
        self.next_id = id.next();
        let label = submission.goal.label();
        if submission.quiet {
            debug!(goal = %id, %lane, label, "quiet goal submitted");
        } else {
            info!(goal = %id, %lane, label, "goal submitted");
        }
        self.arena.insert(GoalNode::new(
            id,
            None,
            0,
            submission.quiet,
            lane,
            submission.goal,
            submission.callbacks,
        ));
        self.lanes.get_mut(lane).push_back(id);
        id
    }

    /// Request cancellation of every non-quiet root currently in `lanes`.
    ///
    /// `on_done` fires once all of them have resolved. A request made while
    /// another is pending is merged into it.
    pub fn cancel(&mut self, lanes: LaneSet, on_done: impl FnOnce() + Send + 'static) {
        let cutoff = self.next_id;
        let callback: CancelCallback = Box::new(on_done);
        match self.cancel.as_mut() {
            Some(request) => request.merge(lanes, cutoff, callback),
            None => {
                self.cancel = Some(CancelRequest::new(lanes, cutoff, callback, Utc::now()));
            }
        }
        info!(?lanes, cutoff = %cutoff, "cancellation requested");
    }

    /// Whether a cancellation request is pending.
    pub const fn is_cancelling(&self) -> bool {
        self.cancel.is_some()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Number of root goals in `lane`.
    pub fn lane_len(&self, lane: Lane) -> usize {
        self.lanes.get(lane).len()
    }

    /// Whether every lane is empty.
    pub fn is_empty(&self) -> bool {
        Lane::ALL.iter().all(|lane| self.lanes.get(*lane).is_empty())
    }

    /// Whether `lane` holds a non-quiet root.
    pub fn has_non_quiet(&self, lane: Lane) -> bool {
        self.lanes
            .get(lane)
            .iter()
            .any(|id| self.arena.get(*id).is_some_and(|n| !n.quiet))
    }

    /// When the agent last ran out of non-quiet work, if it is idle.
    pub const fn idle_since(&self) -> Option<DateTime<Utc>> {
        self.idle_since
    }

    /// Whether the goal `id` is still live.
    pub fn contains(&self, id: GoalId) -> bool {
        self.arena.contains(id)
    }

    /// Ticks run so far.
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Number of live goals across all lanes and depths.
    pub fn goal_count(&self) -> usize {
        self.arena.len()
    }

    /// Snapshot of every live goal.
    pub fn status(&self) -> SchedulerStatus {
        let lanes = Lane::ALL
            .iter()
            .map(|lane| LaneStatus {
                lane: *lane,
                goals: self
                    .lanes
                    .get(*lane)
                    .iter()
                    .flat_map(|root| self.arena.walk(*root))
                    .filter_map(|id| self.arena.get(id))
                    .map(|node| GoalStatus {
                        id: node.id,
                        label: node.goal.label(),
                        depth: node.depth,
                        quiet: node.quiet,
                        suspended: node.pending.is_some(),
                    })
                    .collect(),
            })
            .collect();
        SchedulerStatus {
            tick: self.tick,
            lanes,
            cancelling: self.cancel.is_some(),
            idle_since: self.idle_since,
        }
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance the highest-priority non-empty lane by one step.
    pub fn tick(&mut self, world: &mut WorldContext<'_>) -> TickSummary {
        self.tick = self.tick.saturating_add(1);
        let mut summary = TickSummary {
            tick: self.tick,
            ..TickSummary::default()
        };

        self.sweep_unstarted(world, &mut summary);
        self.acknowledge_cancel(&mut summary);

        if let Some(lane) = self.select_lane() {
            summary.lane = Some(lane);
            self.advance(lane, world, &mut summary);
        }

        self.acknowledge_cancel(&mut summary);
        self.track_idle(world.now);
        summary
    }

    fn select_lane(&self) -> Option<Lane> {
        Lane::ALL
            .into_iter()
            .find(|lane| !self.lanes.get(*lane).is_empty())
    }

    fn is_targeted(&self, lane: Lane, root: GoalId) -> bool {
        let Some(request) = self.cancel.as_ref() else {
            return false;
        };
        self.arena
            .get(root)
            .is_some_and(|node| request.targets(lane, root, node.quiet))
    }

    fn sweep_unstarted(&mut self, world: &mut WorldContext<'_>, summary: &mut TickSummary) {
        if self.cancel.is_none() {
            return;
        }
        let mut doomed = Vec::new();
        for lane in Lane::ALL {
            for id in self.lanes.get(lane) {
                let unstarted = self.arena.get(*id).is_some_and(|n| !n.started);
                if unstarted && self.is_targeted(lane, *id) {
                    doomed.push(*id);
                }
            }
        }
        for id in doomed {
            self.finish(id, Err(GoalError::Cancelled), world, summary);
        }
    }

    fn acknowledge_cancel(&mut self, summary: &mut TickSummary) {
        if self.cancel.is_none() {
            return;
        }
        let outstanding = Lane::ALL.iter().any(|lane| {
            self.lanes
                .get(*lane)
                .iter()
                .any(|id| self.is_targeted(*lane, *id))
        });
        if outstanding {
            return;
        }
        let Some(request) = self.cancel.take() else {
            return;
        };
        let waited_ms = Utc::now()
            .signed_duration_since(request.requested_at)
            .num_milliseconds();
        info!(lanes = ?request.lanes, waited_ms, "cancellation acknowledged");
        for callback in request.callbacks {
            if catch_unwind(AssertUnwindSafe(callback)).is_err() {
                warn!("cancellation callback panicked");
            }
        }
        summary.cancellation_completed = true;
    }

    fn advance(&mut self, lane: Lane, world: &mut WorldContext<'_>, summary: &mut TickSummary) {
        let Some(root) = self.lanes.get(lane).front().copied() else {
            return;
        };
        if !self.arena.contains(root) {
            warn!(goal = %root, %lane, "dropping stale lane entry");
            self.lanes.get_mut(lane).retain(|id| *id != root);
            return;
        }
        let cancelling = self.is_targeted(lane, root);

        let mut current = root;
        loop {
            let Some(node) = self.arena.get(current) else {
                return;
            };
            if node.depth > MAX_TREE_DEPTH {
                warn!(goal = %current, depth = node.depth, "goal tree too deep");
                summary.stepped = Some(GoalRecord {
                    id: current,
                    label: node.goal.label(),
                    depth: node.depth,
                });
                let error = GoalError::TooDeep {
                    limit: MAX_TREE_DEPTH,
                };
                self.finish(current, Err(error), world, summary);
                return;
            }
            match node.children.first() {
                Some(child) => current = *child,
                None => break,
            }
        }

        self.run_leaf(current, cancelling, world, summary);
    }

    fn run_leaf(
        &mut self,
        id: GoalId,
        cancelling: bool,
        world: &mut WorldContext<'_>,
        summary: &mut TickSummary,
    ) {
        let Self { arena, next_id, .. } = self;
        let Some(node) = arena.get_mut(id) else {
            return;
        };
        let (depth, quiet, lane) = (node.depth, node.quiet, node.lane);
        summary.stepped = Some(GoalRecord {
            id,
            label: node.goal.label(),
            depth,
        });

        // Parked future: never aborted, only asked to stop via the hook.
        if node.pending.is_some() {
            if cancelling && !node.cancel_hook_ran {
                node.cancel_hook_ran = true;
                let mut ctx = GoalContext::new(world, next_id, id, depth, quiet, lane);
                run_cancel_hook(id, node.goal.as_mut(), &mut ctx);
            }
            let Some(future) = node.pending.as_mut() else {
                return;
            };
            let result = match catch_unwind(AssertUnwindSafe(|| future.now_or_never())) {
                Ok(None) => return,
                Ok(Some(_)) if cancelling => Err(GoalError::Cancelled),
                Ok(Some(result)) => result,
                Err(payload) => Err(GoalError::Panicked {
                    message: panic_message(payload.as_ref()),
                }),
            };
            node.pending = None;
            self.finish(id, result, world, summary);
            return;
        }

        if cancelling {
            node.cancel_hook_ran = true;
            let mut ctx = GoalContext::new(world, next_id, id, depth, quiet, lane);
            run_cancel_hook(id, node.goal.as_mut(), &mut ctx);
            self.finish(id, Err(GoalError::Cancelled), world, summary);
            return;
        }

        if !node.started {
            node.started = true;
            let label = node.goal.label();
            if quiet || depth > 0 {
                debug!(goal = %id, %lane, depth, label, "goal started");
            } else {
                info!(goal = %id, %lane, label, "goal started");
            }
        }

        let mut ctx = GoalContext::new(world, next_id, id, depth, quiet, lane);
        let step = catch_unwind(AssertUnwindSafe(|| node.goal.step(&mut ctx)));
        let spawned = ctx.into_spawned();
        node.children.extend(spawned.iter().map(|(child, _)| *child));

        let child_depth = depth.saturating_add(1);
        for (child, goal) in spawned {
            let label = goal.label();
            debug!(parent = %id, goal = %child, depth = child_depth, label, "goal spawned");
            summary.spawned.push(GoalRecord {
                id: child,
                label,
                depth: child_depth,
            });
            arena.insert(GoalNode::new(
                child,
                Some(id),
                child_depth,
                quiet,
                lane,
                goal,
                Callbacks::default(),
            ));
        }

        match step {
            Ok(Step::Pending) => {}
            Ok(Step::Done(result)) => self.finish(id, result, world, summary),
            Ok(Step::Suspended(future)) => {
                if let Some(node) = self.arena.get_mut(id) {
                    node.pending = Some(future);
                }
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(goal = %id, message, "goal step panicked");
                self.finish(id, Err(GoalError::Panicked { message }), world, summary);
            }
        }
    }

    /// Retire `id` with `result`: remove it and its subtree, report, fire
    /// callbacks, then notify the parent.
    fn finish(
        &mut self,
        id: GoalId,
        result: GoalResult,
        world: &mut WorldContext<'_>,
        summary: &mut TickSummary,
    ) {
        let Some((node, discarded)) = self.arena.remove_subtree(id) else {
            return;
        };
        if node.parent.is_none() {
            self.lanes.get_mut(node.lane).retain(|root| *root != id);
        }

        let label = node.goal.label();
        report(&node, &label, &result, world);
        if discarded > 0 {
            debug!(goal = %id, discarded, "discarded unfinished children");
        }
        summary.resolved.push(Resolution {
            id,
            label,
            lane: node.lane,
            depth: node.depth,
            quiet: node.quiet,
            result: result.clone(),
        });

        let panicked = node.callbacks.fire(&result);
        if panicked > 0 {
            warn!(goal = %id, panicked, "completion callbacks panicked");
        }

        let Some(parent_id) = node.parent else {
            return;
        };
        let Some(parent) = self.arena.get_mut(parent_id) else {
            return;
        };
        let delivered = catch_unwind(AssertUnwindSafe(|| {
            parent.goal.child_finished(id, &result);
        }));
        if let Err(payload) = delivered {
            let message = panic_message(payload.as_ref());
            warn!(goal = %parent_id, message, "child_finished panicked");
            self.finish(parent_id, Err(GoalError::Panicked { message }), world, summary);
        }
    }

    fn track_idle(&mut self, now: DateTime<Utc>) {
        let busy = Lane::ALL.iter().any(|lane| self.has_non_quiet(*lane));
        if busy {
            self.idle_since = None;
        } else if self.idle_since.is_none() {
            self.idle_since = Some(now);
        }
    }
}

fn run_cancel_hook(id: GoalId, goal: &mut dyn Goal, ctx: &mut GoalContext<'_>) {
    if catch_unwind(AssertUnwindSafe(|| goal.cancel(ctx))).is_err() {
        warn!(goal = %id, "cancel hook panicked");
    }
}

/// Log a resolution at the severity its lane calls for, surfacing failed
/// non-quiet normal roots to the user.
fn report(node: &GoalNode, label: &str, result: &GoalResult, world: &WorldContext<'_>) {
    let (id, lane, depth) = (node.id, node.lane, node.depth);
    let visible_root = depth == 0 && !node.quiet;
    match result {
        Ok(outcome) if visible_root => {
            info!(goal = %id, %lane, label, %outcome, "goal succeeded");
        }
        Ok(outcome) => {
            debug!(goal = %id, %lane, depth, label, %outcome, "goal succeeded");
        }
        Err(error) => match lane {
            Lane::Critical => debug!(goal = %id, %lane, depth, label, %error, "goal failed"),
            Lane::Survival if depth == 0 => {
                warn!(goal = %id, %lane, label, %error, "goal failed");
            }
            Lane::Normal if visible_root => {
                warn!(goal = %id, %lane, label, %error, "goal failed");
                if !error.is_cancelled() {
                    world.handles.reporter.say(&format!("{label} failed: {error}"));
                }
            }
            Lane::Survival | Lane::Normal => {
                debug!(goal = %id, %lane, depth, label, %error, "goal failed");
            }
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_owned();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    String::from("non-string panic payload")
}
