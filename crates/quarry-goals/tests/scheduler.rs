//! Integration tests for the goal scheduler: traversal order, lane
//! pre-emption, single resolution, cancellation, panic isolation and the
//! depth guard.

#![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::missing_const_for_fn
)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures::FutureExt;
use quarry_goals::{
    Goal, GoalContext, GoalError, GoalResult, GoalScheduler, LaneSet, MAX_TREE_DEPTH, Outcome,
    Step, Submission, TickSummary, WorldContext,
};
use quarry_types::{GoalId, Lane, Vec3};
use quarry_world::{AgentMemory, MovementProfile, NavTarget, SimWorld, WorldHandles};

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    world: SimWorld,
    handles: WorldHandles,
    memory: AgentMemory,
    scheduler: GoalScheduler,
}

impl Harness {
    fn new() -> Self {
        let world = SimWorld::vanilla();
        let handles = world.handles();
        Self {
            world,
            handles,
            memory: AgentMemory::default(),
            scheduler: GoalScheduler::new(),
        }
    }

    fn tick(&mut self) -> TickSummary {
        let mut ctx = WorldContext::new(&self.handles, &mut self.memory, Utc::now());
        self.scheduler.tick(&mut ctx)
    }

    fn tick_until_resolved(&mut self, id: GoalId, limit: usize) -> GoalResult {
        for _ in 0..limit {
            let summary = self.tick();
            if let Some(resolution) = summary.resolution(id) {
                return resolution.result.clone();
            }
        }
        panic!("goal {id} did not resolve within {limit} ticks");
    }
}

type Log = Arc<Mutex<Vec<String>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

fn count(c: &Arc<AtomicUsize>) -> usize {
    c.load(Ordering::SeqCst)
}

// ---------------------------------------------------------------------------
// Test goals
// ---------------------------------------------------------------------------

/// Logs its name on every step; spawns leaf children on the first step.
struct Tree {
    name: String,
    children: Vec<String>,
    spawned: bool,
    log: Log,
}

impl Tree {
    fn new(name: &str, children: &[&str], log: &Log) -> Self {
        Self {
            name: name.to_owned(),
            children: children.iter().map(|c| (*c).to_owned()).collect(),
            spawned: false,
            log: Arc::clone(log),
        }
    }

    fn leaf(name: &str, log: &Log) -> Self {
        Self::new(name, &[], log)
    }
}

impl Goal for Tree {
    fn label(&self) -> String {
        self.name.clone()
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        self.log.lock().unwrap().push(self.name.clone());
        if !self.spawned && !self.children.is_empty() {
            self.spawned = true;
            for child in &self.children {
                ctx.spawn(Self::leaf(child, &self.log));
            }
            return Step::Pending;
        }
        Step::ok(Outcome::Done)
    }
}

/// Runs forever, counting steps and cancel-hook calls.
struct Forever {
    steps: Arc<AtomicUsize>,
    cancels: Arc<AtomicUsize>,
}

impl Forever {
    fn new(steps: &Arc<AtomicUsize>, cancels: &Arc<AtomicUsize>) -> Self {
        Self {
            steps: Arc::clone(steps),
            cancels: Arc::clone(cancels),
        }
    }
}

impl Goal for Forever {
    fn label(&self) -> String {
        String::from("forever")
    }

    fn step(&mut self, _ctx: &mut GoalContext<'_>) -> Step {
        self.steps.fetch_add(1, Ordering::SeqCst);
        Step::Pending
    }

    fn cancel(&mut self, _ctx: &mut GoalContext<'_>) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// Finishes after `left` pending steps.
struct Countdown {
    left: u32,
}

impl Goal for Countdown {
    fn label(&self) -> String {
        format!("countdown {}", self.left)
    }

    fn step(&mut self, _ctx: &mut GoalContext<'_>) -> Step {
        if self.left == 0 {
            return Step::ok(Outcome::Waited);
        }
        self.left -= 1;
        Step::Pending
    }
}

/// Suspends on a navigation trip.
struct Travel {
    stop_on_cancel: bool,
    cancels: Arc<AtomicUsize>,
}

impl Goal for Travel {
    fn label(&self) -> String {
        String::from("travel")
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        let trip = ctx.navigator().goto(
            NavTarget::Point(Vec3::new(10.0, 64.0, 0.0)),
            MovementProfile::default(),
        );
        Step::Suspended(
            trip.map(|r| r.map(|()| Outcome::Arrived).map_err(GoalError::from))
                .boxed(),
        )
    }

    fn cancel(&mut self, ctx: &mut GoalContext<'_>) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        if self.stop_on_cancel {
            ctx.navigator().stop();
        }
    }
}

struct Panicker;

impl Goal for Panicker {
    fn label(&self) -> String {
        String::from("panicker")
    }

    fn step(&mut self, _ctx: &mut GoalContext<'_>) -> Step {
        panic!("boom");
    }
}

struct Fail(&'static str);

impl Goal for Fail {
    fn label(&self) -> String {
        String::from("chop")
    }

    fn step(&mut self, _ctx: &mut GoalContext<'_>) -> Step {
        Step::fail(GoalError::failed(self.0))
    }
}

/// Spawns one child (itself, or a countdown) and returns the child's result.
#[derive(Default)]
struct Relay {
    recursive: bool,
    spawned: bool,
    child_result: Option<GoalResult>,
}

impl Goal for Relay {
    fn label(&self) -> String {
        String::from("relay")
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        if let Some(result) = self.child_result.take() {
            return Step::Done(result);
        }
        if self.spawned {
            return Step::fail(GoalError::failed("child result never arrived"));
        }
        self.spawned = true;
        if self.recursive {
            ctx.spawn(Self {
                recursive: true,
                ..Self::default()
            });
        } else {
            ctx.spawn(Countdown { left: 1 });
        }
        Step::Pending
    }

    fn child_finished(&mut self, _child: GoalId, result: &GoalResult) {
        self.child_result = Some(result.clone());
    }
}

// ---------------------------------------------------------------------------
// Traversal and priority
// ---------------------------------------------------------------------------

#[test]
fn roots_run_fifo_and_children_before_siblings() {
    let mut h = Harness::new();
    let log = new_log();
    h.scheduler
        .push(Lane::Normal, Submission::new(Tree::new("A", &["A1", "A2"], &log)));
    h.scheduler
        .push(Lane::Normal, Submission::new(Tree::leaf("B", &log)));

    for _ in 0..5 {
        h.tick();
    }

    assert_eq!(entries(&log), vec!["A", "A1", "A2", "A", "B"]);
    assert!(h.scheduler.is_empty());
    assert_eq!(h.scheduler.goal_count(), 0);
}

#[test]
fn higher_lanes_pre_empt_lower_ones_every_tick() {
    let mut h = Harness::new();
    let steps = counter();
    let cancels = counter();
    h.scheduler
        .push(Lane::Normal, Submission::new(Forever::new(&steps, &cancels)));
    h.scheduler
        .push(Lane::Survival, Submission::new(Countdown { left: 1 }));
    h.scheduler
        .push(Lane::Critical, Submission::new(Countdown { left: 2 }));

    let lanes: Vec<Option<Lane>> = (0..6).map(|_| h.tick().lane).collect();
    assert_eq!(
        lanes,
        vec![
            Some(Lane::Critical),
            Some(Lane::Critical),
            Some(Lane::Critical),
            Some(Lane::Survival),
            Some(Lane::Survival),
            Some(Lane::Normal),
        ]
    );
    assert_eq!(count(&steps), 1);
}

#[test]
fn result_is_delivered_once() {
    let mut h = Harness::new();
    let fired = counter();
    let (on_then, on_catch, on_finally) = (
        Arc::clone(&fired),
        Arc::clone(&fired),
        Arc::clone(&fired),
    );
    let id = h.scheduler.push(
        Lane::Normal,
        Submission::new(Countdown { left: 0 })
            .then(move |_| {
                on_then.fetch_add(1, Ordering::SeqCst);
            })
            .catch(move |_| {
                on_catch.fetch_add(100, Ordering::SeqCst);
            })
            .finally(move |_| {
                on_finally.fetch_add(1, Ordering::SeqCst);
            }),
    );

    let summary = h.tick();
    assert_eq!(
        summary.resolution(id).map(|r| r.result.clone()),
        Some(Ok(Outcome::Waited))
    );
    assert!(!h.scheduler.contains(id));

    for _ in 0..3 {
        assert!(h.tick().resolution(id).is_none());
    }
    assert_eq!(count(&fired), 2);
}

#[test]
fn child_result_reaches_parent_before_its_next_step() {
    let mut h = Harness::new();
    let id = h
        .scheduler
        .push(Lane::Normal, Submission::new(Relay::default()));
    assert_eq!(h.tick_until_resolved(id, 10), Ok(Outcome::Waited));
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[test]
fn cancel_runs_hook_and_fires_once_non_quiet_goals_resolve() {
    let mut h = Harness::new();
    let (steps, cancels) = (counter(), counter());
    let (quiet_steps, quiet_cancels) = (counter(), counter());
    let loud = h
        .scheduler
        .push(Lane::Normal, Submission::new(Forever::new(&steps, &cancels)));
    h.tick();
    let quiet = h.scheduler.push(
        Lane::Normal,
        Submission::new(Forever::new(&quiet_steps, &quiet_cancels)).quiet(),
    );

    let acknowledged = counter();
    let ack = Arc::clone(&acknowledged);
    h.scheduler.cancel(LaneSet::NORMAL, move || {
        ack.fetch_add(1, Ordering::SeqCst);
    });
    assert!(h.scheduler.is_cancelling());

    let summary = h.tick();
    assert_eq!(count(&cancels), 1);
    assert_eq!(
        summary.resolution(loud).map(|r| r.result.clone()),
        Some(Err(GoalError::Cancelled))
    );
    assert!(summary.cancellation_completed);
    assert_eq!(count(&acknowledged), 1);
    assert!(!h.scheduler.is_cancelling());

    // The quiet goal was never targeted and keeps running.
    h.tick();
    assert!(h.scheduler.contains(quiet));
    assert_eq!(count(&quiet_steps), 1);
    assert_eq!(count(&quiet_cancels), 0);
}

#[test]
fn quiet_head_does_not_block_acknowledgement() {
    let mut h = Harness::new();
    let (quiet_steps, quiet_cancels) = (counter(), counter());
    let (steps, cancels) = (counter(), counter());
    h.scheduler.push(
        Lane::Normal,
        Submission::new(Forever::new(&quiet_steps, &quiet_cancels)).quiet(),
    );
    h.tick();
    let waiting = h
        .scheduler
        .push(Lane::Normal, Submission::new(Forever::new(&steps, &cancels)));

    let acknowledged = counter();
    let ack = Arc::clone(&acknowledged);
    h.scheduler.cancel(LaneSet::NORMAL, move || {
        ack.fetch_add(1, Ordering::SeqCst);
    });

    let summary = h.tick();
    assert!(summary.cancellation_completed);
    assert_eq!(count(&acknowledged), 1);
    // Never started: retired without running its hook.
    assert_eq!(
        summary.resolution(waiting).map(|r| r.result.clone()),
        Some(Err(GoalError::Cancelled))
    );
    assert_eq!(count(&steps), 0);
    assert_eq!(count(&cancels), 0);
    assert_eq!(count(&quiet_steps), 2);
    assert_eq!(count(&quiet_cancels), 0);
}

#[test]
fn suspended_goal_is_cancelled_only_when_its_future_settles() {
    let mut h = Harness::new();
    h.world.set_gated(true);
    let cancels = counter();
    let id = h.scheduler.push(
        Lane::Normal,
        Submission::new(Travel {
            stop_on_cancel: false,
            cancels: Arc::clone(&cancels),
        }),
    );
    h.tick();
    assert!(h.scheduler.status().lanes[2].goals[0].suspended);

    let acknowledged = counter();
    let ack = Arc::clone(&acknowledged);
    h.scheduler.cancel(LaneSet::NORMAL, move || {
        ack.fetch_add(1, Ordering::SeqCst);
    });

    for _ in 0..2 {
        let summary = h.tick();
        assert!(summary.resolution(id).is_none());
        assert!(!summary.cancellation_completed);
    }
    assert_eq!(count(&cancels), 1);
    assert_eq!(count(&acknowledged), 0);

    assert_eq!(h.world.release_navigation(), 1);
    let summary = h.tick();
    assert_eq!(
        summary.resolution(id).map(|r| r.result.clone()),
        Some(Err(GoalError::Cancelled))
    );
    assert!(summary.cancellation_completed);
    assert_eq!(count(&acknowledged), 1);
}

#[test]
fn cancel_hook_releasing_movement_settles_in_the_same_tick() {
    let mut h = Harness::new();
    h.world.set_gated(true);
    let id = h.scheduler.push(
        Lane::Normal,
        Submission::new(Travel {
            stop_on_cancel: true,
            cancels: counter(),
        }),
    );
    h.tick();
    h.scheduler.cancel(LaneSet::NORMAL, || {});

    let summary = h.tick();
    assert_eq!(
        summary.resolution(id).map(|r| r.result.clone()),
        Some(Err(GoalError::Cancelled))
    );
    assert!(summary.cancellation_completed);
    assert!(h.world.action_log().contains(&String::from("stop")));
    assert_eq!(h.world.parked_trips(), 0);
}

#[test]
fn goals_pushed_after_cancel_are_not_targeted() {
    let mut h = Harness::new();
    let (steps, cancels) = (counter(), counter());
    h.scheduler
        .push(Lane::Normal, Submission::new(Forever::new(&steps, &cancels)));
    h.tick();
    h.scheduler.cancel(LaneSet::NORMAL, || {});
    let later = h
        .scheduler
        .push(Lane::Normal, Submission::new(Countdown { left: 0 }));

    assert!(h.tick().cancellation_completed);
    assert_eq!(h.tick_until_resolved(later, 3), Ok(Outcome::Waited));
}

#[test]
fn repeated_cancels_merge_and_fire_every_callback() {
    let mut h = Harness::new();
    let (steps, cancels) = (counter(), counter());
    h.scheduler
        .push(Lane::Survival, Submission::new(Forever::new(&steps, &cancels)));
    h.tick();
    let acknowledged = counter();
    for lanes in [LaneSet::NORMAL, LaneSet::only(Lane::Survival)] {
        let ack = Arc::clone(&acknowledged);
        h.scheduler.cancel(lanes, move || {
            ack.fetch_add(1, Ordering::SeqCst);
        });
    }
    assert!(h.tick().cancellation_completed);
    assert_eq!(count(&acknowledged), 2);
    assert_eq!(count(&cancels), 1);
}

// ---------------------------------------------------------------------------
// Async, panics, depth guard
// ---------------------------------------------------------------------------

#[test]
fn suspended_future_is_joined_on_a_later_tick() {
    let mut h = Harness::new();
    let id = h.scheduler.push(
        Lane::Normal,
        Submission::new(Travel {
            stop_on_cancel: false,
            cancels: counter(),
        }),
    );
    let first = h.tick();
    assert!(first.resolved.is_empty());
    assert!(h.scheduler.contains(id));

    let second = h.tick();
    assert_eq!(
        second.resolution(id).map(|r| r.result.clone()),
        Some(Ok(Outcome::Arrived))
    );
}

#[test]
fn panic_in_step_becomes_an_error_result() {
    let mut h = Harness::new();
    let id = h.scheduler.push(Lane::Normal, Submission::new(Panicker));
    let summary = h.tick();
    assert_eq!(
        summary.resolution(id).map(|r| r.result.clone()),
        Some(Err(GoalError::Panicked {
            message: String::from("boom")
        }))
    );

    let next = h
        .scheduler
        .push(Lane::Normal, Submission::new(Countdown { left: 0 }));
    assert_eq!(h.tick_until_resolved(next, 2), Ok(Outcome::Waited));
}

#[test]
fn panicking_callback_does_not_affect_the_others() {
    let mut h = Harness::new();
    let fired = counter();
    let after = Arc::clone(&fired);
    h.scheduler.push(
        Lane::Normal,
        Submission::new(Countdown { left: 0 })
            .then(|_| panic!("callback boom"))
            .then(move |_| {
                after.fetch_add(1, Ordering::SeqCst);
            }),
    );
    h.tick();
    assert_eq!(count(&fired), 1);
}

#[test]
fn runaway_recursion_fails_with_too_deep() {
    let mut h = Harness::new();
    let id = h.scheduler.push(
        Lane::Normal,
        Submission::new(Relay {
            recursive: true,
            ..Relay::default()
        }),
    );
    let mut deepest = 0;
    let mut result = None;
    for _ in 0..60 {
        let summary = h.tick();
        deepest = summary
            .spawned
            .iter()
            .map(|g| g.depth)
            .fold(deepest, usize::max);
        if let Some(r) = summary.resolution(id) {
            result = Some(r.result.clone());
            break;
        }
    }
    assert_eq!(
        result,
        Some(Err(GoalError::TooDeep {
            limit: MAX_TREE_DEPTH
        }))
    );
    assert_eq!(deepest, MAX_TREE_DEPTH + 1);
    assert!(h.scheduler.is_empty());
}

// ---------------------------------------------------------------------------
// Reporting, idle tracking, status
// ---------------------------------------------------------------------------

#[test]
fn failures_are_surfaced_by_lane_severity() {
    let mut h = Harness::new();
    h.scheduler
        .push(Lane::Critical, Submission::new(Fail("cornered")));
    h.scheduler
        .push(Lane::Normal, Submission::new(Fail("quiet failure")).quiet());
    h.scheduler
        .push(Lane::Normal, Submission::new(Fail("no wood")));
    for _ in 0..3 {
        h.tick();
    }
    assert_eq!(h.world.said(), vec![String::from("chop failed: no wood")]);
}

#[test]
fn idle_since_tracks_non_quiet_work() {
    let mut h = Harness::new();
    h.tick();
    let idle = h.scheduler.idle_since();
    assert!(idle.is_some());

    let (steps, cancels) = (counter(), counter());
    h.scheduler.push(
        Lane::Normal,
        Submission::new(Forever::new(&steps, &cancels)).quiet(),
    );
    h.tick();
    assert_eq!(h.scheduler.idle_since(), idle);

    h.scheduler
        .push(Lane::Survival, Submission::new(Countdown { left: 5 }));
    h.tick();
    assert!(h.scheduler.idle_since().is_none());
}

#[test]
fn status_lists_goals_depth_first() {
    let mut h = Harness::new();
    let log = new_log();
    h.scheduler
        .push(Lane::Normal, Submission::new(Tree::new("A", &["A1", "A2"], &log)));
    assert_eq!(h.scheduler.status().render(), "normal:\n  A");
    h.tick();

    let status = h.scheduler.status();
    let normal = &status.lanes[2];
    assert_eq!(normal.lane, Lane::Normal);
    let shape: Vec<(String, usize)> = normal
        .goals
        .iter()
        .map(|g| (g.label.clone(), g.depth))
        .collect();
    assert_eq!(
        shape,
        vec![
            (String::from("A"), 0),
            (String::from("A1"), 1),
            (String::from("A2"), 1)
        ]
    );
    assert!(status.render().contains("    A1"));
    assert_eq!(GoalScheduler::new().status().render(), "idle");
}
