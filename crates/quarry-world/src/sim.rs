//! In-memory world implementing every collaborator contract.
//!
//! [`SimWorld`] is a small deterministic stand-in for a live game
//! connection: one shared state behind a mutex, actions that complete
//! immediately, and dropped items that are picked up when the agent
//! walks within [`PICKUP_RANGE`] of them. Navigation can be *gated* so
//! that trips stay pending until [`SimWorld::release_navigation`] or
//! [`Navigator::stop`] is called, which is how tests observe suspended
//! goals and cancellation.
//!
//! Clones share state, so one `SimWorld` can be handed out as the view,
//! the navigator, the action executor and the reporter at once.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future;
use quarry_types::{
    BlockPos, EntityId, EntityKind, EntitySnapshot, EquipSlot, Recipe, SmeltingRecipe, Vec3,
};

use crate::actions::{ActionExecutor, ActionFuture};
use crate::data::GameData;
use crate::error::{ActionError, NavError};
use crate::handles::WorldHandles;
use crate::navigation::{MovementProfile, NavFuture, NavTarget, Navigator};
use crate::reporter::Reporter;
use crate::view::WorldView;

/// How far the agent can reach to dig, place, or hit.
pub const REACH: f64 = 4.5;

/// Dropped items within this distance of the agent are picked up on arrival.
pub const PICKUP_RANGE: f64 = 1.5;

/// Maximum food level.
pub const MAX_FOOD: u32 = 20;

/// A navigation trip held open while navigation is gated.
struct ParkedTrip {
    destination: Vec3,
    reply: oneshot::Sender<Result<(), NavError>>,
}

struct SimState {
    position: Vec3,
    health: f32,
    food: u32,
    night: bool,
    inventory: BTreeMap<String, u32>,
    held: Option<String>,
    blocks: BTreeMap<BlockPos, String>,
    entities: BTreeMap<EntityId, EntitySnapshot>,
    next_entity: EntityId,
    containers: BTreeMap<BlockPos, BTreeMap<String, u32>>,
    open_container: Option<BlockPos>,
    sleeping: bool,
    gated: bool,
    parked: Vec<ParkedTrip>,
    log: Vec<String>,
    said: Vec<String>,
}

impl SimState {
    fn new() -> Self {
        Self {
            position: Vec3::new(0.5, 64.0, 0.5),
            health: 20.0,
            food: MAX_FOOD,
            night: false,
            inventory: BTreeMap::new(),
            held: None,
            blocks: BTreeMap::new(),
            entities: BTreeMap::new(),
            next_entity: EntityId::new(1),
            containers: BTreeMap::new(),
            open_container: None,
            sleeping: false,
            gated: false,
            parked: Vec::new(),
            log: Vec::new(),
            said: Vec::new(),
        }
    }

    fn record(&mut self, entry: String) {
        tracing::trace!(action = %entry, "sim action");
        self.log.push(entry);
    }

    fn have(&self, item: &str) -> u32 {
        self.inventory.get(item).copied().unwrap_or(0)
    }

    fn add_item(&mut self, item: &str, count: u32) {
        if count == 0 {
            return;
        }
        let slot = self.inventory.entry(item.to_owned()).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    fn require(&self, item: &str, needed: u32) -> Result<(), ActionError> {
        let have = self.have(item);
        if have < needed {
            return Err(ActionError::MissingItem {
                item: item.to_owned(),
                needed,
                have,
            });
        }
        Ok(())
    }

    fn take_item(&mut self, item: &str, count: u32) -> Result<(), ActionError> {
        self.require(item, count)?;
        let left = self.have(item).saturating_sub(count);
        if left == 0 {
            self.inventory.remove(item);
            if self.held.as_deref() == Some(item) {
                self.held = None;
            }
        } else {
            self.inventory.insert(item.to_owned(), left);
        }
        Ok(())
    }

    fn spawn(&mut self, name: &str, kind: EntityKind, position: Vec3, health: f32) -> EntityId {
        let id = self.next_entity;
        self.next_entity = id.next();
        self.entities.insert(
            id,
            EntitySnapshot {
                id,
                name: name.to_owned(),
                kind,
                position,
                health,
            },
        );
        id
    }

    fn arrive(&mut self, destination: Vec3) {
        self.position = destination;
        let picked: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| {
                e.kind == EntityKind::Drop && e.position.distance_to(destination) <= PICKUP_RANGE
            })
            .map(|e| e.id)
            .collect();
        for id in picked {
            if let Some(drop) = self.entities.remove(&id) {
                self.add_item(&drop.name, 1);
                self.record(format!("pickup {}", drop.name));
            }
        }
    }

    fn destination(&self, target: NavTarget) -> Result<Vec3, NavError> {
        match target {
            NavTarget::Point(point) => Ok(point),
            NavTarget::Near { point, range } => {
                if self.position.distance_to(point) <= range {
                    Ok(self.position)
                } else {
                    Ok(point)
                }
            }
            NavTarget::Block(pos) => Ok(pos.center().offset(1.0, 0.0, 0.0)),
            NavTarget::Entity { id, range } => {
                let entity = self.entities.get(&id).ok_or_else(|| NavError::NoPath {
                    reason: format!("entity {id} is gone"),
                })?;
                if self.position.distance_to(entity.position) <= range {
                    Ok(self.position)
                } else {
                    Ok(entity.position)
                }
            }
            NavTarget::AwayFrom { point, distance } => {
                Ok(self.position.away_from(point, distance))
            }
        }
    }

    fn within_reach(&self, point: Vec3, what: &str) -> Result<(), ActionError> {
        if self.position.distance_to(point) > REACH {
            return Err(ActionError::OutOfReach {
                target: what.to_owned(),
            });
        }
        Ok(())
    }

    fn station(&self, pos: BlockPos, station: &str, matches: bool) -> Result<(), ActionError> {
        if !matches {
            return Err(ActionError::NoStation {
                station: station.to_owned(),
                pos,
            });
        }
        self.within_reach(pos.center(), station)
    }

    fn interrupt_trips(&mut self) -> usize {
        let trips = std::mem::take(&mut self.parked);
        let n = trips.len();
        for trip in trips {
            let _ = trip.reply.send(Err(NavError::Interrupted));
        }
        n
    }
}

/// A deterministic in-memory world.
#[derive(Clone)]
pub struct SimWorld {
    data: Arc<GameData>,
    state: Arc<Mutex<SimState>>,
}

impl core::fmt::Debug for SimWorld {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state();
        f.debug_struct("SimWorld")
            .field("position", &state.position)
            .field("blocks", &state.blocks.len())
            .field("entities", &state.entities.len())
            .finish_non_exhaustive()
    }
}

impl SimWorld {
    /// Create an empty world (no blocks, no entities) with the given rules.
    pub fn new(data: GameData) -> Self {
        Self {
            data: Arc::new(data),
            state: Arc::new(Mutex::new(SimState::new())),
        }
    }

    /// Create an empty world with the built-in vanilla rules.
    pub fn vanilla() -> Self {
        Self::new(GameData::vanilla())
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bundle this world as every collaborator handle.
    pub fn handles(&self) -> WorldHandles {
        WorldHandles {
            view: Arc::new(self.clone()),
            navigator: Arc::new(self.clone()),
            actions: Arc::new(self.clone()),
            reporter: Arc::new(self.clone()),
        }
    }

    // -- setup ---------------------------------------------------------------

    /// Add items to the agent's inventory.
    pub fn give(&self, item: &str, count: u32) {
        self.state().add_item(item, count);
    }

    /// Put a block at a position, replacing whatever was there.
    pub fn set_block(&self, pos: BlockPos, name: &str) {
        self.state().blocks.insert(pos, name.to_owned());
    }

    /// Fill the box between two corners (inclusive) with one block.
    pub fn fill(&self, from: BlockPos, to: BlockPos, name: &str) {
        let mut state = self.state();
        for x in from.x.min(to.x)..=from.x.max(to.x) {
            for y in from.y.min(to.y)..=from.y.max(to.y) {
                for z in from.z.min(to.z)..=from.z.max(to.z) {
                    state.blocks.insert(BlockPos::new(x, y, z), name.to_owned());
                }
            }
        }
    }

    /// Remove the block at a position.
    pub fn clear_block(&self, pos: BlockPos) {
        self.state().blocks.remove(&pos);
    }

    /// Spawn a creature known to the game data; unknown names spawn as
    /// passive with one hit point.
    pub fn spawn_creature(&self, name: &str, position: Vec3) -> EntityId {
        let (kind, health) = self
            .data
            .creature(name)
            .map_or((EntityKind::Passive, 1.0), |c| (c.kind, c.health));
        self.state().spawn(name, kind, position, health)
    }

    /// Spawn another player.
    pub fn spawn_player(&self, name: &str, position: Vec3) -> EntityId {
        self.state().spawn(name, EntityKind::Player, position, 20.0)
    }

    /// Drop one item on the ground.
    pub fn spawn_drop(&self, item: &str, position: Vec3) -> EntityId {
        self.state().spawn(item, EntityKind::Drop, position, 1.0)
    }

    /// Remove an entity.
    pub fn remove_entity(&self, id: EntityId) {
        self.state().entities.remove(&id);
    }

    /// Move an entity.
    pub fn move_entity(&self, id: EntityId, position: Vec3) {
        if let Some(entity) = self.state().entities.get_mut(&id) {
            entity.position = position;
        }
    }

    /// Teleport the agent.
    pub fn set_position(&self, position: Vec3) {
        self.state().position = position;
    }

    /// Set the day/night flag.
    pub fn set_night(&self, night: bool) {
        self.state().night = night;
    }

    /// Set the agent's food level.
    pub fn set_food(&self, food: u32) {
        self.state().food = food.min(MAX_FOOD);
    }

    /// Set the agent's health.
    pub fn set_health(&self, health: f32) {
        self.state().health = health;
    }

    /// Hold navigation trips open until released or stopped.
    pub fn set_gated(&self, gated: bool) {
        self.state().gated = gated;
    }

    /// Complete every parked trip successfully. Returns how many there were.
    pub fn release_navigation(&self) -> usize {
        let mut state = self.state();
        let trips = std::mem::take(&mut state.parked);
        let n = trips.len();
        for trip in trips {
            state.arrive(trip.destination);
            let _ = trip.reply.send(Ok(()));
        }
        n
    }

    /// Number of trips waiting for release.
    pub fn parked_trips(&self) -> usize {
        self.state().parked.len()
    }

    // -- inspection ----------------------------------------------------------

    /// Every action and release primitive performed so far, in order.
    pub fn action_log(&self) -> Vec<String> {
        self.state().log.clone()
    }

    /// Every message sent through the reporter, in order.
    pub fn said(&self) -> Vec<String> {
        self.state().said.clone()
    }

    /// Contents of a container.
    pub fn container(&self, pos: BlockPos) -> BTreeMap<String, u32> {
        self.state().containers.get(&pos).cloned().unwrap_or_default()
    }

    /// The container currently open, if any.
    pub fn open_container_at(&self) -> Option<BlockPos> {
        self.state().open_container
    }

    /// Whether the agent is in bed.
    pub fn is_sleeping(&self) -> bool {
        self.state().sleeping
    }
}

fn ready(result: Result<(), ActionError>) -> ActionFuture {
    future::ready(result).boxed()
}

impl WorldView for SimWorld {
    fn data(&self) -> &GameData {
        &self.data
    }

    fn position(&self) -> Vec3 {
        self.state().position
    }

    fn health(&self) -> f32 {
        self.state().health
    }

    fn food(&self) -> u32 {
        self.state().food
    }

    fn inventory(&self) -> BTreeMap<String, u32> {
        self.state().inventory.clone()
    }

    fn count(&self, item: &str) -> u32 {
        self.state().have(item)
    }

    fn held_item(&self) -> Option<String> {
        self.state().held.clone()
    }

    fn block_at(&self, pos: BlockPos) -> Option<String> {
        self.state().blocks.get(&pos).cloned()
    }

    fn find_block(
        &self,
        matches: &dyn Fn(BlockPos, &str) -> bool,
        max_distance: f64,
    ) -> Option<BlockPos> {
        // Snapshot first: the predicate may query the world itself.
        let candidates: Vec<(BlockPos, String, f64)> = {
            let state = self.state();
            state
                .blocks
                .iter()
                .map(|(pos, name)| (*pos, name, state.position.distance_to(pos.center())))
                .filter(|(_, _, d)| *d <= max_distance)
                .map(|(pos, name, d)| (pos, name.clone(), d))
                .collect()
        };
        let mut best: Option<(BlockPos, f64)> = None;
        for (pos, name, distance) in candidates {
            if !matches(pos, &name) {
                continue;
            }
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((pos, distance));
            }
        }
        best.map(|(pos, _)| pos)
    }

    fn nearest_entity(
        &self,
        matches: &dyn Fn(&EntitySnapshot) -> bool,
        max_distance: f64,
    ) -> Option<EntitySnapshot> {
        let (position, candidates): (Vec3, Vec<EntitySnapshot>) = {
            let state = self.state();
            (state.position, state.entities.values().cloned().collect())
        };
        let mut best: Option<(EntitySnapshot, f64)> = None;
        for entity in candidates {
            let distance = position.distance_to(entity.position);
            if distance > max_distance || !matches(&entity) {
                continue;
            }
            if best.as_ref().is_none_or(|(_, d)| distance < *d) {
                best = Some((entity, distance));
            }
        }
        best.map(|(entity, _)| entity)
    }

    fn entity(&self, id: EntityId) -> Option<EntitySnapshot> {
        self.state().entities.get(&id).cloned()
    }

    fn is_night(&self) -> bool {
        self.state().night
    }
}

impl Navigator for SimWorld {
    fn goto(&self, target: NavTarget, _profile: MovementProfile) -> NavFuture {
        let mut state = self.state();
        state.interrupt_trips();
        let destination = match state.destination(target) {
            Ok(d) => d,
            Err(e) => return future::ready(Err(e)).boxed(),
        };
        state.record(format!("goto {destination}"));
        if state.gated {
            let (reply, rx) = oneshot::channel();
            state.parked.push(ParkedTrip { destination, reply });
            return rx
                .map(|settled| settled.unwrap_or(Err(NavError::Interrupted)))
                .boxed();
        }
        state.arrive(destination);
        future::ready(Ok(())).boxed()
    }

    fn stop(&self) {
        let mut state = self.state();
        state.interrupt_trips();
        state.record(String::from("stop"));
    }
}

impl SimWorld {
    fn try_dig(&self, pos: BlockPos) -> Result<(), ActionError> {
        let mut state = self.state();
        let name = state
            .blocks
            .get(&pos)
            .cloned()
            .ok_or(ActionError::NoBlock { pos })?;
        state.within_reach(pos.center(), &name)?;
        let info = self.data.block(&name);
        if let Some(info) = info {
            let held = state.held.as_deref();
            let has_tool = held.is_some_and(|h| info.harvest_tools.iter().any(|t| t == h));
            if info.requires_tool() && !has_tool {
                return Err(ActionError::WrongTool { block: name });
            }
        }
        state.blocks.remove(&pos);
        state.record(format!("dig {name} {pos}"));
        for drop in info.map(|i| i.drops.as_slice()).unwrap_or_default() {
            state.spawn(drop, EntityKind::Drop, pos.center(), 1.0);
        }
        Ok(())
    }

    fn try_place(&self, item: &str, pos: BlockPos) -> Result<(), ActionError> {
        let mut state = self.state();
        state.require(item, 1)?;
        let block = self
            .data
            .placed_block(item)
            .ok_or_else(|| ActionError::NotPlaceable {
                item: item.to_owned(),
            })?;
        if state.blocks.contains_key(&pos) {
            return Err(ActionError::Occupied { pos });
        }
        state.within_reach(pos.center(), item)?;
        state.take_item(item, 1)?;
        state.blocks.insert(pos, block.to_owned());
        state.record(format!("place {block} {pos}"));
        Ok(())
    }

    fn try_craft(
        &self,
        recipe: &Recipe,
        times: u32,
        table: Option<BlockPos>,
    ) -> Result<(), ActionError> {
        let mut state = self.state();
        if recipe.needs_table {
            let pos = table.ok_or_else(|| ActionError::NeedsTable {
                item: recipe.result.clone(),
            })?;
            let is_table = state.blocks.get(&pos).is_some_and(|b| b == "crafting_table");
            state.station(pos, "crafting_table", is_table)?;
        }
        let totals = recipe.totals(times);
        for (item, needed) in &totals {
            state.require(item, *needed)?;
        }
        for (item, needed) in &totals {
            state.take_item(item, *needed)?;
        }
        state.add_item(&recipe.result, recipe.count.saturating_mul(times));
        state.record(format!("craft {} x{times}", recipe.result));
        Ok(())
    }

    fn try_smelt(
        &self,
        furnace: BlockPos,
        recipe: &SmeltingRecipe,
        fuel: &str,
        count: u32,
    ) -> Result<(), ActionError> {
        let mut state = self.state();
        let is_furnace = state.blocks.get(&furnace).is_some_and(|b| b == "furnace");
        state.station(furnace, "furnace", is_furnace)?;
        let fuel_units =
            self.data
                .fuel_needed(fuel, count)
                .ok_or_else(|| ActionError::MissingItem {
                    item: fuel.to_owned(),
                    needed: 1,
                    have: 0,
                })?;
        // Input and fuel may be the same item (logs burning logs).
        let mut needs: BTreeMap<&str, u32> = BTreeMap::new();
        for (item, qty) in [(recipe.input.as_str(), count), (fuel, fuel_units)] {
            let slot = needs.entry(item).or_insert(0);
            *slot = slot.saturating_add(qty);
        }
        for (item, needed) in &needs {
            state.require(item, *needed)?;
        }
        for (item, needed) in &needs {
            state.take_item(item, *needed)?;
        }
        state.add_item(&recipe.output, count);
        state.record(format!("smelt {} x{count}", recipe.output));
        Ok(())
    }

    fn try_attack(&self, target: EntityId) -> Result<(), ActionError> {
        let mut state = self.state();
        let entity = state
            .entities
            .get(&target)
            .cloned()
            .ok_or(ActionError::NoEntity { id: target })?;
        state.within_reach(entity.position, &entity.name)?;
        let health = entity.health - self.data.weapon_damage(state.held.as_deref());
        state.record(format!("attack {} {target}", entity.name));
        if health > 0.0 {
            if let Some(e) = state.entities.get_mut(&target) {
                e.health = health;
            }
            return Ok(());
        }
        state.entities.remove(&target);
        if let Some(creature) = self.data.creature(&entity.name) {
            for drop in &creature.drops {
                state.spawn(drop, EntityKind::Drop, entity.position, 1.0);
            }
        }
        Ok(())
    }

    fn try_consume(&self) -> Result<(), ActionError> {
        let mut state = self.state();
        let held = state.held.clone().unwrap_or_else(|| String::from("nothing"));
        let value = self
            .data
            .food_value(&held)
            .ok_or_else(|| ActionError::NotFood { item: held.clone() })?;
        state.take_item(&held, 1)?;
        state.food = state.food.saturating_add(value).min(MAX_FOOD);
        state.record(format!("consume {held}"));
        Ok(())
    }

    fn try_sleep(&self, bed: BlockPos) -> Result<(), ActionError> {
        let mut state = self.state();
        if !state.night {
            return Err(ActionError::NotNight);
        }
        let is_bed = state.blocks.get(&bed).is_some_and(|b| GameData::is_bed(b));
        state.station(bed, "bed", is_bed)?;
        state.record(format!("sleep {bed}"));
        // The simulated night passes while the agent is in bed.
        state.night = false;
        state.sleeping = false;
        Ok(())
    }

    fn try_open(&self, pos: BlockPos) -> Result<(), ActionError> {
        let mut state = self.state();
        let is_chest = state.blocks.get(&pos).is_some_and(|b| b == "chest");
        state.station(pos, "chest", is_chest)?;
        state.open_container = Some(pos);
        state.record(format!("open {pos}"));
        Ok(())
    }

    fn try_deposit(&self, item: &str, count: u32) -> Result<(), ActionError> {
        let mut state = self.state();
        let pos = state.open_container.ok_or(ActionError::NoContainer)?;
        state.take_item(item, count)?;
        let slot = state
            .containers
            .entry(pos)
            .or_default()
            .entry(item.to_owned())
            .or_insert(0);
        *slot = slot.saturating_add(count);
        state.record(format!("deposit {item} x{count}"));
        Ok(())
    }
}

impl ActionExecutor for SimWorld {
    fn equip(&self, item: &str, slot: EquipSlot) -> ActionFuture {
        let mut state = self.state();
        if let Err(e) = state.require(item, 1) {
            return ready(Err(e));
        }
        if slot == EquipSlot::Hand {
            state.held = Some(item.to_owned());
        }
        state.record(format!("equip {item}"));
        ready(Ok(()))
    }

    fn dig(&self, pos: BlockPos) -> ActionFuture {
        ready(self.try_dig(pos))
    }

    fn place(&self, item: &str, pos: BlockPos) -> ActionFuture {
        ready(self.try_place(item, pos))
    }

    fn craft(&self, recipe: &Recipe, times: u32, table: Option<BlockPos>) -> ActionFuture {
        ready(self.try_craft(recipe, times, table))
    }

    fn smelt(
        &self,
        furnace: BlockPos,
        recipe: &SmeltingRecipe,
        fuel: &str,
        count: u32,
    ) -> ActionFuture {
        ready(self.try_smelt(furnace, recipe, fuel, count))
    }

    fn attack(&self, target: EntityId) -> ActionFuture {
        ready(self.try_attack(target))
    }

    fn consume(&self) -> ActionFuture {
        ready(self.try_consume())
    }

    fn sleep(&self, bed: BlockPos) -> ActionFuture {
        ready(self.try_sleep(bed))
    }

    fn toss(&self, item: &str, count: u32) -> ActionFuture {
        let mut state = self.state();
        let result = state.take_item(item, count);
        if result.is_ok() {
            state.record(format!("toss {item} x{count}"));
        }
        ready(result)
    }

    fn open_container(&self, pos: BlockPos) -> ActionFuture {
        ready(self.try_open(pos))
    }

    fn deposit(&self, item: &str, count: u32) -> ActionFuture {
        ready(self.try_deposit(item, count))
    }

    fn close_container(&self) {
        let mut state = self.state();
        state.open_container = None;
        state.record(String::from("close"));
    }

    fn wake(&self) {
        let mut state = self.state();
        state.sleeping = false;
        state.record(String::from("wake"));
    }

    fn stop_digging(&self) {
        self.state().record(String::from("stop_digging"));
    }
}

impl Reporter for SimWorld {
    fn say(&self, message: &str) {
        tracing::info!(target: "quarry::chat", message, "say");
        self.state().said.push(message.to_owned());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures::FutureExt;

    use super::*;

    fn settle<T>(fut: futures::future::BoxFuture<'static, T>) -> T {
        fut.now_or_never().unwrap()
    }

    #[test]
    fn dig_spawns_drops_that_are_picked_up_on_arrival() {
        let world = SimWorld::vanilla();
        let log = BlockPos::new(2, 64, 0);
        world.set_block(log, "oak_log");

        settle(world.dig(log)).unwrap();
        assert_eq!(world.block_at(log), None);
        assert_eq!(world.count("oak_log"), 0);

        let drop = world
            .nearest_entity(&|e| e.kind == EntityKind::Drop, 10.0)
            .unwrap();
        settle(world.goto(
            NavTarget::Entity {
                id: drop.id,
                range: 0.0,
            },
            MovementProfile::default(),
        ))
        .unwrap();
        assert_eq!(world.count("oak_log"), 1);
    }

    #[test]
    fn stone_needs_a_pickaxe() {
        let world = SimWorld::vanilla();
        let stone = BlockPos::new(1, 64, 0);
        world.set_block(stone, "stone");
        assert!(matches!(
            settle(world.dig(stone)),
            Err(ActionError::WrongTool { .. })
        ));

        world.give("wooden_pickaxe", 1);
        settle(world.equip("wooden_pickaxe", EquipSlot::Hand)).unwrap();
        settle(world.dig(stone)).unwrap();
        assert_eq!(world.block_at(stone), None);
    }

    #[test]
    fn craft_consumes_ingredients() {
        let world = SimWorld::vanilla();
        world.give("oak_log", 2);
        let planks = world.data().recipes_for("oak_planks").first().copied().cloned().unwrap();
        settle(world.craft(&planks, 2, None)).unwrap();
        assert_eq!(world.count("oak_log"), 0);
        assert_eq!(world.count("oak_planks"), 8);

        let pickaxe = world
            .data()
            .recipes_for("wooden_pickaxe")
            .first()
            .copied()
            .cloned()
            .unwrap();
        assert!(matches!(
            settle(world.craft(&pickaxe, 1, None)),
            Err(ActionError::NeedsTable { .. })
        ));
    }

    #[test]
    fn smelt_burns_fuel() {
        let world = SimWorld::vanilla();
        let furnace = BlockPos::new(1, 64, 0);
        world.set_block(furnace, "furnace");
        world.give("raw_iron", 3);
        world.give("coal", 1);
        let recipe = world.data().smelting_for("iron_ingot").first().copied().cloned().unwrap();
        settle(world.smelt(furnace, &recipe, "coal", 3)).unwrap();
        assert_eq!(world.count("iron_ingot"), 3);
        assert_eq!(world.count("coal"), 0);
    }

    #[test]
    fn gated_navigation_waits_for_release() {
        let world = SimWorld::vanilla();
        world.set_gated(true);
        let mut trip = world.goto(
            NavTarget::Point(Vec3::new(5.0, 64.0, 5.0)),
            MovementProfile::default(),
        );
        assert!((&mut trip).now_or_never().is_none());
        assert_eq!(world.parked_trips(), 1);

        assert_eq!(world.release_navigation(), 1);
        assert_eq!(trip.now_or_never(), Some(Ok(())));
        assert!((world.position().x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn stop_interrupts_parked_trips() {
        let world = SimWorld::vanilla();
        world.set_gated(true);
        let trip = world.goto(
            NavTarget::Point(Vec3::new(5.0, 64.0, 5.0)),
            MovementProfile::default(),
        );
        world.stop();
        assert_eq!(trip.now_or_never(), Some(Err(NavError::Interrupted)));
        assert_eq!(world.parked_trips(), 0);
    }

    #[test]
    fn find_block_returns_nearest_match() {
        let world = SimWorld::vanilla();
        world.set_block(BlockPos::new(8, 64, 0), "oak_log");
        world.set_block(BlockPos::new(3, 64, 0), "oak_log");
        world.set_block(BlockPos::new(1, 64, 0), "dirt");
        let found = world.find_block(&|_, name| name == "oak_log", 32.0);
        assert_eq!(found, Some(BlockPos::new(3, 64, 0)));
        assert_eq!(world.find_block(&|_, name| name == "oak_log", 2.0), None);
    }

    #[test]
    fn attack_kills_and_drops_loot() {
        let world = SimWorld::vanilla();
        let chicken = world.spawn_creature("chicken", Vec3::new(1.5, 64.0, 0.5));
        for _ in 0..4 {
            settle(world.attack(chicken)).unwrap();
        }
        assert!(world.entity(chicken).is_none());
        let loot = world
            .nearest_entity(&|e| e.kind == EntityKind::Drop, 5.0)
            .unwrap();
        assert!(loot.name == "chicken" || loot.name == "feather");
    }

    #[test]
    fn deposit_needs_an_open_chest() {
        let world = SimWorld::vanilla();
        let chest = BlockPos::new(1, 64, 0);
        world.set_block(chest, "chest");
        world.give("cobblestone", 5);
        assert_eq!(
            settle(world.deposit("cobblestone", 5)),
            Err(ActionError::NoContainer)
        );
        settle(world.open_container(chest)).unwrap();
        settle(world.deposit("cobblestone", 5)).unwrap();
        world.close_container();
        assert_eq!(world.container(chest).get("cobblestone").copied(), Some(5));
        assert_eq!(world.open_container_at(), None);
    }

    #[test]
    fn reporter_keeps_a_transcript() {
        let world = SimWorld::vanilla();
        world.say("hello");
        assert_eq!(world.said(), vec![String::from("hello")]);
    }
}
