//! Break one block.

use quarry_goals::{Goal, GoalContext, GoalError, GoalResult, Outcome, Step};
use quarry_types::{BlockPos, EquipSlot, GoalId};
use quarry_world::{ActionError, NavTarget};

use super::{
    Action, CollectDrops, DROP_RADIUS, GatherItem, NavigateTo, Perform, Planning, in_reach,
};

const MAX_APPROACHES: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Tool,
    Equip,
    Dig,
    Collect,
    Finished,
}

/// Digs the block at a position.
///
/// Makes sure a harvest tool is held (gathering one when the planning
/// options allow it), equips it, walks into reach, digs, then picks up the
/// block's drops.
#[derive(Debug)]
pub struct DigBlock {
    pos: BlockPos,
    planning: Planning,
    phase: Phase,
    block: Option<String>,
    tool: Option<String>,
    drops: Vec<String>,
    digging: bool,
    approaches: u32,
    child: Option<GoalResult>,
}

impl DigBlock {
    /// Dig the block at `pos`.
    pub const fn new(pos: BlockPos, planning: Planning) -> Self {
        Self {
            pos,
            planning,
            phase: Phase::Tool,
            block: None,
            tool: None,
            drops: Vec::new(),
            digging: false,
            approaches: 0,
            child: None,
        }
    }

    /// Pick the tool, or spawn a gather for it.
    fn choose_tool(&mut self, ctx: &mut GoalContext<'_>) -> Result<bool, GoalError> {
        let view = ctx.view();
        let block = view
            .block_at(self.pos)
            .ok_or(ActionError::NoBlock { pos: self.pos })?;
        let Some(info) = view.data().block(&block) else {
            self.block = Some(block);
            return Ok(false);
        };
        self.drops.clone_from(&info.drops);

        if info.requires_tool() {
            let estimator = self.planning.estimator(ctx);
            let (tool, _) = estimator
                .cheapest_tool(
                    info,
                    self.planning.options,
                    self.planning.depth,
                    &self.planning.ancestors,
                )
                .ok_or_else(|| GoalError::failed(format!("no tool to harvest {block}")))?;
            let missing = view.count(&tool) == 0;
            self.block = Some(block);
            self.tool = Some(tool.clone());
            if missing {
                ctx.spawn(GatherItem::new(tool, 1, self.planning.deeper()));
                return Ok(true);
            }
            return Ok(false);
        }
        self.block = Some(block);
        Ok(false)
    }
}

impl Goal for DigBlock {
    fn label(&self) -> String {
        match &self.block {
            Some(block) => format!("dig {block} at {}", self.pos),
            None => format!("dig {}", self.pos),
        }
    }

    fn step(&mut self, ctx: &mut GoalContext<'_>) -> Step {
        if let Some(Err(e)) = self.child.take() {
            if self.phase != Phase::Finished {
                return Step::fail(e);
            }
        }

        loop {
            match self.phase {
                Phase::Tool => {
                    self.phase = Phase::Equip;
                    match self.choose_tool(ctx) {
                        Ok(true) => return Step::Pending,
                        Ok(false) => {}
                        Err(e) => return Step::fail(e),
                    }
                }
                Phase::Equip => {
                    self.phase = Phase::Dig;
                    let held = ctx.view().held_item();
                    if let Some(tool) = self.tool.clone().filter(|t| held.as_ref() != Some(t)) {
                        ctx.spawn(Perform::new(Action::Equip {
                            item: tool,
                            slot: EquipSlot::Hand,
                        }));
                        return Step::Pending;
                    }
                }
                Phase::Dig => {
                    if ctx.view().block_at(self.pos).is_none() {
                        return Step::fail(ActionError::NoBlock { pos: self.pos });
                    }
                    if !in_reach(ctx.view(), self.pos, self.planning.reach()) {
                        if self.approaches >= MAX_APPROACHES {
                            return Step::fail(ActionError::OutOfReach {
                                target: self.label(),
                            });
                        }
                        self.approaches = self.approaches.saturating_add(1);
                        ctx.spawn(NavigateTo::new(NavTarget::Block(self.pos)));
                        return Step::Pending;
                    }
                    self.phase = Phase::Collect;
                    self.digging = true;
                    ctx.spawn(Perform::new(Action::Dig { pos: self.pos }));
                    return Step::Pending;
                }
                Phase::Collect => {
                    self.digging = false;
                    self.phase = Phase::Finished;
                    if !self.drops.is_empty() {
                        let drops = CollectDrops::around(self.pos.center(), DROP_RADIUS)
                            .only(self.drops.iter().cloned());
                        ctx.spawn(drops);
                        return Step::Pending;
                    }
                }
                // A failed pickup does not undo the dig.
                Phase::Finished => return Step::ok(Outcome::Dug(self.pos)),
            }
        }
    }

    fn cancel(&mut self, ctx: &mut GoalContext<'_>) {
        if self.digging {
            ctx.actions().stop_digging();
        }
    }

    fn child_finished(&mut self, _child: GoalId, result: &GoalResult) {
        self.child = Some(result.clone());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use quarry_world::{SimWorld, WorldView};

    use super::*;
    use crate::kinds::bench::Bench;

    #[test]
    fn digs_and_picks_up_the_drop() {
        let world = SimWorld::vanilla();
        world.set_block(BlockPos::new(2, 64, 0), "oak_log");
        let mut bench = Bench::new(world);

        let id = bench.push(DigBlock::new(BlockPos::new(2, 64, 0), bench.planning.clone()));
        let (result, _) = bench.run(id, 30);

        assert_eq!(result, Ok(Outcome::Dug(BlockPos::new(2, 64, 0))));
        assert_eq!(bench.world.block_at(BlockPos::new(2, 64, 0)), None);
        assert_eq!(bench.world.count("oak_log"), 1);
    }

    #[test]
    fn missing_tool_is_gathered_first() {
        let world = SimWorld::vanilla();
        world.set_block(BlockPos::new(2, 64, 0), "stone");
        world.give("oak_planks", 3);
        world.give("stick", 2);
        world.set_block(BlockPos::new(-2, 64, 0), "crafting_table");
        let mut bench = Bench::new(world);

        let id = bench.push(DigBlock::new(BlockPos::new(2, 64, 0), bench.planning.clone()));
        let (result, spawned) = bench.run(id, 60);

        assert!(result.is_ok(), "{result:?}");
        assert_eq!(spawned.first().map(String::as_str), Some("gather 1 wooden_pickaxe"));
        assert!(spawned.contains(&String::from("equip wooden_pickaxe")), "{spawned:?}");
        assert_eq!(bench.world.count("cobblestone"), 1);
    }

    #[test]
    fn cancel_after_the_dig_stops_digging() {
        let world = SimWorld::vanilla();
        world.set_block(BlockPos::new(2, 64, 0), "oak_log");
        let mut bench = Bench::new(world);

        let id = bench.push(DigBlock::new(BlockPos::new(2, 64, 0), bench.planning.clone()));
        bench.run_until_resolved("dig [2, 64, 0]", 30);
        bench.stop();
        let (result, _) = bench.run(id, 10);

        assert_eq!(result, Err(GoalError::Cancelled));
        let log = bench.world.action_log();
        assert_eq!(log.last().map(String::as_str), Some("stop_digging"));
        assert_eq!(log.iter().filter(|a| *a == "stop_digging").count(), 1);
    }
}
