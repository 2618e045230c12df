//! Static game-data tables.
//!
//! [`GameData`] answers the questions the planner and goal kinds ask about
//! the rules of the world: what a block drops and how hard it is, which
//! tools harvest it, what a creature drops, which recipes and furnace
//! recipes produce an item, what burns, what is edible, and what a placed
//! item turns into.
//!
//! Tables are plain serde structs so a deployment can load its own data
//! from JSON; [`GameData::vanilla`] builds the built-in subset used by
//! tests and the demo world.

use std::collections::BTreeMap;
use std::path::Path;

use quarry_types::{BlockInfo, CreatureInfo, EntityKind, Recipe, SmeltingRecipe};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// Game rules consulted by the planner and goal kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    /// Block facts keyed by block name.
    #[serde(default)]
    pub blocks: BTreeMap<String, BlockInfo>,
    /// Creature facts keyed by creature name.
    #[serde(default)]
    pub creatures: BTreeMap<String, CreatureInfo>,
    /// Crafting recipes, in enumeration order.
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    /// Furnace recipes, in enumeration order.
    #[serde(default)]
    pub smelting: Vec<SmeltingRecipe>,
    /// Fuel items and how many items one unit smelts.
    #[serde(default)]
    pub fuels: BTreeMap<String, u32>,
    /// Edible items and the food points they restore.
    #[serde(default)]
    pub foods: BTreeMap<String, u32>,
    /// Mature crop block -> seed item used to replant it.
    #[serde(default)]
    pub crops: BTreeMap<String, String>,
    /// Item -> block it becomes when placed, where the names differ.
    #[serde(default)]
    pub placements: BTreeMap<String, String>,
    /// Melee damage per held item; bare hands deal 1.
    #[serde(default)]
    pub weapons: BTreeMap<String, f32>,
}

impl GameData {
    /// Parse game data from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Parse`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, WorldError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load game data from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Io`] if the file cannot be read or
    /// [`WorldError::Parse`] if its contents are malformed.
    pub fn from_file(path: &Path) -> Result<Self, WorldError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Facts for a block, if known.
    pub fn block(&self, name: &str) -> Option<&BlockInfo> {
        self.blocks.get(name)
    }

    /// Facts for a creature, if known.
    pub fn creature(&self, name: &str) -> Option<&CreatureInfo> {
        self.creatures.get(name)
    }

    /// Names of blocks that drop `item` when broken.
    pub fn blocks_dropping(&self, item: &str) -> Vec<&str> {
        self.blocks
            .values()
            .filter(|b| b.drops.iter().any(|d| d == item))
            .map(|b| b.name.as_str())
            .collect()
    }

    /// Names of creatures that drop `item` on death.
    pub fn creatures_dropping(&self, item: &str) -> Vec<&str> {
        self.creatures
            .values()
            .filter(|c| c.drops.iter().any(|d| d == item))
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Crafting recipes producing `item`, in table order.
    ///
    /// The position of a recipe in this list is its recipe index.
    pub fn recipes_for(&self, item: &str) -> Vec<&Recipe> {
        self.recipes.iter().filter(|r| r.result == item).collect()
    }

    /// Furnace recipes producing `item`, in table order.
    pub fn smelting_for(&self, item: &str) -> Vec<&SmeltingRecipe> {
        self.smelting.iter().filter(|r| r.output == item).collect()
    }

    /// Fuel items, best (most items per unit) first.
    pub fn fuels_by_value(&self) -> Vec<(&str, u32)> {
        let mut fuels: Vec<(&str, u32)> =
            self.fuels.iter().map(|(n, v)| (n.as_str(), *v)).collect();
        fuels.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        fuels
    }

    /// Units of `fuel` needed to smelt `count` items, if it burns at all.
    pub fn fuel_needed(&self, fuel: &str, count: u32) -> Option<u32> {
        let per_unit = *self.fuels.get(fuel)?;
        if per_unit == 0 {
            return None;
        }
        Some(count.div_ceil(per_unit))
    }

    /// Food points restored by eating `item`, if edible.
    pub fn food_value(&self, item: &str) -> Option<u32> {
        self.foods.get(item).copied()
    }

    /// The block an item becomes when placed, if it is placeable.
    pub fn placed_block(&self, item: &str) -> Option<&str> {
        if let Some(block) = self.placements.get(item) {
            return Some(block.as_str());
        }
        self.blocks.get(item).map(|b| b.name.as_str())
    }

    /// Seed item for a mature crop block.
    pub fn seed_for(&self, crop: &str) -> Option<&str> {
        self.crops.get(crop).map(String::as_str)
    }

    /// Melee damage dealt with `held` in hand.
    pub fn weapon_damage(&self, held: Option<&str>) -> f32 {
        held.and_then(|h| self.weapons.get(h).copied()).unwrap_or(1.0)
    }

    /// Whether a block name is a bed.
    pub fn is_bed(name: &str) -> bool {
        name.ends_with("_bed")
    }

    /// Whether an item is a sapling.
    pub fn is_sapling(name: &str) -> bool {
        name.ends_with("_sapling")
    }

    /// The built-in subset of vanilla rules.
    pub fn vanilla() -> Self {
        let pickaxes = ["iron_pickaxe", "stone_pickaxe", "wooden_pickaxe"];
        let iron_tier = ["iron_pickaxe", "stone_pickaxe"];

        let blocks = [
            block("oak_log", 2.0, &["oak_log"], &[]),
            block("oak_leaves", 0.2, &["oak_sapling"], &[]),
            block("oak_planks", 2.0, &["oak_planks"], &[]),
            block("oak_sapling", 0.0, &["oak_sapling"], &[]),
            block("dirt", 0.5, &["dirt"], &[]),
            block("grass_block", 0.6, &["dirt"], &[]),
            block("farmland", 0.6, &["dirt"], &[]),
            block("stone", 1.5, &["cobblestone"], &pickaxes),
            block("cobblestone", 2.0, &["cobblestone"], &pickaxes),
            block("coal_ore", 3.0, &["coal"], &pickaxes),
            block("iron_ore", 3.0, &["raw_iron"], &iron_tier),
            block("iron_block", 5.0, &["iron_block"], &iron_tier),
            block("crafting_table", 2.5, &["crafting_table"], &[]),
            block("furnace", 3.5, &["furnace"], &pickaxes),
            block("chest", 2.5, &["chest"], &[]),
            block("white_bed", 0.2, &["white_bed"], &[]),
            block("wheat", 0.0, &["wheat", "wheat_seeds"], &[]),
            block("wheat_young", 0.0, &["wheat_seeds"], &[]),
        ];

        let creatures = [
            creature("sheep", EntityKind::Passive, &["white_wool", "mutton"], 8.0),
            creature("cow", EntityKind::Passive, &["beef", "leather"], 10.0),
            creature("chicken", EntityKind::Passive, &["chicken", "feather"], 4.0),
            creature("iron_golem", EntityKind::Passive, &["iron_ingot"], 100.0),
            creature("zombie", EntityKind::Hostile, &["rotten_flesh"], 20.0),
            creature("skeleton", EntityKind::Hostile, &["bone", "arrow"], 20.0),
        ];

        let recipes = vec![
            recipe("oak_planks", 4, &[("oak_log", 1)], false),
            recipe("stick", 4, &[("oak_planks", 2)], false),
            recipe("crafting_table", 1, &[("oak_planks", 4)], false),
            recipe("wooden_pickaxe", 1, &[("oak_planks", 3), ("stick", 2)], true),
            recipe("stone_pickaxe", 1, &[("cobblestone", 3), ("stick", 2)], true),
            recipe("iron_pickaxe", 1, &[("iron_ingot", 3), ("stick", 2)], true),
            recipe("wooden_sword", 1, &[("oak_planks", 2), ("stick", 1)], true),
            recipe("stone_sword", 1, &[("cobblestone", 2), ("stick", 1)], true),
            recipe("furnace", 1, &[("cobblestone", 8)], true),
            recipe("chest", 1, &[("oak_planks", 8)], true),
            recipe("white_bed", 1, &[("white_wool", 3), ("oak_planks", 3)], true),
            recipe("iron_block", 1, &[("iron_ingot", 9)], true),
            recipe("iron_ingot", 9, &[("iron_block", 1)], false),
            recipe("iron_ingot", 1, &[("iron_nugget", 9)], true),
            recipe("iron_nugget", 9, &[("iron_ingot", 1)], false),
            recipe("bread", 1, &[("wheat", 3)], true),
            recipe("torch", 4, &[("coal", 1), ("stick", 1)], false),
        ];

        let smelting = vec![
            smelt("raw_iron", "iron_ingot"),
            smelt("cobblestone", "stone"),
            smelt("oak_log", "charcoal"),
            smelt("beef", "cooked_beef"),
            smelt("mutton", "cooked_mutton"),
            smelt("chicken", "cooked_chicken"),
        ];

        Self {
            blocks: blocks.into_iter().map(|b| (b.name.clone(), b)).collect(),
            creatures: creatures
                .into_iter()
                .map(|c| (c.name.clone(), c))
                .collect(),
            recipes,
            smelting,
            fuels: table(&[("coal", 8), ("charcoal", 8), ("oak_log", 1), ("oak_planks", 1)]),
            foods: table(&[
                ("bread", 5),
                ("cooked_beef", 8),
                ("cooked_mutton", 6),
                ("cooked_chicken", 6),
                ("apple", 4),
                ("beef", 3),
                ("mutton", 2),
                ("chicken", 2),
            ]),
            crops: BTreeMap::from([(String::from("wheat"), String::from("wheat_seeds"))]),
            placements: BTreeMap::from([(
                String::from("wheat_seeds"),
                String::from("wheat_young"),
            )]),
            weapons: BTreeMap::from([
                (String::from("wooden_sword"), 4.0),
                (String::from("stone_sword"), 5.0),
                (String::from("wooden_pickaxe"), 2.0),
                (String::from("stone_pickaxe"), 3.0),
                (String::from("iron_pickaxe"), 4.0),
            ]),
        }
    }
}

fn block(name: &str, hardness: f64, drops: &[&str], tools: &[&str]) -> BlockInfo {
    BlockInfo {
        name: name.to_owned(),
        hardness,
        drops: drops.iter().map(|s| (*s).to_owned()).collect(),
        harvest_tools: tools.iter().map(|s| (*s).to_owned()).collect(),
    }
}

fn creature(name: &str, kind: EntityKind, drops: &[&str], health: f32) -> CreatureInfo {
    CreatureInfo {
        name: name.to_owned(),
        kind,
        drops: drops.iter().map(|s| (*s).to_owned()).collect(),
        health,
    }
}

fn recipe(result: &str, count: u32, ingredients: &[(&str, u32)], needs_table: bool) -> Recipe {
    Recipe {
        result: result.to_owned(),
        count,
        ingredients: table(ingredients),
        needs_table,
    }
}

fn smelt(input: &str, output: &str) -> SmeltingRecipe {
    SmeltingRecipe {
        input: input.to_owned(),
        output: output.to_owned(),
    }
}

fn table(entries: &[(&str, u32)]) -> BTreeMap<String, u32> {
    entries.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn vanilla_knows_wood_chain() {
        let data = GameData::vanilla();
        assert_eq!(data.blocks_dropping("oak_log"), vec!["oak_log"]);
        assert_eq!(data.recipes_for("stick").len(), 1);
        assert!(data.recipes_for("oak_log").is_empty());
    }

    #[test]
    fn iron_ingot_has_two_recipes_in_order() {
        let data = GameData::vanilla();
        let recipes = data.recipes_for("iron_ingot");
        assert_eq!(recipes.len(), 2);
        assert!(recipes.first().unwrap().ingredients.contains_key("iron_block"));
        assert_eq!(data.smelting_for("iron_ingot").len(), 1);
        assert_eq!(data.creatures_dropping("iron_ingot"), vec!["iron_golem"]);
    }

    #[test]
    fn fuel_needed_rounds_up() {
        let data = GameData::vanilla();
        assert_eq!(data.fuel_needed("coal", 9), Some(2));
        assert_eq!(data.fuel_needed("oak_log", 3), Some(3));
        assert_eq!(data.fuel_needed("dirt", 1), None);
        assert_eq!(data.fuels_by_value().first().map(|f| f.0), Some("charcoal"));
    }

    #[test]
    fn placements_fall_back_to_block_names() {
        let data = GameData::vanilla();
        assert_eq!(data.placed_block("crafting_table"), Some("crafting_table"));
        assert_eq!(data.placed_block("wheat_seeds"), Some("wheat_young"));
        assert_eq!(data.placed_block("stick"), None);
    }

    #[test]
    fn parses_partial_json() {
        let json = r#"{"recipes":[{"result":"stick","count":4,"ingredients":{"oak_planks":2}}]}"#;
        let data = GameData::from_json(json).unwrap();
        assert_eq!(data.recipes.len(), 1);
        assert!(data.blocks.is_empty());
        assert!(GameData::from_json("not json").is_err());
    }

    #[test]
    fn bare_hands_deal_one_damage() {
        let data = GameData::vanilla();
        assert!((data.weapon_damage(None) - 1.0).abs() < f32::EPSILON);
        assert!((data.weapon_damage(Some("stone_sword")) - 5.0).abs() < f32::EPSILON);
    }
}
