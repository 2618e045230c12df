//! Persistent agent memory.
//!
//! Remembers where the agent's beds, chests, crafting tables and furnaces
//! are, and which saplings it planted. Memory is loaded once at startup and
//! saved once at shutdown as pretty-printed JSON; the scheduler never
//! touches the file mid-tick.
//!
//! Entries can go stale when the world changes behind the agent's back, so
//! callers confirm a remembered block with [`WorldView::block_at`] and
//! [`AgentMemory::forget`] it when it is gone.
//!
//! [`WorldView::block_at`]: crate::view::WorldView::block_at

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use quarry_types::{BlockPos, Vec3};
use serde::{Deserialize, Serialize};

use crate::data::GameData;
use crate::error::MemoryError;

/// Kind of remembered landmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Landmark {
    /// A bed.
    Bed,
    /// A storage chest.
    Chest,
    /// A crafting table.
    CraftingTable,
    /// A furnace.
    Furnace,
}

impl Landmark {
    /// The landmark kind a block name represents, if any.
    pub fn for_block(name: &str) -> Option<Self> {
        match name {
            "chest" => Some(Self::Chest),
            "crafting_table" => Some(Self::CraftingTable),
            "furnace" => Some(Self::Furnace),
            n if GameData::is_bed(n) => Some(Self::Bed),
            _ => None,
        }
    }

    /// Whether `block` is a block of this kind.
    pub fn matches(self, block: &str) -> bool {
        Self::for_block(block) == Some(self)
    }
}

/// A sapling the agent planted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantedSapling {
    /// Where it was planted.
    pub pos: BlockPos,
    /// Sapling item name.
    pub item: String,
}

/// What the agent remembers about its surroundings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMemory {
    /// Known beds.
    #[serde(default)]
    pub beds: BTreeSet<BlockPos>,
    /// Known chests.
    #[serde(default)]
    pub chests: BTreeSet<BlockPos>,
    /// Known crafting tables.
    #[serde(default)]
    pub crafting_tables: BTreeSet<BlockPos>,
    /// Known furnaces.
    #[serde(default)]
    pub furnaces: BTreeSet<BlockPos>,
    /// Saplings the agent planted.
    #[serde(default)]
    pub saplings: Vec<PlantedSapling>,
    /// When the memory was last written to disk.
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl AgentMemory {
    /// Load memory from `path`. A missing file yields empty memory.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, MemoryError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Stamp `saved_at` and write memory to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError`] if encoding or writing fails.
    pub fn save(&mut self, path: &Path) -> Result<(), MemoryError> {
        self.saved_at = Some(Utc::now());
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    fn set(&self, kind: Landmark) -> &BTreeSet<BlockPos> {
        match kind {
            Landmark::Bed => &self.beds,
            Landmark::Chest => &self.chests,
            Landmark::CraftingTable => &self.crafting_tables,
            Landmark::Furnace => &self.furnaces,
        }
    }

    fn set_mut(&mut self, kind: Landmark) -> &mut BTreeSet<BlockPos> {
        match kind {
            Landmark::Bed => &mut self.beds,
            Landmark::Chest => &mut self.chests,
            Landmark::CraftingTable => &mut self.crafting_tables,
            Landmark::Furnace => &mut self.furnaces,
        }
    }

    /// Remember a block if it is a landmark. Returns whether it was new.
    pub fn remember_block(&mut self, block: &str, pos: BlockPos) -> bool {
        Landmark::for_block(block).is_some_and(|kind| self.set_mut(kind).insert(pos))
    }

    /// Remember a planted sapling.
    pub fn remember_sapling(&mut self, sapling: &str, pos: BlockPos) {
        if !self.saplings.iter().any(|s| s.pos == pos) {
            self.saplings.push(PlantedSapling {
                pos,
                item: sapling.to_owned(),
            });
        }
    }

    /// Drop every entry at `pos`.
    pub fn forget(&mut self, pos: BlockPos) {
        self.beds.remove(&pos);
        self.chests.remove(&pos);
        self.crafting_tables.remove(&pos);
        self.furnaces.remove(&pos);
        self.saplings.retain(|s| s.pos != pos);
    }

    /// Known landmarks of one kind, nearest to `from` first.
    pub fn nearest(&self, kind: Landmark, from: Vec3) -> Vec<BlockPos> {
        let mut known: Vec<BlockPos> = self.set(kind).iter().copied().collect();
        known.sort_by(|a, b| {
            from.distance_to(a.center())
                .total_cmp(&from.distance_to(b.center()))
        });
        known
    }

    /// Whether any landmark of `kind` is known.
    pub fn knows(&self, kind: Landmark) -> bool {
        !self.set(kind).is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn remembers_only_landmarks() {
        let mut memory = AgentMemory::default();
        let pos = BlockPos::new(1, 64, 1);
        assert!(memory.remember_block("crafting_table", pos));
        assert!(!memory.remember_block("crafting_table", pos));
        assert!(!memory.remember_block("dirt", pos));
        assert!(memory.remember_block("white_bed", BlockPos::new(0, 64, 0)));
        assert!(memory.knows(Landmark::CraftingTable));
        assert!(memory.knows(Landmark::Bed));
        assert!(!memory.knows(Landmark::Chest));
    }

    #[test]
    fn nearest_sorts_by_distance() {
        let mut memory = AgentMemory::default();
        memory.remember_block("chest", BlockPos::new(10, 64, 0));
        memory.remember_block("chest", BlockPos::new(2, 64, 0));
        let order = memory.nearest(Landmark::Chest, Vec3::new(0.0, 64.0, 0.0));
        assert_eq!(order.first().copied(), Some(BlockPos::new(2, 64, 0)));
    }

    #[test]
    fn forget_clears_every_kind() {
        let mut memory = AgentMemory::default();
        let pos = BlockPos::new(3, 64, 3);
        memory.remember_block("furnace", pos);
        memory.remember_sapling("oak_sapling", pos);
        memory.forget(pos);
        assert_eq!(memory, AgentMemory::default());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let memory = AgentMemory::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(memory, AgentMemory::default());
    }

    #[test]
    fn save_then_load_keeps_landmarks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("memory.json");
        let mut memory = AgentMemory::default();
        memory.remember_block("chest", BlockPos::new(4, 64, -2));
        memory.save(&path).unwrap();
        assert!(memory.saved_at.is_some());

        let loaded = AgentMemory::load(&path).unwrap();
        assert_eq!(loaded, memory);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            AgentMemory::load(&path),
            Err(MemoryError::Json { .. })
        ));
    }
}
