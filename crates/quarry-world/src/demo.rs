//! Default demo world.
//!
//! A flat 25x25 grass plain with a few oak trees, a small stone outcrop
//! holding coal and iron, a wheat patch, a storage chest, and some
//! livestock. Tree and animal placement is driven by a seeded RNG so a
//! given seed always produces the same world.

use quarry_types::{BlockPos, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::sim::SimWorld;

/// Half-width of the grass plain.
pub const DEMO_RADIUS: i32 = 12;

/// Ground level (the grass layer).
pub const GROUND_Y: i32 = 63;

/// First air layer above the ground.
pub const SURFACE_Y: i32 = 64;

/// Location of the demo storage chest.
pub const DEMO_CHEST: BlockPos = BlockPos::new(3, 64, 3);

/// Build the demo world for `seed`.
pub fn create_demo_world(seed: u64) -> SimWorld {
    let world = SimWorld::vanilla();
    let mut rng = StdRng::seed_from_u64(seed);

    world.fill(
        BlockPos::new(DEMO_RADIUS.saturating_neg(), GROUND_Y, DEMO_RADIUS.saturating_neg()),
        BlockPos::new(DEMO_RADIUS, GROUND_Y, DEMO_RADIUS),
        "grass_block",
    );

    let mut planted = 0_u32;
    while planted < 5 {
        let x: i32 = rng.random_range(-10..=10);
        let z: i32 = rng.random_range(-10..=10);
        // Keep the spawn point and the outcrop clear.
        if (x.abs() < 3 && z.abs() < 3) || (x > 4 && z < -4) {
            continue;
        }
        plant_tree(&world, BlockPos::new(x, SURFACE_Y, z));
        planted = planted.saturating_add(1);
    }

    world.fill(BlockPos::new(6, SURFACE_Y, -8), BlockPos::new(8, SURFACE_Y, -6), "stone");
    world.set_block(BlockPos::new(7, 65, -7), "coal_ore");
    world.set_block(BlockPos::new(8, 65, -8), "iron_ore");
    world.set_block(BlockPos::new(6, 65, -8), "iron_ore");

    for x in -5..=-3 {
        world.set_block(BlockPos::new(x, GROUND_Y, 5), "farmland");
        world.set_block(BlockPos::new(x, SURFACE_Y, 5), "wheat");
    }

    world.set_block(DEMO_CHEST, "chest");

    for name in ["sheep", "sheep", "cow", "chicken"] {
        let x: f64 = rng.random_range(-10.0..10.0);
        let z: f64 = rng.random_range(-10.0..10.0);
        world.spawn_creature(name, Vec3::new(x, f64::from(SURFACE_Y), z));
    }

    world
}

fn plant_tree(world: &SimWorld, base: BlockPos) {
    world.fill(base, base.offset(0, 3, 0), "oak_log");
    let crown = base.offset(0, 4, 0);
    for (dx, dz) in [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)] {
        world.set_block(crown.offset(dx, 0, dz), "oak_leaves");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::WorldView;

    #[test]
    fn demo_world_has_resources() {
        let world = create_demo_world(7);
        assert!(world.find_block(&|_, n| n == "oak_log", 32.0).is_some());
        assert!(world.find_block(&|_, n| n == "iron_ore", 32.0).is_some());
        assert_eq!(world.block_at(DEMO_CHEST).as_deref(), Some("chest"));
        assert!(world.nearest_entity(&|e| e.name == "sheep", 32.0).is_some());
    }

    #[test]
    fn same_seed_same_world() {
        let a = create_demo_world(42);
        let b = create_demo_world(42);
        let logs = |w: &SimWorld| w.find_block(&|_, n| n == "oak_log", 32.0);
        assert_eq!(logs(&a), logs(&b));
    }
}
