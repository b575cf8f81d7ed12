//! Reusable world fixtures.
//!
//! - [`open_world`] — one space, 64 layers tall, filled with [`STONE`].
//! - [`slab_world`] — stone below `y = 0`, empty space above.

use blight_core::{CellState, SpaceId, VerticalExtent};

use crate::{MockWorld, SharedWorld};

/// The space every fixture registers.
pub const TEST_SPACE: SpaceId = SpaceId(0);

/// A convertible solid material.
pub const STONE: CellState = CellState(1);

/// Vertical extent used by the fixtures.
pub const TEST_EXTENT: VerticalExtent = VerticalExtent {
    min_y: -32,
    max_y: 32,
};

/// A single space filled entirely with [`STONE`].
pub fn open_world() -> SharedWorld {
    let mut world = MockWorld::new();
    world.add_space(TEST_SPACE, TEST_EXTENT, STONE);
    SharedWorld::new(world)
}

/// A single space with a stone floor filling `y < 0` and empty space at
/// `y >= 0`.
pub fn slab_world(half_width: i32) -> SharedWorld {
    let mut world = MockWorld::new();
    world.add_space(TEST_SPACE, TEST_EXTENT, CellState::EMPTY);
    for x in -half_width..=half_width {
        for z in -half_width..=half_width {
            for y in TEST_EXTENT.min_y..0 {
                world.set(blight_core::VoxelKey::new(TEST_SPACE, x, y, z), STONE);
            }
        }
    }
    SharedWorld::new(world)
}
