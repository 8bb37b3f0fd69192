//! Common test fixtures for integration tests.
//!
//! Worlds are built from the in-memory reference provider: an open world
//! for happy-path routing, and a bounded three-chunk corridor for tests
//! that need the frontier to exhaust.

use blockpath_lib::{ChunkCoord, Domain, InMemoryWorld};

/// Domain shared by all integration fixtures.
pub const OVERWORLD: Domain = Domain::new(1);

/// Fully passable world with the default vertical range.
#[allow(dead_code)]
pub fn open_world() -> InMemoryWorld {
    let mut world = InMemoryWorld::new();
    world.add_domain(OVERWORLD);
    world
}

/// Three available chunks in a row (x = 0..=2, z = 0) with a low ceiling,
/// surrounded by unavailable chunks. With `sealed_middle` the center chunk
/// is unavailable too, cutting the corridor in half.
#[allow(dead_code)]
pub fn corridor_world(sealed_middle: bool) -> InMemoryWorld {
    let mut world = InMemoryWorld::new();
    world.add_domain(OVERWORLD);
    world.set_height(0, 3);

    for cx in -1..=3_i64 {
        for cz in -1..=1_i64 {
            let corridor = cz == 0 && (0..=2).contains(&cx);
            if !corridor {
                world.mark_unavailable(OVERWORLD, ChunkCoord::new(cx, cz));
            }
        }
    }
    if sealed_middle {
        world.mark_unavailable(OVERWORLD, ChunkCoord::new(1, 0));
    }
    world
}
