//! Blockpath library entry points.
//!
//! This crate exposes the voxel pathfinding engine: domain-tagged geometry
//! primitives, the chunk snapshot abstraction, pluggable movement rules,
//! and the asynchronous A* pathfinder. Host integrations (chunk IO, plugin
//! wiring, per-runtime block access) implement [`SnapshotProvider`] and
//! consume the types exported here instead of reimplementing behavior.
//!
//! ```no_run
//! use std::sync::Arc;
//! use blockpath_lib::{Domain, InMemoryWorld, Pathfinder, Position};
//!
//! # async fn demo() {
//! let domain = Domain::new(1);
//! let mut world = InMemoryWorld::new();
//! world.add_domain(domain);
//!
//! let pathfinder = Pathfinder::new(Arc::new(world));
//! let task = pathfinder.find_path(
//!     Position::new(domain, 0.0, 64.0, 0.0),
//!     Position::new(domain, 5.0, 64.0, 0.0),
//! );
//! let result = task.await;
//! println!("{} hops at cost {}", result.hop_count(), result.cost);
//! # }
//! ```

pub mod error;
pub mod geometry;
pub mod movement;
pub mod pathfinder;
pub mod result;
mod search;
pub mod snapshot;

pub use error::{Error, Result};
pub use geometry::{Domain, Position, Vector};
pub use movement::{
    DiagonalPolicy, MoveDecision, MovementRule, Offset, StandardMovement, NEIGHBOR_OFFSETS,
};
pub use pathfinder::{PathTask, Pathfinder, PathfinderConfig};
pub use result::{FailureReason, PathOutcome, PathResult};
pub use snapshot::{
    BlockSnapshot, ChunkCoord, InMemoryWorld, SnapshotAccessor, SnapshotProvider, CHUNK_WIDTH,
};
