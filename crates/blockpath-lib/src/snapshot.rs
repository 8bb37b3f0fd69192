//! Block snapshot abstraction.
//!
//! The engine never reads world state directly; it asks a
//! [`SnapshotProvider`] for read-only per-chunk passability snapshots. A
//! provider that cannot serve a chunk returns `None`, and the engine treats
//! every cell of that chunk as impassable rather than failing the search.
//!
//! [`SnapshotAccessor`] is the per-search view the engine works through: it
//! caches one provider answer per chunk and records degraded regions.
//! [`InMemoryWorld`] is the reference provider implementation used by tests
//! and demos; host integrations are expected to supply their own provider
//! per target runtime.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::geometry::{Domain, Position};

/// Width of a chunk column in blocks along the x and z axes.
pub const CHUNK_WIDTH: i64 = 16;

/// Identifier of a chunk column within a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i64,
    pub z: i64,
}

impl ChunkCoord {
    pub const fn new(x: i64, z: i64) -> Self {
        Self { x, z }
    }

    /// Chunk containing the given block column. Uses an arithmetic shift, so
    /// negative block coordinates land in the right chunk.
    pub const fn containing(block_x: i64, block_z: i64) -> Self {
        Self {
            x: block_x >> 4,
            z: block_z >> 4,
        }
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk({}, {})", self.x, self.z)
    }
}

/// Read-only passability data for one chunk.
///
/// Snapshots are handed out as `Arc`s and queried with absolute block
/// coordinates. Implementations must be safe to share across searches.
pub trait BlockSnapshot: Send + Sync {
    /// Whether the block at the given absolute coordinates can be moved into.
    fn is_passable(&self, x: i64, y: i64, z: i64) -> bool;
}

/// External collaborator that supplies block snapshots.
///
/// `snapshot` may be slow or blocking; it is called from worker threads, and
/// may be called concurrently by multiple in-flight searches. Caching and
/// thread-safety are the provider's responsibility. Returning `None` marks
/// the chunk unavailable, which the engine treats as impassable.
pub trait SnapshotProvider: Send + Sync {
    fn snapshot(&self, domain: Domain, chunk: ChunkCoord) -> Option<Arc<dyn BlockSnapshot>>;
}

/// Per-search cached view over a [`SnapshotProvider`].
///
/// Each chunk is requested from the provider at most once per search; the
/// answer (including "unavailable") is cached for the remainder of the
/// search. Unavailable chunks are logged once and reported as impassable.
pub struct SnapshotAccessor<'a> {
    provider: &'a dyn SnapshotProvider,
    domain: Domain,
    chunks: HashMap<ChunkCoord, Option<Arc<dyn BlockSnapshot>>>,
    degraded: usize,
}

impl<'a> SnapshotAccessor<'a> {
    pub fn new(provider: &'a dyn SnapshotProvider, domain: Domain) -> Self {
        Self {
            provider,
            domain,
            chunks: HashMap::new(),
            degraded: 0,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Passability of the block at the given absolute coordinates.
    pub fn is_passable(&mut self, x: i64, y: i64, z: i64) -> bool {
        let chunk = ChunkCoord::containing(x, z);
        if !self.chunks.contains_key(&chunk) {
            let fetched = self.provider.snapshot(self.domain, chunk);
            if fetched.is_none() {
                self.degraded += 1;
                tracing::warn!(
                    domain = %self.domain,
                    %chunk,
                    "snapshot unavailable, treating chunk as impassable"
                );
            }
            self.chunks.insert(chunk, fetched);
        }
        match self.chunks.get(&chunk) {
            Some(Some(snapshot)) => snapshot.is_passable(x, y, z),
            _ => false,
        }
    }

    /// Passability of the block the given position falls into.
    pub fn is_position_passable(&mut self, position: &Position) -> bool {
        self.is_passable(position.block_x(), position.block_y(), position.block_z())
    }

    /// Number of chunks the provider could not serve so far.
    pub fn degraded_chunks(&self) -> usize {
        self.degraded
    }
}

#[derive(Default)]
struct DomainTerrain {
    blocked: HashSet<(i64, i64, i64)>,
    unavailable: HashSet<ChunkCoord>,
}

struct ChunkCells {
    blocked: HashSet<(i64, i64, i64)>,
    min_y: i64,
    max_y: i64,
}

impl BlockSnapshot for ChunkCells {
    fn is_passable(&self, x: i64, y: i64, z: i64) -> bool {
        y >= self.min_y && y <= self.max_y && !self.blocked.contains(&(x, y, z))
    }
}

/// Reference [`SnapshotProvider`] backed by explicit in-memory block data.
///
/// Domains are registered up front; blocks default to passable within the
/// world's vertical range, individual blocks can be marked impassable, and
/// whole chunks can be marked unavailable to exercise degraded-data
/// handling. Snapshots are built on demand and cached behind a mutex, so a
/// single provider serves concurrent searches.
pub struct InMemoryWorld {
    terrain: HashMap<Domain, DomainTerrain>,
    min_y: i64,
    max_y: i64,
    cache: Mutex<HashMap<(Domain, ChunkCoord), Arc<ChunkCells>>>,
    queries: AtomicU64,
}

impl InMemoryWorld {
    pub fn new() -> Self {
        Self {
            terrain: HashMap::new(),
            min_y: 0,
            max_y: 255,
            cache: Mutex::new(HashMap::new()),
            queries: AtomicU64::new(0),
        }
    }

    /// Register a domain with fully passable terrain. Chunks of
    /// unregistered domains are unavailable.
    pub fn add_domain(&mut self, domain: Domain) {
        self.terrain.entry(domain).or_default();
    }

    /// Restrict the passable vertical range (inclusive on both ends).
    pub fn set_height(&mut self, min_y: i64, max_y: i64) {
        self.min_y = min_y;
        self.max_y = max_y;
    }

    /// Mark a single block impassable.
    pub fn block_at(&mut self, domain: Domain, x: i64, y: i64, z: i64) {
        self.terrain
            .entry(domain)
            .or_default()
            .blocked
            .insert((x, y, z));
    }

    /// Mark the block a position falls into impassable.
    pub fn block(&mut self, position: &Position) {
        self.block_at(
            position.domain(),
            position.block_x(),
            position.block_y(),
            position.block_z(),
        );
    }

    /// Mark a chunk as unavailable; queries for it return `None`.
    pub fn mark_unavailable(&mut self, domain: Domain, chunk: ChunkCoord) {
        self.terrain
            .entry(domain)
            .or_default()
            .unavailable
            .insert(chunk);
    }

    /// Total number of snapshot queries served, cache misses and hits alike.
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    /// Number of cached snapshots still borrowed by some consumer.
    ///
    /// A finished search must have dropped every snapshot it held, so tests
    /// use this to verify that a terminated search released its resources.
    pub fn outstanding_snapshots(&self) -> usize {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .values()
            .filter(|snapshot| Arc::strong_count(snapshot) > 1)
            .count()
    }
}

impl Default for InMemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotProvider for InMemoryWorld {
    fn snapshot(&self, domain: Domain, chunk: ChunkCoord) -> Option<Arc<dyn BlockSnapshot>> {
        self.queries.fetch_add(1, Ordering::Relaxed);

        let terrain = self.terrain.get(&domain)?;
        if terrain.unavailable.contains(&chunk) {
            return None;
        }

        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        let cells = cache.entry((domain, chunk)).or_insert_with(|| {
            let blocked = terrain
                .blocked
                .iter()
                .filter(|(x, _, z)| ChunkCoord::containing(*x, *z) == chunk)
                .copied()
                .collect();
            Arc::new(ChunkCells {
                blocked,
                min_y: self.min_y,
                max_y: self.max_y,
            })
        });
        let snapshot: Arc<dyn BlockSnapshot> = cells.clone();
        Some(snapshot)
    }
}
