//! A*-style search over the block grid.
//!
//! One invocation of [`run_search`] owns its entire working state: the node
//! arena, the open-set heap, and the per-search snapshot cache. Nothing is
//! shared between searches, and everything is released when the function
//! returns, before the result reaches the caller.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::time::{Duration, Instant};

use crate::geometry::Position;
use crate::movement::{MoveDecision, MovementRule, NEIGHBOR_OFFSETS};
use crate::result::{FailureReason, PathResult};
use crate::snapshot::{SnapshotAccessor, SnapshotProvider};

/// Budgets applied to a single search.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchLimits {
    /// Maximum number of node expansions.
    pub max_iterations: u64,
    /// Wall-clock budget, measured from the first iteration.
    pub timeout: Option<Duration>,
    /// Return the best-so-far path instead of a timeout failure when a
    /// budget runs out.
    pub allow_partial: bool,
}

/// Everything one search invocation needs.
pub(crate) struct SearchRequest<'a> {
    pub provider: &'a dyn SnapshotProvider,
    pub rule: &'a dyn MovementRule,
    pub start: Position,
    pub target: Position,
    pub limits: SearchLimits,
    pub cancel: &'a AtomicBool,
}

struct Node {
    position: Position,
    g: f64,
    h: f64,
    parent: Option<usize>,
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct OpenEntry {
    f: FloatOrd,
    h: FloatOrd,
    g: FloatOrd,
    seq: u64,
    node: usize,
}

impl OpenEntry {
    fn new(node: usize, g: f64, h: f64, seq: u64) -> Self {
        Self {
            f: FloatOrd(g + h),
            h: FloatOrd(h),
            g: FloatOrd(g),
            seq,
            node,
        }
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap: lowest f wins,
        // ties go to the lower heuristic, then to the earlier insertion.
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

enum Exit {
    Goal(usize),
    Exhausted,
    Budget,
    Cancelled,
}

/// Run one search to completion on the calling thread.
pub(crate) fn run_search(request: SearchRequest<'_>) -> PathResult {
    let started = Instant::now();
    let deadline = request.limits.timeout.map(|budget| started + budget);

    // Nodes sit at block centers, so the returned path starts in the start
    // block and ends in the last reached block.
    let start = request.start.mid();
    let target = request.target.mid();

    tracing::debug!(start = %request.start, target = %request.target, "starting path search");

    let mut blocks = SnapshotAccessor::new(request.provider, start.domain());
    let mut arena: Vec<Node> = Vec::new();
    let mut by_block: HashMap<(i64, i64, i64), usize> = HashMap::new();
    let mut open: BinaryHeap<OpenEntry> = BinaryHeap::new();
    let mut seq: u64 = 0;

    let start_h = start.octile_distance(&target);
    arena.push(Node {
        position: start,
        g: 0.0,
        h: start_h,
        parent: None,
    });
    by_block.insert((start.block_x(), start.block_y(), start.block_z()), 0);
    open.push(OpenEntry::new(0, 0.0, start_h, seq));
    seq += 1;

    // Node closest to the target seen so far, for partial results.
    let mut best = 0usize;
    let mut expanded: u64 = 0;

    let exit = loop {
        if request.cancel.load(AtomicOrdering::Relaxed) {
            break Exit::Cancelled;
        }
        if expanded >= request.limits.max_iterations {
            break Exit::Budget;
        }
        if deadline.is_some_and(|limit| Instant::now() >= limit) {
            break Exit::Budget;
        }

        let Some(entry) = open.pop() else {
            break Exit::Exhausted;
        };
        let index = entry.node;
        if entry.g.0 > arena[index].g {
            // Stale heap entry; the node has been relaxed since.
            continue;
        }
        expanded += 1;

        if arena[index].position.is_in_same_block(&target) {
            break Exit::Goal(index);
        }

        let current = arena[index].position;
        let current_g = arena[index].g;

        for offset in NEIGHBOR_OFFSETS {
            let decision = request.rule.evaluate(&current, offset, &mut blocks);
            let MoveDecision::Legal { cost } = decision else {
                continue;
            };

            let neighbor = current.add(offset.dx as f64, offset.dy as f64, offset.dz as f64);
            let tentative = current_g + cost;
            let key = (neighbor.block_x(), neighbor.block_y(), neighbor.block_z());

            match by_block.entry(key) {
                Entry::Occupied(slot) => {
                    let ni = *slot.get();
                    // Strictly-lower cost re-opens the node; parents always
                    // point at cheaper nodes, so the chain stays acyclic.
                    if tentative < arena[ni].g {
                        arena[ni].g = tentative;
                        arena[ni].parent = Some(index);
                        open.push(OpenEntry::new(ni, tentative, arena[ni].h, seq));
                        seq += 1;
                    }
                }
                Entry::Vacant(slot) => {
                    let h = neighbor.octile_distance(&target);
                    let ni = arena.len();
                    arena.push(Node {
                        position: neighbor,
                        g: tentative,
                        h,
                        parent: Some(index),
                    });
                    slot.insert(ni);
                    if h < arena[best].h {
                        best = ni;
                    }
                    open.push(OpenEntry::new(ni, tentative, h, seq));
                    seq += 1;
                }
            }
        }
    };

    let result = match exit {
        Exit::Goal(index) => {
            let cost = arena[index].g;
            PathResult::success(reconstruct_path(&arena, index), cost)
        }
        Exit::Exhausted => PathResult::failure(FailureReason::NoPath),
        Exit::Budget => {
            if request.limits.allow_partial {
                let cost = arena[best].g;
                PathResult::partial(reconstruct_path(&arena, best), cost)
            } else {
                PathResult::failure(FailureReason::Timeout)
            }
        }
        Exit::Cancelled => PathResult::failure(FailureReason::Cancelled),
    };

    tracing::debug!(
        outcome = %result.outcome,
        expanded,
        degraded_chunks = blocks.degraded_chunks(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "path search finished"
    );

    result
}

fn reconstruct_path(arena: &[Node], goal: usize) -> Vec<Position> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(index) = current {
        path.push(arena[index].position);
        current = arena[index].parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Domain;
    use crate::movement::StandardMovement;
    use crate::result::PathOutcome;
    use crate::snapshot::{ChunkCoord, InMemoryWorld};

    const D: Domain = Domain::new(1);

    fn limits(max_iterations: u64, allow_partial: bool) -> SearchLimits {
        SearchLimits {
            max_iterations,
            timeout: None,
            allow_partial,
        }
    }

    fn search(
        world: &InMemoryWorld,
        start: Position,
        target: Position,
        limits: SearchLimits,
    ) -> PathResult {
        let rule = StandardMovement::default();
        let cancel = AtomicBool::new(false);
        run_search(SearchRequest {
            provider: world,
            rule: &rule,
            start,
            target,
            limits,
            cancel: &cancel,
        })
    }

    fn open_world() -> InMemoryWorld {
        let mut world = InMemoryWorld::new();
        world.add_domain(D);
        world
    }

    /// One 16x16 chunk with a low ceiling, surrounded by unavailable chunks.
    fn sealed_yard() -> InMemoryWorld {
        let mut world = open_world();
        world.set_height(0, 3);
        for cx in -1..=1 {
            for cz in -1..=1 {
                if (cx, cz) != (0, 0) {
                    world.mark_unavailable(D, ChunkCoord::new(cx, cz));
                }
            }
        }
        world
    }

    #[test]
    fn straight_line_is_optimal() {
        let world = open_world();
        let start = Position::new(D, 0.0, 64.0, 0.0);
        let target = Position::new(D, 5.0, 64.0, 0.0);

        let result = search(&world, start, target, limits(10_000, false));
        assert_eq!(result.outcome, PathOutcome::Success);
        assert!((result.cost - 5.0).abs() < 1e-9);
        assert_eq!(result.path.len(), 6);
        assert!(result.path[0].is_in_same_block(&start));
        assert!(result.path[5].is_in_same_block(&target));
    }

    #[test]
    fn open_terrain_cost_matches_octile_estimate() {
        let world = open_world();
        let start = Position::new(D, 0.0, 64.0, 0.0);
        let target = Position::new(D, 3.0, 65.0, 2.0);

        let result = search(&world, start, target, limits(10_000, false));
        assert_eq!(result.outcome, PathOutcome::Success);

        let estimate = start.mid().octile_distance(&target.mid());
        assert!((result.cost - estimate).abs() < 1e-9);
        assert!(estimate <= result.cost + 1e-9);
    }

    #[test]
    fn enclosed_target_exhausts_the_frontier() {
        let mut world = sealed_yard();
        let target = Position::new(D, 8.0, 1.0, 8.0);
        for offset in NEIGHBOR_OFFSETS {
            world.block_at(D, 8 + offset.dx, 1 + offset.dy, 8 + offset.dz);
        }

        let start = Position::new(D, 1.0, 1.0, 1.0);
        let result = search(&world, start, target, limits(10_000, false));
        assert_eq!(result.outcome, PathOutcome::Failed);
        assert_eq!(result.reason, Some(FailureReason::NoPath));
        assert!(result.path.is_empty());
    }

    #[test]
    fn exhausted_budget_is_a_timeout() {
        let world = open_world();
        let start = Position::new(D, 0.0, 64.0, 0.0);
        let target = Position::new(D, 40.0, 64.0, 40.0);

        let result = search(&world, start, target, limits(10, false));
        assert_eq!(result.outcome, PathOutcome::Failed);
        assert_eq!(result.reason, Some(FailureReason::Timeout));
    }

    #[test]
    fn partial_result_reaches_towards_the_target() {
        let world = open_world();
        let start = Position::new(D, 0.0, 64.0, 0.0);
        let target = Position::new(D, 40.0, 64.0, 40.0);

        let result = search(&world, start, target, limits(50, true));
        assert_eq!(result.outcome, PathOutcome::Partial);
        assert_eq!(result.reason, Some(FailureReason::Timeout));
        assert!(!result.path.is_empty());
        assert!(result.path[0].is_in_same_block(&start));
        // The best-so-far node is strictly closer than the start.
        let last = result.path[result.path.len() - 1];
        assert!(last.octile_distance(&target.mid()) < start.mid().octile_distance(&target.mid()));
    }

    #[test]
    fn preset_cancellation_stops_before_expansion() {
        let world = open_world();
        let rule = StandardMovement::default();
        let cancel = AtomicBool::new(true);

        let result = run_search(SearchRequest {
            provider: &world,
            rule: &rule,
            start: Position::new(D, 0.0, 64.0, 0.0),
            target: Position::new(D, 5.0, 64.0, 0.0),
            limits: limits(10_000, false),
            cancel: &cancel,
        });
        assert_eq!(result.outcome, PathOutcome::Failed);
        assert_eq!(result.reason, Some(FailureReason::Cancelled));
        assert_eq!(world.query_count(), 0);
    }

    #[test]
    fn identical_inputs_give_identical_paths() {
        let mut world = open_world();
        world.set_height(0, 8);
        // Deterministic obstacle scatter.
        for i in 0..60_i64 {
            world.block_at(D, (i * 7) % 20, 1 + (i % 5), (i * 13) % 20);
        }

        let start = Position::new(D, 0.0, 4.0, 0.0);
        let target = Position::new(D, 19.0, 4.0, 19.0);

        let first = search(&world, start, target, limits(10_000, false));
        let second = search(&world, start, target, limits(10_000, false));

        assert_eq!(first.outcome, second.outcome);
        assert_eq!(first.path, second.path);
        assert_eq!(first.cost.to_bits(), second.cost.to_bits());
    }

    #[test]
    fn start_block_equal_to_target_block_is_trivial() {
        let world = open_world();
        let start = Position::new(D, 3.2, 64.0, 3.9);
        let target = Position::new(D, 3.7, 64.5, 3.1);

        let result = search(&world, start, target, limits(10_000, false));
        assert_eq!(result.outcome, PathOutcome::Success);
        assert_eq!(result.path.len(), 1);
        assert_eq!(result.cost, 0.0);
    }
}
