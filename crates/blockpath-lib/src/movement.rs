//! Movement legality rules.
//!
//! The search engine itself only knows how to expand a frontier; which of
//! the 26 surrounding cells are legal moves, and at what cost, is decided by
//! a pluggable [`MovementRule`]. [`StandardMovement`] is the default rule:
//! it rejects moves into impassable cells and applies a configurable
//! diagonal policy.

use serde::{Deserialize, Serialize};

use crate::geometry::{Position, CORNER_DIAGONAL_COST, FACE_DIAGONAL_COST, UNIT_COST};
use crate::snapshot::SnapshotAccessor;

/// Block-grid offset to one of the 26 surrounding cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    pub dx: i64,
    pub dy: i64,
    pub dz: i64,
}

impl Offset {
    pub const fn new(dx: i64, dy: i64, dz: i64) -> Self {
        Self { dx, dy, dz }
    }

    /// Number of axes this offset changes (1 to 3 for neighbour offsets).
    pub fn axes(&self) -> u32 {
        (self.dx != 0) as u32 + (self.dy != 0) as u32 + (self.dz != 0) as u32
    }

    /// Geometric cost of taking this step: 1, sqrt(2) or sqrt(3).
    pub fn step_cost(&self) -> f64 {
        match self.axes() {
            0 | 1 => UNIT_COST,
            2 => FACE_DIAGONAL_COST,
            _ => CORNER_DIAGONAL_COST,
        }
    }
}

/// The 26-cell neighbourhood, orthogonal steps first, then face diagonals,
/// then corner diagonals. The order is fixed; together with the search
/// tie-breaking it makes results reproducible run-to-run.
pub const NEIGHBOR_OFFSETS: [Offset; 26] = [
    // Orthogonal.
    Offset::new(-1, 0, 0),
    Offset::new(1, 0, 0),
    Offset::new(0, -1, 0),
    Offset::new(0, 1, 0),
    Offset::new(0, 0, -1),
    Offset::new(0, 0, 1),
    // Face diagonals.
    Offset::new(-1, -1, 0),
    Offset::new(-1, 1, 0),
    Offset::new(1, -1, 0),
    Offset::new(1, 1, 0),
    Offset::new(-1, 0, -1),
    Offset::new(-1, 0, 1),
    Offset::new(1, 0, -1),
    Offset::new(1, 0, 1),
    Offset::new(0, -1, -1),
    Offset::new(0, -1, 1),
    Offset::new(0, 1, -1),
    Offset::new(0, 1, 1),
    // Corner diagonals.
    Offset::new(-1, -1, -1),
    Offset::new(-1, -1, 1),
    Offset::new(-1, 1, -1),
    Offset::new(-1, 1, 1),
    Offset::new(1, -1, -1),
    Offset::new(1, -1, 1),
    Offset::new(1, 1, -1),
    Offset::new(1, 1, 1),
];

/// Outcome of evaluating a candidate move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveDecision {
    /// The move is not allowed.
    Illegal,
    /// The move is allowed at the given step cost.
    Legal { cost: f64 },
}

/// Pluggable policy deciding neighbour legality and step cost.
///
/// Implementations are shared across searches and called from worker
/// threads, so they must be `Send + Sync` and should not hold per-search
/// state; the [`SnapshotAccessor`] passed in is the per-search view.
pub trait MovementRule: Send + Sync {
    fn evaluate(
        &self,
        from: &Position,
        offset: Offset,
        blocks: &mut SnapshotAccessor<'_>,
    ) -> MoveDecision;
}

/// How diagonal moves treat the cells they slide past.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiagonalPolicy {
    /// Diagonal moves require every axis-aligned component cell of the
    /// offset to be passable, so a path never cuts a blocked corner.
    #[default]
    NoCornerCutting,
    /// Diagonal moves only require the destination cell to be passable.
    Permissive,
    /// No diagonal moves at all; orthogonal steps only.
    Forbidden,
}

/// Default movement rule: impassable destinations are rejected, diagonals
/// follow the configured [`DiagonalPolicy`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StandardMovement {
    pub diagonals: DiagonalPolicy,
}

impl StandardMovement {
    pub fn new(diagonals: DiagonalPolicy) -> Self {
        Self { diagonals }
    }
}

impl MovementRule for StandardMovement {
    fn evaluate(
        &self,
        from: &Position,
        offset: Offset,
        blocks: &mut SnapshotAccessor<'_>,
    ) -> MoveDecision {
        let (bx, by, bz) = (from.block_x(), from.block_y(), from.block_z());

        if !blocks.is_passable(bx + offset.dx, by + offset.dy, bz + offset.dz) {
            return MoveDecision::Illegal;
        }

        if offset.axes() > 1 {
            match self.diagonals {
                DiagonalPolicy::Forbidden => return MoveDecision::Illegal,
                DiagonalPolicy::NoCornerCutting => {
                    let clipped = (offset.dx != 0 && !blocks.is_passable(bx + offset.dx, by, bz))
                        || (offset.dy != 0 && !blocks.is_passable(bx, by + offset.dy, bz))
                        || (offset.dz != 0 && !blocks.is_passable(bx, by, bz + offset.dz));
                    if clipped {
                        return MoveDecision::Illegal;
                    }
                }
                DiagonalPolicy::Permissive => {}
            }
        }

        MoveDecision::Legal {
            cost: offset.step_cost(),
        }
    }
}
