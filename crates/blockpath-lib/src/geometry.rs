//! Geometry primitives for the voxel grid.
//!
//! This module provides:
//! - [`Domain`] - Opaque identifier for one navigable space instance
//! - [`Position`] - Immutable domain-tagged point with block helpers
//! - [`Vector`] - Domain-free delta between positions
//!
//! Positions carry the [`Domain`] they belong to, and every operation that
//! combines two positions requires their domains to match. This keeps
//! coordinates from two unrelated spaces from being mixed by accident.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Cost of a single orthogonal grid step.
pub const UNIT_COST: f64 = 1.0;
/// Cost of a face-diagonal grid step (two axes change), sqrt(2).
pub const FACE_DIAGONAL_COST: f64 = 1.4142135623730951;
/// Cost of a corner-diagonal grid step (three axes change), sqrt(3).
pub const CORNER_DIAGONAL_COST: f64 = 1.7320508075688772;

/// Opaque identifier for a navigable space instance.
///
/// Domains have no behavior beyond value equality; two positions are
/// comparable or combinable only when their domains are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Domain(u64);

impl Domain {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "domain#{}", self.0)
    }
}

/// A delta between positions. Carries no domain; applying it to a
/// [`Position`] yields a position in that position's domain.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn add(&self, other: &Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn subtract(&self, other: &Vector) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Scale every component by `factor`.
    pub fn scale(&self, factor: f64) -> Vector {
        Vector::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// An immutable point in a [`Domain`]'s voxel grid.
///
/// Every mutator returns a new instance. The block a position falls into is
/// addressed by the per-axis floor of its coordinates.
///
/// Equality and hashing compare the domain plus the bit pattern of each
/// coordinate, so positions are usable as map keys.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Position {
    domain: Domain,
    x: f64,
    y: f64,
    z: f64,
}

impl Position {
    pub const fn new(domain: Domain, x: f64, y: f64, z: f64) -> Self {
        Self { domain, x, y, z }
    }

    pub const fn domain(&self) -> Domain {
        self.domain
    }

    pub const fn x(&self) -> f64 {
        self.x
    }

    pub const fn y(&self) -> f64 {
        self.y
    }

    pub const fn z(&self) -> f64 {
        self.z
    }

    /// X coordinate of the block this position is in.
    pub fn block_x(&self) -> i64 {
        self.x.floor() as i64
    }

    /// Y coordinate of the block this position is in.
    pub fn block_y(&self) -> i64 {
        self.y.floor() as i64
    }

    /// Z coordinate of the block this position is in.
    pub fn block_z(&self) -> i64 {
        self.z.floor() as i64
    }

    pub fn with_x(&self, x: f64) -> Position {
        Position::new(self.domain, x, self.y, self.z)
    }

    pub fn with_y(&self, y: f64) -> Position {
        Position::new(self.domain, self.x, y, self.z)
    }

    pub fn with_z(&self, z: f64) -> Position {
        Position::new(self.domain, self.x, self.y, z)
    }

    /// Return a new position offset by the given deltas.
    pub fn add(&self, x: f64, y: f64, z: f64) -> Position {
        Position::new(self.domain, self.x + x, self.y + y, self.z + z)
    }

    /// Return a new position offset by the negated deltas.
    pub fn subtract(&self, x: f64, y: f64, z: f64) -> Position {
        Position::new(self.domain, self.x - x, self.y - y, self.z - z)
    }

    /// Round every coordinate down to its block coordinate. Idempotent.
    pub fn floor(&self) -> Position {
        Position::new(
            self.domain,
            self.block_x() as f64,
            self.block_y() as f64,
            self.block_z() as f64,
        )
    }

    /// The center of the block this position is in (block coordinate + 0.5
    /// on every axis).
    pub fn mid(&self) -> Position {
        Position::new(
            self.domain,
            self.block_x() as f64 + 0.5,
            self.block_y() as f64 + 0.5,
            self.block_z() as f64 + 0.5,
        )
    }

    /// Drop the domain and return the coordinates as a [`Vector`].
    pub fn to_vector(&self) -> Vector {
        Vector::new(self.x, self.y, self.z)
    }

    /// Whether both positions fall into the same block.
    ///
    /// # Panics
    ///
    /// Panics if the positions belong to different domains.
    pub fn is_in_same_block(&self, other: &Position) -> bool {
        self.assert_same_domain(other);
        self.block_x() == other.block_x()
            && self.block_y() == other.block_y()
            && self.block_z() == other.block_z()
    }

    /// Sum of absolute block-coordinate differences on all three axes.
    ///
    /// # Panics
    ///
    /// Panics if the positions belong to different domains.
    pub fn manhattan_distance(&self, other: &Position) -> i64 {
        self.assert_same_domain(other);
        (self.block_x() - other.block_x()).abs()
            + (self.block_y() - other.block_y()).abs()
            + (self.block_z() - other.block_z()).abs()
    }

    /// Squared Euclidean distance to `other`.
    ///
    /// # Panics
    ///
    /// Panics if the positions belong to different domains.
    pub fn distance_squared(&self, other: &Position) -> f64 {
        self.assert_same_domain(other);
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Euclidean distance to `other`.
    ///
    /// # Panics
    ///
    /// Panics if the positions belong to different domains.
    pub fn distance(&self, other: &Position) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Octile distance to `other`.
    ///
    /// Admissible heuristic for grid movement that permits orthogonal,
    /// face-diagonal, and corner-diagonal steps at costs 1, sqrt(2) and
    /// sqrt(3). With `low`/`mid`/`high` the sorted per-axis absolute
    /// differences:
    ///
    /// ```text
    /// octile = (sqrt(3) - sqrt(2)) * low + (sqrt(2) - 1) * mid + high
    /// ```
    ///
    /// On obstacle-free terrain this is the exact cost of the cheapest
    /// 26-neighbour path, which is what makes it safe to drive the search.
    ///
    /// # Panics
    ///
    /// Panics if the positions belong to different domains.
    pub fn octile_distance(&self, other: &Position) -> f64 {
        self.assert_same_domain(other);

        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        let dz = (self.z - other.z).abs();

        let low = dx.min(dz).min(dy);
        let high = dx.max(dz).max(dy);
        let mid = dx.min(dz).max(dx.max(dz).min(dy));

        (CORNER_DIAGONAL_COST - FACE_DIAGONAL_COST) * low
            + (FACE_DIAGONAL_COST - UNIT_COST) * mid
            + UNIT_COST * high
    }

    fn assert_same_domain(&self, other: &Position) {
        assert!(
            self.domain == other.domain,
            "positions belong to different domains ({} vs {})",
            self.domain,
            other.domain
        );
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain
            && self.x.to_bits() == other.x.to_bits()
            && self.y.to_bits() == other.y.to_bits()
            && self.z.to_bits() == other.z.to_bits()
    }
}

impl Eq for Position {}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain.hash(state);
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
        self.z.to_bits().hash(state);
    }
}

impl Add<Vector> for Position {
    type Output = Position;

    fn add(self, rhs: Vector) -> Position {
        Position::new(self.domain, self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub<Vector> for Position {
    type Output = Position;

    fn sub(self, rhs: Vector) -> Position {
        Position::new(self.domain, self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}) in {}", self.x, self.y, self.z, self.domain)
    }
}
