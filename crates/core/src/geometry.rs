//! Lattice points, compass directions and unit edges.
//!
//! (0, 0) is the board center, y grows towards the gate of player Two.

use std::hash::{Hash, Hasher};
use std::ops::Add;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Eight compass directions. Codes 0..4 are the "northern" half used by
/// normalized edges.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    NorthWest = 0,
    North = 1,
    NorthEast = 2,
    East = 3,
    SouthEast = 4,
    South = 5,
    SouthWest = 6,
    West = 7,
}

/// Unit offsets indexed by direction code.
const UNIT_VECTORS: [Point; 8] = [
    Point::new(-1, 1),
    Point::new(0, 1),
    Point::new(1, 1),
    Point::new(1, 0),
    Point::new(1, -1),
    Point::new(0, -1),
    Point::new(-1, -1),
    Point::new(-1, 0),
];

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
    ];

    /// Directions a normalized edge can point in.
    pub const NORMALIZED: [Direction; 4] = [
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
        Direction::East,
    ];

    #[inline(always)]
    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn from_index(index: u8) -> Option<Direction> {
        if index < 8 {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    #[inline]
    pub const fn opposite(self) -> Direction {
        Self::ALL[((self as u8 + 4) % 8) as usize]
    }

    #[inline(always)]
    pub const fn unit_vector(self) -> Point {
        UNIT_VECTORS[self as usize]
    }

    /// Inverse of [`Direction::unit_vector`]; None for anything that is not a
    /// unit offset.
    pub fn from_offset(offset: Point) -> Option<Direction> {
        Self::ALL
            .into_iter()
            .find(|dir| dir.unit_vector() == offset)
    }

    /// True for the half of the compass that normalization flips away.
    #[inline(always)]
    pub const fn is_southern(self) -> bool {
        self as u8 >= 4
    }
}

/// A unit segment starting at `start` and going towards `direction`.
///
/// Equality and hashing look at the undirected segment, so an edge and its
/// reverse compare equal.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Edge {
    start: Point,
    direction: Direction,
}

impl Edge {
    pub const fn new(start: Point, direction: Direction) -> Self {
        Self { start, direction }
    }

    #[inline(always)]
    pub fn start(&self) -> Point {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Point {
        self.start + self.direction.unit_vector()
    }

    #[inline(always)]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The same segment walked the other way.
    pub fn reversed(&self) -> Edge {
        Edge::new(self.end(), self.direction.opposite())
    }

    /// Rewrites the edge so its direction is one of NW, N, NE, E.
    pub fn normalize(&mut self) {
        if self.direction.is_southern() {
            *self = self.reversed();
        }
    }

    pub fn normalized(&self) -> Edge {
        let mut edge = *self;
        edge.normalize();
        edge
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        let a = self.normalized();
        let b = other.normalized();
        a.start == b.start && a.direction == b.direction
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let edge = self.normalized();
        edge.start.hash(state);
        edge.direction.hash(state);
    }
}
