//! Region boundary tracing
//!
//! Walks the lattice edges around a 4-connected region and records the
//! corners where the walk turns. The walk starts at the top-left corner of the
//! seed chunk (smallest x, then smallest z) heading +X and keeps the region on
//! its right, so outlines come out clockwise with z pointing down.
//!
//! Each step looks at two chunks relative to the heading:
//! - ahead absent: turn right in place, emitting the corner that ends the edge
//! - ahead present, diagonal absent: move straight, no corner
//! - both present: turn left onto the diagonal chunk, emitting the corner
//!
//! Diagonal pinches are always taken as turns, so only the outer contour is
//! walked. Interior holes are not carved out of the result.

use crate::coords::ChunkPos;
use crate::flags::ChunkFlags;
use crate::polygon::Polygon;
use crate::region::Region;

/// Walking direction along the boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    PlusX,
    PlusZ,
    MinusX,
    MinusZ,
}

/// Offsets probed for one direction, relative to the current chunk.
struct Probe {
    ahead: (i32, i32),
    diagonal: (i32, i32),
    corner: (i64, i64),
}

const PROBES: [Probe; 4] = [
    // PlusX: along the top edge
    Probe { ahead: (1, 0), diagonal: (1, -1), corner: (1, 0) },
    // PlusZ: along the right edge
    Probe { ahead: (0, 1), diagonal: (1, 1), corner: (1, 1) },
    // MinusX: along the bottom edge
    Probe { ahead: (-1, 0), diagonal: (-1, 1), corner: (0, 1) },
    // MinusZ: along the left edge
    Probe { ahead: (0, -1), diagonal: (-1, -1), corner: (0, 0) },
];

impl Direction {
    fn probe(self) -> &'static Probe {
        &PROBES[self as usize]
    }

    /// Quarter turn clockwise (z down).
    pub fn turn_right(self) -> Self {
        match self {
            Direction::PlusX => Direction::PlusZ,
            Direction::PlusZ => Direction::MinusX,
            Direction::MinusX => Direction::MinusZ,
            Direction::MinusZ => Direction::PlusX,
        }
    }

    /// Quarter turn counter-clockwise (z down).
    pub fn turn_left(self) -> Self {
        match self {
            Direction::PlusX => Direction::MinusZ,
            Direction::PlusZ => Direction::PlusX,
            Direction::MinusX => Direction::PlusZ,
            Direction::MinusZ => Direction::MinusX,
        }
    }
}

/// Decision taken at one step of the walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Move {
    TurnRight,
    Straight(ChunkPos),
    TurnLeft(ChunkPos),
}

/// The chunk at `delta` from `pos`, if it exists and belongs to the region.
/// Positions past the `i32` range count as absent.
#[inline]
fn occupied(flags: &ChunkFlags, pos: ChunkPos, delta: (i32, i32)) -> Option<ChunkPos> {
    pos.offset(delta.0, delta.1).filter(|&next| flags.contains(next))
}

fn decide(flags: &ChunkFlags, pos: ChunkPos, probe: &Probe) -> Move {
    let Some(ahead) = occupied(flags, pos, probe.ahead) else {
        return Move::TurnRight;
    };
    match occupied(flags, pos, probe.diagonal) {
        Some(diagonal) => Move::TurnLeft(diagonal),
        None => Move::Straight(ahead),
    }
}

/// Trace the outer boundary of the region held in `flags`.
///
/// `seed` must be the region's chunk with the smallest x (ties: smallest z).
/// Returns lattice corners in walk order, starting with the seed's top-left
/// corner; the closing corner is not repeated.
pub fn trace_outline(flags: &ChunkFlags, seed: ChunkPos) -> Vec<(i64, i64)> {
    debug_assert!(flags.contains(seed), "seed {} is not part of the region", seed);

    let mut corners = vec![(seed.x as i64, seed.z as i64)];
    let mut pos = seed;
    let mut dir = Direction::PlusX;
    let max_steps = 8 * flags.len() + 8;
    let mut steps = 0usize;

    // Back at the seed heading -Z, the next step would re-emit the first
    // corner and face +X again: the loop is closed.
    while pos != seed || dir != Direction::MinusZ {
        let probe = dir.probe();
        match decide(flags, pos, probe) {
            Move::TurnRight => {
                corners.push(corner_of(pos, probe));
                dir = dir.turn_right();
            }
            Move::Straight(next) => {
                pos = next;
            }
            Move::TurnLeft(next) => {
                corners.push(corner_of(pos, probe));
                dir = dir.turn_left();
                pos = next;
            }
        }

        steps += 1;
        debug_assert!(steps <= max_steps, "boundary walk from {} did not close", seed);
    }

    corners
}

#[inline]
fn corner_of(pos: ChunkPos, probe: &Probe) -> (i64, i64) {
    (pos.x as i64 + probe.corner.0, pos.z as i64 + probe.corner.1)
}

/// Trace a region and scale its outline into world coordinates.
pub fn trace_polygon(region: &Region, cell_size: f64) -> Polygon {
    Polygon::from_corners(&trace_outline(&region.flags, region.seed), cell_size)
}
