//! Chunk coordinates.
//!
//! A territory is a set of chunks, each addressed by an integer (x, z) pair.
//! Ownership records store chunks as packed 64-bit keys; `ChunkPos` converts
//! between the two forms.

use serde::{Deserialize, Serialize};

/// One grid cell (a map chunk).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Offset by a delta, or `None` past the `i32` range.
    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Option<Self> {
        Some(Self::new(self.x.checked_add(dx)?, self.z.checked_add(dz)?))
    }

    /// The edge-sharing neighbors (+x, -x, +z, -z) that exist; chunks on
    /// the `i32` limits have fewer than four.
    #[inline]
    pub fn neighbors(self) -> impl Iterator<Item = ChunkPos> {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
        .into_iter()
        .flatten()
    }

    /// Pack into a chunk key: low 32 bits hold x, high 32 bits hold z.
    pub fn to_key(self) -> i64 {
        ((self.x as u32) as u64 | ((self.z as u32) as u64) << 32) as i64
    }

    /// Unpack a chunk key produced by [`ChunkPos::to_key`].
    pub fn from_key(key: i64) -> Self {
        let bits = key as u64;
        Self::new(bits as u32 as i32, (bits >> 32) as u32 as i32)
    }

    /// True when `self` comes before `other` in tracing-seed order:
    /// smallest x first, ties broken by smallest z.
    #[inline]
    pub fn precedes(self, other: ChunkPos) -> bool {
        self.x < other.x || (self.x == other.x && self.z < other.z)
    }
}

impl From<(i32, i32)> for ChunkPos {
    fn from((x, z): (i32, i32)) -> Self {
        Self::new(x, z)
    }
}

impl std::fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.z)
    }
}
