//! Region extraction
//!
//! Splits an owner's chunk list into maximal 4-connected regions. Chunks that
//! only touch diagonally end up in different regions.
//!
//! Algorithm (one pass per region):
//! 1. Scan the pending chunk list in order until a chunk still present in the
//!    remaining set is found
//! 2. Flood-fill from it, moving every reachable chunk from the remaining set
//!    into a fresh region set
//! 3. Keep scanning: chunks of this region join its chunk list and refine the
//!    tracing seed, chunks of later regions are queued for the next pass
//!
//! Regions come out in the order their first chunk appears in the input list,
//! so owner marker sequence numbers are stable across runs.

use crate::coords::ChunkPos;
use crate::flags::ChunkFlags;

/// One maximal 4-connected group of chunks.
#[derive(Clone, Debug)]
pub struct Region {
    /// Membership of this region only
    pub flags: ChunkFlags,
    /// Chunks of this region in input-list order
    pub chunks: Vec<ChunkPos>,
    /// Smallest x, ties broken by smallest z; the boundary trace starts here
    pub seed: ChunkPos,
}

impl Region {
    /// Number of distinct chunks in the region
    pub fn size(&self) -> usize {
        self.flags.len()
    }

    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.flags.contains(pos)
    }
}

/// Move every chunk 4-connected to `start` from `src` into `dest`.
///
/// Returns the number of chunks moved.
pub fn flood_fill_into(src: &mut ChunkFlags, dest: &mut ChunkFlags, start: ChunkPos) -> usize {
    let mut moved = 0;
    let mut stack = vec![start];

    while let Some(pos) = stack.pop() {
        if !src.contains(pos) {
            continue;
        }

        src.remove(pos);
        dest.insert(pos);
        moved += 1;

        for neighbor in pos.neighbors() {
            if src.contains(neighbor) {
                stack.push(neighbor);
            }
        }
    }

    moved
}

/// Pulls regions out of an owner's chunk list one pass at a time.
///
/// Owns the remaining set for the whole run; each produced [`Region`] owns
/// its own flag set, so nothing is aliased between passes.
pub struct RegionExtractor {
    remaining: ChunkFlags,
    pending: Vec<ChunkPos>,
}

impl RegionExtractor {
    /// Build an extractor over an ordered chunk list.
    pub fn new(chunks: Vec<ChunkPos>) -> Self {
        let remaining = chunks.iter().copied().collect();
        Self::with_flags(chunks, remaining)
    }

    /// Build an extractor from a chunk list and a flag set holding exactly
    /// those chunks.
    pub fn with_flags(chunks: Vec<ChunkPos>, remaining: ChunkFlags) -> Self {
        Self {
            remaining,
            pending: chunks,
        }
    }

    /// Chunks not yet assigned to a region
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Run one extraction pass.
    ///
    /// Returns `None` once a pass finds no chunk left to start a region from.
    pub fn next_region(&mut self) -> Option<Region> {
        let scan = std::mem::take(&mut self.pending);
        let mut region: Option<Region> = None;

        for pos in scan {
            match region.as_mut() {
                None => {
                    if self.remaining.contains(pos) {
                        let mut flags = ChunkFlags::new();
                        flood_fill_into(&mut self.remaining, &mut flags, pos);
                        region = Some(Region {
                            flags,
                            chunks: vec![pos],
                            seed: pos,
                        });
                    }
                    // Otherwise absorbed by an earlier region
                }
                Some(current) => {
                    if current.flags.contains(pos) {
                        current.chunks.push(pos);
                        if pos.precedes(current.seed) {
                            current.seed = pos;
                        }
                    } else if self.remaining.contains(pos) {
                        self.pending.push(pos);
                    }
                }
            }
        }

        region
    }
}

impl Iterator for RegionExtractor {
    type Item = Region;

    fn next(&mut self) -> Option<Region> {
        self.next_region()
    }
}

/// Partition a chunk list into regions, in discovery order.
pub fn extract_regions(chunks: &[ChunkPos]) -> Vec<Region> {
    RegionExtractor::new(chunks.to_vec()).collect()
}
