//! Sparse chunk flag set.
//!
//! Membership over the unbounded integer plane without a dense raster:
//! cells are grouped into 64x64 tiles, each tile a bitmap of one `u64` per row,
//! and only tiles holding at least one set cell are allocated.

use std::collections::HashMap;

use crate::coords::ChunkPos;

/// Tile edge length in cells (one `u64` row per tile row).
const TILE_SIZE: i32 = 64;

/// Tile coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TileCoord {
    tx: i32,
    tz: i32,
}

/// A single tile's bitmap (TILE_SIZE x TILE_SIZE)
#[derive(Clone)]
struct TileBitmap {
    rows: [u64; TILE_SIZE as usize],
    count: u32,
}

impl TileBitmap {
    fn new() -> Self {
        Self {
            rows: [0u64; TILE_SIZE as usize],
            count: 0,
        }
    }

    #[inline]
    fn get(&self, col: usize, row: usize) -> bool {
        (self.rows[row] >> col) & 1 != 0
    }

    /// Set a bit, returning true if it was previously clear.
    #[inline]
    fn set(&mut self, col: usize, row: usize) -> bool {
        let mask = 1u64 << col;
        let was_clear = self.rows[row] & mask == 0;
        self.rows[row] |= mask;
        if was_clear {
            self.count += 1;
        }
        was_clear
    }

    /// Clear a bit, returning true if it was previously set.
    #[inline]
    fn clear(&mut self, col: usize, row: usize) -> bool {
        let mask = 1u64 << col;
        let was_set = self.rows[row] & mask != 0;
        self.rows[row] &= !mask;
        if was_set {
            self.count -= 1;
        }
        was_set
    }
}

#[inline]
fn split(x: i32, z: i32) -> (TileCoord, usize, usize) {
    let tile = TileCoord {
        tx: x.div_euclid(TILE_SIZE),
        tz: z.div_euclid(TILE_SIZE),
    };
    (tile, x.rem_euclid(TILE_SIZE) as usize, z.rem_euclid(TILE_SIZE) as usize)
}

/// Set of chunk coordinates with O(1) amortized set/clear/test.
///
/// Never-set coordinates test false. Any `i32` coordinate is valid.
#[derive(Clone, Default)]
pub struct ChunkFlags {
    tiles: HashMap<TileCoord, TileBitmap>,
    len: usize,
}

impl ChunkFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark (x, z) present.
    pub fn set(&mut self, x: i32, z: i32) {
        let (tile, col, row) = split(x, z);
        if self.tiles.entry(tile).or_insert_with(TileBitmap::new).set(col, row) {
            self.len += 1;
        }
    }

    /// Mark (x, z) absent. Tiles left empty are released.
    pub fn clear(&mut self, x: i32, z: i32) {
        let (tile, col, row) = split(x, z);
        let Some(bitmap) = self.tiles.get_mut(&tile) else {
            return;
        };
        if bitmap.clear(col, row) {
            self.len -= 1;
            if bitmap.count == 0 {
                self.tiles.remove(&tile);
            }
        }
    }

    /// Whether (x, z) is present.
    #[inline]
    pub fn test(&self, x: i32, z: i32) -> bool {
        let (tile, col, row) = split(x, z);
        self.tiles
            .get(&tile)
            .map(|bitmap| bitmap.get(col, row))
            .unwrap_or(false)
    }

    #[inline]
    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.test(pos.x, pos.z)
    }

    pub fn insert(&mut self, pos: ChunkPos) {
        self.set(pos.x, pos.z);
    }

    pub fn remove(&mut self, pos: ChunkPos) {
        self.clear(pos.x, pos.z);
    }

    /// Number of present cells.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Present cells, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.tiles.iter().flat_map(|(tile, bitmap)| {
            let base_x = tile.tx * TILE_SIZE;
            let base_z = tile.tz * TILE_SIZE;
            bitmap.rows.iter().enumerate().flat_map(move |(row, &bits)| {
                (0..TILE_SIZE as usize)
                    .filter(move |col| (bits >> col) & 1 != 0)
                    .map(move |col| ChunkPos::new(base_x + col as i32, base_z + row as i32))
            })
        })
    }
}

impl FromIterator<ChunkPos> for ChunkFlags {
    fn from_iter<I: IntoIterator<Item = ChunkPos>>(iter: I) -> Self {
        let mut flags = ChunkFlags::new();
        flags.extend(iter);
        flags
    }
}

impl Extend<ChunkPos> for ChunkFlags {
    fn extend<I: IntoIterator<Item = ChunkPos>>(&mut self, iter: I) {
        for pos in iter {
            self.insert(pos);
        }
    }
}

impl std::fmt::Debug for ChunkFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut cells: Vec<ChunkPos> = self.iter().collect();
        cells.sort();
        f.debug_set().entries(cells).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_absent() {
        let flags = ChunkFlags::new();
        assert!(!flags.test(0, 0));
        assert!(!flags.test(-1_000_000, 42));
        assert!(flags.is_empty());
    }

    #[test]
    fn test_set_clear_test() {
        let mut flags = ChunkFlags::new();
        flags.set(3, -7);
        assert!(flags.test(3, -7));
        assert!(!flags.test(-7, 3));
        assert_eq!(flags.len(), 1);

        // Setting twice does not double count
        flags.set(3, -7);
        assert_eq!(flags.len(), 1);

        flags.clear(3, -7);
        assert!(!flags.test(3, -7));
        assert!(flags.is_empty());

        // Clearing an absent cell is a no-op
        flags.clear(3, -7);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_tile_boundaries() {
        let mut flags = ChunkFlags::new();
        let cells = [(-1, -1), (0, 0), (63, 63), (64, 64), (-64, 0), (-65, 0), (i32::MIN, i32::MAX)];
        for &(x, z) in &cells {
            flags.set(x, z);
        }
        for &(x, z) in &cells {
            assert!(flags.test(x, z), "({}, {}) should be set", x, z);
        }
        assert!(!flags.test(-63, 0));
        assert!(!flags.test(65, 64));
        assert_eq!(flags.len(), cells.len());
    }

    #[test]
    fn test_empty_tiles_are_released() {
        let mut flags = ChunkFlags::new();
        flags.set(500, 500);
        flags.set(501, 500);
        assert_eq!(flags.tiles.len(), 1);
        flags.clear(500, 500);
        assert_eq!(flags.tiles.len(), 1);
        flags.clear(501, 500);
        assert!(flags.tiles.is_empty());
    }

    #[test]
    fn test_iter_matches_inserted() {
        let cells = vec![
            ChunkPos::new(0, 0),
            ChunkPos::new(-5, 2),
            ChunkPos::new(100, -100),
            ChunkPos::new(63, 0),
        ];
        let flags: ChunkFlags = cells.iter().copied().collect();
        let mut seen: Vec<ChunkPos> = flags.iter().collect();
        seen.sort();
        let mut expected = cells.clone();
        expected.sort();
        assert_eq!(seen, expected);
    }
}
