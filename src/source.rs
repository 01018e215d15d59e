//! Territory sources
//!
//! An owner's territory is its display identity plus an ordered chunk list.
//! The order matters: it decides which region is discovered first and
//! therefore which marker sequence number each outline gets.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::coords::ChunkPos;
use crate::error::{Error, Result};

/// The group an owner belongs to (e.g. a nation for a settlement).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OwnerGroup {
    pub name: String,
    /// 0xRRGGBB
    pub color: u32,
}

/// One owner's claimed chunks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OwnerTerritory {
    /// Stable identifier; prefix of every marker key for this owner
    pub id: String,
    /// Display name
    pub name: String,
    /// World / map the markers belong to
    pub world: String,
    /// Claimed chunks, in source order
    #[serde(deserialize_with = "deserialize_chunks")]
    pub chunks: Vec<ChunkPos>,
    #[serde(default)]
    pub group: Option<OwnerGroup>,
}

impl OwnerTerritory {
    pub fn new(id: impl Into<String>, name: impl Into<String>, world: impl Into<String>, chunks: Vec<ChunkPos>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            world: world.into(),
            chunks,
            group: None,
        }
    }

    /// Build from packed chunk keys, as stored by ownership records.
    pub fn from_chunk_keys(
        id: impl Into<String>,
        name: impl Into<String>,
        world: impl Into<String>,
        keys: &[i64],
    ) -> Self {
        let chunks = keys.iter().map(|&key| ChunkPos::from_key(key)).collect();
        Self::new(id, name, world, chunks)
    }
}

/// Accepted spellings of one chunk in source files.
#[derive(Deserialize)]
#[serde(untagged)]
enum ChunkEntry {
    Pair(i32, i32),
    Key(i64),
    Pos(ChunkPos),
}

impl From<ChunkEntry> for ChunkPos {
    fn from(entry: ChunkEntry) -> Self {
        match entry {
            ChunkEntry::Pair(x, z) => ChunkPos::new(x, z),
            ChunkEntry::Key(key) => ChunkPos::from_key(key),
            ChunkEntry::Pos(pos) => pos,
        }
    }
}

fn deserialize_chunks<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<ChunkPos>, D::Error> {
    let entries = Vec::<ChunkEntry>::deserialize(deserializer)?;
    Ok(entries.into_iter().map(ChunkPos::from).collect())
}

/// Supplies the territories to outline.
pub trait TerritorySource {
    fn territories(&self) -> Result<Vec<OwnerTerritory>>;
}

impl TerritorySource for Vec<OwnerTerritory> {
    fn territories(&self) -> Result<Vec<OwnerTerritory>> {
        Ok(self.clone())
    }
}

/// A JSON file holding an array of [`OwnerTerritory`] records.
pub struct JsonTerritoryFile {
    path: PathBuf,
}

impl JsonTerritoryFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TerritorySource for JsonTerritoryFile {
    fn territories(&self) -> Result<Vec<OwnerTerritory>> {
        let text = fs::read_to_string(&self.path).map_err(|source| Error::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }
}
