//! Territory outline library
//!
//! Turns the chunks claimed by each owner into closed polygon outlines, one
//! per 4-connected region, and keeps a set of area markers in sync with them.

pub mod config;
pub mod coords;
pub mod error;
pub mod flags;
pub mod mapper;
pub mod marker;
pub mod polygon;
pub mod region;
pub mod source;
pub mod style;
pub mod trace;

pub use config::MapperConfig;
pub use coords::ChunkPos;
pub use error::{Error, Result};
pub use mapper::{outline_chunks, OwnerReport, TerritoryMapper};
pub use marker::{MarkerSink, MemoryMarkerSet};
pub use polygon::Polygon;
pub use source::{JsonTerritoryFile, OwnerTerritory, TerritorySource};
