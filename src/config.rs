//! Configuration for territory outlining.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::style::AreaStyle;

/// Chunk width in world units.
pub const DEFAULT_CELL_SIZE: f64 = 16.0;

/// Configuration parameters for the outline pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// World units per chunk edge (default: 16).
    pub cell_size: f64,

    /// Owners with more chunks than this are rejected before any work
    /// (default: no limit).
    pub max_cells_per_owner: Option<usize>,

    /// Delete markers left over from earlier runs whose sequence number is
    /// past the last outline emitted for the owner.
    pub prune_stale: bool,

    /// Style applied by the default styling callback.
    pub style: AreaStyle,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            max_cells_per_owner: None,
            prune_stale: true,
            style: AreaStyle::default(),
        }
    }
}

impl MapperConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: MapperConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values the pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "cell_size must be a positive number, got {}",
                self.cell_size
            )));
        }
        for (name, opacity) in [
            ("fill_opacity", self.style.fill_opacity),
            ("line_opacity", self.style.line_opacity),
        ] {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be within 0..=1, got {}",
                    name, opacity
                )));
            }
        }
        Ok(())
    }
}
