//! Marker synchronization
//!
//! Each outline becomes one area marker keyed `"<owner id>.<sequence>"`.
//! Re-running for the same owner updates the geometry of existing markers in
//! place (keeping whatever styling the sink holds) and only creates the ones
//! that are missing, so a key never maps to more than one marker.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::polygon::Polygon;
use crate::source::OwnerTerritory;
use crate::style::{AreaStyle, StyleTarget};

/// A polygon marker held by a [`MarkerSink`].
pub trait AreaMarker {
    /// Replace the outline, leaving everything else untouched.
    fn set_corner_locations(&mut self, polygon: &Polygon);
}

/// Everything a sink needs to create an area marker.
#[derive(Clone, Copy, Debug)]
pub struct NewAreaMarker<'a> {
    pub id: &'a str,
    pub label: &'a str,
    pub world: &'a str,
    pub polygon: &'a Polygon,
    pub filled: bool,
}

/// Where area markers live (a map layer, a marker set).
///
/// Not assumed to be thread-safe; callers serialize access.
pub trait MarkerSink {
    type Marker: AreaMarker;

    fn find_area_marker(&mut self, id: &str) -> Option<&mut Self::Marker>;

    /// Create a marker, or `None` if the sink refuses.
    fn create_area_marker(&mut self, request: NewAreaMarker<'_>) -> Option<&mut Self::Marker>;

    /// Ids of every area marker currently held.
    fn area_marker_ids(&self) -> Vec<String>;

    /// Delete a marker, returning whether it existed.
    fn delete_area_marker(&mut self, id: &str) -> bool;
}

/// Marker key for an owner's `index`-th outline.
pub fn marker_key(owner_id: &str, index: usize) -> String {
    format!("{}.{}", owner_id, index)
}

/// Sequence number of `key` if it belongs to `owner_id`.
fn key_index(owner_id: &str, key: &str) -> Option<usize> {
    key.strip_prefix(owner_id)?.strip_prefix('.')?.parse().ok()
}

/// Create or update the marker for one outline, then hand it to `style`.
///
/// `style` runs exactly once, synchronously, whether the marker was created
/// or updated.
pub fn sync_marker<S, F>(
    sink: &mut S,
    owner: &OwnerTerritory,
    index: usize,
    polygon: Polygon,
    style: &mut F,
) -> Result<()>
where
    S: MarkerSink,
    F: FnMut(&OwnerTerritory, &mut S::Marker),
{
    let key = marker_key(&owner.id, index);

    match sink.find_area_marker(&key) {
        Some(marker) => {
            marker.set_corner_locations(&polygon);
            style(owner, marker);
        }
        None => {
            let request = NewAreaMarker {
                id: &key,
                label: &owner.name,
                world: &owner.world,
                polygon: &polygon,
                filled: false,
            };
            let marker = sink
                .create_area_marker(request)
                .ok_or_else(|| Error::MarkerRejected { key: key.clone() })?;
            style(owner, marker);
        }
    }

    Ok(())
}

/// Delete every marker belonging to `owner_id`. Returns how many were removed.
pub fn remove_owner_markers<S: MarkerSink>(sink: &mut S, owner_id: &str) -> usize {
    let ids: Vec<String> = sink
        .area_marker_ids()
        .into_iter()
        .filter(|id| key_index(owner_id, id).is_some())
        .collect();

    ids.iter().filter(|id| sink.delete_area_marker(id)).count()
}

/// Delete markers of `owner_id` numbered `keep` or above.
pub fn prune_stale_markers<S: MarkerSink>(sink: &mut S, owner_id: &str, keep: usize) -> usize {
    let stale: Vec<String> = sink
        .area_marker_ids()
        .into_iter()
        .filter(|id| key_index(owner_id, id).map_or(false, |index| index >= keep))
        .collect();

    stale.iter().filter(|id| sink.delete_area_marker(id)).count()
}

// =============================================================================
// IN-MEMORY SINK
// =============================================================================

/// An area marker stored by [`MemoryMarkerSet`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MemoryAreaMarker {
    pub id: String,
    pub label: String,
    pub world: String,
    pub xs: Vec<f64>,
    pub zs: Vec<f64>,
    pub filled: bool,
    pub style: AreaStyle,
}

impl AreaMarker for MemoryAreaMarker {
    fn set_corner_locations(&mut self, polygon: &Polygon) {
        self.xs = polygon.xs();
        self.zs = polygon.zs();
    }
}

impl StyleTarget for MemoryAreaMarker {
    fn set_label(&mut self, label: String) {
        self.label = label;
    }

    fn set_area_style(&mut self, style: AreaStyle) {
        self.style = style;
    }
}

/// Marker set kept in memory, ordered by key.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MemoryMarkerSet {
    markers: BTreeMap<String, MemoryAreaMarker>,
    #[serde(skip)]
    limit: Option<usize>,
}

impl MemoryMarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set that refuses to create markers once it holds `limit` of them.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            markers: BTreeMap::new(),
            limit: Some(limit),
        }
    }

    pub fn get(&self, id: &str) -> Option<&MemoryAreaMarker> {
        self.markers.get(id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn markers(&self) -> impl Iterator<Item = &MemoryAreaMarker> {
        self.markers.values()
    }
}

impl MarkerSink for MemoryMarkerSet {
    type Marker = MemoryAreaMarker;

    fn find_area_marker(&mut self, id: &str) -> Option<&mut MemoryAreaMarker> {
        self.markers.get_mut(id)
    }

    fn create_area_marker(&mut self, request: NewAreaMarker<'_>) -> Option<&mut MemoryAreaMarker> {
        if self.markers.contains_key(request.id) {
            return None;
        }
        if self.limit.map_or(false, |limit| self.markers.len() >= limit) {
            return None;
        }

        let marker = MemoryAreaMarker {
            id: request.id.to_string(),
            label: request.label.to_string(),
            world: request.world.to_string(),
            xs: request.polygon.xs(),
            zs: request.polygon.zs(),
            filled: request.filled,
            style: AreaStyle::default(),
        };
        Some(self.markers.entry(request.id.to_string()).or_insert(marker))
    }

    fn area_marker_ids(&self) -> Vec<String> {
        self.markers.keys().cloned().collect()
    }

    fn delete_area_marker(&mut self, id: &str) -> bool {
        self.markers.remove(id).is_some()
    }
}
