//! Outline pipeline
//!
//! Per owner: split the chunk list into regions, trace each region, then
//! synchronize one marker per outline. Batch runs may trace owners in parallel;
//! the marker sink is always written from one thread, in input order.

use std::collections::HashSet;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::MapperConfig;
use crate::coords::ChunkPos;
use crate::error::{Error, Result};
use crate::marker::{prune_stale_markers, sync_marker, MarkerSink};
use crate::polygon::Polygon;
use crate::region::RegionExtractor;
use crate::source::OwnerTerritory;
use crate::trace::trace_polygon;

/// What one owner run did to the sink.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OwnerReport {
    pub owner_id: String,
    /// Distinct chunks outlined
    pub chunks: usize,
    /// Outlines synchronized; also the next unused sequence number
    pub outlines: usize,
    /// Markers deleted because the territory now has fewer outlines
    pub pruned: usize,
}

/// Outline every region of a chunk list, in discovery order.
pub fn outline_chunks(chunks: &[ChunkPos], cell_size: f64) -> Vec<Polygon> {
    RegionExtractor::new(chunks.to_vec())
        .map(|region| {
            let polygon = trace_polygon(&region, cell_size);
            debug!(
                "region at {}: {} chunks, {} corners",
                region.seed,
                region.size(),
                polygon.len()
            );
            polygon
        })
        .collect()
}

/// Turns owner territories into area markers.
#[derive(Clone, Debug, Default)]
pub struct TerritoryMapper {
    config: MapperConfig,
}

impl TerritoryMapper {
    pub fn new(config: MapperConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Trace an owner's outlines without touching any sink.
    pub fn outline(&self, owner: &OwnerTerritory) -> Result<Vec<Polygon>> {
        if let Some(limit) = self.config.max_cells_per_owner {
            if owner.chunks.len() > limit {
                return Err(Error::TooManyCells {
                    owner: owner.id.clone(),
                    count: owner.chunks.len(),
                    limit,
                });
            }
        }

        Ok(outline_chunks(&owner.chunks, self.config.cell_size))
    }

    /// Write already traced outlines for `owner` into the sink.
    ///
    /// Outline `i` goes to key `"<owner id>.i"`. A rejected create stops the
    /// owner at that outline; markers already written stay.
    pub fn sync<S, F>(
        &self,
        owner: &OwnerTerritory,
        outlines: Vec<Polygon>,
        sink: &mut S,
        style: &mut F,
    ) -> Result<OwnerReport>
    where
        S: MarkerSink,
        F: FnMut(&OwnerTerritory, &mut S::Marker),
    {
        let count = outlines.len();
        for (index, polygon) in outlines.into_iter().enumerate() {
            sync_marker(sink, owner, index, polygon, style)?;
        }

        let pruned = if self.config.prune_stale {
            prune_stale_markers(sink, &owner.id, count)
        } else {
            0
        };
        if pruned > 0 {
            warn!("{}: removed {} stale markers", owner.id, pruned);
        }

        let chunks = owner.chunks.iter().collect::<HashSet<_>>().len();
        info!("{} ({}): {} chunks, {} outlines", owner.id, owner.name, chunks, count);

        Ok(OwnerReport {
            owner_id: owner.id.clone(),
            chunks,
            outlines: count,
            pruned,
        })
    }

    /// Outline one owner and synchronize its markers.
    pub fn run<S, F>(&self, owner: &OwnerTerritory, sink: &mut S, style: &mut F) -> Result<OwnerReport>
    where
        S: MarkerSink,
        F: FnMut(&OwnerTerritory, &mut S::Marker),
    {
        let outlines = self.outline(owner)?;
        self.sync(owner, outlines, sink, style)
    }

    /// Run every owner. With `parallel`, tracing is spread over the rayon pool
    /// first; synchronization always happens afterwards, in input order.
    ///
    /// Stops at the first owner that fails.
    pub fn outline_all<S, F>(
        &self,
        owners: &[OwnerTerritory],
        sink: &mut S,
        style: &mut F,
        parallel: bool,
    ) -> Result<Vec<OwnerReport>>
    where
        S: MarkerSink,
        F: FnMut(&OwnerTerritory, &mut S::Marker),
    {
        if !parallel {
            return owners.iter().map(|owner| self.run(owner, sink, style)).collect();
        }

        let traced: Vec<Result<Vec<Polygon>>> =
            owners.par_iter().map(|owner| self.outline(owner)).collect();

        owners
            .iter()
            .zip(traced)
            .map(|(owner, outlines)| self.sync(owner, outlines?, sink, style))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::{MemoryAreaMarker, MemoryMarkerSet};
    use crate::style::apply_owner_style;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn owner(id: &str, list: &[(i32, i32)]) -> OwnerTerritory {
        let chunks = list.iter().map(|&p| ChunkPos::from(p)).collect();
        OwnerTerritory::new(id, id.to_uppercase(), "overworld", chunks)
    }

    fn no_style(_: &OwnerTerritory, _: &mut MemoryAreaMarker) {}

    #[test]
    fn test_empty_owner_has_no_outlines() {
        let mapper = TerritoryMapper::default();
        let mut sink = MemoryMarkerSet::new();
        let report = mapper.run(&owner("abc", &[]), &mut sink, &mut no_style).unwrap();
        assert_eq!(report.outlines, 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_disjoint_regions_get_sequential_keys() {
        let mapper = TerritoryMapper::default();
        let mut sink = MemoryMarkerSet::new();
        mapper
            .run(&owner("abc", &[(0, 0), (10, 10)]), &mut sink, &mut no_style)
            .unwrap();

        assert_eq!(sink.area_marker_ids(), vec!["abc.0", "abc.1"]);
        assert_eq!(sink.get("abc.0").unwrap().xs, vec![0.0, 16.0, 16.0, 0.0]);
        assert_eq!(sink.get("abc.1").unwrap().xs, vec![160.0, 176.0, 176.0, 160.0]);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let mapper = TerritoryMapper::default();
        let territory = owner("abc", &[(0, 0), (1, 0), (0, 1), (5, 5)]);
        let mut sink = MemoryMarkerSet::new();

        mapper.run(&territory, &mut sink, &mut no_style).unwrap();
        let first: Vec<MemoryAreaMarker> = sink.markers().cloned().collect();
        mapper.run(&territory, &mut sink, &mut no_style).unwrap();
        let second: Vec<MemoryAreaMarker> = sink.markers().cloned().collect();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_same_order_same_keys() {
        let mapper = TerritoryMapper::default();
        let list = [(7, 7), (0, 0), (8, 7), (3, -2)];

        let mut a = MemoryMarkerSet::new();
        let mut b = MemoryMarkerSet::new();
        mapper.run(&owner("abc", &list), &mut a, &mut no_style).unwrap();
        mapper.run(&owner("abc", &list), &mut b, &mut no_style).unwrap();

        // First chunk in the list seeds the first region
        assert_eq!(a.get("abc.0").unwrap().xs, vec![112.0, 144.0, 144.0, 112.0]);
        assert_eq!(a.get("abc.2").unwrap().zs, vec![-32.0, -32.0, -16.0, -16.0]);
        assert_eq!(
            a.markers().collect::<Vec<_>>(),
            b.markers().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_order_within_region_does_not_change_keys() {
        let mapper = TerritoryMapper::default();
        let original = [(0, 0), (1, 0), (5, 5), (0, 1), (6, 5), (1, 1)];
        let reordered = [(1, 1), (0, 1), (6, 5), (0, 0), (5, 5), (1, 0)];

        let mut a = MemoryMarkerSet::new();
        let mut b = MemoryMarkerSet::new();
        mapper.run(&owner("abc", &original), &mut a, &mut no_style).unwrap();
        mapper.run(&owner("abc", &reordered), &mut b, &mut no_style).unwrap();

        assert_eq!(a.area_marker_ids(), vec!["abc.0", "abc.1"]);
        assert_eq!(a.get("abc.0").unwrap().xs, vec![0.0, 32.0, 32.0, 0.0]);
        assert_eq!(
            a.markers().collect::<Vec<_>>(),
            b.markers().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_random_reorder_within_regions_keeps_outlines() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x0DE5);

        for _ in 0..200 {
            let count = rng.gen_range(1..40);
            let chunks: Vec<ChunkPos> = (0..count)
                .map(|_| ChunkPos::new(rng.gen_range(-6..6), rng.gen_range(-6..6)))
                .collect();

            // Regions in discovery order, each with its chunks shuffled
            let mut reordered = Vec::new();
            for region in RegionExtractor::new(chunks.clone()) {
                let mut members = region.chunks;
                members.shuffle(&mut rng);
                reordered.extend(members);
            }

            assert_eq!(outline_chunks(&chunks, 16.0), outline_chunks(&reordered, 16.0));
        }
    }

    #[test]
    fn test_shrinking_territory_prunes_markers() {
        let mapper = TerritoryMapper::default();
        let mut sink = MemoryMarkerSet::new();
        mapper
            .run(&owner("abc", &[(0, 0), (4, 0), (8, 0)]), &mut sink, &mut no_style)
            .unwrap();
        assert_eq!(sink.len(), 3);

        let report = mapper.run(&owner("abc", &[(0, 0)]), &mut sink, &mut no_style).unwrap();
        assert_eq!(report.pruned, 2);
        assert_eq!(sink.area_marker_ids(), vec!["abc.0"]);
    }

    #[test]
    fn test_keep_stale_markers_when_pruning_is_off() {
        let config = MapperConfig {
            prune_stale: false,
            ..MapperConfig::default()
        };
        let mapper = TerritoryMapper::new(config).unwrap();
        let mut sink = MemoryMarkerSet::new();
        mapper
            .run(&owner("abc", &[(0, 0), (4, 0)]), &mut sink, &mut no_style)
            .unwrap();
        mapper.run(&owner("abc", &[(0, 0)]), &mut sink, &mut no_style).unwrap();
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_cell_cap() {
        let config = MapperConfig {
            max_cells_per_owner: Some(2),
            ..MapperConfig::default()
        };
        let mapper = TerritoryMapper::new(config).unwrap();
        let mut sink = MemoryMarkerSet::new();

        let err = mapper
            .run(&owner("abc", &[(0, 0), (1, 0), (2, 0)]), &mut sink, &mut no_style)
            .unwrap_err();
        assert!(matches!(err, Error::TooManyCells { count: 3, limit: 2, .. }));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MapperConfig {
            cell_size: 0.0,
            ..MapperConfig::default()
        };
        assert!(TerritoryMapper::new(config).is_err());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mapper = TerritoryMapper::default();
        let owners: Vec<OwnerTerritory> = (0..16)
            .map(|i| {
                let list: Vec<(i32, i32)> = (0..i).map(|k| (k * 3 % 7, k / 2)).collect();
                owner(&format!("o{}", i), &list)
            })
            .collect();
        let defaults = mapper.config().style;
        let mut style = |owner: &OwnerTerritory, marker: &mut MemoryAreaMarker| {
            apply_owner_style(&defaults, owner, marker)
        };

        let mut sequential = MemoryMarkerSet::new();
        let mut parallel = MemoryMarkerSet::new();
        let a = mapper.outline_all(&owners, &mut sequential, &mut style, false).unwrap();
        let b = mapper.outline_all(&owners, &mut parallel, &mut style, true).unwrap();

        assert_eq!(a, b);
        assert_eq!(
            sequential.markers().collect::<Vec<_>>(),
            parallel.markers().collect::<Vec<_>>()
        );
        assert_eq!(sequential.get("o1.0").unwrap().label, "O1");
    }

    #[test]
    fn test_rejection_propagates_from_batch() {
        let mapper = TerritoryMapper::default();
        let owners = vec![owner("a", &[(0, 0)]), owner("b", &[(0, 0), (5, 5)])];
        let mut sink = MemoryMarkerSet::with_limit(2);

        let err = mapper.outline_all(&owners, &mut sink, &mut no_style, true).unwrap_err();
        assert!(matches!(err, Error::MarkerRejected { ref key } if key == "b.1"));
        assert_eq!(sink.area_marker_ids(), vec!["a.0", "b.0"]);
    }
}
