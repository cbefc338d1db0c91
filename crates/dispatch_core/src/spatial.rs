//! Spatial operations: H3-based geography and distance calculations in miles.
//!
//! Facilities, service areas and unit positions are H3 cells (default
//! resolution 9, ~240m). Distances are great-circle miles with a global LRU
//! cache, since the scorer and the chaining analyzer repeatedly query the
//! same facility pairs.

use std::num::NonZeroUsize;
use std::sync::{Mutex, OnceLock};

use h3o::{CellIndex, Resolution};
use lru::LruCache;

/// Mean Earth radius in miles.
const EARTH_RADIUS_MILES: f64 = 3958.8;

#[derive(Debug, Clone, Copy)]
pub struct GeoIndex {
    resolution: Resolution,
}

impl GeoIndex {
    pub fn new(resolution: Resolution) -> Self {
        Self { resolution }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn grid_disk(&self, origin: CellIndex, k: u32) -> Vec<CellIndex> {
        debug_assert_eq!(
            origin.resolution(),
            self.resolution,
            "origin resolution must match GeoIndex resolution"
        );
        origin.grid_disk::<Vec<_>>(k)
    }
}

impl Default for GeoIndex {
    fn default() -> Self {
        Self {
            resolution: Resolution::Nine,
        }
    }
}

/// Uncached haversine distance (internal use).
fn distance_miles_uncached(a: CellIndex, b: CellIndex) -> f64 {
    let a: h3o::LatLng = a.into();
    let b: h3o::LatLng = b.into();
    let (lat1, lon1) = (a.lat().to_radians(), a.lng().to_radians());
    let (lat2, lon2) = (b.lat().to_radians(), b.lng().to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_MILES * c
}

/// Global distance cache (50,000 entries).
fn get_distance_cache() -> &'static Mutex<LruCache<(CellIndex, CellIndex), f64>> {
    static CACHE: OnceLock<Mutex<LruCache<(CellIndex, CellIndex), f64>>> = OnceLock::new();
    CACHE.get_or_init(|| {
        Mutex::new(LruCache::new(
            NonZeroUsize::new(50_000).expect("cache size must be non-zero"),
        ))
    })
}

/// Distance between two H3 cells in miles, with LRU caching.
///
/// Uses a symmetric key (smaller cell first) to maximize cache hits; falls
/// back to an uncached computation if the mutex is poisoned.
pub fn distance_miles_between_cells(a: CellIndex, b: CellIndex) -> f64 {
    let key = if a < b { (a, b) } else { (b, a) };

    let mut cache = match get_distance_cache().lock() {
        Ok(guard) => guard,
        Err(_) => return distance_miles_uncached(key.0, key.1),
    };

    *cache.get_or_insert(key, || distance_miles_uncached(key.0, key.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_disk_returns_neighbors_within_k() {
        let geo = GeoIndex::default();
        let origin = CellIndex::try_from(0x8a1fb46622dffff).expect("valid cell");
        let cells = geo.grid_disk(origin, 1);

        assert!(cells.contains(&origin));
        assert!(!cells.is_empty());
        for cell in cells {
            let distance = origin.grid_distance(cell).expect("grid distance");
            assert!(distance <= 1);
        }
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_same_cell() {
        let a = CellIndex::try_from(0x8a1fb46622dffff).expect("cell");
        let b = a
            .grid_disk::<Vec<_>>(3)
            .into_iter()
            .find(|c| *c != a)
            .expect("distant cell");

        assert_eq!(distance_miles_between_cells(a, a), 0.0);
        let ab = distance_miles_between_cells(a, b);
        let ba = distance_miles_between_cells(b, a);
        assert!(ab > 0.0);
        assert_eq!(ab, ba);
    }
}
