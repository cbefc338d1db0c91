//! Pluggable distance lookup: trait abstraction for leg distance/time queries.
//!
//! The matching and chaining engines never compute routes themselves; they ask
//! a [`DistanceProvider`] for the distance and travel time of a leg between
//! two cells. Two implementations, selectable via [`DistanceProviderKind`]:
//!
//! - **`GridDistanceProvider`**: great-circle miles plus a flat average-speed
//!   travel-time estimate. Zero dependencies; explicitly a placeholder for a
//!   real routing/ETA service.
//! - **`PrecomputedDistanceProvider`** (feature `precomputed`): loads a
//!   serialized leg table from disk.

use h3o::CellIndex;
use serde::{Deserialize, Serialize};

use crate::spatial::distance_miles_between_cells;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// Average road speed used for placeholder travel-time estimates (mph).
pub const AVG_SPEED_MPH: f64 = 45.0;

/// Result of a leg query between two cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance_miles: f64,
    pub duration_secs: f64,
}

impl RouteLeg {
    /// Build a leg from a known distance using the flat speed estimate.
    pub fn from_distance(distance_miles: f64) -> Self {
        let duration_secs = if distance_miles > 0.0 {
            (distance_miles / AVG_SPEED_MPH) * 3600.0
        } else {
            0.0
        };
        Self {
            distance_miles,
            duration_secs,
        }
    }
}

/// Which distance backend to use. Serializes into request/config payloads.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum DistanceProviderKind {
    /// Great-circle miles + flat-speed estimate, zero external dependencies.
    #[default]
    Grid,
    /// Pre-computed leg table loaded from a binary file at startup.
    #[cfg(feature = "precomputed")]
    Precomputed { path: String },
}

/// Trait for distance backends. Implementations must be `Send + Sync` so a
/// provider can be shared across concurrent ranking/chaining calls.
pub trait DistanceProvider: Send + Sync {
    /// Distance and travel time between two cells. Returns `None` if the
    /// backend has no answer for the pair.
    fn leg(&self, from: CellIndex, to: CellIndex) -> Option<RouteLeg>;
}

// ---------------------------------------------------------------------------
// Grid provider (always available)
// ---------------------------------------------------------------------------

/// Great-circle distance with a flat average-speed duration estimate.
///
/// Callers must not treat the duration as an authoritative ETA; this is the
/// stand-in for a real routing provider.
pub struct GridDistanceProvider;

impl DistanceProvider for GridDistanceProvider {
    fn leg(&self, from: CellIndex, to: CellIndex) -> Option<RouteLeg> {
        Some(RouteLeg::from_distance(distance_miles_between_cells(
            from, to,
        )))
    }
}

// ---------------------------------------------------------------------------
// Pre-computed provider (behind `precomputed` feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "precomputed")]
pub mod precomputed {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    /// A serializable key for the leg table.
    /// CellIndex is a u64 internally, so we store the raw values.
    #[derive(Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
    pub struct CellPair(pub u64, pub u64);

    impl CellPair {
        pub fn new(from: CellIndex, to: CellIndex) -> Self {
            Self(from.into(), to.into())
        }
    }

    /// Pre-computed leg table: a HashMap of cell-pair → RouteLeg loaded from disk.
    pub struct PrecomputedDistanceProvider {
        table: HashMap<CellPair, RouteLeg>,
    }

    impl PrecomputedDistanceProvider {
        /// Load from a bincode-serialized file.
        pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
            let data = fs::read(path)?;
            let table: HashMap<CellPair, RouteLeg> = bincode::deserialize(&data)?;
            Ok(Self { table })
        }

        /// Create from an in-memory table (useful for tests).
        pub fn from_table(table: HashMap<CellPair, RouteLeg>) -> Self {
            Self { table }
        }

        /// Serialize the table to a file.
        pub fn save_to_file(
            table: &HashMap<CellPair, RouteLeg>,
            path: &str,
        ) -> Result<(), Box<dyn std::error::Error>> {
            let data = bincode::serialize(table)?;
            fs::write(path, data)?;
            Ok(())
        }
    }

    impl DistanceProvider for PrecomputedDistanceProvider {
        fn leg(&self, from: CellIndex, to: CellIndex) -> Option<RouteLeg> {
            self.table.get(&CellPair::new(from, to)).cloned()
        }
    }
}

// ---------------------------------------------------------------------------
// Caching wrapper
// ---------------------------------------------------------------------------

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// LRU-cached wrapper around any [`DistanceProvider`].
///
/// Cache key is `(from_cell_u64, to_cell_u64)` (directional). On cache miss
/// the inner provider is queried; on inner failure the optional grid fallback
/// is tried before returning `None`.
pub struct CachedDistanceProvider {
    inner: Box<dyn DistanceProvider>,
    cache: Mutex<LruCache<(u64, u64), RouteLeg>>,
    fallback_to_grid: bool,
}

impl CachedDistanceProvider {
    /// Create a caching wrapper with the given capacity.
    ///
    /// If `fallback_to_grid` is true, cache misses that also fail in the inner
    /// provider will be retried with [`GridDistanceProvider`].
    pub fn new(inner: Box<dyn DistanceProvider>, capacity: usize, fallback_to_grid: bool) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity.max(1)).expect("cache capacity must be > 0"),
            )),
            fallback_to_grid,
        }
    }
}

impl DistanceProvider for CachedDistanceProvider {
    fn leg(&self, from: CellIndex, to: CellIndex) -> Option<RouteLeg> {
        let key = (u64::from(from), u64::from(to));

        // Fast path: cache hit
        {
            let mut cache = self.cache.lock().ok()?;
            if let Some(cached) = cache.get(&key) {
                return Some(cached.clone());
            }
        }

        // Slow path: query inner provider
        let result = self.inner.leg(from, to).or_else(|| {
            if self.fallback_to_grid {
                GridDistanceProvider.leg(from, to)
            } else {
                None
            }
        });

        // Store in cache
        if let Some(ref leg) = result {
            if let Ok(mut cache) = self.cache.lock() {
                cache.put(key, leg.clone());
            }
        }

        result
    }
}

// ---------------------------------------------------------------------------
// Factory: build a provider from DistanceProviderKind
// ---------------------------------------------------------------------------

/// Default leg cache capacity for the precomputed provider.
#[cfg(feature = "precomputed")]
const DEFAULT_LEG_CACHE_CAPACITY: usize = 20_000;

/// Construct a boxed [`DistanceProvider`] from a [`DistanceProviderKind`].
///
/// - `Grid` is returned without caching (the underlying distance lookup is
///   already LRU-cached).
/// - `Precomputed` is wrapped in a [`CachedDistanceProvider`] with grid
///   fallback on table misses.
pub fn build_distance_provider(kind: &DistanceProviderKind) -> Box<dyn DistanceProvider> {
    match kind {
        DistanceProviderKind::Grid => Box::new(GridDistanceProvider),

        #[cfg(feature = "precomputed")]
        DistanceProviderKind::Precomputed { path } => {
            match precomputed::PrecomputedDistanceProvider::from_file(path) {
                Ok(provider) => Box::new(CachedDistanceProvider::new(
                    Box::new(provider),
                    DEFAULT_LEG_CACHE_CAPACITY,
                    true,
                )),
                Err(e) => {
                    eprintln!(
                        "WARNING: Failed to load pre-computed leg table from '{}': {}. Falling back to Grid.",
                        path, e
                    );
                    Box::new(GridDistanceProvider)
                }
            }
        }
    }
}
