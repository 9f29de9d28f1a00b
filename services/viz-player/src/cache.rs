//! In-memory LRU cache for rendered frames.
//!
//! Frames are keyed by everything that affects the pixels: the dataset
//! identity, the selection, the timestep and the visualization settings.
//! Loading a new dataset clears the cache.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use metrics::counter;
use renderer::RasterImage;
use viz_common::{DatasetId, VisualizationSettings};

/// Identity of one rendered frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameKey {
    pub dataset: DatasetId,
    pub variable: String,
    pub time_step: usize,
    level_bits: u64,
    pub settings: VisualizationSettings,
}

impl FrameKey {
    pub fn new(
        dataset: DatasetId,
        variable: impl Into<String>,
        time_step: usize,
        level: f64,
        settings: VisualizationSettings,
    ) -> Self {
        Self {
            dataset,
            variable: variable.into(),
            time_step,
            level_bits: level.to_bits(),
            settings,
        }
    }

    pub fn level(&self) -> f64 {
        f64::from_bits(self.level_bits)
    }
}

/// Statistics for the frame cache
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

pub struct FrameCache {
    cache: LruCache<FrameKey, Arc<RasterImage>>,
    stats: FrameCacheStats,
    capacity: usize,
}

impl FrameCache {
    pub fn new(capacity: usize) -> Self {
        let cache_size = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(cache_size),
            stats: FrameCacheStats::default(),
            capacity,
        }
    }

    pub fn get(&mut self, key: &FrameKey) -> Option<Arc<RasterImage>> {
        match self.cache.get(key) {
            Some(frame) => {
                self.stats.hits += 1;
                counter!("frame_cache_hits_total").increment(1);
                Some(frame.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: FrameKey, frame: Arc<RasterImage>) {
        self.cache.put(key, frame);
        self.stats.entries = self.cache.len();
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.stats = FrameCacheStats::default();
    }

    pub fn stats(&self) -> FrameCacheStats {
        self.stats
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
