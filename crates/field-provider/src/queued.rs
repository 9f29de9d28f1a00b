//! Queued decode front-end.
//!
//! Wraps a slow provider so the render and tick paths never block on a
//! decode. A cache miss enqueues the key on a bounded channel and returns
//! `VizError::FieldPending`; a background worker decodes on the blocking
//! pool and stores the result in a shared LRU.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use viz_common::{Field, VizError, VizResult};

use crate::{FieldKey, FieldProvider};

/// Statistics for the decode queue and its cache.
#[derive(Debug, Default, Clone)]
pub struct QueueStats {
    pub hits: u64,
    pub misses: u64,
    pub enqueued: u64,
    /// Requests dropped because the queue was full
    pub dropped: u64,
    pub decoded: u64,
    pub entries: usize,
}

impl QueueStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Decode outcomes worth remembering. Transient failures are not cached.
type CachedResult = VizResult<Arc<Field>>;

struct Shared {
    cache: Mutex<LruCache<FieldKey, CachedResult>>,
    in_flight: Mutex<HashSet<FieldKey>>,
    stats: Mutex<QueueStats>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn store(&self, key: FieldKey, result: CachedResult) {
        let cacheable = match &result {
            Ok(_) => true,
            Err(err) => matches!(err, VizError::FieldNotFound { .. }),
        };
        if cacheable {
            let mut cache = lock(&self.cache);
            cache.put(key.clone(), result);
            lock(&self.stats).entries = cache.len();
        }
        lock(&self.in_flight).remove(&key);
    }
}

/// Non-blocking provider backed by a decode queue and an LRU of results.
///
/// Must be created inside a tokio runtime. Dropping it stops the worker.
pub struct QueuedFieldProvider {
    inner: Arc<dyn FieldProvider>,
    shared: Arc<Shared>,
    sender: mpsc::Sender<FieldKey>,
    worker: JoinHandle<()>,
    capacity: usize,
}

impl QueuedFieldProvider {
    /// Spawn the decode worker.
    ///
    /// # Arguments
    /// * `inner` - Provider doing the actual (slow) decode
    /// * `capacity` - Maximum number of decoded fields kept in memory
    /// * `queue_depth` - Maximum number of pending decode requests
    pub fn spawn(inner: Arc<dyn FieldProvider>, capacity: usize, queue_depth: usize) -> Self {
        let cache_size = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        let shared = Arc::new(Shared {
            cache: Mutex::new(LruCache::new(cache_size)),
            in_flight: Mutex::new(HashSet::new()),
            stats: Mutex::new(QueueStats::default()),
        });

        let (sender, receiver) = mpsc::channel(queue_depth.max(1));
        let worker = tokio::spawn(run_worker(inner.clone(), shared.clone(), receiver));

        Self {
            inner,
            shared,
            sender,
            worker,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Queue decodes for the given timesteps without waiting for them.
    ///
    /// Returns the number of requests actually enqueued.
    pub fn prefetch(&self, variable: &str, steps: impl IntoIterator<Item = usize>, level: f64) -> usize {
        steps
            .into_iter()
            .map(|step| FieldKey::new(variable, step, level))
            .filter(|key| !lock(&self.shared.cache).contains(key))
            .filter(|key| self.enqueue(key.clone()))
            .count()
    }

    /// Fetch a field, waiting for the decode if it is not cached.
    pub async fn fetch(&self, variable: &str, time_step: usize, level: f64) -> VizResult<Arc<Field>> {
        let key = FieldKey::new(variable, time_step, level);
        if let Some(hit) = lock(&self.shared.cache).get(&key).cloned() {
            lock(&self.shared.stats).hits += 1;
            return hit;
        }
        lock(&self.shared.stats).misses += 1;

        let result = decode(self.inner.clone(), key.clone()).await;
        self.shared.store(key, result.clone());
        result
    }

    /// Whether a result (field or definitive miss) is cached for the key.
    pub fn is_ready(&self, variable: &str, time_step: usize, level: f64) -> bool {
        lock(&self.shared.cache).contains(&FieldKey::new(variable, time_step, level))
    }

    pub fn stats(&self) -> QueueStats {
        let entries = lock(&self.shared.cache).len();
        let mut stats = lock(&self.shared.stats);
        stats.entries = entries;
        stats.clone()
    }

    /// Drop every cached field. In-flight decodes still land afterwards.
    pub fn clear(&self) {
        lock(&self.shared.cache).clear();
        lock(&self.shared.stats).entries = 0;
    }

    /// Returns true when the key was newly enqueued.
    fn enqueue(&self, key: FieldKey) -> bool {
        if !lock(&self.shared.in_flight).insert(key.clone()) {
            return false;
        }

        match self.sender.try_send(key) {
            Ok(()) => {
                lock(&self.shared.stats).enqueued += 1;
                true
            }
            Err(TrySendError::Full(key)) => {
                debug!(%key, "Decode queue full, dropping request");
                lock(&self.shared.in_flight).remove(&key);
                lock(&self.shared.stats).dropped += 1;
                false
            }
            Err(TrySendError::Closed(key)) => {
                warn!(%key, "Decode worker stopped, request not queued");
                lock(&self.shared.in_flight).remove(&key);
                false
            }
        }
    }
}

impl FieldProvider for QueuedFieldProvider {
    fn get_field(&self, variable: &str, time_step: usize, level: f64) -> VizResult<Arc<Field>> {
        let key = FieldKey::new(variable, time_step, level);
        if let Some(hit) = lock(&self.shared.cache).get(&key).cloned() {
            lock(&self.shared.stats).hits += 1;
            return hit;
        }
        lock(&self.shared.stats).misses += 1;

        self.enqueue(key);
        Err(VizError::FieldPending {
            variable: variable.to_string(),
            time_step,
            level,
        })
    }
}

impl Drop for QueuedFieldProvider {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn decode(inner: Arc<dyn FieldProvider>, key: FieldKey) -> CachedResult {
    let task_key = key.clone();
    tokio::task::spawn_blocking(move || {
        inner.get_field(&task_key.variable, task_key.time_step, task_key.level())
    })
    .await
    .unwrap_or_else(|e| Err(VizError::Io(format!("decode task for {} failed: {}", key, e))))
}

async fn run_worker(
    inner: Arc<dyn FieldProvider>,
    shared: Arc<Shared>,
    mut receiver: mpsc::Receiver<FieldKey>,
) {
    while let Some(key) = receiver.recv().await {
        let result = decode(inner.clone(), key.clone()).await;
        match &result {
            Ok(_) => {
                lock(&shared.stats).decoded += 1;
                debug!(%key, "Decoded field");
            }
            Err(err) => debug!(%key, error = %err, "Decode failed"),
        }
        shared.store(key, result);
    }
    debug!("Decode worker exiting");
}
