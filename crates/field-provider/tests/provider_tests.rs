//! Tests for the synthetic and queued field providers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use field_provider::{FieldProvider, InMemoryFieldProvider, QueuedFieldProvider, SyntheticFieldProvider};
use test_utils::small_dataset;
use viz_common::{Field, VizError, VizResult};

// ============================================================================
// Helpers
// ============================================================================

/// Counts decodes and always returns the same small field.
struct CountingProvider {
    calls: AtomicUsize,
}

impl CountingProvider {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FieldProvider for CountingProvider {
    fn get_field(&self, variable: &str, time_step: usize, level: f64) -> VizResult<Arc<Field>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if variable != "2t" {
            return Err(VizError::field_not_found(variable, time_step, level));
        }
        Ok(Arc::new(Field::filled(4, 2, time_step as f32)?))
    }
}

async fn wait_until_ready(provider: &QueuedFieldProvider, variable: &str, step: usize) {
    for _ in 0..200 {
        if provider.is_ready(variable, step, 1000.0) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("field {}/{} never became ready", variable, step);
}

// ============================================================================
// Synthetic provider
// ============================================================================

#[test]
fn test_synthetic_matches_grid_dimensions() {
    let dataset = Arc::new(small_dataset(6));
    let provider = SyntheticFieldProvider::new(dataset.clone());
    let field = provider.get_field("2t", 0, 1000.0).unwrap();
    assert_eq!(field.nx(), dataset.grid().nx);
    assert_eq!(field.ny(), dataset.grid().ny);
}

#[test]
fn test_synthetic_values_within_declared_range() {
    let dataset = Arc::new(small_dataset(6));
    let provider = SyntheticFieldProvider::new(dataset.clone());
    for variable in dataset.variables() {
        for step in 0..6 {
            let field = provider.get_field(&variable.name, step, 1000.0).unwrap();
            let (lo, hi) = field.min_max().unwrap();
            let range = variable.value_range;
            assert!(lo as f64 >= range.min - 1e-3, "{} below range", variable.name);
            assert!(hi as f64 <= range.max + 1e-3, "{} above range", variable.name);
        }
    }
}

#[test]
fn test_synthetic_is_deterministic_and_time_varying() {
    let provider = SyntheticFieldProvider::new(Arc::new(small_dataset(6)));
    for variable in ["2t", "tp", "10u"] {
        let a = provider.get_field(variable, 2, 1000.0).unwrap();
        let b = provider.get_field(variable, 2, 1000.0).unwrap();
        assert_eq!(a.values(), b.values());

        let c = provider.get_field(variable, 3, 1000.0).unwrap();
        assert_ne!(a.values(), c.values(), "{} does not change over time", variable);
    }
}

#[test]
fn test_synthetic_rejects_invalid_combinations() {
    let provider = SyntheticFieldProvider::new(Arc::new(small_dataset(6)));
    for (variable, step, level) in [("2t", 6, 1000.0), ("2t", 0, 850.0), ("msl", 0, 1000.0)] {
        assert!(matches!(
            provider.get_field(variable, step, level),
            Err(VizError::FieldNotFound { .. })
        ));
    }
}

// ============================================================================
// In-memory provider behind a shared handle
// ============================================================================

#[test]
fn test_arc_provider_delegates() {
    let provider: Arc<dyn FieldProvider> = Arc::new(
        InMemoryFieldProvider::new().with_field("tp", 1, 1000.0, Field::filled(1, 1, 0.01).unwrap()),
    );
    let field = provider.get_field("tp", 1, 1000.0).unwrap();
    assert_eq!(field.values(), &[0.01]);
}

// ============================================================================
// Queued provider
// ============================================================================

#[tokio::test]
async fn test_queued_miss_is_pending_then_ready() {
    let inner = CountingProvider::new();
    let provider = QueuedFieldProvider::spawn(inner.clone(), 8, 4);

    let first = provider.get_field("2t", 3, 1000.0);
    assert!(matches!(first, Err(VizError::FieldPending { .. })));
    assert!(first.unwrap_err().is_frame_recoverable());

    wait_until_ready(&provider, "2t", 3).await;
    let field = provider.get_field("2t", 3, 1000.0).unwrap();
    assert_eq!(field.values()[0], 3.0);
    assert_eq!(inner.calls(), 1);

    let stats = provider.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.decoded, 1);
}

#[tokio::test]
async fn test_queued_deduplicates_in_flight_requests() {
    let inner = CountingProvider::new();
    let provider = QueuedFieldProvider::spawn(inner.clone(), 8, 4);

    for _ in 0..5 {
        let _ = provider.get_field("2t", 0, 1000.0);
    }
    wait_until_ready(&provider, "2t", 0).await;
    assert_eq!(inner.calls(), 1);
}

#[tokio::test]
async fn test_queued_caches_not_found() {
    let inner = CountingProvider::new();
    let provider = QueuedFieldProvider::spawn(inner.clone(), 8, 4);

    let _ = provider.get_field("tp", 0, 1000.0);
    wait_until_ready(&provider, "tp", 0).await;
    assert!(matches!(
        provider.get_field("tp", 0, 1000.0),
        Err(VizError::FieldNotFound { .. })
    ));
    assert_eq!(inner.calls(), 1);
}

#[tokio::test]
async fn test_prefetch_warms_upcoming_steps() {
    let inner = CountingProvider::new();
    let provider = QueuedFieldProvider::spawn(inner.clone(), 16, 8);

    assert_eq!(provider.prefetch("2t", 0..4, 1000.0), 4);
    for step in 0..4 {
        wait_until_ready(&provider, "2t", step).await;
    }
    assert!(provider.get_field("2t", 2, 1000.0).is_ok());
    // Already cached, nothing new to queue
    assert_eq!(provider.prefetch("2t", 0..4, 1000.0), 0);
}

#[tokio::test]
async fn test_fetch_waits_for_decode() {
    let inner = CountingProvider::new();
    let provider = QueuedFieldProvider::spawn(inner.clone(), 8, 4);

    let field = provider.fetch("2t", 5, 1000.0).await.unwrap();
    assert_eq!(field.values()[0], 5.0);
    assert!(provider.get_field("2t", 5, 1000.0).is_ok());
}

#[tokio::test]
async fn test_lru_evicts_oldest() {
    let inner = CountingProvider::new();
    let provider = QueuedFieldProvider::spawn(inner.clone(), 2, 4);

    for step in 0..3 {
        provider.fetch("2t", step, 1000.0).await.unwrap();
    }
    assert!(!provider.is_ready("2t", 0, 1000.0));
    assert!(provider.is_ready("2t", 2, 1000.0));
    assert_eq!(provider.stats().entries, 2);
}

#[tokio::test]
async fn test_clear_empties_cache() {
    let provider = QueuedFieldProvider::spawn(CountingProvider::new(), 8, 4);
    provider.fetch("2t", 0, 1000.0).await.unwrap();
    provider.clear();
    assert!(!provider.is_ready("2t", 0, 1000.0));
}
