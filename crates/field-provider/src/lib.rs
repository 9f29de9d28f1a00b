//! Field providers.
//!
//! A provider turns `(variable, time_step, level)` into a 2D scalar field.
//! Decoding real files happens outside this workspace; the providers here
//! are an in-memory store, a deterministic synthetic generator and a
//! queued front-end that moves slow decodes off the render path.

mod key;
mod memory;
mod queued;
mod synthetic;

use std::sync::Arc;

use viz_common::{Field, VizResult};

pub use key::FieldKey;
pub use memory::InMemoryFieldProvider;
pub use queued::{QueueStats, QueuedFieldProvider};
pub use synthetic::SyntheticFieldProvider;

/// Source of decoded fields.
///
/// Implementations fail with `VizError::FieldNotFound` for combinations the
/// dataset does not contain.
pub trait FieldProvider: Send + Sync {
    fn get_field(&self, variable: &str, time_step: usize, level: f64) -> VizResult<Arc<Field>>;
}

impl<P: FieldProvider + ?Sized> FieldProvider for Arc<P> {
    fn get_field(&self, variable: &str, time_step: usize, level: f64) -> VizResult<Arc<Field>> {
        (**self).get_field(variable, time_step, level)
    }
}
