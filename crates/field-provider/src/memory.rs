use std::collections::HashMap;
use std::sync::Arc;

use viz_common::{Field, VizError, VizResult};

use crate::{FieldKey, FieldProvider};

/// Provider backed by a map of pre-decoded fields.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFieldProvider {
    fields: HashMap<FieldKey, Arc<Field>>,
}

impl InMemoryFieldProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, variable: &str, time_step: usize, level: f64, field: Field) {
        self.fields
            .insert(FieldKey::new(variable, time_step, level), Arc::new(field));
    }

    pub fn with_field(mut self, variable: &str, time_step: usize, level: f64, field: Field) -> Self {
        self.insert(variable, time_step, level, field);
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FieldProvider for InMemoryFieldProvider {
    fn get_field(&self, variable: &str, time_step: usize, level: f64) -> VizResult<Arc<Field>> {
        self.fields
            .get(&FieldKey::new(variable, time_step, level))
            .cloned()
            .ok_or_else(|| VizError::field_not_found(variable, time_step, level))
    }
}
