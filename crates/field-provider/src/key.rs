use std::fmt;

/// Identity of one field within a dataset.
///
/// Levels are stored by bit pattern so the key can be hashed; callers are
/// expected to pass levels taken from the dataset's level list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub variable: String,
    pub time_step: usize,
    level_bits: u64,
}

impl FieldKey {
    pub fn new(variable: impl Into<String>, time_step: usize, level: f64) -> Self {
        Self {
            variable: variable.into(),
            time_step,
            level_bits: level.to_bits(),
        }
    }

    pub fn level(&self) -> f64 {
        f64::from_bits(self.level_bits)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}/{}", self.variable, self.level(), self.time_step)
    }
}
