//! Error types for the visualization engine.

use thiserror::Error;

/// Result type alias using VizError.
pub type VizResult<T> = Result<T, VizError>;

/// Primary error type for dataset, rendering and playback operations.
#[derive(Debug, Clone, Error)]
pub enum VizError {
    // === Dataset Errors ===
    #[error("Invalid value range for '{variable}': min {min} > max {max}")]
    InvalidRange { variable: String, min: f64, max: f64 },

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    // === Field Errors ===
    #[error("Field not found: variable={variable} time_step={time_step} level={level}")]
    FieldNotFound {
        variable: String,
        time_step: usize,
        level: f64,
    },

    #[error("Field decode pending: variable={variable} time_step={time_step} level={level}")]
    FieldPending {
        variable: String,
        time_step: usize,
        level: f64,
    },

    // === Settings Errors ===
    #[error("Unknown colormap: {0}")]
    UnknownColormap(String),

    #[error("Invalid value for setting '{setting}': {message}")]
    InvalidSetting { setting: String, message: String },

    // === Infrastructure Errors ===
    #[error("Export failed: {0}")]
    ExportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl VizError {
    pub fn field_not_found(variable: &str, time_step: usize, level: f64) -> Self {
        VizError::FieldNotFound {
            variable: variable.to_string(),
            time_step,
            level,
        }
    }

    /// Whether this error only affects a single frame.
    ///
    /// Frame-recoverable errors are rendered as a placeholder frame and never
    /// stop playback.
    pub fn is_frame_recoverable(&self) -> bool {
        matches!(
            self,
            VizError::FieldNotFound { .. } | VizError::FieldPending { .. }
        )
    }
}

impl From<std::io::Error> for VizError {
    fn from(err: std::io::Error) -> Self {
        VizError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VizError {
    fn from(err: serde_json::Error) -> Self {
        VizError::InvalidDataset(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_recoverable_classification() {
        assert!(VizError::field_not_found("2t", 3, 1000.0).is_frame_recoverable());
        assert!(VizError::FieldPending {
            variable: "tp".into(),
            time_step: 0,
            level: 1000.0
        }
        .is_frame_recoverable());
        assert!(!VizError::InvalidRange {
            variable: "2t".into(),
            min: 2.0,
            max: 1.0
        }
        .is_frame_recoverable());
        assert!(!VizError::UnknownVariable("x".into()).is_frame_recoverable());
    }

    #[test]
    fn test_error_messages() {
        let err = VizError::field_not_found("10u", 5, 850.0);
        assert_eq!(
            err.to_string(),
            "Field not found: variable=10u time_step=5 level=850"
        );
    }
}
