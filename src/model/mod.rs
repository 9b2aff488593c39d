mod logistic;

pub use logistic::{LogisticModel, ScalerParams, DEFAULT_THRESHOLD};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strum::Display;
use thiserror::Error;

use crate::scoring::{ScoringError, FEATURE_COUNT};

/// Coarse two-class output of the fitted classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum ModelLabel {
    /// Poor or Average.
    #[strum(serialize = "lower")]
    Lower,
    /// Good or Excellent.
    #[strum(serialize = "higher")]
    Higher,
}

impl ModelLabel {
    pub fn as_bit(&self) -> u8 {
        match self {
            Self::Lower => 0,
            Self::Higher => 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model not found at {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read model at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed model at {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },
}

/// Inference seam. Implementations take features already in schema order
/// and do no scaling of their own beyond what the artifact carries.
pub trait BinaryClassifier: Send + Sync {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Result<ModelLabel, ScoringError>;

    fn model_type(&self) -> &str;
}

pub fn load_model(path: impl AsRef<Path>) -> Result<LogisticModel, ModelLoadError> {
    LogisticModel::load(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_bits() {
        assert_eq!(ModelLabel::Lower.as_bit(), 0);
        assert_eq!(ModelLabel::Higher.as_bit(), 1);
    }

    #[test]
    fn test_missing_model_error_message() {
        let err = load_model("does/not/exist.json").unwrap_err();
        assert!(matches!(err, ModelLoadError::Missing(_)));
        assert_eq!(err.to_string(), "model not found at does/not/exist.json");
    }
}
