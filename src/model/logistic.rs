use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use super::{BinaryClassifier, ModelLabel, ModelLoadError};
use crate::scoring::{FeatureName, ScoringError, FEATURE_COUNT};

pub const DEFAULT_THRESHOLD: f64 = 0.5;

const LOGISTIC_REGRESSION: &str = "logistic_regression";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct ArtifactFile {
    #[serde(default = "default_model_type")]
    model_type: String,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    #[serde(default)]
    scaler: Option<ScalerParams>,
    coefficients: Vec<f64>,
    intercept: f64,
    #[serde(default = "default_threshold")]
    threshold: f64,
}

fn default_model_type() -> String {
    LOGISTIC_REGRESSION.to_string()
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Fitted logistic regression with its standard scaler folded in.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    path: PathBuf,
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
    coefficients: [f64; FEATURE_COUNT],
    intercept: f64,
    threshold: f64,
}

impl LogisticModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelLoadError::Missing(path.to_path_buf()));
        }

        let start = Instant::now();
        let content = fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_ron = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ron"));
        let artifact: ArtifactFile = if is_ron {
            ron::from_str(&content).map_err(|e| malformed(path, e.to_string()))?
        } else {
            serde_json::from_str(&content).map_err(|e| malformed(path, e.to_string()))?
        };

        let model = Self::from_artifact(path, artifact)?;
        info!(
            path = %path.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "model loaded"
        );
        Ok(model)
    }

    fn from_artifact(path: &Path, artifact: ArtifactFile) -> Result<Self, ModelLoadError> {
        if artifact.model_type != LOGISTIC_REGRESSION {
            return Err(malformed(
                path,
                format!("unsupported model type '{}'", artifact.model_type),
            ));
        }

        if let Some(names) = &artifact.feature_names {
            let expected = FeatureName::ordered_names();
            if names.iter().map(String::as_str).ne(expected.iter().copied()) {
                return Err(malformed(
                    path,
                    format!("feature order {:?} does not match {:?}", names, expected),
                ));
            }
        }

        let coefficients = fixed(path, "coefficients", &artifact.coefficients)?;
        let (mean, scale) = match &artifact.scaler {
            Some(scaler) => {
                let mean = fixed(path, "scaler.mean", &scaler.mean)?;
                let scale = fixed(path, "scaler.scale", &scaler.scale)?;
                if scale.iter().any(|s| *s == 0.0) {
                    return Err(malformed(path, "scaler.scale contains zero".to_string()));
                }
                (mean, scale)
            }
            None => ([0.0; FEATURE_COUNT], [1.0; FEATURE_COUNT]),
        };

        if !artifact.intercept.is_finite() {
            return Err(malformed(path, "intercept is not finite".to_string()));
        }
        if !(artifact.threshold > 0.0 && artifact.threshold < 1.0) {
            return Err(malformed(
                path,
                format!("threshold {} outside (0, 1)", artifact.threshold),
            ));
        }

        Ok(Self {
            path: path.to_path_buf(),
            mean,
            scale,
            coefficients,
            intercept: artifact.intercept,
            threshold: artifact.threshold,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn decision_function(&self, features: &[f64; FEATURE_COUNT]) -> Result<f64, ScoringError> {
        let mut z = self.intercept;
        for (i, feature) in FeatureName::ordered().into_iter().enumerate() {
            let x = features[i];
            if !x.is_finite() {
                return Err(ScoringError::NonFiniteFeature { feature, value: x });
            }
            z += self.coefficients[i] * (x - self.mean[i]) / self.scale[i];
        }

        if z.is_finite() {
            Ok(z)
        } else {
            Err(ScoringError::NonFiniteOutput)
        }
    }

    pub fn probability(&self, features: &[f64; FEATURE_COUNT]) -> Result<f64, ScoringError> {
        self.decision_function(features).map(sigmoid)
    }
}

impl BinaryClassifier for LogisticModel {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Result<ModelLabel, ScoringError> {
        let p = self.probability(features)?;
        debug!(probability = p, threshold = self.threshold, "inference");
        Ok(if p > self.threshold {
            ModelLabel::Higher
        } else {
            ModelLabel::Lower
        })
    }

    fn model_type(&self) -> &str {
        LOGISTIC_REGRESSION
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn fixed(path: &Path, field: &str, values: &[f64]) -> Result<[f64; FEATURE_COUNT], ModelLoadError> {
    let array: [f64; FEATURE_COUNT] = values.try_into().map_err(|_| {
        malformed(
            path,
            format!(
                "{field} has {} entries, expected {FEATURE_COUNT}",
                values.len()
            ),
        )
    })?;
    if array.iter().any(|v| !v.is_finite()) {
        return Err(malformed(path, format!("{field} contains non-finite values")));
    }
    Ok(array)
}

fn malformed(path: &Path, reason: String) -> ModelLoadError {
    ModelLoadError::Malformed {
        path: path.to_path_buf(),
        reason,
    }
}
