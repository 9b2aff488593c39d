use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::history::{summarize, HistoryRecord, PersistenceError, PredictionStore, Statistics};
use crate::model::{BinaryClassifier, LogisticModel, ModelLoadError};
use crate::scoring::{
    self, Assessment, FeatureName, FeatureRecord, PredictionResult, ScoringError, ValidationError,
};
use crate::settings::Settings;

pub const PROJECT_NAME: &str = "Student Performance Insight";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Model(#[from] ModelLoadError),
    #[error(transparent)]
    Storage(#[from] PersistenceError),
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub prediction: PredictionResult,
    pub recorded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub project: &'static str,
    pub model_type: String,
    pub model_path: Option<PathBuf>,
    pub features: Vec<&'static str>,
    pub history_path: PathBuf,
    pub total_predictions: usize,
}

/// Loaded classifier plus history store. Built once at startup; every
/// operation borrows it immutably.
pub struct Predictor {
    model: Arc<dyn BinaryClassifier>,
    model_path: Option<PathBuf>,
    store: PredictionStore,
}

impl Predictor {
    pub fn new(model: Arc<dyn BinaryClassifier>, store: PredictionStore) -> Self {
        Self {
            model,
            model_path: None,
            store,
        }
    }

    pub fn open(
        model_path: impl AsRef<Path>,
        history_path: impl Into<PathBuf>,
    ) -> Result<Self, StartupError> {
        let model = LogisticModel::load(model_path.as_ref())?;
        let store = PredictionStore::open(history_path)?;
        Ok(Self {
            model_path: Some(model.path().to_path_buf()),
            model: Arc::new(model),
            store,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, StartupError> {
        Self::open(
            &settings.model.artifact_path,
            settings.storage.history_path.clone(),
        )
    }

    pub fn model(&self) -> &dyn BinaryClassifier {
        self.model.as_ref()
    }

    pub fn store(&self) -> &PredictionStore {
        &self.store
    }

    pub fn features(&self) -> Vec<FeatureName> {
        FeatureName::ordered()
    }

    pub fn evaluate(&self, record: &FeatureRecord) -> Result<Assessment, EngineError> {
        let features = record.validate()?;
        Ok(scoring::evaluate(self.model(), &features)?)
    }

    pub fn score(&self, record: &FeatureRecord) -> Result<PredictionResult, EngineError> {
        self.evaluate(record).map(|assessment| assessment.result)
    }

    /// Persists one scoring event. Failures are logged and reported as
    /// `false`; they never invalidate the result.
    pub fn record(&self, record: &FeatureRecord, result: &PredictionResult) -> bool {
        let features = match record.validate() {
            Ok(features) => features,
            Err(e) => {
                warn!(error = %e, "refusing to record incomplete feature record");
                return false;
            }
        };

        let entry = HistoryRecord::new(record.student_id.as_deref(), &features, result);
        match self.store.append(&entry) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to save prediction");
                false
            }
        }
    }

    pub fn predict_and_record(
        &self,
        record: &FeatureRecord,
    ) -> Result<PredictionOutcome, EngineError> {
        let prediction = self.score(record)?;
        let recorded = self.record(record, &prediction);
        info!(
            "Prediction: {} ({})",
            prediction.predicted_score, prediction.category
        );
        Ok(PredictionOutcome {
            prediction,
            recorded,
        })
    }

    pub fn all_history(&self) -> Vec<HistoryRecord> {
        self.store.read_all().unwrap_or_else(|e| {
            warn!(error = %e, "history unreadable, returning empty list");
            Vec::new()
        })
    }

    pub fn statistics(&self) -> Statistics {
        match self.store.read_all() {
            Ok(records) => summarize(&records),
            Err(e) => {
                warn!(error = %e, "history unreadable, returning empty statistics");
                Statistics::default()
            }
        }
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            project: PROJECT_NAME,
            model_type: self.model.model_type().to_string(),
            model_path: self.model_path.clone(),
            features: FeatureName::ordered_names(),
            history_path: self.store.path().to_path_buf(),
            total_predictions: self.statistics().total,
        }
    }
}
