pub mod engine;
pub mod history;
pub mod model;
pub mod scoring;
pub mod settings;
pub mod utils;

pub use engine::{EngineError, EngineStatus, PredictionOutcome, Predictor, StartupError};
pub use history::{HistoryRecord, PredictionStore, Statistics};
pub use model::{BinaryClassifier, LogisticModel, ModelLabel, ModelLoadError};
pub use scoring::{
    FeatureName, FeatureRecord, PerformanceCategory, PredictionResult, ScoringError,
    ValidationError,
};
