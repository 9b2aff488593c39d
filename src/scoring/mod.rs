pub mod contributions;
pub mod features;
pub mod hybrid;

pub use contributions::{calculate_contributions, round2, Contributions};
pub use features::{
    missing_features, FeatureName, FeatureRecord, StudentFeatures, ValidationError, FEATURE_COUNT,
    UNKNOWN_STUDENT_ID,
};
pub use hybrid::{
    calculated_score, evaluate, reconcile, score, Assessment, Confidence, PerformanceCategory,
    PredictionResult, ScoringError,
};
